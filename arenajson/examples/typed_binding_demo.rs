// Example demonstrating struct and enum bindings

use arenajson::{json_enum, json_struct, parse, DateTime, Error, Tree};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Active,
    Retired,
}
json_enum!(Status {
    Active = 1,
    Retired = 2,
});

#[derive(Debug)]
struct Sensor {
    name: String,
    status: Status,
    readings: Vec<f64>,
    installed: DateTime,
    offset: Option<i32>,
}
json_struct!(Sensor {
    name,
    status,
    readings,
    installed,
    offset,
});

fn main() -> Result<(), Error> {
    env_logger::init();

    let json = r#"[
        {"name": "north", "status": "Active", "readings": [1.5, 2.25],
         "installed": "2021-4-1T9:00:00", "offset": null},
        {"name": "south", "status": 2, "readings": [],
         "installed": 1617267600, "offset": -3}
    ]"#;

    let tree = parse(json)?;
    let sensors: Vec<Sensor> = tree.read()?;
    for sensor in &sensors {
        println!("{:?}", sensor);
    }

    let mut fresh = Tree::from_value(&sensors)?;
    {
        let mut root = fresh.root_mut();
        let mut first = root.at_mut(0)?;
        first.get_mut("offset")?.write(&5i32)?;
    }
    println!();
    println!("{}", fresh);
    Ok(())
}
