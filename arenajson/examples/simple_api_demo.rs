// Example demonstrating parsing, navigation and lazy number coercion

use arenajson::{parse, Error, NodeType};

fn main() -> Result<(), Error> {
    env_logger::init();

    let json = r#"{"name": "value", "number": 42, "flag": true, "list": [1.5, 2, "x"]}"#;
    let tree = parse(json)?;
    println!("Input: {}", json);
    println!("Nodes in arena: {}", tree.len());

    for (key, value) in tree.root().entries()? {
        match value.node_type() {
            NodeType::String => println!("Key: '{}' String: '{}'", key, value.as_str()?),
            NodeType::Number => println!("Key: '{}' Number (raw): {}", key, value.as_str()?),
            NodeType::Boolean => println!("Key: '{}' Bool: {}", key, value.read::<bool>()?),
            NodeType::Array => println!("Key: '{}' Array of {}", key, value.count()),
            other => println!("Key: '{}' {}", key, other),
        }
    }

    // First typed read parses the text and retags the node
    let number = tree.root().get("number")?;
    println!();
    println!("number as i64: {}", number.read::<i64>()?);
    println!("number tag is now: {}", number.node_type());

    match tree.root().get("missing") {
        Err(e) => println!("Lookup of 'missing' failed: {}", e),
        Ok(_) => println!("Unexpected hit"),
    }

    println!();
    println!("{}", tree);
    Ok(())
}
