// SPDX-License-Identifier: Apache-2.0

// Struct and enum bindings declared from outside the crate

use arenajson::{json_enum, json_struct, parse, DateTime, Error, JsonEnum, NodeType, Tree};
use test_log::test;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Low,
    Mid,
    High,
}
json_enum!(Level {
    Low = 10,
    Mid = 20,
    High = 30,
});

#[derive(Debug, PartialEq)]
struct TestObject {
    a: String,
    b: [i32; 3],
    c: DateTime,
}
json_struct!(TestObject { a, b, c });

#[derive(Debug, PartialEq)]
struct Record<'a> {
    id: u64,
    label: &'a str,
    level: Level,
    scores: Vec<f32>,
    parent: Option<u64>,
}
json_struct!(Record<'a> {
    id,
    label,
    level,
    scores,
    parent,
});

#[test]
fn test_object_from_text() {
    let text = r#"{
        "a": "hello",
        "b": [1, 2, 3],
        "c": "2017-9-3T8:30:12"
    }"#;
    let tree = parse(text).unwrap();
    let object: TestObject = tree.read().unwrap();
    assert_eq!(object.a, "hello");
    assert_eq!(object.b, [1, 2, 3]);
    assert_eq!(object.c, DateTime::new(2017, 9, 3, 8, 30, 12).unwrap());
}

#[test]
fn test_object_to_text() {
    let object = TestObject {
        a: "hello".into(),
        b: [1, 2, 3],
        c: DateTime::new(2017, 9, 3, 8, 30, 12).unwrap(),
    };
    let tree = Tree::from_value(&object).unwrap();
    let expected = r#"{
    "a": "hello",
    "b": [
        1,
        2,
        3
    ],
    "c": "2017-09-03T08:30:12"
}"#;
    assert_eq!(tree.format(), expected);
}

#[test]
fn test_borrowed_record() {
    let text = r#"[
        {"id": 1, "label": "root", "level": "High", "scores": [], "parent": null},
        {"id": 2, "label": "leaf", "level": 20, "scores": [0.5, 1], "parent": 1}
    ]"#;
    let tree = parse(text).unwrap();
    let records: Vec<Record> = tree.read().unwrap();
    assert_eq!(
        records,
        [
            Record {
                id: 1,
                label: "root",
                level: Level::High,
                scores: vec![],
                parent: None,
            },
            Record {
                id: 2,
                label: "leaf",
                level: Level::Mid,
                scores: vec![0.5, 1.0],
                parent: Some(1),
            },
        ]
    );

    let rendered = Tree::from_value(&records).unwrap().format();
    let again = parse(&rendered).unwrap();
    assert_eq!(again.read::<Vec<Record>>(), Ok(records));
}

#[test]
fn test_record_without_parent_key() {
    let text = r#"{"id": 3, "label": "orphan", "level": "Low", "scores": [2]}"#;
    let tree = parse(text).unwrap();
    let record: Record = tree.read().unwrap();
    assert_eq!(record.parent, None);
    assert_eq!(record.scores, [2.0]);

    let tree = parse(r#"{"id": 3, "level": "Low", "scores": [], "parent": 1}"#).unwrap();
    assert_eq!(
        tree.read::<Record>(),
        Err(Error::KeyNotFound("label".into()))
    );
}

#[test]
fn test_record_errors() {
    let tree = parse(r#"{"id": 1, "label": "x", "level": "Extreme", "scores": [], "parent": null}"#)
        .unwrap();
    assert_eq!(
        tree.read::<Record>(),
        Err(Error::UnknownVariant("Extreme".into()))
    );

    let tree = parse(r#"{"id": 1, "label": 7}"#).unwrap();
    assert_eq!(
        tree.read::<Record>(),
        Err(Error::TypeMismatch {
            expected: NodeType::String,
            found: NodeType::Number
        })
    );

    let tree = parse("[]").unwrap();
    assert_eq!(
        tree.read::<Record>(),
        Err(Error::TypeMismatch {
            expected: NodeType::Object,
            found: NodeType::Array
        })
    );
}

#[test]
fn test_enum_table() {
    assert_eq!(Level::Low.name(), "Low");
    assert_eq!(Level::High.value(), 30);
    assert_eq!(Level::from_value(20), Some(Level::Mid));
    assert_eq!(Level::from_name("Mid"), Some(Level::Mid));
    assert_eq!(Level::from_name("mid"), None);

    let tree = Tree::from_value(&[Level::Low, Level::High]).unwrap();
    assert_eq!(tree.format(), "[\n    \"Low\",\n    \"High\"\n]");
}
