// SPDX-License-Identifier: Apache-2.0

//! An in-memory JSON document tree stored in one contiguous arena.
//!
//! Parsing produces a [`Tree`] whose nodes link to each other by forward
//! offsets instead of pointers, and whose strings and numbers reference the
//! source text without copying it. Numbers stay untyped until first read:
//! reading a `number` node as a concrete kind parses it and retags the node
//! in place, so the next read is free.
//!
//! ```
//! use arenajson::{parse, NodeType};
//!
//! let tree = parse(r#"{"a": "hello", "b": [1, 2, 3]}"#).unwrap();
//! let b = tree.root().get("b").unwrap();
//! assert_eq!(b.at(0).unwrap().node_type(), NodeType::Number);
//! assert_eq!(b.at(0).unwrap().read::<i32>(), Ok(1));
//! assert_eq!(b.at(0).unwrap().node_type(), NodeType::I32);
//! ```
//!
//! Native types convert through [`FromNode`] and [`ToNode`]; user structs and
//! enums opt in with [`json_struct!`] and [`json_enum!`].

pub mod binding;
pub use binding::{FromNode, JsonEnum, ToNode};

mod error;
pub use error::{Error, Result};

mod node;
pub use node::{Node, NodeType, Origin, Payload, TextRef};

mod datetime;
pub use datetime::DateTime;

mod number;

mod store;
pub use store::NodeStore;

mod cursor;
pub use cursor::{ArrayBuilder, Children, Cursor, CursorMut, Entries, ObjectBuilder};

mod tree;
pub use tree::{Tree, ROOT};

mod parser;
pub use parser::{
    parse, parse_slice, parse_with, ParseOptions, DEFAULT_MAX_DEPTH, DEFAULT_RESERVE_RATIO,
};

mod formatter;
pub use formatter::{format, format_with, write_node, FormatOptions};
