// SPDX-License-Identifier: Apache-2.0

//! Node representation for the document arena.
//!
//! A [`Node`] is a small `Copy` value. It never holds a pointer: sibling and
//! child links are forward offsets relative to the node's own index, and text
//! is referenced by byte offset into either the parsed source or the owning
//! store's text pool. The whole arena can therefore grow, move or be copied
//! without patching any link.

use crate::datetime::DateTime;

/// Type tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Null,
    Boolean,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    DateTime,
    /// Raw number text, typed lazily on first read.
    Number,
    String,
    /// Object key. Always directly followed by its value in the arena.
    Key,
    Array,
    Object,
}

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Null => "null",
            NodeType::Boolean => "boolean",
            NodeType::I8 => "i8",
            NodeType::U8 => "u8",
            NodeType::I16 => "i16",
            NodeType::U16 => "u16",
            NodeType::I32 => "i32",
            NodeType::U32 => "u32",
            NodeType::I64 => "i64",
            NodeType::U64 => "u64",
            NodeType::F32 => "f32",
            NodeType::F64 => "f64",
            NodeType::DateTime => "datetime",
            NodeType::Number => "number",
            NodeType::String => "string",
            NodeType::Key => "key",
            NodeType::Array => "array",
            NodeType::Object => "object",
        }
    }

    /// Arrays and objects.
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::Array | NodeType::Object)
    }

    /// Nodes whose payload is a text reference.
    pub fn is_text(self) -> bool {
        matches!(self, NodeType::Number | NodeType::String | NodeType::Key)
    }

    /// Concrete (already typed) numeric kinds.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            NodeType::I8
                | NodeType::U8
                | NodeType::I16
                | NodeType::U16
                | NodeType::I32
                | NodeType::U32
                | NodeType::I64
                | NodeType::U64
                | NodeType::F32
                | NodeType::F64
        )
    }
}

impl core::fmt::Display for NodeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which buffer a [`TextRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The immutable text the tree was parsed from.
    Source,
    /// The store's own text pool (strings written after parsing).
    Pool,
}

/// Start of a text slice. The length lives in [`Node::size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRef {
    pub origin: Origin,
    pub start: usize,
}

/// Tagged payload of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    None,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Seconds since the Unix epoch, UTC.
    DateTime(i64),
    Text(TextRef),
    /// Relative offset to the first node of the container's chain, `0` when empty.
    Children { first: usize },
}

/// One arena slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    node_type: NodeType,
    size: usize,
    next: usize,
    payload: Payload,
}

impl Node {
    const fn with(node_type: NodeType, payload: Payload) -> Self {
        Node {
            node_type,
            size: 0,
            next: 0,
            payload,
        }
    }

    pub const fn null() -> Self {
        Self::with(NodeType::Null, Payload::None)
    }

    /// An empty array.
    pub const fn array() -> Self {
        Self::with(NodeType::Array, Payload::Children { first: 0 })
    }

    /// An empty object.
    pub const fn object() -> Self {
        Self::with(NodeType::Object, Payload::Children { first: 0 })
    }

    /// A text-backed node (`String`, `Key` or `Number`) of `len` bytes.
    pub(crate) fn text(node_type: NodeType, text: TextRef, len: usize) -> Self {
        debug_assert!(node_type.is_text());
        Node {
            size: len,
            ..Self::with(node_type, Payload::Text(text))
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Byte length for text nodes, element or entry count for containers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Relative offset to the next node of the chain, `0` at the end.
    pub fn next(&self) -> usize {
        self.next
    }

    pub fn payload(&self) -> Payload {
        self.payload
    }

    pub(crate) fn text_ref(&self) -> Option<TextRef> {
        match self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub(crate) fn first(&self) -> usize {
        match self.payload {
            Payload::Children { first } => first,
            _ => 0,
        }
    }

    pub(crate) fn set_next(&mut self, next: usize) {
        self.next = next;
    }

    pub(crate) fn set_first(&mut self, first: usize) {
        self.payload = Payload::Children { first };
    }

    pub(crate) fn set_text(&mut self, text: TextRef) {
        self.payload = Payload::Text(text);
    }

    pub(crate) fn bump_size(&mut self) {
        self.size += 1;
    }

    /// Replace tag and payload, keeping the chain link. Used for in-place coercion.
    pub(crate) fn retag(&mut self, node_type: NodeType, payload: Payload) {
        self.node_type = node_type;
        self.payload = payload;
        self.size = 0;
    }

    /// Overwrite the value of this slot with `value`, keeping the chain link.
    pub(crate) fn assign(&mut self, value: Node) {
        let next = self.next;
        *self = value;
        self.next = next;
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::null()
    }
}

impl From<bool> for Node {
    fn from(val: bool) -> Self {
        Node::with(NodeType::Boolean, Payload::Bool(val))
    }
}

impl From<DateTime> for Node {
    fn from(val: DateTime) -> Self {
        Node::with(NodeType::DateTime, Payload::DateTime(val.stamp()))
    }
}

macro_rules! impl_node_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(val: $ty) -> Self {
                    Node::with(NodeType::$variant, Payload::$variant(val))
                }
            }
        )*
    };
}

impl_node_from_scalar!(
    i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32, u32 => U32,
    i64 => I64, u64 => U64, f32 => F32, f64 => F64,
);
