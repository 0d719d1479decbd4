// SPDX-License-Identifier: Apache-2.0

//! Conversions between tree nodes and native values.
//!
//! [`FromNode`] reads a value out of a node, [`ToNode`] writes one into a
//! node. Implementations cover booleans, the ten numeric kinds, strings,
//! [`DateTime`], arrays, `Vec`, `Option`, and user types declared with
//! [`json_enum!`](crate::json_enum) or [`json_struct!`](crate::json_struct).

use crate::cursor::{Cursor, CursorMut};
use crate::datetime::DateTime;
use crate::error::{Error, Result};
use crate::node::{Node, NodeType, Payload};

/// A type that can be read from a node of a tree borrowed for `'t`.
pub trait FromNode<'t>: Sized {
    fn from_node(node: Cursor<'t>) -> Result<Self>;

    /// Value for a struct field whose key is absent.
    fn from_missing(key: &str) -> Result<Self> {
        Err(Error::KeyNotFound(key.to_owned()))
    }
}

/// A type that can be written into a node.
pub trait ToNode {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()>;
}

macro_rules! impl_scalar_binding {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'t> FromNode<'t> for $ty {
                fn from_node(node: Cursor<'t>) -> Result<Self> {
                    node.scalar()
                }
            }

            impl ToNode for $ty {
                fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
                    node.set(Node::from(*self))
                }
            }
        )*
    };
}

impl_scalar_binding!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl<'t> FromNode<'t> for bool {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        node.boolean()
    }
}

impl ToNode for bool {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        node.set(Node::from(*self))
    }
}

impl<'t> FromNode<'t> for DateTime {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        node.datetime()
    }
}

impl ToNode for DateTime {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        node.set(Node::from(*self))
    }
}

/// Borrowed string text, escapes left verbatim. Only `string` nodes qualify.
impl<'t> FromNode<'t> for &'t str {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        match node.node_type() {
            NodeType::String => node.as_str(),
            other => Err(Error::mismatch(NodeType::String, other)),
        }
    }
}

impl<'t> FromNode<'t> for String {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        <&str>::from_node(node).map(str::to_owned)
    }
}

impl ToNode for str {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        node.set_str(self)
    }
}

impl ToNode for String {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        node.set_str(self)
    }
}

impl<T: ToNode + ?Sized> ToNode for &T {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        (**self).to_node(node)
    }
}

fn expect_array(node: Cursor<'_>) -> Result<()> {
    match node.node_type() {
        NodeType::Array => Ok(()),
        other => Err(Error::mismatch(NodeType::Array, other)),
    }
}

impl<'t, T: FromNode<'t>> FromNode<'t> for Vec<T> {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        expect_array(node)?;
        let mut items = Vec::with_capacity(node.count());
        for child in node.children()? {
            items.push(child.read()?);
        }
        Ok(items)
    }
}

/// Exact arity: an array of any other length is an `ArityMismatch`.
impl<'t, T: FromNode<'t>, const N: usize> FromNode<'t> for [T; N] {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        expect_array(node)?;
        if node.count() != N {
            return Err(Error::ArityMismatch {
                expected: N,
                found: node.count(),
            });
        }
        let items: Vec<T> = node.read()?;
        items.try_into().map_err(|items: Vec<T>| Error::ArityMismatch {
            expected: N,
            found: items.len(),
        })
    }
}

impl<T: ToNode> ToNode for [T] {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        let mut array = node.array()?;
        for item in self {
            array.push(item)?;
        }
        Ok(())
    }
}

impl<T: ToNode> ToNode for Vec<T> {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        self.as_slice().to_node(node)
    }
}

impl<T: ToNode, const N: usize> ToNode for [T; N] {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        self.as_slice().to_node(node)
    }
}

/// `null` reads as `None`, and so does a missing struct field.
impl<'t, T: FromNode<'t>> FromNode<'t> for Option<T> {
    fn from_node(node: Cursor<'t>) -> Result<Self> {
        if node.is_null() {
            Ok(None)
        } else {
            node.read().map(Some)
        }
    }

    fn from_missing(_key: &str) -> Result<Self> {
        Ok(None)
    }
}

/// Read the value under `key` of an object node, falling back to
/// [`FromNode::from_missing`] when the key is absent.
pub fn read_field<'t, T: FromNode<'t>>(node: Cursor<'t>, key: &str) -> Result<T> {
    match node.get(key) {
        Ok(value) => value.read(),
        Err(Error::KeyNotFound(_)) => T::from_missing(key),
        Err(e) => Err(e),
    }
}

impl<T: ToNode> ToNode for Option<T> {
    fn to_node(&self, node: &mut CursorMut<'_, '_>) -> Result<()> {
        match self {
            Some(value) => value.to_node(node),
            None => node.set(Node::null()),
        }
    }
}

/// A fieldless enum mapped to its variant names.
///
/// Implemented by [`json_enum!`](crate::json_enum). Values are written as the
/// symbolic name and read back either by name or, from a numeric node, by
/// discriminant.
pub trait JsonEnum: Sized + Copy {
    fn name(self) -> &'static str;
    fn from_name(name: &str) -> Option<Self>;
    fn value(self) -> i64;
    fn from_value(value: i64) -> Option<Self>;
}

/// Integral value of a numeric node. A raw number is coerced to `i64`.
fn integer(node: Cursor<'_>) -> Result<i64> {
    let out_of_range = |v: u64| Error::UnknownVariant(v.to_string());
    match node.node().payload() {
        Payload::I8(v) => Ok(v.into()),
        Payload::U8(v) => Ok(v.into()),
        Payload::I16(v) => Ok(v.into()),
        Payload::U16(v) => Ok(v.into()),
        Payload::I32(v) => Ok(v.into()),
        Payload::U32(v) => Ok(v.into()),
        Payload::I64(v) => Ok(v),
        Payload::U64(v) => i64::try_from(v).map_err(|_| out_of_range(v)),
        _ => node.scalar::<i64>(),
    }
}

/// Read a [`JsonEnum`] by name from a string node, or by value from a numeric one.
pub fn read_enum<E: JsonEnum>(node: Cursor<'_>) -> Result<E> {
    match node.node_type() {
        NodeType::String => {
            let name = node.as_str()?;
            E::from_name(name).ok_or_else(|| Error::UnknownVariant(name.to_owned()))
        }
        t if t == NodeType::Number || t.is_numeric() => {
            let value = integer(node)?;
            E::from_value(value).ok_or_else(|| Error::UnknownVariant(value.to_string()))
        }
        other => Err(Error::mismatch(NodeType::String, other)),
    }
}

/// Write a [`JsonEnum`] as its variant name.
pub fn write_enum<E: JsonEnum>(value: E, node: &mut CursorMut<'_, '_>) -> Result<()> {
    node.set_str(value.name())
}

/// Implements [`JsonEnum`], [`FromNode`] and [`ToNode`] for a fieldless,
/// `Copy` enum.
///
/// ```
/// use arenajson::{json_enum, parse, Tree};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color {
///     Red,
///     Green,
/// }
/// json_enum!(Color { Red = 1, Green = 2 });
///
/// let tree = Tree::from_value(&Color::Green).unwrap();
/// assert_eq!(tree.to_string(), "\"Green\"");
/// assert_eq!(parse("1").unwrap().read::<Color>(), Ok(Color::Red));
/// ```
#[macro_export]
macro_rules! json_enum {
    ($name:ident { $($variant:ident = $value:expr),* $(,)? }) => {
        impl $crate::JsonEnum for $name {
            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some($name::$variant),)*
                    _ => None,
                }
            }

            fn value(self) -> i64 {
                match self {
                    $($name::$variant => ($value) as i64,)*
                }
            }

            fn from_value(value: i64) -> Option<Self> {
                $(
                    if value == ($value) as i64 {
                        return Some($name::$variant);
                    }
                )*
                None
            }
        }

        impl<'t> $crate::FromNode<'t> for $name {
            fn from_node(node: $crate::Cursor<'t>) -> $crate::Result<Self> {
                $crate::binding::read_enum(node)
            }
        }

        impl $crate::ToNode for $name {
            fn to_node(&self, node: &mut $crate::CursorMut<'_, '_>) -> $crate::Result<()> {
                $crate::binding::write_enum(*self, node)
            }
        }
    };
}

/// Implements [`FromNode`] and [`ToNode`] for a struct, one object entry per
/// listed field, keyed by the field name.
///
/// Writing emits the fields in the order listed. Reading looks each field up
/// by key and fails with [`Error::KeyNotFound`] on the first missing one,
/// except that a missing `Option` field reads as `None`. Structs borrowing from the tree take a single lifetime parameter:
///
/// ```
/// use arenajson::{json_struct, parse};
///
/// struct Item<'a> {
///     name: &'a str,
///     qty: u32,
/// }
/// json_struct!(Item<'a> { name, qty });
///
/// let tree = parse(r#"{"qty": 3, "name": "bolt"}"#).unwrap();
/// let item: Item = tree.read().unwrap();
/// assert_eq!((item.name, item.qty), ("bolt", 3));
/// ```
#[macro_export]
macro_rules! json_struct {
    ($name:ident < $lt:lifetime > { $($field:ident),* $(,)? }) => {
        impl<$lt> $crate::FromNode<$lt> for $name<$lt> {
            fn from_node(node: $crate::Cursor<$lt>) -> $crate::Result<Self> {
                Ok($name {
                    $($field: $crate::binding::read_field(node, stringify!($field))?,)*
                })
            }
        }

        $crate::json_struct!(@write $name<$lt> { $($field),* });
    };
    ($name:ident { $($field:ident),* $(,)? }) => {
        impl<'t> $crate::FromNode<'t> for $name {
            fn from_node(node: $crate::Cursor<'t>) -> $crate::Result<Self> {
                Ok($name {
                    $($field: $crate::binding::read_field(node, stringify!($field))?,)*
                })
            }
        }

        $crate::json_struct!(@write $name<> { $($field),* });
    };
    (@write $name:ident < $($lt:lifetime)? > { $($field:ident),* }) => {
        impl<$($lt)?> $crate::ToNode for $name<$($lt)?> {
            #[allow(unused_mut)]
            fn to_node(&self, node: &mut $crate::CursorMut<'_, '_>) -> $crate::Result<()> {
                let mut object = node.object()?;
                $(object.field(stringify!($field), &self.$field)?;)*
                Ok(())
            }
        }
    };
}
