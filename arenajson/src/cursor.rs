// SPDX-License-Identifier: Apache-2.0

//! Handles into a [`NodeStore`]: navigation, typed reads and writes.

use log::trace;

use crate::binding::{FromNode, ToNode};
use crate::datetime::DateTime;
use crate::error::{Error, Result};
use crate::formatter::{self, FormatOptions};
use crate::node::{Node, NodeType, Payload};
use crate::number::{self, Scalar};
use crate::store::NodeStore;

/// Read handle to one node of a tree.
///
/// A cursor is a store reference plus an index, so it is `Copy` and never
/// outlives the tree it points into.
///
/// Reads are not side-effect free: the first typed read of a raw `number`
/// node (or of a `string` read as a date-time) parses the text and retags the
/// node in place, so later reads return the memoized value and report the
/// concrete tag. A second read with a different numeric kind then fails with
/// [`Error::TypeMismatch`].
#[derive(Clone, Copy)]
pub struct Cursor<'t> {
    store: &'t NodeStore<'t>,
    index: usize,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(store: &'t NodeStore<'t>, index: usize) -> Self {
        Cursor { store, index }
    }

    /// Arena index of the node.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn store(&self) -> &'t NodeStore<'t> {
        self.store
    }

    /// Copy of the underlying node.
    pub fn node(&self) -> Node {
        self.store.node(self.index)
    }

    pub fn node_type(&self) -> NodeType {
        self.node().node_type()
    }

    pub fn is_null(&self) -> bool {
        self.node_type() == NodeType::Null
    }

    /// Byte length for text nodes, element count for arrays, entry count for
    /// objects, `0` otherwise.
    pub fn count(&self) -> usize {
        self.node().size()
    }

    /// True for integral numbers, typed or still raw.
    pub fn is_integer(&self) -> bool {
        match self.node_type() {
            NodeType::Number => self
                .as_str()
                .map(|text| number::is_integer(text.as_bytes()))
                .unwrap_or(false),
            NodeType::F32 | NodeType::F64 => false,
            other => other.is_numeric(),
        }
    }

    /// Key of the entry this value belongs to.
    ///
    /// Only valid on object values; anything else is a `TypeMismatch`.
    pub fn key(&self) -> Result<&'t str> {
        let Some(prev) = self.index.checked_sub(1) else {
            return Err(Error::mismatch(NodeType::Key, self.node_type()));
        };
        let key = self.store.node(prev);
        if key.node_type() != NodeType::Key {
            return Err(Error::mismatch(NodeType::Key, key.node_type()));
        }
        self.store
            .text(&key)
            .ok_or(Error::mismatch(NodeType::Key, NodeType::Null))
    }

    /// Raw text of a `string`, `key` or `number` node, escapes left verbatim.
    pub fn as_str(&self) -> Result<&'t str> {
        let node = self.node();
        if !node.node_type().is_text() {
            return Err(Error::mismatch(NodeType::String, node.node_type()));
        }
        self.store
            .text(&node)
            .ok_or(Error::mismatch(NodeType::String, node.node_type()))
    }

    /// Iterate the direct children (values, for objects) in insertion order.
    pub fn children(&self) -> Result<Children<'t>> {
        let node = self.node();
        let node_type = node.node_type();
        if !node_type.is_container() {
            return Err(Error::EmptyAccess(node_type));
        }
        let first = node.first();
        Ok(Children {
            store: self.store,
            at: (first != 0).then(|| self.index + first),
            object: node_type == NodeType::Object,
            remaining: node.size(),
        })
    }

    /// Iterate `(key, value)` pairs of an object.
    pub fn entries(&self) -> Result<Entries<'t>> {
        match self.node_type() {
            NodeType::Object => Ok(Entries {
                inner: self.children()?,
            }),
            NodeType::Array => Err(Error::mismatch(NodeType::Object, NodeType::Array)),
            other => Err(Error::EmptyAccess(other)),
        }
    }

    /// The `k`-th child, walking the chain.
    pub fn at(&self, k: usize) -> Result<Cursor<'t>> {
        let len = self.count();
        self.children()?
            .nth(k)
            .ok_or(Error::IndexOutOfBounds { index: k, len })
    }

    /// Value for `key`, by linear byte-for-byte scan of the object's keys.
    ///
    /// A miss is reported as [`Error::KeyNotFound`]; see [`find`](Self::find)
    /// for the non-failing form.
    pub fn get(&self, key: &str) -> Result<Cursor<'t>> {
        self.entries()?
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
            .ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    /// Like [`get`](Self::get) but `None` on a miss or on a non-object node.
    pub fn find(&self, key: &str) -> Option<Cursor<'t>> {
        self.get(key).ok()
    }

    /// Typed read.
    pub fn read<T: FromNode<'t>>(&self) -> Result<T> {
        T::from_node(*self)
    }

    pub(crate) fn boolean(&self) -> Result<bool> {
        match self.node().payload() {
            Payload::Bool(val) => Ok(val),
            _ => Err(Error::mismatch(NodeType::Boolean, self.node_type())),
        }
    }

    /// Read a numeric kind, coercing a raw `number` node in place.
    pub(crate) fn scalar<T: Scalar>(&self) -> Result<T> {
        let node = self.node();
        match node.node_type() {
            t if t == T::TYPE => {
                T::from_payload(node.payload()).ok_or(Error::mismatch(T::TYPE, t))
            }
            NodeType::Number => {
                let text = self.as_str()?;
                let val = T::parse_number(text)?;
                trace!("node {}: number {:?} coerced to {}", self.index, text, T::TYPE);
                self.store
                    .update(self.index, |n| n.retag(T::TYPE, val.to_payload()));
                Ok(val)
            }
            other => Err(Error::mismatch(T::TYPE, other)),
        }
    }

    /// Read a date-time from a typed node, a raw stamp, or ISO-8601 text.
    pub(crate) fn datetime(&self) -> Result<DateTime> {
        let node = self.node();
        let val = match node.payload() {
            Payload::DateTime(stamp) => return Ok(DateTime::from_stamp(stamp)),
            _ if node.node_type() == NodeType::Number => {
                DateTime::from_stamp(i64::parse_number(self.as_str()?)?)
            }
            _ if node.node_type() == NodeType::String => DateTime::parse(self.as_str()?)?,
            _ => return Err(Error::mismatch(NodeType::DateTime, node.node_type())),
        };
        trace!("node {}: {} coerced to datetime", self.index, node.node_type());
        self.store.update(self.index, |n| {
            n.retag(NodeType::DateTime, Payload::DateTime(val.stamp()))
        });
        Ok(val)
    }
}

impl core::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("node", &self.node())
            .finish()
    }
}

impl core::fmt::Display for Cursor<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        formatter::write_node(f, *self, &FormatOptions::default(), 0)
    }
}

/// Iterator over the chain of a container. Yields values for objects.
#[derive(Debug, Clone)]
pub struct Children<'t> {
    store: &'t NodeStore<'t>,
    /// Current element, or current key for objects.
    at: Option<usize>,
    object: bool,
    remaining: usize,
}

impl<'t> Iterator for Children<'t> {
    type Item = Cursor<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.at?;
        // An entry's value is always appended right after its key
        let value = if self.object { at + 1 } else { at };
        let next = match self.store.get(value) {
            Some(node) => node.next(),
            None => {
                self.at = None;
                return None;
            }
        };
        self.at = (next != 0).then(|| value + next);
        self.remaining = self.remaining.saturating_sub(1);
        Some(Cursor::new(self.store, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Iterator over `(key, value)` pairs of an object.
#[derive(Debug, Clone)]
pub struct Entries<'t> {
    inner: Children<'t>,
}

impl<'t> Iterator for Entries<'t> {
    type Item = (&'t str, Cursor<'t>);

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        Some((value.key().unwrap_or_default(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Write handle to one node of a tree.
// Lifetime 't is the tree borrow, 'src the parsed source text lifetime
pub struct CursorMut<'t, 'src> {
    store: &'t mut NodeStore<'src>,
    index: usize,
}

impl<'t, 'src> CursorMut<'t, 'src> {
    pub(crate) fn new(store: &'t mut NodeStore<'src>, index: usize) -> Self {
        CursorMut { store, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node_type(&self) -> NodeType {
        self.store.node(self.index).node_type()
    }

    /// Read view of the same node.
    pub fn as_cursor(&self) -> Cursor<'_> {
        Cursor::new(&*self.store, self.index)
    }

    /// Shorter-lived handle to the same node.
    pub fn reborrow(&mut self) -> CursorMut<'_, 'src> {
        CursorMut::new(&mut *self.store, self.index)
    }

    /// Assign a raw node value.
    ///
    /// Allowed when the slot is `null` or already carries the same tag;
    /// anything else is a `TypeMismatch`. Assigning a container resets it to
    /// empty, leaving previous children unreachable. Keys only enter a tree
    /// together with their value, so a `Key` node is always refused.
    pub fn set(&mut self, value: Node) -> Result<()> {
        self.check_assign(value.node_type())?;
        let mut slot = self.store.node(self.index);
        slot.assign(value);
        self.store.replace(self.index, slot);
        Ok(())
    }

    /// Assign a string, copied into the tree's text pool.
    pub fn set_str(&mut self, text: &str) -> Result<()> {
        self.check_assign(NodeType::String)?;
        let node = self.store.string_node(text);
        self.set(node)
    }

    fn check_assign(&self, incoming: NodeType) -> Result<()> {
        let current = self.node_type();
        if incoming == NodeType::Key || (current != NodeType::Null && current != incoming) {
            return Err(Error::mismatch(current, incoming));
        }
        Ok(())
    }

    /// Typed write.
    pub fn write<T: ToNode + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        value.to_node(self)?;
        Ok(self)
    }

    /// Turn the node into an empty array and append elements to it.
    pub fn array(&mut self) -> Result<ArrayBuilder<'_, 'src>> {
        self.set(Node::array())?;
        Ok(ArrayBuilder {
            store: &mut *self.store,
            parent: self.index,
            last: None,
        })
    }

    /// Turn the node into an empty object and append entries to it.
    pub fn object(&mut self) -> Result<ObjectBuilder<'_, 'src>> {
        self.set(Node::object())?;
        Ok(ObjectBuilder {
            store: &mut *self.store,
            parent: self.index,
            last: None,
        })
    }

    /// Write handle to the `k`-th child.
    pub fn at_mut(&mut self, k: usize) -> Result<CursorMut<'_, 'src>> {
        let index = self.as_cursor().at(k)?.index();
        Ok(CursorMut::new(&mut *self.store, index))
    }

    /// Write handle to the value under `key`.
    pub fn get_mut(&mut self, key: &str) -> Result<CursorMut<'_, 'src>> {
        let index = self.as_cursor().get(key)?.index();
        Ok(CursorMut::new(&mut *self.store, index))
    }
}

/// Sequential appender for an array node.
pub struct ArrayBuilder<'t, 'src> {
    store: &'t mut NodeStore<'src>,
    parent: usize,
    last: Option<usize>,
}

impl<'src> ArrayBuilder<'_, 'src> {
    /// Append a `null` element and return a handle to it.
    pub fn element(&mut self) -> CursorMut<'_, 'src> {
        let index = self
            .store
            .add(Some(self.parent), self.last, Node::null());
        self.last = Some(index);
        CursorMut::new(&mut *self.store, index)
    }

    /// Append one element.
    pub fn push<T: ToNode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.to_node(&mut self.element())
    }

    /// Elements appended so far.
    pub fn len(&self) -> usize {
        self.store.node(self.parent).size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sequential appender for an object node.
pub struct ObjectBuilder<'t, 'src> {
    store: &'t mut NodeStore<'src>,
    parent: usize,
    last: Option<usize>,
}

impl<'src> ObjectBuilder<'_, 'src> {
    /// Append a `key: null` entry and return a handle to the value.
    pub fn entry(&mut self, key: &str) -> CursorMut<'_, 'src> {
        let key = self.store.key_node(key);
        let key_index = self.store.add(Some(self.parent), self.last, key);
        let index = self
            .store
            .add(Some(self.parent), Some(key_index), Node::null());
        self.last = Some(index);
        CursorMut::new(&mut *self.store, index)
    }

    /// Append one entry.
    pub fn field<T: ToNode + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        value.to_node(&mut self.entry(key))
    }

    /// Entries appended so far.
    pub fn len(&self) -> usize {
        self.store.node(self.parent).size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
