// SPDX-License-Identifier: Apache-2.0

//! The contiguous node arena backing a [`Tree`](crate::Tree).

use core::cell::Cell;

use crate::node::{Node, NodeType, Origin, Payload, TextRef};

/// Append-only arena of nodes plus the text they reference.
///
/// Nodes are addressed by index; an index issued by [`add`](Self::add) stays
/// valid for the lifetime of the store, whatever reallocation the backing
/// `Vec` goes through. Each slot is a [`Cell`] so typed reads can memoize
/// coerced numbers in place through a shared reference. This also makes the
/// store `!Sync`: a tree cannot be read from several threads at once.
// Lifetime 'src is the parsed source text lifetime
#[derive(Debug, Clone)]
pub struct NodeStore<'src> {
    source: &'src str,
    nodes: Vec<Cell<Node>>,
    /// Text written after parsing. Never shrinks, so pool references stay valid.
    pool: String,
}

impl<'src> NodeStore<'src> {
    /// Creates an empty store referencing `source`.
    pub fn new(source: &'src str) -> Self {
        Self::with_capacity(source, 0)
    }

    /// Creates an empty store with room for `capacity` nodes.
    pub fn with_capacity(source: &'src str, capacity: usize) -> Self {
        NodeStore {
            source,
            nodes: Vec::with_capacity(capacity),
            pool: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Reserve room for at least `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    /// The text this store was parsed from.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Bytes of text referenced or owned by the store.
    pub fn text_len(&self) -> usize {
        self.source.len() + self.pool.len()
    }

    /// Copy of the node at `index`.
    pub fn get(&self, index: usize) -> Option<Node> {
        self.nodes.get(index).map(Cell::get)
    }

    pub(crate) fn node(&self, index: usize) -> Node {
        self.nodes[index].get()
    }

    pub(crate) fn replace(&self, index: usize, node: Node) {
        self.nodes[index].set(node);
    }

    pub(crate) fn update(&self, index: usize, f: impl FnOnce(&mut Node)) {
        let cell = &self.nodes[index];
        let mut node = cell.get();
        f(&mut node);
        cell.set(node);
    }

    /// Append `node` and thread it into its container.
    ///
    /// With `previous = Some(p)` the node becomes `p`'s chain successor,
    /// otherwise it is registered as the first chain node of `parent`. A node
    /// with no parent is the root. The parent's count grows by one per array
    /// element and one per object value, so an entry is counted once its
    /// value is in place.
    ///
    /// No structural validation happens here; [`Tree::add`](crate::Tree::add)
    /// is the checked entry point.
    ///
    /// # Panics
    ///
    /// Panics if `parent` or `previous` is not an index of this store.
    pub fn add(&mut self, parent: Option<usize>, previous: Option<usize>, node: Node) -> usize {
        let node = match node.node_type() {
            NodeType::Array => Node::array(),
            NodeType::Object => Node::object(),
            _ => {
                let mut node = node;
                node.set_next(0);
                node
            }
        };

        let index = self.nodes.len();
        self.nodes.push(Cell::new(node));

        match (parent, previous) {
            (_, Some(prev)) => self.update(prev, |n| n.set_next(index - prev)),
            (Some(parent), None) => self.update(parent, |n| n.set_first(index - parent)),
            (None, None) => {}
        }

        if let Some(parent) = parent {
            let counted = match self.node(parent).node_type() {
                NodeType::Array => true,
                NodeType::Object => previous
                    .is_some_and(|prev| self.node(prev).node_type() == NodeType::Key),
                _ => false,
            };
            if counted {
                self.update(parent, Node::bump_size);
            }
        }
        index
    }

    /// Store a copy of `text` in the pool.
    pub fn intern(&mut self, text: &str) -> TextRef {
        let start = self.pool.len();
        self.pool.push_str(text);
        TextRef {
            origin: Origin::Pool,
            start,
        }
    }

    /// A `String` node holding a pooled copy of `text`.
    pub fn string_node(&mut self, text: &str) -> Node {
        let text_ref = self.intern(text);
        Node::text(NodeType::String, text_ref, text.len())
    }

    /// A `Key` node holding a pooled copy of `text`.
    pub fn key_node(&mut self, text: &str) -> Node {
        let text_ref = self.intern(text);
        Node::text(NodeType::Key, text_ref, text.len())
    }

    /// Text referenced by a `String`, `Key` or `Number` node.
    pub fn text(&self, node: &Node) -> Option<&str> {
        let text = node.text_ref()?;
        let buf = match text.origin {
            Origin::Source => self.source,
            Origin::Pool => self.pool.as_str(),
        };
        buf.get(text.start..text.start + node.size())
    }

    /// Copy the source text into the pool, detaching the store from `'src`.
    pub fn into_owned(self) -> NodeStore<'static> {
        let NodeStore {
            source,
            nodes,
            mut pool,
        } = self;

        let base = pool.len();
        pool.push_str(source);
        for cell in &nodes {
            let mut node = cell.get();
            if let Payload::Text(TextRef {
                origin: Origin::Source,
                start,
            }) = node.payload()
            {
                node.set_text(TextRef {
                    origin: Origin::Pool,
                    start: start + base,
                });
                cell.set(node);
            }
        }

        NodeStore {
            source: "",
            nodes,
            pool,
        }
    }
}

impl Default for NodeStore<'_> {
    fn default() -> Self {
        NodeStore::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_threads_array_chain() {
        let mut store = NodeStore::default();
        let root = store.add(None, None, Node::array());
        let a = store.add(Some(root), None, Node::from(1i32));
        let b = store.add(Some(root), Some(a), Node::from(2i32));

        assert_eq!(store.node(root).size(), 2);
        assert_eq!(store.node(root).first(), a - root);
        assert_eq!(store.node(a).next(), b - a);
        assert_eq!(store.node(b).next(), 0);
    }

    #[test]
    fn test_object_counts_entries() {
        let mut store = NodeStore::default();
        let root = store.add(None, None, Node::object());
        let key = store.key_node("a");
        let k = store.add(Some(root), None, key);
        assert_eq!(store.node(root).size(), 0);
        let v = store.add(Some(root), Some(k), Node::from(true));

        assert_eq!(store.node(root).size(), 1);
        assert_eq!(v, k + 1);
        assert_eq!(store.node(k).next(), 1);
    }

    #[test]
    fn test_indices_survive_growth() {
        let mut store = NodeStore::with_capacity("", 1);
        let root = store.add(None, None, Node::array());
        let mut prev = None;
        for i in 0..1000u32 {
            prev = Some(store.add(Some(root), prev, Node::from(i)));
        }
        assert!(store.capacity() >= 1001);
        assert_eq!(store.get(500).map(|n| n.payload()), Some(Payload::U32(499)));
    }

    #[test]
    fn test_source_and_pool_text() {
        let source = "\"abc\"";
        let mut store = NodeStore::new(source);
        let parsed = Node::text(
            NodeType::String,
            TextRef {
                origin: Origin::Source,
                start: 1,
            },
            3,
        );
        let pooled = store.string_node("xyz");

        assert_eq!(store.text(&parsed), Some("abc"));
        assert_eq!(store.text(&pooled), Some("xyz"));
        assert_eq!(store.text(&Node::from(1u8)), None);
        assert_eq!(store.text_len(), 8);
    }

    #[test]
    fn test_into_owned_rebases_source_text() {
        let source = String::from("[\"abc\"]");
        let owned = {
            let mut store = NodeStore::new(&source);
            store.intern("pre");
            let root = store.add(None, None, Node::array());
            let text = TextRef {
                origin: Origin::Source,
                start: 2,
            };
            store.add(Some(root), None, Node::text(NodeType::String, text, 3));
            store.into_owned()
        };
        drop(source);

        assert_eq!(owned.source(), "");
        assert_eq!(owned.text(&owned.node(1)), Some("abc"));
    }
}
