// SPDX-License-Identifier: Apache-2.0

use crate::binding::{FromNode, ToNode};
use crate::cursor::{Cursor, CursorMut};
use crate::error::{Error, Result};
use crate::formatter;
use crate::node::{Node, NodeType};
use crate::store::NodeStore;

/// Arena index of the root node.
pub const ROOT: usize = 0;

/// A document: one [`NodeStore`] and its root at index `0`.
///
/// A tree produced by [`parse`](crate::parse) borrows the source text for
/// `'src`, because string, key and number nodes point into it instead of
/// copying. Use [`into_owned`](Self::into_owned) to detach it.
///
/// `Tree` is `Send` but not `Sync`: typed reads coerce raw numbers in place,
/// so a tree must not be read from two threads at the same time. The
/// compiler rejects sharing it:
///
/// ```compile_fail
/// let tree = arenajson::parse("[1, 2]").unwrap();
/// std::thread::scope(|s| {
///     s.spawn(|| tree.root().at(0).unwrap().read::<i32>());
///     s.spawn(|| tree.root().at(0).unwrap().read::<f64>());
/// });
/// ```
// Lifetime 'src is the parsed source text lifetime
#[derive(Debug, Clone)]
pub struct Tree<'src> {
    store: NodeStore<'src>,
}

impl Tree<'static> {
    /// A tree holding a single `null` root.
    pub fn new() -> Self {
        let mut store = NodeStore::default();
        store.add(None, None, Node::null());
        Tree { store }
    }

    /// Build a tree from a native value.
    pub fn from_value<T: ToNode + ?Sized>(value: &T) -> Result<Self> {
        let mut tree = Tree::new();
        tree.root_mut().write(value)?;
        Ok(tree)
    }
}

impl Default for Tree<'static> {
    fn default() -> Self {
        Tree::new()
    }
}

impl<'src> Tree<'src> {
    /// Wrap a store whose root is already at index `0`.
    pub(crate) fn from_store(store: NodeStore<'src>) -> Self {
        debug_assert!(!store.is_empty());
        Tree { store }
    }

    pub fn root(&self) -> Cursor<'_> {
        Cursor::new(&self.store, ROOT)
    }

    pub fn root_mut(&mut self) -> CursorMut<'_, 'src> {
        CursorMut::new(&mut self.store, ROOT)
    }

    /// Cursor at an index previously returned by [`add`](Self::add).
    pub fn cursor(&self, index: usize) -> Option<Cursor<'_>> {
        (index < self.store.len()).then(|| Cursor::new(&self.store, index))
    }

    pub fn cursor_mut(&mut self, index: usize) -> Option<CursorMut<'_, 'src>> {
        (index < self.store.len()).then(|| CursorMut::new(&mut self.store, index))
    }

    /// Typed read of the root.
    pub fn read<'t, T: FromNode<'t>>(&'t self) -> Result<T> {
        self.root().read()
    }

    pub fn store(&self) -> &NodeStore<'src> {
        &self.store
    }

    /// Number of nodes in the arena, unreachable ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.store.reserve(additional);
    }

    /// A `String` node whose text is copied into this tree.
    pub fn string_node(&mut self, text: &str) -> Node {
        self.store.string_node(text)
    }

    /// A `Key` node whose text is copied into this tree.
    pub fn key_node(&mut self, text: &str) -> Node {
        self.store.key_node(text)
    }

    /// Append `node` to the array `parent`.
    ///
    /// `previous` must be the current tail of that chain (`None` when the
    /// array is still empty). Checking the tail walks the parent's chain.
    /// Objects take whole entries through [`add_entry`](Self::add_entry), so
    /// an object parent or a `Key` node is a [`Error::BrokenChain`].
    pub fn add(&mut self, parent: usize, previous: Option<usize>, node: Node) -> Result<usize> {
        let parent_type = self.container_type(parent)?;
        if parent_type != NodeType::Array || node.node_type() == NodeType::Key {
            return Err(Error::BrokenChain { parent });
        }
        self.check_tail(parent, previous)?;
        Ok(self.store.add(Some(parent), previous, node))
    }

    /// Append a `key: node` entry to the object `parent`, returning the
    /// value's index. `previous` is the last value of the object, if any.
    pub fn add_entry(
        &mut self,
        parent: usize,
        previous: Option<usize>,
        key: &str,
        node: Node,
    ) -> Result<usize> {
        match self.container_type(parent)? {
            NodeType::Object => {}
            other => return Err(Error::mismatch(NodeType::Object, other)),
        }
        if node.node_type() == NodeType::Key {
            return Err(Error::BrokenChain { parent });
        }
        self.check_tail(parent, previous)?;

        let key = self.store.key_node(key);
        let key_index = self.store.add(Some(parent), previous, key);
        Ok(self.store.add(Some(parent), Some(key_index), node))
    }

    /// Copy the source text in and drop the borrow.
    pub fn into_owned(self) -> Tree<'static> {
        Tree {
            store: self.store.into_owned(),
        }
    }

    /// Pretty-printed JSON text of the whole tree.
    pub fn format(&self) -> String {
        formatter::format(self.root())
    }

    fn container_type(&self, parent: usize) -> Result<NodeType> {
        let node = self.store.get(parent).ok_or(Error::IndexOutOfBounds {
            index: parent,
            len: self.store.len(),
        })?;
        match node.node_type() {
            t if t.is_container() => Ok(t),
            other => Err(Error::EmptyAccess(other)),
        }
    }

    fn check_tail(&self, parent: usize, previous: Option<usize>) -> Result<()> {
        if self.tail(parent) == previous {
            Ok(())
        } else {
            Err(Error::BrokenChain { parent })
        }
    }

    /// Last node of `parent`'s chain.
    fn tail(&self, parent: usize) -> Option<usize> {
        let first = self.store.node(parent).first();
        if first == 0 {
            return None;
        }
        let mut at = parent + first;
        loop {
            match self.store.node(at).next() {
                0 => return Some(at),
                next => at += next,
            }
        }
    }
}

impl core::fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.root(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_new_tree_has_null_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_null());
        assert_eq!(tree.format(), "null");
    }

    #[test]
    fn test_add_builds_array_by_hand() {
        let mut tree = Tree::new();
        tree.root_mut().set(Node::array()).unwrap();
        let a = tree.add(ROOT, None, Node::from(1i32)).unwrap();
        let b = tree.add(ROOT, Some(a), Node::from(2i32)).unwrap();
        let text = tree.string_node("three");
        tree.add(ROOT, Some(b), text).unwrap();

        assert_eq!(tree.root().count(), 3);
        assert_eq!(tree.format(), "[\n    1,\n    2,\n    \"three\"\n]");
    }

    #[test]
    fn test_add_rejects_non_tail_previous() {
        let mut tree = Tree::new();
        tree.root_mut().set(Node::array()).unwrap();
        let a = tree.add(ROOT, None, Node::from(1i32)).unwrap();
        tree.add(ROOT, Some(a), Node::from(2i32)).unwrap();

        assert_eq!(
            tree.add(ROOT, Some(a), Node::from(3i32)),
            Err(Error::BrokenChain { parent: ROOT })
        );
        assert_eq!(
            tree.add(ROOT, None, Node::from(3i32)),
            Err(Error::BrokenChain { parent: ROOT })
        );
    }

    #[test]
    fn test_add_entry_object_pairs() {
        let mut tree = Tree::new();
        tree.root_mut().set(Node::object()).unwrap();
        let v = tree.add_entry(ROOT, None, "a", Node::from(true)).unwrap();
        assert_eq!(tree.root().count(), 1);

        // The tail of an object is its last value
        assert_eq!(
            tree.add_entry(ROOT, Some(v - 1), "b", Node::null()),
            Err(Error::BrokenChain { parent: ROOT })
        );
        let w = tree.add_entry(ROOT, Some(v), "b", Node::null()).unwrap();
        assert_eq!(tree.root().count(), 2);
        assert_eq!(tree.cursor(w).unwrap().key(), Ok("b"));
        assert_eq!(tree.root().get("a").unwrap().read::<bool>(), Ok(true));
    }

    #[test]
    fn test_add_refuses_object_parent() {
        let mut tree = Tree::new();
        tree.root_mut().set(Node::object()).unwrap();
        let key = tree.key_node("a");
        assert_eq!(
            tree.add(ROOT, None, key),
            Err(Error::BrokenChain { parent: ROOT })
        );
        assert_eq!(
            tree.add(ROOT, None, Node::from(1i32)),
            Err(Error::BrokenChain { parent: ROOT })
        );

        // Nothing was threaded in, so the object still reads as empty
        assert_eq!(tree.root().count(), 0);
        assert_eq!(tree.format(), "{}");
        assert_eq!(
            tree.root().get("a").unwrap_err(),
            Error::KeyNotFound("a".into())
        );
        assert_eq!(tree.root().entries().unwrap().count(), 0);
    }

    #[test]
    fn test_add_refuses_key_nodes() {
        let mut tree = parse(r#"[{"a": 1}]"#).unwrap();
        let object = tree.root().at(0).unwrap().index();
        let key = tree.key_node("k");
        assert_eq!(
            tree.add(ROOT, Some(object), key),
            Err(Error::BrokenChain { parent: ROOT })
        );
        let value = tree.root().at(0).unwrap().get("a").unwrap().index();
        assert_eq!(
            tree.add_entry(object, Some(value), "b", key),
            Err(Error::BrokenChain { parent: object })
        );
        assert_eq!(tree.root().count(), 1);
        assert_eq!(tree.root().at(0).unwrap().count(), 1);
    }

    #[test]
    fn test_add_into_scalar_fails() {
        let mut tree = Tree::new();
        assert_eq!(
            tree.add(ROOT, None, Node::null()),
            Err(Error::EmptyAccess(NodeType::Null))
        );
        assert!(matches!(
            tree.add(7, None, Node::null()),
            Err(Error::IndexOutOfBounds { index: 7, .. })
        ));
    }

    #[test]
    fn test_add_entry_on_array_mismatch() {
        let mut tree = parse("[]").unwrap();
        assert_eq!(
            tree.add_entry(ROOT, None, "a", Node::null()),
            Err(Error::mismatch(NodeType::Object, NodeType::Array))
        );
    }

    #[test]
    fn test_refused_add_keeps_builder_nodes_distinct() {
        let mut tree = parse("[{}, []]").unwrap();
        let object = tree.root().at(0).unwrap().index();
        let key = tree.key_node("k");
        assert!(tree.add(object, None, key).is_err());

        {
            let mut root = tree.root_mut();
            let mut second = root.at_mut(1).unwrap();
            second.array().unwrap().push(&7i32).unwrap();
        }
        let element = tree.root().at(1).unwrap().at(0).unwrap();
        assert_eq!(element.read::<i32>(), Ok(7));
        assert_eq!(tree.root().at(0).unwrap().count(), 0);
        assert!(tree.root().at(0).unwrap().find("k").is_none());
        assert_eq!(tree.format(), "[\n    {},\n    [\n        7\n    ]\n]");
    }

    #[test]
    fn test_interleaved_builds_stay_separate() {
        let mut tree = parse("[{}, []]").unwrap();
        let object = tree.root().at(0).unwrap().index();
        let array = tree.root().at(1).unwrap().index();

        let v = tree.add_entry(object, None, "k", Node::from(1i32)).unwrap();
        let e = tree.add(array, None, Node::from(2i32)).unwrap();
        tree.add_entry(object, Some(v), "m", Node::from(3i32)).unwrap();
        tree.add(array, Some(e), Node::from(4i32)).unwrap();

        let root = tree.root();
        let values: Vec<_> = root
            .at(0)
            .unwrap()
            .entries()
            .unwrap()
            .map(|(k, v)| (k, v.read::<i32>().unwrap()))
            .collect();
        assert_eq!(values, [("k", 1), ("m", 3)]);
        assert_eq!(root.at(1).unwrap().read::<Vec<i32>>(), Ok(vec![2, 4]));
    }

    #[test]
    fn test_into_owned_outlives_source() {
        let owned = {
            let text = String::from(r#"{"name": "value", "n": 12}"#);
            parse(&text).unwrap().into_owned()
        };
        assert_eq!(owned.root().get("name").unwrap().as_str(), Ok("value"));
        assert_eq!(owned.root().get("n").unwrap().read::<i32>(), Ok(12));
    }

    #[test]
    fn test_tree_moves_between_threads() {
        let tree = parse("[1.5]").unwrap().into_owned();
        let value = std::thread::spawn(move || tree.root().at(0).unwrap().read::<f64>())
            .join()
            .unwrap();
        assert_eq!(value, Ok(1.5));
    }

    #[test]
    fn test_from_value() {
        let tree = Tree::from_value(&vec![1u8, 2, 3]).unwrap();
        assert_eq!(tree.read::<Vec<u8>>(), Ok(vec![1, 2, 3]));
    }
}
