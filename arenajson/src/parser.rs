// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent parser from JSON text into a [`Tree`].
//!
//! The parser never copies text: string, key and number nodes reference the
//! source directly. Escape sequences are skipped, not decoded, and numbers
//! are stored untyped until first read.

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::node::{Node, NodeType, Origin, TextRef};
use crate::store::NodeStore;
use crate::tree::Tree;

/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default bytes of input per pre-reserved node.
pub const DEFAULT_RESERVE_RATIO: usize = 10;

/// Parser configuration.
///
/// ```
/// use arenajson::{parse_with, ParseOptions};
///
/// let options = ParseOptions::default().max_depth(2).allow_trailing(true);
/// let tree = parse_with("[[1]] trailing", &options).unwrap();
/// assert_eq!(tree.root().count(), 1);
/// assert!(parse_with("[[[1]]]", &options).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    max_depth: usize,
    allow_trailing: bool,
    reserve_ratio: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_trailing: false,
            reserve_ratio: DEFAULT_RESERVE_RATIO,
        }
    }
}

impl ParseOptions {
    /// Maximum number of nested arrays and objects.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Accept (and ignore) any text after the top-level value.
    pub fn allow_trailing(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }

    /// Reserve one node per `ratio` bytes of input before parsing. `0` disables it.
    pub fn reserve_ratio(mut self, ratio: usize) -> Self {
        self.reserve_ratio = ratio;
        self
    }
}

/// Parse `text` with default options.
///
/// ```
/// let tree = arenajson::parse(r#"{"a": "hello", "b": [1, 2, 3]}"#).unwrap();
/// let b: [i32; 3] = tree.root().get("b").unwrap().read().unwrap();
/// assert_eq!(b, [1, 2, 3]);
/// ```
pub fn parse(text: &str) -> Result<Tree<'_>> {
    parse_with(text, &ParseOptions::default())
}

/// Parse `text` with explicit options.
pub fn parse_with<'src>(text: &'src str, options: &ParseOptions) -> Result<Tree<'src>> {
    let reserve = text.len().checked_div(options.reserve_ratio).unwrap_or(0);
    trace!("parsing {} bytes, reserving {} nodes", text.len(), reserve);

    let mut parser = Parser {
        source_len: text.len(),
        rest: text,
        depth: 0,
        options,
        store: NodeStore::with_capacity(text, reserve),
    };
    parser.value(None, None)?;

    parser.skip_blanks();
    if !parser.rest.is_empty() && !options.allow_trailing {
        return Err(parser.malformed("unexpected trailing characters"));
    }
    Ok(Tree::from_store(parser.store))
}

/// Parse UTF-8 bytes, failing with [`Error::InvalidUtf8`] on invalid input.
pub fn parse_slice(bytes: &[u8]) -> Result<Tree<'_>> {
    parse(core::str::from_utf8(bytes)?)
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn ends_number(b: u8) -> bool {
    matches!(b, b',' | b'}' | b']') || is_blank(b)
}

struct Parser<'src, 'o> {
    source_len: usize,
    rest: &'src str,
    depth: usize,
    options: &'o ParseOptions,
    store: NodeStore<'src>,
}

impl<'src> Parser<'src, '_> {
    fn offset(&self) -> usize {
        self.source_len - self.rest.len()
    }

    fn malformed(&self, reason: &'static str) -> Error {
        let offset = self.offset();
        debug!("parse failed at byte {}: {}", offset, reason);
        Error::MalformedInput { offset, reason }
    }

    fn skip_blanks(&mut self) {
        self.rest = self.rest.trim_start_matches(|c: char| c.is_ascii() && is_blank(c as u8));
    }

    /// Next non-blank byte, left in place.
    fn peek(&mut self) -> Option<u8> {
        self.skip_blanks();
        self.rest.as_bytes().first().copied()
    }

    /// Consume `n` ASCII bytes.
    fn bump(&mut self, n: usize) {
        self.rest = &self.rest[n..];
    }

    fn expect(&mut self, byte: u8, reason: &'static str) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.bump(1);
                Ok(())
            }
            _ => Err(self.malformed(reason)),
        }
    }

    fn value(&mut self, parent: Option<usize>, previous: Option<usize>) -> Result<usize> {
        match self.peek() {
            Some(b'[') => self.array(parent, previous),
            Some(b'{') => self.object(parent, previous),
            Some(b'"') => self.text(NodeType::String, parent, previous),
            Some(b'+' | b'-' | b'0'..=b'9') => self.number(parent, previous),
            Some(b'n') => self.literal("null", Node::null(), parent, previous),
            Some(b't') => self.literal("true", Node::from(true), parent, previous),
            Some(b'f') => self.literal("false", Node::from(false), parent, previous),
            Some(_) => Err(self.malformed("expected value")),
            None => Err(self.malformed("unexpected end of input")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            let offset = self.offset();
            let limit = self.options.max_depth;
            debug!("parse failed at byte {}: nesting deeper than {}", offset, limit);
            return Err(Error::NestingTooDeep { offset, limit });
        }
        Ok(())
    }

    fn array(&mut self, parent: Option<usize>, previous: Option<usize>) -> Result<usize> {
        self.enter()?;
        let index = self.store.add(parent, previous, Node::array());
        self.bump(1);

        if self.peek() == Some(b']') {
            self.bump(1);
        } else {
            let mut last = None;
            loop {
                last = Some(self.value(Some(index), last)?);
                match self.peek() {
                    Some(b',') => self.bump(1),
                    Some(b']') => {
                        self.bump(1);
                        break;
                    }
                    _ => return Err(self.malformed("expected ',' or ']'")),
                }
            }
        }
        self.depth -= 1;
        Ok(index)
    }

    fn object(&mut self, parent: Option<usize>, previous: Option<usize>) -> Result<usize> {
        self.enter()?;
        let index = self.store.add(parent, previous, Node::object());
        self.bump(1);

        if self.peek() == Some(b'}') {
            self.bump(1);
        } else {
            let mut last = None;
            loop {
                if self.peek() != Some(b'"') {
                    return Err(self.malformed("expected key"));
                }
                let key = self.text(NodeType::Key, Some(index), last)?;
                self.expect(b':', "expected ':'")?;
                last = Some(self.value(Some(index), Some(key))?);
                match self.peek() {
                    Some(b',') => self.bump(1),
                    Some(b'}') => {
                        self.bump(1);
                        break;
                    }
                    _ => return Err(self.malformed("expected ',' or '}'")),
                }
            }
        }
        self.depth -= 1;
        Ok(index)
    }

    /// A quoted string or key. The body is kept verbatim, escapes included.
    fn text(
        &mut self,
        node_type: NodeType,
        parent: Option<usize>,
        previous: Option<usize>,
    ) -> Result<usize> {
        self.bump(1);
        let start = self.offset();
        let bytes = self.rest.as_bytes();
        let mut len = 0;
        loop {
            match bytes.get(len) {
                Some(b'"') => break,
                Some(b'\\') => len += 2,
                Some(_) => len += 1,
                None => {
                    self.rest = "";
                    return Err(self.malformed("unterminated string"));
                }
            }
        }

        let text = TextRef {
            origin: Origin::Source,
            start,
        };
        let index = self
            .store
            .add(parent, previous, Node::text(node_type, text, len));
        self.bump(len + 1);
        Ok(index)
    }

    fn number(&mut self, parent: Option<usize>, previous: Option<usize>) -> Result<usize> {
        let start = self.offset();
        let len = self
            .rest
            .bytes()
            .position(ends_number)
            .unwrap_or(self.rest.len());
        let digits = &self.rest.as_bytes()[..len];
        if !digits
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
        {
            return Err(self.malformed("invalid number"));
        }

        let text = TextRef {
            origin: Origin::Source,
            start,
        };
        let index = self
            .store
            .add(parent, previous, Node::text(NodeType::Number, text, len));
        self.bump(len);
        Ok(index)
    }

    fn literal(
        &mut self,
        word: &'static str,
        node: Node,
        parent: Option<usize>,
        previous: Option<usize>,
    ) -> Result<usize> {
        if !self.rest.starts_with(word) {
            return Err(self.malformed("invalid literal"));
        }
        let index = self.store.add(parent, previous, node);
        self.bump(word.len());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn malformed_at(text: &str) -> Option<usize> {
        match parse(text) {
            Err(Error::MalformedInput { offset, .. }) => Some(offset),
            _ => None,
        }
    }

    #[test]
    fn test_scalar_roots() {
        let tree = parse("true").unwrap();
        assert_eq!(tree.root().node_type(), NodeType::Boolean);
        assert_eq!(tree.len(), 1);

        assert_eq!(parse(" null ").unwrap().root().node_type(), NodeType::Null);
        assert_eq!(parse("false").unwrap().root().read::<bool>(), Ok(false));
        assert_eq!(parse("-12.5e3").unwrap().root().as_str(), Ok("-12.5e3"));
        assert_eq!(parse(r#""hi""#).unwrap().root().as_str(), Ok("hi"));
    }

    #[test]
    fn test_nested_document() {
        let tree = parse(r#"{"a":"hello","b":[1,2,3]}"#).unwrap();
        let root = tree.root();
        assert_eq!(root.node_type(), NodeType::Object);
        assert_eq!(root.count(), 2);
        assert_eq!(root.get("a").unwrap().as_str(), Ok("hello"));

        let b = root.get("b").unwrap();
        assert_eq!(b.count(), 3);
        assert_eq!(b.at(0).unwrap().node_type(), NodeType::Number);
        assert_eq!(b.at(2).unwrap().read::<i32>(), Ok(3));
        assert_eq!(b.at(2).unwrap().node_type(), NodeType::I32);
    }

    #[test]
    fn test_blanks_everywhere() {
        let tree = parse("\n\t{ \"k\" :\r\n [ 1 , 2 ] }\n").unwrap();
        assert_eq!(tree.root().get("k").unwrap().count(), 2);
    }

    #[test]
    fn test_empty_containers() {
        let tree = parse("[[], {}, [ ], { }]").unwrap();
        let kinds: Vec<_> = tree
            .root()
            .children()
            .unwrap()
            .map(|c| (c.node_type(), c.count()))
            .collect();
        assert_eq!(
            kinds,
            [
                (NodeType::Array, 0),
                (NodeType::Object, 0),
                (NodeType::Array, 0),
                (NodeType::Object, 0)
            ]
        );
    }

    #[test]
    fn test_escapes_kept_verbatim() {
        let tree = parse(r#"["a\"b", "c\\"]"#).unwrap();
        assert_eq!(tree.root().at(0).unwrap().as_str(), Ok(r#"a\"b"#));
        assert_eq!(tree.root().at(1).unwrap().as_str(), Ok(r"c\\"));
    }

    #[test]
    fn test_missing_value_offset() {
        assert_eq!(malformed_at(r#"{"a": }"#), Some(6));
        assert_eq!(malformed_at(""), Some(0));
        assert_eq!(malformed_at("   "), Some(3));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(malformed_at("[1 2]"), Some(3));
        assert_eq!(malformed_at("[1,"), Some(3));
        assert_eq!(malformed_at("{1: 2}"), Some(1));
        assert_eq!(malformed_at(r#"{"a" 1}"#), Some(5));
        assert_eq!(malformed_at(r#"{"a": 1"#), Some(7));
        assert_eq!(malformed_at(r#"["open"#), Some(6));
        assert_eq!(malformed_at("nul"), Some(0));
        assert_eq!(malformed_at("[tru]"), Some(1));
        assert_eq!(malformed_at("@"), Some(0));
    }

    #[test]
    fn test_number_terminators() {
        let tree = parse("[1,2]").unwrap();
        assert_eq!(tree.root().at(0).unwrap().as_str(), Ok("1"));

        let tree = parse(r#"{"n":-0.5}"#).unwrap();
        assert_eq!(tree.root().get("n").unwrap().as_str(), Ok("-0.5"));

        assert_eq!(malformed_at("[12x]"), Some(1));
        assert_eq!(malformed_at("[1:2]"), Some(1));
    }

    #[test]
    fn test_trailing_content() {
        assert_eq!(malformed_at("{} x"), Some(3));
        assert_eq!(malformed_at("1 2"), Some(2));
        assert!(parse("{}   \n").is_ok());

        let options = ParseOptions::default().allow_trailing(true);
        let tree = parse_with("{} x", &options).unwrap();
        assert_eq!(tree.root().node_type(), NodeType::Object);
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions::default().max_depth(3);
        assert!(parse_with("[[[1]]]", &options).is_ok());
        assert_eq!(
            parse_with("[[[[1]]]]", &options).unwrap_err(),
            Error::NestingTooDeep {
                offset: 3,
                limit: 3
            }
        );

        let deep = "[".repeat(DEFAULT_MAX_DEPTH + 1);
        assert!(matches!(
            parse(&deep),
            Err(Error::NestingTooDeep { limit: DEFAULT_MAX_DEPTH, .. })
        ));
    }

    #[test]
    fn test_reserve_ratio() {
        let text = format!("[{}]", vec!["1"; 50].join(","));
        let tree = parse(&text).unwrap();
        assert!(tree.capacity() >= text.len() / DEFAULT_RESERVE_RATIO);
        assert_eq!(tree.len(), 51);

        let tree = parse_with(&text, &ParseOptions::default().reserve_ratio(0)).unwrap();
        assert_eq!(tree.root().count(), 50);
    }

    #[test]
    fn test_parse_slice_validates_utf8() {
        assert!(parse_slice(br#"["ok"]"#).is_ok());
        let bytes = [b'"', 0xff, b'"'];
        assert!(matches!(parse_slice(&bytes), Err(Error::InvalidUtf8(_))));
    }

    #[test]
    fn test_unicode_text() {
        let tree = parse(r#"{"clé": "värde ✓"}"#).unwrap();
        assert_eq!(tree.root().get("clé").unwrap().as_str(), Ok("värde ✓"));
    }
}
