// SPDX-License-Identifier: Apache-2.0

use crate::node::NodeType;

/// Errors produced while parsing, navigating or binding a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The stored tag disagrees with the requested one (outside lazy number coercion).
    TypeMismatch { expected: NodeType, found: NodeType },
    /// A fixed-size target does not match the array length.
    ArityMismatch { expected: usize, found: usize },
    /// Object lookup found no entry with this key.
    KeyNotFound(String),
    /// Positional access past the end of a container.
    IndexOutOfBounds { index: usize, len: usize },
    /// Navigation attempted on a node that is not a container.
    EmptyAccess(NodeType),
    /// An append would not continue the parent's chain at its tail, or would
    /// separate an object key from its value.
    BrokenChain { parent: usize },
    /// The parser hit an unexpected byte or the end of input.
    MalformedInput { offset: usize, reason: &'static str },
    /// Containers nest deeper than the configured limit.
    NestingTooDeep { offset: usize, limit: usize },
    /// The input bytes are not valid UTF-8.
    InvalidUtf8(core::str::Utf8Error),
    /// Raw number text could not be converted to the requested kind.
    InvalidNumber { kind: NodeType, text: String },
    /// Text is not a recognizable ISO-8601 date-time.
    InvalidDateTime(String),
    /// No enum variant carries this name or value.
    UnknownVariant(String),
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn mismatch(expected: NodeType, found: NodeType) -> Self {
        Error::TypeMismatch { expected, found }
    }

    /// Byte offset into the source text, for parser errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::MalformedInput { offset, .. } | Error::NestingTooDeep { offset, .. } => {
                Some(*offset)
            }
            Error::InvalidUtf8(e) => Some(e.valid_up_to()),
            _ => None,
        }
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(err: core::str::Utf8Error) -> Self {
        Error::InvalidUtf8(err)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            Error::ArityMismatch { expected, found } => {
                write!(f, "expected {expected} elements, found {found}")
            }
            Error::KeyNotFound(key) => write!(f, "key not found: \"{key}\""),
            Error::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Error::EmptyAccess(t) => write!(f, "cannot navigate into {t} node"),
            Error::BrokenChain { parent } => {
                write!(f, "append does not continue the chain of node {parent}")
            }
            Error::MalformedInput { offset, reason } => {
                write!(f, "malformed input at byte {offset}: {reason}")
            }
            Error::NestingTooDeep { offset, limit } => {
                write!(f, "nesting deeper than {limit} levels at byte {offset}")
            }
            Error::InvalidUtf8(e) => write!(f, "Invalid UTF-8: {e}"),
            Error::InvalidNumber { kind, text } => write!(f, "cannot read \"{text}\" as {kind}"),
            Error::InvalidDateTime(text) => write!(f, "invalid date-time \"{text}\""),
            Error::UnknownVariant(name) => write!(f, "unknown enum variant \"{name}\""),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}
