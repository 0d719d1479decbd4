// SPDX-License-Identifier: Apache-2.0

//! Concrete numeric kinds and the lazy conversion of raw number text.

use core::str::FromStr;

use crate::error::{Error, Result};
use crate::node::{Node, NodeType, Payload};

/// A fixed-width numeric kind that a `number` node can be coerced into.
pub trait Scalar: Copy + FromStr + Into<Node> {
    /// Tag a coerced node carries.
    const TYPE: NodeType;

    /// Extract the value from a payload of this kind.
    fn from_payload(payload: Payload) -> Option<Self>;

    /// Payload holding `self`.
    fn to_payload(self) -> Payload;

    /// Parse raw JSON number text.
    fn parse_number(text: &str) -> Result<Self> {
        text.parse().map_err(|_| Error::InvalidNumber {
            kind: Self::TYPE,
            text: text.to_owned(),
        })
    }
}

/// Generates a [`Scalar`] implementation per numeric kind.
macro_rules! define_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const TYPE: NodeType = NodeType::$variant;

                fn from_payload(payload: Payload) -> Option<Self> {
                    match payload {
                        Payload::$variant(val) => Some(val),
                        _ => None,
                    }
                }

                fn to_payload(self) -> Payload {
                    Payload::$variant(self)
                }
            }
        )*
    };
}

define_scalar!(
    i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32, u32 => U32,
    i64 => I64, u64 => U64, f32 => F32, f64 => F64,
);

/// True when the raw text has no fraction or exponent part.
pub fn is_integer(text: &[u8]) -> bool {
    !text.iter().any(|&b| matches!(b, b'.' | b'e' | b'E'))
}
