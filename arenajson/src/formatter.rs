// SPDX-License-Identifier: Apache-2.0

//! Rendering a tree back to JSON text.

use core::fmt::{self, Write};

use crate::cursor::Cursor;
use crate::datetime::DateTime;
use crate::node::{NodeType, Payload};

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    indent: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions { indent: Some(4) }
    }
}

impl FormatOptions {
    /// One member per line, `width` spaces per nesting level.
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Everything on one line, no blanks.
    pub fn compact() -> Self {
        FormatOptions { indent: None }
    }
}

/// Render `node` and everything below it with the default layout.
pub fn format(node: Cursor<'_>) -> String {
    format_with(node, &FormatOptions::default())
}

/// Render `node` and everything below it.
pub fn format_with(node: Cursor<'_>, options: &FormatOptions) -> String {
    let store = node.store();
    let mut out = String::with_capacity(store.len() * 8 + store.text_len());
    // Writing into a String cannot fail
    let _ = write_node(&mut out, node, options, 0);
    out
}

/// Render `node` into any [`fmt::Write`] sink.
pub fn write_node<W: Write>(
    out: &mut W,
    node: Cursor<'_>,
    options: &FormatOptions,
    level: usize,
) -> fmt::Result {
    let payload = node.node().payload();
    match node.node_type() {
        NodeType::Null => out.write_str("null"),
        NodeType::Number => out.write_str(node.as_str().unwrap_or_default()),
        NodeType::String | NodeType::Key => {
            write!(out, "\"{}\"", node.as_str().unwrap_or_default())
        }
        NodeType::Array | NodeType::Object => write_container(out, node, options, level),
        _ => write_payload(out, payload),
    }
}

fn write_payload<W: Write>(out: &mut W, payload: Payload) -> fmt::Result {
    match payload {
        Payload::Bool(v) => write!(out, "{v}"),
        Payload::I8(v) => write!(out, "{v}"),
        Payload::U8(v) => write!(out, "{v}"),
        Payload::I16(v) => write!(out, "{v}"),
        Payload::U16(v) => write!(out, "{v}"),
        Payload::I32(v) => write!(out, "{v}"),
        Payload::U32(v) => write!(out, "{v}"),
        Payload::I64(v) => write!(out, "{v}"),
        Payload::U64(v) => write!(out, "{v}"),
        Payload::F32(v) if v.is_finite() => write!(out, "{v}"),
        Payload::F64(v) if v.is_finite() => write!(out, "{v}"),
        Payload::DateTime(stamp) => write!(out, "\"{}\"", DateTime::from_stamp(stamp)),
        _ => out.write_str("null"),
    }
}

fn write_container<W: Write>(
    out: &mut W,
    node: Cursor<'_>,
    options: &FormatOptions,
    level: usize,
) -> fmt::Result {
    let object = node.node_type() == NodeType::Object;
    let (open, close) = if object { ('{', '}') } else { ('[', ']') };
    let Ok(children) = node.children() else {
        return Ok(());
    };

    out.write_char(open)?;
    if node.count() == 0 {
        return out.write_char(close);
    }
    for (i, child) in children.enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        newline(out, options, level + 1)?;
        if object {
            write!(out, "\"{}\":", child.key().unwrap_or_default())?;
            if options.indent.is_some() {
                out.write_char(' ')?;
            }
        }
        write_node(out, child, options, level + 1)?;
    }
    newline(out, options, level)?;
    out.write_char(close)
}

fn newline<W: Write>(out: &mut W, options: &FormatOptions, level: usize) -> fmt::Result {
    if let Some(width) = options.indent {
        out.write_char('\n')?;
        for _ in 0..width * level {
            out.write_char(' ')?;
        }
    }
    Ok(())
}
