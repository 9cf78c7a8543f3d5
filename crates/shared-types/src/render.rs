//! XML-style rendering of nodes for logs and error messages.
//!
//! Binary content that is not printable UTF-8 is rendered as hex.

use crate::node::{Node, NodeContent};
use std::fmt::{self, Write};

impl Node {
    /// Render the node as a compact XML string.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_node(&mut out, self);
        out
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self)
    }
}

fn write_node<W: Write>(out: &mut W, node: &Node) -> fmt::Result {
    write!(out, "<{}", node.tag)?;
    for (key, value) in &node.attrs {
        write!(out, " {}=\"{}\"", key, escape(&value.to_string()))?;
    }
    match &node.content {
        NodeContent::None => out.write_str("/>"),
        NodeContent::Nodes(children) => {
            out.write_char('>')?;
            for child in children {
                write_node(out, child)?;
            }
            write!(out, "</{}>", node.tag)
        }
        NodeContent::Bytes(bytes) => {
            out.write_char('>')?;
            match printable(bytes) {
                Some(text) => out.write_str(&escape(text))?,
                None => out.write_str(&hex::encode(bytes))?,
            }
            write!(out, "</{}>", node.tag)
        }
    }
}

fn printable(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    if text
        .chars()
        .all(|c| !c.is_control() || c == '\n' || c == '\t')
    {
        Some(text)
    } else {
        None
    }
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
