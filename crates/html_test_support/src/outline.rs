use std::fmt::Write;

use html::{Document, NodeId, NodeKind};

#[derive(Clone, Copy, Debug)]
pub struct OutlineOptions {
    /// Replace `id` values that look like v4 UUIDs with `<uuid>` so outlines of
    /// wrapped pages are stable across runs.
    pub mask_uuids: bool,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self { mask_uuids: true }
    }
}

/// One line per node, indented two spaces per level below `root`.
pub fn outline(doc: &Document, root: NodeId, options: OutlineOptions) -> Vec<String> {
    let mut out = Vec::new();
    walk(doc, root, options, 0, &mut out);
    out
}

fn walk(doc: &Document, id: NodeId, options: OutlineOptions, level: usize, out: &mut Vec<String>) {
    let mut line = " ".repeat(level * 2);
    write_node_line(&mut line, doc, id, options);
    out.push(line);
    for &child in doc.children(id) {
        walk(doc, child, options, level + 1, out);
    }
}

fn write_node_line(out: &mut String, doc: &Document, id: NodeId, options: OutlineOptions) {
    let Some(kind) = doc.kind(id) else {
        out.push_str("<missing>");
        return;
    };
    match kind {
        NodeKind::Document { doctype } => {
            out.push_str("#document");
            if let Some(dt) = doctype {
                out.push_str(" doctype=\"");
                write_escaped(out, dt);
                out.push('"');
            }
        }
        NodeKind::Element { name, attributes } => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in attributes {
                out.push(' ');
                out.push_str(attr);
                if let Some(value) = value {
                    out.push_str("=\"");
                    if options.mask_uuids && attr == "id" && looks_like_uuid(value) {
                        out.push_str("<uuid>");
                    } else {
                        write_escaped(out, value);
                    }
                    out.push('"');
                }
            }
            out.push('>');
        }
        NodeKind::Text { text } => {
            out.push('"');
            write_escaped(out, text);
            out.push('"');
        }
        NodeKind::Comment { text } => {
            out.push_str("<!-- ");
            write_escaped(out, text);
            out.push_str(" -->");
        }
    }
}

fn looks_like_uuid(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == 5
        && parts
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(p, n)| p.len() == n && p.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
