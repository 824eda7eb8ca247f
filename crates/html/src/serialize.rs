use crate::dom::Document;
use crate::tokenizer::is_void_element;
use crate::types::{NodeId, NodeKind};

fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn is_rawtext_parent(doc: &Document, id: NodeId) -> bool {
    doc.parent(id)
        .and_then(|p| doc.tag_name(p))
        .is_some_and(|name| matches!(name, "script" | "style"))
}

impl Document {
    /// Markup for the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Markup for `id` itself and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Concatenated text of every text node below `id` (or the value of a text node).
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        match kind {
            NodeKind::Document { doctype } => {
                if let Some(doctype) = doctype {
                    out.push_str("<!");
                    out.push_str(doctype);
                    out.push('>');
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        escape_attr(value, out);
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_element(name) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Text { text } => {
                if is_rawtext_parent(self, id) {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeKind::Comment { text } => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }
}
