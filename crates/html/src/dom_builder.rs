use crate::dom::Document;
use crate::types::{NodeId, NodeKind, Token};

pub fn build_dom(tokens: &[Token]) -> Document {
    let mut doc = Document::new();
    insert_tokens(&mut doc, NodeId::ROOT, tokens);
    doc
}

/// Append the tree described by `tokens` under `parent`.
///
/// End tags pop the open-element stack to the nearest element with the same
/// name; end tags with no open match are ignored, and the stack never pops past
/// `parent`.
pub(crate) fn insert_tokens(doc: &mut Document, parent: NodeId, tokens: &[Token]) {
    let mut open_elements: Vec<NodeId> = Vec::new();

    for token in tokens {
        let current = open_elements.last().copied().unwrap_or(parent);
        match token {
            Token::Doctype(s) => {
                if parent == NodeId::ROOT {
                    doc.set_doctype(s.clone());
                }
            }
            Token::Comment(c) => {
                doc.push_child(current, NodeKind::Comment { text: c.clone() });
            }
            Token::Text(txt) => {
                if !txt.is_empty() {
                    doc.push_child(current, NodeKind::Text { text: txt.clone() });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let id = doc.push_child(
                    current,
                    NodeKind::Element {
                        name: name.clone(),
                        attributes: attributes.clone(),
                    },
                );
                if !*self_closing {
                    open_elements.push(id);
                }
            }
            Token::EndTag(name) => {
                let Some(pos) = open_elements
                    .iter()
                    .rposition(|&id| doc.tag_name(id) == Some(name.as_str()))
                else {
                    continue;
                };
                open_elements.truncate(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tokenizer::tokenize;

    use super::*;

    #[test]
    fn end_tag_pops_to_nearest_match() {
        let doc = build_dom(&tokenize("<div><p><b>x</div>y"));
        let body = doc.children(NodeId::ROOT).to_vec();
        assert_eq!(body.len(), 2);
        assert_eq!(doc.tag_name(body[0]), Some("div"));
        assert_eq!(doc.text(body[1]), Some("y"));
    }

    #[test]
    fn unmatched_end_tag_is_ignored() {
        let doc = build_dom(&tokenize("<p>a</span>b</p>"));
        let p = doc.children(NodeId::ROOT)[0];
        assert_eq!(doc.children(p).len(), 2);
        assert_eq!(doc.text_content(p), "ab");
    }

    #[test]
    fn void_elements_do_not_nest() {
        let doc = build_dom(&tokenize("<p>a<br>b</p>"));
        let p = doc.children(NodeId::ROOT)[0];
        let kids = doc.children(p);
        assert_eq!(kids.len(), 3);
        assert!(doc.children(kids[1]).is_empty());
    }

    #[test]
    fn doctype_is_recorded_on_root() {
        let doc = build_dom(&tokenize("<!DOCTYPE html><html></html>"));
        assert_eq!(doc.doctype(), Some("DOCTYPE html"));
    }
}
