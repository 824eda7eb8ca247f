use crate::dom::Document;
use crate::types::NodeId;

/// Collect concatenated text from connected `<style>` elements, in document order.
pub fn collect_style_texts(doc: &Document, out: &mut String) {
    for id in doc.descendants(NodeId::ROOT) {
        if doc.tag_name(id) != Some("style") {
            continue;
        }
        for &child in doc.children(id) {
            if let Some(text) = doc.text(child) {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
}

/// Nearest inclusive ancestor of `id` that is an `<a>` with an `href`.
pub fn closest_link(doc: &Document, id: NodeId) -> Option<(NodeId, &str)> {
    std::iter::once(id)
        .chain(doc.ancestors(id))
        .find_map(|node| match doc.tag_name(node) {
            Some("a") => doc.attr(node, "href").map(|href| (node, href)),
            _ => None,
        })
}
