use std::collections::HashMap;

use crate::dom_builder::{build_dom, insert_tokens};
use crate::tokenizer::tokenize;
use crate::types::{DomError, NodeId, NodeKind};

#[derive(Debug, Clone)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable arena DOM.
///
/// Node 0 is the document root. Nodes are never freed: `detach` only unlinks a
/// subtree, after which its ids still resolve through the structural accessors
/// but not through document-level queries such as [`Document::get_element_by_id`].
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document { doctype: None },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn parse(html: &str) -> Self {
        let tokens = tokenize(html);
        let doc = build_dom(&tokens);
        log::trace!(target: "html", "parsed {} bytes into {} nodes", html.len(), doc.len());
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[NodeId::ROOT.index()].children.is_empty()
    }

    fn record(&self, id: NodeId) -> Result<&NodeRecord, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::MissingNode(id))
    }

    fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::MissingNode(id))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate and append in one step; `parent` must be a container from this arena.
    pub(crate) fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn set_doctype(&mut self, value: String) {
        if let NodeKind::Document { doctype } = &mut self.nodes[NodeId::ROOT.index()].kind {
            *doctype = Some(value);
        }
    }

    pub fn doctype(&self) -> Option<&str> {
        match &self.nodes[NodeId::ROOT.index()].kind {
            NodeKind::Document { doctype } => doctype.as_deref(),
            _ => None,
        }
    }

    // ---- creation ----

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text {
            text: text.to_string(),
        })
    }

    // ---- structure ----

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Parent chain, nearest first, ending at the root (or the top of a detached
    /// subtree).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Distance from the document root; detached subtrees count from their top.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        if id == NodeId::ROOT {
            return true;
        }
        self.ancestors(id).last() == Some(NodeId::ROOT)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element { .. }))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text { .. }))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Value of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Pre-order list of every node below `id` (not including `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_record = self.record(parent)?;
        let child_record = self.record(child)?;
        if !parent_record.kind.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if matches!(child_record.kind, NodeKind::Document { .. }) {
            return Err(DomError::WrongNodeKind(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Move `child` (with its subtree) directly before `before`, which must be a
    /// child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if child == before || self.record(before)?.parent != Some(parent) {
            return Err(DomError::InvalidSibling { parent, before });
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent.index()].children;
        let pos = siblings
            .iter()
            .position(|&k| k == before)
            .ok_or(DomError::InvalidSibling { parent, before })?;
        siblings.insert(pos, child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Unlink `id` from its parent. No-op for detached or unknown nodes.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.index()].children.retain(|&k| k != id);
        self.nodes[id.index()].parent = None;
    }

    pub fn remove_children(&mut self, id: NodeId) {
        let Some(record) = self.nodes.get_mut(id.index()) else {
            return;
        };
        let children = std::mem::take(&mut record.children);
        for child in children {
            self.nodes[child.index()].parent = None;
        }
    }

    /// Replace `id` by its children in its parent, then detach it.
    /// Returns false when `id` has no parent.
    pub fn unwrap(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        let siblings = &mut self.nodes[parent.index()].children;
        let Some(pos) = siblings.iter().position(|&k| k == id) else {
            return false;
        };
        siblings.splice(pos..=pos, children.iter().copied());
        for child in children {
            self.nodes[child.index()].parent = Some(parent);
        }
        self.nodes[id.index()].parent = None;
        true
    }

    /// Merge adjacent text nodes and drop empty ones throughout the subtree.
    pub fn normalize(&mut self, id: NodeId) {
        if self.nodes.get(id.index()).is_none() {
            return;
        }
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            let text = match &self.nodes[child.index()].kind {
                NodeKind::Text { text } => Some(text.clone()),
                _ => None,
            };
            match text {
                Some(text) if text.is_empty() => {
                    self.nodes[child.index()].parent = None;
                }
                Some(text) => {
                    let merged = kept.last().copied().filter(|&prev| self.is_text(prev));
                    if let Some(prev) = merged {
                        if let NodeKind::Text { text: existing } =
                            &mut self.nodes[prev.index()].kind
                        {
                            existing.push_str(&text);
                        }
                        self.nodes[child.index()].parent = None;
                    } else {
                        kept.push(child);
                    }
                }
                None => {
                    self.normalize(child);
                    kept.push(child);
                }
            }
        }
        self.nodes[id.index()].children = kept;
    }

    // ---- content ----

    pub fn set_text(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        match &mut self.record_mut(id)?.kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => {
                text.clear();
                text.push_str(value);
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(id)),
        }
    }

    /// Like the DOM `textContent` setter: containers lose all children and gain a
    /// single text node (none when `value` is empty).
    pub fn set_text_content(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        if !self.record(id)?.kind.allows_children() {
            return self.set_text(id, value);
        }
        self.remove_children(id);
        if !value.is_empty() {
            let text = self.create_text(value);
            self.append_child(id, text)?;
        }
        Ok(())
    }

    /// Replace the children of `id` with the parsed fragment.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        if !self.record(id)?.kind.allows_children() {
            return Err(DomError::InvalidParent(id));
        }
        self.remove_children(id);
        let tokens = tokenize(html);
        insert_tokens(self, id, &tokens);
        Ok(())
    }

    // ---- attributes ----

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.record_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => {
                match attributes
                    .iter_mut()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                {
                    Some((_, v)) => *v = Some(value.to_string()),
                    None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
                }
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(id)),
        }
    }

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.attr(id, "class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let mut value = self.attr(id, "class").unwrap_or("").trim().to_string();
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(class);
        self.set_attr(id, "class", &value)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        if !self.has_class(id, class) {
            return Ok(());
        }
        let value = self
            .classes(id)
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &value)
    }

    // ---- queries ----

    /// First `<body>` element, or the root when the page has none.
    pub fn body(&self) -> NodeId {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some("body"))
            .unwrap_or(NodeId::ROOT)
    }

    /// First connected element, in document order, whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .find(|&node| self.attr(node, "id") == Some(id))
    }

    /// Snapshot of `id` attribute → element for every connected element; the first
    /// element wins on duplicates, as with [`Document::get_element_by_id`].
    pub fn id_index(&self) -> HashMap<&str, NodeId> {
        let mut index = HashMap::new();
        for node in self.descendants(NodeId::ROOT) {
            if let Some(value) = self.attr(node, "id") {
                index.entry(value).or_insert(node);
            }
        }
        index
    }

    /// Connected elements carrying `class`, in document order.
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&node| self.has_class(node, class))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_child_moves_existing_node() {
        let mut doc = Document::parse("<div id=a><b>x</b></div><div id=b></div>");
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        let bold = doc.first_child(a).unwrap();
        doc.append_child(b, bold).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.parent(bold), Some(b));
    }

    #[test]
    fn append_child_rejects_cycles_and_text_parents() {
        let mut doc = Document::parse("<div id=a><p>t</p></div>");
        let a = doc.get_element_by_id("a").unwrap();
        let p = doc.first_child(a).unwrap();
        assert_eq!(
            doc.append_child(p, a),
            Err(DomError::CycleDetected { parent: p, child: a })
        );
        let t = doc.first_child(p).unwrap();
        let extra = doc.create_text("x");
        assert_eq!(doc.append_child(t, extra), Err(DomError::InvalidParent(t)));
    }

    #[test]
    fn insert_before_requires_sibling_under_parent() {
        let mut doc = Document::parse("<p>a</p><p>b</p>");
        let ps = doc.children(NodeId::ROOT).to_vec();
        let span = doc.create_element("span");
        doc.insert_before(ps[0], span, doc.first_child(ps[0]).unwrap())
            .unwrap();
        assert_eq!(doc.outer_html(ps[0]), "<p><span></span>a</p>");
        let stray = doc.first_child(ps[1]).unwrap();
        assert_eq!(
            doc.insert_before(ps[0], span, stray),
            Err(DomError::InvalidSibling {
                parent: ps[0],
                before: stray
            })
        );
    }

    #[test]
    fn unwrap_splices_children_in_place() {
        let mut doc = Document::parse("<p>a<span id=w>b<i>c</i></span>d</p>");
        let w = doc.get_element_by_id("w").unwrap();
        assert!(doc.unwrap(w));
        let p = doc.children(NodeId::ROOT)[0];
        assert_eq!(doc.inner_html(p), "ab<i>c</i>d");
        assert!(!doc.unwrap(w));
        assert_eq!(doc.get_element_by_id("w"), None);
    }

    #[test]
    fn normalize_merges_adjacent_text_and_drops_empty() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(NodeId::ROOT, p).unwrap();
        for t in ["a", "", "b"] {
            let node = doc.create_text(t);
            doc.append_child(p, node).unwrap();
        }
        let i = doc.create_element("i");
        doc.append_child(p, i).unwrap();
        let c = doc.create_text("c");
        doc.append_child(p, c).unwrap();
        doc.normalize(p);
        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.text(doc.children(p)[0]), Some("ab"));
    }

    #[test]
    fn detached_nodes_do_not_resolve_by_id() {
        let mut doc = Document::parse("<div><span id=x>t</span></div>");
        let x = doc.get_element_by_id("x").unwrap();
        doc.detach(x);
        assert!(!doc.is_connected(x));
        assert_eq!(doc.get_element_by_id("x"), None);
        assert_eq!(doc.tag_name(x), Some("span"));
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::parse("<p>a<b>b</b></p>");
        let p = doc.children(NodeId::ROOT)[0];
        doc.set_text_content(p, "z").unwrap();
        assert_eq!(doc.inner_html(p), "z");
        doc.set_text_content(p, "").unwrap();
        assert!(doc.children(p).is_empty());
    }

    #[test]
    fn set_inner_html_parses_fragment() {
        let mut doc = Document::parse("<div id=d>old</div>");
        let d = doc.get_element_by_id("d").unwrap();
        doc.set_inner_html(d, "x<span class=\"h\">&lt;y</span>")
            .unwrap();
        assert_eq!(doc.text_content(d), "x<y");
        assert_eq!(doc.elements_by_class("h").len(), 1);
    }

    #[test]
    fn class_helpers_round_out_the_class_attribute() {
        let mut doc = Document::parse("<span class=\"a  b\"></span>");
        let s = doc.children(NodeId::ROOT)[0];
        doc.add_class(s, "c").unwrap();
        doc.add_class(s, "a").unwrap();
        assert_eq!(doc.attr(s, "class"), Some("a  b c"));
        doc.remove_class(s, "a").unwrap();
        assert_eq!(doc.attr(s, "class"), Some("b c"));
        assert!(doc.has_class(s, "c"));
    }

    #[test]
    fn body_falls_back_to_root() {
        let doc = Document::parse("<p>no body</p>");
        assert_eq!(doc.body(), NodeId::ROOT);
        let doc = Document::parse("<html><body><p>x</p></body></html>");
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert_eq!(doc.depth(doc.body()), 2);
    }
}
