use core_types::{DocumentModel, Group, TextNodeRef};
use css::StyleContext;
use html::{Document, DomError, Filter, NodeId, TreeWalker, decode_entities};
use uuid::Uuid;

/// Inline style of the wrapper injected around every retained text node.
pub const WRAPPER_STYLE: &str = "all: unset;";

/// Subtrees whose text is never searchable.
fn searchable(doc: &Document, id: NodeId) -> Filter {
    match doc.tag_name(id) {
        Some("script" | "noscript" | "style" | "textarea" | "math") => Filter::Reject,
        Some(_) => Filter::Accept,
        None if doc.is_text(id) => Filter::Accept,
        None => Filter::Reject,
    }
}

/// A flag that holds for the subtree below the depth that raised it.
#[derive(Debug, Default)]
struct ScopedFlag {
    depth: Option<usize>,
}

impl ScopedFlag {
    fn is_active(&self) -> bool {
        self.depth.is_some()
    }

    /// Leave the scope once the walk is back at or above the raising depth, then
    /// raise it again if `applies` holds for the node at `depth`.
    fn update(&mut self, depth: usize, applies: bool) {
        if self.depth.is_some_and(|raised| depth <= raised) {
            self.depth = None;
        }
        if self.depth.is_none() && applies {
            self.depth = Some(depth);
        }
    }
}

/// Depths at which the currently open block-level elements sit.
#[derive(Debug, Default)]
struct BlockLevels(Vec<usize>);

impl BlockLevels {
    /// True when a node at `depth` is a sibling or ancestor of the innermost block.
    fn closes(&self, depth: usize) -> bool {
        self.0.last().is_some_and(|&top| depth <= top)
    }

    fn unwind(&mut self, depth: usize) {
        while self.closes(depth) {
            self.0.pop();
        }
    }

    fn open(&mut self, depth: usize) {
        self.0.push(depth);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// A block boundary was crossed; the running group ends here.
    Break,
    Text {
        node: NodeId,
        text: String,
        preformatted: bool,
    },
}

/// Turns a depth-tracked walk of the body into text segments and block breaks.
pub(crate) struct Segmenter<'a> {
    doc: &'a Document,
    walker: TreeWalker<'a, fn(&Document, NodeId) -> Filter>,
    styles: StyleContext<'a>,
    blocks: BlockLevels,
    preformatted: ScopedFlag,
    hidden: ScopedFlag,
    /// Set right after a block boundary; leading whitespace of the next text is dropped.
    boundary: bool,
    revisit: Option<(NodeId, usize)>,
}

impl<'a> Segmenter<'a> {
    pub(crate) fn new(doc: &'a Document) -> Self {
        let filter: fn(&Document, NodeId) -> Filter = searchable;
        Self {
            doc,
            walker: TreeWalker::new(doc, doc.body(), filter),
            styles: StyleContext::new(doc),
            blocks: BlockLevels::default(),
            preformatted: ScopedFlag::default(),
            hidden: ScopedFlag::default(),
            boundary: false,
            revisit: None,
        }
    }

    fn visit(&mut self, node: NodeId, depth: usize) -> Option<Segment> {
        let preformatted = self.styles.is_preformatted(node);
        self.preformatted.update(depth, preformatted);
        let hidden = self.styles.is_hidden(node);
        self.hidden.update(depth, hidden);
        if self.hidden.is_active() {
            return None;
        }
        if self.doc.is_element(node) {
            self.visit_element(node, depth)
        } else {
            self.visit_text(node, depth)
        }
    }

    fn visit_element(&mut self, node: NodeId, depth: usize) -> Option<Segment> {
        let inline = self.styles.is_inline(node);
        if self.blocks.closes(depth) {
            self.blocks.unwind(depth);
            if !inline {
                self.blocks.open(depth);
            }
        } else if !inline {
            self.blocks.open(depth);
        } else {
            self.boundary = false;
            return None;
        }
        self.boundary = true;
        Some(Segment::Break)
    }

    fn visit_text(&mut self, node: NodeId, depth: usize) -> Option<Segment> {
        if self.blocks.closes(depth) {
            // Leaving a block: end the group, then take this node again.
            self.blocks.unwind(depth);
            self.boundary = true;
            self.revisit = Some((node, depth));
            return Some(Segment::Break);
        }
        let raw = self.doc.text(node).unwrap_or_default();
        let preformatted = self.preformatted.is_active();
        if !preformatted && is_collapsible(raw) && raw.len() != 1 {
            return None;
        }
        if raw == "\n" {
            return None;
        }
        let text = format_text(raw, preformatted, self.boundary);
        if text.is_empty() {
            return None;
        }
        self.boundary = false;
        Some(Segment::Text {
            node,
            text,
            preformatted,
        })
    }
}

impl Iterator for Segmenter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        loop {
            let (node, depth) = self.revisit.take().or_else(|| self.walker.next())?;
            if let Some(segment) = self.visit(node, depth) {
                return Some(segment);
            }
        }
    }
}

fn is_collapsible_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | ' ')
}

fn is_collapsible(text: &str) -> bool {
    text.chars().all(is_collapsible_char)
}

/// Decode, then (outside preformatted text) collapse whitespace runs to one space.
fn format_text(raw: &str, preformatted: bool, after_boundary: bool) -> String {
    let decoded = decode_entities(raw);
    if preformatted {
        return decoded;
    }
    let mut out = String::with_capacity(decoded.len());
    let mut in_run = false;
    for ch in decoded.chars() {
        if is_collapsible_char(ch) {
            if !in_run && !(after_boundary && out.is_empty()) {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

#[derive(Debug, Default)]
struct PendingGroup {
    nodes: Vec<(NodeId, String)>,
    preformatted: bool,
}

fn collect_groups(doc: &Document) -> Vec<PendingGroup> {
    let mut groups = Vec::new();
    let mut current = PendingGroup::default();
    for segment in Segmenter::new(doc) {
        match segment {
            Segment::Break => {
                if !current.nodes.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
            }
            Segment::Text {
                node,
                text,
                preformatted,
            } => {
                current.nodes.push((node, text));
                current.preformatted = preformatted;
            }
        }
    }
    if !current.nodes.is_empty() {
        groups.push(current);
    }
    groups
}

/// Move `node` into a fresh wrapper `<span>` at its position; returns the wrapper id.
fn wrap_text_node(doc: &mut Document, node: NodeId) -> Result<String, DomError> {
    let parent = doc.parent(node).ok_or(DomError::MissingNode(node))?;
    let uuid = Uuid::new_v4().to_string();
    let wrapper = doc.create_element("span");
    doc.set_attr(wrapper, "style", WRAPPER_STYLE)?;
    doc.set_attr(wrapper, "id", &uuid)?;
    doc.insert_before(parent, wrapper, node)?;
    doc.append_child(wrapper, node)?;
    Ok(uuid)
}

/// Build the document model of the page's visible text and wrap every retained
/// text node so it can be addressed by id later.
///
/// The walk reads the tree first and only then injects wrappers, so the walk
/// never observes its own edits.
pub fn build_document_model(doc: &mut Document) -> DocumentModel {
    let pending = collect_groups(doc);
    let mut model = DocumentModel::default();

    for pending_group in pending {
        let group_index = model.groups.len();
        let mut group = Group {
            nodes: Vec::with_capacity(pending_group.nodes.len()),
            preformatted: pending_group.preformatted,
        };
        for (node, text) in pending_group.nodes {
            match wrap_text_node(doc, node) {
                Ok(element_uuid) => group.nodes.push(TextNodeRef {
                    group_index,
                    text,
                    element_uuid,
                }),
                Err(err) => log::warn!(target: "content.parser", "cannot wrap text node: {err}"),
            }
        }
        if group.is_empty() {
            continue;
        }
        log::trace!(
            target: "content.parser",
            "group {group_index}: {} node(s), preformatted={}",
            group.nodes.len(),
            group.preformatted
        );
        model.groups.push(group);
    }

    log::debug!(
        target: "content.parser",
        "document model: {} group(s), {} node(s)",
        model.len(),
        model.node_count()
    );
    model
}

/// Remove the wrappers named by `uuids`, putting their children back in place.
///
/// Ids that no longer resolve are skipped, so restoring twice is harmless.
/// Returns how many wrappers were removed.
pub fn restore_wrappers(doc: &mut Document, uuids: &[String]) -> usize {
    let targets: Vec<NodeId> = {
        let index = doc.id_index();
        uuids
            .iter()
            .filter_map(|uuid| {
                let found = index.get(uuid.as_str()).copied();
                if found.is_none() {
                    log::trace!(target: "content.parser", "wrapper {uuid} is gone");
                }
                found
            })
            .collect()
    };

    let mut parents: Vec<NodeId> = Vec::new();
    let mut restored = 0;
    for wrapper in targets {
        let Some(parent) = doc.parent(wrapper) else {
            continue;
        };
        if doc.unwrap(wrapper) {
            restored += 1;
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
    }
    for parent in parents {
        doc.normalize(parent);
    }

    if restored < uuids.len() {
        log::warn!(
            target: "content.parser",
            "restored {restored} of {} wrapper(s)",
            uuids.len()
        );
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(model: &DocumentModel) -> Vec<Vec<String>> {
        model
            .groups
            .iter()
            .map(|g| g.nodes.iter().map(|n| n.text.clone()).collect())
            .collect()
    }

    fn model_of(html: &str) -> (Document, DocumentModel) {
        let mut doc = Document::parse(html);
        let model = build_document_model(&mut doc);
        (doc, model)
    }

    #[test]
    fn paragraphs_form_groups_and_inline_text_joins() {
        let (_, model) = model_of("<p>Hello <b>world</b></p><p>Goodbye world</p>");
        assert_eq!(
            texts(&model),
            vec![vec!["Hello ", "world"], vec!["Goodbye world"]]
        );
        assert_eq!(model.groups[1].nodes[0].group_index, 1);
    }

    #[test]
    fn every_retained_node_is_wrapped() {
        let (doc, model) = model_of("<p>Hello <b>world</b></p>");
        for node in &model.groups[0].nodes {
            let wrapper = doc.get_element_by_id(&node.element_uuid).unwrap();
            assert_eq!(doc.tag_name(wrapper), Some("span"));
            assert_eq!(doc.attr(wrapper, "style"), Some(WRAPPER_STYLE));
            assert_eq!(doc.text_content(wrapper), node.text);
        }
    }

    #[test]
    fn whitespace_collapses_and_is_trimmed_after_boundaries() {
        let (_, model) = model_of("<div>\n  <span>a</span>\n  <span>b</span>\n</div><p>  c \t d  </p>");
        assert_eq!(texts(&model), vec![vec!["a", "b"], vec!["c d "]]);
    }

    #[test]
    fn single_space_between_inline_elements_is_kept() {
        let (_, model) = model_of("<p><b>a</b> <i>b</i></p>");
        assert_eq!(model.groups[0].text(), "a b");
    }

    #[test]
    fn unlisted_tags_do_not_split_groups() {
        for html in [
            "<p>foo<ins>bar</ins>baz</p>",
            "<p>foo<my-tag>bar</my-tag>baz</p>",
            "<p>foo<del>bar</del>baz</p>",
        ] {
            let (_, model) = model_of(html);
            assert_eq!(model.groups.len(), 1, "{html}");
            assert_eq!(model.groups[0].text(), "foobarbaz", "{html}");
        }
    }

    #[test]
    fn wbr_keeps_the_word_together() {
        let (_, model) = model_of("<p>super<wbr>man</p>");
        assert_eq!(texts(&model), vec![vec!["super", "man"]]);
        assert_eq!(model.groups[0].text(), "superman");
    }

    #[test]
    fn form_controls_are_not_inline_text() {
        let (_, model) = model_of("<p>press<button>go</button>now</p>");
        assert_eq!(texts(&model), vec![vec!["press"], vec!["go"], vec!["now"]]);
    }

    #[test]
    fn br_splits_lines_into_groups() {
        let (_, model) = model_of("<p>one<br>two</p>");
        assert_eq!(texts(&model), vec![vec!["one"], vec!["two"]]);
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let (_, model) = model_of(
            "<div>a<span style=\"display:none\">b</span>c</div><div hidden>x</div><p>y</p>",
        );
        assert_eq!(texts(&model), vec![vec!["a", "c"], vec!["y"]]);
    }

    #[test]
    fn stylesheet_rules_hide_content() {
        let (_, model) =
            model_of("<style>.ad { display: none }</style><p>keep</p><p class=ad>drop</p>");
        assert_eq!(texts(&model), vec![vec!["keep"]]);
    }

    #[test]
    fn preformatted_text_is_kept_verbatim() {
        let (_, model) = model_of("<pre>  a\n  b</pre><p>  c  </p>");
        assert_eq!(texts(&model), vec![vec!["  a\n  b"], vec!["c "]]);
        assert!(model.groups[0].preformatted);
        assert!(!model.groups[1].preformatted);
    }

    #[test]
    fn adjacent_preformatted_blocks_stay_preformatted() {
        let (_, model) = model_of("<pre>a  b</pre><pre>c  d</pre>");
        assert_eq!(texts(&model), vec![vec!["a  b"], vec!["c  d"]]);
        assert!(model.groups.iter().all(|g| g.preformatted));
    }

    #[test]
    fn white_space_pre_counts_as_preformatted() {
        let (_, model) = model_of("<div style=\"white-space: pre\"><span>x  y</span></div>");
        assert_eq!(texts(&model), vec![vec!["x  y"]]);
        assert!(model.groups[0].preformatted);
    }

    #[test]
    fn script_style_and_comments_contribute_nothing() {
        let (_, model) =
            model_of("<p>a<script>var x = 1;</script><!-- note -->b<textarea>t</textarea></p>");
        assert_eq!(texts(&model), vec![vec!["a", "b"]]);
    }

    #[test]
    fn text_outside_any_block_forms_a_group() {
        let (_, model) = model_of("loose <em>text</em>");
        assert_eq!(texts(&model), vec![vec!["loose ", "text"]]);
    }

    #[test]
    fn walk_starts_at_body() {
        let (_, model) =
            model_of("<html><head><title>T</title></head><body><p>in body</p></body></html>");
        assert_eq!(texts(&model), vec![vec!["in body"]]);
    }

    #[test]
    fn segmenter_reports_breaks_between_blocks() {
        let doc = Document::parse("<p>a</p><p>b</p>");
        let segments: Vec<Segment> = Segmenter::new(&doc).collect();
        let breaks = segments.iter().filter(|s| **s == Segment::Break).count();
        assert_eq!(breaks, 2);
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn scoped_flag_clears_when_walk_returns_to_its_depth() {
        let mut flag = ScopedFlag::default();
        flag.update(2, true);
        flag.update(3, false);
        assert!(flag.is_active());
        flag.update(2, false);
        assert!(!flag.is_active());
        flag.update(2, true);
        flag.update(1, true);
        assert_eq!(flag.depth, Some(1));
    }

    #[test]
    fn restore_puts_the_page_back() {
        let html = "<p>Hello <b>world</b></p><p>Goodbye world</p>";
        let (mut doc, model) = model_of(html);
        let pristine = Document::parse(html);
        let uuids = model.uuids();

        assert_eq!(restore_wrappers(&mut doc, &uuids), 3);
        assert_eq!(doc.inner_html(doc.root()), pristine.inner_html(pristine.root()));
    }

    #[test]
    fn restore_twice_is_a_no_op() {
        let (mut doc, model) = model_of("<div>one <i>two</i> three</div>");
        let uuids = model.uuids();
        restore_wrappers(&mut doc, &uuids);
        let once = doc.inner_html(doc.root());
        assert_eq!(restore_wrappers(&mut doc, &uuids), 0);
        assert_eq!(doc.inner_html(doc.root()), once);
    }

    #[test]
    fn restore_skips_unknown_ids() {
        let (mut doc, model) = model_of("<p>x</p>");
        let mut uuids = vec!["missing".to_string()];
        uuids.extend(model.uuids());
        assert_eq!(restore_wrappers(&mut doc, &uuids), 1);
        assert_eq!(doc.inner_html(doc.root()), "<p>x</p>");
    }

    #[test]
    fn format_text_collapses_runs() {
        assert_eq!(format_text("a \n\t b", false, false), "a b");
        assert_eq!(format_text("  a  ", false, true), "a ");
        assert_eq!(format_text("  a  ", false, false), " a ");
        assert_eq!(format_text("  a  ", true, true), "  a  ");
    }
}
