use std::collections::HashMap;

use html::dom_utils::collect_style_texts;
use html::{Document, NodeId};

use crate::cascade::specified_values;
use crate::syntax::{Stylesheet, parse_stylesheet};
use crate::values::{Display, WhiteSpace, parse_display, parse_white_space};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComputedStyle {
    /// Not inherited. Initial: per-element default.
    pub display: Display,
    /// Inherited. Initial: normal.
    pub white_space: WhiteSpace,
}

/// Compute the final style for an element from its cascaded declarations and its
/// parent's computed style.
pub fn compute_style(
    tag: &str,
    hidden_attr: bool,
    specified: &[(String, String)],
    parent: Option<&ComputedStyle>,
) -> ComputedStyle {
    let mut result = ComputedStyle {
        display: if hidden_attr {
            Display::None
        } else {
            default_display_for(tag)
        },
        white_space: parent
            .map(|p| p.white_space)
            .unwrap_or(WhiteSpace::Normal),
    };
    if let Some(ws) = default_white_space_for(tag) {
        result.white_space = ws;
    }

    for (name, value) in specified {
        match name.as_str() {
            "display" => {
                if let Some(d) = parse_display(value) {
                    result.display = d;
                }
            }
            "white-space" => {
                if let Some(ws) = parse_white_space(value) {
                    result.white_space = ws;
                }
            }
            // unsupported property → ignored
            _ => {}
        }
    }

    result
}

/// User-agent `display` per tag. Anything not listed, custom elements included,
/// gets the initial value `inline`.
fn default_display_for(tag: &str) -> Display {
    match tag {
        "html" | "body" | "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol"
        | "menu" | "dir" | "dl" | "dt" | "dd" | "table" | "caption" | "thead" | "tbody"
        | "tfoot" | "tr" | "td" | "th" | "col" | "colgroup" | "section" | "article" | "header"
        | "footer" | "nav" | "main" | "aside" | "hgroup" | "search" | "blockquote" | "pre"
        | "listing" | "xmp" | "plaintext" | "form" | "fieldset" | "legend" | "figure"
        | "figcaption" | "address" | "hr" | "details" | "summary" | "dialog" | "center"
        | "frameset" | "frame" | "optgroup" | "option" => Display::Block,
        "li" => Display::ListItem,
        "button" | "input" | "select" | "textarea" | "meter" | "progress" | "marquee" => {
            Display::InlineBlock
        }
        "head" | "script" | "style" | "template" | "title" | "meta" | "link" | "base"
        | "area" | "datalist" | "noembed" | "noframes" | "param" | "rp" | "source"
        | "track" => Display::None,
        _ => Display::Inline,
    }
}

fn default_white_space_for(tag: &str) -> Option<WhiteSpace> {
    match tag {
        "pre" | "listing" | "xmp" | "textarea" => Some(WhiteSpace::Pre),
        _ => None,
    }
}

/// Computed styles for one document, resolved lazily and memoized per element.
///
/// The document's `<style>` sheets are read once, on construction; later DOM
/// changes are not observed.
pub struct StyleContext<'a> {
    doc: &'a Document,
    sheet: Stylesheet,
    cache: HashMap<NodeId, ComputedStyle>,
}

impl<'a> StyleContext<'a> {
    pub fn new(doc: &'a Document) -> Self {
        let mut css = String::new();
        collect_style_texts(doc, &mut css);
        let sheet = parse_stylesheet(&css);
        log::trace!(target: "css", "collected {} style rules", sheet.rules.len());
        Self {
            doc,
            sheet,
            cache: HashMap::new(),
        }
    }

    /// Computed style of an element; `None` for other node kinds.
    pub fn style(&mut self, id: NodeId) -> Option<ComputedStyle> {
        if let Some(style) = self.cache.get(&id) {
            return Some(*style);
        }
        let doc = self.doc;
        let tag = doc.tag_name(id)?;
        let parent = match doc.parent(id) {
            Some(p) if doc.is_element(p) => self.style(p),
            _ => None,
        };
        let specified = specified_values(doc, id, &self.sheet);
        let style = compute_style(
            tag,
            doc.has_attr(id, "hidden"),
            &specified,
            parent.as_ref(),
        );
        self.cache.insert(id, style);
        Some(style)
    }

    /// Inline-level for grouping purposes. `<br>` never is, so that lines split.
    pub fn is_inline(&mut self, id: NodeId) -> bool {
        if self.doc.tag_name(id) == Some("br") {
            return false;
        }
        self.style(id)
            .is_some_and(|s| s.display == Display::Inline)
    }

    pub fn is_hidden(&mut self, id: NodeId) -> bool {
        self.style(id).is_some_and(|s| s.display == Display::None)
    }

    pub fn is_preformatted(&mut self, id: NodeId) -> bool {
        if self.doc.tag_name(id) == Some("pre") {
            return true;
        }
        self.style(id)
            .is_some_and(|s| s.white_space == WhiteSpace::Pre)
    }
}
