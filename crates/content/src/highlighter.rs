use std::fmt::Write as _;

use core_types::{HighlightColor, OccurrenceMap, SearchOptions};
use html::{Document, NodeId, decode_entities, encode_entities};
use search::SearchPattern;

/// Carried by every highlight span.
pub const HIGHLIGHT_CLASS: &str = "findr-highlight";
/// Carried by the spans of the focused occurrence.
pub const FOCUS_CLASS: &str = "findr-focus";
const OCCURRENCE_PREFIX: &str = "findr-occr";

/// Class shared by every span of occurrence `index`.
pub fn occurrence_class(index: usize) -> String {
    format!("{OCCURRENCE_PREFIX}{index}")
}

fn occurrence_of(doc: &Document, id: NodeId) -> Option<usize> {
    doc.classes(id)
        .find_map(|class| class.strip_prefix(OCCURRENCE_PREFIX)?.parse().ok())
}

fn background_style(color: &HighlightColor) -> String {
    let hex: String = color
        .hex_color
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '#')
        .collect();
    format!("background-color: {hex};")
}

/// One character of a group's live text.
#[derive(Debug, Clone)]
struct Slot {
    ch: char,
    /// Index into the group's resolved wrappers.
    wrapper: usize,
    occurrence: Option<usize>,
}

/// Group text as the pattern sees it, plus the slot behind every byte of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedText {
    pub(crate) text: String,
    pub(crate) slots: Vec<usize>,
}

impl NormalizedText {
    fn push(&mut self, ch: char, slot: usize) {
        self.text.push(ch);
        self.slots.extend(std::iter::repeat_n(slot, ch.len_utf8()));
    }
}

fn is_collapsible(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | ' ')
}

/// Collapse every whitespace run to one space and drop leading and trailing runs,
/// in one forward scan. A collapsed space maps to the last slot of its run.
pub(crate) fn normalize_group(source: &str, preformatted: bool) -> NormalizedText {
    let mut out = NormalizedText {
        text: String::with_capacity(source.len()),
        slots: Vec::with_capacity(source.len()),
    };
    if preformatted {
        for (slot, ch) in source.chars().enumerate() {
            out.push(ch, slot);
        }
        return out;
    }
    let mut run_end = None;
    for (slot, ch) in source.chars().enumerate() {
        if is_collapsible(ch) {
            run_end = Some(slot);
            continue;
        }
        if let Some(space) = run_end.take()
            && !out.text.is_empty()
        {
            out.push(' ', space);
        }
        out.push(ch, slot);
    }
    out
}

/// Live text of each wrapper, one slot per decoded character. Wrappers whose
/// first child is not a non-empty text node contribute nothing.
fn rehydrate(doc: &Document, wrappers: &[NodeId]) -> Vec<Slot> {
    let mut slots = Vec::new();
    for (index, &wrapper) in wrappers.iter().enumerate() {
        let Some(text) = doc.first_child(wrapper).and_then(|child| doc.text(child)) else {
            continue;
        };
        slots.extend(decode_entities(text).chars().map(|ch| Slot {
            ch,
            wrapper: index,
            occurrence: None,
        }));
    }
    slots
}

fn markup(slots: &[Slot], style: &str) -> String {
    let mut out = String::new();
    let mut open: Option<usize> = None;
    let mut buf = [0u8; 4];
    for slot in slots {
        if slot.occurrence != open {
            if open.is_some() {
                out.push_str("</span>");
            }
            if let Some(index) = slot.occurrence {
                let _ = write!(
                    out,
                    "<span class=\"{HIGHLIGHT_CLASS} {}\" style=\"{style}\">",
                    occurrence_class(index)
                );
            }
            open = slot.occurrence;
        }
        out.push_str(&encode_entities(slot.ch.encode_utf8(&mut buf)));
    }
    if open.is_some() {
        out.push_str("</span>");
    }
    out
}

/// Wrap every occurrence in `map` in highlight spans.
///
/// Each group's text is re-read from the page and matched again with `pattern`;
/// only the first `count` matches of a group are marked. A match that crosses
/// wrappers becomes one span per wrapper, all tagged with the same occurrence
/// class. Returns the number of wrappers rewritten.
///
/// Wrapper text is entity-decoded once more before matching, exactly as the
/// model builder decodes it, so both sides count the same matches. This is lossy:
/// page text that reads `&lt;` becomes `<` in every rewritten wrapper, and
/// [`restore_highlights`] does not bring the entity back. Changing the decoding on
/// one side alone makes the counts disagree.
pub fn highlight_all(
    doc: &mut Document,
    map: &OccurrenceMap,
    pattern: &SearchPattern,
    options: &SearchOptions,
) -> usize {
    let style = background_style(&options.all_highlight_color);
    let resolved: Vec<Vec<NodeId>> = {
        let index = doc.id_index();
        map.groups
            .iter()
            .map(|group| {
                group
                    .uuids
                    .iter()
                    .filter_map(|uuid| {
                        let found = index.get(uuid.as_str()).copied();
                        if found.is_none() {
                            log::warn!(target: "content.highlighter", "stale wrapper {uuid}");
                        }
                        found
                    })
                    .collect()
            })
            .collect()
    };

    let mut base = 0;
    let mut rewritten = 0;
    for (group, wrappers) in map.groups.iter().zip(resolved) {
        let mut slots = rehydrate(doc, &wrappers);
        let source: String = slots.iter().map(|s| s.ch).collect();
        let normalized = normalize_group(&source, group.preformatted);

        let mut marked = 0;
        for (k, m) in pattern
            .find_iter(&normalized.text)
            .take(group.count)
            .enumerate()
        {
            let first = normalized.slots[m.start()];
            let last = normalized.slots[m.end() - 1];
            for slot in &mut slots[first..=last] {
                slot.occurrence = Some(base + k);
            }
            marked += 1;
        }
        if marked != group.count {
            log::warn!(
                target: "content.highlighter",
                "group {}: expected {} occurrence(s), found {marked}",
                group.model_group,
                group.count
            );
        }
        base += group.count;

        for chunk in slots.chunk_by(|a, b| a.wrapper == b.wrapper) {
            if chunk.iter().all(|s| s.occurrence.is_none()) {
                continue;
            }
            let wrapper = wrappers[chunk[0].wrapper];
            match doc.set_inner_html(wrapper, &markup(chunk, &style)) {
                Ok(()) => rewritten += 1,
                Err(err) => log::warn!(target: "content.highlighter", "cannot rewrite wrapper: {err}"),
            }
        }
    }

    log::debug!(
        target: "content.highlighter",
        "highlighted {base} occurrence(s) across {rewritten} wrapper(s)"
    );
    rewritten
}

/// Drop focus styling from every focused span.
pub fn unfocus(doc: &mut Document, options: &SearchOptions) {
    let style = background_style(&options.all_highlight_color);
    for id in doc.elements_by_class(FOCUS_CLASS) {
        let _ = doc.remove_class(id, FOCUS_CLASS);
        let _ = doc.set_attr(id, "style", &style);
    }
}

/// Move focus to occurrence `index`; returns the element to scroll to, or `None`
/// when the page has no such occurrence.
pub fn seek(doc: &mut Document, index: usize, options: &SearchOptions) -> Option<NodeId> {
    unfocus(doc, options);
    let targets = doc.elements_by_class(&occurrence_class(index));
    let Some(&first) = targets.first() else {
        log::debug!(target: "content.highlighter", "no occurrence {index} on the page");
        return None;
    };
    let style = background_style(&options.index_highlight_color);
    for id in targets {
        let _ = doc.add_class(id, FOCUS_CLASS);
        let _ = doc.set_attr(id, "style", &style);
    }
    Some(first)
}

/// Replace occurrence `index` with `text`: the first span takes the text, the
/// rest of the occurrence's spans are emptied.
pub fn replace(doc: &mut Document, index: usize, text: &str) -> bool {
    let targets = doc.elements_by_class(&occurrence_class(index));
    if targets.is_empty() {
        return false;
    }
    for (n, id) in targets.into_iter().enumerate() {
        let value = if n == 0 { text } else { "" };
        if let Err(err) = doc.set_text_content(id, value) {
            log::warn!(target: "content.highlighter", "cannot replace occurrence {index}: {err}");
        }
    }
    true
}

/// Replace every highlighted occurrence; returns how many were replaced.
pub fn replace_all(doc: &mut Document, text: &str) -> usize {
    let mut current = None;
    let mut replaced = 0;
    for id in doc.elements_by_class(HIGHLIGHT_CLASS) {
        let occurrence = occurrence_of(doc, id);
        let first = occurrence != current;
        if first {
            current = occurrence;
            replaced += 1;
        }
        let value = if first { text } else { "" };
        if let Err(err) = doc.set_text_content(id, value) {
            log::warn!(target: "content.highlighter", "cannot replace highlight: {err}");
        }
    }
    replaced
}

/// Unwrap every highlight span and merge the text left behind. Wrappers injected
/// by the model builder are left in place.
pub fn restore_highlights(doc: &mut Document) -> usize {
    let mut parents: Vec<NodeId> = Vec::new();
    let mut removed = 0;
    for id in doc.elements_by_class(HIGHLIGHT_CLASS) {
        let Some(parent) = doc.parent(id) else {
            continue;
        };
        if doc.unwrap(id) {
            removed += 1;
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
    }
    for parent in parents {
        doc.normalize(parent);
    }
    if removed > 0 {
        log::trace!(target: "content.highlighter", "removed {removed} highlight span(s)");
    }
    removed
}
