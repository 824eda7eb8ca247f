use std::cmp::Ordering::Equal;

use html::{Document, NodeId};

use crate::syntax::{Selector, Stylesheet, parse_declarations};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
struct Specificity(u16, u16, u16); // (id, class, type)

struct Candidate<'a> {
    property: &'a str,
    value: &'a str,
    important: bool,
    specificity: Specificity,
    order: u32,
}

fn specificity_of(selector: &Selector) -> Specificity {
    match selector {
        Selector::Universal => Specificity(0, 0, 0),
        Selector::Type(_) => Specificity(0, 0, 1),
        Selector::Class(_) => Specificity(0, 1, 0),
        Selector::Id(_) => Specificity(1, 0, 0),
    }
}

// Check if an element matches a selector
fn matches_selector(doc: &Document, id: NodeId, selector: &Selector) -> bool {
    match selector {
        Selector::Universal => true,
        Selector::Type(t) => doc.tag_name(id) == Some(t.as_str()),
        Selector::Id(want) => doc.attr(id, "id") == Some(want.as_str()),
        Selector::Class(want) => doc.has_class(id, want),
    }
}

/// Winning declared value per property for an element: `!important` first, then
/// specificity (inline style above any selector), then source order.
pub fn specified_values(doc: &Document, id: NodeId, sheet: &Stylesheet) -> Vec<(String, String)> {
    let inline = doc.attr(id, "style").map(parse_declarations).unwrap_or_default();

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    candidates.extend(inline.iter().map(|d| Candidate {
        property: &d.name,
        value: &d.value,
        important: d.important,
        specificity: Specificity(u16::MAX, 0, 0),
        order: u32::MAX,
    }));

    for (order, rule) in sheet.rules.iter().enumerate() {
        let matched = rule
            .selectors
            .iter()
            .filter(|s| matches_selector(doc, id, s))
            .map(specificity_of)
            .max();
        if let Some(specificity) = matched {
            candidates.extend(rule.declarations.iter().map(|d| Candidate {
                property: &d.name,
                value: &d.value,
                important: d.important,
                specificity,
                order: order as u32,
            }));
        }
    }

    // resolve winners per property: the last candidate of each run wins
    candidates.sort_by(|a, b| match a.property.cmp(b.property) {
        Equal => match a.important.cmp(&b.important) {
            Equal => match a.specificity.cmp(&b.specificity) {
                Equal => a.order.cmp(&b.order),
                other => other,
            },
            other => other,
        },
        other => other,
    });

    let mut style = Vec::new();
    let mut i = 0;
    while i < candidates.len() {
        let property = candidates[i].property;
        let mut j = i;
        while j + 1 < candidates.len() && candidates[j + 1].property == property {
            j += 1;
        }
        style.push((property.to_string(), candidates[j].value.to_string()));
        i = j + 1;
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_stylesheet;

    fn value_of(style: &[(String, String)], name: &str) -> Option<String> {
        style.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn specificity_then_order_decides() {
        let doc = Document::parse("<p id=a class=c>x</p>");
        let p = doc.get_element_by_id("a").unwrap();
        let sheet = parse_stylesheet(
            "#a { display: inline } .c { display: none } p { display: block } p { white-space: pre } * { white-space: normal }",
        );
        let style = specified_values(&doc, p, &sheet);
        assert_eq!(value_of(&style, "display").as_deref(), Some("inline"));
        assert_eq!(value_of(&style, "white-space").as_deref(), Some("pre"));
    }

    #[test]
    fn inline_style_wins_unless_sheet_is_important() {
        let doc = Document::parse("<p id=a style=\"display: block; white-space: pre\">x</p>");
        let p = doc.get_element_by_id("a").unwrap();
        let sheet = parse_stylesheet("#a { display: none } p { white-space: normal !important }");
        let style = specified_values(&doc, p, &sheet);
        assert_eq!(value_of(&style, "display").as_deref(), Some("block"));
        assert_eq!(value_of(&style, "white-space").as_deref(), Some("normal"));
    }
}
