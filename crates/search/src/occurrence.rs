use core_types::{DocumentModel, Occurrence, OccurrenceGroup, OccurrenceMap, SearchOptions};

use crate::pattern::SearchPattern;

/// Index every occurrence of `pattern` in the model, group by group.
///
/// Groups with no match contribute nothing. With a result cap, building stops as
/// soon as the cap is reached, part way through a group if need be, so `length`
/// is the capped count.
pub fn build_occurrence_map(
    model: &DocumentModel,
    pattern: &SearchPattern,
    options: &SearchOptions,
) -> OccurrenceMap {
    let cap = options.result_cap();
    let mut map = OccurrenceMap::default();

    for (model_group, group) in model.iter() {
        if cap.is_some_and(|c| map.length >= c) {
            break;
        }
        let text = group.text();
        let group_index = map.groups.len();
        let mut count = 0;
        for m in pattern.find_iter(&text) {
            if cap.is_some_and(|c| map.length >= c) {
                break;
            }
            map.occurrence_index_map.push(Occurrence {
                group_index,
                sub_index: count,
                matched_text: m.as_str().to_string(),
            });
            map.length += 1;
            count += 1;
        }
        if count == 0 {
            continue;
        }
        log::trace!(
            target: "search.occurrence",
            "group {model_group}: {count} occurrence(s) across {} node(s)",
            group.nodes.len()
        );
        map.groups.push(OccurrenceGroup {
            uuids: group.uuids(),
            count,
            preformatted: group.preformatted,
            model_group,
        });
    }

    log::debug!(
        target: "search.occurrence",
        "pattern {:?}: {} occurrence(s) in {} group(s)",
        pattern.source(),
        map.length,
        map.groups.len()
    );
    map
}

#[cfg(test)]
mod tests {
    use core_types::{Group, TextNodeRef};
    use proptest::prelude::*;

    use super::*;

    fn model(groups: &[&[&str]]) -> DocumentModel {
        let mut next = 0;
        DocumentModel {
            groups: groups
                .iter()
                .enumerate()
                .map(|(g, texts)| Group {
                    nodes: texts
                        .iter()
                        .map(|t| {
                            next += 1;
                            TextNodeRef {
                                group_index: g,
                                text: t.to_string(),
                                element_uuid: format!("u{next}"),
                            }
                        })
                        .collect(),
                    preformatted: false,
                })
                .collect(),
        }
    }

    fn build(model: &DocumentModel, raw: &str, max_results: usize) -> OccurrenceMap {
        let options = SearchOptions {
            max_results,
            ..SearchOptions::default()
        };
        let pattern = SearchPattern::new(raw, &options).unwrap();
        build_occurrence_map(model, &pattern, &options)
    }

    #[test]
    fn hello_world_scenario() {
        let m = model(&[&["Hello ", "world"], &["Goodbye world"]]);
        let map = build(&m, "world", 0);
        assert_eq!(map.length, 2);
        assert_eq!(map.groups.len(), 2);
        assert_eq!(map.groups[0].count, 1);
        assert_eq!(map.groups[0].uuids, vec!["u1", "u2"]);
        assert_eq!(map.groups[1].count, 1);
        assert_eq!(map.viewable(0, 0).index, 1);
        assert_eq!(map.viewable(0, 0).total, 2);
    }

    #[test]
    fn groups_without_matches_are_skipped_but_remembered() {
        let m = model(&[&["none"], &["x x"], &["nothing"], &["x"]]);
        let map = build(&m, "x", 0);
        assert_eq!(map.groups.len(), 2);
        assert_eq!(map.groups[0].model_group, 1);
        assert_eq!(map.groups[1].model_group, 3);
        assert_eq!(map.occurrence_index_map[2].group_index, 1);
        assert_eq!(map.occurrence_index_map[1].sub_index, 1);
    }

    #[test]
    fn matches_span_node_boundaries_within_a_group() {
        let m = model(&[&["wo", "r", "ld"]]);
        let map = build(&m, "world", 0);
        assert_eq!(map.length, 1);
        assert_eq!(map.occurrence_index_map[0].matched_text, "world");
    }

    #[test]
    fn cap_truncates_inside_the_crossing_group() {
        let m = model(&[&["a a"], &["a a a"], &["a"]]);
        let map = build(&m, "a", 3);
        assert_eq!(map.length, 3);
        assert_eq!(map.occurrence_index_map.len(), 3);
        assert_eq!(map.groups.len(), 2);
        assert_eq!(map.groups[1].count, 1);
        assert_eq!(map.groups.iter().map(|g| g.count).sum::<usize>(), 3);
    }

    proptest! {
        #[test]
        fn occurrences_are_in_document_order(
            groups in proptest::collection::vec(
                proptest::collection::vec("[ab ]{0,8}", 1..4),
                0..6,
            ),
            cap in 0usize..6,
        ) {
            let refs: Vec<Vec<&str>> = groups
                .iter()
                .map(|g| g.iter().map(String::as_str).collect())
                .collect();
            let slices: Vec<&[&str]> = refs.iter().map(Vec::as_slice).collect();
            let m = model(&slices);
            let map = build(&m, "ab?", cap);

            prop_assert_eq!(map.length, map.occurrence_index_map.len());
            prop_assert_eq!(map.groups.iter().map(|g| g.count).sum::<usize>(), map.length);
            if cap > 0 {
                prop_assert!(map.length <= cap);
            }
            for pair in map.occurrence_index_map.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(b.group_index >= a.group_index);
                if a.group_index == b.group_index {
                    prop_assert_eq!(b.sub_index, a.sub_index + 1);
                } else {
                    prop_assert_eq!(b.sub_index, 0);
                }
            }
        }
    }
}
