use serde::{Deserialize, Serialize};

/// One regex match. `group_index` indexes [`OccurrenceMap::groups`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    #[serde(rename = "groupIndex")]
    pub group_index: usize,
    #[serde(rename = "subIndex")]
    pub sub_index: usize,
    #[serde(rename = "matchedText")]
    pub matched_text: String,
}

/// A document-model group that holds at least one occurrence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceGroup {
    pub uuids: Vec<String>,
    pub count: usize,
    pub preformatted: bool,
    /// Index of the source group in the document model.
    #[serde(rename = "modelGroup")]
    pub model_group: usize,
}

/// Flat, document-ordered index of every occurrence of a pattern.
///
/// Invariants:
/// - `occurrence_index_map.len() == length`.
/// - Occurrence `i` lives in `groups[occurrence_index_map[i].group_index]`, and group
///   indices never decrease as `i` grows.
/// - The sum of `groups[..].count` equals `length`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceMap {
    #[serde(rename = "occurrenceIndexMap")]
    pub occurrence_index_map: Vec<Occurrence>,
    pub length: usize,
    pub groups: Vec<OccurrenceGroup>,
}

/// 1-based index/total pair shown to the user; both are 0 when nothing matched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewableIndex {
    pub index: usize,
    pub total: usize,
}

impl OccurrenceMap {
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn get(&self, index: usize) -> Option<&Occurrence> {
        self.occurrence_index_map.get(index)
    }

    /// Flat index of the first occurrence in `groups[group]`.
    pub fn group_base(&self, group: usize) -> usize {
        self.groups.iter().take(group).map(|g| g.count).sum()
    }

    /// Bring a focus index back inside the map (and under the result cap).
    pub fn clamp_index(&self, index: usize, max_results: usize) -> usize {
        let mut index = if self.length == 0 {
            0
        } else {
            index.min(self.length - 1)
        };
        if max_results != 0 && index >= max_results {
            index = max_results - 1;
        }
        index
    }

    pub fn next_index(&self, index: usize, max_results: usize) -> usize {
        if self.length == 0 {
            return 0;
        }
        let capped = max_results != 0;
        if index + 1 >= self.length || (capped && index + 1 >= max_results) {
            0
        } else {
            index + 1
        }
    }

    pub fn previous_index(&self, index: usize, max_results: usize) -> usize {
        if self.length == 0 {
            return 0;
        }
        if index == 0 {
            if max_results != 0 && max_results <= self.length {
                max_results - 1
            } else {
                self.length - 1
            }
        } else {
            index - 1
        }
    }

    pub fn viewable(&self, index: usize, max_results: usize) -> ViewableIndex {
        if self.length == 0 {
            return ViewableIndex::default();
        }
        let total = if max_results != 0 && max_results <= self.length {
            max_results
        } else {
            self.length
        };
        ViewableIndex {
            index: index + 1,
            total,
        }
    }
}
