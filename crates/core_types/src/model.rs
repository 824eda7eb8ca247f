use serde::{Deserialize, Serialize};

/// One retained text node, addressed by the id of the wrapper injected around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNodeRef {
    #[serde(rename = "groupIndex")]
    pub group_index: usize,
    /// Entity-decoded, boundary-trimmed text as seen when the model was built.
    pub text: String,
    #[serde(rename = "elementUUID")]
    pub element_uuid: String,
}

/// A block-level run of inline text content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "group")]
    pub nodes: Vec<TextNodeRef>,
    pub preformatted: bool,
}

impl Group {
    pub fn text(&self) -> String {
        let len = self.nodes.iter().map(|n| n.text.len()).sum();
        let mut out = String::with_capacity(len);
        for node in &self.nodes {
            out.push_str(&node.text);
        }
        out
    }

    pub fn uuids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.element_uuid.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Ordered groups of a page's searchable text. The position of a group in
/// `groups` is its group index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub groups: Vec<Group>,
}

impl DocumentModel {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Group)> {
        self.groups.iter().enumerate()
    }

    /// Every wrapper id in document order; used to restore the page.
    pub fn uuids(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.nodes.iter().map(|n| n.element_uuid.clone()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|g| g.nodes.len()).sum()
    }
}
