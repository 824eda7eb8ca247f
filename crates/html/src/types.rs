use std::fmt;

/// Index of a node in its [`crate::Document`] arena. Ids are never reused, so an id
/// for a node that has been detached stays valid but stops resolving through
/// document queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl NodeKind {
    pub(crate) fn allows_children(&self) -> bool {
        matches!(self, NodeKind::Document { .. } | NodeKind::Element { .. })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    MissingNode(NodeId),
    WrongNodeKind(NodeId),
    InvalidParent(NodeId),
    InvalidSibling { parent: NodeId, before: NodeId },
    CycleDetected { parent: NodeId, child: NodeId },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::MissingNode(id) => write!(f, "node {} does not exist", id.0),
            DomError::WrongNodeKind(id) => write!(f, "node {} has the wrong kind", id.0),
            DomError::InvalidParent(id) => write!(f, "node {} cannot hold children", id.0),
            DomError::InvalidSibling { parent, before } => {
                write!(f, "node {} is not a child of {}", before.0, parent.0)
            }
            DomError::CycleDetected { parent, child } => {
                write!(f, "inserting {} under {} would create a cycle", child.0, parent.0)
            }
        }
    }
}

impl std::error::Error for DomError {}
