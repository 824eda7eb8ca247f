use core_types::{DocumentModel, OccurrenceMap, SearchOptions};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Popup → session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PopupRequest {
    Update {
        regex: String,
        #[serde(default)]
        options: SearchOptions,
    },
    Next {
        #[serde(default)]
        options: SearchOptions,
    },
    Previous {
        #[serde(default)]
        options: SearchOptions,
    },
    /// `index` is the 1-based viewable index of the occurrence to replace.
    ReplaceNext {
        index: usize,
        #[serde(rename = "replaceWith")]
        replace_with: String,
        #[serde(default)]
        options: SearchOptions,
    },
    ReplaceAll {
        #[serde(rename = "replaceWith")]
        replace_with: String,
        #[serde(default)]
        options: SearchOptions,
    },
    FollowLink {
        #[serde(default)]
        options: SearchOptions,
    },
    GetOccurrence {
        options: OccurrenceQuery,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceQuery {
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Single,
    All,
}

/// Session controller → popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PopupResponse {
    /// 1-based; both 0 when nothing matched.
    IndexUpdate { index: usize, total: usize },
    EmptyRegex,
    InvalidRegex { error: String },
    /// The page changed under the model; the popup must re-issue `update`.
    Invalidate,
    GetOccurrence { response: String },
    Close,
    Unreachable { reason: UnreachableReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableReason {
    Forbidden,
    Pdf,
    OfflineFile,
    NoResponse,
}

/// Session controller → page. The short action names used by older callers are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageCommand {
    Init,
    Poll,
    Restore {
        uuids: Vec<String>,
    },
    #[serde(alias = "update")]
    HighlightUpdate {
        #[serde(rename = "occurrenceMap")]
        occurrence_map: OccurrenceMap,
        index: usize,
        regex: String,
        #[serde(default)]
        options: SearchOptions,
    },
    #[serde(alias = "seek")]
    HighlightSeek {
        index: usize,
        #[serde(default)]
        options: SearchOptions,
    },
    #[serde(alias = "replace")]
    HighlightReplace {
        index: usize,
        #[serde(rename = "replaceWith")]
        replace_with: String,
        #[serde(default)]
        options: SearchOptions,
    },
    #[serde(alias = "replace_all")]
    HighlightReplaceAll {
        #[serde(rename = "replaceWith")]
        replace_with: String,
        #[serde(default)]
        options: SearchOptions,
    },
    HighlightRestore,
    HighlightUnfocus,
    FollowLink,
}

impl PageCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PageCommand::Init => "init",
            PageCommand::Poll => "poll",
            PageCommand::Restore { .. } => "restore",
            PageCommand::HighlightUpdate { .. } => "highlight_update",
            PageCommand::HighlightSeek { .. } => "highlight_seek",
            PageCommand::HighlightReplace { .. } => "highlight_replace",
            PageCommand::HighlightReplaceAll { .. } => "highlight_replace_all",
            PageCommand::HighlightRestore => "highlight_restore",
            PageCommand::HighlightUnfocus => "highlight_unfocus",
            PageCommand::FollowLink => "follow_link",
        }
    }
}

/// Page → session controller. Variant order matters for untagged decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageReply {
    Model { model: DocumentModel },
    Success { success: bool },
    Link { href: Option<String> },
}

impl PageReply {
    pub fn ack() -> Self {
        PageReply::Success { success: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("page did not respond")]
    Disconnected,
    #[error("unexpected reply to {0}")]
    UnexpectedReply(&'static str),
}

/// Request/response channel to one page.
pub trait PagePort {
    fn request(&mut self, command: PageCommand) -> Result<PageReply, PortError>;
}

/// One queued command for a page runtime, with the channel its reply goes to.
#[derive(Debug)]
pub struct PageEnvelope {
    pub command: PageCommand,
    pub reply_tx: Sender<PageReply>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn popup_requests_use_wire_names() {
        let req: PopupRequest = serde_json::from_value(json!({
            "action": "replace_next",
            "index": 2,
            "replaceWith": "X",
            "options": { "match_case": false }
        }))
        .unwrap();
        match req {
            PopupRequest::ReplaceNext {
                index,
                replace_with,
                options,
            } => {
                assert_eq!(index, 2);
                assert_eq!(replace_with, "X");
                assert!(!options.match_case);
                assert!(options.find_by_regex);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn get_occurrence_carries_cardinality() {
        let req: PopupRequest = serde_json::from_value(json!({
            "action": "get_occurrence",
            "options": { "cardinality": "all" }
        }))
        .unwrap();
        assert_eq!(
            req,
            PopupRequest::GetOccurrence {
                options: OccurrenceQuery {
                    cardinality: Cardinality::All
                }
            }
        );
    }

    #[test]
    fn responses_serialize_with_action_tag() {
        assert_eq!(
            serde_json::to_value(PopupResponse::IndexUpdate { index: 1, total: 2 }).unwrap(),
            json!({ "action": "index_update", "index": 1, "total": 2 })
        );
        assert_eq!(
            serde_json::to_value(PopupResponse::Unreachable {
                reason: UnreachableReason::OfflineFile
            })
            .unwrap(),
            json!({ "action": "unreachable", "reason": "offline_file" })
        );
        assert_eq!(
            serde_json::to_value(PopupResponse::EmptyRegex).unwrap(),
            json!({ "action": "empty_regex" })
        );
    }

    #[test]
    fn page_commands_accept_short_aliases() {
        let cmd: PageCommand = serde_json::from_value(json!({
            "action": "seek",
            "index": 3
        }))
        .unwrap();
        assert!(matches!(cmd, PageCommand::HighlightSeek { index: 3, .. }));
        assert_eq!(cmd.name(), "highlight_seek");

        let cmd: PageCommand = serde_json::from_value(json!({
            "action": "update",
            "occurrenceMap": { "occurrenceIndexMap": [], "length": 0, "groups": [] },
            "index": 0,
            "regex": "x"
        }))
        .unwrap();
        assert!(matches!(cmd, PageCommand::HighlightUpdate { .. }));
    }

    #[test]
    fn page_replies_decode_by_shape() {
        let reply: PageReply = serde_json::from_value(json!({ "success": true })).unwrap();
        assert_eq!(reply, PageReply::ack());
        let reply: PageReply = serde_json::from_value(json!({ "href": null })).unwrap();
        assert_eq!(reply, PageReply::Link { href: None });
        let reply: PageReply = serde_json::from_value(json!({ "model": { "groups": [] } })).unwrap();
        assert!(matches!(reply, PageReply::Model { .. }));
    }
}
