use bus::{PageCommand, PagePort, PageReply, PortError};
use core_types::{OccurrenceMap, SearchOptions};
use html::{Document, NodeId, dom_utils::closest_link};
use search::SearchPattern;
use url::Url;

use crate::highlighter::{self, FOCUS_CLASS};
use crate::parser;

/// Vertical offset applied after scrolling a focused occurrence into view, so it
/// does not sit flush against the top edge.
pub const SCROLL_OFFSET: i32 = -100;

/// Where the page was last asked to scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub anchor: Option<NodeId>,
    pub offset: i32,
}

impl Viewport {
    pub fn scroll_into_view(&mut self, node: NodeId) {
        self.anchor = Some(node);
        self.offset = SCROLL_OFFSET;
    }
}

/// One loaded page: its live document plus the in-page side of the protocol.
#[derive(Debug, Default)]
pub struct Page {
    document: Document,
    url: Option<Url>,
    viewport: Viewport,
    navigations: Vec<String>,
    /// Options of the latest highlight, for styling that outlives the command.
    options: SearchOptions,
}

impl Page {
    pub fn new(document: Document, url: Option<Url>) -> Self {
        Self {
            document,
            url,
            viewport: Viewport::default(),
            navigations: Vec::new(),
            options: SearchOptions::default(),
        }
    }

    pub fn parse(html: &str, url: Option<Url>) -> Self {
        Self::new(Document::parse(html), url)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Links followed from this page, oldest first.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Current markup of the whole page.
    pub fn html(&self) -> String {
        self.document.inner_html(self.document.root())
    }

    pub fn handle(&mut self, command: PageCommand) -> PageReply {
        log::debug!(target: "content.page", "command {}", command.name());
        match command {
            PageCommand::Init => PageReply::Model {
                model: parser::build_document_model(&mut self.document),
            },
            PageCommand::Poll => PageReply::ack(),
            PageCommand::Restore { uuids } => {
                parser::restore_wrappers(&mut self.document, &uuids);
                PageReply::ack()
            }
            PageCommand::HighlightUpdate {
                occurrence_map,
                index,
                regex,
                options,
            } => PageReply::Success {
                success: self.highlight(&occurrence_map, index, &regex, &options),
            },
            PageCommand::HighlightSeek { index, options } => {
                self.seek(index, &options);
                PageReply::ack()
            }
            PageCommand::HighlightReplace {
                index,
                replace_with,
                ..
            } => PageReply::Success {
                success: highlighter::replace(&mut self.document, index, &replace_with),
            },
            PageCommand::HighlightReplaceAll { replace_with, .. } => PageReply::Success {
                success: highlighter::replace_all(&mut self.document, &replace_with) > 0,
            },
            PageCommand::HighlightRestore => {
                highlighter::restore_highlights(&mut self.document);
                PageReply::ack()
            }
            PageCommand::HighlightUnfocus => {
                highlighter::unfocus(&mut self.document, &self.options);
                PageReply::ack()
            }
            PageCommand::FollowLink => PageReply::Link {
                href: self.follow_link(),
            },
        }
    }

    fn highlight(
        &mut self,
        map: &OccurrenceMap,
        index: usize,
        regex: &str,
        options: &SearchOptions,
    ) -> bool {
        highlighter::restore_highlights(&mut self.document);
        let pattern = match SearchPattern::from_prepared(regex, options) {
            Ok(pattern) => pattern,
            Err(err) => {
                log::warn!(target: "content.page", "cannot highlight {regex:?}: {err}");
                return false;
            }
        };
        highlighter::highlight_all(&mut self.document, map, &pattern, options);
        self.seek(index, options);
        true
    }

    fn seek(&mut self, index: usize, options: &SearchOptions) {
        self.options = options.clone();
        if let Some(anchor) = highlighter::seek(&mut self.document, index, options) {
            self.viewport.scroll_into_view(anchor);
        }
    }

    /// Follow the link around the focused occurrence, resolved against the page URL.
    fn follow_link(&mut self) -> Option<String> {
        let doc = &self.document;
        let focused = doc.elements_by_class(FOCUS_CLASS).into_iter().next()?;
        let (_, href) = closest_link(doc, focused)?;
        let resolved = match &self.url {
            Some(base) => match base.join(href) {
                Ok(url) => url.to_string(),
                Err(err) => {
                    log::warn!(target: "content.page", "cannot resolve {href:?}: {err}");
                    href.to_string()
                }
            },
            None => href.to_string(),
        };
        log::info!(target: "content.page", "navigating to {resolved}");
        self.navigations.push(resolved.clone());
        Some(resolved)
    }
}

impl PagePort for Page {
    fn request(&mut self, command: PageCommand) -> Result<PageReply, PortError> {
        Ok(self.handle(command))
    }
}
