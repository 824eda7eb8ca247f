use bus::{
    Cardinality, PageCommand, PagePort, PageReply, PopupRequest, PopupResponse, PortError,
    UnreachableReason,
};
use core_types::{DocumentModel, OccurrenceMap, SearchOptions};
use search::{PatternError, SearchPattern, build_occurrence_map};

use crate::reachability::classify_unreachable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("page at {url} is unreachable ({reason:?})")]
    Unreachable {
        url: String,
        reason: UnreachableReason,
    },
    #[error(transparent)]
    Port(#[from] PortError),
}

impl SessionError {
    /// The message the popup shows for this failure.
    pub fn response(&self) -> PopupResponse {
        match self {
            SessionError::Unreachable { reason, .. } => PopupResponse::Unreachable { reason: *reason },
            SessionError::Port(_) => PopupResponse::Unreachable {
                reason: UnreachableReason::NoResponse,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No document model yet.
    Idle,
    /// Document model built, no search yet.
    Initialized,
    /// An occurrence map is current.
    Searching,
}

/// Search state for one tab, driving its page through a [`PagePort`].
#[derive(Debug)]
pub struct Session<P> {
    port: P,
    tab_url: String,
    model: Option<DocumentModel>,
    map: Option<OccurrenceMap>,
    index: usize,
    /// Last pattern text the popup submitted, before any escaping.
    regex: String,
    options: SearchOptions,
}

impl<P: PagePort> Session<P> {
    pub fn new(port: P, tab_url: impl Into<String>) -> Self {
        Self {
            port,
            tab_url: tab_url.into(),
            model: None,
            map: None,
            index: 0,
            regex: String::new(),
            options: SearchOptions::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.model, &self.map) {
            (None, _) => SessionState::Idle,
            (Some(_), None) => SessionState::Initialized,
            (Some(_), Some(_)) => SessionState::Searching,
        }
    }

    pub fn model(&self) -> Option<&DocumentModel> {
        self.model.as_ref()
    }

    pub fn occurrence_map(&self) -> Option<&OccurrenceMap> {
        self.map.as_ref()
    }

    /// 0-based focus index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn tab_url(&self) -> &str {
        &self.tab_url
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    /// Check that the page answers, then build its document model.
    pub fn open(&mut self) -> Result<(), SessionError> {
        match self.port.request(PageCommand::Poll) {
            Ok(PageReply::Success { success: true }) => {}
            Ok(_) | Err(_) => return Err(self.unreachable()),
        }
        let model = self.request_model().map_err(|_| self.unreachable())?;
        log::info!(
            target: "background.session",
            "session opened on {}: {} group(s)",
            self.tab_url,
            model.len()
        );
        self.model = Some(model);
        self.map = None;
        self.index = 0;
        Ok(())
    }

    fn unreachable(&self) -> SessionError {
        let reason = classify_unreachable(&self.tab_url);
        log::warn!(
            target: "background.session",
            "{} did not respond ({reason:?})",
            self.tab_url
        );
        SessionError::Unreachable {
            url: self.tab_url.clone(),
            reason,
        }
    }

    fn request_model(&mut self) -> Result<DocumentModel, SessionError> {
        match self.port.request(PageCommand::Init)? {
            PageReply::Model { model } => Ok(model),
            _ => Err(PortError::UnexpectedReply("init").into()),
        }
    }

    /// Answer one popup request. Failures talking to the page become an
    /// `unreachable` response.
    pub fn handle(&mut self, request: PopupRequest) -> PopupResponse {
        let result = match request {
            PopupRequest::Update { regex, options } => self.update(regex, options),
            PopupRequest::Next { options } => self.seek(true, options),
            PopupRequest::Previous { options } => self.seek(false, options),
            PopupRequest::ReplaceNext {
                index,
                replace_with,
                options,
            } => self.replace_next(index, replace_with, options),
            PopupRequest::ReplaceAll {
                replace_with,
                options,
            } => self.replace_all(replace_with, options),
            PopupRequest::FollowLink { options } => self.follow_link(options),
            PopupRequest::GetOccurrence { options } => Ok(self.occurrences(options.cardinality)),
        };
        result.unwrap_or_else(|err| {
            log::warn!(target: "background.session", "request failed: {err}");
            err.response()
        })
    }

    fn index_update(&self) -> PopupResponse {
        let view = self
            .map
            .as_ref()
            .map(|map| map.viewable(self.index, self.options.max_results))
            .unwrap_or_default();
        PopupResponse::IndexUpdate {
            index: view.index,
            total: view.total,
        }
    }

    /// Search for `regex`, highlight every occurrence and focus the current index.
    pub fn update(
        &mut self,
        regex: String,
        options: SearchOptions,
    ) -> Result<PopupResponse, SessionError> {
        self.regex = regex;
        self.options = options;
        if self.model.is_none() {
            self.open()?;
        }

        let pattern = match SearchPattern::new(&self.regex, &self.options) {
            Ok(pattern) => pattern,
            Err(err) => {
                self.map = None;
                self.port.request(PageCommand::HighlightRestore)?;
                log::debug!(target: "background.session", "pattern {:?} rejected: {err}", self.regex);
                return Ok(match err {
                    PatternError::Empty => PopupResponse::EmptyRegex,
                    PatternError::Invalid(error) => PopupResponse::InvalidRegex { error },
                });
            }
        };

        let Some(model) = self.model.as_ref() else {
            return Err(self.unreachable());
        };
        let map = build_occurrence_map(model, &pattern, &self.options);
        self.index = map.clamp_index(self.index, self.options.max_results);
        self.port.request(PageCommand::HighlightUpdate {
            occurrence_map: map.clone(),
            index: self.index,
            regex: pattern.source().to_string(),
            options: self.options.clone(),
        })?;
        log::debug!(
            target: "background.session",
            "{} occurrence(s) of {:?}, focus {}",
            map.length,
            pattern.source(),
            self.index
        );
        self.map = Some(map);
        Ok(self.index_update())
    }

    fn seek(&mut self, forward: bool, options: SearchOptions) -> Result<PopupResponse, SessionError> {
        let Some(map) = self.map.as_ref() else {
            let regex = self.regex.clone();
            return self.update(regex, options);
        };
        self.options = options;
        if map.is_empty() {
            return Ok(self.index_update());
        }
        let max_results = self.options.max_results;
        self.index = if forward {
            map.next_index(self.index, max_results)
        } else {
            map.previous_index(self.index, max_results)
        };
        self.port.request(PageCommand::HighlightSeek {
            index: self.index,
            options: self.options.clone(),
        })?;
        Ok(self.index_update())
    }

    /// `index` is 1-based, as shown to the user.
    fn replace_next(
        &mut self,
        index: usize,
        replace_with: String,
        options: SearchOptions,
    ) -> Result<PopupResponse, SessionError> {
        let in_range = self
            .map
            .as_ref()
            .is_some_and(|map| index != 0 && index <= map.length);
        if !in_range {
            log::debug!(target: "background.session", "replace of occurrence {index} ignored");
            return Ok(self.index_update());
        }
        self.port.request(PageCommand::HighlightReplace {
            index: index - 1,
            replace_with,
            options,
        })?;
        self.rebuild()?;
        Ok(PopupResponse::Invalidate)
    }

    fn replace_all(
        &mut self,
        replace_with: String,
        options: SearchOptions,
    ) -> Result<PopupResponse, SessionError> {
        if self.map.is_none() {
            return Ok(self.index_update());
        }
        self.port.request(PageCommand::HighlightReplaceAll {
            replace_with,
            options,
        })?;
        self.rebuild()?;
        Ok(PopupResponse::Invalidate)
    }

    /// The page changed under the model: strip all markup and build a fresh model.
    fn rebuild(&mut self) -> Result<(), SessionError> {
        self.port.request(PageCommand::HighlightRestore)?;
        if let Some(model) = self.model.take() {
            self.port.request(PageCommand::Restore {
                uuids: model.uuids(),
            })?;
        }
        self.map = None;
        self.model = Some(self.request_model()?);
        Ok(())
    }

    fn follow_link(&mut self, options: SearchOptions) -> Result<PopupResponse, SessionError> {
        self.options = options;
        match self.port.request(PageCommand::FollowLink)? {
            PageReply::Link { href: Some(href) } => {
                log::info!(target: "background.session", "followed link to {href}");
            }
            _ => log::debug!(target: "background.session", "no link under focus"),
        }
        Ok(PopupResponse::Close)
    }

    fn occurrences(&self, cardinality: Cardinality) -> PopupResponse {
        let response = match (&self.map, cardinality) {
            (None, _) => String::new(),
            (Some(map), Cardinality::Single) => map
                .get(self.index)
                .map(|o| o.matched_text.clone())
                .unwrap_or_default(),
            (Some(map), Cardinality::All) => map
                .occurrence_index_map
                .iter()
                .map(|o| o.matched_text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        PopupResponse::GetOccurrence { response }
    }

    /// Tear the session down. Unless highlights persist, every highlight is removed;
    /// the wrappers are always removed. The session is `Idle` afterwards.
    pub fn end(&mut self) {
        let persistent = self.options.persistent_highlights;
        let command = if persistent {
            PageCommand::HighlightUnfocus
        } else {
            PageCommand::HighlightRestore
        };
        if let Err(err) = self.port.request(command) {
            log::warn!(target: "background.session", "cannot clear highlights: {err}");
        }
        if let Some(model) = self.model.take() {
            let uuids = model.uuids();
            if let Err(err) = self.port.request(PageCommand::Restore { uuids }) {
                log::warn!(target: "background.session", "cannot restore page: {err}");
            }
        }
        self.map = None;
        self.index = 0;
        log::info!(
            target: "background.session",
            "session on {} ended (persistent highlights: {persistent})",
            self.tab_url
        );
    }
}
