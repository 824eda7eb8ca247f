use std::collections::HashMap;

use bus::{PagePort, PopupRequest, PopupResponse, UnreachableReason};
use core_types::TabId;

use crate::session::{Session, SessionError};

/// One [`Session`] per tab. A tab has a session only between a successful
/// [`open`](SessionManager::open) and the matching [`close`](SessionManager::close).
#[derive(Debug)]
pub struct SessionManager<P> {
    sessions: HashMap<TabId, Session<P>>,
}

impl<P> Default for SessionManager<P> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<P: PagePort> SessionManager<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `tab`. An earlier session on the same tab is ended
    /// (its page fully restored) before the new one is built, and its port is
    /// handed back. On failure the new port is dropped, the earlier session is
    /// still ended, and no session is registered.
    pub fn open(&mut self, tab: TabId, port: P, tab_url: &str) -> Result<Option<P>, SessionError> {
        let previous = self.sessions.remove(&tab).map(|mut previous| {
            log::debug!(target: "background.manager", "tab {tab} reopened, ending old session");
            previous.end();
            previous.into_port()
        });
        let mut session = Session::new(port, tab_url);
        session.open()?;
        self.sessions.insert(tab, session);
        log::info!(
            target: "background.manager",
            "tab {tab} connected ({} open)",
            self.sessions.len()
        );
        Ok(previous)
    }

    pub fn handle(&mut self, tab: TabId, request: PopupRequest) -> PopupResponse {
        match self.sessions.get_mut(&tab) {
            Some(session) => session.handle(request),
            None => {
                log::warn!(target: "background.manager", "no session for tab {tab}");
                PopupResponse::Unreachable {
                    reason: UnreachableReason::NoResponse,
                }
            }
        }
    }

    /// The popup for `tab` disconnected: tear its session down and hand back the port.
    pub fn close(&mut self, tab: TabId) -> Option<P> {
        let mut session = self.sessions.remove(&tab)?;
        session.end();
        log::info!(target: "background.manager", "tab {tab} disconnected");
        Some(session.into_port())
    }

    pub fn get(&self, tab: TabId) -> Option<&Session<P>> {
        self.sessions.get(&tab)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
