use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::{HISTORY_KEY, Storage, StorageError};

/// Hosts remembered at most; older entries are pruned first.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Last expression searched on each host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: BTreeMap<String, HistoryEntry>,
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl History {
    pub fn load(storage: &dyn Storage) -> Self {
        let entries = storage
            .get(HISTORY_KEY)
            .and_then(|value| match serde_json::from_value(value) {
                Ok(entries) => Some(entries),
                Err(err) => {
                    log::warn!(target: "background.storage", "history unreadable, starting empty: {err}");
                    None
                }
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        storage.set(HISTORY_KEY, serde_json::to_value(&self.entries)?)
    }

    /// History key for a tab: its host, or `None` for host-less URLs.
    pub fn host_of(tab_url: &str) -> Option<String> {
        let url = url::Url::parse(tab_url).ok()?;
        url.host_str().map(str::to_string)
    }

    pub fn retrieve_for_host(&self, host: &str) -> Option<&HistoryEntry> {
        self.entries.get(host)
    }

    /// Remember `expression` for `host`, then prune to [`HISTORY_LIMIT`] hosts.
    pub fn record(&mut self, host: &str, expression: &str, timestamp: u64) {
        self.entries.insert(
            host.to_string(),
            HistoryEntry {
                expression: expression.to_string(),
                timestamp,
            },
        );
        if self.entries.len() <= HISTORY_LIMIT {
            return;
        }
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(host, entry)| (entry.timestamp, host.clone()))
            .collect();
        by_age.sort();
        let excess = self.entries.len() - HISTORY_LIMIT;
        for (_, host) in by_age.into_iter().take(excess) {
            self.entries.remove(&host);
        }
        log::debug!(target: "background.storage", "history pruned by {excess}");
    }

    /// Load, record and save in one step.
    pub fn save_for_host(
        storage: &mut dyn Storage,
        host: &str,
        expression: &str,
    ) -> Result<(), StorageError> {
        let mut history = Self::load(storage);
        history.record(host, expression, now_millis());
        history.save(storage)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
