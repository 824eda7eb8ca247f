//! Session controller side of the extension: one search session per tab,
//! driven by popup requests and talking to its page over a [`bus::PagePort`].

pub mod manager;
pub mod reachability;
pub mod session;
pub mod storage;

pub use manager::SessionManager;
pub use reachability::classify_unreachable;
pub use session::{Session, SessionError, SessionState};
pub use storage::{
    FileStorage, History, HistoryEntry, MemoryStorage, SavedExpressions, Storage, StorageError,
    load_options, save_options,
};
