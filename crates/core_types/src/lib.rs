mod model;
mod occurrence;
mod options;

pub use model::{DocumentModel, Group, TextNodeRef};
pub use occurrence::{Occurrence, OccurrenceGroup, OccurrenceMap, ViewableIndex};
pub use options::{HighlightColor, SearchOptions};

pub type TabId = u64;
