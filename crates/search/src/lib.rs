mod occurrence;
mod pattern;

pub use occurrence::build_occurrence_map;
pub use pattern::{PatternError, SearchPattern, escape_literal};
