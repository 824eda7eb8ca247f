use core_types::SearchOptions;
use regex::{Match, Regex, RegexBuilder};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// Nothing left to search for after preparation.
    #[error("search pattern is empty")]
    Empty,
    /// The pattern did not compile; carries the compiler message.
    #[error("{0}")]
    Invalid(String),
}

/// Characters escaped when searching for literal text.
const LITERAL_META: &[char] = &[
    '-', '[', ']', '/', '{', '}', '(', ')', '*', '+', '?', '.', '\\', '^', '$', '|',
];

/// Escape every regex metacharacter in `raw` so it matches itself.
pub fn escape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if LITERAL_META.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// A compiled search.
///
/// The *prepared* source is the user's text after literal-mode escaping; it is the
/// form passed between the session and the page, and recompiling it with
/// [`SearchPattern::from_prepared`] yields the same matcher.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    source: String,
    regex: Regex,
}

impl SearchPattern {
    pub fn new(raw: &str, options: &SearchOptions) -> Result<Self, PatternError> {
        let source = if options.find_by_regex {
            raw.to_string()
        } else {
            escape_literal(raw)
        };
        Self::from_prepared(&source, options)
    }

    /// Compile an already-prepared source. Spaces match any whitespace run's
    /// single collapsed character, so each becomes `\s`.
    pub fn from_prepared(source: &str, options: &SearchOptions) -> Result<Self, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }
        let expanded = source.replace(' ', "\\s");
        let regex = RegexBuilder::new(&expanded)
            .multi_line(true)
            .case_insensitive(!options.match_case)
            .build()
            .map_err(|err| PatternError::Invalid(err.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Non-overlapping matches left to right; zero-length matches are not
    /// occurrences and are skipped.
    pub fn find_iter<'h>(&self, haystack: &'h str) -> impl Iterator<Item = Match<'h>> {
        self.regex.find_iter(haystack).filter(|m| !m.is_empty())
    }
}
