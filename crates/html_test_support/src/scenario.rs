use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A manifest file holding `[[case]]` tables.
#[derive(Debug, Deserialize)]
pub struct ScenarioFile {
    #[serde(rename = "case", default)]
    pub cases: Vec<Scenario>,
}

/// One end-to-end search session over a fixed page.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub html: String,
    pub pattern: String,
    /// Partial options table; the consumer fills in defaults.
    #[serde(default)]
    pub options: toml::Table,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: Expectation,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "do", rename_all = "snake_case")]
pub enum Step {
    Next,
    Previous,
    Update { pattern: String },
    ReplaceNext { index: usize, with: String },
    ReplaceAll { with: String },
}

/// Checks applied after the last step. Unset fields are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expectation {
    /// `action` of the last popup response.
    pub response: Option<String>,
    pub index: Option<usize>,
    pub total: Option<usize>,
    /// Every occurrence's matched text, in order.
    pub matches: Option<Vec<String>>,
    /// Page text content after the session ends.
    pub text: Option<String>,
    /// Number of distinct occurrence indices carrying highlight markup.
    pub highlighted: Option<usize>,
}

/// Load every `*.toml` manifest in `dir`, sorted by file name.
pub fn load_scenarios(dir: &Path) -> Vec<(PathBuf, Scenario)> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read scenario dir {dir:?}: {err}"))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut out = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read scenario file {path:?}: {err}"));
        let file: ScenarioFile = toml::from_str(&content)
            .unwrap_or_else(|err| panic!("invalid scenario file {path:?}: {err}"));
        assert!(!file.cases.is_empty(), "scenario file {path:?} has no cases");
        out.extend(file.cases.into_iter().map(|case| (path.clone(), case)));
    }
    out
}
