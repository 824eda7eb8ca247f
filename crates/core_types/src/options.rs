use serde::{Deserialize, Serialize};

/// HSV colour record as stored by the options panel, plus its hex form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighlightColor {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
    #[serde(rename = "hexColor")]
    pub hex_color: String,
}

impl HighlightColor {
    pub fn index_default() -> Self {
        HighlightColor {
            hue: 34.0,
            saturation: 0.925,
            value: 1.0,
            hex_color: "#ff9813".to_string(),
        }
    }

    pub fn all_default() -> Self {
        HighlightColor {
            hue: 56.0,
            saturation: 1.0,
            value: 1.0,
            hex_color: "#fff000".to_string(),
        }
    }
}

/// Options for one search. Missing keys fall back to the defaults, unknown keys
/// (popup-only settings) are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub find_by_regex: bool,
    pub match_case: bool,
    pub persistent_highlights: bool,
    pub persistent_storage_incognito: bool,
    /// 0 means unlimited.
    pub max_results: usize,
    pub index_highlight_color: HighlightColor,
    pub all_highlight_color: HighlightColor,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            find_by_regex: true,
            match_case: true,
            persistent_highlights: false,
            persistent_storage_incognito: false,
            max_results: 0,
            index_highlight_color: HighlightColor::index_default(),
            all_highlight_color: HighlightColor::all_default(),
        }
    }
}

impl SearchOptions {
    pub fn result_cap(&self) -> Option<usize> {
        (self.max_results != 0).then_some(self.max_results)
    }
}
