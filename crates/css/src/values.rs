/// CSS `display` value, reduced to what text extraction cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    ListItem,
    None,
}

/// CSS `white-space` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhiteSpace {
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

/// Parse a `display` value. Unknown values are ignored by the caller.
///
/// `hidden` is not a CSS display value, but pages use it and browsers that honour
/// it hide the element, so it maps to `None`.
pub fn parse_display(value: &str) -> Option<Display> {
    let v = value.trim().to_ascii_lowercase();

    match v.as_str() {
        "block" | "flex" | "grid" | "table" | "flow-root" => Some(Display::Block),
        "inline" => Some(Display::Inline),
        "inline-block" | "inline-flex" | "inline-grid" | "inline-table" => {
            Some(Display::InlineBlock)
        }
        "list-item" => Some(Display::ListItem),
        "none" | "hidden" => Some(Display::None),
        _ => None,
    }
}

pub fn parse_white_space(value: &str) -> Option<WhiteSpace> {
    let v = value.trim().to_ascii_lowercase();

    match v.as_str() {
        "normal" => Some(WhiteSpace::Normal),
        "nowrap" => Some(WhiteSpace::NoWrap),
        "pre" => Some(WhiteSpace::Pre),
        "pre-wrap" => Some(WhiteSpace::PreWrap),
        "pre-line" => Some(WhiteSpace::PreLine),
        _ => None,
    }
}
