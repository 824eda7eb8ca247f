pub mod cascade;
pub mod computed;
pub mod syntax;
pub mod values;

pub use cascade::specified_values;
pub use computed::{ComputedStyle, StyleContext, compute_style};
pub use syntax::{Declaration, Rule, Selector, Stylesheet, parse_declarations, parse_stylesheet};
pub use values::{Display, WhiteSpace, parse_display, parse_white_space};
