//! In-page side of a find session: the document model builder, the highlight
//! engine and the [`Page`] that answers protocol commands.

pub mod highlighter;
pub mod parser;

mod page;

pub use highlighter::{FOCUS_CLASS, HIGHLIGHT_CLASS, occurrence_class};
pub use page::{Page, SCROLL_OFFSET, Viewport};
pub use parser::{WRAPPER_STYLE, build_document_model, restore_wrappers};
