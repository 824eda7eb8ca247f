pub mod dom_utils;
pub mod traverse;

mod dom;
mod dom_builder;
mod entities;
mod serialize;
mod tokenizer;
mod types;

pub use crate::dom::Document;
pub use crate::dom_builder::build_dom;
pub use crate::entities::{decode_entities, encode_entities};
pub use crate::tokenizer::tokenize;
pub use crate::traverse::{Filter, TreeWalker};
pub use crate::types::{DomError, NodeId, NodeKind, Token};
