//! Chat message types and parsing.

mod nom_parser;
mod parse;
mod serialize;
/// Tag value escaping utilities.
pub mod tags;
mod types;

pub use self::types::{Message, Tag};
