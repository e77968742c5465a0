//! The canonical story document: passages, choices, variables, metadata.

pub mod document;
pub mod passage;
pub mod value;

pub use document::{ForeignOrigin, StoryDocument, StoryFormat, StoryMetadata, StorySettings};
pub use passage::{Choice, Passage, PassageOrigin, Position};
pub use value::{
    format_number, parse_decimal, Value, ValueType, VariableDecl, VariableEnv, Variables,
};
