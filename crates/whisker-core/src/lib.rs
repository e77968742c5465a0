//! Canonical story model and template evaluator for the Whisker editor.
//!
//! Importers for foreign formats live in their own crates and produce a
//! [`story::StoryDocument`] through the [`pipeline::Importer`] trait.

pub mod error;
pub mod pipeline;
pub mod story;
pub mod template;
