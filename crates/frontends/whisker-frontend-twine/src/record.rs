//! Accessors over a parsed Twine document.
//!
//! The importer only needs attribute lookup and passage text, so it is
//! written against these traits rather than a concrete HTML representation.
//! [`crate::extract`] provides the implementation over raw compiled HTML.

/// The story root record (`<tw-storydata>`).
pub trait StoryRecord {
    type Passage: PassageRecord;

    /// Attribute value, entity-decoded. `None` when the attribute is absent.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Passage records in document order.
    fn passages(&self) -> &[Self::Passage];
}

/// A passage record (`<tw-passagedata>`).
pub trait PassageRecord {
    /// Attribute value, entity-decoded. `None` when the attribute is absent.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Raw passage source, entity-decoded.
    fn text(&self) -> &str;
}
