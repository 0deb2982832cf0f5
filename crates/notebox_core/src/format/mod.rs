//! Rich-text list formatting over serialized HTML fragments.
//!
//! # Responsibility
//! - Parse and re-serialize the widget's own content grammar.
//! - Convert lines between plain text and checkbox/bullet/number items.
//! - Derive display metadata (character counts, timestamps).
//!
//! # Invariants
//! - The three item kinds are mutually exclusive per rendered line.
//! - Number ordinals are 1-based positions in document order, no gaps.
//! - Markers are never treated as editable content.

pub mod list;
pub mod meta;
pub mod region;
