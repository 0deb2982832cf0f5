//! Domain model for the widget's item collection.
//!
//! # Responsibility
//! - Define the canonical item shape shared by containers and folders.
//! - Define the persisted record shape and its tolerance rules.
//!
//! # Invariants
//! - Every item is identified by a stable integer `ItemId`.
//! - `expanded` is transient UI state and is never restored as `true`.

pub mod item;
