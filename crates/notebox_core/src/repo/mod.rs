//! Persistence boundary for the widget collection.
//!
//! # Responsibility
//! - Define the storage contract for loading/saving the item list.
//! - Isolate SQLite and payload-encoding details from the service layer.
//!
//! # Invariants
//! - The whole collection persists as one opaque value under one key.
//! - Loading applies lenient per-record defaulting, never per-record
//!   rejection.

pub mod document_repo;
