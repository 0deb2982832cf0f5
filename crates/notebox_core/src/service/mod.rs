//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the in-memory collection and its persistence.
//! - Keep UI layers decoupled from storage details.

pub mod document_service;
