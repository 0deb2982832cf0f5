//! Core document model and list-formatting engine for the Notebox
//! note widget. This crate is the single source of truth for business
//! invariants; rendering and event binding live in the host layer.

pub mod app;
pub mod db;
pub mod format;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use app::gesture::{PressOutcome, PressTracker, LONG_PRESS_MS};
pub use app::navigation::NavigationState;
pub use app::{BreadcrumbSegment, NotesApp};
pub use format::list::{
    apply_kind, backspace_merge, renumber, soft_break, split_item, toggle_checked, Applied, Caret,
};
pub use format::meta::{char_count, format_timestamp, metadata_line};
pub use format::region::{BufferRegion, EditableRegion, ListKind, Region, Selection};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Item, ItemId, ItemKind};
pub use repo::document_repo::{
    DocumentRepository, SqliteDocumentRepository, StoreError, StoreResult, STORAGE_KEY,
};
pub use service::document_service::{DocumentError, DocumentService, ItemChange};
