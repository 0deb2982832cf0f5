//! Item domain model and persisted record shape.
//!
//! # Responsibility
//! - Define the `Item` record shared by container/folder projections.
//! - Map between the in-memory model and the stored JSON record,
//!   applying the lenient defaulting rules for legacy payloads.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - Folders never carry meaningful `content`.
//! - Loading always resets `expanded` to `false`.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier for every item in the collection.
///
/// Derived from the creation timestamp in epoch milliseconds; the
/// allocator bumps past collisions so the value stays unique even for
/// creations within the same millisecond.
pub type ItemId = i64;

/// Item variant: an editable note or a grouping folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Rich-text note with an HTML fragment body.
    #[default]
    Container,
    /// Grouping node; `content` stays empty.
    Folder,
}

/// One entry of the widget's ordered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stable identity key, shared id space across both kinds.
    pub id: ItemId,
    /// Container or folder.
    pub kind: ItemKind,
    /// User-editable plain-text title.
    pub title: String,
    /// HTML fragment body. Unused for folders.
    pub content: String,
    /// Parent folder id. `None` means root level.
    pub parent_id: Option<ItemId>,
    /// Transient UI flag; at most one item is expanded at a time.
    pub expanded: bool,
    /// Epoch ms of the last title/content edit, if any.
    pub last_modified: Option<i64>,
}

impl Item {
    /// Creates a fresh item with empty title/content.
    pub fn new(id: ItemId, kind: ItemKind, parent_id: Option<ItemId>, now_ms: i64) -> Self {
        Self {
            id,
            kind,
            title: String::new(),
            content: String::new(),
            parent_id,
            expanded: false,
            last_modified: Some(now_ms),
        }
    }

    /// Refreshes the modification timestamp.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_modified = Some(now_ms);
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }
}

/// Persisted record shape: one element of the stored JSON array.
///
/// Field names follow the legacy payload (`parentId`, `lastModified`,
/// `kind` with a `type` alias). Missing fields are defaulted rather
/// than rejected, so old payloads keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: ItemId,
    #[serde(default, alias = "type", deserialize_with = "kind_or_container")]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "parentId")]
    pub parent_id: Option<ItemId>,
    #[serde(
        default,
        rename = "lastModified",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
}

impl StoredItem {
    /// Converts a loaded record into the domain model.
    ///
    /// `expanded` always starts collapsed; an unparseable timestamp
    /// string degrades to `None` instead of failing the whole load.
    pub fn into_item(self) -> Item {
        Item {
            id: self.id,
            kind: self.kind,
            title: self.title,
            content: self.content,
            parent_id: self.parent_id,
            expanded: false,
            last_modified: self.last_modified.as_deref().and_then(parse_timestamp),
        }
    }

    /// Builds the persisted record for one item.
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            kind: item.kind,
            title: item.title.clone(),
            content: item.content.clone(),
            parent_id: item.parent_id,
            last_modified: item.last_modified.map(format_timestamp_rfc3339),
        }
    }
}

/// Epoch milliseconds for "now".
pub fn epoch_ms_now() -> i64 {
    Utc::now().timestamp_millis()
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.timestamp_millis())
        .ok()
}

fn format_timestamp_rfc3339(epoch_ms: i64) -> String {
    match Utc.timestamp_millis_opt(epoch_ms).single() {
        Some(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => String::new(),
    }
}

// Unknown or null kind values degrade to `Container`, matching the
// load-time tolerance rules for every other field.
fn kind_or_container<'de, D>(deserializer: D) -> Result<ItemKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some(value) if value.eq_ignore_ascii_case("folder") => ItemKind::Folder,
        _ => ItemKind::Container,
    })
}
