//! Document store: the in-memory item collection and its operations.
//!
//! # Responsibility
//! - Own the ordered item collection and the id allocator.
//! - Validate hierarchy invariants (folder parents, no cycles).
//! - Persist the full collection after every committed mutation.
//!
//! # Invariants
//! - Ids are unique across the whole collection, folders included.
//! - Deleting a folder removes its transitive descendants first.
//! - Edits bubble `last_modified` up the ancestor folder chain.
//! - At most one item is `expanded` at a time.

use crate::model::item::{epoch_ms_now, Item, ItemId, ItemKind};
use crate::repo::document_repo::{DocumentRepository, StoreError};
use log::{debug, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field mutation applied by [`DocumentService::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemChange {
    /// Replace the plain-text title.
    Title(String),
    /// Replace the HTML fragment body.
    Content(String),
    /// Reparent under another folder (`None` = root).
    Parent(Option<ItemId>),
}

/// Errors from document store operations.
#[derive(Debug)]
pub enum DocumentError {
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Requested parent does not exist.
    ParentNotFound(ItemId),
    /// Requested parent exists but is not a folder.
    ParentMustBeFolder(ItemId),
    /// Reparenting would make the item its own descendant.
    CycleDetected { item: ItemId, parent: ItemId },
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent folder not found: {id}"),
            Self::ParentMustBeFolder(id) => write!(f, "parent must be a folder: {id}"),
            Self::CycleDetected { item, parent } => {
                write!(f, "reparent would create cycle: item {item} under {parent}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DocumentError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// In-memory document store over a persistence repository.
///
/// The collection is exclusively owned by one UI session; every
/// operation runs to completion and commits before the next one, so
/// there is no transactional rollback and no concurrent mutation.
pub struct DocumentService<R: DocumentRepository> {
    repo: R,
    items: Vec<Item>,
    last_id: ItemId,
}

impl<R: DocumentRepository> DocumentService<R> {
    /// Loads the persisted collection into a fresh store.
    pub fn load(repo: R) -> Result<Self, DocumentError> {
        let items = repo.load_items()?;
        let last_id = items.iter().map(|item| item.id).max().unwrap_or(0);
        info!(
            "event=store_load module=store status=ok items={} last_id={last_id}",
            items.len()
        );
        Ok(Self {
            repo,
            items,
            last_id,
        })
    }

    /// Creates a new item at the end of the collection.
    ///
    /// A folder parent, when given, must exist; its ancestor chain gets
    /// a timestamp refresh.
    pub fn create(
        &mut self,
        kind: ItemKind,
        parent_id: Option<ItemId>,
    ) -> Result<ItemId, DocumentError> {
        if let Some(parent) = parent_id {
            self.ensure_folder(parent)?;
        }

        let now = epoch_ms_now();
        let id = self.next_id(now);
        self.items.push(Item::new(id, kind, parent_id, now));
        self.touch_ancestors(parent_id, now);
        self.persist()?;

        debug!("event=item_create module=store status=ok kind={kind:?} id={id}");
        Ok(id)
    }

    /// Applies one field mutation and refreshes timestamps.
    pub fn update(&mut self, id: ItemId, change: ItemChange) -> Result<(), DocumentError> {
        let now = epoch_ms_now();

        if let ItemChange::Parent(new_parent) = &change {
            if let Some(parent) = new_parent {
                self.ensure_folder(*parent)?;
                if self.would_create_cycle(id, *parent) {
                    return Err(DocumentError::CycleDetected {
                        item: id,
                        parent: *parent,
                    });
                }
            }
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(DocumentError::ItemNotFound(id))?;
        match change {
            ItemChange::Title(title) => item.title = title,
            ItemChange::Content(content) => item.content = content,
            ItemChange::Parent(parent) => item.parent_id = parent,
        }
        item.touch(now);
        let parent = item.parent_id;

        self.touch_ancestors(parent, now);
        self.persist()
    }

    /// Deletes an item; folders cascade over all descendants first.
    ///
    /// Returns every removed id (depth-first, the target last) so the
    /// caller can clear any selection pointing into the subtree.
    pub fn delete(&mut self, id: ItemId) -> Result<Vec<ItemId>, DocumentError> {
        let parent = self
            .get(id)
            .ok_or(DocumentError::ItemNotFound(id))?
            .parent_id;

        let mut removed = Vec::new();
        self.collect_subtree(id, &mut removed);
        self.items.retain(|item| !removed.contains(&item.id));

        self.touch_ancestors(parent, epoch_ms_now());
        self.persist()?;

        debug!(
            "event=item_delete module=store status=ok id={id} removed={}",
            removed.len()
        );
        Ok(removed)
    }

    /// Returns the children of a folder (root for `None`) in insertion
    /// order.
    pub fn query(&self, parent_id: Option<ItemId>) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.parent_id == parent_id)
            .collect()
    }

    /// Looks up one item by id.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Recursive maximum of `last_modified` over an item and, for
    /// folders, all of its descendants. `None` when no timestamp
    /// exists anywhere in the subtree.
    pub fn aggregate_last_modified(&self, id: ItemId) -> Option<i64> {
        let mut visited = HashSet::new();
        self.aggregate_inner(id, &mut visited)
    }

    /// Whole collection in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Expands one item, collapsing every other. Transient state; not
    /// persisted. Returns false when the id is unknown.
    pub fn set_expanded(&mut self, id: ItemId, expanded: bool) -> bool {
        if !self.items.iter().any(|item| item.id == id) {
            return false;
        }
        for item in &mut self.items {
            item.expanded = expanded && item.id == id;
        }
        true
    }

    /// Collapses every item. Transient state; not persisted.
    pub fn collapse_all(&mut self) {
        for item in &mut self.items {
            item.expanded = false;
        }
    }

    fn next_id(&mut self, now_ms: i64) -> ItemId {
        self.last_id = now_ms.max(self.last_id + 1);
        self.last_id
    }

    fn ensure_folder(&self, id: ItemId) -> Result<(), DocumentError> {
        let parent = self.get(id).ok_or(DocumentError::ParentNotFound(id))?;
        if !parent.is_folder() {
            return Err(DocumentError::ParentMustBeFolder(id));
        }
        Ok(())
    }

    fn would_create_cycle(&self, item: ItemId, candidate_parent: ItemId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == item || !visited.insert(current) {
                return true;
            }
            cursor = self.get(current).and_then(|node| node.parent_id);
        }
        false
    }

    fn collect_subtree(&self, id: ItemId, out: &mut Vec<ItemId>) {
        let children: Vec<ItemId> = self
            .items
            .iter()
            .filter(|item| item.parent_id == Some(id))
            .map(|item| item.id)
            .collect();
        for child in children {
            if !out.contains(&child) {
                self.collect_subtree(child, out);
            }
        }
        out.push(id);
    }

    fn touch_ancestors(&mut self, start: Option<ItemId>, now_ms: i64) {
        let mut visited = HashSet::new();
        let mut cursor = start;
        while let Some(id) = cursor {
            if !visited.insert(id) {
                break;
            }
            let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
                break;
            };
            item.touch(now_ms);
            cursor = item.parent_id;
        }
    }

    fn aggregate_inner(&self, id: ItemId, visited: &mut HashSet<ItemId>) -> Option<i64> {
        if !visited.insert(id) {
            return None;
        }
        let item = self.get(id)?;
        let mut best = item.last_modified;
        if item.is_folder() {
            let children: Vec<ItemId> = self
                .items
                .iter()
                .filter(|child| child.parent_id == Some(id))
                .map(|child| child.id)
                .collect();
            for child in children {
                best = match (best, self.aggregate_inner(child, visited)) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
            }
        }
        best
    }

    fn persist(&self) -> Result<(), DocumentError> {
        self.repo.save_items(&self.items)?;
        Ok(())
    }
}
