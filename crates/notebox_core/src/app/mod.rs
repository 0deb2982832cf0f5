//! Widget controller: one explicit state object over the document
//! store.
//!
//! # Responsibility
//! - Own the document store, navigation state, selection, and press
//!   tracking for a single UI session.
//! - Wire editable-region events into the list formatter and persist
//!   the results.
//!
//! # Invariants
//! - At most one item is expanded (active) at a time.
//! - Deleting a selected subtree clears the selection.
//! - Folder taps navigate; container taps expand.

pub mod gesture;
pub mod navigation;

use crate::format::list::{apply_kind, toggle_checked, Applied};
use crate::format::meta::metadata_line;
use crate::format::region::{EditableRegion, ListKind};
use crate::model::item::{epoch_ms_now, Item, ItemId, ItemKind};
use crate::repo::document_repo::DocumentRepository;
use crate::service::document_service::{DocumentError, DocumentService, ItemChange};
use gesture::{PressOutcome, PressTracker};
use log::info;
use navigation::NavigationState;

/// One breadcrumb segment: `None` id is the root ("Home") segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbSegment {
    pub id: Option<ItemId>,
    pub title: String,
}

/// Application state for one widget session.
pub struct NotesApp<R: DocumentRepository> {
    docs: DocumentService<R>,
    nav: NavigationState,
    selected: Option<ItemId>,
    active: Option<ItemId>,
    press: PressTracker,
}

impl<R: DocumentRepository> NotesApp<R> {
    /// Loads persisted state into a fresh session.
    pub fn load(repo: R) -> Result<Self, DocumentError> {
        let docs = DocumentService::load(repo)?;
        info!("event=app_load module=app status=ok items={}", docs.items().len());
        Ok(Self {
            docs,
            nav: NavigationState::new(),
            selected: None,
            active: None,
            press: PressTracker::new(),
        })
    }

    /// Creates a new container in the current folder.
    pub fn add_container(&mut self) -> Result<ItemId, DocumentError> {
        self.docs.create(ItemKind::Container, self.nav.current())
    }

    /// Creates a new folder in the current folder.
    pub fn add_folder(&mut self) -> Result<ItemId, DocumentError> {
        self.docs.create(ItemKind::Folder, self.nav.current())
    }

    /// Items of the folder currently in view, insertion order.
    pub fn visible_items(&self) -> Vec<&Item> {
        self.docs.query(self.nav.current())
    }

    /// True when the whole collection is empty (empty-state banner).
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    /// Expanded item, if any.
    pub fn active(&self) -> Option<ItemId> {
        self.active
    }

    /// Whether the delete control should be enabled.
    pub fn delete_enabled(&self) -> bool {
        self.selected.is_some()
    }

    /// Read access to the underlying document store.
    pub fn documents(&self) -> &DocumentService<R> {
        &self.docs
    }

    // ---- press gestures -------------------------------------------------

    /// Pointer down on a collapsed item.
    pub fn on_press_start(&mut self, id: ItemId, now_ms: i64) {
        self.press.press(id, now_ms);
    }

    /// Periodic tick while the pointer is held; fires long-press select.
    pub fn on_press_tick(&mut self, now_ms: i64) {
        if let Some(PressOutcome::Selected(id)) = self.press.poll(now_ms) {
            self.toggle_select(id);
        }
    }

    /// Pointer up; resolves the gesture.
    pub fn on_press_end(&mut self, now_ms: i64) {
        match self.press.release(now_ms) {
            Some(PressOutcome::Selected(id)) => self.toggle_select(id),
            Some(PressOutcome::Opened(id)) => {
                // A tap on the already-selected item only keeps it selected.
                if self.selected != Some(id) {
                    self.activate(id);
                }
            }
            None => {}
        }
    }

    /// Pointer left the item before release.
    pub fn on_press_cancel(&mut self) {
        self.press.cancel();
    }

    // ---- selection and expansion ----------------------------------------

    /// Toggles the long-press selection on an item.
    pub fn toggle_select(&mut self, id: ItemId) {
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    /// Opens an item: containers expand, folders navigate.
    pub fn activate(&mut self, id: ItemId) {
        let Some(item) = self.docs.get(id) else {
            return;
        };
        if item.is_folder() {
            self.open_folder(id);
        } else {
            self.expand(id);
        }
    }

    /// Expands one container, collapsing every other item.
    pub fn expand(&mut self, id: ItemId) {
        if self.docs.set_expanded(id, true) {
            self.selected = None;
            self.active = Some(id);
        }
    }

    /// Collapses everything (overlay click).
    pub fn collapse_all(&mut self) {
        self.docs.collapse_all();
        self.active = None;
    }

    /// Closes one expanded container.
    pub fn close(&mut self, id: ItemId) {
        self.docs.set_expanded(id, false);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    /// Deletes the selected item (cascading for folders). Returns
    /// whether anything was deleted.
    pub fn delete_selected(&mut self) -> Result<bool, DocumentError> {
        let Some(id) = self.selected else {
            return Ok(false);
        };
        let removed = self.docs.delete(id)?;
        if self.active.is_some_and(|active| removed.contains(&active)) {
            self.active = None;
        }
        self.selected = None;
        Ok(true)
    }

    // ---- edits -----------------------------------------------------------

    /// Title edit from the rendering layer.
    pub fn update_title(&mut self, id: ItemId, title: impl Into<String>) -> Result<(), DocumentError> {
        self.docs.update(id, ItemChange::Title(title.into()))
    }

    /// Content edit from the rendering layer.
    pub fn update_content(
        &mut self,
        id: ItemId,
        content: impl Into<String>,
    ) -> Result<(), DocumentError> {
        self.docs.update(id, ItemChange::Content(content.into()))
    }

    /// Moves an item into another folder (`None` = root).
    pub fn move_item(
        &mut self,
        id: ItemId,
        parent: Option<ItemId>,
    ) -> Result<(), DocumentError> {
        self.docs.update(id, ItemChange::Parent(parent))
    }

    /// Toolbar list action on the active container's region.
    ///
    /// Returns `Ok(false)` when nothing was applicable: no active
    /// container, or the formatter reported a no-op.
    pub fn apply_list_kind(
        &mut self,
        region: &mut dyn EditableRegion,
        kind: ListKind,
    ) -> Result<bool, DocumentError> {
        let Some(active) = self.active else {
            return Ok(false);
        };
        let content = region.content();
        let selection = region.selection();
        match apply_kind(&content, selection.as_ref(), kind) {
            Some(applied) => self.commit_region(region, active, applied).map(|()| true),
            None => Ok(false),
        }
    }

    /// Checkbox click inside the active container's region.
    pub fn toggle_item_checkbox(
        &mut self,
        region: &mut dyn EditableRegion,
        item_index: usize,
    ) -> Result<bool, DocumentError> {
        let Some(active) = self.active else {
            return Ok(false);
        };
        match toggle_checked(&region.content(), item_index) {
            Some(applied) => self.commit_region(region, active, applied).map(|()| true),
            None => Ok(false),
        }
    }

    fn commit_region(
        &mut self,
        region: &mut dyn EditableRegion,
        id: ItemId,
        applied: Applied,
    ) -> Result<(), DocumentError> {
        region.set_content(&applied.content);
        self.docs.update(id, ItemChange::Content(applied.content))
    }

    // ---- navigation ------------------------------------------------------

    /// Descends into a folder; selection does not survive navigation.
    pub fn open_folder(&mut self, id: ItemId) {
        self.collapse_all();
        self.selected = None;
        self.nav.open(id);
    }

    pub fn back(&mut self) {
        self.selected = None;
        self.nav.back();
    }

    pub fn to_root(&mut self) {
        self.selected = None;
        self.nav.to_root();
    }

    pub fn jump_to(&mut self, index: usize) {
        self.selected = None;
        self.nav.jump_to(index);
    }

    pub fn current_folder(&self) -> Option<ItemId> {
        self.nav.current()
    }

    /// Breadcrumb segments oldest-first, "Home" for the root.
    pub fn breadcrumb(&self) -> Vec<BreadcrumbSegment> {
        self.nav
            .breadcrumb()
            .into_iter()
            .map(|id| BreadcrumbSegment {
                id,
                title: match id {
                    None => "Home".to_string(),
                    Some(folder) => self
                        .docs
                        .get(folder)
                        .map(|item| item.title.clone())
                        .unwrap_or_default(),
                },
            })
            .collect()
    }

    /// Metadata line for an expanded container.
    pub fn metadata(&self, id: ItemId) -> Option<String> {
        let item = self.docs.get(id)?;
        Some(metadata_line(
            epoch_ms_now(),
            item.last_modified,
            &item.content,
        ))
    }
}
