//! Press-gesture state machine.
//!
//! Replaces the timer race between "held long enough to select" and
//! "released quickly to open" with an explicit machine:
//! `Idle -> Pressing -> {Selected | Opened}`. At most one press is
//! tracked at a time; a new press supersedes the previous one.

use crate::model::item::ItemId;

/// Hold duration that turns a press into a long-press select.
pub const LONG_PRESS_MS: i64 = 500;

/// Resolved gesture for the controller to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Short press released before the threshold.
    Opened(ItemId),
    /// Press held past the threshold.
    Selected(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pressing { item: ItemId, started_at: i64 },
    /// Long-press already fired via `poll`; release is consumed silently.
    Fired,
}

/// Tracks one in-flight press gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTracker {
    phase: Phase,
}

impl Default for PressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PressTracker {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Starts tracking a press on an item.
    pub fn press(&mut self, item: ItemId, at_ms: i64) {
        self.phase = Phase::Pressing {
            item,
            started_at: at_ms,
        };
    }

    /// Fires the long-press while the pointer is still down, once the
    /// threshold has elapsed.
    pub fn poll(&mut self, now_ms: i64) -> Option<PressOutcome> {
        if let Phase::Pressing { item, started_at } = self.phase {
            if now_ms - started_at >= LONG_PRESS_MS {
                self.phase = Phase::Fired;
                return Some(PressOutcome::Selected(item));
            }
        }
        None
    }

    /// Resolves the gesture on pointer release.
    pub fn release(&mut self, now_ms: i64) -> Option<PressOutcome> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Pressing { item, started_at } => {
                if now_ms - started_at >= LONG_PRESS_MS {
                    Some(PressOutcome::Selected(item))
                } else {
                    Some(PressOutcome::Opened(item))
                }
            }
            Phase::Fired | Phase::Idle => None,
        }
    }

    /// Abandons the in-flight press (pointer left the item).
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}
