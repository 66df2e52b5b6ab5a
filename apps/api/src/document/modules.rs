//! Module configuration: which sections are visible and in what order.
//!
//! `modules` is the ordered visible list, `hidden_modules` the hidden set. Every operation
//! here keeps each `SectionId` in exactly one of the two, and `modules` free of repeats.

use serde::{Deserialize, Serialize};

use crate::document::models::{ModuleConfig, SectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl ModuleConfig {
    pub fn is_visible(&self, section: SectionId) -> bool {
        self.modules.contains(&section)
    }

    /// Hidden → shown at the end of `modules`. Anything else → hidden.
    pub fn toggle_visibility(&mut self, section: SectionId) {
        if self.hidden_modules.contains(&section) {
            self.hidden_modules.retain(|s| *s != section);
            if !self.modules.contains(&section) {
                self.modules.push(section);
            }
        } else {
            self.modules.retain(|s| *s != section);
            self.hidden_modules.push(section);
        }
    }

    /// Swaps `modules[index]` with its neighbour. Boundaries and bad indices are no-ops.
    /// Returns whether anything moved.
    pub fn move_module(&mut self, index: usize, direction: MoveDirection) -> bool {
        if index >= self.modules.len() {
            return false;
        }
        match direction {
            MoveDirection::Up if index > 0 => {
                self.modules.swap(index, index - 1);
                true
            }
            MoveDirection::Down if index + 1 < self.modules.len() => {
                self.modules.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Repairs a config read from storage or an import.
    ///
    /// Drops repeats, resolves a section listed in both collections in favour of
    /// `modules`, and appends sections missing from both to `modules` in canonical order.
    pub fn normalize(&mut self) {
        let mut visible: Vec<SectionId> = Vec::with_capacity(SectionId::ALL.len());
        for section in self.modules.drain(..) {
            if !visible.contains(&section) {
                visible.push(section);
            }
        }

        let mut hidden: Vec<SectionId> = Vec::new();
        for section in self.hidden_modules.drain(..) {
            if !visible.contains(&section) && !hidden.contains(&section) {
                hidden.push(section);
            }
        }

        for section in SectionId::ALL {
            if !visible.contains(&section) && !hidden.contains(&section) {
                visible.push(section);
            }
        }

        self.modules = visible;
        self.hidden_modules = hidden;
    }
}

/// Picks the section the dashboard should display after `modules` changed.
///
/// Unset when nothing is visible; the first visible section when the current one is unset
/// or no longer visible; otherwise unchanged.
pub fn reconcile_active(active: Option<SectionId>, modules: &[SectionId]) -> Option<SectionId> {
    match active {
        Some(section) if modules.contains(&section) => Some(section),
        _ => modules.first().copied(),
    }
}
