//! Ordered selection set.
//!
//! Selection order matters: the most recently selected block is the
//! *primary* one, the block the inspector edits and the one that snaps
//! during a multi-drag.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::BlockId;

/// Selected block ids, oldest first. Never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<BlockId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Click-select. Non-additive replaces the selection with `id`; additive
    /// toggles `id` in or out.
    pub fn select(&mut self, id: &str, additive: bool) {
        if !additive {
            self.ids.clear();
            self.ids.push(id.to_owned());
            return;
        }
        match self.ids.iter().position(|i| i == id) {
            Some(index) => {
                self.ids.remove(index);
            }
            None => self.ids.push(id.to_owned()),
        }
    }

    /// Make `id` the primary without dropping anything else.
    pub fn promote(&mut self, id: &str) {
        if let Some(index) = self.ids.iter().position(|i| i == id) {
            let promoted = self.ids.remove(index);
            self.ids.push(promoted);
        }
    }

    /// Union `ids` into the selection, keeping existing order first.
    pub fn extend<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = BlockId>,
    {
        for id in ids {
            if !self.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Replace the selection wholesale.
    pub fn set(&mut self, ids: Vec<BlockId>) {
        self.ids.clear();
        self.extend(ids);
    }

    /// Drop ids that no longer name a block.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.ids.retain(|id| keep(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// The most recently selected block.
    #[must_use]
    pub fn primary(&self) -> Option<&BlockId> {
        self.ids.last()
    }

    #[must_use]
    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
