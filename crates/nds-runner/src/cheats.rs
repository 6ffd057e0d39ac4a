//! Cheat list editing on top of the engine's cheat store

use nds_core::{Cheat, CheatError, CheatKind, CheatStore};
use std::sync::Arc;

/// CRUD front for the engine cheat list
///
/// Structural edits (add, update, delete) are persisted immediately. Toggling
/// a cheat only changes the in-engine list until [`CheatEditor::save`].
pub struct CheatEditor {
    store: Arc<dyn CheatStore>,
}

impl CheatEditor {
    pub fn new(store: Arc<dyn CheatStore>) -> Self {
        Self { store }
    }

    pub fn len(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<Cheat, CheatError> {
        self.store.get(index).ok_or(CheatError::InvalidIndex {
            index,
            count: self.store.count(),
        })
    }

    /// Snapshot of every cheat, in list order
    pub fn list(&self) -> Vec<Cheat> {
        (0..self.store.count())
            .filter_map(|index| self.store.get(index))
            .collect()
    }

    /// Add an Action Replay cheat
    pub fn add(&self, description: &str, code: &str) -> Result<(), CheatError> {
        self.store.add(description, code);
        tracing::debug!("Added cheat '{}'", description);
        self.store.persist()
    }

    /// Replace description and code. Only Action Replay cheats are editable.
    pub fn update(&self, index: usize, description: &str, code: &str) -> Result<(), CheatError> {
        let cheat = self.get(index)?;
        if cheat.kind != CheatKind::ActionReplay {
            return Err(CheatError::NotEditable {
                index,
                kind: cheat.kind,
            });
        }
        self.store.update(index, description, code);
        tracing::debug!("Updated cheat {} to '{}'", index, description);
        self.store.persist()
    }

    pub fn delete(&self, index: usize) -> Result<(), CheatError> {
        self.get(index)?;
        self.store.delete(index);
        tracing::debug!("Deleted cheat {}", index);
        self.store.persist()
    }

    pub fn set_enabled(&self, index: usize, enabled: bool) -> Result<(), CheatError> {
        self.get(index)?;
        self.store.set_enabled(index, enabled);
        Ok(())
    }

    /// Write the current list out
    pub fn save(&self) -> Result<(), CheatError> {
        self.store.persist()
    }
}
