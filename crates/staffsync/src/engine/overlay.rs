//! Optimistic reconciliation overlay.
//!
//! In-memory registrations as the UI sees them: a committed layer that
//! mirrors the store, and a pending layer applied the moment a write is
//! issued — before the store confirms. A confirmed write folds pending
//! into committed; a failed write reverts it, so the visible state
//! returns to the committed truth instead of diverging silently.
//!
//! All keying is by registration id, never by collection position:
//! concurrent refreshes may reorder collections at any time.

use std::collections::{BTreeMap, HashMap};

use crate::lifecycle::AssignmentStatus;
use crate::model::registration::{Registration, RegistrationKey};

#[derive(Debug, Clone)]
enum Pending {
    Upsert(Registration),
    Remove,
}

/// Committed/pending pair of registration collections.
#[derive(Debug, Default)]
pub struct OptimisticOverlay {
    committed: HashMap<String, Registration>,
    pending: HashMap<String, Pending>,
}

impl OptimisticOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a registration as confirmed truth (from a load).
    pub fn seed(&mut self, key: &RegistrationKey, reg: Registration) {
        self.committed.insert(key.index_key(), reg);
    }

    /// Stages an optimistic upsert ahead of store confirmation.
    pub fn stage(&mut self, key: &RegistrationKey, reg: Registration) {
        self.pending.insert(key.index_key(), Pending::Upsert(reg));
    }

    /// Stages an optimistic removal ahead of store confirmation.
    pub fn stage_remove(&mut self, key: &RegistrationKey) {
        self.pending.insert(key.index_key(), Pending::Remove);
    }

    /// Folds the pending change for `key` into the committed layer.
    pub fn commit(&mut self, key: &RegistrationKey) {
        let id = key.index_key();
        match self.pending.remove(&id) {
            Some(Pending::Upsert(reg)) => {
                self.committed.insert(id, reg);
            }
            Some(Pending::Remove) => {
                self.committed.remove(&id);
            }
            None => {}
        }
    }

    /// Discards the pending change for `key`.
    pub fn revert(&mut self, key: &RegistrationKey) {
        self.pending.remove(&key.index_key());
    }

    /// The registration as the UI should see it: pending wins.
    pub fn visible(&self, key: &RegistrationKey) -> Option<&Registration> {
        match self.pending.get(&key.index_key()) {
            Some(Pending::Upsert(reg)) => Some(reg),
            Some(Pending::Remove) => None,
            None => self.committed.get(&key.index_key()),
        }
    }

    /// Every visible registration, keyed by index key.
    pub fn visible_all(&self) -> BTreeMap<String, &Registration> {
        let mut all: BTreeMap<String, &Registration> = self
            .committed
            .iter()
            .map(|(id, reg)| (id.clone(), reg))
            .collect();
        for (id, pending) in &self.pending {
            match pending {
                Pending::Upsert(reg) => {
                    all.insert(id.clone(), reg);
                }
                Pending::Remove => {
                    all.remove(id);
                }
            }
        }
        all
    }

    /// Visible registrations per status, for badge display.
    pub fn status_counts(&self) -> BTreeMap<AssignmentStatus, usize> {
        let mut counts = BTreeMap::new();
        for reg in self.visible_all().values() {
            *counts.entry(reg.status()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.visible_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_all().is_empty()
    }
}
