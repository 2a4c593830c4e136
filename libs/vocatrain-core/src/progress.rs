//! Per-item learning state, kept in lockstep with the catalog.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::catalog::catalog_hash;
use crate::types::{CatalogItem, ProgressRecord, SessionStats, Snapshot, SnapshotMeta};

/// Owns one [`ProgressRecord`] per catalog item id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressStore {
    records: HashMap<String, ProgressRecord>,
}

impl ProgressStore {
    /// Create a default record for every item.
    pub fn initialize(items: &[CatalogItem]) -> Self {
        let records = items
            .iter()
            .map(|it| (it.id.clone(), ProgressRecord::default()))
            .collect();
        Self { records }
    }

    /// Reconcile existing records with a (possibly changed) catalog: purge
    /// records for ids no longer present, add defaults for new ids, keep
    /// surviving records untouched.
    pub fn merge(items: &[CatalogItem], existing: HashMap<String, ProgressRecord>) -> Self {
        let ids: HashSet<&str> = items.iter().map(|it| it.id.as_str()).collect();
        let mut records = existing;
        records.retain(|id, _| ids.contains(id.as_str()));
        for item in items {
            records
                .entry(item.id.clone())
                .or_insert_with(ProgressRecord::default);
        }
        Self { records }
    }

    /// Rebuild the store from a persisted snapshot. The snapshot's progress
    /// is reused (via [`ProgressStore::merge`]) only when its catalog hash
    /// matches the current catalog; otherwise all records start fresh.
    pub fn restore(items: &[CatalogItem], snapshot: Option<Snapshot>) -> Self {
        match snapshot {
            Some(snap) if snap.meta.catalog_hash == catalog_hash(items) => {
                Self::merge(items, snap.progress)
            }
            _ => Self::initialize(items),
        }
    }

    /// Discard all learning state, recreating defaults for `items`.
    pub fn reset(&mut self, items: &[CatalogItem]) {
        *self = Self::initialize(items);
    }

    pub fn get(&self, id: &str) -> Option<&ProgressRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProgressRecord> {
        self.records.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &HashMap<String, ProgressRecord> {
        &self.records
    }

    /// Export a persistable snapshot stamped with the catalog hash.
    pub fn snapshot(&self, items: &[CatalogItem], now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            progress: self.records.clone(),
            meta: SnapshotMeta {
                catalog_hash: catalog_hash(items),
                updated_at: now,
            },
        }
    }

    /// Aggregate counters shown to the learner.
    pub fn stats(&self, now: DateTime<Utc>) -> SessionStats {
        SessionStats {
            total: self.records.len(),
            unseen: self.records.values().filter(|r| r.seen_count == 0).count(),
            due: self.records.values().filter(|r| r.is_due(now)).count(),
            streak_sum: self.records.values().map(|r| r.streak).sum(),
        }
    }
}
