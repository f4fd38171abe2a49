use crate::error::AuditError;
use crate::models::BatchOutcome;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Completed batches, keyed by their handle.
///
/// The export step receives a batch id and looks the outcome up here; there
/// is no process-wide "last result". Outcomes are immutable once stored.
#[derive(Debug, Default)]
pub struct BatchStore {
    batches: DashMap<Uuid, Arc<BatchOutcome>>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, outcome: BatchOutcome) -> Arc<BatchOutcome> {
        let outcome = Arc::new(outcome);
        self.batches.insert(outcome.id, Arc::clone(&outcome));
        outcome
    }

    /// Unknown or absent handles surface as "nothing to export".
    pub fn get(&self, id: &Uuid) -> Result<Arc<BatchOutcome>, AuditError> {
        self.batches
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(AuditError::NoPriorResult)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatchTotals;

    fn outcome() -> BatchOutcome {
        BatchOutcome {
            id: Uuid::new_v4(),
            client: "acme".to_string(),
            results: Vec::new(),
            totals: BatchTotals::default(),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn stores_and_returns_by_handle() {
        let store = BatchStore::new();
        let stored = store.insert(outcome());
        let found = store.get(&stored.id).unwrap();
        assert_eq!(found.id, stored.id);
    }

    #[test]
    fn unknown_handle_is_nothing_to_export() {
        let store = BatchStore::new();
        assert!(matches!(
            store.get(&Uuid::new_v4()),
            Err(AuditError::NoPriorResult)
        ));
    }
}
