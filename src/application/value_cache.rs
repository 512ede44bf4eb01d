// Value cache - Latest datapoint per binding
use crate::domain::binding::{DataBinding, DataPoint};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Readers get a clone of the whole datapoint, writers replace it whole, so a
/// partially written entry is never observable.
#[derive(Default)]
pub struct ValueCache {
    entries: RwLock<HashMap<DataBinding, DataPoint>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking for practical purposes: writers hold the lock only for a
    /// map insert. Never triggers a fetch.
    pub fn get(&self, binding: &DataBinding) -> Option<DataPoint> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(binding)
            .cloned()
    }

    /// Store `point` unless the cache already holds a newer one for the binding.
    /// Returns whether the entry was written.
    pub fn put(&self, binding: &DataBinding, point: DataPoint) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(binding) {
            Some(existing) if existing.timestamp > point.timestamp => {
                tracing::debug!(
                    binding = %binding,
                    cached = %existing.timestamp,
                    incoming = %point.timestamp,
                    "Ignoring older datapoint"
                );
                false
            }
            _ => {
                entries.insert(binding.clone(), point);
                true
            }
        }
    }

    pub fn remove(&self, binding: &DataBinding) -> Option<DataPoint> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(binding)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
