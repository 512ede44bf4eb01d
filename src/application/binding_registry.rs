// Binding registry - Tracks which bindings currently need live values
use crate::domain::binding::DataBinding;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How repeated subscriptions to the same binding are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionMode {
    /// A binding stays active until every subscriber has unsubscribed.
    #[default]
    RefCounted,
    /// Flat set: one unsubscribe deactivates the binding for all subscribers.
    Set,
}

pub struct BindingRegistry {
    mode: SubscriptionMode,
    subscriptions: Mutex<HashMap<DataBinding, usize>>,
}

impl BindingRegistry {
    pub fn new(mode: SubscriptionMode) -> Self {
        Self {
            mode,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DataBinding, usize>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, binding: &DataBinding) {
        let mut subs = self.lock();
        let count = {
            let count = subs.entry(binding.clone()).or_insert(0);
            *count = match self.mode {
                SubscriptionMode::RefCounted => *count + 1,
                SubscriptionMode::Set => 1,
            };
            *count
        };
        tracing::debug!(binding = %binding, subscribers = count, total = subs.len(), "Subscribed binding");
    }

    /// Returns true when the binding is no longer active afterwards.
    pub fn unsubscribe(&self, binding: &DataBinding) -> bool {
        let mut subs = self.lock();
        let Some(count) = subs.get_mut(binding) else {
            return true;
        };

        *count = count.saturating_sub(1);
        let removed = *count == 0 || self.mode == SubscriptionMode::Set;
        if removed {
            subs.remove(binding);
        }
        tracing::debug!(binding = %binding, removed, total = subs.len(), "Unsubscribed binding");
        removed
    }

    /// Snapshot of the active set. Subscriptions made after the snapshot are
    /// picked up by the next call.
    pub fn active_bindings(&self) -> HashSet<DataBinding> {
        self.lock().keys().cloned().collect()
    }

    pub fn subscriber_counts(&self) -> Vec<(DataBinding, usize)> {
        let mut counts: Vec<_> = self
            .lock()
            .iter()
            .map(|(b, c)| (b.clone(), *c))
            .collect();
        counts.sort();
        counts
    }

    pub fn is_active(&self, binding: &DataBinding) -> bool {
        self.lock().contains_key(binding)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
