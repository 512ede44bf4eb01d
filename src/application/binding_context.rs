// Binding context - Registry, cache and scheduler for one scene session
use crate::application::binding_registry::{BindingRegistry, SubscriptionMode};
use crate::application::fetch_scheduler::{FetchScheduler, SchedulerSettings, TickOutcome};
use crate::application::remote_value_client::RemoteValueClient;
use crate::application::value_cache::ValueCache;
use crate::domain::binding::{DataBinding, DataPoint};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Handed to every visual behavior at initialization; shares one fetch per
/// binding across all of them.
#[derive(Clone)]
pub struct BindingContext {
    registry: Arc<BindingRegistry>,
    cache: Arc<ValueCache>,
    scheduler: FetchScheduler,
}

impl BindingContext {
    pub fn new(
        client: Arc<dyn RemoteValueClient>,
        mode: SubscriptionMode,
        settings: SchedulerSettings,
    ) -> Self {
        let registry = Arc::new(BindingRegistry::new(mode));
        let cache = Arc::new(ValueCache::new());
        let scheduler = FetchScheduler::new(client, registry.clone(), cache.clone(), settings);
        Self {
            registry,
            cache,
            scheduler,
        }
    }

    pub fn subscribe(&self, binding: &DataBinding) {
        self.registry.subscribe(binding);
    }

    /// Once the last subscriber leaves, the binding's cached value and
    /// resolved kind are dropped.
    pub fn unsubscribe(&self, binding: &DataBinding) {
        if self.registry.unsubscribe(binding) {
            self.cache.remove(binding);
            self.scheduler.forget(binding);
        }
    }

    pub fn get_latest(&self, binding: &DataBinding) -> Option<DataPoint> {
        self.cache.get(binding)
    }

    pub fn start_data_fetching(&self) {
        self.scheduler.start();
    }

    pub fn stop_data_fetching(&self) {
        self.scheduler.stop();
    }

    pub fn on_tick(&self, now: DateTime<Utc>) -> TickOutcome {
        self.scheduler.on_tick(now)
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &FetchScheduler {
        &self.scheduler
    }
}
