// Fetch scheduler - Single-flight polling of every active binding
use crate::application::binding_registry::BindingRegistry;
use crate::application::remote_value_client::RemoteValueClient;
use crate::application::value_cache::ValueCache;
use crate::domain::binding::{DataBinding, TimeWindow, ValueKind};
use crate::domain::error::{FetchError, TypeResolutionError};
use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Minimum time between the end of one cycle's window and the next cycle.
    pub interval: Duration,
    /// Concurrent remote calls per phase.
    pub max_workers: usize,
    /// Upper bound on a single remote call.
    pub fetch_timeout: Duration,
    /// How far back the very first window reaches.
    pub initial_lookback: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_workers: 4,
            fetch_timeout: Duration::from_secs(10),
            initial_lookback: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    FetchInFlight,
}

#[derive(Debug)]
pub enum TickOutcome {
    /// The periodic trigger is stopped.
    Disabled,
    /// A cycle is still running; the tick was dropped.
    InFlight,
    /// The interval since the last cycle has not elapsed.
    NotDue,
    /// A cycle was started in the background.
    Started(JoinHandle<CycleReport>),
}

/// Summary of one resolve + fetch + publish round.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub window: TimeWindow,
    pub active: usize,
    pub resolved: usize,
    pub resolution_failures: usize,
    /// Bindings whose remote type is unsupported; never resolved again.
    pub rejected: usize,
    pub fetched: usize,
    pub empty: usize,
    pub fetch_failures: usize,
    pub published: usize,
}

impl CycleReport {
    fn new(window: TimeWindow, active: usize) -> Self {
        Self {
            window,
            active,
            resolved: 0,
            resolution_failures: 0,
            rejected: 0,
            fetched: 0,
            empty: 0,
            fetch_failures: 0,
            published: 0,
        }
    }
}

#[derive(Debug)]
struct SchedulerState {
    phase: SchedulerPhase,
    enabled: bool,
    last_cycle_end: Option<DateTime<Utc>>,
}

struct SchedulerInner {
    client: Arc<dyn RemoteValueClient>,
    registry: Arc<BindingRegistry>,
    cache: Arc<ValueCache>,
    kinds: Mutex<HashMap<DataBinding, ValueKind>>,
    rejected: Mutex<HashSet<DataBinding>>,
    state: Mutex<SchedulerState>,
    settings: SchedulerSettings,
}

#[derive(Clone)]
pub struct FetchScheduler {
    inner: Arc<SchedulerInner>,
}

impl FetchScheduler {
    pub fn new(
        client: Arc<dyn RemoteValueClient>,
        registry: Arc<BindingRegistry>,
        cache: Arc<ValueCache>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                client,
                registry,
                cache,
                kinds: Mutex::new(HashMap::new()),
                rejected: Mutex::new(HashSet::new()),
                state: Mutex::new(SchedulerState {
                    phase: SchedulerPhase::Idle,
                    enabled: false,
                    last_cycle_end: None,
                }),
                settings,
            }),
        }
    }

    /// Enable the periodic trigger.
    pub fn start(&self) {
        let mut state = self.inner.lock_state();
        if !state.enabled {
            tracing::info!("Starting data fetching");
            state.enabled = true;
        }
    }

    /// Disable the periodic trigger. A cycle already in flight runs to
    /// completion and still publishes its results.
    pub fn stop(&self) {
        let mut state = self.inner.lock_state();
        if state.enabled {
            tracing::info!(in_flight = state.phase == SchedulerPhase::FetchInFlight, "Stopping data fetching");
            state.enabled = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_state().enabled
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.inner.lock_state().phase
    }

    pub fn last_cycle_end(&self) -> Option<DateTime<Utc>> {
        self.inner.lock_state().last_cycle_end
    }

    pub fn value_kind(&self, binding: &DataBinding) -> Option<ValueKind> {
        self.inner.lock_kinds().get(binding).copied()
    }

    /// True once the remote service declared a type this bridge cannot decode.
    pub fn is_rejected(&self, binding: &DataBinding) -> bool {
        self.inner.lock_rejected().contains(binding)
    }

    /// Drop the resolved kind of a binding nobody subscribes to any more.
    /// Rejections are kept: an unsupported type stays unsupported.
    pub fn forget(&self, binding: &DataBinding) {
        if self.inner.lock_kinds().remove(binding).is_some() {
            tracing::debug!(binding = %binding, "Forgot value kind");
        }
    }

    /// Evaluate the trigger for the host tick at `now`. Never blocks; when a
    /// cycle is due it is spawned onto the current tokio runtime.
    pub fn on_tick(&self, now: DateTime<Utc>) -> TickOutcome {
        let window = {
            let mut state = self.inner.lock_state();
            if !state.enabled {
                return TickOutcome::Disabled;
            }
            if state.phase == SchedulerPhase::FetchInFlight {
                return TickOutcome::InFlight;
            }

            let start = match state.last_cycle_end {
                Some(end) => {
                    // An unrepresentable due time is never reached.
                    let due = to_delta(self.inner.settings.interval).and_then(|d| end.checked_add_signed(d));
                    if due.is_none_or(|due| now < due) {
                        return TickOutcome::NotDue;
                    }
                    end
                }
                None => to_delta(self.inner.settings.initial_lookback)
                    .and_then(|d| now.checked_sub_signed(d))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            };

            state.phase = SchedulerPhase::FetchInFlight;
            TimeWindow::new(start, now)
        };

        // Bindings subscribed after this point join the next cycle.
        let snapshot: Vec<DataBinding> = self.inner.registry.active_bindings().into_iter().collect();
        tracing::debug!(start = %window.start, end = %window.end, total_subs = snapshot.len(), "Scheduling fetch cycle");
        let inner = self.inner.clone();
        TickOutcome::Started(tokio::spawn(inner.run_cycle(window, snapshot)))
    }
}

fn to_delta(duration: Duration) -> Option<TimeDelta> {
    TimeDelta::from_std(duration).ok()
}

/// Run one remote call under `timeout`, reporting expiry as `on_timeout`.
async fn bounded<T, E>(
    timeout: Duration,
    call: impl Future<Output = Result<T, E>>,
    on_timeout: E,
) -> Result<T, E> {
    tokio::time::timeout(timeout, call).await.unwrap_or(Err(on_timeout))
}

/// Returns the scheduler to `Idle` however the cycle ends, advancing the
/// window boundary only when the cycle completed.
struct InFlightGuard<'a> {
    state: &'a Mutex<SchedulerState>,
    completed_at: Option<DateTime<Utc>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(end) = self.completed_at {
            state.last_cycle_end = Some(end);
        }
        state.phase = SchedulerPhase::Idle;
    }
}

impl SchedulerInner {
    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_kinds(&self) -> MutexGuard<'_, HashMap<DataBinding, ValueKind>> {
        self.kinds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_rejected(&self) -> MutexGuard<'_, HashSet<DataBinding>> {
        self.rejected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_cycle(self: Arc<Self>, window: TimeWindow, snapshot: Vec<DataBinding>) -> CycleReport {
        let mut guard = InFlightGuard {
            state: &self.state,
            completed_at: None,
        };
        let started = Instant::now();
        let mut report = CycleReport::new(window, snapshot.len());

        self.resolve_phase(&snapshot, &mut report).await;
        self.fetch_phase(&snapshot, window, &mut report).await;

        guard.completed_at = Some(window.end);
        drop(guard);

        tracing::info!(
            active = report.active,
            published = report.published,
            failures = report.resolution_failures + report.fetch_failures,
            rejected = report.rejected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetch cycle completed"
        );
        report
    }

    async fn resolve_phase(&self, snapshot: &[DataBinding], report: &mut CycleReport) {
        let unresolved: Vec<DataBinding> = {
            let kinds = self.lock_kinds();
            let rejected = self.lock_rejected();
            snapshot
                .iter()
                .filter(|b| !kinds.contains_key(*b) && !rejected.contains(*b))
                .cloned()
                .collect()
        };
        if unresolved.is_empty() {
            return;
        }

        let timeout = self.settings.fetch_timeout;
        let results: Vec<_> = stream::iter(unresolved)
            .map(|binding| {
                let client = self.client.clone();
                async move {
                    let result = bounded(timeout, client.resolve_value_kind(&binding), TypeResolutionError::Timeout).await;
                    (binding, result)
                }
            })
            .buffer_unordered(self.settings.max_workers.max(1))
            .collect()
            .await;

        let mut kinds = self.lock_kinds();
        let mut rejected = self.lock_rejected();
        for (binding, result) in results {
            match result {
                Ok(kind) => {
                    // Unsubscribed while the lookup ran.
                    if !self.registry.is_active(&binding) {
                        continue;
                    }
                    tracing::debug!(binding = %binding, kind = ?kind, "Resolved value kind");
                    kinds.insert(binding, kind);
                    report.resolved += 1;
                }
                Err(TypeResolutionError::Unsupported(e)) => {
                    tracing::error!(binding = %binding, error = %e, "Rejecting binding");
                    rejected.insert(binding);
                    report.rejected += 1;
                }
                Err(e) => {
                    tracing::warn!(binding = %binding, error = %e, "Failed to resolve value kind");
                    report.resolution_failures += 1;
                }
            }
        }
    }

    async fn fetch_phase(&self, snapshot: &[DataBinding], window: TimeWindow, report: &mut CycleReport) {
        let targets: Vec<(DataBinding, ValueKind)> = {
            let kinds = self.lock_kinds();
            snapshot
                .iter()
                .filter_map(|b| kinds.get(b).map(|k| (b.clone(), *k)))
                .collect()
        };
        if targets.is_empty() {
            return;
        }

        let timeout = self.settings.fetch_timeout;
        let results: Vec<_> = stream::iter(targets)
            .map(|(binding, kind)| {
                let client = self.client.clone();
                async move {
                    let result = bounded(timeout, client.fetch_latest(&binding, kind, window), FetchError::Timeout).await;
                    (binding, result)
                }
            })
            .buffer_unordered(self.settings.max_workers.max(1))
            .collect()
            .await;

        for (binding, result) in results {
            match result {
                Ok(Some(point)) => {
                    tracing::debug!(binding = %binding, value = %point.value, "Fetched latest value");
                    report.fetched += 1;
                    // A binding unsubscribed mid-cycle has already been pruned from the cache.
                    if self.registry.is_active(&binding) && self.cache.put(&binding, point) {
                        report.published += 1;
                    }
                }
                Ok(None) => {
                    tracing::debug!(binding = %binding, "No samples in window");
                    report.empty += 1;
                }
                Err(e) => {
                    tracing::warn!(binding = %binding, error = %e, "Failed to fetch latest value");
                    report.fetch_failures += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::binding_registry::SubscriptionMode;
    use crate::application::remote_value_client::testing::FakeRemoteClient;
    use crate::domain::binding::Value;
    use chrono::TimeZone;
    use std::sync::atomic::Ordering;

    struct Harness {
        client: Arc<FakeRemoteClient>,
        registry: Arc<BindingRegistry>,
        cache: Arc<ValueCache>,
        scheduler: FetchScheduler,
    }

    fn harness(client: FakeRemoteClient, settings: SchedulerSettings) -> Harness {
        let client = Arc::new(client);
        let registry = Arc::new(BindingRegistry::new(SubscriptionMode::RefCounted));
        let cache = Arc::new(ValueCache::new());
        let scheduler = FetchScheduler::new(client.clone(), registry.clone(), cache.clone(), settings);
        scheduler.start();
        Harness {
            client,
            registry,
            cache,
            scheduler,
        }
    }

    fn t(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + millis).unwrap()
    }

    fn temperature() -> DataBinding {
        DataBinding::new("oven-1", "thermostat", "temperature")
    }

    async fn run(outcome: TickOutcome) -> CycleReport {
        match outcome {
            TickOutcome::Started(handle) => handle.await.unwrap(),
            other => panic!("expected a started cycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disabled_until_started() {
        let client = Arc::new(FakeRemoteClient::new());
        let scheduler = FetchScheduler::new(
            client,
            Arc::new(BindingRegistry::new(SubscriptionMode::RefCounted)),
            Arc::new(ValueCache::new()),
            SchedulerSettings::default(),
        );

        assert!(matches!(scheduler.on_tick(t(0)), TickOutcome::Disabled));
        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());
        run(scheduler.on_tick(t(0))).await;
    }

    #[tokio::test]
    async fn test_interval_respected() {
        let h = harness(FakeRemoteClient::new(), SchedulerSettings::default());

        run(h.scheduler.on_tick(t(0))).await;
        for millis in [500, 1000, 1500] {
            assert!(matches!(h.scheduler.on_tick(t(millis)), TickOutcome::NotDue));
        }
        let report = run(h.scheduler.on_tick(t(2100))).await;

        assert_eq!(report.window, TimeWindow::new(t(0), t(2100)));
        assert_eq!(h.scheduler.last_cycle_end(), Some(t(2100)));
    }

    #[tokio::test]
    async fn test_single_flight_while_fetch_is_slow() {
        let (client, gate) = FakeRemoteClient::gated();
        let h = harness(client.with_kind(&temperature(), ValueKind::Double), SchedulerSettings::default());
        h.registry.subscribe(&temperature());

        let first = h.scheduler.on_tick(t(0));
        assert_eq!(h.scheduler.phase(), SchedulerPhase::FetchInFlight);
        for millis in [2_000, 4_000, 60_000] {
            assert!(matches!(h.scheduler.on_tick(t(millis)), TickOutcome::InFlight));
        }

        gate.add_permits(1);
        run(first).await;
        assert_eq!(h.scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(h.client.requested_windows().len(), 1);
    }

    #[tokio::test]
    async fn test_windows_are_contiguous() {
        let client = FakeRemoteClient::new().with_kind(&temperature(), ValueKind::Double);
        let h = harness(client, SchedulerSettings::default());
        h.registry.subscribe(&temperature());

        run(h.scheduler.on_tick(t(0))).await;
        run(h.scheduler.on_tick(t(2_000))).await;
        run(h.scheduler.on_tick(t(4_500))).await;

        let windows: Vec<TimeWindow> = h.client.requested_windows().into_iter().map(|(_, w)| w).collect();
        assert_eq!(windows[0], TimeWindow::new(t(-15_000), t(0)));
        assert_eq!(windows[1], TimeWindow::new(t(0), t(2_000)));
        assert_eq!(windows[2], TimeWindow::new(t(2_000), t(4_500)));
    }

    #[tokio::test]
    async fn test_empty_window_keeps_previous_value() {
        let client = FakeRemoteClient::new().with_kind(&temperature(), ValueKind::Double);
        let h = harness(client, SchedulerSettings::default());
        h.registry.subscribe(&temperature());

        h.client.set_value(&temperature(), Value::Number(180.0));
        run(h.scheduler.on_tick(t(0))).await;

        h.client.clear_value(&temperature());
        let report = run(h.scheduler.on_tick(t(2_000))).await;
        assert_eq!(report.empty, 1);
        let cached = h.cache.get(&temperature()).unwrap();
        assert_eq!(cached.timestamp, t(0));
        assert_eq!(cached.value, Value::Number(180.0));

        h.client.set_value(&temperature(), Value::Number(200.0));
        run(h.scheduler.on_tick(t(4_000))).await;
        assert_eq!(h.cache.get(&temperature()).unwrap().timestamp, t(4_000));
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_binding() {
        let rpm = DataBinding::new("oven-1", "fan", "rpm");
        let status = DataBinding::new("oven-1", "alarm", "status");
        let client = FakeRemoteClient::new()
            .with_kind(&temperature(), ValueKind::Double)
            .with_kind(&rpm, ValueKind::Integer)
            .with_unsupported_kind(&status, "RELATIONSHIP");
        let h = harness(client, SchedulerSettings::default());
        for b in [&temperature(), &rpm, &status] {
            h.registry.subscribe(b);
        }
        h.client.set_value(&temperature(), Value::Number(180.0));
        h.client.set_value(&rpm, Value::Number(1200.0));
        h.client.fail_fetch(&rpm);

        let report = run(h.scheduler.on_tick(t(0))).await;

        assert_eq!(report.active, 3);
        assert_eq!(report.resolved, 2);
        assert_eq!(report.resolution_failures, 0);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.published, 1);
        assert!(h.cache.get(&temperature()).is_some());
        assert!(h.cache.get(&rpm).is_none());
        assert!(h.cache.get(&status).is_none());
        assert_eq!(h.scheduler.value_kind(&status), None);
    }

    #[tokio::test]
    async fn test_value_kind_resolved_once_and_failures_retried() {
        let status = DataBinding::new("oven-1", "alarm", "status");
        let client = FakeRemoteClient::new().with_kind(&temperature(), ValueKind::Double);
        let h = harness(client, SchedulerSettings::default());
        h.registry.subscribe(&temperature());
        h.registry.subscribe(&status);

        run(h.scheduler.on_tick(t(0))).await;
        assert_eq!(h.client.resolve_calls.load(Ordering::SeqCst), 2);

        // Only the unresolved binding is looked up again.
        h.client
            .kinds
            .lock()
            .unwrap()
            .insert(status.clone(), Ok(ValueKind::String));
        let report = run(h.scheduler.on_tick(t(2_000))).await;
        assert_eq!(h.client.resolve_calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.resolved, 1);
        assert_eq!(h.scheduler.value_kind(&status), Some(ValueKind::String));
    }

    #[tokio::test]
    async fn test_hanging_fetch_times_out() {
        let client = FakeRemoteClient::new().with_kind(&temperature(), ValueKind::Double);
        client.hang.store(true, Ordering::SeqCst);
        let settings = SchedulerSettings {
            fetch_timeout: Duration::from_millis(50),
            ..SchedulerSettings::default()
        };
        let h = harness(client, settings);
        h.registry.subscribe(&temperature());

        let report = run(h.scheduler.on_tick(t(0))).await;

        assert_eq!(report.fetch_failures, 1);
        assert_eq!(h.scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(h.scheduler.last_cycle_end(), Some(t(0)));
    }

    #[tokio::test]
    async fn test_stop_lets_in_flight_cycle_publish() {
        let (client, gate) = FakeRemoteClient::gated();
        let h = harness(client.with_kind(&temperature(), ValueKind::Double), SchedulerSettings::default());
        h.registry.subscribe(&temperature());
        h.client.set_value(&temperature(), Value::Number(95.5));

        let cycle = h.scheduler.on_tick(t(0));
        h.scheduler.stop();
        h.scheduler.stop();
        assert!(matches!(h.scheduler.on_tick(t(10_000)), TickOutcome::Disabled));

        gate.add_permits(1);
        run(cycle).await;
        assert_eq!(h.cache.get(&temperature()).unwrap().value, Value::Number(95.5));
        assert!(matches!(h.scheduler.on_tick(t(20_000)), TickOutcome::Disabled));
    }

    #[tokio::test]
    async fn test_binding_added_mid_cycle_joins_next_cycle() {
        let late = DataBinding::new("oven-2", "thermostat", "temperature");
        let (client, gate) = FakeRemoteClient::gated();
        let client = client
            .with_kind(&temperature(), ValueKind::Double)
            .with_kind(&late, ValueKind::Double);
        let h = harness(client, SchedulerSettings::default());
        h.registry.subscribe(&temperature());

        let cycle = h.scheduler.on_tick(t(0));
        h.registry.subscribe(&late);
        gate.add_permits(1);
        assert_eq!(run(cycle).await.active, 1);

        let next = h.scheduler.on_tick(t(2_000));
        gate.add_permits(2);
        let report = run(next).await;
        assert_eq!(report.active, 2);
        assert!(h
            .client
            .requested_windows()
            .contains(&(late, TimeWindow::new(t(0), t(2_000)))));
    }

    #[tokio::test]
    async fn test_unsupported_type_is_never_resolved_again() {
        let status = DataBinding::new("oven-1", "alarm", "status");
        let client = FakeRemoteClient::new().with_unsupported_kind(&status, "RELATIONSHIP");
        let h = harness(client, SchedulerSettings::default());
        h.registry.subscribe(&status);

        let first = run(h.scheduler.on_tick(t(0))).await;
        assert_eq!(first.rejected, 1);
        assert!(h.scheduler.is_rejected(&status));

        for millis in [2_000, 4_000, 6_000] {
            let report = run(h.scheduler.on_tick(t(millis))).await;
            assert_eq!(report.rejected, 0);
            assert_eq!(report.resolution_failures, 0);
        }
        assert_eq!(h.client.resolve_calls.load(Ordering::SeqCst), 1);
        assert!(h.client.requested_windows().is_empty());
    }

    #[tokio::test]
    async fn test_unrepresentable_durations_do_not_panic() {
        let settings = SchedulerSettings {
            interval: Duration::from_secs(u64::MAX / 2),
            initial_lookback: Duration::from_secs(u64::MAX / 2),
            ..SchedulerSettings::default()
        };
        let h = harness(FakeRemoteClient::new(), settings);

        let report = run(h.scheduler.on_tick(t(0))).await;
        assert_eq!(report.window, TimeWindow::new(DateTime::<Utc>::MIN_UTC, t(0)));
        assert!(matches!(h.scheduler.on_tick(t(10_000)), TickOutcome::NotDue));
    }

    #[tokio::test]
    async fn test_timeouts_map_to_error_variants() {
        let resolve: Result<ValueKind, _> = bounded(
            Duration::from_millis(10),
            std::future::pending(),
            TypeResolutionError::Timeout,
        )
        .await;
        assert!(matches!(resolve, Err(TypeResolutionError::Timeout)));

        let fetch: Result<u32, _> = bounded(Duration::from_secs(1), async { Ok(7) }, FetchError::Timeout).await;
        assert_eq!(fetch.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_fan_out_bounded_by_max_workers() {
        let bindings: Vec<DataBinding> = (0..4)
            .map(|i| DataBinding::new(format!("oven-{}", i), "thermostat", "temperature"))
            .collect();
        let (mut client, gate) = FakeRemoteClient::gated();
        for b in &bindings {
            client = client.with_kind(b, ValueKind::Double);
        }
        let settings = SchedulerSettings {
            max_workers: 2,
            ..SchedulerSettings::default()
        };
        let h = harness(client, settings);
        for b in &bindings {
            h.registry.subscribe(b);
        }

        let cycle = h.scheduler.on_tick(t(0));
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        assert_eq!(h.client.requested_windows().len(), 2);

        gate.add_permits(4);
        let report = run(cycle).await;
        assert_eq!(report.empty, 4);
        assert_eq!(h.client.requested_windows().len(), 4);
    }
}
