//! The lifecycle state machine.
//!
//! One [`LifecycleSnapshot`] lives behind one mutex. Every mutation happens in
//! a short critical section that also pushes the resulting indicator updates,
//! so the sink observes changes in exactly the order they were applied. Probes
//! and actions run in spawned tasks and never hold the lock across `.await`.

use crate::{
    ActionExecutor, CoreError, CoreResult, IndicatorImage, IndicatorSink, LifecycleConfig,
    LifecycleSnapshot, MenuItemId, MenuModel, ProbeReport, ProcessController, ServiceAction,
    ServiceState, SettleOutcome, StatusProbe,
    lifecycle::{
        ERROR_NOTIFICATION_LIMIT, FAILURE_NOTIFICATION_LIMIT, animation::AnimationTicker, monitor,
        settle::settle,
    },
    text,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use error_location::ErrorLocation;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Resolves to the state an accepted user action finally settled on.
pub type ActionHandle = JoinHandle<ServiceState>;

/// Owns the displayed state of the supervised service.
///
/// Cheap to clone; all clones drive the same state machine.
pub struct LifecycleController<P, S> {
    shared: Arc<Shared<P, S>>,
}

impl<P, S> Clone for LifecycleController<P, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<P, S> {
    config: LifecycleConfig,
    probe: StatusProbe<P>,
    executor: ActionExecutor<P>,
    sink: S,
    runtime: Handle,
    inner: Mutex<Inner>,
    shutdown_tx: watch::Sender<bool>,
    tickers_started: AtomicU64,
    weak_self: Weak<Self>,
}

#[derive(Default)]
struct Inner {
    snapshot: LifecycleSnapshot,
    ticker: Option<AnimationTicker>,
    in_flight: Option<Uuid>,
    /// Bumped whenever the state changes. Lets work that awaited outside the
    /// lock detect that someone else moved the state in the meantime.
    generation: u64,
    monitor_started: bool,
    shut_down: bool,
}

/// Final word of an action task.
struct Resolution {
    report: ProbeReport,
    notification: Option<String>,
}

impl<P, S> LifecycleController<P, S>
where
    P: ProcessController,
    S: IndicatorSink,
{
    /// Create a controller and show the placeholder `Stopped` state.
    ///
    /// Must be called from within a tokio runtime; background tasks are
    /// spawned onto it. Call [`start`](Self::start) to begin monitoring.
    #[track_caller]
    #[instrument(skip(config, controller, sink), fields(service = %config.service_name))]
    pub fn new(config: LifecycleConfig, controller: P, sink: S) -> CoreResult<Self> {
        config.validate()?;

        let runtime = Handle::try_current().map_err(|e| CoreError::RuntimeUnavailable {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let controller = Arc::new(controller);
        let (shutdown_tx, _) = watch::channel(false);

        let shared = Arc::new_cyclic(|weak_self| Shared {
            probe: StatusProbe::new(Arc::clone(&controller), &config),
            executor: ActionExecutor::new(controller, &config),
            config,
            sink,
            runtime,
            inner: Mutex::new(Inner::default()),
            shutdown_tx,
            tickers_started: AtomicU64::new(0),
            weak_self: weak_self.clone(),
        });

        {
            let inner = shared.lock();
            shared
                .sink
                .set_image(IndicatorImage::Static(inner.snapshot.state));
            shared.publish(&inner);
        }

        info!("Lifecycle controller initialized");

        Ok(Self { shared })
    }

    /// Start the monitor loop. Its first probe fires immediately so the
    /// placeholder state is replaced without waiting a full interval.
    #[instrument(skip(self))]
    pub fn start(&self) {
        let mut inner = self.shared.lock();
        if inner.shut_down || inner.monitor_started {
            return;
        }
        inner.monitor_started = true;

        let weak = Arc::downgrade(&self.shared);
        let shutdown_rx = self.shared.shutdown_tx.subscribe();

        self.shared.runtime.spawn(monitor::run(
            self.shared.config.monitor_interval,
            shutdown_rx,
            move || {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(shared) => {
                            shared.passive_refresh().await;
                            true
                        }
                        None => false,
                    }
                }
            },
        ));

        info!("Monitor loop spawned");
    }

    /// The single mutation entry point. See the module docs for ordering.
    pub fn set_state(&self, state: ServiceState, diagnostic: Option<String>) {
        let mut inner = self.shared.lock();
        if inner.shut_down {
            debug!(%state, "Ignoring state change after shutdown");
            return;
        }
        self.shared.apply(&mut inner, state, diagnostic);
    }

    /// Probe now and adopt the result unless a transition is in flight or the
    /// state changed while probing. Details follow in the background.
    pub async fn refresh(&self) -> ServiceState {
        self.shared.passive_refresh().await
    }

    /// Stop when running, start when stopped. Rejected otherwise.
    #[instrument(skip(self))]
    pub fn toggle(&self) -> Option<ActionHandle> {
        self.begin_action(|state| match state {
            ServiceState::Running => Some(ServiceAction::Stop),
            ServiceState::Stopped => Some(ServiceAction::Start),
            _ => None,
        })
    }

    /// Restart a running service. Rejected otherwise.
    #[instrument(skip(self))]
    pub fn restart(&self) -> Option<ActionHandle> {
        self.begin_action(|state| state.accepts_restart().then_some(ServiceAction::Restart))
    }

    /// Notify the user of the last error. Returns `false` (and does nothing)
    /// when there is none.
    #[instrument(skip(self))]
    pub fn show_last_error(&self) -> bool {
        let inner = self.shared.lock();
        if inner.shut_down {
            return false;
        }

        let Some(last_error) = inner.snapshot.last_error.as_deref() else {
            debug!("No last error to show");
            return false;
        };

        let title = format!("{} Error", self.shared.config.labels.display_name);
        self.shared
            .sink
            .notify(&title, text::head_chars(last_error, ERROR_NOTIFICATION_LIMIT));

        true
    }

    /// Forget the sticky last error.
    pub fn clear_last_error(&self) {
        let mut inner = self.shared.lock();
        if inner.shut_down || inner.snapshot.last_error.is_none() {
            return;
        }
        inner.snapshot.last_error = None;
        self.shared.publish(&inner);
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> LifecycleSnapshot {
        self.shared.lock().snapshot.clone()
    }

    /// Current state.
    pub fn state(&self) -> ServiceState {
        self.shared.state()
    }

    /// Menu derived from the current snapshot.
    pub fn menu(&self) -> MenuModel {
        let inner = self.shared.lock();
        MenuModel::from_snapshot(&inner.snapshot, &self.shared.config.labels)
    }

    /// Whether an animation ticker is registered.
    pub fn is_animating(&self) -> bool {
        self.shared.lock().ticker.is_some()
    }

    /// Whether an action task has not yet reported its final state.
    pub fn action_in_flight(&self) -> bool {
        self.shared.lock().in_flight.is_some()
    }

    /// Stop the monitor and animation. Later state changes are ignored;
    /// in-flight actions run to completion without touching the display.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        {
            let mut inner = self.shared.lock();
            if inner.shut_down {
                return;
            }
            inner.shut_down = true;
            if let Some(ticker) = inner.ticker.take() {
                ticker.stop();
            }
        }

        self.shared.shutdown_tx.send_replace(true);

        info!("Lifecycle controller shut down");
    }

    /// Number of animation tickers started so far.
    #[cfg(test)]
    pub(crate) fn tickers_started(&self) -> u64 {
        self.shared.tickers_started.load(Ordering::SeqCst)
    }

    fn begin_action<F>(&self, choose: F) -> Option<ActionHandle>
    where
        F: FnOnce(ServiceState) -> Option<ServiceAction>,
    {
        let (action, action_id) = {
            let mut inner = self.shared.lock();
            if inner.shut_down || inner.in_flight.is_some() {
                debug!("Action rejected: shut down or already in flight");
                return None;
            }

            let Some(action) = choose(inner.snapshot.state) else {
                debug!(state = %inner.snapshot.state, "Action not available in this state");
                return None;
            };

            let action_id = Uuid::new_v4();
            inner.in_flight = Some(action_id);
            self.shared
                .apply(&mut inner, action.transitional_state(), None);

            let name = &self.shared.config.labels.display_name;
            self.shared
                .sink
                .notify(name, &format!("{} {name}...", action.progress_label()));

            (action, action_id)
        };

        info!(action_id = %action_id, %action, "Action issued");

        let shared = Arc::clone(&self.shared);
        Some(
            self.shared
                .runtime
                .spawn(async move { shared.run_action(action, action_id).await }),
        )
    }
}

impl<P, S> Shared<P, S>
where
    P: ProcessController,
    S: IndicatorSink,
{
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> ServiceState {
        self.lock().snapshot.state
    }

    /// Steps 1-5 of a state change. Caller holds the lock.
    fn apply(&self, inner: &mut Inner, state: ServiceState, diagnostic: Option<String>) {
        let old = inner.snapshot.state;
        inner.snapshot.state = state;
        if old != state {
            inner.generation += 1;
        }

        if let Some(diagnostic) = diagnostic {
            inner.snapshot.last_error = Some(diagnostic);
        }

        if state != ServiceState::Running {
            inner.snapshot.details = None;
        }

        if !state.is_transitional() {
            if let Some(ticker) = inner.ticker.take() {
                ticker.stop();
            }
            self.sink.set_image(IndicatorImage::Static(state));
        } else if inner.ticker.as_ref().map(AnimationTicker::state) != Some(state) {
            // Entering a transition, or switching between the two transitional
            // states. Re-notification of the same state keeps the ticker.
            self.start_animation(inner, state);
        }

        self.publish(inner);

        debug!(%old, new = %state, "State applied");
    }

    /// Push title, labels and enablement for the current snapshot.
    fn publish(&self, inner: &Inner) {
        let model = MenuModel::from_snapshot(&inner.snapshot, &self.config.labels);

        self.sink.set_title(&model.title);
        for item in MenuItemId::ALL {
            self.sink.set_menu_label(item, model.label(item));
            self.sink.set_menu_enabled(item, model.enabled(item));
        }
    }

    fn start_animation(&self, inner: &mut Inner, state: ServiceState) {
        if let Some(previous) = inner.ticker.take() {
            previous.stop();
        }

        inner.snapshot.animation_frame = 0;
        self.sink
            .set_image(IndicatorImage::Animated { state, frame: 0 });

        let id = self.tickers_started.fetch_add(1, Ordering::SeqCst) + 1;
        let weak = self.weak_self.clone();

        inner.ticker = Some(AnimationTicker::start(
            &self.runtime,
            id,
            state,
            self.config.animation_period,
            move || {
                weak.upgrade()
                    .is_some_and(|shared| shared.advance_animation(id, state))
            },
        ));
    }

    /// One animation tick. Returns `false` once the ticker is no longer the
    /// registered one, which ends its task.
    fn advance_animation(&self, ticker_id: u64, state: ServiceState) -> bool {
        let mut inner = self.lock();

        let registered = inner.ticker.as_ref().map(AnimationTicker::id);
        if inner.shut_down || registered != Some(ticker_id) || inner.snapshot.state != state {
            trace!(ticker_id, "Stale animation tick dropped");
            return false;
        }

        let frame = (inner.snapshot.animation_frame + 1) % self.config.animation_frames;
        inner.snapshot.animation_frame = frame;
        self.sink.set_image(IndicatorImage::Animated { state, frame });

        true
    }

    /// Monitor/refresh path: report truth, but never override a transition.
    ///
    /// The result is dropped if the state moved while the probe was running,
    /// including an action that began and finished in that window.
    async fn passive_refresh(&self) -> ServiceState {
        let (current, generation) = {
            let inner = self.lock();
            (inner.snapshot.state, inner.generation)
        };
        if current.is_transitional() {
            trace!(state = %current, "Transition in flight, skipping probe");
            return current;
        }

        let report = self.probe.probe().await;

        let details_generation = {
            let mut inner = self.lock();
            if inner.shut_down {
                return inner.snapshot.state;
            }
            if inner.snapshot.state.is_transitional() || inner.generation != generation {
                debug!(
                    probed = %report.state,
                    current = %inner.snapshot.state,
                    "State moved during probe, discarding passive result"
                );
                return inner.snapshot.state;
            }

            self.apply(&mut inner, report.state, report.diagnostic);
            (report.state == ServiceState::Running).then_some(inner.generation)
        };

        if let Some(generation) = details_generation {
            self.spawn_details(generation);
        }

        report.state
    }

    /// Fetch the details listing in the background. The state is already on
    /// display; the listing only lands if nothing has moved it since.
    fn spawn_details(&self, generation: u64) {
        let Some(shared) = self.weak_self.upgrade() else {
            return;
        };

        self.runtime.spawn(async move {
            let details = shared.probe.details().await;

            let mut inner = shared.lock();
            if inner.shut_down
                || inner.generation != generation
                || inner.snapshot.state != ServiceState::Running
            {
                trace!(generation, "State moved, details listing dropped");
                return;
            }

            inner.snapshot.details = details;
            shared.publish(&inner);
        });
    }

    #[instrument(skip(self, action_id), fields(action_id = %action_id))]
    async fn run_action(self: Arc<Self>, action: ServiceAction, action_id: Uuid) -> ServiceState {
        let limit = self.config.diagnostic_limit;

        let resolution = match self.executor.execute(action).await {
            Err(fault) => {
                let diagnostic = fault.diagnostic(limit);
                let notification = failure_notification(action, &diagnostic);
                Resolution {
                    report: ProbeReport {
                        state: ServiceState::Error,
                        diagnostic: Some(diagnostic),
                    },
                    notification: Some(notification),
                }
            }
            Ok(()) => self.settle_action(action).await,
        };

        let (state, details_generation) = self.finish_action(action_id, resolution);
        if let Some(generation) = details_generation {
            self.spawn_details(generation);
        }

        state
    }

    async fn settle_action(&self, action: ServiceAction) -> Resolution {
        let target = action.target_state();
        let attempts = self.config.attempts_for(action);

        let outcome = settle(&self.probe, target, attempts, self.config.settle_interval).await;

        let report = match outcome {
            SettleOutcome::Reached { attempt } => {
                info!(%action, attempt, "Action settled");
                ProbeReport {
                    state: target,
                    diagnostic: None,
                }
            }
            SettleOutcome::Faulted {
                diagnostic,
                attempt,
            } => {
                warn!(%action, attempt, "Probe reported error while settling");
                ProbeReport {
                    state: ServiceState::Error,
                    diagnostic,
                }
            }
            SettleOutcome::Exhausted => {
                let report = self.probe.probe().await;
                warn!(
                    %action,
                    attempts,
                    state = %report.state,
                    "Settle budget exhausted, adopting final probe"
                );
                report
            }
        };

        let notification = (report.state == ServiceState::Error).then(|| {
            failure_notification(action, report.diagnostic.as_deref().unwrap_or_default())
        });

        Resolution {
            report,
            notification,
        }
    }

    /// Display the resolved state. Returns it, plus the generation to fetch
    /// details for when it is Running.
    fn finish_action(
        &self,
        action_id: Uuid,
        resolution: Resolution,
    ) -> (ServiceState, Option<u64>) {
        let Resolution {
            report,
            notification,
        } = resolution;

        let mut inner = self.lock();
        if inner.in_flight == Some(action_id) {
            inner.in_flight = None;
        }

        if inner.shut_down {
            debug!(state = %report.state, "Action finished after shutdown, display untouched");
            return (report.state, None);
        }

        self.apply(&mut inner, report.state, report.diagnostic);

        if let Some(body) = notification {
            self.sink.notify(&self.config.labels.display_name, &body);
        }

        let details_generation =
            (report.state == ServiceState::Running).then_some(inner.generation);

        (report.state, details_generation)
    }
}

fn failure_notification(action: ServiceAction, diagnostic: &str) -> String {
    format!(
        "Failed to {action}: {}",
        text::head_chars(diagnostic, FAILURE_NOTIFICATION_LIMIT)
    )
}
