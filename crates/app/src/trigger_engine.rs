//! Trigger engine — watches a signal source and dispatches a payload when
//! the trigger's condition is met.
//!
//! Signal intake and payload dispatch are deliberately split:
//!
//! - **Intake** ([`Trigger::signal_changed`]) is exclusive per trigger. The
//!   evaluation state sits behind a mutex that intake only ever `try_lock`s;
//!   a sample arriving while another one is being evaluated is dropped (and
//!   logged at debug level) instead of queueing behind it.
//! - **Dispatch** runs on a per-trigger [`DispatchWorker`]. Intake only
//!   submits the job, so a slow payload never delays the next sample.
//!
//! Once a dispatch has started, its `trigger_occurred` is always followed by
//! exactly one `trigger_complete` on the [`PlanRegistrar`], whatever the
//! dispatcher does (including panicking) and even when the trigger is
//! disabled mid-dispatch (the event is then marked failed). Dispatches still
//! queued at disable time are dropped without any notification.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use plantrigger_domain::error::{DispatchError, PlanTriggerError};
use plantrigger_domain::event::TriggerEvent;
use plantrigger_domain::id::TriggerId;
use plantrigger_domain::trigger::{Condition, TriggerDefinition};

use crate::dispatch_worker::DispatchWorker;
use crate::ports::{PayloadDispatcher, PlanRegistrar, SignalListener, SignalSource};

/// What happened to one sample handed to [`Trigger::signal_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Dropped: another sample was still being evaluated.
    Busy,
    /// Evaluated; the condition did not fire.
    Held,
    /// Evaluated; the condition fired and the payload was queued.
    Fired,
    /// The sample could not be evaluated (e.g. NaN).
    Rejected,
    /// The condition fired but the trigger was disabled concurrently.
    Discarded,
}

/// A trigger bound to its collaborators.
///
/// Dropping a `Trigger` disables it.
pub struct Trigger<S, R, D>
where
    S: SignalSource + ?Sized + 'static,
    R: PlanRegistrar + ?Sized + 'static,
    D: PayloadDispatcher + 'static,
{
    core: Arc<TriggerCore<S, R, D>>,
}

struct TriggerCore<S: ?Sized, R: ?Sized, D> {
    definition: Arc<TriggerDefinition>,
    source: Arc<S>,
    registrar: Arc<R>,
    dispatcher: Arc<D>,
    runtime: Handle,
    /// Serializes enable/disable transitions. Never taken by signal intake.
    enabled: Mutex<bool>,
    condition: Mutex<Condition>,
    worker: Mutex<Option<DispatchWorker>>,
    ignored_signals: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S, R, D> Trigger<S, R, D>
where
    S: SignalSource + ?Sized + 'static,
    R: PlanRegistrar + ?Sized + 'static,
    D: PayloadDispatcher + 'static,
{
    /// Bind `definition` to its collaborators. The trigger starts disabled.
    ///
    /// Payload dispatches run as tasks on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanTriggerError::Validation`] or
    /// [`PlanTriggerError::Numeric`] when the definition is unusable
    /// (blank name, zero interval, non-finite parameters, …).
    pub fn new(
        definition: TriggerDefinition,
        source: Arc<S>,
        registrar: Arc<R>,
        dispatcher: Arc<D>,
        runtime: Handle,
    ) -> Result<Self, PlanTriggerError> {
        let condition = definition.build_condition()?;
        Ok(Self {
            core: Arc::new(TriggerCore {
                definition: Arc::new(definition),
                source,
                registrar,
                dispatcher,
                runtime,
                enabled: Mutex::new(false),
                condition: Mutex::new(condition),
                worker: Mutex::new(None),
                ignored_signals: AtomicU64::new(0),
            }),
        })
    }

    #[must_use]
    pub fn id(&self) -> TriggerId {
        self.core.definition.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.definition.name
    }

    #[must_use]
    pub fn definition(&self) -> &TriggerDefinition {
        &self.core.definition
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        *lock(&self.core.enabled)
    }

    /// Samples dropped because they overlapped an evaluation in progress.
    #[must_use]
    pub fn ignored_signals(&self) -> u64 {
        self.core.ignored_signals.load(Ordering::Relaxed)
    }

    /// Enable or disable the trigger. Requesting the current state is a no-op.
    ///
    /// # Errors
    ///
    /// Enabling fails with [`PlanTriggerError::Signal`] when the source cannot
    /// be read and with [`PlanTriggerError::Numeric`] when the reading cannot
    /// serve as a reference. The trigger stays disabled in both cases.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), PlanTriggerError> {
        if enabled {
            self.enable()
        } else {
            self.disable();
            Ok(())
        }
    }

    /// Read the source, re-arm the condition, start the dispatch worker and
    /// subscribe.
    ///
    /// # Errors
    ///
    /// See [`set_enabled`](Self::set_enabled).
    pub fn enable(&self) -> Result<(), PlanTriggerError> {
        let core = &self.core;
        let mut enabled = lock(&core.enabled);
        if *enabled {
            debug!(trigger = %core.definition.name, "trigger already enabled");
            return Ok(());
        }

        let current = core.source.read()?;
        lock(&core.condition).arm(current)?;
        *lock(&core.worker) = Some(DispatchWorker::spawn(&core.runtime, &core.definition.name));

        core.source
            .add_listener(Arc::clone(core) as Arc<dyn SignalListener>);
        *enabled = true;

        info!(
            trigger = %core.definition.name,
            source = core.source.name(),
            signal = current,
            condition = %core.definition.condition,
            "trigger enabled"
        );
        Ok(())
    }

    /// Unsubscribe, then stop the dispatch worker without waiting for it.
    /// Queued dispatches are discarded; the running one is cancelled and
    /// reported to the registrar as a failed completion.
    pub fn disable(&self) {
        let core = &self.core;
        let mut enabled = lock(&core.enabled);
        if !*enabled {
            debug!(trigger = %core.definition.name, "trigger already disabled");
            return;
        }

        core.source.remove_listener(core.definition.id);
        let worker = lock(&core.worker).take();
        if let Some(worker) = worker {
            worker.shutdown_now();
        }
        *enabled = false;

        info!(trigger = %core.definition.name, "trigger disabled");
    }

    /// Evaluate one sample; see [`SignalOutcome`]. This is what the signal
    /// source reaches through [`SignalListener::signal_changed`].
    pub fn signal_changed(&self, signal: f64) -> SignalOutcome {
        self.core.process(signal)
    }
}

impl<S, R, D> Drop for Trigger<S, R, D>
where
    S: SignalSource + ?Sized + 'static,
    R: PlanRegistrar + ?Sized + 'static,
    D: PayloadDispatcher + 'static,
{
    fn drop(&mut self) {
        self.disable();
    }
}

impl<S, R, D> std::fmt::Debug for Trigger<S, R, D>
where
    S: SignalSource + ?Sized + 'static,
    R: PlanRegistrar + ?Sized + 'static,
    D: PayloadDispatcher + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger")
            .field("definition", &self.core.definition)
            .field("source", &self.core.source.name())
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl<S, R, D> TriggerCore<S, R, D>
where
    S: SignalSource + ?Sized + 'static,
    R: PlanRegistrar + ?Sized + 'static,
    D: PayloadDispatcher + 'static,
{
    fn process(&self, signal: f64) -> SignalOutcome {
        let name = &self.definition.name;
        let mut condition = match self.condition.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                self.ignored_signals.fetch_add(1, Ordering::Relaxed);
                debug!(
                    trigger = %name,
                    signal,
                    "signal ignored: previous signal still being evaluated"
                );
                return SignalOutcome::Busy;
            }
        };

        // Runs inside the exclusive region, so conditions must stay cheap.
        let fire = match condition.evaluate(signal) {
            Ok(fire) => fire,
            Err(err) => {
                warn!(trigger = %name, signal, error = %err, "signal rejected by trigger condition");
                return SignalOutcome::Rejected;
            }
        };
        if !fire {
            return SignalOutcome::Held;
        }
        self.submit(signal)
    }

    fn submit(&self, signal: f64) -> SignalOutcome {
        let job = dispatch(
            Arc::clone(&self.definition),
            Arc::clone(&self.registrar),
            Arc::clone(&self.dispatcher),
            self.source.name().to_owned(),
            signal,
        );

        let worker = lock(&self.worker);
        match worker.as_ref() {
            Some(worker) if worker.submit(Box::pin(job)) => {
                info!(
                    trigger = %self.definition.name,
                    signal,
                    payload = %self.definition.payload,
                    "trigger fired"
                );
                SignalOutcome::Fired
            }
            _ => {
                warn!(
                    trigger = %self.definition.name,
                    signal,
                    "trigger fired while being disabled; payload discarded"
                );
                SignalOutcome::Discarded
            }
        }
    }
}

impl<S, R, D> SignalListener for TriggerCore<S, R, D>
where
    S: SignalSource + ?Sized + 'static,
    R: PlanRegistrar + ?Sized + 'static,
    D: PayloadDispatcher + 'static,
{
    fn trigger_id(&self) -> TriggerId {
        self.definition.id
    }

    fn signal_changed(&self, signal: f64) {
        self.process(signal);
    }
}

/// The job a firing submits to the dispatch worker.
///
/// Nothing inside the job may take the worker down: a panic anywhere in it
/// (registrar included) is caught and logged here.
async fn dispatch<R, D>(
    definition: Arc<TriggerDefinition>,
    registrar: Arc<R>,
    dispatcher: Arc<D>,
    source_name: String,
    signal: f64,
) where
    R: PlanRegistrar + ?Sized,
    D: PayloadDispatcher,
{
    let job = run_dispatch(&definition, &*registrar, &*dispatcher, &source_name, signal);
    if AssertUnwindSafe(job).catch_unwind().await.is_err() {
        error!(trigger = %definition.name, "dispatch job panicked");
    }
}

async fn run_dispatch<R, D>(
    definition: &TriggerDefinition,
    registrar: &R,
    dispatcher: &D,
    source_name: &str,
    signal: f64,
) where
    R: PlanRegistrar + ?Sized,
    D: PayloadDispatcher,
{
    registrar.trigger_occurred(definition);
    let mut completion = Completion {
        definition,
        registrar,
        source_name,
        event: Some(TriggerEvent::new(definition.id, signal)),
        settled: false,
    };

    // The async block makes the synchronous part of `handle` panic-safe too.
    let outcome = AssertUnwindSafe(async { dispatcher.handle(&definition.payload).await })
        .catch_unwind()
        .await
        .unwrap_or(Err(DispatchError::Panicked));
    if let Some(event) = completion.event.as_mut() {
        match outcome {
            Ok(Some(dispatch_id)) => event.set_dispatch_id(dispatch_id),
            Ok(None) => {}
            Err(err) => {
                error!(
                    trigger = %definition.name,
                    payload = %definition.payload,
                    error = %err,
                    "payload dispatch failed"
                );
                event.mark_failed();
            }
        }
    }
    completion.settled = true;
}

/// Reports `trigger_complete` when dropped, so the registrar hears about a
/// firing even when its job is cancelled mid-dispatch (trigger disabled).
/// An unsettled completion is reported as failed.
struct Completion<'a, R: PlanRegistrar + ?Sized> {
    definition: &'a TriggerDefinition,
    registrar: &'a R,
    source_name: &'a str,
    event: Option<TriggerEvent>,
    settled: bool,
}

impl<R: PlanRegistrar + ?Sized> Drop for Completion<'_, R> {
    fn drop(&mut self) {
        let Some(mut event) = self.event.take() else {
            return;
        };
        if !self.settled {
            warn!(
                trigger = %self.definition.name,
                signal = event.signal,
                "payload dispatch interrupted"
            );
            event.mark_failed();
        }
        self.registrar
            .trigger_complete(self.definition, event, self.source_name);
    }
}
