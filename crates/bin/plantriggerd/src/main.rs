//! # plantriggerd — plan trigger daemon
//!
//! Composition root that wires the virtual adapters to the trigger engine
//! and replays a signal ramp through it.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Construct the virtual signal, registrar and dispatcher (adapters)
//! - Construct one `Trigger` per configured definition and enable it
//! - Run the signal ramp to completion, or until Ctrl-C
//! - Disable every trigger and log a per-trigger summary
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use plantrigger_adapter_virtual::{
    RecordingRegistrar, SignalRamp, SimulatedDispatcher, VirtualSignal,
};
use plantrigger_app::Trigger;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

use config::Config;

type DaemonTrigger = Trigger<VirtualSignal, RecordingRegistrar, SimulatedDispatcher>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let runtime = Handle::current();

    // Adapters
    let signal = Arc::new(VirtualSignal::new(
        config.signal.name.clone(),
        config.signal.start,
    ));
    let registrar = Arc::new(RecordingRegistrar::new());
    let dispatcher = Arc::new(
        SimulatedDispatcher::new(config.dispatcher.duration())
            .with_failing_kinds(config.dispatcher.failing_kinds.iter().cloned()),
    );

    // Triggers
    let mut triggers: Vec<DaemonTrigger> = Vec::with_capacity(config.triggers.len());
    for definition in config.triggers {
        let trigger = Trigger::new(
            definition,
            Arc::clone(&signal),
            Arc::clone(&registrar),
            Arc::clone(&dispatcher),
            runtime.clone(),
        )?;
        trigger.enable()?;
        triggers.push(trigger);
    }
    tracing::info!(
        triggers = triggers.len(),
        signal = %config.signal.name,
        "plantriggerd started"
    );

    // Ramp
    let mut ramp = SignalRamp::start(
        &runtime,
        Arc::clone(&signal),
        config.signal.step,
        config.signal.period(),
        config.signal.samples,
    );
    let interrupted = tokio::select! {
        () = ramp.finished() => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        tracing::info!("interrupted, stopping");
        ramp.stop();
    } else {
        // Let dispatches already queued finish before tearing down.
        tokio::select! {
            () = tokio::time::sleep(config.dispatcher.drain()) => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted while draining"),
        }
    }

    for trigger in &triggers {
        trigger.disable();
    }
    summarize(&triggers, &registrar);
    Ok(())
}

fn summarize(triggers: &[DaemonTrigger], registrar: &RecordingRegistrar) {
    for trigger in triggers {
        let completions = registrar.completions_for(trigger.id());
        let failed = completions.iter().filter(|event| event.failed).count();
        tracing::info!(
            trigger = %trigger.name(),
            occurred = registrar.occurrences_for(trigger.id()),
            completed = completions.len(),
            failed,
            ignored_signals = trigger.ignored_signals(),
            "trigger summary"
        );
    }
}
