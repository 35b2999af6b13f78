//! Scripted signal ramp — drives a [`VirtualSignal`] on a timer.

use std::sync::Arc;
use std::time::Duration;

use plantrigger_app::ports::SignalSource;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::VirtualSignal;

/// A background task adding `step` to a [`VirtualSignal`] every `period`,
/// `samples` times.
#[derive(Debug)]
pub struct SignalRamp {
    task: JoinHandle<()>,
}

impl SignalRamp {
    /// Start ramping from the signal's current value. If the signal cannot be
    /// read the ramp starts from zero.
    #[must_use]
    pub fn start(
        runtime: &Handle,
        signal: Arc<VirtualSignal>,
        step: f64,
        period: Duration,
        samples: u32,
    ) -> Self {
        let task = runtime.spawn(async move {
            let mut value = signal.read().unwrap_or_default();
            tracing::info!(signal = signal.name(), start = value, step, samples, "signal ramp started");
            for _ in 0..samples {
                tokio::time::sleep(period).await;
                value += step;
                signal.set(value);
            }
            tracing::info!(signal = signal.name(), end = value, "signal ramp finished");
        });
        Self { task }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until every step has been applied (or the ramp was stopped).
    pub async fn finished(&mut self) {
        if let Err(err) = (&mut self.task).await
            && !err.is_cancelled()
        {
            tracing::warn!(error = %err, "signal ramp task ended abnormally");
        }
    }

    /// Stop stepping. Steps already applied stay applied.
    pub fn stop(&self) {
        self.task.abort();
    }
}
