//! Single-worker executor hosting one trigger's payload dispatches.
//!
//! Jobs run one after another on a dedicated tokio task, in submission
//! order. Different triggers own different workers and therefore dispatch
//! in parallel.

use std::future::Future;
use std::pin::Pin;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// A unit of work queued on a [`DispatchWorker`].
pub(crate) type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub(crate) struct DispatchWorker {
    jobs: mpsc::UnboundedSender<Job>,
    task: JoinHandle<()>,
}

impl DispatchWorker {
    /// Spawn the worker task on `runtime`.
    pub(crate) fn spawn(runtime: &Handle, trigger_name: &str) -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();
        let span = tracing::info_span!("dispatch_worker", trigger = %trigger_name);
        let task = runtime.spawn(
            async move {
                while let Some(job) = queue.recv().await {
                    job.await;
                }
            }
            .instrument(span),
        );
        Self { jobs, task }
    }

    /// Queue `job` behind any job already submitted. Returns `false` if the
    /// worker is gone.
    pub(crate) fn submit(&self, job: Job) -> bool {
        self.jobs.send(job).is_ok()
    }

    /// Stop immediately: queued jobs are discarded and the running job is
    /// cancelled at its next await point. Does not wait for either.
    pub(crate) fn shutdown_now(self) {
        self.task.abort();
    }
}
