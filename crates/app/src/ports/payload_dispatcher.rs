//! Payload dispatcher port — hands payloads to whatever executes them.

use std::future::Future;

use plantrigger_domain::error::DispatchError;
use plantrigger_domain::id::DispatchId;
use plantrigger_domain::payload::Payload;

/// Executes (or queues) the work described by a [`Payload`].
pub trait PayloadDispatcher: Send + Sync {
    /// Handle `payload`, returning the id of the resulting unit of work when
    /// there is one.
    fn handle(
        &self,
        payload: &Payload,
    ) -> impl Future<Output = Result<Option<DispatchId>, DispatchError>> + Send;
}
