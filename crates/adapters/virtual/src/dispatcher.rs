//! Simulated payload dispatcher.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use plantrigger_app::ports::PayloadDispatcher;
use plantrigger_domain::error::DispatchError;
use plantrigger_domain::id::DispatchId;
use plantrigger_domain::payload::Payload;

/// Pretends to run each payload for `duration`.
///
/// Payloads whose `kind` is listed in `failing_kinds` fail with
/// [`DispatchError::Execution`]; every other payload succeeds with a fresh
/// [`DispatchId`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedDispatcher {
    duration: Duration,
    failing_kinds: HashSet<String>,
}

impl SimulatedDispatcher {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            failing_kinds: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_failing_kinds<I, K>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.failing_kinds.extend(kinds.into_iter().map(Into::into));
        self
    }
}

impl PayloadDispatcher for SimulatedDispatcher {
    fn handle(
        &self,
        payload: &Payload,
    ) -> impl Future<Output = Result<Option<DispatchId>, DispatchError>> + Send {
        let duration = self.duration;
        let fails = self.failing_kinds.contains(&payload.kind);
        let kind = payload.kind.clone();
        async move {
            tracing::debug!(kind = %kind, ?duration, "running simulated payload");
            if !duration.is_zero() {
                tokio::time::sleep(duration).await;
            }
            if fails {
                return Err(DispatchError::Execution(format!(
                    "simulated failure for payload kind '{kind}'"
                )));
            }
            Ok(Some(DispatchId::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_return_fresh_dispatch_id_on_success() {
        let dispatcher = SimulatedDispatcher::new(Duration::from_millis(1));
        let payload = Payload::new("scan", serde_json::json!({"points": 10}));

        let first = dispatcher.handle(&payload).await.unwrap();
        let second = dispatcher.handle(&payload).await.unwrap();

        assert!(first.is_some());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn should_fail_configured_payload_kinds() {
        let dispatcher = SimulatedDispatcher::default().with_failing_kinds(["quench"]);

        let result = dispatcher
            .handle(&Payload::new("quench", serde_json::Value::Null))
            .await;
        assert!(matches!(result, Err(DispatchError::Execution(msg)) if msg.contains("quench")));

        let result = dispatcher
            .handle(&Payload::new("scan", serde_json::Value::Null))
            .await;
        assert!(result.is_ok());
    }
}
