use std::sync::Arc;

use tracing::{debug, info, warn};

use super::payload::Payload;
use super::signature;
use crate::broker::Broker;
use crate::event::Event;
use crate::utils::error::HookError;

/// What became of an accepted webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// The run carried no coverage; nothing was published.
    Ignored,
    /// A GitHub event with this many coverage records was published.
    Published(usize),
}

impl HookOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            HookOutcome::Ignored => "web hook was not very interesting",
            HookOutcome::Published(_) => "web hook well received",
        }
    }
}

/// Turns signed CI webhook deliveries into GitHub events on the broker.
pub struct Hook {
    broker: Arc<dyn Broker>,
    secret: String,
}

impl Hook {
    pub fn new(broker: Arc<dyn Broker>, secret: impl Into<String>) -> Self {
        Self {
            broker,
            secret: secret.into(),
        }
    }

    pub async fn receive(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<HookOutcome, HookError> {
        let signature = match signature {
            Some(sig) if !sig.is_empty() && !body.is_empty() => sig,
            _ => return Err(HookError::Incomplete),
        };

        if !signature::verify(body, signature, &self.secret) {
            warn!("webhook signature mismatch");
            return Err(HookError::Unverified);
        }

        let payload: Payload = serde_json::from_slice(body).map_err(|e| {
            debug!(error = %e, "webhook body is not a valid payload");
            HookError::Incomplete
        })?;

        let event = payload.into_event();
        if event.coverage.is_empty() {
            debug!(commit = %event.commit, "webhook carried no coverage");
            return Ok(HookOutcome::Ignored);
        }

        let count = event.coverage.len();
        info!(
            repository = %event.repository,
            commit = %event.commit,
            packages = count,
            "publishing github event"
        );
        self.broker.publish(Event::Github(event)).await?;

        Ok(HookOutcome::Published(count))
    }
}
