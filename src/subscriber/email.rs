use std::sync::Arc;

use async_trait::async_trait;

use super::{Identity, Subscriber};
use crate::emailer::Emailer;
use crate::event::Event;
use crate::utils::error::NotifyError;

/// Mails every event it receives to a single address.
///
/// The subject is the event name and the body its display form.
pub struct EmailNotifier {
    identity: Identity,
    mailer: Arc<dyn Emailer>,
    recipient: String,
}

impl EmailNotifier {
    pub fn new(mailer: Arc<dyn Emailer>, recipient: impl Into<String>) -> Self {
        Self {
            identity: Identity::default(),
            mailer,
            recipient: recipient.into(),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }
}

#[async_trait]
impl Subscriber for EmailNotifier {
    fn id(&self) -> String {
        self.identity.get()
    }

    fn set_id(&self, id: &str) {
        self.identity.set(id);
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        if self.recipient.trim().is_empty() {
            return Err(NotifyError::EmptyRecipient);
        }

        self.mailer
            .send(
                event.name(),
                &event.to_string(),
                std::slice::from_ref(&self.recipient),
            )
            .await?;
        Ok(())
    }
}
