//! The `emailer` module sends outbound notification mails.
//!
//! [`EmailNotifier`](crate::subscriber::EmailNotifier) talks to an [`Emailer`];
//! the production implementation is [`SmtpEmailer`].

mod smtp;

pub use smtp::SmtpEmailer;

use async_trait::async_trait;

use crate::utils::error::EmailError;

#[async_trait]
pub trait Emailer: Send + Sync {
    /// Sends one mail per recipient, stopping at the first failure.
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), EmailError>;
}
