use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use super::Emailer;
use crate::config::EmailSettings;
use crate::utils::error::EmailError;

/// [`Emailer`] delivering through an SMTP relay.
///
/// A transport is built per `send` call; the blocking lettre transport runs
/// on tokio's blocking pool.
#[derive(Clone)]
pub struct SmtpEmailer {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    from: Mailbox,
}

impl SmtpEmailer {
    /// # Errors
    ///
    /// Returns [`EmailError::Address`] if the configured sender is not a
    /// valid mailbox.
    pub fn new(settings: &EmailSettings) -> Result<Self, EmailError> {
        let from = parse_mailbox(&settings.from)?;
        let credentials = (!settings.username.is_empty())
            .then(|| Credentials::new(settings.username.clone(), settings.password.clone()));

        Ok(Self {
            host: settings.host.clone(),
            port: settings.port,
            credentials,
            from,
        })
    }

    pub fn build_message(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<Message, EmailError> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(recipient)?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, EmailError> {
        let builder = SmtpTransport::relay(&self.host)
            .map_err(|e| EmailError::Transport(format!("relay {}: {e}", self.host)))?
            .port(self.port);

        let builder = match &self.credentials {
            Some(credentials) => builder.credentials(credentials.clone()),
            None => builder,
        };
        Ok(builder.build())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address.parse().map_err(|e| EmailError::Address {
        address: address.to_string(),
        reason: format!("{e}"),
    })
}

#[async_trait]
impl Emailer for SmtpEmailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), EmailError> {
        if recipients.is_empty() {
            return Ok(());
        }

        let transport = self.transport()?;
        for recipient in recipients {
            let email = self.build_message(subject, body, recipient)?;
            let mailer = transport.clone();

            tokio::task::spawn_blocking(move || {
                mailer
                    .send(&email)
                    .map_err(|e| EmailError::Transport(e.to_string()))
            })
            .await
            .map_err(|e| EmailError::Task(e.to_string()))??;

            debug!(%recipient, %subject, "email sent");
        }
        Ok(())
    }
}
