//! Lettre-backed SMTP mailer adapter.
//!
//! Deliveries are best-effort by contract: the lifecycle service fires them
//! on a spawned task and only logs failures, so this adapter never needs a
//! retry story of its own.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::ports::mailer::{MailError, Mailer, OutgoingEmail};

/// Display name shown to recipients.
const SENDER_NAME: &str = "Resolve: Campus Voice";

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host name, e.g. `smtp.gmail.com`.
    pub relay: String,
    /// Account used to authenticate against the relay.
    pub username: String,
    /// Account password or app token.
    pub password: String,
    /// Address notifications are sent from.
    pub sender: String,
}

/// Mailer adapter delivering through an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer for the given relay settings.
    ///
    /// # Errors
    ///
    /// Fails when the relay host is invalid or the sender address does not
    /// parse as a mailbox.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let sender = sender_mailbox(&settings.sender)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.relay)
            .map_err(|err| MailError::new(format!("invalid relay: {err}")))?
            .credentials(Credentials::new(settings.username, settings.password))
            .build();
        Ok(Self { transport, sender })
    }
}

fn sender_mailbox(address: &str) -> Result<Mailbox, MailError> {
    format!("\"{SENDER_NAME}\" <{address}>")
        .parse()
        .map_err(|err| MailError::new(format!("invalid sender address: {err}")))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|err| MailError::new(format!("invalid recipient: {err}")))?;
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(email.subject)
            .body(email.body)
            .map_err(|err| MailError::new(format!("message build failed: {err}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailError::new(err.to_string()))?;
        Ok(())
    }
}
