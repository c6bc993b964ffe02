use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::RelaySettings;

use super::domain::ExpirableRecord;

/// One outbound reminder message, fully rendered before it reaches the
/// transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ReminderMail {
    /// Render the reminder for one record: fixed subject per record kind and
    /// a body carrying the human-readable end date.
    pub fn for_record(sender: &str, record: &ExpirableRecord) -> Self {
        Self {
            from: sender.to_string(),
            to: record.contact_email.clone(),
            subject: record.kind.subject().to_string(),
            body: format!(
                "Hello, your {} will expire on {}. Please renew it promptly.",
                record.kind.label(),
                record.end_date.format("%a %b %d %Y"),
            ),
        }
    }
}

/// Acknowledgment returned by the transport once a message is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReceipt {
    pub token: String,
}

/// Failures for a single send attempt.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mailbox {address}: {detail}")]
    InvalidMailbox { address: String, detail: String },
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Outbound mail boundary: exactly one send attempt per call, no retries.
/// Shared across dispatch tasks behind an `Arc`; each send is an independent
/// request/response exchange, so no locking is involved.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &ReminderMail) -> Result<TransportReceipt, MailError>;
}

/// Production transport: lettre async SMTP over a STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(relay: &RelaySettings) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&relay.host)
            .map_err(|err| MailError::Transport(err.to_string()))?
            .port(relay.port);
        if let Some(credentials) = relay.credentials.as_ref() {
            builder = builder.credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn mailbox(address: &str) -> Result<Mailbox, MailError> {
        address
            .parse()
            .map_err(|err: lettre::address::AddressError| MailError::InvalidMailbox {
                address: address.to_string(),
                detail: err.to_string(),
            })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &ReminderMail) -> Result<TransportReceipt, MailError> {
        let message = Message::builder()
            .from(Self::mailbox(&mail.from)?)
            .to(Self::mailbox(&mail.to)?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|err| MailError::Transport(err.to_string()))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;

        let token = match response.first_line() {
            Some(line) => line.to_string(),
            None => response.code().to_string(),
        };
        Ok(TransportReceipt { token })
    }
}
