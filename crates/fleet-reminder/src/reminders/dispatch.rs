use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use super::domain::{ExpirableRecord, RecordId, RecordKind};
use super::mailer::{MailError, MailTransport, ReminderMail, TransportReceipt};

/// Result of one dispatch attempt. Created per attempt, reported in the
/// cycle summary, then dropped; outcomes are never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationOutcome {
    pub record_id: RecordId,
    pub kind: RecordKind,
    pub recipient: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationOutcome {
    fn accepted(record: &ExpirableRecord, receipt: TransportReceipt) -> Self {
        Self {
            record_id: record.id.clone(),
            kind: record.kind,
            recipient: record.contact_email.clone(),
            accepted: true,
            receipt: Some(receipt.token),
            error: None,
        }
    }

    fn failed(record: &ExpirableRecord, error: DispatchError) -> Self {
        Self {
            record_id: record.id.clone(),
            kind: record.kind,
            recipient: record.contact_email.clone(),
            accepted: false,
            receipt: None,
            error: Some(error.to_string()),
        }
    }
}

/// Failure modes for a single reminder dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error("send timed out after {0:?}")]
    TimedOut(Duration),
}

/// Sends one reminder per qualifying record through the mail transport.
/// Failures are captured into the outcome and logged, never raised, so one
/// record's failure cannot stop the remaining dispatches in a cycle.
pub struct ReminderDispatcher<M> {
    transport: Arc<M>,
    sender: String,
    send_timeout: Duration,
}

impl<M> ReminderDispatcher<M>
where
    M: MailTransport + 'static,
{
    pub fn new(transport: Arc<M>, sender: impl Into<String>, send_timeout: Duration) -> Self {
        Self {
            transport,
            sender: sender.into(),
            send_timeout,
        }
    }

    /// Attempt the reminder for one record. Exactly one outbound send per
    /// call; no retry happens here or anywhere before the next cycle.
    pub async fn notify(&self, record: &ExpirableRecord) -> NotificationOutcome {
        let mail = ReminderMail::for_record(&self.sender, record);
        match tokio::time::timeout(self.send_timeout, self.transport.send(&mail)).await {
            Ok(Ok(receipt)) => {
                info!(
                    record = %record.id.0,
                    kind = record.kind.label(),
                    to = %mail.to,
                    receipt = %receipt.token,
                    "reminder accepted by mail transport"
                );
                NotificationOutcome::accepted(record, receipt)
            }
            Ok(Err(err)) => {
                error!(
                    record = %record.id.0,
                    kind = record.kind.label(),
                    to = %mail.to,
                    error = %err,
                    "reminder dispatch failed"
                );
                NotificationOutcome::failed(record, DispatchError::Mail(err))
            }
            Err(_) => {
                let err = DispatchError::TimedOut(self.send_timeout);
                error!(
                    record = %record.id.0,
                    kind = record.kind.label(),
                    to = %mail.to,
                    error = %err,
                    "reminder dispatch failed"
                );
                NotificationOutcome::failed(record, err)
            }
        }
    }
}
