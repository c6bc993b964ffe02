use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::reminders::cycle::ReminderService;
use crate::reminders::dispatch::ReminderDispatcher;
use crate::reminders::domain::{ExpirableRecord, RecordId, RecordKind};
use crate::reminders::mailer::{MailError, MailTransport, ReminderMail, TransportReceipt};
use crate::reminders::repository::{RecordRepository, RepositoryError};

pub(super) const SENDER: &str = "fleet@example.com";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn record(
    kind: RecordKind,
    id: &str,
    end_date: NaiveDate,
    email: &str,
) -> ExpirableRecord {
    ExpirableRecord {
        id: RecordId(id.to_string()),
        kind,
        end_date,
        contact_email: email.to_string(),
    }
}

pub(super) fn dispatcher<M>(transport: Arc<M>) -> ReminderDispatcher<M>
where
    M: MailTransport + 'static,
{
    ReminderDispatcher::new(transport, SENDER, Duration::from_secs(5))
}

pub(super) fn build_service<M>(
    sources: Vec<Arc<dyn RecordRepository>>,
    transport: Arc<M>,
) -> ReminderService<M>
where
    M: MailTransport + 'static,
{
    ReminderService::new(sources, dispatcher(transport))
}

#[derive(Clone)]
pub(super) struct MemoryRepository {
    kind: RecordKind,
    records: Vec<ExpirableRecord>,
}

impl MemoryRepository {
    pub(super) fn new(kind: RecordKind, records: Vec<ExpirableRecord>) -> Self {
        Self { kind, records }
    }
}

#[async_trait]
impl RecordRepository for MemoryRepository {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    async fn list_all(&self) -> Result<Vec<ExpirableRecord>, RepositoryError> {
        Ok(self.records.clone())
    }
}

pub(super) struct UnavailableRepository {
    kind: RecordKind,
}

impl UnavailableRepository {
    pub(super) fn new(kind: RecordKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl RecordRepository for UnavailableRepository {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    async fn list_all(&self) -> Result<Vec<ExpirableRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMailer {
    sent: Arc<Mutex<Vec<ReminderMail>>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<ReminderMail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl MailTransport for MemoryMailer {
    async fn send(&self, mail: &ReminderMail) -> Result<TransportReceipt, MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(mail.clone());
        Ok(TransportReceipt {
            token: "250 Ok".to_string(),
        })
    }
}

/// Rejects mail addressed to one recipient, accepts everything else.
pub(super) struct SelectiveMailer {
    inner: MemoryMailer,
    reject_to: String,
}

impl SelectiveMailer {
    pub(super) fn new(reject_to: &str) -> Self {
        Self {
            inner: MemoryMailer::default(),
            reject_to: reject_to.to_string(),
        }
    }

    pub(super) fn sent(&self) -> Vec<ReminderMail> {
        self.inner.sent()
    }
}

#[async_trait]
impl MailTransport for SelectiveMailer {
    async fn send(&self, mail: &ReminderMail) -> Result<TransportReceipt, MailError> {
        if mail.to == self.reject_to {
            return Err(MailError::Transport("recipient refused".to_string()));
        }
        self.inner.send(mail).await
    }
}

/// Never answers within any reasonable dispatch timeout.
pub(super) struct StalledMailer;

#[async_trait]
impl MailTransport for StalledMailer {
    async fn send(&self, _mail: &ReminderMail) -> Result<TransportReceipt, MailError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(MailError::Transport("unreachable".to_string()))
    }
}

/// Hangs on mail addressed to one recipient, accepts everything else.
pub(super) struct SlowRecipientMailer {
    inner: MemoryMailer,
    stall_to: String,
}

impl SlowRecipientMailer {
    pub(super) fn new(stall_to: &str) -> Self {
        Self {
            inner: MemoryMailer::default(),
            stall_to: stall_to.to_string(),
        }
    }

    pub(super) fn sent(&self) -> Vec<ReminderMail> {
        self.inner.sent()
    }
}

#[async_trait]
impl MailTransport for SlowRecipientMailer {
    async fn send(&self, mail: &ReminderMail) -> Result<TransportReceipt, MailError> {
        if mail.to == self.stall_to {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.inner.send(mail).await
    }
}
