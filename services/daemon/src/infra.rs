use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use fleet_reminder::reminders::{
    ExpirableRecord, MailError, MailTransport, RecordId, RecordKind, RecordRepository,
    ReminderMail, RepositoryError, TransportReceipt,
};

/// Record source backed by seeded rows, for demo runs without roster files.
pub(crate) struct InMemoryRecordRepository {
    kind: RecordKind,
    records: Vec<ExpirableRecord>,
}

impl InMemoryRecordRepository {
    pub(crate) fn new(kind: RecordKind, records: Vec<ExpirableRecord>) -> Self {
        Self { kind, records }
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    async fn list_all(&self) -> Result<Vec<ExpirableRecord>, RepositoryError> {
        Ok(self.records.clone())
    }
}

/// Prints each reminder instead of delivering it. Blank recipients are
/// rejected the way a real relay would reject them, so the demo also shows
/// a failed dispatch.
#[derive(Default)]
pub(crate) struct ConsoleMailer;

#[async_trait]
impl MailTransport for ConsoleMailer {
    async fn send(&self, mail: &ReminderMail) -> Result<TransportReceipt, MailError> {
        if mail.to.trim().is_empty() {
            return Err(MailError::InvalidMailbox {
                address: mail.to.clone(),
                detail: "empty recipient".to_string(),
            });
        }

        println!("  [mail] to={} subject={:?}", mail.to, mail.subject);
        println!("         {}", mail.body);
        Ok(TransportReceipt {
            token: "console".to_string(),
        })
    }
}

/// Seeded fleet records spanning the interesting cases: inside the window,
/// on its boundary, already expired, far in the future, and missing a
/// contact address.
pub(crate) fn seed_records(today: NaiveDate) -> (Vec<ExpirableRecord>, Vec<ExpirableRecord>) {
    let licenses = vec![
        record(
            RecordKind::License,
            "IA-TRUCK-011",
            today + chrono::Duration::days(3),
            "dispatch@prairiehaul.com",
        ),
        record(
            RecordKind::License,
            "IA-TRUCK-014",
            today + chrono::Duration::days(7),
            "dispatch@prairiehaul.com",
        ),
        record(
            RecordKind::License,
            "IA-VAN-002",
            today - chrono::Duration::days(2),
            "ops@prairiehaul.com",
        ),
        record(
            RecordKind::License,
            "IA-TRUCK-020",
            today + chrono::Duration::days(45),
            "dispatch@prairiehaul.com",
        ),
    ];
    let insurances = vec![
        record(
            RecordKind::Insurance,
            "CPP-88231",
            today + chrono::Duration::days(5),
            "billing@prairiehaul.com",
        ),
        record(
            RecordKind::Insurance,
            "CPP-88234",
            today + chrono::Duration::days(8),
            "billing@prairiehaul.com",
        ),
        record(
            RecordKind::Insurance,
            "CPP-88240",
            today + chrono::Duration::days(1),
            "",
        ),
    ];
    (licenses, insurances)
}

fn record(kind: RecordKind, id: &str, end_date: NaiveDate, email: &str) -> ExpirableRecord {
    ExpirableRecord {
        id: RecordId(id.to_string()),
        kind,
        end_date,
        contact_email: email.to_string(),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_fire_at(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}
