use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for expirable records: the vehicle registration number
/// for licenses, the policy number for insurance records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// The two categories of expirable record tracked for the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    License,
    Insurance,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            RecordKind::License => "license",
            RecordKind::Insurance => "insurance",
        }
    }

    /// Fixed subject line for reminder mail of this kind.
    pub const fn subject(self) -> &'static str {
        match self {
            RecordKind::License => "License Expiry Reminder",
            RecordKind::Insurance => "Insurance Expiry Reminder",
        }
    }
}

/// One license or insurance record as read from the record store. This
/// subsystem never mutates records; it only reads end dates and contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirableRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    pub end_date: NaiveDate,
    pub contact_email: String,
}
