use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::reminders::domain::{ExpirableRecord, RecordId, RecordKind};

use super::RosterError;

pub(crate) fn parse_records<R: Read>(
    kind: RecordKind,
    reader: R,
) -> Result<Vec<ExpirableRecord>, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = row?;
        records.push(row.into_record(kind, index + 1)?);
    }

    Ok(records)
}

/// One row of a roster export. Headers follow the rental platform's column
/// names; columns this subsystem does not need (provider, premium, upload
/// references) are ignored by the reader.
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "vehicleNo")]
    vehicle_no: String,
    #[serde(
        rename = "policyNumber",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    policy_number: Option<String>,
    #[serde(rename = "endDate")]
    end_date: String,
    #[serde(rename = "email", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
}

impl RosterRow {
    fn into_record(self, kind: RecordKind, row: usize) -> Result<ExpirableRecord, RosterError> {
        let end_date =
            parse_end_date(&self.end_date).ok_or_else(|| RosterError::InvalidEndDate {
                row,
                value: self.end_date.clone(),
            })?;

        let id = match kind {
            RecordKind::License => self.vehicle_no,
            RecordKind::Insurance => {
                // Policy number identifies an insurance record; old exports
                // without one fall back to the vehicle number.
                self.policy_number.unwrap_or(self.vehicle_no)
            }
        };

        // A missing contact passes through as an empty recipient; the mail
        // transport rejects it per record rather than failing the whole scan.
        Ok(ExpirableRecord {
            id: RecordId(id),
            kind,
            end_date,
            contact_email: self.email.unwrap_or_default(),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_end_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

#[cfg(test)]
pub(crate) fn parse_end_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_end_date(value)
}
