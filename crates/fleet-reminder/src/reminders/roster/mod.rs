mod parser;

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::domain::{ExpirableRecord, RecordKind};
use super::repository::{RecordRepository, RepositoryError};

#[derive(Debug)]
pub enum RosterError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidEndDate { row: usize, value: String },
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterError::InvalidEndDate { row, value } => {
                write!(f, "invalid end date {:?} in roster row {}", value, row)
            }
        }
    }
}

impl std::error::Error for RosterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterError::Io(err) => Some(err),
            RosterError::Csv(err) => Some(err),
            RosterError::InvalidEndDate { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RosterError> for RepositoryError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Io(err) => RepositoryError::Unavailable(err.to_string()),
            other => RepositoryError::Malformed(other.to_string()),
        }
    }
}

/// Loads expirable records from a fleet roster export.
pub struct RosterLoader;

impl RosterLoader {
    pub fn from_path<P: AsRef<Path>>(
        kind: RecordKind,
        path: P,
    ) -> Result<Vec<ExpirableRecord>, RosterError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(kind, file)
    }

    pub fn from_reader<R: Read>(
        kind: RecordKind,
        reader: R,
    ) -> Result<Vec<ExpirableRecord>, RosterError> {
        parser::parse_records(kind, reader)
    }
}

/// Record source backed by a roster export file. The file is re-read on
/// every call, so each cycle sees whatever the platform last exported.
pub struct RosterRepository {
    kind: RecordKind,
    path: PathBuf,
}

impl RosterRepository {
    pub fn new(kind: RecordKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordRepository for RosterRepository {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    async fn list_all(&self) -> Result<Vec<ExpirableRecord>, RepositoryError> {
        RosterLoader::from_path(self.kind, &self.path).map_err(RepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn parse_end_date_supports_rfc3339_and_date_strings() {
        let rfc = parser::parse_end_date_for_tests("2024-01-08T00:00:00Z").expect("parse rfc");
        assert_eq!(rfc, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());

        let date = parser::parse_end_date_for_tests("2024-01-08").expect("parse date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());

        assert!(parser::parse_end_date_for_tests("  ").is_none());
        assert!(parser::parse_end_date_for_tests("not-a-date").is_none());
    }

    #[test]
    fn license_rows_use_the_vehicle_number_as_identifier() {
        let csv = "vehicleNo,startDate,endDate,email,notes\n\
ABZ-1234,2023-01-08,2024-01-08,fleet@example.com,renewed last year\n";
        let records =
            RosterLoader::from_reader(RecordKind::License, Cursor::new(csv)).expect("parse");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.0, "ABZ-1234");
        assert_eq!(records[0].kind, RecordKind::License);
        assert_eq!(
            records[0].end_date,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
        assert_eq!(records[0].contact_email, "fleet@example.com");
    }

    #[test]
    fn insurance_rows_prefer_the_policy_number() {
        let csv = "vehicleNo,insuranceProvider,policyNumber,endDate,email\n\
ABZ-1234,Acme Mutual,POL-9921,2024-02-01,ops@example.com\n\
KDQ-7781,Acme Mutual,,2024-02-03,ops@example.com\n";
        let records =
            RosterLoader::from_reader(RecordKind::Insurance, Cursor::new(csv)).expect("parse");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.0, "POL-9921");
        assert_eq!(records[1].id.0, "KDQ-7781");
        assert!(records.iter().all(|r| r.kind == RecordKind::Insurance));
    }

    #[test]
    fn missing_email_becomes_an_empty_recipient() {
        let csv = "vehicleNo,endDate,email\nABZ-1234,2024-01-08,\n";
        let records =
            RosterLoader::from_reader(RecordKind::License, Cursor::new(csv)).expect("parse");
        assert_eq!(records[0].contact_email, "");
    }

    #[test]
    fn unparseable_end_date_is_reported_with_its_row() {
        let csv = "vehicleNo,endDate,email\n\
ABZ-1234,2024-01-08,fleet@example.com\n\
KDQ-7781,whenever,fleet@example.com\n";
        let error = RosterLoader::from_reader(RecordKind::License, Cursor::new(csv))
            .expect_err("expected invalid date");

        match error {
            RosterError::InvalidEndDate { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "whenever");
            }
            other => panic!("expected invalid end date, got {other:?}"),
        }
    }

    #[test]
    fn loader_from_path_propagates_io_errors() {
        let error = RosterLoader::from_path(RecordKind::License, "./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            RosterError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn repository_maps_missing_files_to_unavailable() {
        let repository = RosterRepository::new(RecordKind::Insurance, "./does-not-exist.csv");
        let error = repository.list_all().await.expect_err("expected failure");

        match error {
            RepositoryError::Unavailable(_) => {}
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn repository_maps_bad_rows_to_malformed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("insurances.csv");
        std::fs::write(
            &path,
            "vehicleNo,policyNumber,endDate,email\nKDQ-7781,POL-1,whenever,ops@example.com\n",
        )
        .expect("write roster");

        let repository = RosterRepository::new(RecordKind::Insurance, &path);
        let error = repository.list_all().await.expect_err("expected failure");

        match error {
            RepositoryError::Malformed(detail) => {
                assert!(detail.contains("whenever"), "unexpected detail: {detail}")
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn repository_rereads_the_export_between_calls() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("licenses.csv");
        std::fs::write(
            &path,
            "vehicleNo,endDate,email\nABZ-1234,2024-01-08,fleet@example.com\n",
        )
        .expect("write roster");

        let repository = RosterRepository::new(RecordKind::License, &path);
        assert_eq!(repository.list_all().await.expect("first read").len(), 1);

        std::fs::write(
            &path,
            "vehicleNo,endDate,email\n\
ABZ-1234,2024-01-08,fleet@example.com\n\
KDQ-7781,2024-03-01,fleet@example.com\n",
        )
        .expect("rewrite roster");
        assert_eq!(repository.list_all().await.expect("second read").len(), 2);
    }
}
