use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::dispatch::{NotificationOutcome, ReminderDispatcher};
use super::domain::RecordKind;
use super::expiry::{is_expiring_soon, REMINDER_WINDOW_DAYS};
use super::mailer::MailTransport;
use super::repository::RecordRepository;

/// What happened to one record kind within a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub kind: RecordKind,
    pub scanned: usize,
    pub due: usize,
    pub outcomes: Vec<NotificationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

impl ScanSummary {
    fn skipped(kind: RecordKind, error: String) -> Self {
        Self {
            kind,
            scanned: 0,
            due: 0,
            outcomes: Vec::new(),
            source_error: Some(error),
        }
    }

    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.accepted).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.accepted()
    }
}

/// Summary of one full scan-and-notify cycle. Ephemeral like the outcomes it
/// carries; the operational log is the only durable trace of a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub date: NaiveDate,
    pub scans: Vec<ScanSummary>,
}

impl CycleReport {
    pub fn scan(&self, kind: RecordKind) -> Option<&ScanSummary> {
        self.scans.iter().find(|scan| scan.kind == kind)
    }

    /// Dispatch attempts issued across all record kinds.
    pub fn dispatched(&self) -> usize {
        self.scans.iter().map(|scan| scan.outcomes.len()).sum()
    }

    pub fn accepted(&self) -> usize {
        self.scans.iter().map(ScanSummary::accepted).sum()
    }

    pub fn failed(&self) -> usize {
        self.scans.iter().map(ScanSummary::failed).sum()
    }
}

/// Orchestrates one daily cycle: pull every record from each source, filter
/// with the expiry evaluator, dispatch one reminder per qualifying record.
pub struct ReminderService<M> {
    sources: Vec<Arc<dyn RecordRepository>>,
    dispatcher: Arc<ReminderDispatcher<M>>,
}

impl<M> ReminderService<M>
where
    M: MailTransport + 'static,
{
    pub fn new(sources: Vec<Arc<dyn RecordRepository>>, dispatcher: ReminderDispatcher<M>) -> Self {
        Self {
            sources,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Run one cycle dated `today`. Each record kind scans in its own task;
    /// a source failure skips that kind only, and dispatch failures are
    /// captured per record. This never returns an error: no outcome of a
    /// cycle is allowed to take the schedule down.
    pub async fn run_cycle(&self, today: NaiveDate) -> CycleReport {
        info!(
            date = %today,
            window_days = REMINDER_WINDOW_DAYS,
            sources = self.sources.len(),
            "reminder cycle started"
        );

        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let source = Arc::clone(source);
            let dispatcher = Arc::clone(&self.dispatcher);
            handles.push(tokio::spawn(scan_source(source, dispatcher, today)));
        }

        let mut scans = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(summary) => scans.push(summary),
                Err(err) => error!(error = %err, "record scan task aborted"),
            }
        }

        let report = CycleReport { date: today, scans };
        info!(
            date = %report.date,
            dispatched = report.dispatched(),
            accepted = report.accepted(),
            failed = report.failed(),
            "reminder cycle complete"
        );
        report
    }
}

/// Scan one record kind: list, filter, then issue every dispatch as its own
/// task before joining them for the summary. The issuance log line marks the
/// point where the cycle stops depending on the mail transport; joining is
/// bounded by the per-dispatch timeout.
async fn scan_source<M>(
    source: Arc<dyn RecordRepository>,
    dispatcher: Arc<ReminderDispatcher<M>>,
    today: NaiveDate,
) -> ScanSummary
where
    M: MailTransport + 'static,
{
    let kind = source.kind();
    let records = match source.list_all().await {
        Ok(records) => records,
        Err(err) => {
            error!(
                kind = kind.label(),
                error = %err,
                "record scan failed; skipping this kind for the cycle"
            );
            return ScanSummary::skipped(kind, err.to_string());
        }
    };

    let scanned = records.len();
    let due: Vec<_> = records
        .into_iter()
        .filter(|record| is_expiring_soon(record.end_date, today, REMINDER_WINDOW_DAYS))
        .collect();
    let due_count = due.len();
    debug!(kind = kind.label(), scanned, due = due_count, "expiry scan complete");

    let mut dispatches = Vec::with_capacity(due_count);
    for record in due {
        let dispatcher = Arc::clone(&dispatcher);
        dispatches.push(tokio::spawn(async move { dispatcher.notify(&record).await }));
    }
    info!(kind = kind.label(), issued = dispatches.len(), "reminder dispatches issued");

    let mut outcomes = Vec::with_capacity(dispatches.len());
    for dispatch in dispatches {
        match dispatch.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => warn!(kind = kind.label(), error = %err, "dispatch task aborted"),
        }
    }

    ScanSummary {
        kind,
        scanned,
        due: due_count,
        outcomes,
        source_error: None,
    }
}
