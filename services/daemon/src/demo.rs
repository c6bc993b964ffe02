use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Args;

use fleet_reminder::error::AppError;
use fleet_reminder::reminders::{
    CycleReport, RecordKind, RecordRepository, ReminderDispatcher, ReminderService,
    REMINDER_WINDOW_DAYS,
};

use crate::infra::{seed_records, ConsoleMailer, InMemoryRecordRepository};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Cycle date for the demo (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the cycle report as JSON after the text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, json } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Expiry reminder demo");
    println!(
        "Cycle date {today}, reminder window {REMINDER_WINDOW_DAYS} days (expired records included)"
    );

    let (licenses, insurances) = seed_records(today);
    println!(
        "Seeded {} license records and {} insurance records",
        licenses.len(),
        insurances.len()
    );

    let sources: Vec<Arc<dyn RecordRepository>> = vec![
        Arc::new(InMemoryRecordRepository::new(RecordKind::License, licenses)),
        Arc::new(InMemoryRecordRepository::new(
            RecordKind::Insurance,
            insurances,
        )),
    ];
    let mailer = Arc::new(ConsoleMailer::default());
    let dispatcher = ReminderDispatcher::new(mailer, "fleet@example.com", Duration::from_secs(5));
    let service = ReminderService::new(sources, dispatcher);

    let report = service.run_cycle(today).await;
    render_cycle_report(&report);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("\nCycle report payload:\n{payload}"),
            Err(err) => println!("\nCycle report payload unavailable: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn render_cycle_report(report: &CycleReport) {
    println!("\nCycle {}", report.date);
    for scan in &report.scans {
        match scan.source_error.as_deref() {
            Some(error) => {
                println!("- {}: source unavailable ({error})", scan.kind.label());
            }
            None => {
                println!(
                    "- {}: {} scanned, {} due, {} accepted, {} failed",
                    scan.kind.label(),
                    scan.scanned,
                    scan.due,
                    scan.accepted(),
                    scan.failed()
                );
            }
        }
        for outcome in &scan.outcomes {
            if outcome.accepted {
                println!("    sent {} -> {}", outcome.record_id.0, outcome.recipient);
            } else {
                let detail = outcome.error.as_deref().unwrap_or("unknown failure");
                println!(
                    "    failed {} -> {} ({detail})",
                    outcome.record_id.0, outcome.recipient
                );
            }
        }
    }
    println!(
        "Totals: {} dispatched, {} accepted, {} failed",
        report.dispatched(),
        report.accepted(),
        report.failed()
    );
}
