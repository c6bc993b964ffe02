use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;
use tokio::sync::watch;
use tracing::info;

use fleet_reminder::config::{AppConfig, ConfigError};
use fleet_reminder::error::AppError;
use fleet_reminder::reminders::{
    cycle_date, Clock, DailyScheduler, RecordKind, RecordRepository, ReminderDispatcher,
    ReminderService, RosterRepository, SmtpMailer, SystemClock,
};
use fleet_reminder::telemetry;

use crate::cli::ServeArgs;
use crate::demo::render_cycle_report;

#[derive(Args, Debug, Default)]
pub(crate) struct RunOnceArgs {
    /// Cycle date (YYYY-MM-DD). Defaults to today in the configured offset.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Print the cycle report as JSON instead of the text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(fire_at) = args.fire_at.take() {
        config.reminders.fire_at = fire_at;
    }

    telemetry::init(&config.telemetry)?;

    let service = Arc::new(build_service(&config)?);
    let scheduler = DailyScheduler::new(
        SystemClock,
        config.reminders.fire_at,
        config.reminders.utc_offset,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    info!(?config.environment, "expiry reminder daemon ready");

    scheduler.run(service, shutdown_rx).await;
    Ok(())
}

/// One cycle right now against the real rosters and relay. This is the
/// operator's escape hatch after downtime, since missed triggers are never
/// replayed automatically.
pub(crate) async fn run_once(args: RunOnceArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = build_service(&config)?;
    let date = args
        .date
        .unwrap_or_else(|| cycle_date(SystemClock.now(), config.reminders.utc_offset));

    let report = service.run_cycle(date).await;
    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Cycle report unavailable as JSON: {err}"),
        }
    } else {
        render_cycle_report(&report);
    }
    Ok(())
}

fn build_service(config: &AppConfig) -> Result<ReminderService<SmtpMailer>, AppError> {
    let mut sources: Vec<Arc<dyn RecordRepository>> = Vec::new();
    if let Some(path) = config.rosters.licenses.as_ref() {
        check_roster(path)?;
        sources.push(Arc::new(RosterRepository::new(
            RecordKind::License,
            path.clone(),
        )));
    }
    if let Some(path) = config.rosters.insurances.as_ref() {
        check_roster(path)?;
        sources.push(Arc::new(RosterRepository::new(
            RecordKind::Insurance,
            path.clone(),
        )));
    }
    if sources.is_empty() {
        return Err(ConfigError::MissingVar {
            name: "LICENSE_ROSTER or INSURANCE_ROSTER",
        }
        .into());
    }

    let relay = config.mail.relay()?;
    let mailer = Arc::new(SmtpMailer::new(&relay)?);
    let dispatcher =
        ReminderDispatcher::new(mailer, relay.sender, config.reminders.dispatch_timeout);
    Ok(ReminderService::new(sources, dispatcher))
}

fn check_roster(path: &Path) -> Result<(), AppError> {
    std::fs::metadata(path).map_err(|err| {
        AppError::Io(std::io::Error::new(
            err.kind(),
            format!("roster {} unavailable: {err}", path.display()),
        ))
    })?;
    Ok(())
}
