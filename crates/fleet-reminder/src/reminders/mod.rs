//! Daily expiry reminders for the rental fleet: scan the license and
//! insurance record sources, filter with the expiry evaluator, and dispatch
//! one reminder email per qualifying record.

pub mod cycle;
pub mod dispatch;
pub mod domain;
pub mod expiry;
pub mod mailer;
pub mod repository;
pub mod roster;
pub mod schedule;

#[cfg(test)]
mod tests;

pub use cycle::{CycleReport, ReminderService, ScanSummary};
pub use dispatch::{DispatchError, NotificationOutcome, ReminderDispatcher};
pub use domain::{ExpirableRecord, RecordId, RecordKind};
pub use expiry::{days_remaining, is_expiring_soon, REMINDER_WINDOW_DAYS};
pub use mailer::{MailError, MailTransport, ReminderMail, SmtpMailer, TransportReceipt};
pub use repository::{RecordRepository, RepositoryError};
pub use roster::{RosterError, RosterLoader, RosterRepository};
pub use schedule::{cycle_date, next_fire_instant, Clock, DailyScheduler, SystemClock};
