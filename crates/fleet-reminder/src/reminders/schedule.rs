use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

use super::cycle::ReminderService;
use super::mailer::MailTransport;

/// Time source for the scheduler so tests can pin the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Calendar date a cycle firing at `now` is evaluated against, taken in the
/// configured offset. This is the one place an instant becomes a date, which
/// keeps the expiry evaluator independent of the time of day the trigger
/// actually fired.
pub fn cycle_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Next instant the daily trigger fires: today at `fire_at` in `offset` when
/// that is still ahead of `now`, otherwise tomorrow. Always computed from
/// `now`, so triggers that passed while the process was down or a cycle was
/// running are skipped rather than queued.
pub fn next_fire_instant(
    now: DateTime<Utc>,
    fire_at: NaiveTime,
    offset: FixedOffset,
) -> DateTime<Utc> {
    let local_now = now.with_timezone(&offset);
    let mut fire_date = local_now.date_naive();
    if fire_at <= local_now.time() {
        fire_date = fire_date + chrono::Duration::days(1);
    }

    let local_fire = fire_date.and_time(fire_at);
    Utc.from_utc_datetime(&(local_fire - offset))
}

/// Fires one scan-and-notify cycle per day at a fixed wall-clock time.
/// Idle between triggers, Running while a cycle executes; cycles run
/// strictly in sequence, so two cycles can never overlap.
pub struct DailyScheduler<C> {
    clock: C,
    fire_at: NaiveTime,
    offset: FixedOffset,
}

impl<C> DailyScheduler<C>
where
    C: Clock,
{
    pub fn new(clock: C, fire_at: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            clock,
            fire_at,
            offset,
        }
    }

    /// Drive the daily schedule until `shutdown` flips to true. Each trigger
    /// runs one full cycle before the next fire instant is computed.
    pub async fn run<M>(
        &self,
        service: Arc<ReminderService<M>>,
        mut shutdown: watch::Receiver<bool>,
    ) where
        M: MailTransport + 'static,
    {
        info!(fire_at = %self.fire_at, offset = %self.offset, "daily reminder schedule armed");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = self.clock.now();
            let next = next_fire_instant(now, self.fire_at, self.offset);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(next = %next, "schedule idle until next trigger");

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = sleep(wait) => {
                    let today = cycle_date(self.clock.now(), self.offset);
                    service.run_cycle(today).await;
                }
            }
        }

        info!("daily reminder schedule stopped");
    }
}
