//! Daily job scheduling.
//!
//! The daily job ([`Journal::run_daily`]) fires once per day at a fixed local
//! time. [`Scheduler`] keeps the next due instant and checks it against a
//! [`Clock`] on every poll; [`Scheduler::tick`] performs one such check
//! synchronously, and [`Scheduler::spawn`] drives it from a tokio interval
//! until the returned [`SchedulerHandle`] is shut down.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{NaiveDate, NaiveTime};
//! use daynote_journal::clock::FixedClock;
//! use daynote_journal::journal::Journal;
//! use daynote_journal::note::NoteLayout;
//! use daynote_journal::scheduler::{DailySchedule, Scheduler};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let journal = Journal::new(NoteLayout::new(dir.path(), "md"));
//! let evening = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(23, 0, 0).unwrap();
//! let clock = Arc::new(FixedClock::new(evening));
//! let schedule = DailySchedule::new(NaiveTime::from_hms_opt(0, 10, 0).unwrap());
//!
//! let mut scheduler = Scheduler::new(journal, schedule, clock.clone());
//! assert!(scheduler.tick().is_none());
//!
//! clock.set(evening + chrono::Duration::hours(2));
//! let report = scheduler.tick().unwrap().unwrap();
//! assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::journal::{run_blocking, DailyReport, Journal};

/// A once-a-day wall-clock trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// First trigger instant strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            today
        } else {
            now.date()
                .checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX)
                .and_time(self.at)
        }
    }
}

/// Fires the daily job when its trigger time has passed.
pub struct Scheduler {
    journal: Journal,
    schedule: DailySchedule,
    clock: Arc<dyn Clock>,
    next_run: NaiveDateTime,
}

impl Scheduler {
    /// Creates a scheduler whose first run is the next trigger after the
    /// clock's current time.
    pub fn new(journal: Journal, schedule: DailySchedule, clock: Arc<dyn Clock>) -> Self {
        let next_run = schedule.next_after(clock.now());
        Self {
            journal,
            schedule,
            clock,
            next_run,
        }
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    /// If the job is due, advances the next run and returns the date to run it for.
    fn take_due(&mut self) -> Option<NaiveDate> {
        let now = self.clock.now();
        if now < self.next_run {
            return None;
        }
        self.next_run = self.schedule.next_after(now);
        debug!(next_run = %self.next_run, "Daily job due");
        Some(now.date())
    }

    /// Runs the daily job once if it is due, blocking until it completes.
    ///
    /// Returns `None` when nothing was due.
    pub fn tick(&mut self) -> Option<Result<DailyReport>> {
        let date = self.take_due()?;
        Some(self.journal.run_daily(date))
    }

    /// Polls every `poll_interval` on a tokio task until shut down.
    ///
    /// The job itself runs on the blocking pool and is never interrupted;
    /// shutting down only prevents future runs.
    pub fn spawn(mut self, poll_interval: Duration) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                at = %self.schedule.at(),
                next_run = %self.next_run,
                poll_secs = poll_interval.as_secs_f64(),
                "Scheduler started"
            );

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        let Some(date) = self.take_due() else {
                            continue;
                        };
                        let journal = self.journal.clone();
                        match run_blocking(move || journal.run_daily(date)).await {
                            Ok(report) => info!(
                                date = %report.date,
                                created = %report.created,
                                cleanup = %report.cleanup,
                                next_run = %self.next_run,
                                "Daily job finished"
                            ),
                            Err(e) => error!(date = %date, error = %e, "Daily job failed"),
                        }
                    }
                }
            }

            info!("Scheduler stopped");
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

/// Handle to a running scheduler task.
///
/// Dropping the handle also stops the scheduler at its next poll.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops future runs and waits for an in-flight job to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}
