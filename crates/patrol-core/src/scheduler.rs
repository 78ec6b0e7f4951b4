//! Background sweep loop.
//!
//! [`Scheduler::start`] spawns a tokio task that sleeps until the next
//! deadline, runs [`Engine::sweep`] and repeats. The task waits on three
//! things at once: the deadline, an explicit [`SchedulerHandle::run_now`]
//! request and the shutdown signal. A sweep in progress is never part of
//! that wait, so [`SchedulerHandle::stop`] lets it finish before the task
//! exits. Daily deadlines are recomputed from the wall clock at least once
//! a minute.

use std::{sync::Arc, time::Duration};

use jiff::{civil::Time, Zoned};
use log::{debug, error, info};
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

use crate::{
    engine::{Engine, SweepReport},
    error::{InspectionError, Result},
    store::Repository,
};

/// Used when the next daily deadline cannot be computed.
const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Longest single wait before a daily deadline is recomputed from the wall
/// clock. Tokio timers follow the monotonic clock, which does not see host
/// suspend or wall-clock jumps.
const CLOCK_RECHECK: Duration = Duration::from_secs(60);

/// When sweeps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSchedule {
    /// Once a day at this local wall-clock time
    DailyAt(Time),
    /// Repeatedly with a fixed pause between sweeps
    Every(Duration),
}

impl Default for SweepSchedule {
    fn default() -> Self {
        SweepSchedule::DailyAt(Time::midnight())
    }
}

impl SweepSchedule {
    /// How long to wait from `now` until the next sweep.
    ///
    /// A daily time that falls into a DST gap resolves to the instant after
    /// the gap.
    pub fn delay_from(&self, now: &Zoned) -> Result<Duration> {
        let time = match self {
            SweepSchedule::Every(interval) => return Ok(*interval),
            SweepSchedule::DailyAt(time) => *time,
        };

        let invalid = |e: jiff::Error| InspectionError::Configuration {
            message: format!("Cannot compute next sweep time: {e}"),
        };
        let mut next = now
            .date()
            .to_datetime(time)
            .to_zoned(now.time_zone().clone())
            .map_err(invalid)?;
        if next.timestamp() <= now.timestamp() {
            next = now
                .date()
                .tomorrow()
                .map_err(invalid)?
                .to_datetime(time)
                .to_zoned(now.time_zone().clone())
                .map_err(invalid)?;
        }

        let delay = next.timestamp().duration_since(now.timestamp());
        Duration::try_from(delay).map_err(|e| InspectionError::Configuration {
            message: format!("Cannot compute next sweep time: {e}"),
        })
    }

    /// How much of `delay` to sleep before looking at the clock again.
    pub fn wait_step(&self, delay: Duration) -> Duration {
        match self {
            SweepSchedule::DailyAt(_) => delay.min(CLOCK_RECHECK),
            SweepSchedule::Every(_) => delay,
        }
    }
}

/// Starts sweep loops.
pub struct Scheduler;

impl Scheduler {
    /// Spawns the loop on the current tokio runtime.
    pub fn start<R: Repository>(engine: Engine<R>, schedule: SweepSchedule) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (report_tx, report_rx) = watch::channel(None);
        let wake = Arc::new(Notify::new());

        let task = tokio::spawn(run_loop(
            engine,
            schedule,
            stop_rx,
            Arc::clone(&wake),
            report_tx,
        ));
        info!("Scheduler started ({schedule:?})");

        SchedulerHandle {
            stop_tx,
            wake,
            reports: report_rx,
            task,
        }
    }
}

async fn run_loop<R: Repository>(
    engine: Engine<R>,
    schedule: SweepSchedule,
    mut stop_rx: watch::Receiver<bool>,
    wake: Arc<Notify>,
    report_tx: watch::Sender<Option<SweepReport>>,
) {
    loop {
        let delay = match schedule.delay_from(&engine.now()) {
            Ok(delay) => delay,
            Err(e) => {
                error!("{e}; retrying in {}s", RETRY_DELAY.as_secs());
                RETRY_DELAY
            }
        };
        let wait = schedule.wait_step(delay);
        debug!("Next sweep in {}s", delay.as_secs());

        tokio::select! {
            // A sweep requested before stop still runs
            biased;
            () = wake.notified() => debug!("Sweep requested"),
            changed = stop_rx.changed() => {
                // Either a stop request or the handle was dropped
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            () = tokio::time::sleep(wait) => {
                if wait < delay {
                    continue;
                }
            }
        }

        match engine.sweep().await {
            Ok(report) => {
                report_tx.send_replace(Some(report));
            }
            Err(e) => error!("Sweep failed: {e}"),
        }

        if *stop_rx.borrow() {
            break;
        }
    }
    info!("Scheduler stopped");
}

/// Control handle for a running sweep loop. Dropping it also stops the
/// loop, without waiting.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    wake: Arc<Notify>,
    reports: watch::Receiver<Option<SweepReport>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Asks for a sweep now instead of at the next deadline.
    pub fn run_now(&self) {
        self.wake.notify_one();
    }

    /// Receiver that observes the report of every completed sweep.
    pub fn reports(&self) -> watch::Receiver<Option<SweepReport>> {
        self.reports.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the loop to stop and waits for it, including any sweep that
    /// was already running.
    pub async fn stop(self) -> Result<()> {
        self.stop_tx.send_replace(true);
        self.task.await.map_err(|e| InspectionError::Configuration {
            message: format!("Task join error: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::{
        civil::{date, time},
        tz::TimeZone,
    };

    use super::*;

    fn at(h: i8, m: i8) -> Zoned {
        date(2024, 3, 15).at(h, m, 0, 0).to_zoned(TimeZone::UTC).unwrap()
    }

    #[test]
    fn test_daily_later_today() {
        let schedule = SweepSchedule::DailyAt(time(6, 30, 0, 0));
        assert_eq!(
            schedule.delay_from(&at(6, 0)).unwrap(),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn test_daily_rolls_to_tomorrow() {
        let schedule = SweepSchedule::default();
        assert_eq!(
            schedule.delay_from(&at(0, 0)).unwrap(),
            Duration::from_secs(24 * 3600)
        );
        assert_eq!(
            schedule.delay_from(&at(23, 0)).unwrap(),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_daily_wait_is_bounded() {
        let schedule = SweepSchedule::default();
        assert_eq!(schedule.wait_step(Duration::from_secs(5 * 3600)), CLOCK_RECHECK);
        assert_eq!(
            schedule.wait_step(Duration::from_secs(10)),
            Duration::from_secs(10)
        );

        let interval = SweepSchedule::Every(Duration::from_secs(3600));
        assert_eq!(
            interval.wait_step(Duration::from_secs(3600)),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_every_is_fixed() {
        let schedule = SweepSchedule::Every(Duration::from_secs(90));
        assert_eq!(schedule.delay_from(&at(12, 0)).unwrap(), Duration::from_secs(90));
    }
}
