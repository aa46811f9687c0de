//! Scheduled job runner.
//!
//! Jobs are registered by name with either a daily wall-clock time or a
//! fixed interval, and run on tokio timers until shutdown. Every handler
//! can also be fired on demand through `trigger` (exposed on the
//! `jobs.trigger` subject and the `trigger-job` CLI subcommand), so job
//! logic is testable without waiting for the clock.
//!
//! A failing run is logged and swallowed; the next tick fires regardless.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A unit of scheduled work. The returned string is a short human-readable
/// outcome for logs and manual triggers.
#[async_trait]
pub trait JobHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self) -> Result<String>;
}

/// When a job fires.
#[derive(Debug, Clone, Copy)]
pub enum Schedule {
    /// Every day at the given local wall-clock time
    DailyAt(NaiveTime),
    /// On a fixed interval, first fire one interval after startup
    Every(Duration),
}

struct RegisteredJob {
    schedule: Schedule,
    handler: Arc<dyn JobHandler>,
}

/// Next daily fire: today at `at` if still ahead, otherwise tomorrow.
pub fn next_daily_fire(now: DateTime<Local>, at: NaiveTime) -> DateTime<Local> {
    let today = now.date_naive().and_time(at);
    let candidate = today
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| now + chrono::Duration::days(1));
    if candidate > now {
        candidate
    } else {
        candidate + chrono::Duration::days(1)
    }
}

pub struct Scheduler {
    jobs: Vec<RegisteredJob>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            jobs: Vec::new(),
            shutdown,
        }
    }

    pub fn register(&mut self, schedule: Schedule, handler: Arc<dyn JobHandler>) {
        info!(job = handler.name(), "Registered scheduled job");
        self.jobs.push(RegisteredJob { schedule, handler });
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|j| j.handler.name()).collect()
    }

    /// Run a job immediately by name, bypassing its schedule.
    pub async fn trigger(&self, name: &str) -> Result<String> {
        let job = self
            .jobs
            .iter()
            .find(|j| j.handler.name() == name)
            .ok_or_else(|| anyhow!("unknown job '{name}'"))?;

        info!(job = name, "Manually triggered job");
        job.handler.run().await
    }

    /// Spawn one timer task per registered job. Returns immediately; the
    /// tasks run until the shutdown token fires.
    pub fn start(&self) {
        for job in &self.jobs {
            let handler = Arc::clone(&job.handler);
            let schedule = job.schedule;
            let token = self.shutdown.clone();

            tokio::spawn(async move {
                loop {
                    let wait = match schedule {
                        Schedule::DailyAt(at) => {
                            let next = next_daily_fire(Local::now(), at);
                            (next - Local::now())
                                .to_std()
                                .unwrap_or(Duration::from_secs(0))
                        }
                        Schedule::Every(interval) => interval,
                    };

                    tokio::select! {
                        _ = token.cancelled() => {
                            info!(job = handler.name(), "Scheduler shutting down");
                            break;
                        }
                        _ = tokio::time::sleep(wait) => {}
                    }

                    match handler.run().await {
                        Ok(outcome) => {
                            info!(job = handler.name(), outcome = %outcome, "Job run complete");
                        }
                        Err(e) => {
                            // Swallow: a failed run is skipped until the
                            // next scheduled fire.
                            error!(job = handler.name(), "Job run failed: {e:#}");
                        }
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingJob {
        runs: AtomicU32,
    }

    #[async_trait]
    impl JobHandler for CountingJob {
        fn name(&self) -> &'static str {
            "counting-job"
        }

        async fn run(&self) -> Result<String> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("run {n}"))
        }
    }

    struct FailingJob;

    #[async_trait]
    impl JobHandler for FailingJob {
        fn name(&self) -> &'static str {
            "failing-job"
        }

        async fn run(&self) -> Result<String> {
            Err(anyhow!("boom"))
        }
    }

    #[tokio::test]
    async fn test_trigger_runs_handler_directly() {
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.register(
            Schedule::Every(Duration::from_secs(3600)),
            Arc::new(CountingJob {
                runs: AtomicU32::new(0),
            }),
        );

        let outcome = scheduler.trigger("counting-job").await.unwrap();
        assert_eq!(outcome, "run 1");
        let outcome = scheduler.trigger("counting-job").await.unwrap();
        assert_eq!(outcome, "run 2");
    }

    #[tokio::test]
    async fn test_trigger_unknown_job_errors() {
        let scheduler = Scheduler::new(CancellationToken::new());
        let result = scheduler.trigger("nope").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_trigger_propagates_handler_error() {
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.register(Schedule::Every(Duration::from_secs(60)), Arc::new(FailingJob));
        assert!(scheduler.trigger("failing-job").await.is_err());
    }

    #[test]
    fn test_next_daily_fire_later_today() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let at = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let next = next_daily_fire(now, at);
        assert_eq!(next.date_naive(), now.date_naive());
        assert_eq!(next.time(), at);
    }

    #[test]
    fn test_next_daily_fire_rolls_to_tomorrow() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 19, 30, 0).unwrap();
        let at = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let next = next_daily_fire(now, at);
        assert_eq!(next.date_naive(), now.date_naive() + chrono::Duration::days(1));
    }

    #[test]
    fn test_job_names_lists_registrations() {
        let mut scheduler = Scheduler::new(CancellationToken::new());
        scheduler.register(
            Schedule::DailyAt(NaiveTime::from_hms_opt(7, 0, 0).unwrap()),
            Arc::new(FailingJob),
        );
        assert_eq!(scheduler.job_names(), vec!["failing-job"]);
    }
}
