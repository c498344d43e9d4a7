use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::entities::Link;
use crate::fetcher::PageFetcher;
use crate::repositories::LinkRepositoryTrait;
use crate::revalidate::probe::ProbeOutcome;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            batch_size: 200,
            concurrency: 4,
        }
    }
}

/// Tally of one revalidation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub alive: usize,
    pub dead: usize,
    pub update_failures: usize,
}

impl RunSummary {
    fn record(&mut self, check: LinkCheck) {
        self.checked += 1;
        if check.alive {
            self.alive += 1;
        } else {
            self.dead += 1;
        }
        if !check.stored {
            self.update_failures += 1;
        }
    }
}

#[derive(Debug, Error)]
pub enum RevalidationError {
    #[error("a revalidation run is already in progress")]
    AlreadyRunning,
    #[error("failed to load active links: {0}")]
    LoadBatch(anyhow::Error),
}

struct LinkCheck {
    alive: bool,
    stored: bool,
}

/// Clears the run-in-progress flag when the run ends, however it ends.
struct RunGuard(Arc<AtomicBool>);

impl RunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Time from `now` until the next multiple of `period` since the unix epoch.
/// A `now` sitting exactly on a boundary yields zero.
pub fn delay_until_next_tick(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = period.as_millis() as i64;
    if period_ms <= 0 {
        return Duration::ZERO;
    }
    match now.timestamp_millis().rem_euclid(period_ms) {
        0 => Duration::ZERO,
        elapsed => Duration::from_millis((period_ms - elapsed) as u64),
    }
}

/// Periodically re-probes active links and moves the ones that stopped
/// answering to `dead`.
#[derive(Clone)]
pub struct RevalidationScheduler {
    link_repo: Arc<dyn LinkRepositoryTrait>,
    fetcher: Arc<dyn PageFetcher>,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    shutdown_token: CancellationToken,
}

impl RevalidationScheduler {
    pub fn new(
        link_repo: Arc<dyn LinkRepositoryTrait>,
        fetcher: Arc<dyn PageFetcher>,
        config: SchedulerConfig,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            link_repo,
            fetcher,
            config,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_token,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Tick loop. Returns once the shutdown token is cancelled and the
    /// in-flight run, if any, has finished.
    pub async fn run(self) {
        let period = self.config.interval;
        let first_tick = delay_until_next_tick(Utc::now(), period);
        info!(
            "Starting revalidation scheduler - interval: {}s, batch_size: {}, concurrency: {}, first run in {}s",
            period.as_secs(),
            self.config.batch_size,
            self.config.concurrency,
            first_tick.as_secs()
        );

        let mut ticker = interval_at(Instant::now() + first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if self.is_running() {
                        warn!("Previous revalidation run still in progress, skipping tick");
                        continue;
                    }

                    let scheduler = self.clone();
                    in_flight = Some(tokio::spawn(
                        async move {
                            match scheduler.run_once().await {
                                Ok(_) => {}
                                Err(RevalidationError::AlreadyRunning) => {
                                    warn!("Revalidation run already in progress, skipping");
                                }
                                Err(e) => error!("Revalidation run abandoned: {}", e),
                            }
                        }
                        .instrument(info_span!("revalidation_run")),
                    ));
                }
            }
        }

        if let Some(handle) = in_flight.take() {
            if !handle.is_finished() {
                info!("Waiting for in-flight revalidation run to complete...");
            }
            if let Err(e) = handle.await {
                error!("Revalidation run task failed: {}", e);
            }
        }
    }

    /// One pass over a batch of active links. Probes run with bounded
    /// parallelism; a failed probe or status write for one link does not
    /// affect the others. Cancellation stops new probes from starting.
    pub async fn run_once(&self) -> Result<RunSummary, RevalidationError> {
        let _guard = RunGuard::acquire(&self.running).ok_or(RevalidationError::AlreadyRunning)?;

        let batch = self
            .link_repo
            .active_batch(self.config.batch_size as i64)
            .await
            .map_err(RevalidationError::LoadBatch)?;
        debug!("Loaded {} active links", batch.len());

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for link in batch {
            if self.shutdown_token.is_cancelled() {
                info!("Shutdown requested, not starting further probes");
                break;
            }

            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let link_repo = self.link_repo.clone();
            let fetcher = self.fetcher.clone();
            let span = info_span!("probe", id = %link.id, url = %link.url);

            tasks.spawn(
                async move {
                    let _permit = permit; // held until the status write completes
                    check_link(link_repo.as_ref(), fetcher.as_ref(), link).await
                }
                .instrument(span),
            );
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(check) => summary.record(check),
                Err(e) => {
                    error!("Probe task failed: {}", e);
                    summary.checked += 1;
                    summary.update_failures += 1;
                }
            }
        }

        info!(
            checked = summary.checked,
            alive = summary.alive,
            dead = summary.dead,
            update_failures = summary.update_failures,
            "revalidation run complete"
        );
        Ok(summary)
    }
}

async fn check_link(
    link_repo: &dyn LinkRepositoryTrait,
    fetcher: &dyn PageFetcher,
    link: Link,
) -> LinkCheck {
    let outcome = ProbeOutcome::classify(fetcher.probe(&link.url).await);

    let write = match &outcome {
        ProbeOutcome::Alive(status) => {
            debug!("Link alive ({})", status);
            link_repo.mark_alive(link.id, Utc::now()).await
        }
        ProbeOutcome::Dead(reason) => {
            info!("Link dead: {}", reason);
            link_repo.mark_dead(link.id).await
        }
    };

    let stored = match write {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to update link status: {}", e);
            false
        }
    };

    LinkCheck {
        alive: outcome.is_alive(),
        stored,
    }
}
