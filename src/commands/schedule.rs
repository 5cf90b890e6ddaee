//! Periodic scheduler with a single-flight guard

use crate::commands::sync::{log_event, run_sync};
use crate::config::Config;
use crate::types::{EventCallback, SyncError, SyncReport};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// At most one run at a time
///
/// Cloning shares the flag. The flag clears when the acquired
/// [`FlightGuard`] is dropped, including on panic.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` if a run is already in flight
    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`SingleFlight`] slot on drop
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// What a single tick did
#[derive(Debug)]
pub enum TickOutcome {
    /// A run was started on a blocking worker
    Started(JoinHandle<SyncReport>),

    /// The previous run was still going
    Skipped,
}

/// Counters for a scheduler lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub runs_started: usize,
    pub ticks_skipped: usize,
    pub runs_panicked: usize,
}

/// Runs `run_sync` every `config.interval`
pub struct Scheduler {
    config: Config,
    flight: SingleFlight,
}

impl Scheduler {
    /// Fails if `config` does not pass [`Config::validate`]
    pub fn new(config: Config) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            config,
            flight: SingleFlight::new(),
        })
    }

    /// Guard shared with every run started by this scheduler
    pub fn flight(&self) -> &SingleFlight {
        &self.flight
    }

    /// Start a run unless one is already in flight
    ///
    /// Must be called from within a tokio runtime.
    pub fn tick(&self) -> TickOutcome {
        let Some(guard) = self.flight.try_acquire() else {
            warn!("Previous synchronization still running, skipping this one");
            return TickOutcome::Skipped;
        };

        let source = self.config.source.clone();
        let replica = self.config.replica.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let sink: &EventCallback = &log_event;
            run_sync(&source, &replica, Some(sink))
        });
        TickOutcome::Started(handle)
    }

    /// Tick on the configured interval until `shutdown` resolves
    ///
    /// The first tick fires immediately. Ticks missed while a run is in
    /// flight are dropped rather than replayed. A run still in flight at
    /// shutdown is awaited before returning.
    pub async fn run_until<F>(&self, shutdown: F) -> SchedulerStats
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting synchronization every {} minutes.",
            self.config.interval_minutes()
        );

        let mut stats = SchedulerStats::default();
        let mut in_flight: Option<JoinHandle<SyncReport>> = None;

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => match self.tick() {
                    TickOutcome::Started(handle) => {
                        stats.runs_started += 1;
                        // The guard was free, so any previous run is done or finishing
                        if let Some(previous) = in_flight.replace(handle) {
                            reap(previous, &mut stats).await;
                        }
                    }
                    TickOutcome::Skipped => stats.ticks_skipped += 1,
                },
            }
        }

        if let Some(handle) = in_flight {
            if !handle.is_finished() {
                info!("Waiting for the running synchronization to finish");
            }
            reap(handle, &mut stats).await;
        }

        stats
    }
}

async fn reap(handle: JoinHandle<SyncReport>, stats: &mut SchedulerStats) {
    if let Err(e) = handle.await {
        stats.runs_panicked += 1;
        error!("Synchronization task failed: {e}");
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C)"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
