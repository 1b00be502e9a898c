//! Periodic purge of accounts that never verified their email.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::service::cleanup_expired_users;
use crate::errors::AppError;

/// One unit of periodic work. Returns the number of rows it removed.
#[async_trait]
pub trait Sweep: Send + Sync + 'static {
    async fn sweep(&self) -> Result<u64, AppError>;
}

/// Deletes unverified users whose verification token has expired.
pub struct ExpiredUserSweep {
    pool: PgPool,
}

impl ExpiredUserSweep {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Sweep for ExpiredUserSweep {
    async fn sweep(&self) -> Result<u64, AppError> {
        cleanup_expired_users(&self.pool).await
    }
}

/// Allows at most one holder at a time; a second caller is turned away
/// instead of waiting.
#[derive(Clone, Default)]
pub struct SingleFlight {
    lock: Arc<Mutex<()>>,
}

impl SingleFlight {
    pub fn try_enter(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.lock).try_lock_owned().ok()
    }
}

pub struct CleanupScheduler {
    sweep: Arc<dyn Sweep>,
    every: Duration,
    guard: SingleFlight,
}

impl CleanupScheduler {
    pub fn new(sweep: Arc<dyn Sweep>, every: Duration) -> Self {
        Self {
            sweep,
            every,
            guard: SingleFlight::default(),
        }
    }

    /// Starts a sweep on its own task. Returns `None` when the previous sweep
    /// is still running, in which case this trigger does nothing.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        let Some(permit) = self.guard.try_enter() else {
            warn!("Previous cleanup sweep still running; skipping this run");
            return None;
        };
        let sweep = Arc::clone(&self.sweep);
        Some(tokio::spawn(async move {
            let _permit = permit;
            match sweep.sweep().await {
                Ok(0) => debug!("Cleanup sweep found no expired unverified users"),
                Ok(removed) => info!("Cleanup sweep removed {removed} expired unverified user(s)"),
                Err(e) => error!("Cleanup sweep failed: {e}"),
            }
        }))
    }

    /// Ticks until `shutdown` is cancelled. The first sweep happens one full
    /// interval after start.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.every, self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Cleanup scheduler started (every {:?})", self.every);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Cleanup scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.trigger();
                }
            }
        }
    }
}
