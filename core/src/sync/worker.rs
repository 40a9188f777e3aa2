//! Post-commit sync worker.
//!
//! Movie writers publish [`IndexEvent`]s through a [`SyncHandle`] after their
//! write commits. A single tokio task applies the events in arrival order and
//! sweeps orphans periodically, so the write path never waits on the index.

use crate::store::IndexStore;
use crate::sync::IndexSynchronizer;
use crate::types::{Movie, SyncConfig};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// A committed change to a movie.
#[derive(Debug, Clone)]
pub enum IndexEvent {
    Created(Movie),
    Updated { previous: Movie, current: Movie },
    Deleted(Movie),
}

impl IndexEvent {
    fn kind(&self) -> &'static str {
        match self {
            IndexEvent::Created(_) => "create",
            IndexEvent::Updated { .. } => "update",
            IndexEvent::Deleted(_) => "delete",
        }
    }

    fn movie(&self) -> &Movie {
        match self {
            IndexEvent::Created(movie) | IndexEvent::Deleted(movie) => movie,
            IndexEvent::Updated { current, .. } => current,
        }
    }
}

/// Sending side of the worker queue. Clone freely; the worker stops after the
/// last handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<IndexEvent>,
}

impl SyncHandle {
    /// Queues `event`, waiting for capacity. Returns `false` if the worker is
    /// gone.
    pub async fn notify(&self, event: IndexEvent) -> bool {
        match self.tx.send(event).await {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                warn!(entity_id = %event.movie().id, op = event.kind(), "sync worker stopped, event dropped");
                false
            }
        }
    }

    /// Queues `event` without waiting. Returns `false` if the queue is full or
    /// the worker is gone.
    pub fn try_notify(&self, event: IndexEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(entity_id = %event.movie().id, op = event.kind(), "sync queue full, event dropped");
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(entity_id = %event.movie().id, op = event.kind(), "sync worker stopped, event dropped");
                false
            }
        }
    }
}

/// Starts the sync worker on the current tokio runtime.
pub fn spawn_sync_worker<S: IndexStore>(
    sync: IndexSynchronizer<S>,
    config: &SyncConfig,
) -> (SyncHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let sweep_interval = config.orphan_sweep_interval();

    let worker = tokio::spawn(worker_loop(sync, rx, sweep_interval));

    (SyncHandle { tx }, worker)
}

async fn worker_loop<S: IndexStore>(
    sync: IndexSynchronizer<S>,
    mut events: mpsc::Receiver<IndexEvent>,
    sweep_interval: Option<Duration>,
) {
    info!(?sweep_interval, "search index sync worker started");

    let mut sweep = sweep_interval.map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                apply(&sync, event).await;
            }
            _ = next_sweep(&mut sweep) => {
                sync.sweep_orphans().await;
            }
        }
    }

    info!("search index sync worker stopped");
}

async fn apply<S: IndexStore>(sync: &IndexSynchronizer<S>, event: IndexEvent) {
    debug!(entity_id = %event.movie().id, op = event.kind(), "applying index event");

    let report = match &event {
        IndexEvent::Created(movie) => sync.sync_on_create(movie).await,
        IndexEvent::Updated { previous, current } => sync.sync_on_update(previous, current).await,
        IndexEvent::Deleted(movie) => sync.sync_on_delete(movie).await,
    };

    if !report.is_clean() {
        warn!(
            entity_id = %event.movie().id,
            op = event.kind(),
            failures = report.failures,
            "index event applied with failures"
        );
    }
}

async fn next_sweep(sweep: &mut Option<Interval>) {
    match sweep {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
