//! Persistence: debounced background writer for model snapshots.
//!
//! DESIGN
//! ======
//! Callers hand the writer a full model snapshot after every change. Only
//! the newest snapshot matters, so snapshots travel on a `watch` channel
//! that keeps the latest value and drops the rest. The worker task writes
//! when either
//!
//! - no new snapshot has arrived for `debounce_ms` (each arrival restarts the
//!   timer), or
//! - the `interval_ms` backstop ticks while a snapshot is still unsaved.
//!
//! Writes are sequential; a snapshot that arrives during a write is picked
//! up afterwards. `flush` and `shutdown` travel on a separate bounded queue
//! and write whatever is pending immediately.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is logged and the snapshot stays pending, so the next
//! debounce or backstop tick retries it. Repeated writes of the same model
//! are harmless; losing the last edit is not.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::PersistConfig;
use crate::error::ErrorCode;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("snapshot writer has stopped")]
    Closed,
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_PERSIST_IO",
            Self::Encode(_) => "E_PERSIST_ENCODE",
            Self::Closed => "E_PERSIST_CLOSED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Destination for model snapshots.
#[async_trait]
pub trait SnapshotSink: Send + Sync + 'static {
    /// Durably store `snapshot`, replacing any earlier one.
    async fn write(&self, snapshot: &Value) -> Result<(), PersistError>;
}

/// Writes snapshots as pretty JSON to a file. The file is replaced through a
/// sibling temp file and a rename, so readers never see a partial model.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSink for FileSink {
    async fn write(&self, snapshot: &Value) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

// =============================================================================
// WORKER
// =============================================================================

type Snapshot = Option<Arc<Value>>;
type Ack = oneshot::Sender<Result<(), PersistError>>;

enum Control {
    Flush(Ack),
    Shutdown(Ack),
}

/// Handle to a running snapshot writer.
pub struct PersistHandle {
    snapshots: watch::Sender<Snapshot>,
    control: mpsc::Sender<Control>,
    task: JoinHandle<()>,
}

impl PersistHandle {
    /// Replace the pending snapshot and restart the debounce timer. Never
    /// blocks.
    pub fn submit(&self, snapshot: Value) {
        self.snapshots.send_replace(Some(Arc::new(snapshot)));
    }

    /// Write the pending snapshot now.
    ///
    /// # Errors
    ///
    /// Returns the sink's error, or [`PersistError::Closed`] if the worker is
    /// gone.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let (ack, done) = oneshot::channel();
        self.control.send(Control::Flush(ack)).await.map_err(|_| PersistError::Closed)?;
        done.await.map_err(|_| PersistError::Closed)?
    }

    /// Write the pending snapshot and stop the worker.
    ///
    /// # Errors
    ///
    /// Returns the final write's error, or [`PersistError::Closed`] if the
    /// worker is already gone.
    pub async fn shutdown(self) -> Result<(), PersistError> {
        let (ack, done) = oneshot::channel();
        self.control.send(Control::Shutdown(ack)).await.map_err(|_| PersistError::Closed)?;
        let result = done.await.map_err(|_| PersistError::Closed)?;
        if let Err(e) = self.task.await {
            error!(error = %e, "snapshot writer task failed to join");
        }
        result
    }
}

/// Spawn the snapshot writer on the current tokio runtime.
#[must_use]
pub fn spawn_persister<S: SnapshotSink>(sink: S, config: PersistConfig) -> PersistHandle {
    let (snapshots, snapshot_rx) = watch::channel(None);
    let (control, control_rx) = mpsc::channel(config.channel_capacity.max(1));

    info!(
        debounce_ms = config.debounce_ms,
        interval_ms = config.interval_ms,
        channel_capacity = config.channel_capacity,
        "snapshot writer configured"
    );

    let task = tokio::spawn(run_worker(sink, snapshot_rx, control_rx, config));
    PersistHandle { snapshots, control, task }
}

async fn run_worker<S: SnapshotSink>(
    sink: S,
    mut snapshots: watch::Receiver<Snapshot>,
    mut control: mpsc::Receiver<Control>,
    config: PersistConfig,
) {
    let debounce = Duration::from_millis(config.debounce_ms);
    let mut backstop = tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));
    backstop.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    backstop.tick().await;

    let mut pending: Snapshot = None;
    let mut deadline: Option<Instant> = None;
    let mut snapshots_open = true;

    loop {
        tokio::select! {
            changed = snapshots.changed(), if snapshots_open => {
                if changed.is_err() {
                    snapshots_open = false;
                    continue;
                }
                pending = snapshots.borrow_and_update().clone();
                deadline = Some(Instant::now() + debounce);
            }
            () = wait_until(deadline) => {
                deadline = None;
                if let Err(e) = write_pending(&sink, &mut pending).await {
                    log_write_failure(&e, "debounce");
                }
            }
            _ = backstop.tick() => {
                if pending.is_some() {
                    deadline = None;
                    if let Err(e) = write_pending(&sink, &mut pending).await {
                        log_write_failure(&e, "backstop");
                    }
                }
            }
            message = control.recv() => {
                // PHASE: ABSORB LATEST
                // WHY: a submit may not have been observed by the select yet.
                if matches!(snapshots.has_changed(), Ok(true)) {
                    pending = snapshots.borrow_and_update().clone();
                }
                deadline = None;
                let result = write_pending(&sink, &mut pending).await;
                if let Err(ref e) = result {
                    log_write_failure(e, "control");
                }
                match message {
                    Some(Control::Flush(ack)) => {
                        if ack.send(result).is_err() {
                            debug!("flush requester went away before the ack");
                        }
                    }
                    Some(Control::Shutdown(ack)) => {
                        if ack.send(result).is_err() {
                            debug!("shutdown requester went away before the ack");
                        }
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    info!("snapshot writer stopped");
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Write the pending snapshot, clearing it only on success.
async fn write_pending<S: SnapshotSink>(sink: &S, pending: &mut Snapshot) -> Result<(), PersistError> {
    let Some(snapshot) = pending.clone() else {
        return Ok(());
    };
    sink.write(&snapshot).await?;
    *pending = None;
    debug!("snapshot written");
    Ok(())
}

fn log_write_failure(e: &PersistError, trigger: &'static str) {
    error!(
        error = %e,
        code = e.error_code(),
        retryable = e.retryable(),
        trigger,
        "snapshot write failed; snapshot kept pending"
    );
}
