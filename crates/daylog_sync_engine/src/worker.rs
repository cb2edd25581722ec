//! Background reconciliation worker.

use crate::engine::{ReconcileOutcome, SyncEngine};
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteClient;
use daylog_storage::EntryStore;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

const THREAD_NAME: &str = "daylog-sync";

/// Handle to a running background reconciliation loop.
///
/// The loop waits [`SyncConfig::sync_interval`](crate::SyncConfig) between
/// cycles. The wait is interruptible: [`SyncWorker::stop`] (or dropping
/// the handle) wakes the thread immediately and joins it.
#[derive(Debug)]
pub struct SyncWorker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl<R, S> SyncEngine<R, S>
where
    R: RemoteClient + 'static,
    S: EntryStore + 'static,
{
    /// Starts the background reconciliation loop for a shared engine.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Worker`] if the thread cannot be spawned.
    pub fn start(engine: &Arc<Self>) -> SyncResult<SyncWorker> {
        let engine = Arc::clone(engine);
        let interval = engine.config().sync_interval;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                info!(interval_ms = interval.as_millis() as u64, "sync worker started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => run_cycle(&engine),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("sync worker stopped");
            })
            .map_err(SyncError::Worker)?;

        Ok(SyncWorker {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

fn run_cycle<R: RemoteClient, S: EntryStore>(engine: &SyncEngine<R, S>) {
    match engine.reconcile() {
        Ok(ReconcileOutcome::Merged(report)) if report.changed() => {
            info!(
                inserted = report.inserted,
                replaced = report.replaced,
                "pulled remote changes"
            );
        }
        Ok(ReconcileOutcome::Merged(_)) => {}
        Ok(ReconcileOutcome::Skipped(reason)) => {
            debug!(%reason, "reconcile skipped, will retry next cycle");
        }
        // Local storage trouble is logged by the engine; keep looping.
        Err(e) => error!(error = %e, "reconcile failed"),
    }
}

impl SyncWorker {
    /// Returns true while the worker thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the loop to stop and waits for it to exit.
    ///
    /// A reconciliation already in progress finishes first; that is bounded
    /// by the remote timeout.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The receiver only disappears if the thread already exited.
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("sync worker panicked");
            }
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
