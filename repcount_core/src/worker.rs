//! Dedicated inference thread.
//!
//! The worker owns the `PoseSource`. The runner sends one request and
//! blocks on its reply, so at most one inference is ever in flight.
//! Acquisition (`PoseSource::open`) is the only step with a timeout; if it
//! expires the thread is detached and left to finish on its own.
//!
//! Each `InferenceWorker` spawns exactly one thread, joined on drop once
//! acquisition has succeeded.
use crossbeam_channel as xch;
use repcount_traits::{BoxError, Estimate, PoseSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{RepError, Result};
use crate::source_error::map_source_error;

pub struct InferenceWorker {
    req_tx: Option<xch::Sender<()>>,
    resp_rx: xch::Receiver<std::result::Result<Estimate, BoxError>>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl InferenceWorker {
    /// Move `source` onto a new thread, open it, and wait up to
    /// `acquire_timeout` for it to come up.
    pub fn spawn<S: PoseSource + Send + 'static>(
        mut source: S,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let (ready_tx, ready_rx) = xch::bounded::<std::result::Result<(), BoxError>>(1);
        let (req_tx, req_rx) = xch::bounded::<()>(1);
        let (resp_tx, resp_rx) = xch::bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::Builder::new()
            .name("pose-worker".into())
            .spawn(move || {
                if let Err(e) = source.open() {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
                // Caller gone means acquisition timed out
                if ready_tx.send(Ok(())).is_err() {
                    tracing::debug!("acquisition abandoned by caller, worker exiting");
                    return;
                }
                while req_rx.recv().is_ok() {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    if resp_tx.send(source.estimate()).is_err() {
                        tracing::debug!("inference consumer disconnected, exiting worker");
                        break;
                    }
                }
                tracing::trace!("pose worker exiting cleanly");
            })
            .map_err(|e| eyre::Report::new(RepError::Acquire(format!("spawn worker: {e}"))))?;

        match ready_rx.recv_timeout(acquire_timeout) {
            Ok(Ok(())) => {
                tracing::debug!("pose source acquired");
                Ok(Self {
                    req_tx: Some(req_tx),
                    resp_rx,
                    shutdown,
                    join_handle: Some(join_handle),
                })
            }
            Ok(Err(e)) => {
                let _ = join_handle.join();
                Err(eyre::Report::new(RepError::Acquire(e.to_string())))
            }
            Err(xch::RecvTimeoutError::Timeout) => {
                shutdown.store(true, Ordering::Relaxed);
                let ms = u64::try_from(acquire_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::error!(timeout_ms = ms, "pose source acquisition timed out");
                // Detached: `open()` may still be blocking.
                drop(join_handle);
                Err(eyre::Report::new(RepError::AcquireTimeout(ms)))
            }
            Err(xch::RecvTimeoutError::Disconnected) => {
                let _ = join_handle.join();
                Err(eyre::Report::new(RepError::Acquire(
                    "pose worker exited during acquisition".into(),
                )))
            }
        }
    }

    /// Run one inference and wait for it. No timeout.
    ///
    /// `RepError::WorkerLost` means the thread has exited (for example the
    /// source panicked) and every later call will fail the same way.
    pub fn infer(&mut self) -> std::result::Result<Estimate, RepError> {
        let tx = self
            .req_tx
            .as_ref()
            .ok_or_else(|| RepError::State("pose worker already stopped".into()))?;
        tx.send(())
            .map_err(|_| RepError::WorkerLost("request channel closed".into()))?;
        match self.resp_rx.recv() {
            Ok(Ok(estimate)) => Ok(estimate),
            Ok(Err(e)) => Err(map_source_error(&*e)),
            Err(_) => Err(RepError::WorkerLost("exited without replying".into())),
        }
    }
}

impl Drop for InferenceWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Closing the request channel wakes the worker if it is idle.
        self.req_tx.take();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("pose worker joined"),
                Err(e) => tracing::warn!(?e, "pose worker panicked during shutdown"),
            }
        }
    }
}
