//! # Execution contexts for subscriber callbacks.
//!
//! A subscriber picks where its callback runs when it subscribes:
//!
//! - [`Dispatch::Inline`] runs the callback on the publishing thread, before
//!   `publish` returns.
//! - [`Dispatch::Queue`] posts the callback to a [`DispatchQueue`], a serial
//!   FIFO drained by one tokio worker task.
//!
//! ## Diagram
//! ```text
//!    publish(topic, payload)
//!        │
//!        ├── Inline ─────────────────────────► callback(payload)
//!        │
//!        └── Queue ──► [unbounded FIFO] ─► worker ─► callback(payload)
//!                                           └─► panic caught → warn!
//! ```
//!
//! ## Rules
//! - Jobs on one queue run one at a time, in submission order.
//! - The queue is unbounded; `submit` never blocks and never drops while open.
//! - After [`DispatchQueue::close`] pending jobs are dropped and `submit` returns `false`.
//! - A panicking job is caught and logged; the worker keeps going.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Unit of work run by a dispatch queue.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where a subscriber callback is invoked.
#[derive(Clone, Debug, Default)]
pub enum Dispatch {
    /// On the publishing thread, synchronously.
    #[default]
    Inline,
    /// On the given serial queue.
    Queue(DispatchQueue),
}

impl Dispatch {
    /// Runs `job` in this context.
    ///
    /// Returns `false` if the job was dropped because the queue is closed.
    pub fn run(&self, job: Job) -> bool {
        match self {
            Dispatch::Inline => {
                job();
                true
            }
            Dispatch::Queue(queue) => queue.submit(job),
        }
    }
}

impl From<DispatchQueue> for Dispatch {
    fn from(queue: DispatchQueue) -> Self {
        Dispatch::Queue(queue)
    }
}

/// Serial job queue backed by a tokio worker task.
///
/// Cloning is cheap; clones feed the same worker.
#[derive(Clone, Debug)]
pub struct DispatchQueue {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<Job>,
    token: CancellationToken,
}

impl DispatchQueue {
    /// Creates the queue and spawns its worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(name: impl Into<String>) -> Self {
        let name: Arc<str> = name.into().into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let token = CancellationToken::new();

        let worker_name = Arc::clone(&name);
        let worker_token = token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = worker_token.cancelled() => break,
                    job = rx.recv() => match job {
                        Some(job) => {
                            let fut = async move { job() };
                            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                                warn!(queue = %worker_name, panic = ?panic_err, "dispatch job panicked");
                            }
                        }
                        None => break,
                    }
                }
            }
            debug!(queue = %worker_name, "dispatch queue stopped");
        });

        Self { name, tx, token }
    }

    /// Enqueues a job. Returns `false` if the queue is closed.
    pub fn submit(&self, job: Job) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.tx.send(job).is_ok()
    }

    /// Waits until every job submitted before this call has run.
    ///
    /// Returns immediately if the queue is closed.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel::<()>();
        let barrier: Job = Box::new(move || {
            let _ = tx.send(());
        });
        if self.submit(barrier) {
            let _ = rx.await;
        }
    }

    /// Stops the worker. Jobs still queued are dropped.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// True once [`Self::close`] was called or the worker has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.tx.is_closed()
    }

    /// Queue name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
