//! # TaskQueue
//!
//! Labeled background execution contexts. Each label is a serialization
//! domain: work submitted under the same label runs one-at-a-time in
//! submission order, while distinct labels run concurrently on the blocking
//! thread pool.
//!
//! `submit` never blocks the caller and never propagates a fault from the
//! submitted work back onto the caller's stack. A panicking job is captured,
//! logged, and the lane keeps draining; reporting the fault to the caller is
//! the responsibility of whatever sits on top of the queue (see
//! [`CompletionDispatcher`](crate::execution::dispatcher::CompletionDispatcher)).
//!
//! # Examples
//!
//! ```rust
//! use dispatch_core::execution::TaskQueue;
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = TaskQueue::new();
//!     queue.submit("io", || println!("runs off the caller's thread"));
//!     queue.drain("io").await;
//! }
//! ```

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Background execution contexts keyed by label.
///
/// Lanes are created lazily on first submission to a label and live for the
/// lifetime of the queue. There is no cancellation: submitted work always
/// runs to completion.
#[derive(Debug)]
pub struct TaskQueue {
    lanes: DashMap<String, mpsc::UnboundedSender<Job>>,
    handle: Handle,
}

impl TaskQueue {
    /// Create a queue bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime context.
    pub fn new() -> Self {
        Self {
            lanes: DashMap::new(),
            handle: Handle::current(),
        }
    }

    /// Submit one unit of work to the lane identified by `label`.
    ///
    /// Returns immediately. Work on the same label is serialized in
    /// submission order; work on different labels may run in parallel.
    pub fn submit(&self, label: &str, work: impl FnOnce() + Send + 'static) {
        let sender = self
            .lanes
            .entry(label.to_string())
            .or_insert_with(|| self.spawn_lane(label))
            .clone();

        // The drain task holds the receiver for as long as the queue lives,
        // so an unbounded send can only fail after the queue is dropped.
        if sender.send(Box::new(work)).is_err() {
            warn!(label = %label, "Work submitted to a lane that is no longer draining");
        }
    }

    /// Resolve once every job submitted to `label` before this call has
    /// completed. Intended for tests and composed shutdown paths; the core
    /// itself never waits on its own queues.
    pub async fn drain(&self, label: &str) {
        let (done_tx, done_rx) = oneshot::channel();
        self.submit(label, move || {
            let _ = done_tx.send(());
        });
        // The marker job only fails to report if the queue was dropped
        // mid-drain, in which case there is nothing left to wait for.
        let _ = done_rx.await;
    }

    /// Number of lanes created so far.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    fn spawn_lane(&self, label: &str) -> mpsc::UnboundedSender<Job> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let lane_label = label.to_string();
        debug!(label = %lane_label, "Creating queue lane");

        let handle = self.handle.clone();
        self.handle.spawn(async move {
            while let Some(job) = rx.recv().await {
                // Awaiting each blocking job before taking the next is what
                // makes one label a serialization domain. A panic inside the
                // job surfaces here as a JoinError instead of unwinding into
                // the lane.
                if let Err(join_err) = handle.spawn_blocking(job).await {
                    if join_err.is_panic() {
                        warn!(
                            label = %lane_label,
                            "Work item panicked; lane continues draining"
                        );
                    }
                }
            }
            debug!(label = %lane_label, "Queue lane shut down");
        });

        tx
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn drain_resolves_after_previously_submitted_work() {
        tokio_test::block_on(async {
            let queue = TaskQueue::new();
            let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

            for i in 0..3 {
                let order = Arc::clone(&order);
                queue.submit("inline", move || {
                    order.lock().push(i);
                });
            }
            queue.drain("inline").await;

            assert_eq!(*order.lock(), vec![0, 1, 2]);
        });
    }

    #[test]
    fn drain_on_an_untouched_label_resolves_immediately() {
        tokio_test::block_on(async {
            let queue = TaskQueue::new();
            queue.drain("never-used").await;
            assert_eq!(queue.lane_count(), 1);
        });
    }
}
