//! # BulkLoader
//!
//! Example composite consumer built from [`TaskQueue`] + [`EventBus`]. It
//! simulates a multi-item load with a configurable per-item latency, which
//! makes it a good harness for ordering and shared-state concerns: the
//! accumulated results must come out in exactly input order because the whole
//! iteration runs as a single serialized job on one labeled lane.
//!
//! Misuse note: the accumulation is not protected against two concurrently
//! outstanding `load_all` jobs on the same instance. Callers must not invoke
//! `load_all` again before the previous call's lane has drained; doing so is
//! a contract violation, not a recoverable condition.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::CoreConfig;
use crate::events::{Event, EventBus, SourceId};
use crate::execution::TaskQueue;

/// Event name posted when a single-item load finishes.
pub const FILE_LOADED: &str = "fileLoaded";
/// Payload key carrying the [`LoadOutcome`] of a single-item load.
pub const SUCCESS_CODE_KEY: &str = "successCode";

/// Enumerated outcome of one load. The `successCode` payload entry always
/// carries a serialized `LoadOutcome`, never a raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    Success,
    Failure,
}

/// Simulated multi-item loader.
#[derive(Debug, Clone)]
pub struct BulkLoader {
    queue: Arc<TaskQueue>,
    bus: EventBus,
    source: SourceId,
    item_latency: Duration,
    loaded: Arc<Mutex<Vec<String>>>,
}

impl BulkLoader {
    pub fn new(queue: Arc<TaskQueue>, bus: EventBus) -> Self {
        Self {
            queue,
            bus,
            source: SourceId::new(),
            item_latency: Duration::from_millis(10),
            loaded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Build a loader whose simulated per-item latency comes from
    /// [`CoreConfig::item_latency_ms`]. Loads still run on whatever label the
    /// caller passes; `CoreConfig::loader_queue_label` is the conventional
    /// choice.
    pub fn from_config(queue: Arc<TaskQueue>, bus: EventBus, config: &CoreConfig) -> Self {
        Self::new(queue, bus).with_item_latency(Duration::from_millis(config.item_latency_ms))
    }

    /// Override the simulated per-item latency. Tests pass `Duration::ZERO`
    /// to run deterministically without wall-clock waits.
    pub fn with_item_latency(mut self, latency: Duration) -> Self {
        self.item_latency = latency;
        self
    }

    /// Identity this loader attaches to the events it posts, for
    /// source-filtered subscriptions.
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Load `items` as one job on the lane named by `label`: each item incurs
    /// the configured latency, then lands in the shared accumulation, so the
    /// accumulation grows in exactly input order.
    ///
    /// At most one `load_all` may be outstanding per loader instance; see the
    /// module docs.
    pub fn load_all(&self, items: Vec<String>, label: &str) {
        let loaded = Arc::clone(&self.loaded);
        let latency = self.item_latency;
        debug!(label = %label, count = items.len(), "Submitting bulk load");

        self.queue.submit(label, move || {
            for item in items {
                if !latency.is_zero() {
                    std::thread::sleep(latency);
                }
                loaded.lock().push(item);
            }
        });
    }

    /// Load one item in the background and post [`FILE_LOADED`] from this
    /// loader's source when it finishes. An empty identifier is the simulated
    /// failure case and posts [`LoadOutcome::Failure`].
    pub fn load_one(&self, item: impl Into<String>, label: &str) {
        let item = item.into();
        let bus = self.bus.clone();
        let source = self.source;
        let latency = self.item_latency;

        self.queue.submit(label, move || {
            if !latency.is_zero() {
                std::thread::sleep(latency);
            }
            let outcome = if item.is_empty() {
                LoadOutcome::Failure
            } else {
                LoadOutcome::Success
            };
            bus.post(
                Event::new(FILE_LOADED)
                    .with_source(source)
                    .with_entry(SUCCESS_CODE_KEY, json!(outcome)),
            );
        });
    }

    /// Snapshot of everything loaded so far, in load order.
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().clone()
    }
}
