#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Dispatch Core
//!
//! Minimal asynchronous-event core: labeled background task queues,
//! completion dispatch with mutually-exclusive callbacks, broadcast event
//! notification, and single-observer delegate callbacks.
//!
//! ## Architecture
//!
//! - [`execution::TaskQueue`] — background execution contexts keyed by label.
//!   One label is a serialization domain; different labels run concurrently.
//! - [`execution::CompletionDispatcher`] — submits a [`execution::WorkUnit`]
//!   to a queue and resolves it through exactly one completion callback,
//!   exactly once, whether the work succeeds, fails validation synchronously,
//!   or faults mid-run.
//! - [`events::EventBus`] — explicit, constructible broadcast bus delivering
//!   named events with optional source-identity filtering and payload
//!   predicates, in registration order.
//! - [`delegate::DelegateSlot`] — at-most-one observer behind a non-owning
//!   reference, notified synchronously.
//! - [`loader::BulkLoader`] — composite consumer of queue + bus, simulating
//!   multi-item loads with injectable per-item latency.
//!
//! ## Guarantees
//!
//! Every dispatched work item yields exactly one completion, delivered
//! exactly once. Internal faults never escape onto the caller's stack; they
//! are captured and reported through the same failure channel as validation
//! errors. Event delivery is synchronous on the posting context and follows
//! registration order.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dispatch_core::error::DispatchResult;
//! use dispatch_core::execution::{CompletionDispatcher, TaskQueue, WorkUnit};
//!
//! struct Reverse;
//!
//! impl WorkUnit for Reverse {
//!     type Input = String;
//!     type Output = String;
//!
//!     fn run(&self, input: String) -> DispatchResult<String> {
//!         Ok(input.chars().rev().collect())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = Arc::new(TaskQueue::new());
//!     let dispatcher = CompletionDispatcher::new(Arc::clone(&queue), "dispatch");
//!     dispatcher.dispatch(
//!         Reverse,
//!         "string".to_string(),
//!         |reversed| assert_eq!(reversed, "gnirts"),
//!         |err| panic!("unexpected failure: {err}"),
//!     );
//!     queue.drain("dispatch").await;
//! }
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod events;
pub mod execution;
pub mod loader;
pub mod logging;

pub use config::CoreConfig;
pub use delegate::DelegateSlot;
pub use error::{DispatchResult, ErrorInfo};
pub use events::{Event, EventBus, SourceId, SubscriptionHandle};
pub use execution::{Completion, CompletionDispatcher, Precheck, TaskQueue, WorkUnit};
pub use loader::{BulkLoader, LoadOutcome, FILE_LOADED, SUCCESS_CODE_KEY};
