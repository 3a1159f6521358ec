//! # CompletionDispatcher
//!
//! Bridges a unit of work to a pair of mutually-exclusive completion
//! callbacks. Exactly one of the callbacks fires, exactly once, whether the
//! work completes on a queue, short-circuits synchronously during precheck,
//! or faults while running.
//!
//! The exclusivity contract is enforced structurally rather than by caller
//! discipline: callbacks are `FnOnce`, the precheck arms return before any
//! queue submission, and the queued path consumes both callbacks into a
//! single [`Completion`] match. A dispatcher that lets a synchronous
//! shortcut *also* schedule the async path cannot be expressed here.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::error::{DispatchResult, ErrorInfo};
use crate::execution::task_queue::TaskQueue;

/// The single outcome of one dispatched work item.
///
/// Produced exactly once per dispatch; ownership transfers to whichever
/// callback consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Success(T),
    Failure(ErrorInfo),
}

/// Synchronous validation outcome, decided before any queue involvement.
#[derive(Debug)]
pub enum Precheck<T> {
    /// Input is acceptable; run the work on a queue.
    Proceed,
    /// Input trivially completes; invoke the success callback on the
    /// caller's stack and skip the queue entirely.
    Complete(T),
    /// Input fails a precondition; invoke the failure callback on the
    /// caller's stack and skip the queue entirely.
    Reject(ErrorInfo),
}

/// One unit of dispatchable computation.
///
/// `precheck` runs synchronously on the dispatching thread; `run` executes
/// on a background queue lane. Implementations hold whatever configuration
/// the work needs; per-call data arrives through `Input`.
pub trait WorkUnit {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Validate `input` before queue submission. Defaults to [`Precheck::Proceed`].
    fn precheck(&self, _input: &Self::Input) -> Precheck<Self::Output> {
        Precheck::Proceed
    }

    /// Perform the work. Runs on a background lane; a panic here is captured
    /// and reported as a runtime fault through the failure callback.
    fn run(&self, input: Self::Input) -> DispatchResult<Self::Output>;
}

/// Submits work to a [`TaskQueue`] and resolves it through exactly one
/// completion callback.
#[derive(Debug, Clone)]
pub struct CompletionDispatcher {
    queue: Arc<TaskQueue>,
    label: String,
}

impl CompletionDispatcher {
    /// Create a dispatcher that submits all of its work under `label`.
    pub fn new(queue: Arc<TaskQueue>, label: impl Into<String>) -> Self {
        Self {
            queue,
            label: label.into(),
        }
    }

    /// Queue label this dispatcher submits under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run `work` on `input`, resolving through exactly one of `on_success`
    /// / `on_failure`, exactly once.
    ///
    /// A [`Precheck::Complete`] or [`Precheck::Reject`] resolves synchronously
    /// on the caller's stack with no queue involvement. [`Precheck::Proceed`]
    /// submits one job; the callbacks then fire on the queue's context.
    pub fn dispatch<W>(
        &self,
        work: W,
        input: W::Input,
        on_success: impl FnOnce(W::Output) + Send + 'static,
        on_failure: impl FnOnce(ErrorInfo) + Send + 'static,
    ) where
        W: WorkUnit + Send + 'static,
    {
        match work.precheck(&input) {
            Precheck::Complete(output) => {
                debug!(label = %self.label, "Dispatch completed synchronously in precheck");
                on_success(output);
                return;
            }
            Precheck::Reject(err) => {
                debug!(label = %self.label, domain = %err.domain, "Dispatch rejected in precheck");
                on_failure(err);
                return;
            }
            Precheck::Proceed => {}
        }

        self.queue.submit(&self.label, move || {
            match Self::run_captured(&work, input) {
                Completion::Success(output) => on_success(output),
                Completion::Failure(err) => on_failure(err),
            }
        });
    }

    /// Run `work` on `input`, reporting a readiness boolean strictly before
    /// the result.
    ///
    /// `on_status` receives `true` iff the work produced a success; when both
    /// callbacks fire for one call, `on_status` is always observed first.
    /// Rejection in precheck reports `on_status(false)` then `on_result(None)`
    /// synchronously.
    pub fn dispatch_with_status<W>(
        &self,
        work: W,
        input: W::Input,
        on_status: impl FnOnce(bool) + Send + 'static,
        on_result: impl FnOnce(Option<W::Output>) + Send + 'static,
    ) where
        W: WorkUnit + Send + 'static,
    {
        match work.precheck(&input) {
            Precheck::Complete(output) => {
                on_status(true);
                on_result(Some(output));
                return;
            }
            Precheck::Reject(_) => {
                on_status(false);
                on_result(None);
                return;
            }
            Precheck::Proceed => {}
        }

        self.queue.submit(&self.label, move || {
            match Self::run_captured(&work, input) {
                Completion::Success(output) => {
                    on_status(true);
                    on_result(Some(output));
                }
                Completion::Failure(_) => {
                    on_status(false);
                    on_result(None);
                }
            }
        });
    }

    /// Execute `run` with panic capture, folding every path into one
    /// [`Completion`].
    fn run_captured<W>(work: &W, input: W::Input) -> Completion<W::Output>
    where
        W: WorkUnit,
    {
        match catch_unwind(AssertUnwindSafe(|| work.run(input))) {
            Ok(Ok(output)) => Completion::Success(output),
            Ok(Err(err)) => Completion::Failure(err),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "work item panicked".to_string());
                Completion::Failure(ErrorInfo::runtime_fault(message))
            }
        }
    }
}
