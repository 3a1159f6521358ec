//! Background execution: labeled task queues and completion dispatch.

pub mod dispatcher;
pub mod task_queue;

pub use dispatcher::{Completion, CompletionDispatcher, Precheck, WorkUnit};
pub use task_queue::TaskQueue;
