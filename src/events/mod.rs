//! Broadcast notification: event types and the bus that delivers them.

pub mod bus;
pub mod types;

pub use bus::{EventBus, PayloadPredicate, SubscriptionHandle};
pub use types::{Event, SourceId};
