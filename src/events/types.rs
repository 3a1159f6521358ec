//! Event payload types shared by the bus and its publishers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Opaque identity token for an event source.
///
/// The bus compares these for equality when a subscription carries a source
/// filter; it never dereferences the object the token stands for, so a
/// source may be dropped while events naming it are still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named broadcast message with an optional source identity and a
/// string-keyed payload.
///
/// Immutable once posted: the bus takes the event by value and hands each
/// subscriber a shared reference.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub source: Option<SourceId>,
    pub payload: HashMap<String, Value>,
    pub published_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            payload: HashMap::new(),
            published_at: Utc::now(),
        }
    }

    /// Attach the identity of the posting object, enabling source-filtered
    /// subscriptions to match this event.
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }

    /// Add one payload entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}
