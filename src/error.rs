//! Structured error payloads delivered through completion callbacks.
//!
//! The core reports every failure, synchronous or asynchronous, as an
//! [`ErrorInfo`]. Callers never need to distinguish where a failure was
//! detected: validation rejections and captured runtime faults arrive
//! through the same channel.

use serde::{Deserialize, Serialize};

/// Well-known error domains used by the core itself. Callers are free to
/// define their own domains for work-specific failures.
pub mod domains {
    /// A work item faulted (panicked) while running on a queue.
    pub const RUNTIME_FAULT: &str = "RuntimeFault";
    /// Input failed a precondition before any queue involvement.
    pub const VALIDATION: &str = "Validation";
    /// An environment override could not be parsed.
    pub const CONFIGURATION: &str = "Configuration";
}

/// Structured failure information: `{domain, code, message}`.
///
/// Immutable once constructed. Produced at most once per dispatched work
/// item and handed to exactly one failure callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{domain} ({code}): {message}")]
pub struct ErrorInfo {
    /// Namespace for the error code, e.g. `"Validation"` or a caller-defined domain.
    pub domain: String,
    /// Numeric code, meaningful within its domain.
    pub code: i64,
    /// Human-readable description.
    pub message: String,
}

impl ErrorInfo {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }

    /// A fault captured while work was running on a queue.
    pub fn runtime_fault(message: impl Into<String>) -> Self {
        Self::new(domains::RUNTIME_FAULT, -1, message)
    }

    /// A precondition failure detected synchronously, before queue involvement.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(domains::VALIDATION, -2, message)
    }
}

pub type DispatchResult<T> = std::result::Result<T, ErrorInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_domain_code_and_message() {
        let err = ErrorInfo::new("TestError", 999, "providerName must be a string");
        assert_eq!(
            err.to_string(),
            "TestError (999): providerName must be a string"
        );
    }

    #[test]
    fn runtime_fault_uses_reserved_domain() {
        let err = ErrorInfo::runtime_fault("boom");
        assert_eq!(err.domain, domains::RUNTIME_FAULT);
        assert_eq!(err.code, -1);
    }
}
