//! Errors raised when projecting a [`Value`](crate::Value) onto a typed shape.

use thiserror::Error;

/// A value did not have the shape a typed projection expected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Wrong variant
    #[error("wrong type: expected {expected}, got {actual}")]
    WrongType {
        /// Expected variant name
        expected: &'static str,
        /// Variant name found
        actual: &'static str,
    },

    /// A required object field is absent
    #[error("missing field: {0}")]
    MissingField(String),
}
