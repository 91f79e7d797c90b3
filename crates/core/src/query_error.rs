//! Errors reported by the remote query evaluator
//!
//! A failed request carries one or more query errors in its body:
//! ```json
//! {
//!   "errors": [{
//!     "position": ["create", "params"],
//!     "code": "validation failed",
//!     "description": "document data is not valid.",
//!     "failures": [{"field": ["data", "name"], "code": "value required", "description": "..."}]
//!   }]
//! }
//! ```
//! Streaming error events carry the same `code`/`description` pair under
//! their `event` field.

use serde::Deserialize;
use std::fmt;

/// Code used for failures that originate on the client side of a stream
pub const INTERNAL_EXCEPTION: &str = "internal exception";

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationFailure {
    /// Path to the failing field
    #[serde(default)]
    pub field: Vec<String>,
    /// Failure code, e.g. `"value required"`
    pub code: String,
    /// Human-readable description
    pub description: String,
}

/// An error reported for one position in a query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryError {
    /// Path into the query expression where evaluation failed
    #[serde(default, deserialize_with = "position::deserialize")]
    pub position: Vec<String>,
    /// Error code, e.g. `"invalid ref"`
    pub code: String,
    /// Human-readable description
    pub description: String,
    /// Nested validation failures
    #[serde(default)]
    pub failures: Vec<ValidationFailure>,
}

impl QueryError {
    /// Create an error with no position and no failures
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        QueryError {
            position: Vec::new(),
            code: code.into(),
            description: description.into(),
            failures: Vec::new(),
        }
    }

    /// An `"internal exception"` error wrapping a client-side failure
    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(INTERNAL_EXCEPTION, description)
    }

    /// Attach the query position
    pub fn with_position(mut self, position: Vec<String>) -> Self {
        self.position = position;
        self
    }

    /// Attach validation failures
    pub fn with_failures(mut self, failures: Vec<ValidationFailure>) -> Self {
        self.failures = failures;
        self
    }

    /// True for errors raised on the client side
    pub fn is_internal(&self) -> bool {
        self.code == INTERNAL_EXCEPTION
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)?;
        if !self.position.is_empty() {
            write!(f, " (at {})", self.position.join("/"))?;
        }
        Ok(())
    }
}

/// All errors of a failed request together with its HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryErrorResponse {
    /// HTTP status code
    pub status: u16,
    /// Reported errors, in server order
    pub errors: Vec<QueryError>,
}

impl fmt::Display for QueryErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        for (i, e) in self.errors.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

/// Positions mix field names and array indices: `["map", 0, "expr"]`
mod position {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Segment {
        Name(String),
        Index(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let segments = Option::<Vec<Segment>>::deserialize(d)?.unwrap_or_default();
        Ok(segments
            .into_iter()
            .map(|s| match s {
                Segment::Name(n) => n,
                Segment::Index(i) => i.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error() {
        let e = QueryError::internal("boom");
        assert_eq!(e.code, "internal exception");
        assert!(e.is_internal());
        assert!(e.position.is_empty());
        assert!(e.failures.is_empty());
    }

    #[test]
    fn test_deserialize_full_error() {
        let json = r#"{
            "position": ["create", 0, "params"],
            "code": "validation failed",
            "description": "document data is not valid.",
            "failures": [{"field": ["data", "name"], "code": "value required", "description": "Value required."}]
        }"#;
        let e: QueryError = serde_json::from_str(json).unwrap();
        assert_eq!(e.position, vec!["create", "0", "params"]);
        assert_eq!(e.failures.len(), 1);
        assert_eq!(e.failures[0].field, vec!["data", "name"]);
        assert!(!e.is_internal());
    }

    #[test]
    fn test_deserialize_minimal_error() {
        let e: QueryError =
            serde_json::from_str(r#"{"code":"invalid ref","description":"bad ref"}"#).unwrap();
        assert_eq!(e, QueryError::new("invalid ref", "bad ref"));
    }

    #[test]
    fn test_display() {
        let e = QueryError::new("invalid ref", "bad ref").with_position(vec!["get".into()]);
        assert_eq!(e.to_string(), "invalid ref: bad ref (at get)");

        let resp = QueryErrorResponse {
            status: 400,
            errors: vec![QueryError::new("a", "b"), QueryError::new("c", "d")],
        };
        assert_eq!(resp.to_string(), "status 400: a: b; c: d");
    }
}
