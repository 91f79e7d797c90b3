//! Unified error types for the FaunaDB client.
//!
//! This module wraps the errors of the member crates and presents a single
//! interface to users.

use crate::client::TransportError;
use faunadb_core::{QueryErrorResponse, ValueError};
use faunadb_stream::StreamError;
use faunadb_wire::DecodeError;
use thiserror::Error;

/// All client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire document could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A value did not have the expected shape
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The stream is closed
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// The server rejected the query
    #[error("query failed: {0}")]
    Query(QueryErrorResponse),

    /// The transport failed to deliver the request
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Check if the server rejected the query.
    pub fn is_query(&self) -> bool {
        matches!(self, Error::Query(_))
    }

    /// Check if the transport failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// HTTP status of a rejected query.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Query(resp) => Some(resp.status),
            _ => None,
        }
    }
}

impl From<QueryErrorResponse> for Error {
    fn from(resp: QueryErrorResponse) -> Self {
        Error::Query(resp)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faunadb_core::QueryError;

    #[test]
    fn test_query_error_status() {
        let err = Error::from(QueryErrorResponse {
            status: 404,
            errors: vec![QueryError::new("instance not found", "Document not found.")],
        });
        assert!(err.is_query());
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "query failed: status 404: instance not found: Document not found."
        );
    }

    #[test]
    fn test_conversions() {
        let err = Error::from(DecodeError::UnexpectedEnd);
        assert!(err.is_decode());
        assert_eq!(err.status(), None);

        let err = Error::from(TransportError::new("connection refused"));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "transport error: connection refused");

        let err = Error::from(StreamError::Disposed);
        assert_eq!(err.to_string(), "stream error: stream has been disposed");
    }

    #[test]
    fn test_every_variant_has_a_producer() {
        let errors = vec![
            Error::from(DecodeError::UnexpectedEnd),
            Error::from(ValueError::MissingField("data".to_string())),
            Error::from(StreamError::Completed),
            Error::from(QueryErrorResponse {
                status: 500,
                errors: vec![],
            }),
            Error::from(TransportError::new("reset")),
            Error::Config("a transport is required".to_string()),
        ];
        for err in errors {
            // No wildcard: a new variant must be added above
            match err {
                Error::Decode(_)
                | Error::Value(_)
                | Error::Stream(_)
                | Error::Query(_)
                | Error::Transport(_)
                | Error::Config(_) => {}
            }
        }
    }
}
