//! Events delivered to stream subscribers

use faunadb_core::{QueryError, Value};
use faunadb_wire::DecodeError;
use std::fmt;

/// One decoded unit from a stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A decoded data line
    Data(Value),
    /// A failure; the stream keeps going
    Error(EventError),
}

impl StreamEvent {
    /// The payload of a data event
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            StreamEvent::Data(v) => Some(v),
            StreamEvent::Error(_) => None,
        }
    }

    /// The error of an error event
    pub fn as_error(&self) -> Option<&EventError> {
        match self {
            StreamEvent::Error(e) => Some(e),
            StreamEvent::Data(_) => None,
        }
    }

    /// True for error events
    pub fn is_error(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }
}

/// Where an error event came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// The server sent a `{"type":"error", ...}` event
    Server,
    /// A line could not be decoded
    Protocol(DecodeError),
    /// Reading failed or no data was available
    Transport(String),
}

/// An error event: its origin and the query error subscribers see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventError {
    /// What produced the error
    pub origin: ErrorOrigin,
    /// Server-reported, or `"internal exception"` for client-side failures
    pub error: QueryError,
}

impl EventError {
    /// A server-reported error
    pub fn server(error: QueryError) -> Self {
        EventError {
            origin: ErrorOrigin::Server,
            error,
        }
    }

    /// A line that failed to decode
    pub fn protocol(cause: DecodeError) -> Self {
        EventError {
            error: QueryError::internal(cause.to_string()),
            origin: ErrorOrigin::Protocol(cause),
        }
    }

    /// A read failure or missing data
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        EventError {
            error: QueryError::internal(message.clone()),
            origin: ErrorOrigin::Transport(message),
        }
    }

    /// The error code
    pub fn code(&self) -> &str {
        &self.error.code
    }

    /// The error description
    pub fn description(&self) -> &str {
        &self.error.description
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            ErrorOrigin::Server => write!(f, "server error: {}", self.error),
            ErrorOrigin::Protocol(_) => write!(f, "protocol error: {}", self.error),
            ErrorOrigin::Transport(_) => write!(f, "transport error: {}", self.error),
        }
    }
}

impl std::error::Error for EventError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_is_internal_exception() {
        let e = EventError::protocol(DecodeError::UnexpectedEnd);
        assert_eq!(e.code(), "internal exception");
        assert_eq!(e.description(), "Unexpected end of input");
        assert_eq!(e.origin, ErrorOrigin::Protocol(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn test_display_names_origin() {
        let e = EventError::server(QueryError::new("invalid query", "bad ref"));
        assert_eq!(e.to_string(), "server error: invalid query: bad ref");

        let e = EventError::transport("no data");
        assert_eq!(e.to_string(), "transport error: internal exception: no data");
    }

    #[test]
    fn test_accessors() {
        let data = StreamEvent::Data(Value::from(1));
        assert_eq!(data.as_data(), Some(&Value::Integer(1)));
        assert!(!data.is_error());

        let err = StreamEvent::Error(EventError::transport("x"));
        assert!(err.is_error());
        assert!(err.as_data().is_none());
        assert_eq!(err.as_error().map(EventError::code), Some("internal exception"));
    }
}
