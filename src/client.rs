//! Client entry point.
//!
//! The client encodes expressions, hands the body to a [`Transport`] and
//! decodes what comes back. Connections, authentication and retries belong
//! to the transport.

use crate::error::{Error, Result};
use faunadb_core::{Page, Value};
use faunadb_stream::{EventStream, LineSource, StreamConfig};
use faunadb_wire::{decode_error_response, decode_json, encode_json};
use std::fmt;
use std::io;
use tracing::{debug, warn};

/// A raw response from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl TransportResponse {
    /// Build a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create from a message
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            message: message.into(),
        }
    }

    /// The failure message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::new(e.to_string())
    }
}

/// Carries encoded requests to the server.
pub trait Transport: Send + Sync {
    /// Send one query body and wait for the response
    fn execute(&self, body: String) -> std::result::Result<TransportResponse, TransportError>;

    /// Open a streaming request; each line of the result is one event
    fn open_stream(
        &self,
        body: String,
    ) -> std::result::Result<Box<dyn LineSource>, TransportError>;
}

/// A FaunaDB client.
///
/// # Example
///
/// ```ignore
/// use faunadb::prelude::*;
///
/// let client = Client::builder().transport(my_transport).build()?;
/// let doc = client.query(&Value::call("get", RefV::document("users", "1")))?;
/// ```
pub struct Client<T> {
    transport: T,
    stream_config: StreamConfig,
}

impl<T: Transport> Client<T> {
    /// Client with default stream options
    pub fn new(transport: T) -> Self {
        Client {
            transport,
            stream_config: StreamConfig::default(),
        }
    }

    /// Start configuring a client
    pub fn builder() -> ClientBuilder<T> {
        ClientBuilder::new()
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Options applied to every stream this client opens
    pub fn stream_config(&self) -> &StreamConfig {
        &self.stream_config
    }

    /// Run a query and decode its result
    ///
    /// A `{"resource": ...}` envelope is unwrapped. A non-2xx response
    /// becomes [`Error::Query`].
    pub fn query(&self, expr: &Value) -> Result<Value> {
        let body = encode_json(expr);
        debug!(bytes = body.len(), "executing query");
        let response = self.transport.execute(body)?;

        if !response.is_success() {
            warn!(status = response.status, "query rejected");
            return Err(decode_error_response(response.status, &response.body)?.into());
        }
        Ok(unwrap_resource(decode_json(&response.body)?))
    }

    /// Run a query that returns a page
    pub fn paginate(&self, expr: &Value) -> Result<Page> {
        let value = self.query(expr)?;
        Ok(Page::try_from(value)?)
    }

    /// Open an event stream
    ///
    /// The stream is not pumped; call
    /// [`request_data`](EventStream::request_data) to read events.
    pub fn stream(&self, expr: &Value) -> Result<EventStream<Box<dyn LineSource>>> {
        let body = encode_json(expr);
        debug!(bytes = body.len(), "opening stream");
        let source = self.transport.open_stream(body)?;
        Ok(EventStream::with_config(source, self.stream_config.clone()))
    }
}

fn unwrap_resource(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.len() == 1 => match obj.shift_remove("resource") {
            Some(resource) => resource,
            None => Value::Object(obj),
        },
        other => other,
    }
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("stream_config", &self.stream_config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder<T> {
    transport: Option<T>,
    stream_config: StreamConfig,
}

impl<T: Transport> ClientBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        ClientBuilder {
            transport: None,
            stream_config: StreamConfig::default(),
        }
    }

    /// Set the transport (required).
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the options for streams opened by the client.
    pub fn stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client<T>> {
        let transport = self
            .transport
            .ok_or_else(|| Error::Config("a transport is required".to_string()))?;
        Ok(Client {
            transport,
            stream_config: self.stream_config,
        })
    }
}

impl<T: Transport> Default for ClientBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
