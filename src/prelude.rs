//! Convenient imports for the FaunaDB client.
//!
//! ```ignore
//! use faunadb::prelude::*;
//! ```

// Main entry point
pub use crate::client::{Client, ClientBuilder, Transport, TransportError, TransportResponse};

// Error handling
pub use crate::error::{Error, Result};

// Value model
pub use faunadb_core::{Bytes, Cursor, Object, Page, QueryError, RefV, Value};

// Wire codec
pub use faunadb_wire::{decode_expr, decode_json, encode_json};

// Streaming
pub use faunadb_stream::{EventStream, StreamConfig, StreamEvent, Subscriber, Subscription};
