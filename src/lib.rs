//! # faunadb
//!
//! Client core for FaunaDB: the value model shared by query expressions and
//! results, its JSON wire codec, and a streaming event dispatcher.
//!
//! ## Quick Start
//!
//! ```ignore
//! use faunadb::prelude::*;
//!
//! let client = Client::builder().transport(my_transport).build()?;
//!
//! // Literal objects and function calls are distinct on the wire
//! let expr = Value::call(
//!     "create",
//!     Value::array([
//!         Value::Ref(RefV::collection("users")),
//!         Value::object([("data", Value::object([("name", Value::from("Alice"))]))]),
//!     ]),
//! );
//! let doc = client.query(&expr)?;
//!
//! // Streams deliver events to every subscriber, in order
//! let stream = client.stream(&Value::Ref(RefV::document("users", "1")))?;
//! let _sub = stream.subscribe(|event: &StreamEvent| println!("{:?}", event));
//! stream.request_data()?;
//! ```
//!
//! ## Crates
//!
//! - `faunadb-core` - [`Value`], [`RefV`], [`Bytes`], [`Page`], [`QueryError`]
//! - `faunadb-wire` - [`encode_json`], [`decode_json`], [`decode_expr`]
//! - `faunadb-stream` - [`EventStream`], [`Subscriber`], [`LineSource`]

#![warn(missing_docs)]

mod client;
mod error;

pub mod prelude;

// Re-export main entry points
pub use client::{Client, ClientBuilder, Transport, TransportError, TransportResponse};
pub use error::{Error, Result};

// Re-export member crates
pub use faunadb_core::{
    Bytes, Cursor, Object, Page, QueryError, QueryErrorResponse, RefV, ValidationFailure, Value,
    ValueError, WireTag, INTERNAL_EXCEPTION,
};
pub use faunadb_stream::{
    CancelHandle, ErrorOrigin, EventError, EventStream, LineReader, LineSource, StreamConfig,
    StreamError, StreamEvent, StreamState, Subscriber, Subscription,
};
pub use faunadb_wire::{decode_expr, decode_json, encode_json, DecodeError};
