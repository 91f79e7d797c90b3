//! Streaming event decoder and dispatcher for FaunaDB
//!
//! A stream turns a line-delimited source (one JSON document per line) into
//! [`StreamEvent`]s and delivers each one, synchronously and in order, to
//! every registered [`Subscriber`].
//!
//! ```
//! use faunadb_stream::{EventStream, LineReader, StreamEvent};
//! use std::io::Cursor;
//!
//! let source = LineReader::new(Cursor::new("{\"type\":\"start\",\"txn\":1}\n"));
//! let stream = EventStream::new(source);
//! let _sub = stream.subscribe(|event: &StreamEvent| {
//!     if let StreamEvent::Data(value) = event {
//!         println!("{:?}", value.get("txn"));
//!     }
//! });
//! assert!(stream.request_data().unwrap().as_data().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod event;
pub mod handler;
pub mod source;
pub mod subscriber;

pub use config::{StreamConfig, StreamConfigBuilder, DEFAULT_MAX_LINE_BYTES};
pub use event::{ErrorOrigin, EventError, StreamEvent};
pub use handler::{EventStream, StreamError, StreamState};
pub use source::{CancelHandle, LineReader, LineSource};
pub use subscriber::{Subscriber, Subscription};
