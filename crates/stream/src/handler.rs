//! The streaming decoder and dispatcher
//!
//! Each call to [`EventStream::request_data`] reads one line from the
//! source, turns it into a [`StreamEvent`] and delivers that event to every
//! current subscriber before returning it.
//!
//! ## Line handling
//!
//! ```text
//! read failure / end of input / blank line  -> Error (Transport)
//! longer than max_line_bytes                -> Error (Protocol)
//! not a valid document                      -> Error (Protocol)
//! {"type":"error","event":{code, description}} -> Error (Server)
//! anything else                             -> Data(value)
//! ```
//!
//! None of these are fatal: the next pump reads the next line. The stream
//! closes only through [`EventStream::complete`] or [`EventStream::dispose`],
//! or at end of input when [`StreamConfig::close_on_eof`] is set. Once
//! closed, no further event reaches a subscriber: a line read while the
//! stream was closing is dropped.

use crate::config::StreamConfig;
use crate::event::{EventError, StreamEvent};
use crate::source::{CancelHandle, LineSource};
use crate::subscriber::{Registry, Subscriber, Subscription};
use faunadb_core::Value;
use faunadb_wire::{decode_json, encode_json, query_error_from_event, DecodeError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Longest excerpt of a line quoted in a protocol error
const FRAGMENT_CHARS: usize = 64;

/// Pump failures: the stream no longer reads
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StreamError {
    /// [`EventStream::dispose`] was called
    #[error("stream has been disposed")]
    Disposed,
    /// The stream completed
    #[error("stream has completed")]
    Completed,
}

/// Lifecycle of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Pumps read from the source
    Open,
    /// Terminal: completed or disposed
    Closed,
}

/// Turns a line source into events for any number of subscribers
pub struct EventStream<S> {
    /// Held through read and dispatch: one pump at a time, events in order
    source: Mutex<Option<S>>,
    /// Interrupts a pump blocked in the source; usable without the lock
    cancel: Option<CancelHandle>,
    registry: Arc<Registry>,
    config: StreamConfig,
    completed: AtomicBool,
    disposed: AtomicBool,
}

impl<S: LineSource> EventStream<S> {
    /// Stream over `source` with default options
    pub fn new(source: S) -> Self {
        Self::with_config(source, StreamConfig::default())
    }

    /// Stream over `source`
    pub fn with_config(source: S, config: StreamConfig) -> Self {
        EventStream {
            cancel: source.cancel_handle(),
            source: Mutex::new(Some(source)),
            registry: Arc::new(Registry::default()),
            config,
            completed: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    /// Active options
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> StreamState {
        if self.is_disposed() || self.is_completed() {
            StreamState::Closed
        } else {
            StreamState::Open
        }
    }

    /// True once [`dispose`](Self::dispose) was called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// True once the stream completed
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Register a subscriber
    ///
    /// Callable at any time, including from inside a callback; the new
    /// subscriber sees events from the next dispatch on.
    pub fn subscribe(&self, subscriber: impl Subscriber + 'static) -> Subscription {
        self.registry.add(Arc::new(subscriber))
    }

    /// Register a shared subscriber
    ///
    /// Registering the same `Arc` twice keeps a single registration; both
    /// handles refer to it.
    pub fn subscribe_shared(&self, subscriber: Arc<dyn Subscriber>) -> Subscription {
        self.registry.add(subscriber)
    }

    /// Read one line and dispatch the resulting event
    ///
    /// Blocks while the source blocks. Returns the dispatched event, or a
    /// [`StreamError`] once the stream is closed, including when it closed
    /// while this call was reading.
    pub fn request_data(&self) -> Result<StreamEvent, StreamError> {
        self.ensure_open()?;

        let outcome = {
            let mut guard = self.source.lock();
            let outcome = match (self.ensure_open(), guard.as_mut()) {
                (Ok(()), Some(source)) => self.pump(source),
                (Ok(()), None) => Err(StreamError::Disposed),
                (Err(e), _) => Err(e),
            };
            if self.is_disposed() {
                guard.take();
            }
            outcome
        };
        self.release_if_disposed();

        let (event, eof) = outcome?;

        if eof && self.config.close_on_eof {
            self.complete();
        }
        Ok(event)
    }

    /// Close the stream and notify subscribers once
    ///
    /// Idempotent: later calls do nothing. A pump reading at that moment
    /// drops its line, and a dispatch in progress stops before the next
    /// subscriber.
    pub fn complete(&self) {
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        let snapshot = self.registry.snapshot();
        info!(subscribers = snapshot.len(), "stream completed");
        for entry in snapshot.iter() {
            entry.subscriber().on_complete();
        }
    }

    /// Release the source and refuse further pumps
    ///
    /// Subscribers are not notified. A pump blocked in the source is
    /// interrupted through its [`CancelHandle`] and returns
    /// [`StreamError::Disposed`]; a pump already dispatching stops before the
    /// next subscriber. Either way that pump releases the source.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("stream disposed");
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        self.release_if_disposed();
    }

    /// Read and dispatch under the source lock
    fn pump(&self, source: &mut S) -> Result<(StreamEvent, bool), StreamError> {
        let (event, eof) = self.read_event(source);
        if let Err(e) = self.ensure_open() {
            debug!("stream closed during read; event dropped");
            return Err(e);
        }
        self.dispatch(&event);
        Ok((event, eof))
    }

    fn ensure_open(&self) -> Result<(), StreamError> {
        if self.is_disposed() {
            Err(StreamError::Disposed)
        } else if self.is_completed() {
            Err(StreamError::Completed)
        } else {
            Ok(())
        }
    }

    /// Drop the source unless a pump holds it; that pump drops it instead
    fn release_if_disposed(&self) {
        if !self.is_disposed() {
            return;
        }
        if let Some(mut guard) = self.source.try_lock() {
            if guard.take().is_some() {
                debug!("stream source released");
            }
        }
    }

    /// One line as an event; the flag marks end of input
    fn read_event(&self, source: &mut S) -> (StreamEvent, bool) {
        let line = match source.next_line(self.config.max_line_bytes) {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stream source has no data");
                return (transport_error("no data available"), true);
            }
            Err(e) => {
                warn!(error = %e, "stream read failed");
                return (transport_error(e.to_string()), false);
            }
        };

        if line.trim().is_empty() {
            debug!("blank stream line");
            return (transport_error("no data available"), false);
        }

        if line.len() > self.config.max_line_bytes {
            warn!(
                len = line.len(),
                max = self.config.max_line_bytes,
                "stream line too long"
            );
            let cause = DecodeError::Syntax {
                offset: self.config.max_line_bytes,
                message: "line exceeds the maximum length",
                fragment: line.chars().take(FRAGMENT_CHARS).collect(),
            };
            return (StreamEvent::Error(EventError::protocol(cause)), false);
        }

        (decode_line(&line), false)
    }

    fn dispatch(&self, event: &StreamEvent) {
        let snapshot = self.registry.snapshot();
        debug!(
            subscribers = snapshot.len(),
            error = event.is_error(),
            "dispatching stream event"
        );
        for entry in snapshot.iter() {
            // A callback may have closed the stream
            if self.ensure_open().is_err() {
                debug!("stream closed during dispatch");
                break;
            }
            entry.subscriber().on_event(event);
        }
    }
}

fn transport_error(message: impl Into<String>) -> StreamEvent {
    StreamEvent::Error(EventError::transport(message))
}

/// Decode one line; `{"type":"error"}` documents become server errors
fn decode_line(line: &str) -> StreamEvent {
    let value = match decode_json(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "undecodable stream line");
            return StreamEvent::Error(EventError::protocol(e));
        }
    };

    if value.get("type").and_then(Value::as_str) != Some("error") {
        return StreamEvent::Data(value);
    }

    let error = match value.get("event") {
        Some(event) => query_error_from_event(event),
        None => Err(DecodeError::MissingField {
            field: "event",
            fragment: encode_json(&value).chars().take(FRAGMENT_CHARS).collect(),
        }),
    };
    match error {
        Ok(error) => StreamEvent::Error(EventError::server(error)),
        Err(e) => {
            warn!(error = %e, "malformed stream error event");
            StreamEvent::Error(EventError::protocol(e))
        }
    }
}

impl<S> fmt::Debug for EventStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("config", &self.config)
            .field("subscribers", &self.registry.len())
            .field("completed", &self.completed.load(Ordering::SeqCst))
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish()
    }
}
