//! Line sources feeding a stream
//!
//! A source yields one UTF-8 line per call, without its terminator.
//! Releasing a source is dropping it. A source that can block hands out a
//! [`CancelHandle`] so a read in progress on another thread can be
//! interrupted when the stream is disposed.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A blocking supplier of event lines
pub trait LineSource: Send {
    /// Read the next line
    ///
    /// `Ok(None)` means no data is available (end of input). A line longer
    /// than `limit` bytes may come back cut to `limit + 1` bytes; the rest
    /// of it is skipped.
    fn next_line(&mut self, limit: usize) -> io::Result<Option<String>>;

    /// Handle that interrupts a blocked [`next_line`](Self::next_line)
    ///
    /// Taken once, when the stream is built. `None` if reads cannot be
    /// interrupted.
    fn cancel_handle(&self) -> Option<CancelHandle> {
        None
    }
}

impl<L: LineSource + ?Sized> LineSource for Box<L> {
    fn next_line(&mut self, limit: usize) -> io::Result<Option<String>> {
        (**self).next_line(limit)
    }

    fn cancel_handle(&self) -> Option<CancelHandle> {
        (**self).cancel_handle()
    }
}

/// Interrupts a source from any thread
///
/// Cancelling never waits for the reader.
#[derive(Clone)]
pub struct CancelHandle(Arc<dyn Fn() + Send + Sync>);

impl CancelHandle {
    /// Wrap a cancel action, e.g. shutting down a socket
    pub fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        CancelHandle(Arc::new(cancel))
    }

    /// Run the cancel action
    pub fn cancel(&self) {
        (self.0)()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CancelHandle")
    }
}

/// Adapts any [`BufRead`] into a [`LineSource`]
///
/// Strips a trailing `\n` or `\r\n`. Invalid UTF-8 is a read error, except
/// in a line cut at the limit, where it is replaced. Once cancelled, every
/// read fails with [`io::ErrorKind::ConnectionAborted`].
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    cancelled: Arc<AtomicBool>,
    on_cancel: Option<CancelHandle>,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        LineReader {
            reader,
            cancelled: Arc::new(AtomicBool::new(false)),
            on_cancel: None,
        }
    }

    /// Also run `cancel` when the source is cancelled
    ///
    /// This is how a blocked read gets unblocked, for example by shutting
    /// down the socket behind the reader.
    pub fn with_cancel(mut self, cancel: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(CancelHandle::new(cancel));
        self
    }

    /// Give the reader back
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn check_cancelled(&self) -> io::Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "line source cancelled",
            ))
        } else {
            Ok(())
        }
    }
}

impl<R: BufRead + Send> LineSource for LineReader<R> {
    fn next_line(&mut self, limit: usize) -> io::Result<Option<String>> {
        self.check_cancelled()?;

        // Room for `limit + 1` content bytes and a `\r\n`
        let cap = limit.saturating_add(3);
        let mut line = Vec::new();
        let mut truncated = false;
        let mut read_any = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            read_any = true;

            let (used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            let keep = used.min(cap - line.len());
            line.extend_from_slice(&available[..keep]);
            truncated |= keep < used;
            self.reader.consume(used);

            self.check_cancelled()?;
            if done {
                break;
            }
        }

        if !read_any {
            return Ok(None);
        }

        if truncated {
            line.truncate(limit.saturating_add(1));
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }

        if line.ends_with(b"\n") {
            line.pop();
            if line.ends_with(b"\r") {
                line.pop();
            }
        }
        String::from_utf8(line)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn cancel_handle(&self) -> Option<CancelHandle> {
        let cancelled = Arc::clone(&self.cancelled);
        let hook = self.on_cancel.clone();
        Some(CancelHandle::new(move || {
            cancelled.store(true, Ordering::SeqCst);
            if let Some(hook) = &hook {
                hook.cancel();
            }
        }))
    }
}
