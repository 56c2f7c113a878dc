// src/writer.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded-memory batched writer
//!
//! Records accumulate in memory until `batch_size` of them are pending, then
//! go to the sink as one contiguous write. Peak memory is therefore
//! `O(batch_size * record_size)` no matter how many records pass through.
//!
//! # Lifecycle
//!
//! ```text
//! Unopened --open()--> Open --close()--> Closed
//! ```
//!
//! `open()` on an open writer and `close()` on a closed one are no-ops.
//! `close()` always flushes first, and releases the sink even when that
//! flush fails.
//!
//! # Failure semantics
//!
//! A flush is at-most-once delivery of the pending batch. If the sink write
//! fails, the pending records and `written_records()` are left untouched and
//! the error is returned. Some bytes may already have reached the sink's own
//! buffering, so retrying `flush()` against a sink that partially accepted the
//! batch can write those bytes twice.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};

use crate::constants::*;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::sink::SinkTarget;

/// Whether the sink carries arbitrary bytes or text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkMode {
    /// Any byte record is accepted
    #[default]
    Binary,
    /// Byte records must be valid UTF-8. String records are exempt: they go
    /// through `encoding` and are written as encoded, UTF-8 or not.
    Text,
}

/// A record handed to [`BatchWriter::write`]: raw bytes, or text that the
/// writer encodes with its configured [`Encoding`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordInput<'a> {
    Bytes(Bytes),
    Text(Cow<'a, str>),
}

impl From<Bytes> for RecordInput<'_> {
    fn from(bytes: Bytes) -> Self {
        RecordInput::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RecordInput<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        RecordInput::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for RecordInput<'_> {
    fn from(bytes: &'static [u8]) -> Self {
        RecordInput::Bytes(Bytes::from_static(bytes))
    }
}

impl<'a> From<&'a str> for RecordInput<'a> {
    fn from(text: &'a str) -> Self {
        RecordInput::Text(Cow::Borrowed(text))
    }
}

impl From<String> for RecordInput<'_> {
    fn from(text: String) -> Self {
        RecordInput::Text(Cow::Owned(text))
    }
}

/// Configuration for a [`BatchWriter`]
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub mode: SinkMode,
    /// OS-level buffering hint passed to the sink on acquire
    pub buffer_size: usize,
    /// Pending records that trigger an automatic flush
    pub batch_size: usize,
    /// Used only for string records
    pub encoding: Encoding,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            mode: SinkMode::Binary,
            buffer_size: DEFAULT_BUFFER_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            encoding: Encoding::Utf8,
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Observable lifecycle phase of a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterPhase {
    Unopened,
    Open,
    Closed,
}

impl fmt::Display for WriterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriterPhase::Unopened => "unopened",
            WriterPhase::Open => "open",
            WriterPhase::Closed => "closed",
        })
    }
}

struct OpenSink<H> {
    handle: H,
    started: Instant,
}

enum State<H> {
    Unopened,
    Open(OpenSink<H>),
    Closed,
}

/// Accumulates records and writes them to a sink in batches
pub struct BatchWriter<T: SinkTarget> {
    target: T,
    config: WriterConfig,
    state: State<T::Handle>,
    pending: Vec<Bytes>,
    // Reused across flushes; holds at most one batch
    scratch: BytesMut,
    written: u64,
    observer: Option<Box<dyn ProgressObserver>>,
}

impl<T: SinkTarget> BatchWriter<T> {
    /// Create an unopened writer. Nothing is acquired until [`open`](Self::open).
    pub fn new(target: T, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            target,
            config,
            state: State::Unopened,
            pending: Vec::new(),
            scratch: BytesMut::new(),
            written: 0,
            observer: None,
        })
    }

    /// Register an observer called after every successful flush
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: ProgressObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: ProgressObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Acquire the sink and start the clock. No-op if already open.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            State::Open(_) => return Ok(()),
            State::Closed => {
                return Err(Error::InvalidState {
                    operation: "open",
                    phase: WriterPhase::Closed,
                })
            }
            State::Unopened => {}
        }

        let handle = self.target.acquire(self.config.buffer_size)?;
        self.pending.clear();
        self.pending.reserve(self.config.batch_size);
        self.written = 0;
        self.state = State::Open(OpenSink {
            handle,
            started: Instant::now(),
        });

        tracing::info!(
            "BatchWriter opened: mode={:?}, batch_size={}, buffer_size={}, encoding={}",
            self.config.mode,
            self.config.batch_size,
            self.config.buffer_size,
            self.config.encoding
        );
        Ok(())
    }

    /// Buffer one record, flushing if the batch is now full.
    ///
    /// `&str` and `String` records are encoded with the configured encoding;
    /// byte records are buffered as they are.
    pub fn write<'a>(&mut self, record: impl Into<RecordInput<'a>>) -> Result<()> {
        self.ensure_open("write")?;
        let record = match record.into() {
            RecordInput::Bytes(bytes) => {
                if self.config.mode == SinkMode::Text && std::str::from_utf8(&bytes).is_err() {
                    return Err(Error::NotText);
                }
                bytes
            }
            RecordInput::Text(text) => self.config.encoding.encode(&text)?,
        };
        self.push(record)
    }

    /// Same as [`write`](Self::write) with a string record
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write(text)
    }

    /// Write each record in order; may flush several times mid-call
    pub fn write_many<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<RecordInput<'a>>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Force pending records to the sink. No-op when nothing is pending.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open("flush")?;
        self.flush_pending()
    }

    /// Flush, then release the sink. Idempotent.
    ///
    /// The sink is released even if the final flush fails; the flush error is
    /// returned afterwards and the records it could not write are dropped.
    pub fn close(&mut self) -> Result<()> {
        if !matches!(self.state, State::Open(_)) {
            return Ok(());
        }

        let flushed = self.flush_pending();

        let State::Open(mut open) = std::mem::replace(&mut self.state, State::Closed) else {
            return flushed;
        };
        let released = open.handle.flush();
        let elapsed = open.started.elapsed();
        drop(open);

        if !self.pending.is_empty() {
            tracing::warn!(
                "BatchWriter closed with {} unwritten records after a failed flush",
                self.pending.len()
            );
            self.pending.clear();
        }
        self.scratch = BytesMut::new();

        tracing::info!(
            "BatchWriter closed: written={}, elapsed={:.3}s",
            self.written,
            elapsed.as_secs_f64()
        );

        match (flushed, released) {
            (Err(e), released) => {
                if let Err(release_err) = released {
                    tracing::warn!(
                        "Releasing sink after failed flush also failed: {}",
                        release_err
                    );
                }
                Err(e)
            }
            (Ok(()), Err(e)) => Err(Error::Sink(e)),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    /// Run `f` with the writer open and always close it afterwards.
    ///
    /// If `f` fails, its error is returned and a close failure is only logged.
    /// Otherwise a close failure is returned.
    pub fn scoped<R, E, F>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        self.open()?;
        match f(self) {
            Ok(value) => {
                self.close()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(close_err) = self.close() {
                    tracing::warn!("Close after failed scope also failed: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Records successfully flushed since open
    pub fn written_records(&self) -> u64 {
        self.written
    }

    /// Records buffered but not yet flushed
    pub fn pending_records(&self) -> usize {
        self.pending.len()
    }

    pub fn phase(&self) -> WriterPhase {
        match self.state {
            State::Unopened => WriterPhase::Unopened,
            State::Open(_) => WriterPhase::Open,
            State::Closed => WriterPhase::Closed,
        }
    }

    /// Time since open, `None` unless open
    pub fn elapsed(&self) -> Option<Duration> {
        match &self.state {
            State::Open(open) => Some(open.started.elapsed()),
            _ => None,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        match self.phase() {
            WriterPhase::Open => Ok(()),
            phase => Err(Error::InvalidState { operation, phase }),
        }
    }

    fn push(&mut self, record: Bytes) -> Result<()> {
        tracing::trace!("Buffering record of {} bytes", record.len());
        self.pending.push(record);
        if self.pending.len() >= self.config.batch_size {
            self.flush_pending()?;
        }
        Ok(())
    }

    /// The only place that touches the sink
    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let phase = self.phase();
        let State::Open(open) = &mut self.state else {
            return Err(Error::InvalidState {
                operation: "flush",
                phase,
            });
        };

        self.scratch.clear();
        self.scratch
            .reserve(self.pending.iter().map(Bytes::len).sum::<usize>());
        for record in &self.pending {
            self.scratch.extend_from_slice(record);
        }

        // Counters advance only once the whole batch is accepted
        open.handle.write_all(&self.scratch)?;

        let count = self.pending.len();
        self.written += count as u64;
        self.pending.clear();

        tracing::debug!(
            "Flushed {} records ({} bytes), written={}",
            count,
            self.scratch.len(),
            self.written
        );

        if let Some(observer) = self.observer.as_mut() {
            observer.on_flush(ProgressEvent {
                written: self.written,
                elapsed: open.started.elapsed(),
            });
        }
        Ok(())
    }
}

impl<T: SinkTarget> Drop for BatchWriter<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("BatchWriter dropped while open; close failed: {}", e);
        }
    }
}

impl<T: SinkTarget> fmt::Debug for BatchWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchWriter")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("pending", &self.pending.len())
            .field("written", &self.written)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
