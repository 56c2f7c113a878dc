// src/error.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type shared by the generator and the batch writer.
//!
//! Nothing here is recovered internally. Every variant surfaces to the caller,
//! who decides whether to retry a flush, close, or abort.

use std::io;

use crate::encoding::Encoding;
use crate::writer::WriterPhase;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `record_size` cannot hold the prefix of the largest index plus the terminator.
    #[error(
        "record_size {record_size} is too small: index {index} needs at least {required} bytes"
    )]
    RecordTooSmall {
        record_size: usize,
        required: usize,
        index: u64,
    },

    /// Any other rejected configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A record was requested for an index the generator does not produce.
    #[error("index {index} out of range for {total_records} records")]
    IndexOutOfRange { index: u64, total_records: u64 },

    /// An operation was invoked on a writer that is not open.
    #[error("cannot {operation} a writer in {phase} phase")]
    InvalidState {
        operation: &'static str,
        phase: WriterPhase,
    },

    /// The underlying sink failed to open, write, flush or close.
    #[error("sink I/O error: {0}")]
    Sink(#[from] io::Error),

    /// A string record cannot be represented in the configured encoding.
    #[error("cannot encode record as {encoding}: {detail}")]
    Encoding { encoding: Encoding, detail: String },

    /// A byte record that is not valid UTF-8 was handed to a text-mode sink.
    #[error("text-mode sink rejected a record that is not valid UTF-8")]
    NotText,
}

impl Error {
    /// True for errors caused by misconfiguration, detected before any I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::RecordTooSmall { .. } | Error::InvalidConfig(_))
    }
}
