// src/lib.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic fixed-length test data, written with bounded memory
//!
//! This library provides:
//! - Reproducible records (`<index>,TEST_DATA,xxxx...\n`) of an exact size
//! - Lazy, restartable record and batch sequences
//! - A batched writer that flushes whole batches as single sink writes
//! - Per-flush progress callbacks with written count and elapsed time

// Core modules
pub mod constants;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod generator;
pub mod progress;
pub mod sink;
pub mod writer;

// Re-export main API
pub use driver::{materialize, RunSummary};
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use generator::{Batches, Filler, GeneratorConfig, RecordGenerator, Records};
pub use progress::{LogProgress, ProgressEvent, ProgressObserver};
pub use sink::{FileSink, SinkTarget};
pub use writer::{BatchWriter, RecordInput, SinkMode, WriterConfig, WriterPhase};
