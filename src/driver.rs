// src/driver.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipes a generator's batches into a writer

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::generator::RecordGenerator;
use crate::sink::SinkTarget;
use crate::writer::BatchWriter;

/// Outcome of a [`materialize`] run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub records: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn records_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }

    /// Throughput in GB/s (10^9 bytes)
    pub fn gb_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs / 1e9
        } else {
            0.0
        }
    }
}

/// Write every record of `generator` through `writer`, in batches of the
/// generator's `batch_size`, then close the writer.
///
/// The writer is opened here if it is not already open, and is closed on
/// every exit path so the final partial batch is never left behind.
pub fn materialize<T: SinkTarget>(
    generator: &RecordGenerator,
    writer: &mut BatchWriter<T>,
) -> Result<RunSummary> {
    tracing::info!(
        "Materializing {} records of {} bytes ({} bytes total)",
        generator.total_records(),
        generator.record_size(),
        generator.total_bytes()
    );

    let start = Instant::now();
    writer.scoped(|w| -> Result<()> {
        for batch in generator.batched_sequence(generator.batch_size()) {
            w.write_many(batch)?;
        }
        Ok(())
    })?;
    let records = writer.written_records();

    let summary = RunSummary {
        records,
        bytes: records * generator.record_size() as u64,
        elapsed: start.elapsed(),
    };
    tracing::info!(
        "Materialized {} records in {:.2}s ({:.0} records/s)",
        summary.records,
        summary.elapsed.as_secs_f64(),
        summary.records_per_sec()
    );
    Ok(summary)
}
