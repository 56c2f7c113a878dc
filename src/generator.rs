// src/generator.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic fixed-length record synthesis
//!
//! Every record is a pure function of its index and the generator config:
//!
//! ```text
//! <index>,<marker>,<filler ...><terminator>
//! ```
//!
//! so any record can be regenerated on demand and every sequence restarts
//! from index 0 without retained cursor state.

use std::iter::FusedIterator;

use bytes::{BufMut, Bytes, BytesMut};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::constants::*;
use crate::error::{Error, Result};

/// How the padding between prefix and terminator is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filler {
    /// Repeat one byte (the classic `xxxx...` run)
    Repeat(u8),
    /// Lowercase ASCII drawn from Xoshiro256++ seeded with `seed + index`
    Seeded(u64),
}

impl Default for Filler {
    fn default() -> Self {
        Filler::Repeat(DEFAULT_FILLER)
    }
}

/// Configuration for record generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of records in a full sequence
    pub total_records: u64,
    /// Exact size of every record in bytes, terminator included
    pub record_size: usize,
    /// Records per batch for consumers that want a default chunking
    pub batch_size: usize,
    /// Token written after the index in each prefix
    pub marker: String,
    /// Padding strategy
    pub filler: Filler,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            total_records: 0,
            record_size: DEFAULT_RECORD_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            marker: DEFAULT_MARKER.to_string(),
            filler: Filler::default(),
        }
    }
}

impl GeneratorConfig {
    /// Check the config eagerly, before any record is produced.
    ///
    /// The prefix grows with the digit count of the index, so the size check
    /// runs against the largest index (`total_records - 1`), not index 0.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if self.marker.is_empty() {
            return Err(Error::InvalidConfig("marker must not be empty".into()));
        }
        if self.marker.contains(FIELD_SEPARATOR) {
            return Err(Error::InvalidConfig(format!(
                "marker {:?} must not contain the field separator {:?}",
                self.marker, FIELD_SEPARATOR
            )));
        }
        if self.marker.as_bytes().contains(&RECORD_TERMINATOR) {
            return Err(Error::InvalidConfig(
                "marker must not contain the record terminator".into(),
            ));
        }
        if self.filler == Filler::Repeat(RECORD_TERMINATOR) {
            return Err(Error::InvalidConfig(
                "filler byte must differ from the record terminator".into(),
            ));
        }

        if let Some(largest) = self.total_records.checked_sub(1) {
            // +1 for the terminator
            let required = prefix_len(largest, &self.marker) + 1;
            if self.record_size < required {
                return Err(Error::RecordTooSmall {
                    record_size: self.record_size,
                    required,
                    index: largest,
                });
            }
        }

        if self.total_records.checked_mul(self.record_size as u64).is_none() {
            return Err(Error::InvalidConfig(format!(
                "{} records of {} bytes overflow the output length",
                self.total_records, self.record_size
            )));
        }

        Ok(())
    }
}

/// Length of `"<index>,<marker>,"` in bytes
fn prefix_len(index: u64, marker: &str) -> usize {
    decimal_digits(index) + marker.len() + 2 * FIELD_SEPARATOR.len_utf8()
}

fn decimal_digits(n: u64) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

/// Append the decimal form of `n` without going through a heap `String`
fn put_decimal(buf: &mut BytesMut, mut n: u64) {
    let mut digits = [0u8; 20];
    let mut pos = digits.len();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.put_slice(&digits[pos..]);
}

/// Produces deterministic fixed-size records for indices `0..total_records`
#[derive(Debug, Clone)]
pub struct RecordGenerator {
    total_records: u64,
    record_size: usize,
    batch_size: usize,
    marker: String,
    filler: Filler,
}

impl RecordGenerator {
    /// Create a generator, failing with a configuration error if any record
    /// could not fit in `record_size`.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "Creating RecordGenerator: total_records={}, record_size={}, batch_size={}, marker={}, filler={:?}",
            config.total_records,
            config.record_size,
            config.batch_size,
            config.marker,
            config.filler
        );

        Ok(Self {
            total_records: config.total_records,
            record_size: config.record_size,
            batch_size: config.batch_size,
            marker: config.marker,
            filler: config.filler,
        })
    }

    /// Simple API: default marker, filler and batch size
    ///
    /// # Example
    /// ```rust
    /// use synthrec::RecordGenerator;
    ///
    /// let gen = RecordGenerator::simple(1000, 64).unwrap();
    /// let first = gen.generate(0).unwrap();
    /// assert_eq!(first.len(), 64);
    /// assert!(first.starts_with(b"0,TEST_DATA,"));
    /// ```
    pub fn simple(total_records: u64, record_size: usize) -> Result<Self> {
        Self::new(GeneratorConfig {
            total_records,
            record_size,
            ..GeneratorConfig::default()
        })
    }

    /// Return the record for `index`.
    ///
    /// Calling this twice with the same index yields byte-identical output.
    pub fn generate(&self, index: u64) -> Result<Bytes> {
        if index >= self.total_records {
            return Err(Error::IndexOutOfRange {
                index,
                total_records: self.total_records,
            });
        }
        Ok(self.render(index))
    }

    /// Build one record. Callers guarantee `index < total_records`, which
    /// `validate()` has proven fits in `record_size`.
    fn render(&self, index: u64) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.record_size);

        put_decimal(&mut buf, index);
        buf.put_u8(FIELD_SEPARATOR as u8);
        buf.put_slice(self.marker.as_bytes());
        buf.put_u8(FIELD_SEPARATOR as u8);

        let padding = self.record_size - buf.len() - 1;
        match self.filler {
            Filler::Repeat(byte) => buf.put_bytes(byte, padding),
            Filler::Seeded(seed) => {
                // Same seed + same index -> identical filler
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(index));
                let start = buf.len();
                buf.resize(start + padding, 0);
                rng.fill_bytes(&mut buf[start..]);
                for b in &mut buf[start..] {
                    *b = SEEDED_FILLER_ALPHABET[(*b as usize) % SEEDED_FILLER_ALPHABET.len()];
                }
            }
        }
        buf.put_u8(RECORD_TERMINATOR);

        tracing::trace!("render: index={}, padding={}", index, padding);
        debug_assert_eq!(buf.len(), self.record_size);
        buf.freeze()
    }

    /// Lazy sequence of every record, in index order
    pub fn sequence(&self) -> Records<'_> {
        Records {
            generator: self,
            next: 0,
            end: self.total_records,
        }
    }

    /// Lazy sequence of records grouped into chunks of at most `batch_size`.
    ///
    /// Grouping never changes byte content; the last chunk may be shorter.
    pub fn batched_sequence(&self, batch_size: usize) -> Batches<'_> {
        Batches {
            records: self.sequence(),
            batch_size: batch_size.max(1),
        }
    }

    /// Length of the textual prefix for `index`
    pub fn prefix_len(&self, index: u64) -> usize {
        prefix_len(index, &self.marker)
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Batch size from the config, for drivers that do not pick their own
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Exact output length of a full sequence
    pub fn total_bytes(&self) -> u64 {
        self.total_records * self.record_size as u64
    }
}

/// Iterator over records in index order. See [`RecordGenerator::sequence`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    generator: &'a RecordGenerator,
    next: u64,
    end: u64,
}

impl Records<'_> {
    /// Index of the next record to be produced
    pub fn position(&self) -> u64 {
        self.next
    }

    /// Records left to produce
    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }
}

impl Iterator for Records<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.next >= self.end {
            return None;
        }
        let record = self.generator.render(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Records<'_> {}

/// Iterator over bounded chunks of records. See [`RecordGenerator::batched_sequence`].
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    records: Records<'a>,
    batch_size: usize,
}

impl Iterator for Batches<'_> {
    type Item = Vec<Bytes>;

    fn next(&mut self) -> Option<Vec<Bytes>> {
        // Bounded by batch_size, so the narrowing is lossless
        let len = self.records.remaining().min(self.batch_size as u64) as usize;
        if len == 0 {
            return None;
        }
        let mut batch = Vec::with_capacity(len);
        batch.extend(self.records.by_ref().take(len));
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches = self.records.remaining().div_ceil(self.batch_size as u64);
        match usize::try_from(batches) {
            Ok(batches) => (batches, Some(batches)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Batches<'_> {}
