// src/constants.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Default size of one record in bytes, terminator included
pub const DEFAULT_RECORD_SIZE: usize = 500;

/// Default number of records accumulated before a flush (and per generated batch)
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default OS-level write buffering hint for file sinks (1 MiB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Marker token written after the index in every record prefix
pub const DEFAULT_MARKER: &str = "TEST_DATA";

/// Separates the index from the marker, and the marker from the filler
pub const FIELD_SEPARATOR: char = ',';

/// Default filler byte used to pad records up to `record_size`
pub const DEFAULT_FILLER: u8 = b'x';

/// Last byte of every record
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Alphabet used by seeded filler; keeps records printable
pub const SEEDED_FILLER_ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
