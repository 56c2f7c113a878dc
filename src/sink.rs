// src/sink.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte sinks the batch writer can acquire
//!
//! A [`SinkTarget`] is not itself written to. The writer asks it for a handle
//! when it opens, owns that handle exclusively while open, and drops it on
//! close.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Something that can hand out a fresh writable handle
pub trait SinkTarget {
    type Handle: Write;

    /// Acquire the sink. `buffer_size` is a hint for the handle's own
    /// OS-level write buffering; targets may ignore it.
    fn acquire(&mut self, buffer_size: usize) -> io::Result<Self::Handle>;
}

/// Any `FnMut(buffer_size) -> io::Result<W>` is a target
impl<F, W> SinkTarget for F
where
    F: FnMut(usize) -> io::Result<W>,
    W: Write,
{
    type Handle = W;

    fn acquire(&mut self, buffer_size: usize) -> io::Result<W> {
        self(buffer_size)
    }
}

/// A file created (or truncated) on acquire and wrapped in a `BufWriter`
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    append: bool,
}

impl FileSink {
    /// Truncate on open
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append: false,
        }
    }

    /// Append on open, keeping existing content
    pub fn appending<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SinkTarget for FileSink {
    type Handle = BufWriter<File>;

    fn acquire(&mut self, buffer_size: usize) -> io::Result<BufWriter<File>> {
        let mut options = OpenOptions::new();
        options.create(true);
        if self.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options.open(&self.path)?;

        tracing::debug!(
            "Acquired file sink {} (append={}, buffer_size={})",
            self.path.display(),
            self.append,
            buffer_size
        );
        Ok(BufWriter::with_capacity(buffer_size.max(1), file))
    }
}
