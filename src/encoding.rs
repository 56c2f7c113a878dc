// src/encoding.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-to-bytes encoding for string records handed to the writer

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};

/// Encoding applied by [`BatchWriter::write_str`](crate::BatchWriter::write_str)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Rust strings are already UTF-8; encoding is a copy
    #[default]
    Utf8,
    /// 7-bit ASCII; any other character is rejected
    Ascii,
    /// ISO-8859-1; code points above U+00FF are rejected
    Latin1,
}

impl Encoding {
    /// Encode `text` into an owned byte record
    pub fn encode(self, text: &str) -> Result<Bytes> {
        match self {
            Encoding::Utf8 => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Encoding::Ascii => match text.char_indices().find(|(_, c)| !c.is_ascii()) {
                None => Ok(Bytes::copy_from_slice(text.as_bytes())),
                Some((pos, c)) => Err(self.unencodable(c, pos)),
            },
            Encoding::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for (pos, c) in text.char_indices() {
                    let code = u32::from(c);
                    if code > 0xFF {
                        return Err(self.unencodable(c, pos));
                    }
                    out.push(code as u8);
                }
                Ok(Bytes::from(out))
            }
        }
    }

    fn unencodable(self, c: char, pos: usize) -> Error {
        Error::Encoding {
            encoding: self,
            detail: format!("character {c:?} at byte offset {pos} is not representable"),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
        })
    }
}
