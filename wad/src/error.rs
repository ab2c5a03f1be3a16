//! Typed failures for WAD decoding.
//!
//! The propagation policy is layered: a failure in the header or the
//! directory means nothing downstream can be trusted and aborts the whole
//! decode, while a failure inside one lump of one map is recorded against
//! that lump only and siblings keep decoding.

use std::fmt;

use thiserror::Error;

/// Printable form of a 4-byte magic that may not be valid text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magic(pub [u8; 4]);

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// The primary error type for all decoding in this crate.
#[derive(Debug, Error)]
pub enum WadError {
    /// An error originating from reading the file into memory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The first four bytes are neither `IWAD` nor `PWAD`.
    #[error("not a WAD file, magic was `{0}`")]
    NotAWadFile(Magic),

    /// A declared offset/length lands outside the source buffer.
    #[error("{what}: range {offset}+{len} exceeds buffer of {buffer} bytes")]
    OutOfBounds {
        what: &'static str,
        offset: usize,
        len: usize,
        buffer: usize,
    },

    /// A fixed-shape lump is smaller than its shape requires.
    #[error("{lump} lump truncated: need {expected} bytes, have {found}")]
    TruncatedLump {
        lump: &'static str,
        expected: usize,
        found: usize,
    },

    /// A fixed-stride lump whose length is not a multiple of the stride.
    #[error("{lump} lump length {len} is not a multiple of record size {stride}")]
    BadStride {
        lump: &'static str,
        len: usize,
        stride: usize,
    },

    /// A patch column never produced its end sentinel within the watchdog
    /// limit. The column is abandoned; the rest of the patch still decodes.
    #[error("patch `{patch}` column {column} tripped the post watchdog")]
    CorruptPatchColumn { patch: String, column: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WadError>;
