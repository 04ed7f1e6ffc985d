//! Error types for the paperwire codecs

use std::io;

use thiserror::Error;

use crate::capacity::EcLevel;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while chunking, framing, or restoring streams.
#[derive(Error, Debug)]
pub enum Error {
    /// A transport unit held no parseable decimal payload. Collectors treat
    /// this as a skip, not an abort.
    #[error("no decimal payload in unit")]
    MalformedPayload,

    #[error("no chunks recovered, nothing to reassemble")]
    NoChunks,

    /// The recovered index set is not the contiguous range `1..=N`.
    #[error("missing chunk indexes {missing:?}")]
    MissingChunks { missing: Vec<u8> },

    /// The stream needs more chunks than a single index byte can address.
    #[error("stream exceeds {max} chunks at {capacity} bytes per chunk")]
    TooManyChunks { max: usize, capacity: usize },

    #[error("chunk capacity must be at least 1 byte")]
    InvalidChunkCapacity,

    #[error("no usable payload capacity at level {level} version {version}")]
    NoCapacity { level: EcLevel, version: u8 },

    #[error("compressed stream corrupt: {0}")]
    Stream(String),

    #[error("ascii85 decode failed: {0}")]
    Ascii85(String),

    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("bad block padding")]
    Padding,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
