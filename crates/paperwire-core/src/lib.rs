//! Paperwire Core - Chunk codec, capacity tables, and crypto framing
//!
//! This crate contains the byte-level machinery shared by all Paperwire
//! tools. It has no dependencies on image handling or terminal code.

pub mod a85;
pub mod archive;
pub mod capacity;
pub mod chunk;
pub mod error;
pub mod frame;
pub mod xz;

pub use archive::{unpack_stream, ArchiveWriter};
pub use capacity::{CapacityParams, EcLevel, MAX_VERSION, MIN_VERSION};
pub use chunk::{Chunk, ChunkEncoder, ChunkSet, MAX_CHUNKS};
pub use error::*;
pub use frame::{open_frame, seal_frame, FrameKey, FrameWriter};
pub use xz::{XzCodec, ARCHIVE_PRESET, FRAME_PRESET};
