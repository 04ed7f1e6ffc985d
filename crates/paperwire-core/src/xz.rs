//! XZ stream compression with SHA-256 integrity trailers
//!
//! Both pipelines funnel their payload through this codec: the chunk
//! pipeline compresses the tar stream at a balanced preset, the text-frame
//! pipeline trades time for ratio. Decoding rejects any stream whose
//! trailer digest does not match, which is what catches out-of-order or
//! tampered chunk payloads.

use std::io::{self, Read, Write};

use xz2::read::XzDecoder;
use xz2::stream::{Check, Stream};
use xz2::write::XzEncoder;

use crate::error::{Error, Result};

/// Preset for the chunk pipeline (balanced speed/ratio).
pub const ARCHIVE_PRESET: u32 = 6;
/// Preset for text frames, where ratio matters more than time.
pub const FRAME_PRESET: u32 = 9;

/// XZ codec with a fixed preset and a SHA-256 trailer check.
#[derive(Debug, Clone, Copy)]
pub struct XzCodec {
    /// Compression preset (0-9)
    preset: u32,
}

impl XzCodec {
    /// Codec at the chunk-pipeline preset.
    pub fn new() -> Self {
        Self {
            preset: ARCHIVE_PRESET,
        }
    }

    /// Codec at a custom preset (clamped to 0..=9).
    pub fn with_preset(preset: u32) -> Self {
        Self {
            preset: preset.min(9),
        }
    }

    /// Codec at the text-frame preset.
    pub fn max_compression() -> Self {
        Self::with_preset(FRAME_PRESET)
    }

    /// Get the compression preset.
    pub fn preset(&self) -> u32 {
        self.preset
    }

    /// Streaming encoder writing compressed bytes into `out`.
    pub fn encoder<W: Write>(&self, out: W) -> io::Result<XzEncoder<W>> {
        let stream = Stream::new_easy_encoder(self.preset, Check::Sha256)?;
        Ok(XzEncoder::new_stream(out, stream))
    }

    /// Streaming decoder reading compressed bytes from `input`.
    pub fn decoder<R: Read>(&self, input: R) -> io::Result<XzDecoder<R>> {
        let stream = Stream::new_stream_decoder(u64::MAX, 0)?;
        Ok(XzDecoder::new_stream(input, stream))
    }

    /// Compress a whole buffer in one pass.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = self.encoder(Vec::with_capacity(data.len() / 2 + 64))?;
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    /// Decompress a whole buffer in one pass.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decompress_to(data, &mut out)?;
        Ok(out)
    }

    /// Streaming decompression into `out`; returns bytes written.
    ///
    /// Decoder failures (bad magic, truncation, trailer mismatch) surface as
    /// [`Error::Stream`]; failures writing `out` stay I/O errors.
    pub fn decompress_to<W: Write>(&self, data: &[u8], out: &mut W) -> Result<u64> {
        let mut decoder = self.decoder(data)?;
        let mut buf = [0u8; 8192];
        let mut total = 0u64;
        loop {
            let n = decoder
                .read(&mut buf)
                .map_err(|e| Error::Stream(e.to_string()))?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])?;
            total += n as u64;
        }
        Ok(total)
    }
}

impl Default for XzCodec {
    fn default() -> Self {
        Self::new()
    }
}
