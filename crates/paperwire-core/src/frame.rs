//! Password-locked printable text frames
//!
//! One frame carries one file: the bytes are xz-compressed at the frame
//! preset, PKCS7-padded to the cipher block, encrypted with AES-256-CTR,
//! Ascii85-encoded, and wrapped in `<~` .. `~>` with a CRLF terminator.
//! Every frame is self-contained; compressor, padder, and cipher state all
//! reset per file, so one line decodes without any other.

use std::io::{self, Write};

use aes::Aes256;
use block_padding::{Pkcs7, RawPadding};
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use sha2::{Digest, Sha256};

use crate::a85::{self, A85Writer};
use crate::error::{Error, Result};
use crate::xz::XzCodec;

type Aes256Ctr = Ctr128BE<Aes256>;

/// Opens a frame.
pub const FRAME_START: &[u8; 2] = b"<~";
/// Closes a frame, followed by [`LINE_ENDING`].
pub const FRAME_END: &[u8; 2] = b"~>";
/// Frame terminator, fixed regardless of platform.
pub const LINE_ENDING: &[u8; 2] = b"\r\n";

const BLOCK: usize = 16;

/// Key material derived from a password.
///
/// The SHA-256 digest of the password is the cipher key, and the digest
/// tiled to the block size (its first sixteen bytes) is the initial counter
/// block. Deriving both from one digest is a known weakness, kept so frames
/// stay interchangeable with ones already produced; treat the format as
/// locked, not as strong at-rest encryption.
#[derive(Clone)]
pub struct FrameKey {
    key: [u8; 32],
}

impl FrameKey {
    pub fn derive(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        FrameKey { key }
    }

    fn cipher(&self) -> Aes256Ctr {
        let mut iv = [0u8; BLOCK];
        iv.copy_from_slice(&self.key[..BLOCK]);
        Aes256Ctr::new(&self.key.into(), &iv.into())
    }
}

/// Cipher-and-encode tail of the seal pipeline: counts compressed bytes,
/// encrypts them in place, and streams them through the Ascii85 writer.
struct CipherSink<W: Write> {
    cipher: Aes256Ctr,
    a85: A85Writer<W>,
    total: u64,
}

impl<W: Write> Write for CipherSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut enc = buf.to_vec();
        self.cipher.apply_keystream(&mut enc);
        self.total += buf.len() as u64;
        self.a85.write_bytes(&enc)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streaming frame encoder.
///
/// Write the file bytes through it, then call [`FrameWriter::finish`] to
/// pad, seal, and emit the end marker. Dropping the writer without
/// finishing leaves a truncated frame on the sink.
pub struct FrameWriter<W: Write> {
    encoder: xz2::write::XzEncoder<CipherSink<W>>,
}

impl<W: Write> FrameWriter<W> {
    /// Write the start marker and arm the compressor/cipher chain.
    pub fn new(key: &FrameKey, mut out: W) -> io::Result<Self> {
        out.write_all(FRAME_START)?;
        let sink = CipherSink {
            cipher: key.cipher(),
            a85: A85Writer::new(out),
            total: 0,
        };
        let encoder = XzCodec::max_compression().encoder(sink)?;
        Ok(FrameWriter { encoder })
    }

    /// Flush the compressor, emit the encrypted padding and the final
    /// Ascii85 group, and close the frame.
    pub fn finish(self) -> io::Result<W> {
        let mut sink = self.encoder.finish()?;

        let used = (sink.total % BLOCK as u64) as usize;
        let mut block = [0u8; BLOCK];
        Pkcs7::raw_pad(&mut block, used);
        let pad = &mut block[used..];
        sink.cipher.apply_keystream(pad);
        sink.a85.write_bytes(pad)?;

        let mut out = sink.a85.finish()?;
        out.write_all(FRAME_END)?;
        out.write_all(LINE_ENDING)?;
        Ok(out)
    }
}

impl<W: Write> Write for FrameWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

/// Seal a whole buffer into one frame.
pub fn seal_frame(key: &FrameKey, data: &[u8]) -> Result<Vec<u8>> {
    let mut writer = FrameWriter::new(key, Vec::new())?;
    writer.write_all(data)?;
    Ok(writer.finish()?)
}

/// Decode one frame line back into the original file bytes.
///
/// The line must end with `~>` (trailing CR/LF tolerated); a leading `<~`
/// is optional, matching what lenient readers accept.
pub fn open_frame(key: &FrameKey, line: &[u8]) -> Result<Vec<u8>> {
    let body = strip_markers(line)?;
    let mut data = a85::decode(body)?;

    let mut cipher = key.cipher();
    cipher.apply_keystream(&mut data);

    if data.is_empty() || data.len() % BLOCK != 0 {
        return Err(Error::Padding);
    }
    let pad_len = {
        let tail = &data[data.len() - BLOCK..];
        let kept = Pkcs7::raw_unpad(tail).map_err(|_| Error::Padding)?;
        BLOCK - kept.len()
    };
    data.truncate(data.len() - pad_len);

    XzCodec::max_compression().decompress(&data)
}

fn strip_markers(line: &[u8]) -> Result<&[u8]> {
    let mut body = line;
    while let Some((&last, rest)) = body.split_last() {
        if last == b'\r' || last == b'\n' {
            body = rest;
        } else {
            break;
        }
    }
    let body = body
        .strip_suffix(FRAME_END)
        .ok_or_else(|| Error::Frame("missing end marker".into()))?;
    Ok(body.strip_prefix(FRAME_START).unwrap_or(body))
}
