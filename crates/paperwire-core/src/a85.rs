//! Ascii85 codec for the text-frame channel
//!
//! Four input bytes become one base-85 group of five printable characters
//! (`!`..`u`); an all-zero group folds to the single character `z`. A short
//! final group is zero-padded before encoding and the surplus characters
//! dropped, so `n` trailing bytes cost `n + 1` characters. Decoding accepts
//! the same dialect other tools emit for these frames: interior whitespace
//! is skipped, `z` is legal only on a group boundary, and a short final
//! group is completed with `u` characters before the surplus decoded bytes
//! are dropped.

use std::io::{self, Write};

use crate::error::{Error, Result};

const GROUP_ZERO: u8 = b'z';
const CHAR_LOW: u8 = b'!';
const CHAR_HIGH: u8 = b'u';

fn encode_group(word: u32) -> [u8; 5] {
    let mut out = [0u8; 5];
    let mut w = word;
    for slot in out.iter_mut().rev() {
        *slot = (w % 85) as u8 + CHAR_LOW;
        w /= 85;
    }
    out
}

/// Encode a buffer, folding zero groups and truncating the final group.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 4 * 5 + 5);
    let rem = data.len() % 4;
    let full = data.len() - rem;

    for quad in data[..full].chunks_exact(4) {
        let word = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
        if word == 0 {
            out.push(GROUP_ZERO);
        } else {
            out.extend_from_slice(&encode_group(word));
        }
    }

    if rem > 0 {
        let mut quad = [0u8; 4];
        quad[..rem].copy_from_slice(&data[full..]);
        let group = encode_group(u32::from_be_bytes(quad));
        out.extend_from_slice(&group[..rem + 1]);
    }

    out
}

/// Decode an encoded body (markers already stripped).
pub fn decode(text: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() / 5 * 4 + 4);
    let mut group = [0u8; 5];
    let mut filled = 0usize;

    // Trailing `u` padding completes a short final group; the surplus
    // decoded bytes come off again below.
    for &c in text.iter().chain(b"uuuu") {
        match c {
            CHAR_LOW..=CHAR_HIGH => {
                group[filled] = c;
                filled += 1;
                if filled == 5 {
                    let mut acc: u64 = 0;
                    for &g in &group {
                        acc = acc * 85 + u64::from(g - CHAR_LOW);
                    }
                    if acc > u64::from(u32::MAX) {
                        return Err(Error::Ascii85("group value overflow".into()));
                    }
                    out.extend_from_slice(&(acc as u32).to_be_bytes());
                    filled = 0;
                }
            }
            GROUP_ZERO => {
                if filled != 0 {
                    return Err(Error::Ascii85("z inside group".into()));
                }
                out.extend_from_slice(&[0, 0, 0, 0]);
            }
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' => {}
            other => {
                return Err(Error::Ascii85(format!(
                    "invalid character 0x{other:02x}"
                )));
            }
        }
    }

    let surplus = 4 - filled;
    out.truncate(out.len() - surplus);
    Ok(out)
}

/// Streaming encoder that keeps groups aligned to the start of the byte
/// stream: whole 4-byte slabs are encoded as they arrive, at most three
/// bytes carry over to the next write.
pub struct A85Writer<W: Write> {
    out: W,
    carry: Vec<u8>,
}

impl<W: Write> A85Writer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            carry: Vec::with_capacity(4),
        }
    }

    /// Encode `data`, buffering any unaligned tail.
    pub fn write_bytes(&mut self, mut data: &[u8]) -> io::Result<()> {
        if !self.carry.is_empty() {
            let take = (4 - self.carry.len()).min(data.len());
            self.carry.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.carry.len() < 4 {
                return Ok(());
            }
            self.out.write_all(&encode(&self.carry))?;
            self.carry.clear();
        }

        let aligned = data.len() & !3;
        if aligned > 0 {
            self.out.write_all(&encode(&data[..aligned]))?;
        }
        self.carry.extend_from_slice(&data[aligned..]);
        Ok(())
    }

    /// Emit the final short group, if any, and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.carry.is_empty() {
            self.out.write_all(&encode(&self.carry))?;
        }
        Ok(self.out)
    }
}
