//! Chunk framing and strict-order reassembly
//!
//! A chunk is a capacity-sized window of the compressed stream with a
//! one-byte index in front. Its transportable form is the big-endian
//! integer value of `index .. payload` rendered as a decimal string, which
//! fits QR numeric mode. The leading index byte is always nonzero, so the
//! rendering loses no leading zeros.
//!
//! Reassembly is the mirror image: parse each recovered digit string back
//! into `(index, payload)`, collect into a [`ChunkSet`], then demand the
//! index set be exactly `1..=N` before concatenating payloads in order.

use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::error::{Error, Result};

/// Hard ceiling on chunks per stream; the index must fit one byte and
/// index zero is reserved as unusable.
pub const MAX_CHUNKS: usize = 255;

/// An indexed slice of the compressed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the stream, 1-based. Never zero.
    pub index: u8,

    /// Window of the compressed stream, at most one capacity's worth.
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Render the transportable decimal form: `index .. payload` read as a
    /// big-endian unsigned integer, in base 10.
    pub fn digits(&self) -> String {
        let mut bytes = Vec::with_capacity(1 + self.payload.len());
        bytes.push(self.index);
        bytes.extend_from_slice(&self.payload);
        BigUint::from_bytes_be(&bytes).to_str_radix(10)
    }

    /// Parse a recovered digit string back into a chunk.
    ///
    /// The string must be non-empty decimal with a nonzero value; the
    /// minimal big-endian form of that value is `index .. payload`.
    pub fn from_digits(digits: &str) -> Result<Chunk> {
        let value =
            BigUint::parse_bytes(digits.as_bytes(), 10).ok_or(Error::MalformedPayload)?;
        if value.bits() == 0 {
            return Err(Error::MalformedPayload);
        }
        let bytes = value.to_bytes_be();
        Ok(Chunk {
            index: bytes[0],
            payload: bytes[1..].to_vec(),
        })
    }
}

/// Splits a compressed stream into indexed chunks.
///
/// The index-space check runs up front: a stream needing more than
/// [`MAX_CHUNKS`] windows is rejected by [`ChunkEncoder::new`] before a
/// single chunk exists. Iteration itself cannot fail.
#[derive(Debug, Clone)]
pub struct ChunkEncoder<'a> {
    data: &'a [u8],
    capacity: usize,
    cursor: usize,
    next_index: usize,
}

impl<'a> ChunkEncoder<'a> {
    pub fn new(data: &'a [u8], capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidChunkCapacity);
        }
        if data.len().div_ceil(capacity) > MAX_CHUNKS {
            return Err(Error::TooManyChunks {
                max: MAX_CHUNKS,
                capacity,
            });
        }
        Ok(ChunkEncoder {
            data,
            capacity,
            cursor: 0,
            next_index: 1,
        })
    }

    /// Number of chunks the stream will produce.
    pub fn total_chunks(&self) -> usize {
        self.data.len().div_ceil(self.capacity)
    }
}

impl Iterator for ChunkEncoder<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.cursor >= self.data.len() {
            return None;
        }
        let end = usize::min(self.cursor + self.capacity, self.data.len());
        let payload = self.data[self.cursor..end].to_vec();
        self.cursor = end;
        let index = self.next_index as u8;
        self.next_index += 1;
        Some(Chunk { index, payload })
    }
}

/// Chunks recovered from one input source, keyed by index.
///
/// Discovery order does not matter and a re-scanned index silently replaces
/// the earlier payload. Completeness is checked once, when the caller is
/// done collecting.
#[derive(Debug, Default)]
pub struct ChunkSet {
    chunks: BTreeMap<u8, Vec<u8>>,
}

impl ChunkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Insert a chunk, returning the payload it replaced, if any.
    pub fn insert(&mut self, chunk: Chunk) -> Option<Vec<u8>> {
        self.chunks.insert(chunk.index, chunk.payload)
    }

    /// Parse a digit string and insert it; returns the index on success.
    pub fn insert_digits(&mut self, digits: &str) -> Result<u8> {
        let chunk = Chunk::from_digits(digits)?;
        let index = chunk.index;
        self.insert(chunk);
        Ok(index)
    }

    /// Indices in `1..=N` that are absent, sorted ascending.
    pub fn missing_indexes(&self) -> Vec<u8> {
        let n = self.chunks.len().min(MAX_CHUNKS) as u8;
        (1..=n).filter(|i| !self.chunks.contains_key(i)).collect()
    }

    /// Enforce the completeness invariant: the key set must be exactly
    /// `1..=N` for `N` collected chunks.
    pub fn verify_complete(&self) -> Result<()> {
        if self.chunks.is_empty() {
            return Err(Error::NoChunks);
        }
        let missing = self.missing_indexes();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingChunks { missing })
        }
    }

    /// Concatenate payloads in strictly ascending index order.
    ///
    /// Fails without producing any bytes if the set is incomplete.
    pub fn reassemble(self) -> Result<Vec<u8>> {
        self.verify_complete()?;
        let total = self.chunks.values().map(|p| p.len()).sum();
        let mut stream = Vec::with_capacity(total);
        for payload in self.chunks.into_values() {
            stream.extend_from_slice(&payload);
        }
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_chunks(data: &[u8], capacity: usize) -> Vec<Chunk> {
        ChunkEncoder::new(data, capacity).unwrap().collect()
    }

    #[test]
    fn test_encode_windows_and_indexes() {
        let data = vec![0xabu8; 250];
        let chunks = collect_chunks(&data, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].index, 1);
        assert_eq!(chunks[0].payload.len(), 100);
        assert_eq!(chunks[1].index, 2);
        assert_eq!(chunks[2].index, 3);
        assert_eq!(chunks[2].payload.len(), 50);
    }

    #[test]
    fn test_encode_empty_stream() {
        assert!(collect_chunks(&[], 16).is_empty());
        assert_eq!(ChunkEncoder::new(&[], 16).unwrap().total_chunks(), 0);
    }

    #[test]
    fn test_encoder_is_restartable() {
        let data = vec![7u8; 64];
        let encoder = ChunkEncoder::new(&data, 10).unwrap();
        assert_eq!(encoder.clone().count(), 7);
        assert_eq!(encoder.count(), 7);
    }

    #[test]
    fn test_decimal_rendering_pinned() {
        let chunk = Chunk {
            index: 1,
            payload: b"ABC".to_vec(),
        };
        assert_eq!(chunk.digits(), "21054019");

        let chunk = Chunk {
            index: 1,
            payload: vec![0, 255],
        };
        assert_eq!(chunk.digits(), "65791");

        // Zero bytes in the payload survive thanks to the leading index.
        let chunk = Chunk {
            index: 1,
            payload: vec![0, 0, 0, 0],
        };
        assert_eq!(chunk.digits(), "4294967296");

        let chunk = Chunk {
            index: 255,
            payload: vec![],
        };
        assert_eq!(chunk.digits(), "255");
    }

    #[test]
    fn test_digits_roundtrip() {
        let original = Chunk {
            index: 42,
            payload: vec![0, 1, 2, 0, 254, 255, 0],
        };
        let parsed = Chunk::from_digits(&original.digits()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Chunk::from_digits("").is_err());
        assert!(Chunk::from_digits("12a3").is_err());
        assert!(Chunk::from_digits("-5").is_err());
        // Zero has no index byte.
        assert!(Chunk::from_digits("0").is_err());
    }

    #[test]
    fn test_index_space_exhaustion() {
        // 255 one-byte windows is the largest legal stream.
        let data = vec![1u8; 255];
        let chunks = collect_chunks(&data, 1);
        assert_eq!(chunks.len(), 255);
        assert_eq!(chunks.last().unwrap().index, 255);

        // One more byte would need index 256; refused before any chunk.
        let data = vec![1u8; 256];
        match ChunkEncoder::new(&data, 1) {
            Err(Error::TooManyChunks { max, capacity }) => {
                assert_eq!(max, 255);
                assert_eq!(capacity, 1);
            }
            other => panic!("expected TooManyChunks, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ChunkEncoder::new(b"x", 0),
            Err(Error::InvalidChunkCapacity)
        ));
    }

    #[test]
    fn test_missing_index_detection() {
        let mut set = ChunkSet::new();
        for index in [1u8, 2, 4, 5] {
            set.insert(Chunk {
                index,
                payload: vec![index],
            });
        }
        assert_eq!(set.missing_indexes(), vec![3]);
        match set.verify_complete() {
            Err(Error::MissingChunks { missing }) => assert_eq!(missing, vec![3]),
            other => panic!("expected MissingChunks, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(
            ChunkSet::new().reassemble(),
            Err(Error::NoChunks)
        ));
    }

    #[test]
    fn test_reassemble_ignores_discovery_order() {
        let mut set = ChunkSet::new();
        for index in [3u8, 1, 2] {
            set.insert(Chunk {
                index,
                payload: vec![index; 4],
            });
        }
        let stream = set.reassemble().unwrap();
        assert_eq!(stream, [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
    }

    #[test]
    fn test_rescan_replaces_payload() {
        let mut set = ChunkSet::new();
        set.insert(Chunk {
            index: 1,
            payload: vec![9, 9],
        });
        set.insert(Chunk {
            index: 1,
            payload: vec![7],
        });
        assert_eq!(set.len(), 1);
        assert_eq!(set.reassemble().unwrap(), vec![7]);
    }

    #[test]
    fn test_insert_digits_reports_index() {
        let mut set = ChunkSet::new();
        let digits = Chunk {
            index: 9,
            payload: vec![1, 2, 3],
        }
        .digits();
        assert_eq!(set.insert_digits(&digits).unwrap(), 9);
        assert!(set.insert_digits("not digits").is_err());
    }

    #[test]
    fn test_split_reassemble_roundtrip() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let mut set = ChunkSet::new();
        // Insert in reverse discovery order through the decimal form.
        let chunks: Vec<Chunk> = collect_chunks(&data, 37);
        for chunk in chunks.iter().rev() {
            set.insert_digits(&chunk.digits()).unwrap();
        }
        assert_eq!(set.reassemble().unwrap(), data);
    }
}
