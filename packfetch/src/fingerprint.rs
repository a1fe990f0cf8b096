//! Content fingerprints used by the catalog to identify files.
//!
//! The catalog identifies a file by a 32-bit MurmurHash2 of its content with
//! whitespace bytes removed. The constants and byte order here must match the
//! catalog exactly or lookups by fingerprint will never match.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

/// Seed used by the catalog for every fingerprint.
pub const FINGERPRINT_SEED: u32 = 1;

const MURMUR_M: u32 = 0x5BD1_E995;
const MURMUR_R: u32 = 24;

/// Read buffer size for fingerprinting files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Returns true for the bytes stripped before hashing: tab, LF, CR and space.
#[inline]
fn is_stripped(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0D | 0x20)
}

/// Remove every tab, line-feed, carriage-return and space byte.
///
/// Operates on raw bytes; no text decoding is involved.
pub fn strip_whitespace(data: &[u8]) -> Vec<u8> {
    data.iter().copied().filter(|b| !is_stripped(*b)).collect()
}

/// Incremental MurmurHash2. The total length must be known up front.
struct Murmur2 {
    h: u32,
    word: [u8; 4],
    filled: usize,
}

impl Murmur2 {
    fn new(len: u32, seed: u32) -> Self {
        Self {
            h: seed ^ len,
            word: [0; 4],
            filled: 0,
        }
    }

    fn push(&mut self, byte: u8) {
        self.word[self.filled] = byte;
        self.filled += 1;
        if self.filled == 4 {
            let mut k = u32::from_le_bytes(self.word);
            k = k.wrapping_mul(MURMUR_M);
            k ^= k >> MURMUR_R;
            k = k.wrapping_mul(MURMUR_M);

            self.h = self.h.wrapping_mul(MURMUR_M);
            self.h ^= k;
            self.filled = 0;
        }
    }

    fn finish(self) -> u32 {
        let mut h = self.h;
        let tail = &self.word[..self.filled];
        if tail.len() == 3 {
            h ^= u32::from(tail[2]) << 16;
        }
        if tail.len() >= 2 {
            h ^= u32::from(tail[1]) << 8;
        }
        if !tail.is_empty() {
            h ^= u32::from(tail[0]);
            h = h.wrapping_mul(MURMUR_M);
        }

        h ^= h >> 13;
        h = h.wrapping_mul(MURMUR_M);
        h ^= h >> 15;
        h
    }
}

/// 32-bit MurmurHash2 over `data` with the given seed.
pub fn murmur2(data: &[u8], seed: u32) -> u32 {
    let mut hasher = Murmur2::new(data.len() as u32, seed);
    for byte in data {
        hasher.push(*byte);
    }
    hasher.finish()
}

/// Fingerprint of in-memory content, with an explicit seed.
pub fn fingerprint_with_seed(data: &[u8], seed: u32) -> u32 {
    murmur2(&strip_whitespace(data), seed)
}

/// Catalog fingerprint of in-memory content.
pub fn fingerprint(data: &[u8]) -> u32 {
    fingerprint_with_seed(data, FINGERPRINT_SEED)
}

/// Catalog fingerprint of a file on disk.
///
/// Streams the file twice with a fixed buffer: once to count the bytes that
/// survive stripping, once to hash them. Call from a blocking context.
pub fn fingerprint_file(path: &Path) -> io::Result<u32> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; BUFFER_SIZE];

    let mut stripped_len = 0u32;
    for_each_chunk(&mut file, &mut buffer, |chunk| {
        let kept = chunk.iter().filter(|b| !is_stripped(**b)).count();
        stripped_len = stripped_len.wrapping_add(kept as u32);
    })?;

    file.rewind()?;
    let mut hasher = Murmur2::new(stripped_len, FINGERPRINT_SEED);
    for_each_chunk(&mut file, &mut buffer, |chunk| {
        for byte in chunk.iter().filter(|b| !is_stripped(**b)) {
            hasher.push(*byte);
        }
    })?;

    Ok(hasher.finish())
}

fn for_each_chunk(
    file: &mut File,
    buffer: &mut [u8],
    mut f: impl FnMut(&[u8]),
) -> io::Result<()> {
    loop {
        let bytes_read = match file.read(buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        f(&buffer[..bytes_read]);
    }
}
