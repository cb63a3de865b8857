//! FOOT checksums: a 16-byte table-driven digest per dictionary chunk.
//!
//! The substitution table covers the printable ASCII range (bytes
//! 32..128) and is fixed by the format: `b = byte ^ 0x55`, then
//! `(b + (b << i) + (b >> i)) % 256` for each of the 8 rotation slots.
//! It is built at compile time and shared read-only process-wide.

use thiserror::Error;

/// Digest length in bytes; FOOT stores it as 32 hex characters.
pub const DIGEST_LEN: usize = 16;

const TABLE_BASE: usize = 32;
const TABLE_SPAN: usize = 96;

static TABLE: [[u8; TABLE_SPAN]; 8] = build_table();

const fn build_table() -> [[u8; TABLE_SPAN]; 8] {
    let mut table = [[0u8; TABLE_SPAN]; 8];
    let mut byte = TABLE_BASE;
    while byte < TABLE_BASE + TABLE_SPAN {
        let b = (byte as u32) ^ 0x55;
        let mut i = 0;
        while i < 8 {
            table[i][byte - TABLE_BASE] = ((b + (b << i) + (b >> i)) % 256) as u8;
            i += 1;
        }
        byte += 1;
    }
    table
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestError {
    #[error("byte 0x{0:02x} is outside the printable ASCII range covered by the checksum table")]
    UnsupportedByte(u8),
}

/// Digest `text` into 32 lowercase hex characters.
///
/// The last digest byte carries the text length (mod 256); every other
/// byte accumulates table lookups XORed into a rotating 15-byte window.
/// Deterministic: equal inputs always produce equal digests.
pub fn checksum(text: &str) -> Result<String, DigestError> {
    let bytes = text.as_bytes();
    let mut digest = [0u8; DIGEST_LEN];
    digest[DIGEST_LEN - 1] = (bytes.len() % 256) as u8;
    for (i, &byte) in bytes.iter().enumerate() {
        if !(TABLE_BASE..TABLE_BASE + TABLE_SPAN).contains(&(byte as usize)) {
            return Err(DigestError::UnsupportedByte(byte));
        }
        digest[i % (DIGEST_LEN - 1)] ^= TABLE[i % 8][byte as usize - TABLE_BASE];
    }
    Ok(hex::encode(digest))
}

/// Digest a dictionary chunk the way the FOOT section stores it:
/// the chunk text repeated three times.
pub fn chunk_checksum(chunk_text: &str) -> Result<String, DigestError> {
    checksum(&chunk_text.repeat(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_deterministic() {
        let first = checksum("abcde").unwrap();
        for _ in 0..5 {
            assert_eq!(checksum("abcde").unwrap(), first);
        }
        assert_eq!(first.len(), 2 * DIGEST_LEN);
        assert!(first.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn checksum_depends_on_content_and_length() {
        assert_ne!(checksum("abcde").unwrap(), checksum("abcdf").unwrap());
        assert_ne!(checksum("aa").unwrap(), checksum("aaa").unwrap());
    }

    #[test]
    fn empty_text_encodes_only_the_length() {
        assert_eq!(checksum("").unwrap(), hex::encode([0u8; DIGEST_LEN]));
    }

    #[test]
    fn control_bytes_are_rejected() {
        assert_eq!(checksum("a\tb"), Err(DigestError::UnsupportedByte(b'\t')));
    }

    #[test]
    fn chunk_checksum_triples_the_text() {
        assert_eq!(chunk_checksum("abcde").unwrap(), checksum("abcdeabcdeabcde").unwrap());
    }
}
