//! The keyed character cipher applied before tokenization.
//!
//! Encryption is a deterministic one-pass transform that doubles the
//! text: each plaintext character becomes a tag byte (`A`/`B`/`C`) plus
//! a payload byte derived from the character and the cycling key.
//!
//! Decryption is defined by the format as a reject-and-restart search,
//! not a direct inversion: sample a full candidate plaintext from the
//! per-position possibilities, re-encrypt it, and accept only on an
//! exact match. The tags are redundant for candidate generation and are
//! consulted only through the re-encryption check. This contract must
//! hold bit-for-bit, so the search is preserved rather than optimized;
//! the [`SearchBudget`] is the only bound on it.

use rand::Rng;
use thiserror::Error;

use crate::search::{SearchBudget, SearchExhausted};

/// Tag/payload threshold: characters within this distance of the key
/// character pass through unchanged (tag `C`).
const OFFSET: u32 = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("unsupported character {ch:?} at position {position}: only printable ASCII and newline are accepted")]
    UnsupportedCharacter { ch: char, position: usize },
    #[error("ciphertext length {0} is odd, tag/payload pairs are incomplete")]
    TruncatedCiphertext(usize),
    #[error(transparent)]
    Exhausted(#[from] SearchExhausted),
}

/// True for the input alphabet the format supports.
pub fn is_supported(c: char) -> bool {
    c == '\n' || (' '..='~').contains(&c)
}

fn to_codes(text: &str) -> Vec<u32> {
    text.chars().map(|c| c as u32).collect()
}

fn codes_to_string(codes: &[u32]) -> String {
    // Every code produced here is far below the surrogate range.
    codes
        .iter()
        .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// The raw transform, defined on code points so that decrypt can verify
/// candidates that fall outside the supported alphabet.
fn encrypt_codes(plain: &[u32], key: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(plain.len() * 2);
    for (i, &c) in plain.iter().enumerate() {
        let e = key[i % key.len()];
        if c + OFFSET < e {
            out.push('A' as u32);
            out.push(e - c);
        } else if e + OFFSET < c {
            out.push('B' as u32);
            out.push(c - e);
        } else {
            out.push('C' as u32);
            out.push(c);
        }
    }
    out
}

/// Encrypt `plaintext` with the cycling `key`.
///
/// Output length is exactly twice the input length. Rejects characters
/// outside the supported alphabet.
pub fn encrypt(plaintext: &str, key: &str) -> Result<String, CipherError> {
    if let Some((position, ch)) = plaintext.chars().enumerate().find(|(_, c)| !is_supported(*c)) {
        return Err(CipherError::UnsupportedCharacter { ch, position });
    }
    Ok(codes_to_string(&encrypt_codes(&to_codes(plaintext), &to_codes(key))))
}

/// Invert [`encrypt`] by randomized search.
///
/// Payloads sit at odd stream indices. For the payload `c` at pair
/// index `p` with key character `k`, the candidates are `k - c` (when
/// representable), `k + c` and `c` itself, drawn uniformly. A full
/// candidate plaintext is accepted only when re-encrypting it
/// reproduces the ciphertext exactly; otherwise the whole candidate is
/// discarded and the search restarts.
pub fn decrypt(
    ciphertext: &str,
    key: &str,
    budget: &SearchBudget,
    rng: &mut impl Rng,
) -> Result<String, CipherError> {
    let cipher_codes = to_codes(ciphertext);
    if cipher_codes.is_empty() {
        return Ok(String::new());
    }
    if cipher_codes.len() % 2 != 0 {
        return Err(CipherError::TruncatedCiphertext(cipher_codes.len()));
    }
    let key_codes = to_codes(key);

    let mut spent = 0u64;
    let mut candidate = Vec::with_capacity(cipher_codes.len() / 2);
    loop {
        budget.register(&mut spent)?;
        candidate.clear();
        for (p, &c) in cipher_codes.iter().skip(1).step_by(2).enumerate() {
            let k = key_codes[p % key_codes.len()];
            let mut possibilities = [0u32; 3];
            let mut n = 0;
            if k >= c {
                possibilities[n] = k - c;
                n += 1;
            }
            possibilities[n] = k + c;
            possibilities[n + 1] = c;
            n += 2;
            candidate.push(possibilities[rng.gen_range(0..n)]);
        }
        if encrypt_codes(&candidate, &key_codes) == cipher_codes {
            return Ok(codes_to_string(&candidate));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn encrypt_doubles_the_length() {
        let out = encrypt("hi@hi\n", "!wes!").unwrap();
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let key = "!wes!";
        let out = encrypt("hi@hi\n", key).unwrap();
        let back = decrypt(&out, key, &SearchBudget::UNBOUNDED, &mut thread_rng()).unwrap();
        assert_eq!(back, "hi@hi\n");
    }

    #[test]
    fn empty_string_round_trips_without_sampling() {
        assert_eq!(encrypt("", "!wes!").unwrap(), "");
        let back = decrypt("", "!wes!", &SearchBudget::limited(0), &mut thread_rng()).unwrap();
        assert_eq!(back, "");
    }

    #[test]
    fn unsupported_characters_are_rejected() {
        assert_eq!(
            encrypt("ok\u{7f}", "!wes!"),
            Err(CipherError::UnsupportedCharacter { ch: '\u{7f}', position: 2 })
        );
        assert!(encrypt("tab\there", "!wes!").is_err());
    }

    #[test]
    fn odd_length_ciphertext_is_rejected() {
        let result = decrypt("CxC", "!wes!", &SearchBudget::UNBOUNDED, &mut thread_rng());
        assert_eq!(result, Err(CipherError::TruncatedCiphertext(3)));
    }

    #[test]
    fn capped_search_reports_exhaustion() {
        let out = encrypt("some longer text here!", "!scott!").unwrap();
        // 22 characters means roughly 3^22 expected restarts; one
        // attempt cannot plausibly succeed.
        let result = decrypt(&out, "!scott!", &SearchBudget::limited(1), &mut thread_rng());
        assert!(matches!(result, Err(CipherError::Exhausted(_))));
    }

    #[test]
    fn every_supported_character_survives_a_round_trip() {
        let key = "!northbank!";
        let mut rng = thread_rng();
        for c in (' '..='~').chain(['\n']) {
            let text: String = [c, c].iter().collect();
            let out = encrypt(&text, key).unwrap();
            let back = decrypt(&out, key, &SearchBudget::UNBOUNDED, &mut rng).unwrap();
            assert_eq!(back, text, "character {c:?} failed to round-trip");
        }
    }
}
