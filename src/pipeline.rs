//! The `.fc` encode/decode pipeline.
//!
//! Compression: encrypt with a cycling key, escape the three structural
//! characters, then scan the token stream once. Each position resolves
//! to exactly one of, in priority order: chunk extraction into the HEAD
//! dictionary, matrix substitution against the per-document matrix key,
//! or literal pass-through. Extracted chunks are ranked
//! lexicographically after the scan; HEAD entries, FOOT checksums and
//! BODY references all use the final 1-based rank.
//!
//! Decompression inverts the three BODY substitutions in a fixed order
//! (matrix literals, then dictionary references, then reserved escapes)
//! and finishes with the randomized cipher inversion. The order
//! matters: a reserved escape code must survive the reference pass
//! untouched so it cannot be mistaken for a dictionary rank.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::cipher::{self, CipherError};
use crate::dictionary::{Dictionary, CHUNK_TOKENS};
use crate::digest::{DigestError, DIGEST_LEN};
use crate::matrix::{Matrix, MatrixError};
use crate::oracle;
use crate::search::{SearchBudget, SearchExhausted};
use crate::token::{self, Token};

/// Format version written as the artifact's 3-digit prefix.
pub const VERSION_CODE: &str = "001";

/// The fixed pool of cipher keys a document may be encrypted under.
pub const KEY_CANDIDATES: [&str; 5] =
    ["!wes!", "!wesley!", "!scott!", "!wscott!", "!northbank!"];

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`compress_with`].
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Pin the cipher key instead of drawing one from [`KEY_CANDIDATES`].
    pub key: Option<String>,
    /// Chance that a scan position starts a 5-token chunk extraction.
    pub chunk_probability: f64,
    /// Chance that a non-chunk position takes the matrix-substitution
    /// path. Decoding a matrix token requires the randomized matrix
    /// division, which is extraordinarily expensive by construction.
    pub matrix_probability: f64,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions {
            key: None,
            chunk_probability: 0.2,
            matrix_probability: 0.2,
        }
    }
}

/// Configuration for [`decompress_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Attempt cap applied to every randomized search the decoder runs.
    pub budget: SearchBudget,
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// A structurally invalid artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("artifact is shorter than the 3-digit version prefix")]
    MissingVersion,
    #[error("version field {0:?} is not numeric")]
    BadVersion(String),
    #[error("expected 3 newline-separated sections, found {0}")]
    SectionCount(usize),
    #[error("header is missing the key or matrix-key field")]
    MissingHeaderField,
    #[error("header dictionary is not terminated by '/'")]
    UnterminatedDictionary,
    #[error("unterminated '/' matrix literal in body")]
    UnterminatedMatrix,
    #[error("dictionary reference @{rank:03} is out of range ({len} chunks)")]
    DanglingReference { rank: usize, len: usize },
    #[error("matrix solution row encodes neither a character nor an escape")]
    BadMatrixRow,
    #[error("footer holds {found} chars but {chunks} chunks need {expected}")]
    FootLength { chunks: usize, expected: usize, found: usize },
}

#[derive(Error, Debug)]
pub enum CompressError {
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Digest(#[from] DigestError),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error(transparent)]
    Exhausted(#[from] SearchExhausted),
}

// ── Compression ──────────────────────────────────────────────────────────────

/// Compress with default options and the thread-local RNG.
pub fn compress(text: &str) -> Result<String, CompressError> {
    compress_with(text, &CompressOptions::default(), &mut rand::thread_rng())
}

enum BodyPart {
    Text(String),
    ChunkRef(usize),
}

/// Compress `text` into a `.fc` artifact.
pub fn compress_with(
    text: &str,
    opts: &CompressOptions,
    rng: &mut impl Rng,
) -> Result<String, CompressError> {
    let key = match &opts.key {
        Some(k) => k.clone(),
        None => KEY_CANDIDATES
            .choose(rng)
            .copied()
            .unwrap_or(KEY_CANDIDATES[0])
            .to_string(),
    };
    let encrypted = cipher::encrypt(text, &key)?;
    let matrix_key = Matrix::random_key(rng);
    let tokens = token::escape(&encrypted);

    let mut dict = Dictionary::new();
    let mut body = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if dict.has_capacity()
            && i + CHUNK_TOKENS < tokens.len()
            && rng.gen::<f64>() < opts.chunk_probability
        {
            let mut chunk_text = String::new();
            for t in &tokens[i..i + CHUNK_TOKENS] {
                t.push_text(&mut chunk_text);
            }
            let extraction = dict.push(chunk_text)?;
            body.push(BodyPart::ChunkRef(extraction));
            i += CHUNK_TOKENS;
        } else if rng.gen::<f64>() < opts.matrix_probability {
            body.push(BodyPart::Text(matrix_token(&tokens[i], &matrix_key)?));
            i += 1;
        } else {
            body.push(BodyPart::Text(tokens[i].text()));
            i += 1;
        }
    }

    let (sorted, ranks) = dict.into_ranked();

    let mut head = String::new();
    head.push_str(VERSION_CODE);
    head.push_str(&key);
    head.push('/');
    head.push_str(&matrix_key.literal());
    head.push('/');
    for record in &sorted {
        head.push_str(&record.text);
        head.push('/');
    }

    let mut body_text = String::new();
    for part in &body {
        match part {
            BodyPart::Text(t) => body_text.push_str(t),
            BodyPart::ChunkRef(extraction) => {
                body_text.push_str(&format!("@{:03}", ranks[*extraction]));
            }
        }
    }

    let foot: String = sorted.iter().map(|r| r.checksum.as_str()).collect();

    Ok(format!("{head}\n{body_text}\n{foot}"))
}

/// Encode one token as a `/.../` matrix literal.
///
/// The fixed seed matrix gets its first row overwritten: a reserved
/// escape contributes its three code digits each offset by +10, a
/// literal character contributes its code point in the top-left cell.
/// The emitted literal is the seed multiplied by the document key.
fn matrix_token(token: &Token, matrix_key: &Matrix) -> Result<String, MatrixError> {
    let first_row = match token {
        Token::Escaped(code) => code
            .digits()
            .bytes()
            .map(|b| (b - b'0') as i64 + 10)
            .collect(),
        Token::Literal(c) => vec![*c as i64, 0, 0],
    };
    let seed = Matrix::from_rows(vec![first_row, vec![1, 2, 3], vec![3, 2, 1]])?;
    Ok(format!("/{}/", seed.multiply(matrix_key)?.literal()))
}

// ── Decompression ────────────────────────────────────────────────────────────

/// Decompress with default options (unbounded searches) and the
/// thread-local RNG.
pub fn decompress(artifact: &str) -> Result<String, DecodeError> {
    decompress_with(artifact, &DecodeOptions::default(), &mut rand::thread_rng())
}

/// Reconstruct the original text from a `.fc` artifact.
pub fn decompress_with(
    artifact: &str,
    opts: &DecodeOptions,
    rng: &mut impl Rng,
) -> Result<String, DecodeError> {
    let bytes = artifact.as_bytes();
    if bytes.len() < 3 {
        return Err(FormatError::MissingVersion.into());
    }
    if !bytes[..3].iter().all(u8::is_ascii_digit) {
        let field = artifact.chars().take(3).collect();
        return Err(FormatError::BadVersion(field).into());
    }
    // The version value itself is not interpreted, only validated.
    let rest = &artifact[3..];

    let sections: Vec<&str> = rest.split('\n').collect();
    if sections.len() != 3 {
        return Err(FormatError::SectionCount(sections.len()).into());
    }
    let (head, body, foot) = (sections[0], sections[1], sections[2]);

    let mut fields = head.split('/');
    let key = fields.next().filter(|k| !k.is_empty()).ok_or(FormatError::MissingHeaderField)?;
    let matrix_key =
        Matrix::parse(fields.next().ok_or(FormatError::MissingHeaderField)?)?;
    let mut chunk_texts: Vec<&str> = fields.collect();
    match chunk_texts.pop() {
        Some("") => {}
        _ => return Err(FormatError::UnterminatedDictionary.into()),
    }

    // The header already lists the dictionary in sorted order; the
    // oracle re-derives that order rather than trusting it.
    let chunks = oracle::r_sort(&chunk_texts, &opts.budget, rng)?;

    let expected_foot = 2 * DIGEST_LEN * chunks.len();
    if foot.len() != expected_foot {
        return Err(FormatError::FootLength {
            chunks: chunks.len(),
            expected: expected_foot,
            found: foot.len(),
        }
        .into());
    }

    let body = substitute_matrices(body, &matrix_key, &opts.budget, rng)?;
    let body = substitute_references(&body, &chunks)?;
    let body = token::resolve_escapes(&body);
    Ok(cipher::decrypt(&body, key, &opts.budget, rng)?)
}

/// Decode pass 1: invert every `/.../` matrix literal.
fn substitute_matrices(
    body: &str,
    matrix_key: &Matrix,
    budget: &SearchBudget,
    rng: &mut impl Rng,
) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(start) = rest.find('/') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('/').ok_or(FormatError::UnterminatedMatrix)?;
        let target = Matrix::parse(&after[..end])?;
        let solution = Matrix::divide(&target, matrix_key, budget, rng)?;
        push_solution_row(&mut out, &solution)?;
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Map a division solution's first row back to the token it encoded:
/// a zero middle cell means the top-left cell is a character code,
/// anything else means the row is an escape's digits offset by +10.
fn push_solution_row(out: &mut String, solution: &Matrix) -> Result<(), FormatError> {
    let row = solution.row(0);
    if row.len() < 2 {
        return Err(FormatError::BadMatrixRow);
    }
    if row[1] == 0 {
        let ch = u32::try_from(row[0])
            .ok()
            .and_then(char::from_u32)
            .ok_or(FormatError::BadMatrixRow)?;
        out.push(ch);
    } else {
        out.push('@');
        for &cell in row {
            let digit = cell - 10;
            if !(0..=9).contains(&digit) {
                return Err(FormatError::BadMatrixRow);
            }
            out.push((b'0' + digit as u8) as char);
        }
    }
    Ok(())
}

/// Decode pass 2: resolve `@NNN` dictionary references.
///
/// Reserved codes are re-emitted untouched for the escape pass, and
/// substituted chunk text is never rescanned, so escapes that a chunk
/// happens to contain cannot be misread as references.
fn substitute_references(body: &str, chunks: &[&str]) -> Result<String, FormatError> {
    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'@'
            && i + 4 <= bytes.len()
            && bytes[i + 1..i + 4].iter().all(u8::is_ascii_digit)
        {
            let digits = &body[i + 1..i + 4];
            if token::is_reserved_code(digits) {
                out.push('@');
                out.push_str(digits);
            } else {
                let rank = digits
                    .bytes()
                    .fold(0usize, |acc, b| acc * 10 + (b - b'0') as usize);
                let chunk = chunks
                    .get(rank.wrapping_sub(1))
                    .ok_or(FormatError::DanglingReference { rank, len: chunks.len() })?;
                out.push_str(chunk);
            }
            i += 4;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    Ok(out)
}
