//! The chunk dictionary extracted into HEAD during compression.
//!
//! Chunks are recorded in extraction order while the body scan runs,
//! then ranked lexicographically once the scan is done. Body references
//! always carry the final sorted rank, never the extraction number, and
//! HEAD entries and FOOT checksums are emitted in the same sorted
//! order. Ranks are 1-based and capped at 997 so they can never collide
//! with the three reserved escape codes (000/998/999).

use crate::digest::{self, DigestError};

/// Hard cap on dictionary size; rank numbering is 3 digits and the
/// codes 000, 998 and 999 are reserved for escapes.
pub const MAX_CHUNKS: usize = 997;

/// Every chunk is exactly this many tokens.
pub const CHUNK_TOKENS: usize = 5;

/// One extracted chunk: its concatenated token text and FOOT checksum.
#[derive(Debug, Clone, Default)]
pub struct ChunkRecord {
    pub text: String,
    pub checksum: String,
}

/// Extraction-ordered chunk store with post-scan lexicographic ranking.
#[derive(Debug, Default)]
pub struct Dictionary {
    records: Vec<ChunkRecord>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Room for another chunk under the 997 cap?
    pub fn has_capacity(&self) -> bool {
        self.records.len() < MAX_CHUNKS
    }

    /// Record a chunk, checksumming its tripled text for FOOT.
    /// Returns the 0-based extraction index.
    pub fn push(&mut self, text: String) -> Result<usize, DigestError> {
        debug_assert!(self.has_capacity());
        let checksum = digest::chunk_checksum(&text)?;
        self.records.push(ChunkRecord { text, checksum });
        Ok(self.records.len() - 1)
    }

    /// Final ordering: sorted by `(text, extraction_order)`. Chunk texts
    /// are 5 raw tokens and in practice distinct, so the extraction
    /// index is an inert tie-break.
    ///
    /// Returns `(sorted, ranks)` where `sorted` lists the records in
    /// rank order and `ranks[extraction_index]` is the 1-based rank.
    pub fn into_ranked(self) -> (Vec<ChunkRecord>, Vec<usize>) {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by(|&a, &b| {
            self.records[a]
                .text
                .cmp(&self.records[b].text)
                .then(a.cmp(&b))
        });

        let mut ranks = vec![0; self.records.len()];
        for (rank0, &extraction) in order.iter().enumerate() {
            ranks[extraction] = rank0 + 1;
        }

        let mut records = self.records;
        let sorted = order
            .iter()
            .map(|&i| std::mem::take(&mut records[i]))
            .collect();
        (sorted, ranks)
    }
}
