//! Overlapping window splitter for texts longer than the model input limit
//!
//! Offsets and lengths are counted in `char`s, so a window never cuts a
//! code point in half.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Window parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum window length in chars
    pub chunk_size: usize,
    /// Chars shared by consecutive windows
    pub overlap: usize,
}

impl ChunkerConfig {
    /// `chunk_size` must be strictly greater than `overlap`, otherwise the
    /// window never advances.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= self.overlap {
            return Err(TranslationError::ConfigError {
                message: format!(
                    "chunk_size ({}) must be greater than overlap ({})",
                    self.chunk_size, self.overlap
                ),
            });
        }
        Ok(())
    }

    /// Distance between consecutive window starts
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// A window over the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position in the window sequence
    pub index: usize,
    /// Start offset in chars
    pub start: usize,
    /// Length in chars
    pub len: usize,
    /// The window itself, borrowed from the source text
    pub text: &'a str,
}

impl Chunk<'_> {
    /// End offset in chars, exclusive
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Splits text into overlapping windows
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Fails with [`TranslationError::ConfigError`] when the window would never advance
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Windows of `chunk_size` chars starting every `stride()` chars.
    ///
    /// A text no longer than one window comes back as a single chunk, even
    /// when empty.
    pub fn split<'a>(&self, text: &'a str) -> Vec<Chunk<'a>> {
        // byte offset of every char, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        if char_len <= self.config.chunk_size {
            return vec![Chunk {
                index: 0,
                start: 0,
                len: char_len,
                text,
            }];
        }

        let mut chunks = Vec::with_capacity(char_len / self.config.stride() + 1);
        for start in (0..char_len).step_by(self.config.stride()) {
            let end = (start + self.config.chunk_size).min(char_len);
            if end == start {
                continue;
            }
            chunks.push(Chunk {
                index: chunks.len(),
                start,
                len: end - start,
                text: &text[boundaries[start]..boundaries[end]],
            });
        }

        debug!("Split {} chars into {} chunks", char_len, chunks.len());
        chunks
    }
}

/// Split `text` into windows of `chunk_size` chars sharing `overlap` chars
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk<'_>>> {
    let chunker = Chunker::new(ChunkerConfig { chunk_size, overlap })?;
    Ok(chunker.split(text))
}
