//! Fixed-length tokenizer adapter for the neural classifier.

use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::SentraError;

/// Token ids and masks for one batch, row-major, every row exactly
/// `seq_len` elements long.
#[derive(Debug, Clone)]
pub struct TokenBatch {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub token_type_ids: Vec<u32>,
    pub rows: usize,
    pub seq_len: usize,
}

/// Tokenizer pinned to fixed-length output.
///
/// Longer text is truncated and shorter text padded so every encoding is
/// exactly `max_length` ids with boundary tokens included. Encoding is
/// deterministic: the same text always yields the same ids, and empty
/// input encodes to boundary tokens plus padding rather than failing.
pub struct SentimentTokenizer {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl SentimentTokenizer {
    /// Load a `tokenizer.json` and pin padding and truncation to
    /// `max_length`.
    pub fn load(path: &Path, max_length: usize) -> Result<Self, SentraError> {
        let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
            SentraError::Configuration(format!(
                "Failed to load tokenizer from {}: {}",
                path.display(),
                e
            ))
        })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| {
                SentraError::Configuration(format!("Failed to configure truncation: {}", e))
            })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_length),
            ..Default::default()
        }));

        Ok(Self {
            tokenizer,
            max_length,
        })
    }

    /// Encode a batch of texts into fixed-length id/mask rows.
    pub fn encode_batch(&self, texts: &[&str]) -> Result<TokenBatch, SentraError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| SentraError::Classification(format!("Tokenization failed: {}", e)))?;

        let rows = encodings.len();
        let input_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_ids().to_vec())
            .collect();
        let attention_mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();
        let token_type_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_type_ids().to_vec())
            .collect();

        Ok(TokenBatch {
            input_ids,
            attention_mask,
            token_type_ids,
            rows,
            seq_len: self.max_length,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}
