//! In-memory deterministic embedding generator for testing and development.

use conduit_core::{AdapterError, Context, Operation, ProviderError};

use crate::config::EmbeddingConfig;
use crate::generator::{validate_batch, validate_text, EmbeddingGenerator, EmbeddingResponse};

const PROVIDER: &str = "in-memory";

/// A deterministic, hash-based embedding generator useful for testing.
///
/// Produces consistent embeddings by hashing input text, so the same input
/// always yields the same output vector. No model or network is involved.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmbedding {
    config: EmbeddingConfig,
}

impl InMemoryEmbedding {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// FNV-1a.
    fn hash_text(text: &str) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn generate_vector(&self, text: &str) -> Vec<f32> {
        let dims = self.config.dimensions;
        let mut vec = Vec::with_capacity(dims);
        let mut hash = Self::hash_text(text);

        for _ in 0..dims {
            // Map hash bits to a float in [-1.0, 1.0]
            #[allow(clippy::cast_precision_loss)] // 16-bit value fits in f32
            let val = ((hash & 0xFFFF) as f32 / 32768.0) - 1.0;
            vec.push(val);
            hash = hash
                .wrapping_mul(0x0100_0000_01b3)
                .wrapping_add(0x9e37_79b9_7f4a_7c15);
        }

        if self.config.normalize {
            let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
            if magnitude > 0.0 {
                for x in &mut vec {
                    *x /= magnitude;
                }
            }
        }

        vec
    }

    /// Whitespace-separated word count, standing in for a tokenizer.
    fn count_tokens(text: &str) -> u32 {
        u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
    }

    fn check_ctx(ctx: &Context, op: Operation) -> Result<(), AdapterError> {
        match ctx.err() {
            Some(err) => Err(AdapterError::new(PROVIDER, op, err)),
            None => Ok(()),
        }
    }

    fn invalid(op: Operation, err: ProviderError) -> AdapterError {
        AdapterError::new(PROVIDER, op, err)
    }
}

#[async_trait::async_trait]
impl EmbeddingGenerator for InMemoryEmbedding {
    #[allow(clippy::unnecessary_literal_bound)] // trait signature uses &str
    fn name(&self) -> &str {
        PROVIDER
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    async fn generate_with_usage(
        &self,
        ctx: &Context,
        text: &str,
    ) -> Result<EmbeddingResponse, AdapterError> {
        validate_text(text).map_err(|e| Self::invalid(Operation::Generate, e))?;
        Self::check_ctx(ctx, Operation::Generate)?;
        Ok(EmbeddingResponse {
            embedding: self.generate_vector(text),
            tokens_used: Self::count_tokens(text),
        })
    }

    async fn generate_batch(
        &self,
        ctx: &Context,
        texts: &[&str],
    ) -> Result<Vec<Vec<f32>>, AdapterError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        validate_batch(texts).map_err(|e| Self::invalid(Operation::GenerateBatch, e))?;
        Self::check_ctx(ctx, Operation::GenerateBatch)?;
        Ok(texts.iter().map(|text| self.generate_vector(text)).collect())
    }
}
