//! Embedding generator trait definition.

use conduit_core::{AdapterError, Context, ProviderError};

/// One embedding plus what it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    /// Vector of length [`EmbeddingGenerator::dimensions`].
    pub embedding: Vec<f32>,
    /// Tokens consumed to produce it.
    pub tokens_used: u32,
}

/// A backend that turns text into fixed-length vectors.
///
/// Every vector a generator returns has exactly [`dimensions`](Self::dimensions)
/// elements, and batch output is positionally aligned with its input.
#[async_trait::async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// Returns the provider name (e.g., "openai", "in-memory").
    fn name(&self) -> &str;

    /// Fixed output vector length, known from construction.
    fn dimensions(&self) -> usize;

    /// Embeds one text and reports token usage. Empty text is `InvalidInput`.
    async fn generate_with_usage(
        &self,
        ctx: &Context,
        text: &str,
    ) -> Result<EmbeddingResponse, AdapterError>;

    /// Embeds one text. Empty text is `InvalidInput`.
    async fn generate(&self, ctx: &Context, text: &str) -> Result<Vec<f32>, AdapterError> {
        self.generate_with_usage(ctx, text)
            .await
            .map(|response| response.embedding)
    }

    /// Embeds many texts with a single provider call.
    ///
    /// `result[i]` belongs to `texts[i]`. An empty slice yields an empty
    /// result without contacting the provider.
    async fn generate_batch(
        &self,
        ctx: &Context,
        texts: &[&str],
    ) -> Result<Vec<Vec<f32>>, AdapterError>;
}

// Compile-time check: EmbeddingGenerator must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn EmbeddingGenerator) {}
};

/// Rejects empty inputs before anything is sent.
pub fn validate_text(text: &str) -> Result<(), ProviderError> {
    if text.is_empty() {
        return Err(ProviderError::InvalidInput("text must not be empty".into()));
    }
    Ok(())
}

/// Rejects a batch containing any empty input, naming its position.
pub fn validate_batch(texts: &[&str]) -> Result<(), ProviderError> {
    match texts.iter().position(|t| t.is_empty()) {
        Some(i) => Err(ProviderError::InvalidInput(format!(
            "text at index {i} must not be empty"
        ))),
        None => Ok(()),
    }
}
