//! Completion response types for LLM providers.

/// The complete result of a non-streaming completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated text.
    pub content: String,
    /// Total tokens consumed across prompt and completion.
    pub tokens_used: u32,
    /// Provider-defined reason generation stopped (e.g. "stop", "length").
    pub finish_reason: String,
}

impl CompletionResponse {
    pub fn new(
        content: impl Into<String>,
        tokens_used: u32,
        finish_reason: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            tokens_used,
            finish_reason: finish_reason.into(),
        }
    }

    /// Returns `true` if generation was cut off by the token limit.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == "length"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_finish_reason_means_truncated() {
        assert!(CompletionResponse::new("partial", 12, "length").is_truncated());
        assert!(!CompletionResponse::new("done", 12, "stop").is_truncated());
    }
}
