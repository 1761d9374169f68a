//! Completion adapter trait definition.

use conduit_core::{AdapterError, Context};

use crate::request::CompletionRequest;
use crate::response::CompletionResponse;
use crate::stream::CompletionStream;

/// An LLM backend that can generate completions.
///
/// Callers hold `dyn CompletionAdapter` (or a generic) and never a concrete
/// provider type, so bindings can be swapped at construction time.
/// Implementations hold only immutable configuration and are safe to call
/// concurrently.
#[async_trait::async_trait]
pub trait CompletionAdapter: Send + Sync {
    /// Returns the provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Generates a full completion for `request`.
    ///
    /// Rejects invalid requests with `InvalidInput` before any network call.
    async fn complete(
        &self,
        ctx: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AdapterError>;

    /// Opens a streamed completion for `request`.
    ///
    /// Failures while establishing the stream are returned here; failures
    /// after that surface from [`CompletionStream::next`].
    async fn stream_complete(
        &self,
        ctx: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, AdapterError>;

    /// Lightweight liveness check. Fails with `ProviderUnavailable`.
    async fn health_check(&self, ctx: &Context) -> Result<(), AdapterError>;
}

// Compile-time check: CompletionAdapter must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionAdapter) {}
};
