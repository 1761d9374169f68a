//! Configurable stand-in adapter for tests of calling code.

use std::fmt;
use std::sync::Arc;

use conduit_core::{AdapterError, Context};

use crate::adapter::CompletionAdapter;
use crate::request::CompletionRequest;
use crate::response::CompletionResponse;
use crate::stream::CompletionStream;

type CompleteFn = Arc<
    dyn Fn(&Context, &CompletionRequest) -> Result<CompletionResponse, AdapterError> + Send + Sync,
>;
type StreamFn = Arc<
    dyn Fn(&Context, &CompletionRequest) -> Result<CompletionStream, AdapterError> + Send + Sync,
>;
type HealthFn = Arc<dyn Fn(&Context) -> Result<(), AdapterError> + Send + Sync>;

/// A [`CompletionAdapter`] whose operations can be overridden one by one.
///
/// Without overrides, `complete` returns `{"mock response", 100, "stop"}`,
/// `stream_complete` returns a stream that ends immediately, and
/// `health_check` succeeds.
///
/// ```
/// use conduit_core::{AdapterError, Context, ErrorKind, Operation, ProviderError};
/// use conduit_llm_client::{CompletionAdapter, CompletionRequest, MockAdapter};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let adapter = MockAdapter::new().on_complete(|_, _| {
///     Err(AdapterError::new(
///         "mock",
///         Operation::Complete,
///         ProviderError::RateLimited { retry_after: None },
///     ))
/// });
/// let err = adapter
///     .complete(&Context::background(), &CompletionRequest::new())
///     .await
///     .unwrap_err();
/// assert!(err.is(ErrorKind::RateLimited));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockAdapter {
    complete: Option<CompleteFn>,
    stream_complete: Option<StreamFn>,
    health_check: Option<HealthFn>,
}

impl MockAdapter {
    pub const DEFAULT_CONTENT: &'static str = "mock response";
    pub const DEFAULT_TOKENS_USED: u32 = 100;
    pub const DEFAULT_FINISH_REASON: &'static str = "stop";

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &CompletionRequest) -> Result<CompletionResponse, AdapterError>
            + Send
            + Sync
            + 'static,
    {
        self.complete = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_stream_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &CompletionRequest) -> Result<CompletionStream, AdapterError>
            + Send
            + Sync
            + 'static,
    {
        self.stream_complete = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_health_check<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> Result<(), AdapterError> + Send + Sync + 'static,
    {
        self.health_check = Some(Arc::new(f));
        self
    }
}

#[async_trait::async_trait]
impl CompletionAdapter for MockAdapter {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        ctx: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AdapterError> {
        match &self.complete {
            Some(f) => f(ctx, request),
            None => Ok(CompletionResponse::new(
                Self::DEFAULT_CONTENT,
                Self::DEFAULT_TOKENS_USED,
                Self::DEFAULT_FINISH_REASON,
            )),
        }
    }

    async fn stream_complete(
        &self,
        ctx: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, AdapterError> {
        match &self.stream_complete {
            Some(f) => f(ctx, request),
            None => Ok(CompletionStream::empty(self.name(), ctx.clone())),
        }
    }

    async fn health_check(&self, ctx: &Context) -> Result<(), AdapterError> {
        match &self.health_check {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for MockAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockAdapter")
            .field("complete", &self.complete.is_some())
            .field("stream_complete", &self.stream_complete.is_some())
            .field("health_check", &self.health_check.is_some())
            .finish()
    }
}
