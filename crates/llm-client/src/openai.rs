//! OpenAI chat-completions binding.

use conduit_core::{
    http, AdapterError, Context, ErrorKind, Operation, ProviderConfig, ProviderError,
};
use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use crate::adapter::CompletionAdapter;
use crate::request::CompletionRequest;
use crate::response::CompletionResponse;
use crate::stream::{CompletionStream, FragmentStream};

/// Endpoint used when the config carries no base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "openai";

/// Adapter for `OpenAI`-compatible chat-completion APIs.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiAdapter {
    /// Creates an adapter for `model` authenticated with `api_key`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::from_config(ProviderConfig::new(api_key, model))
    }

    pub fn from_config(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Sets a custom reqwest client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url_or(DEFAULT_BASE_URL))
    }

    fn error(op: Operation, err: ProviderError) -> AdapterError {
        AdapterError::new(PROVIDER, op, err)
    }

    fn build_body(&self, request: &CompletionRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": request.conversation(),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        if stream {
            body["stream"] = serde_json::json!(true);
        }
        body
    }

    async fn send_chat(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = self.build_body(request, stream);
        let response = http::send(
            self.client
                .post(self.url("chat/completions"))
                .bearer_auth(self.config.api_key())
                .json(&body),
        )
        .await?;
        http::check_status(response).await
    }
}

#[async_trait::async_trait]
impl CompletionAdapter for OpenAiAdapter {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(
        &self,
        ctx: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AdapterError> {
        request
            .validate()
            .map_err(|e| Self::error(Operation::Complete, e))?;

        tracing::debug!(
            provider = PROVIDER,
            model = %self.config.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let ctx = self.config.scope(ctx);
        ctx.run(async {
            let response = self.send_chat(request, false).await?;
            let body: ChatResponse = http::json(response).await?;
            body.into_completion_response()
        })
        .await
        .map_err(|e| Self::error(Operation::Complete, e))
    }

    async fn stream_complete(
        &self,
        ctx: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, AdapterError> {
        request
            .validate()
            .map_err(|e| Self::error(Operation::StreamComplete, e))?;

        tracing::debug!(
            provider = PROVIDER,
            model = %self.config.model,
            messages = request.messages.len(),
            "opening chat completion stream"
        );

        // The configured timeout bounds the whole stream, not just the handshake.
        let ctx = self.config.scope(ctx);
        let response = ctx
            .run(self.send_chat(request, true))
            .await
            .map_err(|e| Self::error(Operation::StreamComplete, e))?;

        Ok(CompletionStream::new(PROVIDER, ctx, fragments(response)))
    }

    async fn health_check(&self, ctx: &Context) -> Result<(), AdapterError> {
        let ctx = self.config.scope(ctx);
        ctx.run(async {
            let response = http::send(
                self.client
                    .get(self.url("models"))
                    .bearer_auth(self.config.api_key()),
            )
            .await?;
            http::check_status(response).await?;
            Ok::<_, ProviderError>(())
        })
        .await
        .map_err(|e| {
            let e = match e {
                ProviderError::Cancelled | ProviderError::DeadlineExceeded => e,
                e if e.kind() == Some(ErrorKind::ProviderUnavailable) => e,
                e => ProviderError::HealthCheckFailed(Box::new(e)),
            };
            Self::error(Operation::HealthCheck, e)
        })
    }
}

/// Turns an SSE response body into content deltas.
///
/// Ends at `data: [DONE]` or when the body ends. Chunks without choices or
/// without content (role headers, usage trailers) are skipped. The first
/// error ends the sequence.
fn fragments(response: reqwest::Response) -> FragmentStream {
    let events = Box::pin(response.bytes_stream().eventsource());

    stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        loop {
            let event = match events.next().await? {
                Ok(event) => event,
                Err(err) => return Some((Err(event_error(err)), None)),
            };
            if event.data.trim() == "[DONE]" {
                return None;
            }
            match parse_delta(&event.data) {
                Ok(Some(content)) => return Some((Ok(content), Some(events))),
                Ok(None) => {}
                Err(err) => return Some((Err(err), None)),
            }
        }
    })
    .boxed()
}

fn event_error(err: EventStreamError<reqwest::Error>) -> ProviderError {
    match err {
        EventStreamError::Transport(e) => ProviderError::from_transport(e),
        other => ProviderError::InvalidResponse(format!("malformed event stream: {other}")),
    }
}

fn parse_delta(data: &str) -> Result<Option<String>, ProviderError> {
    let chunk: ChatChunk = serde_json::from_str(data)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad stream chunk: {e}")))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|content| !content.is_empty()))
}

// Wire types. Only the fields this binding reads are declared.

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

impl ChatResponse {
    fn into_completion_response(self) -> Result<CompletionResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResult("no completion choices returned".into()))?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            tokens_used: self.usage.map_or(0, |u| u.total_tokens),
            finish_reason: choice.finish_reason.unwrap_or_default(),
        })
    }
}
