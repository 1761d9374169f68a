//! OpenAI embeddings binding.

use conduit_core::{http, AdapterError, Context, Operation, ProviderConfig, ProviderError};
use serde::Deserialize;

use crate::generator::{validate_batch, validate_text, EmbeddingGenerator, EmbeddingResponse};
use crate::models;

/// Endpoint used when the config carries no base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "openai";

#[derive(Debug, Deserialize)]
struct EmbeddingsBody {
    #[serde(default)]
    data: Vec<EmbeddingData>,
    usage: Option<EmbeddingsUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsUsage {
    total_tokens: u32,
}

/// Embedding generator backed by an `OpenAI`-compatible `/embeddings` API.
pub struct OpenAiEmbeddingGenerator {
    client: reqwest::Client,
    config: ProviderConfig,
    dimensions: usize,
    /// Set only by `with_dimensions`; otherwise the server picks the size.
    requested_dimensions: Option<usize>,
}

impl OpenAiEmbeddingGenerator {
    /// Creates a generator for `model`; dimensions come from the model table.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::from_config(ProviderConfig::new(api_key, model))
    }

    pub fn from_config(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            dimensions: models::dimensions_for(&config.model),
            requested_dimensions: None,
            config,
        }
    }

    /// Sets a custom reqwest client (e.g. for testing with `no_proxy()`).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Requests shortened vectors of `dimensions` elements.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self.requested_dimensions = Some(dimensions);
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn error(op: Operation, err: ProviderError) -> AdapterError {
        AdapterError::new(PROVIDER, op, err)
    }

    async fn post_embeddings(
        &self,
        ctx: &Context,
        input: serde_json::Value,
    ) -> Result<EmbeddingsBody, ProviderError> {
        let url = format!("{}/embeddings", self.config.base_url_or(DEFAULT_BASE_URL));
        let mut body = serde_json::json!({
            "model": self.config.model,
            "input": input,
        });
        // Many servers reject the field outright, so send it only on explicit request.
        if let Some(dimensions) = self.requested_dimensions {
            body["dimensions"] = serde_json::json!(dimensions);
        }

        let ctx = self.config.scope(ctx);
        ctx.run(async {
            let response =
                http::send(self.client.post(&url).bearer_auth(self.config.api_key()).json(&body))
                    .await?;
            let response = http::check_status(response).await?;
            http::json(response).await
        })
        .await
    }

    fn check_length(&self, embedding: &[f32]) -> Result<(), ProviderError> {
        if embedding.len() == self.dimensions {
            Ok(())
        } else {
            Err(ProviderError::InvalidResponse(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                embedding.len()
            )))
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingGenerator for OpenAiEmbeddingGenerator {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn generate_with_usage(
        &self,
        ctx: &Context,
        text: &str,
    ) -> Result<EmbeddingResponse, AdapterError> {
        let run = async {
            validate_text(text)?;
            tracing::debug!(
                provider = PROVIDER,
                model = %self.config.model,
                "generating embedding"
            );

            let body = self
                .post_embeddings(ctx, serde_json::Value::String(text.to_owned()))
                .await?;
            let tokens_used = body.usage.map_or(0, |u| u.total_tokens);
            let embedding = body
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .ok_or_else(|| ProviderError::EmptyResult("empty response data".into()))?;
            self.check_length(&embedding)?;
            Ok::<_, ProviderError>(EmbeddingResponse {
                embedding,
                tokens_used,
            })
        };
        run.await.map_err(|e| Self::error(Operation::Generate, e))
    }

    async fn generate_batch(
        &self,
        ctx: &Context,
        texts: &[&str],
    ) -> Result<Vec<Vec<f32>>, AdapterError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let run = async {
            validate_batch(texts)?;
            tracing::debug!(
                provider = PROVIDER,
                model = %self.config.model,
                count = texts.len(),
                "generating embedding batch"
            );

            let input = texts
                .iter()
                .map(|t| serde_json::Value::String((*t).to_owned()))
                .collect();
            let mut data = self
                .post_embeddings(ctx, serde_json::Value::Array(input))
                .await?
                .data;

            if data.len() != texts.len() {
                return Err(ProviderError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    data.len()
                )));
            }
            data.sort_by_key(|d| d.index);
            data.into_iter()
                .enumerate()
                .map(|(i, d)| {
                    if d.index != i {
                        return Err(ProviderError::InvalidResponse(format!(
                            "missing embedding for input {i}"
                        )));
                    }
                    self.check_length(&d.embedding)?;
                    Ok(d.embedding)
                })
                .collect::<Result<Vec<_>, ProviderError>>()
        };
        run.await
            .map_err(|e| Self::error(Operation::GenerateBatch, e))
    }
}
