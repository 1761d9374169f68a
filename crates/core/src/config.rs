//! Configuration types for provider adapters.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::context::Context;

/// Construction-time settings for one adapter instance.
///
/// Immutable once the adapter is built; the API key is never printed by `Debug`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Opaque API credential.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,
    /// Model identifier (e.g. "gpt-4o-mini", "text-embedding-3-small").
    pub model: String,
    /// Overrides the provider's default endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Deadline applied to calls whose context carries none tighter.
    ///
    /// For streamed completions it bounds the whole stream: fragments still
    /// unread when it expires are lost and the next read fails with a timeout.
    #[serde(
        default,
        rename = "timeout_ms",
        deserialize_with = "deserialize_opt_duration_ms"
    )]
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            base_url: None,
            timeout: None,
        }
    }

    /// Creates a builder for the given credential and model.
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> ProviderConfigBuilder {
        ProviderConfigBuilder {
            config: Self::new(api_key, model),
        }
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// The configured base URL without a trailing slash, or `default`.
    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
    }

    /// Derives the context a call should run under, applying the configured timeout.
    pub fn scope(&self, ctx: &Context) -> Context {
        match self.timeout {
            Some(timeout) => ctx.child().timeout(timeout),
            None => ctx.clone(),
        }
    }
}

/// Builder for `ProviderConfig`.
#[derive(Debug)]
#[must_use]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ProviderConfig {
        self.config
    }
}

/// Backoff settings for [`crate::retry`].
///
/// Adapters never retry on their own; this is for callers that want to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial attempt).
    pub max_attempts: u32,

    /// Initial delay before the first retry.
    #[serde(
        rename = "initial_delay_ms",
        serialize_with = "serialize_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    pub initial_delay: Duration,

    /// Maximum delay between retries.
    #[serde(
        rename = "max_delay_ms",
        serialize_with = "serialize_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// A single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt` (0-indexed), capped at `max_delay`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

/// Builder for `RetryConfig`.
#[derive(Debug, Default)]
#[must_use]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, m: f64) -> Self {
        self.config.multiplier = m;
        self
    }

    pub fn build(self) -> RetryConfig {
        self.config
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[allow(clippy::cast_possible_truncation)]
fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn deserialize_duration_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

fn deserialize_opt_duration_ms<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
