//! Error taxonomy for adapter operations.
//!
//! Every binding reports failures as an [`AdapterError`] tagged with the provider
//! name and the failed [`Operation`]. The wrapped cause stays reachable through
//! [`std::error::Error::source`], and [`kind_of`] walks that chain to find the
//! sentinel [`ErrorKind`] a caller can branch on.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Boxed, thread-safe error used as the cause inside an [`AdapterError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Sentinel failure classes, independent of which provider produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request timeout")]
    Timeout,

    #[error("invalid input")]
    InvalidInput,

    #[error("provider unavailable")]
    ProviderUnavailable,
}

/// What a caller should do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Retry the same request, ideally with backoff.
    Retry,
    /// Retrying is pointless until the request is changed.
    FixInput,
    /// Permanent or unknown failure.
    Permanent,
}

impl ErrorKind {
    /// Maps the sentinel to the caller-facing retry decision.
    pub fn disposition(self) -> Disposition {
        match self {
            Self::RateLimited | Self::Timeout | Self::ProviderUnavailable => Disposition::Retry,
            Self::InvalidInput => Disposition::FixInput,
        }
    }

    /// Returns `true` if the same request may succeed when retried.
    pub fn is_retryable(self) -> bool {
        self.disposition() == Disposition::Retry
    }
}

/// Leaf errors produced by provider bindings before they are tagged.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limit exceeded")]
    RateLimited {
        /// Suggested retry delay from the server.
        retry_after: Option<Duration>,
    },

    #[error("request timeout")]
    Timeout,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("authentication failed")]
    Auth,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty result: {0}")]
    EmptyResult(String),

    /// A liveness check failed. Always classified as unavailable; the
    /// underlying failure stays reachable as the source.
    #[error("health check failed: {0}")]
    HealthCheckFailed(#[source] Box<ProviderError>),
}

impl ProviderError {
    /// Returns the sentinel class of this error, or `None` when it is unclassified.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::RateLimited { .. } => Some(ErrorKind::RateLimited),
            Self::Timeout | Self::DeadlineExceeded => Some(ErrorKind::Timeout),
            Self::InvalidInput(_) => Some(ErrorKind::InvalidInput),
            Self::Unavailable(_)
            | Self::Connect(_)
            | Self::Network(_)
            | Self::HealthCheckFailed(_) => Some(ErrorKind::ProviderUnavailable),
            Self::Cancelled
            | Self::Auth
            | Self::Api { .. }
            | Self::InvalidResponse(_)
            | Self::EmptyResult(_) => None,
        }
    }

    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            401 | 403 => Self::Auth,
            408 => Self::Timeout,
            // 429 is also used for exhausted quota, which no amount of waiting fixes.
            429 if body.contains("insufficient_quota") => Self::Api {
                status,
                message: body,
            },
            429 => Self::RateLimited { retry_after },
            400 | 404 | 413 | 422 => Self::InvalidInput(body),
            500..=599 => Self::Unavailable(format!("HTTP {status}: {body}")),
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }

    /// Classifies a transport-level failure from the HTTP client.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err)
        } else {
            Self::Network(err)
        }
    }
}

/// The operation an [`AdapterError`] was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Complete,
    StreamComplete,
    HealthCheck,
    Generate,
    GenerateBatch,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::StreamComplete => "StreamComplete",
            Self::HealthCheck => "HealthCheck",
            Self::Generate => "Generate",
            Self::GenerateBatch => "GenerateBatch",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tagged with the provider and operation that produced it.
///
/// The original cause is preserved as the error source.
#[derive(Debug, Error)]
#[error("{provider} adapter {op}: {source}")]
pub struct AdapterError {
    provider: String,
    op: Operation,
    #[source]
    source: BoxError,
}

impl AdapterError {
    /// Wraps `source` with the provider name and operation.
    pub fn new(provider: impl Into<String>, op: Operation, source: impl Into<BoxError>) -> Self {
        Self {
            provider: provider.into(),
            op,
            source: source.into(),
        }
    }

    /// Name of the provider that failed (e.g. "openai").
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The operation that failed.
    pub fn op(&self) -> Operation {
        self.op
    }

    /// The wrapped cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// First sentinel class found in the cause chain.
    pub fn kind(&self) -> Option<ErrorKind> {
        kind_of(self)
    }

    /// Returns `true` if the cause chain matches `kind` at any depth.
    pub fn is(&self, kind: ErrorKind) -> bool {
        is_kind(self, kind)
    }

    pub fn disposition(&self) -> Disposition {
        self.kind()
            .map_or(Disposition::Permanent, ErrorKind::disposition)
    }

    /// Returns `true` if the call was aborted by cancelling its context.
    pub fn is_cancelled(&self) -> bool {
        chain(self).any(|e| {
            matches!(
                e.downcast_ref::<ProviderError>(),
                Some(ProviderError::Cancelled)
            )
        })
    }

    /// Finds the first error of type `E` in the cause chain.
    pub fn find<E: StdError + 'static>(&self) -> Option<&E> {
        chain(self).find_map(|e| e.downcast_ref::<E>())
    }
}

/// Iterates `err` followed by each of its sources.
fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// Walks the source chain of `err` and returns the first sentinel class found.
///
/// Recognizes bare [`ErrorKind`] values and classified [`ProviderError`]s at any
/// depth, including through nested [`AdapterError`]s and foreign wrappers.
pub fn kind_of(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    chain(err).find_map(link_kind)
}

/// Returns `true` if any link in the source chain of `err` matches `kind`.
pub fn is_kind(err: &(dyn StdError + 'static), kind: ErrorKind) -> bool {
    chain(err).any(|e| link_kind(e) == Some(kind))
}

fn link_kind(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    if let Some(kind) = err.downcast_ref::<ErrorKind>() {
        return Some(*kind);
    }
    err.downcast_ref::<ProviderError>()
        .and_then(ProviderError::kind)
}
