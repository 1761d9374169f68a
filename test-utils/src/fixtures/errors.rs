//! Error fixtures for injecting failures into adapters.

use std::error::Error as StdError;
use std::fmt;

use conduit_core::{AdapterError, BoxError, ErrorKind, Operation, ProviderError};

/// An opaque wrapper layer, standing in for a caller's own error type.
#[derive(Debug)]
pub struct Wrapped {
    context: String,
    source: BoxError,
}

impl Wrapped {
    pub fn new(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl StdError for Wrapped {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Wraps `cause` in `depth` extra [`Wrapped`] layers.
pub fn nest(cause: impl Into<BoxError>, depth: usize) -> BoxError {
    (0..depth).fold(cause.into(), |acc, level| -> BoxError {
        Box::new(Wrapped::new(format!("layer {level}"), acc))
    })
}

/// A leaf provider error of the given class.
pub fn provider_error(kind: ErrorKind) -> ProviderError {
    match kind {
        ErrorKind::RateLimited => ProviderError::RateLimited { retry_after: None },
        ErrorKind::Timeout => ProviderError::Timeout,
        ErrorKind::InvalidInput => ProviderError::InvalidInput("rejected by fixture".into()),
        ErrorKind::ProviderUnavailable => ProviderError::Unavailable("fixture outage".into()),
    }
}

/// An adapter error of class `kind`, buried `depth` layers deep.
pub fn adapter_error(provider: &str, op: Operation, kind: ErrorKind, depth: usize) -> AdapterError {
    AdapterError::new(provider, op, nest(provider_error(kind), depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nest_zero_is_the_cause_itself() {
        let err = nest(ProviderError::Timeout, 0);
        assert!(err.downcast_ref::<ProviderError>().is_some());
    }

    #[test]
    fn nested_display_shows_each_layer() {
        let err = nest(ProviderError::Timeout, 2);
        assert_eq!(err.to_string(), "layer 1: layer 0: request timeout");
    }
}
