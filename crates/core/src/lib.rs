//! Conduit Core - error taxonomy, message model and call context shared by every adapter.

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod message;
pub mod retry;

pub use config::{ProviderConfig, RetryConfig};
pub use context::Context;
pub use error::{AdapterError, BoxError, Disposition, ErrorKind, Operation, ProviderError};
pub use message::{Message, Role};
pub use retry::retry;
