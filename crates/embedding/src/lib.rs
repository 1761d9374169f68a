//! Conduit Embedding - provider-agnostic embedding generators.

pub mod config;
pub mod generator;
pub mod in_memory;
pub mod models;
pub mod openai;

pub use config::EmbeddingConfig;
pub use generator::{EmbeddingGenerator, EmbeddingResponse};
pub use in_memory::InMemoryEmbedding;
pub use models::{dimensions_for, DEFAULT_DIMENSIONS};
pub use openai::OpenAiEmbeddingGenerator;
