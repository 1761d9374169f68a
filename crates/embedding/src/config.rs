//! Configuration for embedding generators.

use serde::Deserialize;

use crate::models;

/// Output shape of an embedding generator.
///
/// When deserialized, a missing `dimensions` is looked up from `model`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawEmbeddingConfig")]
pub struct EmbeddingConfig {
    /// Model identifier the vectors come from.
    pub model: String,
    /// Output vector dimensions.
    pub dimensions: usize,
    /// Whether to L2-normalize output vectors to unit length.
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::for_model(DEFAULT_MODEL)
    }
}

const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Wire form of [`EmbeddingConfig`]; every field is optional.
#[derive(Deserialize)]
struct RawEmbeddingConfig {
    #[serde(default = "default_model")]
    model: String,
    #[serde(default)]
    dimensions: Option<usize>,
    #[serde(default = "default_normalize")]
    normalize: bool,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_normalize() -> bool {
    true
}

impl From<RawEmbeddingConfig> for EmbeddingConfig {
    fn from(raw: RawEmbeddingConfig) -> Self {
        let mut config = Self::for_model(raw.model);
        if let Some(dimensions) = raw.dimensions {
            config.dimensions = dimensions;
        }
        config.normalize = raw.normalize;
        config
    }
}

/// Builder for `EmbeddingConfig`.
#[derive(Debug)]
#[must_use]
pub struct EmbeddingConfigBuilder {
    config: EmbeddingConfig,
}

impl EmbeddingConfig {
    /// Config for `model` with dimensions taken from the model table.
    pub fn for_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            dimensions: models::dimensions_for(&model),
            model,
            normalize: true,
        }
    }

    /// Creates a builder with default values.
    pub fn builder() -> EmbeddingConfigBuilder {
        EmbeddingConfigBuilder {
            config: Self::default(),
        }
    }
}

impl EmbeddingConfigBuilder {
    /// Sets the model and resets dimensions to its table entry.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        let normalize = self.config.normalize;
        self.config = EmbeddingConfig::for_model(model);
        self.config.normalize = normalize;
        self
    }

    /// Overrides the dimensions, e.g. for models missing from the table.
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    pub fn build(self) -> EmbeddingConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_small_model() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 1536);
        assert!(config.normalize);
    }

    #[test]
    fn builder_model_derives_dimensions() {
        let config = EmbeddingConfig::builder()
            .model("text-embedding-3-large")
            .build();
        assert_eq!(config.dimensions, 3072);
    }

    #[test]
    fn explicit_dimensions_override_table() {
        let config = EmbeddingConfig::builder()
            .model("custom-embedder")
            .dimensions(768)
            .build();
        assert_eq!(config.model, "custom-embedder");
        assert_eq!(config.dimensions, 768);
    }

    #[test]
    fn builder_sets_normalize() {
        let config = EmbeddingConfig::builder().normalize(false).build();
        assert!(!config.normalize);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: EmbeddingConfig =
            serde_json::from_str(r#"{"model": "local-embedder", "dimensions": 8}"#).unwrap();
        assert_eq!(config.model, "local-embedder");
        assert_eq!(config.dimensions, 8);
        assert!(config.normalize);
    }

    #[test]
    fn deserialized_model_alone_takes_table_dimensions() {
        let config: EmbeddingConfig =
            serde_json::from_str(r#"{"model": "text-embedding-3-large"}"#).unwrap();
        assert_eq!(config.dimensions, 3072);
        assert!(config.normalize);

        let config: EmbeddingConfig = serde_json::from_str(r#"{"normalize": false}"#).unwrap();
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 1536);
        assert!(!config.normalize);

        let config: EmbeddingConfig = serde_json::from_str(r#"{"model": "mystery"}"#).unwrap();
        assert_eq!(config.dimensions, models::DEFAULT_DIMENSIONS);
    }
}
