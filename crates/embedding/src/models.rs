//! Known embedding models and their output sizes.

/// Dimensions assumed for models missing from the table.
pub const DEFAULT_DIMENSIONS: usize = 1536;

const KNOWN_MODELS: &[(&str, usize)] = &[
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("text-embedding-ada-002", 1536),
];

/// Returns the vector length `model` produces, or [`DEFAULT_DIMENSIONS`].
pub fn dimensions_for(model: &str) -> usize {
    lookup(model).unwrap_or(DEFAULT_DIMENSIONS)
}

/// Returns the vector length for a model in the table, `None` otherwise.
pub fn lookup(model: &str) -> Option<usize> {
    KNOWN_MODELS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|&(_, dims)| dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_models_have_fixed_dimensions() {
        assert_eq!(dimensions_for("text-embedding-3-small"), 1536);
        assert_eq!(dimensions_for("text-embedding-3-large"), 3072);
        assert_eq!(dimensions_for("text-embedding-ada-002"), 1536);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        assert_eq!(dimensions_for("my-finetuned-embedder"), DEFAULT_DIMENSIONS);
        assert_eq!(lookup("my-finetuned-embedder"), None);
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(lookup("TEXT-EMBEDDING-3-LARGE"), None);
        assert_eq!(lookup("text-embedding-3-large"), Some(3072));
    }
}
