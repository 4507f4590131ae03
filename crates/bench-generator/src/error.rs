//! Error type for generator operations.

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// A source cannot produce as many unique values as were requested
    #[error(
        "The provided emitter can only emit {available} unique values, but you requested \
         {requested}. Use a source that emits at least as many unique values as required."
    )]
    Capacity { available: u64, requested: usize },

    /// A source with no declared limit stopped producing new values
    #[error(
        "The provided emitter stopped producing new unique values after {achieved} of \
         {requested} requested"
    )]
    Stalled { achieved: usize, requested: usize },

    /// A without-replacement source has fewer values left than requested
    #[error("Requested {requested} unique values, but only {remaining} remain")]
    Exhausted { requested: usize, remaining: usize },

    /// Weights unusable for a weighted choice
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    /// A choice over an empty set of items
    #[error("Cannot choose from an empty set of {0}")]
    EmptyChoice(&'static str),

    /// A facet field was drawn from before its facet values were built
    #[error("Facet field '{0}' has no facet values; set the corpus size first")]
    FacetNotBuilt(String),

    /// A facet field's cardinality resolved to zero values
    #[error(
        "Facet field '{field}' has a cardinality of 0 for {total_docs} docs; \
         raise its static value or cardinality floor to at least 1"
    )]
    ZeroCardinality { field: String, total_docs: usize },

    /// Documents requested before the schema knows the corpus size
    #[error("Schema is not configured; set the number of documents before generating")]
    NotConfigured,

    /// Injection chances do not cover the schema's search fields
    #[error("No injection chance computed for search field '{0}'")]
    MissingInjectionChance(String),

    /// A copy field reads from a field the schema does not define
    #[error("Field '{field}' copies from unknown field '{from}'")]
    UnknownCopySource { field: String, from: String },

    /// A generator config that cannot serve as the requested kind of source
    #[error("Generator '{generator}' cannot be used as {role}")]
    UnsupportedGenerator {
        generator: &'static str,
        role: &'static str,
    },

    /// Schema error
    #[error("Schema error: {0}")]
    SchemaError(#[from] bench_core::SchemaError),
}
