//! Schema configuration for benchmark document generation.
//!
//! The schema file is YAML. It declares the search term vocabulary and an
//! ordered list of fields, each with a generator, optional repeat and
//! occurrence settings, and a kind:
//!
//! - `plain` - generated as-is
//! - `search` - generated, then has search terms injected
//! - `facet` - draws from a finite facet value set built for the corpus size

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two fields share a name
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// Field not found in schema
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// A copy generator reads from a field that is not generated before it
    #[error("Field '{field}' copies from '{from}', which is not defined before it")]
    InvalidCopySource { field: String, from: String },

    /// Option given to a field kind that does not support it
    #[error("Field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// A probability outside [0, 1]
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    InvalidProbability { name: String, value: f64 },
}

// ============================================================================
// Generator Configuration
// ============================================================================

/// Generator configuration for a field or term source.
///
/// This enum defines the different types of value generators available
/// for producing benchmark data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Generate sequential integers, or zero-padded strings when `width` is set
    Sequential {
        /// Starting value
        #[serde(default)]
        start: i64,
        /// Zero-pad to this many digits and emit strings
        #[serde(default)]
        width: Option<usize>,
    },

    /// Generate values using a pattern with placeholders
    Pattern {
        /// Pattern string (supports {index}, {uuid}, {rand:N})
        pattern: String,
    },

    /// Generate random integers in a range
    IntRange {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Generate random floats in a range
    FloatRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate weighted boolean values
    WeightedBool {
        /// Weight for true value (0.0 to 1.0)
        true_weight: f64,
    },

    /// Generate random selection from a pool of values
    OneOf {
        /// Pool of values to select from
        values: Vec<serde_yaml::Value>,
        /// Optional per-value weights (uniform when omitted)
        #[serde(default)]
        weights: Option<Vec<f64>>,
    },

    /// Generate random lowercase words
    Words {
        /// Minimum word length in characters
        #[serde(default = "default_min_word_length")]
        min_length: usize,
        /// Maximum word length in characters
        #[serde(default = "default_max_word_length")]
        max_length: usize,
        /// Characters to build words from
        #[serde(default)]
        alphabet: Option<String>,
    },

    /// Generate space-separated text from a word source
    Text {
        /// Minimum number of words
        #[serde(default = "default_min_words")]
        min_words: usize,
        /// Maximum number of words
        max_words: usize,
        /// Word source (random words when omitted)
        #[serde(default)]
        word: Option<Box<GeneratorConfig>>,
    },

    /// Generate timestamps in a range
    TimestampRange {
        /// Start timestamp (ISO 8601)
        start: String,
        /// End timestamp (ISO 8601)
        end: String,
    },

    /// Generate UUIDs (v4) from the seeded stream
    UuidV4,

    /// Generate a static value
    Static {
        /// The static value to use
        value: serde_yaml::Value,
    },

    /// Generate null values
    Null,

    /// Copy the latest value of an earlier field
    Copy {
        /// Name of the field to copy from
        from: String,
    },
}

fn default_min_word_length() -> usize {
    2
}

fn default_max_word_length() -> usize {
    10
}

fn default_min_words() -> usize {
    1
}

/// Number of values per document for multi-valued fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepeatConfig {
    /// Minimum count (inclusive)
    #[serde(default)]
    pub min: usize,
    /// Maximum count (inclusive)
    pub max: usize,
    /// Bell-curve peak; uniform over the range when omitted
    #[serde(default)]
    pub mean: Option<f64>,
}

/// How many distinct values a facet field takes, given the corpus size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardinalityConfig {
    /// Exactly `value` facet values regardless of corpus size
    Static { value: usize },

    /// `round(max(total_docs * factor, floor))` facet values
    Factor {
        factor: f64,
        #[serde(default = "default_cardinality_floor")]
        floor: usize,
    },
}

fn default_cardinality_floor() -> usize {
    10
}

impl Default for CardinalityConfig {
    fn default() -> Self {
        Self::Static { value: 10 }
    }
}

impl CardinalityConfig {
    /// Compute the cardinality for a corpus of `total_docs` documents.
    pub fn cardinality(&self, total_docs: usize) -> usize {
        match *self {
            Self::Static { value } => value,
            Self::Factor { factor, floor } => {
                let scaled = total_docs as f64 * factor;
                scaled.max(floor as f64).round() as usize
            }
        }
    }
}

/// Role a field plays in the benchmark.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Plain,
    Search,
    Facet,
}

/// One field of the document schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,

    /// Field role
    #[serde(default)]
    pub kind: FieldKind,

    /// Value generator. For facet fields this is the source facet terms are
    /// drawn from when the facet value set is built.
    pub generator: GeneratorConfig,

    /// Makes the field multi-valued
    #[serde(default)]
    pub repeat: Option<RepeatConfig>,

    /// Chance (0.0 to 1.0) the field has a value at all; always when omitted
    #[serde(default)]
    pub occurrence: Option<f64>,

    /// Facet cardinality (facet fields only, static 10 when omitted)
    #[serde(default)]
    pub cardinality: Option<CardinalityConfig>,
}

impl FieldDefinition {
    /// Effective cardinality setting for a facet field.
    pub fn cardinality_or_default(&self) -> CardinalityConfig {
        self.cardinality.unwrap_or_default()
    }
}

fn default_vocab_size() -> usize {
    50
}

fn default_term_doc_ratio() -> f64 {
    0.5
}

fn default_overwrite_chance() -> f64 {
    0.5
}

/// Search term vocabulary and injection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTermsConfig {
    /// Number of single-word terms
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    /// Number of phrases with 2, 3, 4, ... words
    #[serde(default)]
    pub phrase_counts: Option<Vec<usize>>,

    /// Source of vocabulary words
    pub word_source: GeneratorConfig,

    /// Target number of injected terms per document
    #[serde(default = "default_term_doc_ratio")]
    pub term_doc_ratio: f64,

    /// Chance an injected term replaces the value instead of being spliced in
    #[serde(default = "default_overwrite_chance")]
    pub overwrite_chance: f64,
}

fn default_version() -> u32 {
    1
}

/// Full benchmark schema.
///
/// Loaded from a YAML file; the source of truth for generating a corpus
/// and its term lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchSchemaConfig {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default seed for deterministic generation
    #[serde(default)]
    pub seed: Option<u64>,

    /// Search term settings (no injection when omitted)
    #[serde(default)]
    pub search_terms: Option<SearchTermsConfig>,

    /// Field definitions, in document order
    pub fields: Vec<FieldDefinition>,
}

impl BenchSchemaConfig {
    /// Load schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate schema from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let schema: BenchSchemaConfig = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            if let GeneratorConfig::Copy { from } = &field.generator {
                if !seen.contains(from.as_str()) {
                    return Err(SchemaError::InvalidCopySource {
                        field: field.name.clone(),
                        from: from.clone(),
                    });
                }
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if field.cardinality.is_some() && field.kind != FieldKind::Facet {
                return Err(SchemaError::InvalidField {
                    field: field.name.clone(),
                    message: "cardinality is only valid on facet fields".to_string(),
                });
            }
            if field.kind == FieldKind::Facet && matches!(field.generator, GeneratorConfig::Copy { .. }) {
                return Err(SchemaError::InvalidField {
                    field: field.name.clone(),
                    message: "facet fields need a term source, not a copy".to_string(),
                });
            }
            if let Some(repeat) = &field.repeat {
                if repeat.min > repeat.max {
                    return Err(SchemaError::InvalidField {
                        field: field.name.clone(),
                        message: format!(
                            "repeat min ({}) is greater than max ({})",
                            repeat.min, repeat.max
                        ),
                    });
                }
            }
            if let Some(occurrence) = field.occurrence {
                check_probability(&format!("{}.occurrence", field.name), occurrence)?;
            }
            if let Some(cardinality) = &field.cardinality {
                check_cardinality(&field.name, cardinality)?;
            }
        }
        if let Some(terms) = &self.search_terms {
            check_probability("search_terms.overwrite_chance", terms.overwrite_chance)?;
            if !terms.term_doc_ratio.is_finite() || terms.term_doc_ratio < 0.0 {
                return Err(SchemaError::InvalidField {
                    field: "search_terms".to_string(),
                    message: format!(
                        "term_doc_ratio must be a finite number >= 0, got {}",
                        terms.term_doc_ratio
                    ),
                });
            }
        }
        Ok(())
    }

    /// Get a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get all field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of fields of the given kind, in schema order.
    pub fn fields_of_kind(&self, kind: FieldKind) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.name.as_str())
            .collect()
    }
}

fn check_cardinality(field: &str, cardinality: &CardinalityConfig) -> Result<(), SchemaError> {
    let message = match *cardinality {
        CardinalityConfig::Static { value: 0 } => "static cardinality must be at least 1".to_string(),
        CardinalityConfig::Factor { floor: 0, .. } => "cardinality floor must be at least 1".to_string(),
        CardinalityConfig::Factor { factor, .. } if !factor.is_finite() || factor < 0.0 => {
            format!("cardinality factor must be a finite number >= 0, got {factor}")
        }
        _ => return Ok(()),
    };
    Err(SchemaError::InvalidField {
        field: field.to_string(),
        message,
    })
}

fn check_probability(name: &str, value: f64) -> Result<(), SchemaError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SchemaError::InvalidProbability {
            name: name.to_string(),
            value,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SCHEMA: &str = r#"
version: 1
seed: 999

search_terms:
  vocab_size: 20
  word_source:
    type: words
    min_length: 3
    max_length: 8
  term_doc_ratio: 1.5

fields:
  - name: id
    generator:
      type: sequential
      start: 1
      width: 7

  - name: title
    generator:
      type: text
      min_words: 2
      max_words: 6

  - name: colors
    kind: facet
    generator:
      type: one_of
      values: [red, green, blue, yellow]
    cardinality:
      type: factor
      factor: 0.1
    repeat:
      min: 1
      max: 3
    occurrence: 0.5

  - name: title_search
    kind: search
    generator:
      type: copy
      from: title
"#;

    #[test]
    fn test_parse_schema() {
        let schema = BenchSchemaConfig::from_yaml(SAMPLE_SCHEMA).unwrap();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.seed, Some(999));
        assert_eq!(schema.field_names(), vec!["id", "title", "colors", "title_search"]);
        assert_eq!(schema.fields_of_kind(FieldKind::Facet), vec!["colors"]);
        assert_eq!(schema.fields_of_kind(FieldKind::Search), vec!["title_search"]);

        let terms = schema.search_terms.as_ref().unwrap();
        assert_eq!(terms.vocab_size, 20);
        assert_eq!(terms.term_doc_ratio, 1.5);
        assert_eq!(terms.overwrite_chance, 0.5);
        assert!(terms.phrase_counts.is_none());

        let colors = schema.get_field("colors").unwrap();
        assert_eq!(
            colors.cardinality_or_default(),
            CardinalityConfig::Factor {
                factor: 0.1,
                floor: 10
            }
        );
        assert_eq!(colors.occurrence, Some(0.5));
    }

    #[test]
    fn test_generator_defaults() {
        let schema = BenchSchemaConfig::from_yaml(SAMPLE_SCHEMA).unwrap();
        let title = schema.get_field("title").unwrap();
        assert!(matches!(
            title.generator,
            GeneratorConfig::Text {
                min_words: 2,
                max_words: 6,
                word: None
            }
        ));
        assert_eq!(title.kind, FieldKind::Plain);
    }

    #[test]
    fn test_cardinality_functions() {
        assert_eq!(CardinalityConfig::Static { value: 5 }.cardinality(1000), 5);

        let factor = CardinalityConfig::Factor {
            factor: 0.1,
            floor: 10,
        };
        // 0.1 * 90 = 9 is under the floor
        assert_eq!(factor.cardinality(90), 10);
        assert_eq!(factor.cardinality(1000), 100);
        assert_eq!(factor.cardinality(1005), 101);
        assert_eq!(CardinalityConfig::default().cardinality(1), 10);
    }

    #[test]
    fn test_copy_must_reference_earlier_field() {
        let yaml = r#"
fields:
  - name: copy_first
    generator:
      type: copy
      from: title
  - name: title
    generator:
      type: static
      value: hello
"#;
        let result = BenchSchemaConfig::from_yaml(yaml);
        assert!(matches!(result, Err(SchemaError::InvalidCopySource { .. })));
    }

    #[test]
    fn test_duplicate_field() {
        let yaml = r#"
fields:
  - name: a
    generator: { type: "null" }
  - name: a
    generator: { type: "null" }
"#;
        let result = BenchSchemaConfig::from_yaml(yaml);
        assert!(matches!(result, Err(SchemaError::DuplicateField(name)) if name == "a"));
    }

    #[test]
    fn test_cardinality_on_plain_field_rejected() {
        let yaml = r#"
fields:
  - name: a
    generator: { type: "null" }
    cardinality: { type: static, value: 3 }
"#;
        let result = BenchSchemaConfig::from_yaml(yaml);
        assert!(matches!(result, Err(SchemaError::InvalidField { .. })));
    }

    #[test]
    fn test_occurrence_out_of_range() {
        let yaml = r#"
fields:
  - name: a
    generator: { type: "null" }
    occurrence: 1.5
"#;
        let result = BenchSchemaConfig::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(SchemaError::InvalidProbability { value, .. }) if value == 1.5
        ));
    }

    #[test]
    fn test_repeat_range_checked() {
        let yaml = r#"
fields:
  - name: a
    generator: { type: "null" }
    repeat: { min: 4, max: 2 }
"#;
        let result = BenchSchemaConfig::from_yaml(yaml);
        assert!(matches!(result, Err(SchemaError::InvalidField { .. })));
    }

    #[test]
    fn test_zero_cardinality_rejected() {
        for cardinality in [
            "{ type: static, value: 0 }",
            "{ type: factor, factor: 0.001, floor: 0 }",
            "{ type: factor, factor: .nan }",
        ] {
            let yaml = format!(
                r#"
fields:
  - name: brand
    kind: facet
    generator: {{ type: words, min_length: 2, max_length: 6 }}
    cardinality: {cardinality}
"#
            );
            let result = BenchSchemaConfig::from_yaml(&yaml);
            assert!(
                matches!(&result, Err(SchemaError::InvalidField { field, .. }) if field == "brand"),
                "{cardinality}: {result:?}"
            );
        }
    }

    #[test]
    fn test_non_finite_term_doc_ratio_rejected() {
        for ratio in [".nan", ".inf", "-0.5"] {
            let yaml = format!(
                r#"
search_terms:
  word_source: {{ type: words }}
  term_doc_ratio: {ratio}
fields:
  - name: title
    kind: search
    generator: {{ type: text, min_words: 2, max_words: 4 }}
"#
            );
            let result = BenchSchemaConfig::from_yaml(&yaml);
            assert!(
                matches!(&result, Err(SchemaError::InvalidField { field, .. }) if field == "search_terms"),
                "{ratio}: {result:?}"
            );
        }
    }
}
