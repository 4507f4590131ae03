//! Individual value generators for different data types.
//!
//! This module provides the concrete emitters and the builders that turn a
//! [`GeneratorConfig`] from the schema into a boxed emitter.

pub mod choice;
pub mod numeric;
pub mod pattern;
pub mod static_value;
pub mod text;
pub mod timestamp;
pub mod uuid;

use crate::emitter::{derive_seed, BoxedEmitter, Emitter, ValueEmitter};
use crate::error::GeneratorError;
use bench_core::{FieldValue, GeneratorConfig, RepeatConfig};

pub use choice::{gaussian_choice, gaussian_weights, UniqueChoice, WeightedChoice};
pub use numeric::{Chance, FloatRange, IntRange, RepeatCount, Sequential};
pub use pattern::Pattern;
pub use static_value::{yaml_to_field_value, Static};
pub use text::{Text, Words};
pub use timestamp::TimestampRange;
pub use uuid::UuidV4;

/// Name of a generator as written in the schema file.
pub fn generator_name(config: &GeneratorConfig) -> &'static str {
    match config {
        GeneratorConfig::Sequential { .. } => "sequential",
        GeneratorConfig::Pattern { .. } => "pattern",
        GeneratorConfig::IntRange { .. } => "int_range",
        GeneratorConfig::FloatRange { .. } => "float_range",
        GeneratorConfig::WeightedBool { .. } => "weighted_bool",
        GeneratorConfig::OneOf { .. } => "one_of",
        GeneratorConfig::Words { .. } => "words",
        GeneratorConfig::Text { .. } => "text",
        GeneratorConfig::TimestampRange { .. } => "timestamp_range",
        GeneratorConfig::UuidV4 => "uuid_v4",
        GeneratorConfig::Static { .. } => "static",
        GeneratorConfig::Null => "null",
        GeneratorConfig::Copy { .. } => "copy",
    }
}

/// Build an emitter of document field values.
///
/// `copy` has no emitter of its own; fields resolve it against the slot of
/// the field they copy from.
pub fn build_value_emitter(
    config: &GeneratorConfig,
    seed: Option<u64>,
) -> Result<BoxedEmitter<FieldValue>, GeneratorError> {
    let emitter: BoxedEmitter<FieldValue> = match config {
        GeneratorConfig::Sequential { start, width } => Box::new(Sequential::new(*start, *width)),

        GeneratorConfig::IntRange { min, max } => {
            Box::new(ValueEmitter::new(IntRange::new(*min, *max, seed)))
        }

        GeneratorConfig::FloatRange { min, max } => {
            Box::new(ValueEmitter::new(FloatRange::new(*min, *max, seed)))
        }

        GeneratorConfig::WeightedBool { true_weight } => {
            Box::new(ValueEmitter::new(Chance::new(*true_weight, seed)))
        }

        GeneratorConfig::OneOf { values, weights } => {
            let values = values.iter().map(yaml_to_field_value).collect();
            Box::new(WeightedChoice::new(values, weights.clone(), seed)?)
        }

        GeneratorConfig::Static { value } => Box::new(Static::new(yaml_to_field_value(value))),

        GeneratorConfig::Null => Box::new(Static::null()),

        GeneratorConfig::Copy { .. } => {
            return Err(GeneratorError::UnsupportedGenerator {
                generator: "copy",
                role: "a value source",
            })
        }

        // Everything else produces strings
        other => Box::new(ValueEmitter::new(build_string_emitter(other, seed)?)),
    };
    Ok(emitter)
}

/// Build an emitter of strings, for vocabulary words and facet values.
pub fn build_string_emitter(
    config: &GeneratorConfig,
    seed: Option<u64>,
) -> Result<BoxedEmitter<String>, GeneratorError> {
    let emitter: BoxedEmitter<String> = match config {
        GeneratorConfig::Words {
            min_length,
            max_length,
            alphabet,
        } => Box::new(Words::new(*min_length, *max_length, alphabet.as_deref(), seed)),

        GeneratorConfig::Text {
            min_words,
            max_words,
            word,
        } => {
            let word_source = match word {
                Some(word) => build_string_emitter(word, derive_seed(seed, 0))?,
                None => Box::new(Words::new(2, 10, None, derive_seed(seed, 0))),
            };
            Box::new(Text::new(*min_words, *max_words, word_source, seed))
        }

        GeneratorConfig::Pattern { pattern } => Box::new(Pattern::new(pattern.clone(), seed)),

        GeneratorConfig::OneOf { values, weights } => {
            // Values without a term form (null, nested lists) are dropped
            // together with their weights
            let (terms, kept): (Vec<String>, Vec<Option<f64>>) = values
                .iter()
                .enumerate()
                .filter_map(|(idx, value)| {
                    let term = yaml_to_field_value(value).to_term()?;
                    let weight = weights.as_ref().and_then(|w| w.get(idx).copied());
                    Some((term, weight))
                })
                .unzip();
            let weights = match weights {
                Some(_) => Some(kept.into_iter().map(|w| w.unwrap_or(0.0)).collect()),
                None => None,
            };
            Box::new(WeightedChoice::new(terms, weights, seed)?)
        }

        GeneratorConfig::TimestampRange { start, end } => {
            Box::new(TimestampRange::new(start, end, seed))
        }

        GeneratorConfig::UuidV4 => Box::new(UuidV4::new(seed)),

        GeneratorConfig::Sequential { start, width } => {
            Box::new(TermEmitter::new(Sequential::new(*start, *width)))
        }

        GeneratorConfig::IntRange { min, max } => {
            Box::new(TermEmitter::new(ValueEmitter::new(IntRange::new(*min, *max, seed))))
        }

        other => {
            return Err(GeneratorError::UnsupportedGenerator {
                generator: generator_name(other),
                role: "a term source",
            })
        }
    };
    Ok(emitter)
}

/// Build the repeat-count emitter for a multi-valued field.
pub fn build_repeat(
    config: Option<&RepeatConfig>,
    seed: Option<u64>,
) -> Result<Option<RepeatCount>, GeneratorError> {
    config.map(|c| RepeatCount::new(c, seed)).transpose()
}

/// Build the occurrence gate for a field that is not always present.
pub fn build_gate(occurrence: Option<f64>, seed: Option<u64>) -> Option<Chance> {
    occurrence.map(|chance| Chance::new(chance, seed))
}

/// Renders scalar field values as term strings.
struct TermEmitter<E> {
    inner: E,
}

impl<E> TermEmitter<E> {
    fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: Emitter<Item = FieldValue>> Emitter for TermEmitter<E> {
    type Item = String;

    fn emit_one(&mut self) -> String {
        self.inner.emit_one().to_term().unwrap_or_default()
    }

    fn emits_unique(&self) -> bool {
        self.inner.emits_unique()
    }

    fn max_unique(&self) -> Option<u64> {
        self.inner.max_unique()
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.inner.seed(seed)
    }

    fn reset(&mut self) {
        self.inner.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> GeneratorConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_value_emitters_from_config() {
        let mut ints = build_value_emitter(&config("{ type: int_range, min: 1, max: 3 }"), Some(1))
            .unwrap();
        for value in ints.emit_many(20) {
            let v = value.as_i64().unwrap();
            assert!((1..=3).contains(&v));
        }

        let mut seq =
            build_value_emitter(&config("{ type: sequential, start: 5, width: 3 }"), None).unwrap();
        assert_eq!(seq.emit_one(), FieldValue::from("005"));
        assert!(seq.emits_unique());

        let mut null = build_value_emitter(&config(r#"{ type: "null" }"#), None).unwrap();
        assert_eq!(null.emit_one(), FieldValue::Null);
    }

    #[test]
    fn test_one_of_weights() {
        let mut choice = build_value_emitter(
            &config("{ type: one_of, values: [a, b, c], weights: [0, 0, 1] }"),
            Some(3),
        )
        .unwrap();
        assert!(choice
            .emit_many(20)
            .into_iter()
            .all(|v| v == FieldValue::from("c")));
    }

    #[test]
    fn test_string_emitter_one_of_skips_null() {
        let mut choice = build_string_emitter(
            &config("{ type: one_of, values: [1, null, x], weights: [1, 5, 1] }"),
            Some(3),
        )
        .unwrap();
        assert_eq!(choice.max_unique(), Some(2));
        for value in choice.emit_many(20) {
            assert!(value == "1" || value == "x");
        }
    }

    #[test]
    fn test_text_defaults_to_words() {
        let mut text =
            build_string_emitter(&config("{ type: text, min_words: 3, max_words: 3 }"), Some(2))
                .unwrap();
        let value = text.emit_one();
        assert_eq!(value.split(' ').count(), 3);
    }

    #[test]
    fn test_unsupported_term_source() {
        let result = build_string_emitter(&config("{ type: float_range, min: 0, max: 1 }"), None);
        assert!(matches!(
            result,
            Err(GeneratorError::UnsupportedGenerator {
                generator: "float_range",
                ..
            })
        ));

        let copy = build_value_emitter(&config("{ type: copy, from: a }"), None);
        assert!(matches!(
            copy,
            Err(GeneratorError::UnsupportedGenerator { generator: "copy", .. })
        ));
    }

    #[test]
    fn test_repeat_and_gate_builders() {
        assert!(build_repeat(None, None).unwrap().is_none());
        let repeat = RepeatConfig {
            min: 1,
            max: 2,
            mean: None,
        };
        assert!(build_repeat(Some(&repeat), Some(1)).unwrap().is_some());

        assert!(build_gate(None, None).is_none());
        assert_eq!(build_gate(Some(0.3), None).unwrap().chance(), 0.3);
    }
}
