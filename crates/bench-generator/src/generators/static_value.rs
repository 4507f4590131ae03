//! Static value generator and YAML to FieldValue conversion.

use crate::emitter::Emitter;
use bench_core::FieldValue;
use serde_yaml::Value as YamlValue;

/// Convert a YAML value to a FieldValue.
///
/// Mappings have no document representation and become null.
pub fn yaml_to_field_value(yaml: &YamlValue) -> FieldValue {
    match yaml {
        YamlValue::Null | YamlValue::Mapping(_) => FieldValue::Null,
        YamlValue::Bool(b) => FieldValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::Str(n.to_string())
            }
        }
        YamlValue::String(s) => FieldValue::Str(s.clone()),
        YamlValue::Sequence(arr) => FieldValue::List(arr.iter().map(yaml_to_field_value).collect()),
        YamlValue::Tagged(tagged) => yaml_to_field_value(&tagged.value),
    }
}

/// Emits the same value every time. Also used for the `null` generator.
#[derive(Debug, Clone)]
pub struct Static {
    value: FieldValue,
}

impl Static {
    pub fn new(value: FieldValue) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self::new(FieldValue::Null)
    }
}

impl Emitter for Static {
    type Item = FieldValue;

    fn emit_one(&mut self) -> FieldValue {
        self.value.clone()
    }

    fn max_unique(&self) -> Option<u64> {
        Some(1)
    }

    fn seed(&mut self, _seed: Option<u64>) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_scalars() {
        assert_eq!(yaml_to_field_value(&YamlValue::Null), FieldValue::Null);
        assert_eq!(
            yaml_to_field_value(&YamlValue::Bool(true)),
            FieldValue::Bool(true)
        );

        let int: YamlValue = serde_yaml::from_str("42").unwrap();
        assert_eq!(yaml_to_field_value(&int), FieldValue::Int(42));

        let float: YamlValue = serde_yaml::from_str("1.234").unwrap();
        match yaml_to_field_value(&float) {
            FieldValue::Float(f) => assert!((f - 1.234).abs() < 0.001),
            other => panic!("Expected Float, got {other:?}"),
        }

        assert_eq!(
            yaml_to_field_value(&YamlValue::String("hello".to_string())),
            FieldValue::from("hello")
        );
    }

    #[test]
    fn test_yaml_sequence() {
        let yaml: YamlValue = serde_yaml::from_str("[1, two, null]").unwrap();
        assert_eq!(
            yaml_to_field_value(&yaml),
            FieldValue::List(vec![
                FieldValue::Int(1),
                FieldValue::from("two"),
                FieldValue::Null
            ])
        );
    }

    #[test]
    fn test_yaml_mapping_is_null() {
        let yaml: YamlValue = serde_yaml::from_str("{ a: 1 }").unwrap();
        assert_eq!(yaml_to_field_value(&yaml), FieldValue::Null);
    }

    #[test]
    fn test_static_emitter() {
        let mut value = Static::new(FieldValue::from("fixed"));
        assert_eq!(value.emit_many(2), vec![FieldValue::from("fixed"); 2]);
        assert_eq!(value.max_unique(), Some(1));
        assert_eq!(Static::null().emit_one(), FieldValue::Null);
    }
}
