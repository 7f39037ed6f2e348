use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// One typed value inferred from the right-hand side of a `KEY=VALUE` line.
/// The set is closed so encoding and comparison stay exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("value for {0:?} is not a finite number")]
    NonFiniteNumber(String),
    #[error("structured text is not a flat record")]
    NotARecord,
    #[error("value for {0:?} is not a supported scalar")]
    UnsupportedValue(String),
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

/// Ordered mapping from key to typed value, parsed from loosely formatted
/// key/value text. Keys keep their first-seen position; a repeated key takes
/// the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord {
    entries: IndexMap<String, TypedValue>,
}

impl StructuredRecord {
    /// Parse line-oriented `KEY=VALUE` text. Blank lines, `#` comments and
    /// lines without `=` are dropped without error.
    pub fn parse(input: &str) -> Self {
        let mut entries = IndexMap::new();
        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            entries.insert(key.trim().to_string(), infer_value(value.trim()));
        }
        Self { entries }
    }

    /// Read a record back from its canonical text form. Only flat objects of
    /// scalars are records; anything else is an encoding defect upstream.
    pub fn from_canonical(input: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(input)?;
        let Value::Object(map) = value else {
            return Err(RecordError::NotARecord);
        };
        let mut entries = IndexMap::new();
        for (key, value) in map {
            let typed = match value {
                Value::String(s) => TypedValue::String(s),
                Value::Bool(b) => TypedValue::Boolean(b),
                Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => TypedValue::Integer(i),
                    (None, Some(f)) => TypedValue::Float(f),
                    _ => return Err(RecordError::UnsupportedValue(key)),
                },
                _ => return Err(RecordError::UnsupportedValue(key)),
            };
            entries.insert(key, typed);
        }
        Ok(Self { entries })
    }

    /// Canonical structured-data text: 2-space indented, keys in record
    /// order. Fails only when a value cannot be encoded, which the closed
    /// variant set rules out for records built by `parse`.
    pub fn to_canonical(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn to_value(&self) -> Result<Value, RecordError> {
        let mut map = Map::new();
        for (key, value) in &self.entries {
            let encoded = match value {
                TypedValue::String(s) => Value::String(s.clone()),
                TypedValue::Boolean(b) => Value::Bool(*b),
                TypedValue::Integer(i) => Value::Number(Number::from(*i)),
                TypedValue::Float(f) => Number::from_f64(*f)
                    .map(Value::Number)
                    .ok_or_else(|| RecordError::NonFiniteNumber(key.clone()))?,
            };
            map.insert(key.clone(), encoded);
        }
        Ok(Value::Object(map))
    }
}

/// Type inference for a raw value, first matching rule wins: quoted string,
/// boolean, integer, float, then string fallback.
fn infer_value(raw: &str) -> TypedValue {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return TypedValue::String(raw[1..raw.len() - 1].to_string());
    }
    if raw == "true" || raw == "false" {
        return TypedValue::Boolean(raw == "true");
    }
    if let Ok(i) = raw.parse::<i64>() {
        return TypedValue::Integer(i);
    }
    // Non-finite floats ("inf", "NaN") have no canonical encoding, so they
    // stay strings.
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return TypedValue::Float(f);
        }
    }
    TypedValue::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_values_and_drops_comments() {
        let record = StructuredRecord::parse(
            "# comment\nNAME=\"Alice\"\nAGE=30\nACTIVE=true\nRATIO=1.5",
        );
        assert_eq!(record.len(), 4);
        assert_eq!(
            record.get("NAME"),
            Some(&TypedValue::String("Alice".to_string()))
        );
        assert_eq!(record.get("AGE"), Some(&TypedValue::Integer(30)));
        assert_eq!(record.get("ACTIVE"), Some(&TypedValue::Boolean(true)));
        assert_eq!(record.get("RATIO"), Some(&TypedValue::Float(1.5)));
    }

    #[test]
    fn unquoted_scalar_falls_back_to_string() {
        let record = StructuredRecord::parse("FOO=bar");
        assert_eq!(
            record.get("FOO"),
            Some(&TypedValue::String("bar".to_string()))
        );
    }

    #[test]
    fn skips_blank_and_malformed_lines() {
        let record = StructuredRecord::parse("\n   \nno equals here\nA=1\n");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("A"), Some(&TypedValue::Integer(1)));
    }

    #[test]
    fn trims_whitespace_around_key_and_value() {
        let record = StructuredRecord::parse("  KEY =  spaced out  ");
        assert_eq!(
            record.get("KEY"),
            Some(&TypedValue::String("spaced out".to_string()))
        );
    }

    #[test]
    fn duplicate_key_keeps_first_position_and_last_value() {
        let record = StructuredRecord::parse("A=1\nB=2\nA=3");
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(record.get("A"), Some(&TypedValue::Integer(3)));
    }

    #[test]
    fn quoted_value_keeps_inner_content_verbatim() {
        let record = StructuredRecord::parse("MSG=\"true\"\nN=\"42\"");
        assert_eq!(
            record.get("MSG"),
            Some(&TypedValue::String("true".to_string()))
        );
        assert_eq!(record.get("N"), Some(&TypedValue::String("42".to_string())));
    }

    #[test]
    fn non_finite_float_stays_string() {
        let record = StructuredRecord::parse("X=inf\nY=NaN");
        assert_eq!(record.get("X"), Some(&TypedValue::String("inf".to_string())));
        assert_eq!(record.get("Y"), Some(&TypedValue::String("NaN".to_string())));
    }

    #[test]
    fn canonical_form_uses_two_space_indent_in_record_order() {
        let record = StructuredRecord::parse("B=2\nA=\"one\"");
        let canonical = record.to_canonical().unwrap();
        assert_eq!(canonical, "{\n  \"B\": 2,\n  \"A\": \"one\"\n}");
    }

    #[test]
    fn canonical_round_trip_is_stable() {
        let record =
            StructuredRecord::parse("NAME=\"Alice\"\nAGE=30\nACTIVE=true\nRATIO=1.5");
        let canonical = record.to_canonical().unwrap();
        let reread = StructuredRecord::from_canonical(&canonical).unwrap();
        assert_eq!(record, reread);
        assert_eq!(reread.to_canonical().unwrap(), canonical);
    }

    #[test]
    fn from_canonical_rejects_non_records() {
        assert!(StructuredRecord::from_canonical("[1, 2]").is_err());
        assert!(StructuredRecord::from_canonical("not json").is_err());
        assert!(StructuredRecord::from_canonical("{\"a\": {\"b\": 1}}").is_err());
    }
}
