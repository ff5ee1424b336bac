use serde_json::{Map, Number, Value};

use crate::decimal;
use crate::error::TypeError;

/// A structured value after wire demarshalling, before schema-driven
/// decoding.
///
/// This is the hand-off format between the row-fetching layer and the
/// decoder. Objects keep their fields in wire order as named pairs;
/// arrays keep element order. Nothing here knows about the column's
/// declared type; that is the decoder's job.
///
/// ```text
/// {'string': 'a', 'simpleClass': {'string': 'b'}}
///
///   Object([
///     ("string",      Text("a")),
///     ("simpleClass", Object([("string", Text("b"))])),
///   ])
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// A number kept in its wire spelling because neither `Integer` nor
    /// `Float` holds it exactly.
    Decimal(String),
    Text(String),
    Binary(Vec<u8>),
    Object(Vec<(String, RawValue)>),
    Array(Vec<RawValue>),
}

impl RawValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short shape name used in mismatch diagnostics.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "number",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
        }
    }

    /// Look up an object field by name. Returns `None` for non-objects.
    ///
    /// Duplicate names resolve to the last occurrence, matching how the
    /// server's JSON would be read by any other consumer.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        match self {
            Self::Object(fields) => fields.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Parse JSON text as delivered by the JSON result format.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Json`] when the text is not valid JSON.
    pub fn parse_json(text: &str) -> Result<Self, TypeError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from(value))
    }

    /// Render as JSON text. BINARY renders as lowercase hex, the same
    /// spelling the server uses.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::from(self.clone()).to_string()
    }

    /// Decode a hex-spelled BINARY leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidHex`] for malformed hex.
    pub fn hex_bytes(text: &str) -> Result<Vec<u8>, TypeError> {
        Ok(hex::decode(text)?)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => {
                    let text = n.to_string();
                    decimal::exact_f64(&text).map_or(Self::Decimal(text), Self::Float)
                }
            },
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<RawValue> for Value {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Null => Value::Null,
            RawValue::Boolean(b) => Value::Bool(b),
            RawValue::Integer(i) => Value::Number(i.into()),
            RawValue::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            RawValue::Decimal(s) => match s.parse::<Number>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::String(s),
            },
            RawValue::Text(s) => Value::String(s),
            RawValue::Binary(bytes) => Value::String(hex::encode(bytes)),
            RawValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RawValue::Object(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (k, v) in fields {
                    map.insert(k, Value::from(v));
                }
                Value::Object(map)
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_field_order() {
        let raw = RawValue::parse_json(r#"{"z": 1, "a": "x", "m": null}"#).unwrap();
        let RawValue::Object(fields) = raw else {
            panic!("expected object");
        };
        let names: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn parse_nested_value() {
        let raw = RawValue::parse_json(r#"{"string":"a","simpleClass":{"string":"b"}}"#).unwrap();
        assert_eq!(raw.get("string"), Some(&RawValue::from("a")));
        assert_eq!(
            raw.get("simpleClass").and_then(|v| v.get("string")),
            Some(&RawValue::from("b"))
        );
        assert!(raw.get("missing").is_none());
    }

    #[test]
    fn numbers_split_into_integer_float_and_decimal() {
        let raw = RawValue::parse_json("[1, 1.5, -7, 18446744073709551615, 12345678901234567.89]")
            .unwrap();
        let RawValue::Array(items) = raw else {
            panic!("expected array");
        };
        assert_eq!(items[0], RawValue::Integer(1));
        assert_eq!(items[1], RawValue::Float(1.5));
        assert_eq!(items[2], RawValue::Integer(-7));
        assert_eq!(items[3], RawValue::Decimal("18446744073709551615".to_string()));
        assert_eq!(items[4], RawValue::Decimal("12345678901234567.89".to_string()));
    }

    #[test]
    fn decimal_renders_its_digits() {
        let raw = RawValue::Array(vec![
            RawValue::Decimal("12345678901234567.89".to_string()),
            RawValue::Float(0.5),
        ]);
        assert_eq!(raw.to_json_string(), "[12345678901234567.89,0.5]");
    }

    #[test]
    fn binary_renders_as_hex() {
        let raw = RawValue::Object(vec![("b".to_string(), RawValue::Binary(vec![0xAB, 0x01]))]);
        assert_eq!(raw.to_json_string(), r#"{"b":"ab01"}"#);
        assert_eq!(RawValue::hex_bytes("ab01").unwrap(), vec![0xAB, 0x01]);
        assert!(matches!(RawValue::hex_bytes("zz"), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn get_prefers_last_duplicate() {
        let raw = RawValue::Object(vec![
            ("k".to_string(), RawValue::Integer(1)),
            ("k".to_string(), RawValue::Integer(2)),
        ]);
        assert_eq!(raw.get("k"), Some(&RawValue::Integer(2)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(RawValue::parse_json("{"), Err(TypeError::Json(_))));
    }
}
