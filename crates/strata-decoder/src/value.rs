use std::fmt;

use serde_json::{Map, Number, Value};
use strata_types::{BaseType, FieldDescriptor, RawValue, decimal};

use crate::decode::Decode;
use crate::decoder::{self, DecodeContext};
use crate::error::DecodeError;
use crate::input::NULL;
use crate::{map, primitive};

/// A structured value decoded without a static target type.
///
/// The schema still drives every leaf: a FIXED column with scale 0
/// becomes `Integer`, with a positive scale `Float`; a FIXED value
/// neither holds exactly stays `Decimal` in its wire spelling. A MAP
/// keeps its typed keys. Only VARIANT nodes take the raw value as-is.
///
/// Used by tooling (the `strata` CLI, fixtures) that must decode
/// arbitrary columns it has no Rust type for.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Exact decimal digits, e.g. a NUMBER(38,2) past `f64` precision.
    Decimal(String),
    Text(String),
    Binary(Vec<u8>),
    /// Fields in schema order.
    Object(Vec<(String, DecodedValue)>),
    Array(Vec<DecodedValue>),
    /// Entries in first-seen key order; a repeated key keeps its last
    /// value.
    Map(Vec<(DecodedValue, DecodedValue)>),
}

impl DecodedValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Object field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            Self::Object(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render as JSON. BINARY becomes lowercase hex; non-finite floats
    /// become `null`; map keys that are not text are rendered as their
    /// JSON spelling.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Decimal(s) => s
                .parse::<Number>()
                .map_or_else(|_| Value::String(s.clone()), Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::Binary(bytes) => Value::String(hex::encode(bytes)),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| {
                        let key = match k {
                            Self::Text(s) => s.clone(),
                            other => other.to_json().to_string(),
                        };
                        (key, v.to_json())
                    })
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<&RawValue> for DecodedValue {
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::Null => Self::Null,
            RawValue::Boolean(b) => Self::Boolean(*b),
            RawValue::Integer(i) => Self::Integer(*i),
            RawValue::Float(f) => Self::Float(*f),
            RawValue::Decimal(s) => Self::Decimal(s.clone()),
            RawValue::Text(s) => Self::Text(s.clone()),
            RawValue::Binary(bytes) => Self::Binary(bytes.clone()),
            RawValue::Object(fields) => Self::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
            RawValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
        }
    }
}

impl Decode for DecodedValue {
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        match schema.base() {
            BaseType::Text
            | BaseType::Char
            | BaseType::Date
            | BaseType::Time
            | BaseType::TimestampLtz
            | BaseType::TimestampNtz
            | BaseType::TimestampTz => String::decode_raw(cx, raw, schema).map(Self::Text),
            BaseType::Fixed => fixed(cx, raw, schema),
            BaseType::Real => f64::decode_raw(cx, raw, schema).map(Self::Float),
            BaseType::Boolean => bool::decode_raw(cx, raw, schema).map(Self::Boolean),
            BaseType::Binary => primitive::binary(raw, schema).map(Self::Binary),
            BaseType::Variant => Ok(Self::from(raw)),
            BaseType::Object => decode_fields(cx, raw, schema),
            BaseType::Array => Vec::<Self>::decode_raw(cx, raw, schema).map(Self::Array),
            BaseType::Map => {
                let mut entries: Vec<(Self, Self)> = Vec::new();
                map::entries(cx, raw, schema, |k: Self, v: Self| {
                    match entries.iter_mut().find(|(existing, _)| *existing == k) {
                        Some(entry) => entry.1 = v,
                        None => entries.push((k, v)),
                    }
                })?;
                Ok(Self::Map(entries))
            }
        }
    }

    fn decode_null(_schema: &FieldDescriptor) -> Result<Self, DecodeError> {
        Ok(Self::Null)
    }
}

/// FIXED leaf. Scale 0 reads as `Integer`, a positive scale as `Float`;
/// a value either would round keeps its exact digits as `Decimal`.
fn fixed(
    cx: DecodeContext<'_>,
    raw: &RawValue,
    schema: &FieldDescriptor,
) -> Result<DecodedValue, DecodeError> {
    let decoded = if schema.scale() == 0 {
        i64::decode_raw(cx, raw, schema).map(DecodedValue::Integer)
    } else {
        f64::decode_raw(cx, raw, schema).map(DecodedValue::Float)
    };
    match (decoded, raw) {
        (Err(DecodeError::PrecisionLoss { .. }), RawValue::Integer(i)) if schema.scale() > 0 => {
            Ok(DecodedValue::Decimal(i.to_string()))
        }
        (Err(DecodeError::PrecisionLoss { .. }), RawValue::Text(s) | RawValue::Decimal(s))
            if decimal::is_number(s) && (schema.scale() > 0 || decimal::is_integral(s)) =>
        {
            Ok(DecodedValue::Decimal(s.trim().to_string()))
        }
        (decoded, _) => decoded,
    }
}

/// Dynamic OBJECT decode: one entry per schema field, missing raw
/// fields read as null.
fn decode_fields(
    cx: DecodeContext<'_>,
    raw: &RawValue,
    schema: &FieldDescriptor,
) -> Result<DecodedValue, DecodeError> {
    decoder::object_fields(cx, raw, schema)?;
    let cx = cx.nested(schema)?;
    schema
        .fields()
        .iter()
        .map(|field| {
            let value = raw.get(field.name()).unwrap_or(&NULL);
            cx.decode(value, field).map(|v| (field.name().to_string(), v))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(DecodedValue::Object)
        .map_err(|e| e.within(schema.name()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use strata_types::sql_types;

    use crate::{ErrorKind, FactoryRegistry, StructDecoder};

    use super::*;

    fn decoder() -> StructDecoder {
        StructDecoder::new(Arc::new(FactoryRegistry::new()))
    }

    fn raw(json: &str) -> RawValue {
        RawValue::parse_json(json).unwrap()
    }

    fn order_schema() -> FieldDescriptor {
        FieldDescriptor::object(
            "order",
            vec![
                FieldDescriptor::fixed("id", 38, 0),
                FieldDescriptor::fixed("total", 12, 2),
                FieldDescriptor::binary("digest"),
                FieldDescriptor::array("tags", FieldDescriptor::text("")),
                FieldDescriptor::map("attrs", FieldDescriptor::text(""), FieldDescriptor::real("")),
                FieldDescriptor::new("extra", BaseType::Variant, "VARIANT", sql_types::VARCHAR),
                FieldDescriptor::text("note"),
            ],
        )
    }

    #[test]
    fn schema_drives_leaf_types() {
        let value = decoder()
            .decode_value(
                &raw(r#"{"id":"7","total":12,"digest":"00ff","tags":["x"],"attrs":{"w":1},"extra":{"k":true}}"#),
                &order_schema(),
            )
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(value.get("id"), Some(&DecodedValue::Integer(7)));
        assert_eq!(value.get("total"), Some(&DecodedValue::Float(12.0)));
        assert_eq!(value.get("digest"), Some(&DecodedValue::Binary(vec![0x00, 0xff])));
        assert_eq!(
            value.get("attrs"),
            Some(&DecodedValue::Map(vec![(
                DecodedValue::Text("w".to_string()),
                DecodedValue::Float(1.0)
            )]))
        );
        assert_eq!(
            value.get("extra"),
            Some(&DecodedValue::Object(vec![("k".to_string(), DecodedValue::Boolean(true))]))
        );
        assert_eq!(value.get("note"), Some(&DecodedValue::Null));
    }

    #[test]
    fn renders_json_in_schema_order() {
        let value = decoder()
            .decode_value(
                &raw(r#"{"note":"n","id":1,"digest":"0a","tags":[],"attrs":{},"extra":null}"#),
                &order_schema(),
            )
            .unwrap();
        insta::assert_snapshot!(
            value.to_string(),
            @r#"{"id":1,"total":null,"digest":"0a","tags":[],"attrs":{},"extra":null,"note":"n"}"#
        );
    }

    #[test]
    fn null_column_is_null_value() {
        let value = decoder().decode_value(&RawValue::Null, &order_schema()).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn map_duplicates_keep_last() {
        let schema = FieldDescriptor::map("m", FieldDescriptor::text(""), FieldDescriptor::fixed("", 38, 0));
        let raw = RawValue::Object(vec![
            ("a".to_string(), RawValue::Integer(1)),
            ("b".to_string(), RawValue::Integer(2)),
            ("a".to_string(), RawValue::Integer(3)),
        ]);
        let value = decoder().decode_value(&raw, &schema).unwrap();
        assert_eq!(value.to_json(), serde_json::json!({"a": 3, "b": 2}));
    }

    #[test]
    fn fixed_keeps_exact_digits() {
        let schema = FieldDescriptor::object("o", vec![FieldDescriptor::fixed("amt", 38, 2)]);
        for json in [
            r#"{"amt":"12345678901234567.89"}"#,
            r#"{"amt":12345678901234567.89}"#,
        ] {
            let value = decoder().decode_value(&raw(json), &schema).unwrap();
            assert_eq!(
                value.get("amt"),
                Some(&DecodedValue::Decimal("12345678901234567.89".to_string())),
                "{json}"
            );
            assert_eq!(
                value.to_json(),
                serde_json::from_str::<Value>(r#"{"amt":12345678901234567.89}"#).unwrap()
            );
        }

        let value = decoder().decode_value(&raw(r#"{"amt":"12.25"}"#), &schema).unwrap();
        assert_eq!(value.to_json(), serde_json::json!({"amt": 12.25}));
    }

    #[test]
    fn wide_integers_stay_exact() {
        let schema = FieldDescriptor::fixed("n", 38, 0);
        let value = decoder()
            .decode_value(&raw("123456789012345678901234567890"), &schema)
            .unwrap();
        assert_eq!(value, DecodedValue::Decimal("123456789012345678901234567890".to_string()));

        let scaled = FieldDescriptor::fixed("n", 38, 2);
        let value = decoder()
            .decode_value(&RawValue::Integer((1 << 53) + 1), &scaled)
            .unwrap();
        assert_eq!(value, DecodedValue::Decimal("9007199254740993".to_string()));
    }

    #[test]
    fn leaf_errors_still_apply() {
        let err = decoder()
            .decode_value(&raw(r#"{"id":1.5}"#), &order_schema())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PrecisionLoss);
        assert!(matches!(err, DecodeError::PrecisionLoss { ref field, .. } if field == "order.id"));
    }
}
