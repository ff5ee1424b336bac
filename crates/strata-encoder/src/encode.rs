//! Typed encoding of leaves and containers.
//!
//! [`Encode`] is the write-side mirror of the decoder's `Decode`: every
//! type one can read back from a field can be written into one.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┬──────────────────────┐
//! │ Source               │ Accepted bases       │ Raw form             │
//! ├──────────────────────┼──────────────────────┼──────────────────────┤
//! │ String, str          │ TEXT, CHAR, temporal │ Text                 │
//! │ bool                 │ BOOLEAN              │ Boolean              │
//! │ i8..i64              │ FIXED, REAL          │ Integer              │
//! │ f32, f64             │ FIXED, REAL          │ Float                │
//! │ Option<T>            │ as T; None → null    │ Null or as T         │
//! │ Vec<T>, [T]          │ ARRAY                │ Array                │
//! │ BTreeMap, HashMap    │ MAP                  │ Object keyed by text │
//! │ T: SqlWrite          │ OBJECT               │ Object               │
//! │ RawValue             │ by outer shape       │ unchanged            │
//! └──────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! VARIANT accepts every leaf.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use strata_types::{BaseType, FieldDescriptor, RawValue};

use crate::encoder::{SqlWrite, StructEncoder};
use crate::error::EncodeError;

/// A value that can be written under a schema node.
pub trait Encode {
    /// Encode `self` under `schema`. Implementations check that the
    /// node's base type can hold the value; nulls are handled by
    /// `Option`.
    ///
    /// # Errors
    ///
    /// [`EncodeError::KindMismatch`] when the base type cannot hold the
    /// value, or any error encoding a nested part.
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError>;
}

pub(crate) fn is_text(base: BaseType) -> bool {
    matches!(base, BaseType::Text | BaseType::Char) || base.is_temporal()
}

pub(crate) fn is_numeric(base: BaseType) -> bool {
    matches!(base, BaseType::Fixed | BaseType::Real)
}

/// Reject `kind` unless the node's base accepts it or is VARIANT.
pub(crate) fn check_kind(
    schema: &FieldDescriptor,
    accepts: fn(BaseType) -> bool,
    kind: &'static str,
) -> Result<(), EncodeError> {
    if accepts(schema.base()) || schema.base() == BaseType::Variant {
        Ok(())
    } else {
        Err(EncodeError::KindMismatch {
            field: schema.name().to_string(),
            base: schema.base().keyword(),
            value: kind,
        })
    }
}

/// The null form of a node, if it admits one.
pub(crate) fn null(schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
    if schema.nullable() {
        Ok(RawValue::Null)
    } else {
        Err(EncodeError::NullViolation {
            field: schema.name().to_string(),
        })
    }
}

/// `None` goes through the null rule, `Some` through `T`.
pub(crate) fn optional<T: Encode + ?Sized>(
    value: Option<&T>,
    schema: &FieldDescriptor,
) -> Result<RawValue, EncodeError> {
    match value {
        Some(value) => value.encode_raw(schema),
        None => null(schema),
    }
}

impl Encode for str {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        check_kind(schema, is_text, "string")?;
        Ok(RawValue::Text(self.to_string()))
    }
}

impl Encode for String {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        self.as_str().encode_raw(schema)
    }
}

impl Encode for bool {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        check_kind(schema, |b| b == BaseType::Boolean, "boolean")?;
        Ok(RawValue::Boolean(*self))
    }
}

macro_rules! encode_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
                    check_kind(schema, is_numeric, "integer")?;
                    Ok(RawValue::Integer(i64::from(*self)))
                }
            }
        )*
    };
}

encode_integer!(i8, i16, i32, i64);

impl Encode for f64 {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        check_kind(schema, is_numeric, "float")?;
        Ok(RawValue::Float(*self))
    }
}

/// Widened exactly, so the value narrows back unchanged.
impl Encode for f32 {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        f64::from(*self).encode_raw(schema)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        optional(self.as_ref(), schema)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        let Some(element) = schema.element() else {
            return Err(EncodeError::KindMismatch {
                field: schema.name().to_string(),
                base: schema.base().keyword(),
                value: "array",
            });
        };
        self.iter()
            .enumerate()
            .map(|(i, item)| {
                item.encode_raw(element)
                    .map_err(|e| e.within(&format!("{}[{i}]", schema.name())))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RawValue::Array)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        self.as_slice().encode_raw(schema)
    }
}

/// Encode MAP entries. Keys are encoded under the key descriptor and
/// then spelled as object field names, the form the decoder reads them
/// from.
pub(crate) fn entries<'m, K, V>(
    entries: impl IntoIterator<Item = (&'m K, &'m V)>,
    schema: &FieldDescriptor,
) -> Result<RawValue, EncodeError>
where
    K: Encode + 'm,
    V: Encode + 'm,
{
    let Some((key_schema, value_schema)) = schema.map_entry() else {
        return Err(EncodeError::KindMismatch {
            field: schema.name().to_string(),
            base: schema.base().keyword(),
            value: "map",
        });
    };
    entries
        .into_iter()
        .map(|(key, value)| -> Result<(String, RawValue), EncodeError> {
            let key = key
                .encode_raw(key_schema)
                .and_then(|raw| key_text(raw, schema))
                .map_err(|e| e.within(schema.name()))?;
            let value = value
                .encode_raw(value_schema)
                .map_err(|e| e.within(&format!("{}[{key:?}]", schema.name())))?;
            Ok((key, value))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(RawValue::Object)
}

fn key_text(raw: RawValue, schema: &FieldDescriptor) -> Result<String, EncodeError> {
    match raw {
        RawValue::Text(s) | RawValue::Decimal(s) => Ok(s),
        RawValue::Integer(i) => Ok(i.to_string()),
        RawValue::Float(f) => Ok(f.to_string()),
        RawValue::Boolean(b) => Ok(b.to_string()),
        other => Err(EncodeError::KindMismatch {
            field: String::new(),
            base: schema.base().keyword(),
            value: other.shape(),
        }),
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        entries(self, schema)
    }
}

impl<K: Encode, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        entries(self, schema)
    }
}

impl<T: SqlWrite> Encode for T {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        StructEncoder::encode(self, schema)
    }
}

/// A pre-built value. Only its outer shape is checked against the
/// node; text is accepted wherever the decoder reads a leaf from its
/// spelling, never for a composite.
impl Encode for RawValue {
    fn encode_raw(&self, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        let (accepts, kind): (fn(BaseType) -> bool, _) = match self {
            RawValue::Null => return null(schema),
            RawValue::Boolean(_) => (|b| b == BaseType::Boolean, "boolean"),
            RawValue::Integer(_) | RawValue::Float(_) | RawValue::Decimal(_) => {
                (is_numeric, "number")
            }
            RawValue::Text(_) => (|b| !b.is_composite(), "text"),
            RawValue::Binary(_) => (|b| b == BaseType::Binary, "binary"),
            RawValue::Object(_) => (|b| matches!(b, BaseType::Object | BaseType::Map), "object"),
            RawValue::Array(_) => (|b| b == BaseType::Array, "array"),
        };
        check_kind(schema, accepts, kind)?;
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use strata_types::sql_types;

    use super::*;

    #[test]
    fn leaves_check_base() {
        let text = FieldDescriptor::text("s");
        assert_eq!("a".encode_raw(&text).unwrap(), RawValue::Text("a".to_string()));
        assert!(matches!(
            7i32.encode_raw(&text),
            Err(EncodeError::KindMismatch { base: "TEXT", value: "integer", .. })
        ));

        let variant = FieldDescriptor::new("v", BaseType::Variant, "VARIANT", sql_types::VARCHAR);
        assert_eq!(true.encode_raw(&variant).unwrap(), RawValue::Boolean(true));
        assert_eq!(1.5f32.encode_raw(&variant).unwrap(), RawValue::Float(1.5));
    }

    #[test]
    fn option_applies_null_rule() {
        let n = FieldDescriptor::fixed("n", 38, 0);
        assert_eq!(None::<i64>.encode_raw(&n).unwrap(), RawValue::Null);
        assert!(matches!(
            None::<i64>.encode_raw(&n.clone().with_nullable(false)),
            Err(EncodeError::NullViolation { ref field }) if field == "n"
        ));
    }

    #[test]
    fn primitive_arrays_name_bad_elements() {
        let tags = FieldDescriptor::array("tags", FieldDescriptor::text("").with_nullable(false));
        assert_eq!(
            vec!["a".to_string(), "b".to_string()].encode_raw(&tags).unwrap(),
            RawValue::Array(vec![RawValue::from("a"), RawValue::from("b")])
        );
        let err = vec![Some("a".to_string()), None].encode_raw(&tags).unwrap_err();
        assert!(matches!(err, EncodeError::NullViolation { ref field } if field == "tags[1]"));
        assert!(vec![1i64].encode_raw(&FieldDescriptor::text("s")).is_err());
    }

    #[test]
    fn map_keys_become_field_names() {
        let schema = FieldDescriptor::map(
            "m",
            FieldDescriptor::fixed("", 38, 0),
            FieldDescriptor::real(""),
        );
        let map = BTreeMap::from([(2i64, 0.5f64), (10, 1.0)]);
        assert_eq!(
            map.encode_raw(&schema).unwrap(),
            RawValue::Object(vec![
                ("2".to_string(), RawValue::Float(0.5)),
                ("10".to_string(), RawValue::Float(1.0)),
            ])
        );

        let text_values = FieldDescriptor::map("m", FieldDescriptor::text(""), FieldDescriptor::text(""));
        let err = HashMap::from([("k".to_string(), 1i64)])
            .encode_raw(&text_values)
            .unwrap_err();
        assert!(matches!(err, EncodeError::KindMismatch { ref field, .. } if field == r#"m["k"]"#));
    }

    #[test]
    fn raw_text_is_refused_for_composites() {
        let text = RawValue::Text("a".to_string());
        let tags = FieldDescriptor::array("tags", FieldDescriptor::text(""));
        assert!(matches!(
            text.encode_raw(&tags),
            Err(EncodeError::KindMismatch { base: "ARRAY", value: "text", .. })
        ));
        let date = FieldDescriptor::new("d", BaseType::Date, "DATE", sql_types::DATE);
        assert_eq!(text.encode_raw(&date).unwrap(), text);
        let amount = FieldDescriptor::fixed("amt", 38, 2);
        assert_eq!(text.encode_raw(&amount).unwrap(), text);
    }
}
