//! Leaf coercions.
//!
//! Each primitive target accepts a fixed set of base types and raw
//! shapes. Widening is silent; anything that would change the value is
//! [`DecodeError::PrecisionLoss`].
//!
//! ```text
//! ┌────────────┬─────────────────────────┬────────────────────────────────┐
//! │ Target     │ Raw shapes              │ Loss check                     │
//! ├────────────┼─────────────────────────┼────────────────────────────────┤
//! │ String     │ text (any under VARIANT)│ none                           │
//! │ bool       │ boolean, "true"/"false" │ none                           │
//! │ i8..i64    │ integer, float, number, │ integral and in range          │
//! │            │ text                    │                                │
//! │ f64        │ float, integer, number, │ whole numbers |x| <= 2^53;     │
//! │            │ text                    │ FIXED digits survive the parse │
//! │ f32        │ as f64                  │ within f32::MAX; FIXED values  │
//! │            │                         │ and whole numbers survive      │
//! └────────────┴─────────────────────────┴────────────────────────────────┘
//! ```
//!
//! Text and wire-spelled numbers go through the same checks as their
//! binary forms, so `"9007199254740993"` fails where
//! `Integer(9007199254740993)` fails.

use strata_types::{BaseType, FieldDescriptor, RawValue, decimal};

use crate::decode::Decode;
use crate::decoder::DecodeContext;
use crate::error::DecodeError;

/// Largest integer magnitude an `f64` holds exactly.
const F64_EXACT_LIMIT: u64 = 1 << 53;

/// The schema's base type cannot feed the requested target.
pub(crate) fn wrong_base(schema: &FieldDescriptor, expected: &'static str) -> DecodeError {
    DecodeError::ShapeMismatch {
        field: schema.name().to_string(),
        expected,
        found: schema.base().keyword(),
    }
}

/// The raw value's shape disagrees with the schema's base type.
pub(crate) fn wrong_shape(
    schema: &FieldDescriptor,
    expected: &'static str,
    raw: &RawValue,
) -> DecodeError {
    DecodeError::ShapeMismatch {
        field: schema.name().to_string(),
        expected,
        found: raw.shape(),
    }
}

fn precision_loss(schema: &FieldDescriptor, value: impl ToString, target: &'static str) -> DecodeError {
    DecodeError::PrecisionLoss {
        field: schema.name().to_string(),
        value: value.to_string(),
        target,
    }
}

impl Decode for String {
    fn decode_raw(
        _cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        match (schema.base(), raw) {
            (BaseType::Variant, RawValue::Text(s)) => Ok(s.clone()),
            (BaseType::Variant, other) => Ok(other.to_json_string()),
            (base, RawValue::Text(s))
                if matches!(base, BaseType::Text | BaseType::Char) || base.is_temporal() =>
            {
                Ok(s.clone())
            }
            (base, other) if matches!(base, BaseType::Text | BaseType::Char) || base.is_temporal() => {
                Err(wrong_shape(schema, "text", other))
            }
            _ => Err(wrong_base(schema, "TEXT")),
        }
    }
}

impl Decode for bool {
    fn decode_raw(
        _cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        if !matches!(schema.base(), BaseType::Boolean | BaseType::Variant) {
            return Err(wrong_base(schema, "BOOLEAN"));
        }
        match raw {
            RawValue::Boolean(b) => Ok(*b),
            RawValue::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            RawValue::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(wrong_shape(schema, "boolean", other)),
        }
    }
}

/// Read an exact integer, rejecting fractional or out-of-range floats.
fn integral(raw: &RawValue, schema: &FieldDescriptor, target: &'static str) -> Result<i64, DecodeError> {
    if !matches!(schema.base(), BaseType::Fixed | BaseType::Real | BaseType::Variant) {
        return Err(wrong_base(schema, "FIXED"));
    }
    match raw {
        RawValue::Integer(i) => Ok(*i),
        RawValue::Float(f) => float_to_integer(*f, schema, target),
        RawValue::Text(s) | RawValue::Decimal(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            match decimal::exact_f64(s) {
                Some(f) => float_to_integer(f, schema, target),
                None if decimal::is_number(s) => Err(precision_loss(schema, s, target)),
                None => Err(wrong_shape(schema, "integer", raw)),
            }
        }
        other => Err(wrong_shape(schema, "integer", other)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_integer(f: f64, schema: &FieldDescriptor, target: &'static str) -> Result<i64, DecodeError> {
    // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(precision_loss(schema, f, target))
    }
}

macro_rules! narrow_integer {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn decode_raw(
                    _cx: DecodeContext<'_>,
                    raw: &RawValue,
                    schema: &FieldDescriptor,
                ) -> Result<Self, DecodeError> {
                    let wide = integral(raw, schema, $name)?;
                    <$ty>::try_from(wide).map_err(|_| precision_loss(schema, wide, $name))
                }
            }
        )*
    };
}

narrow_integer!(i8 => "i8", i16 => "i16", i32 => "i32");

impl Decode for i64 {
    fn decode_raw(
        _cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        integral(raw, schema, "i64")
    }
}

#[allow(clippy::cast_precision_loss)]
fn widen(i: i64, schema: &FieldDescriptor, target: &'static str) -> Result<f64, DecodeError> {
    if i.unsigned_abs() <= F64_EXACT_LIMIT {
        Ok(i as f64)
    } else {
        Err(precision_loss(schema, i, target))
    }
}

fn floating(raw: &RawValue, schema: &FieldDescriptor, target: &'static str) -> Result<f64, DecodeError> {
    if !matches!(schema.base(), BaseType::Real | BaseType::Fixed | BaseType::Variant) {
        return Err(wrong_base(schema, "REAL"));
    }
    match raw {
        RawValue::Float(f) => Ok(*f),
        RawValue::Integer(i) => widen(*i, schema, target),
        RawValue::Text(s) | RawValue::Decimal(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return widen(i, schema, target);
            }
            // REAL text is approximate already; FIXED text and whole
            // numbers must keep every digit.
            if schema.base() == BaseType::Fixed || decimal::is_integral(s) {
                return match decimal::exact_f64(s) {
                    Some(f) => Ok(f),
                    None if decimal::is_number(s) => Err(precision_loss(schema, s, target)),
                    None => Err(wrong_shape(schema, "float", raw)),
                };
            }
            s.parse::<f64>().map_err(|_| wrong_shape(schema, "float", raw))
        }
        other => Err(wrong_shape(schema, "float", other)),
    }
}

impl Decode for f64 {
    fn decode_raw(
        _cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        floating(raw, schema, "f64")
    }
}

impl Decode for f32 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    fn decode_raw(
        _cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        let wide = floating(raw, schema, "f32")?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(precision_loss(schema, wide, "f32"));
        }
        let narrow = wide as f32;
        let whole = wide.fract() == 0.0 && wide.abs() <= F64_EXACT_LIMIT as f64;
        let exact_wanted = schema.base() == BaseType::Fixed || whole;
        if wide.is_finite() && exact_wanted && f64::from(narrow) != wide {
            return Err(precision_loss(schema, wide, "f32"));
        }
        Ok(narrow)
    }
}

/// BINARY leaf: raw bytes pass through, text is read as hex.
pub(crate) fn binary(raw: &RawValue, schema: &FieldDescriptor) -> Result<Vec<u8>, DecodeError> {
    if !matches!(schema.base(), BaseType::Binary | BaseType::Variant) {
        return Err(wrong_base(schema, "BINARY"));
    }
    match raw {
        RawValue::Binary(bytes) => Ok(bytes.clone()),
        RawValue::Text(text) => RawValue::hex_bytes(text).map_err(|_| DecodeError::ShapeMismatch {
            field: schema.name().to_string(),
            expected: "hex text",
            found: "text",
        }),
        other => Err(wrong_shape(schema, "binary", other)),
    }
}
