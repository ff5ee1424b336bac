use strata_types::{FieldDescriptor, RawValue};

use crate::decoder::DecodeContext;
use crate::error::DecodeError;

/// A client-side type that can be produced from a raw structured value
/// under a schema descriptor.
///
/// The decoder handles nulls before dispatching here: `decode_raw` only
/// ever sees non-null input, and `decode_null` is consulted only when a
/// null arrives at a nullable schema node. That keeps "return null
/// immediately, never construct" a property of the decoder rather than
/// of each implementation.
///
/// Implementations shipped with the crate:
///
/// ```text
/// ┌───────────────────────────────┬──────────────────────────────────┐
/// │ Target                        │ Accepted base types              │
/// ├───────────────────────────────┼──────────────────────────────────┤
/// │ String                        │ TEXT, CHAR, temporal, VARIANT    │
/// │ bool                          │ BOOLEAN, VARIANT                 │
/// │ i8 / i16 / i32 / i64          │ FIXED, REAL (integral), VARIANT  │
/// │ f32 / f64                     │ REAL, FIXED, VARIANT             │
/// │ Option<T>                     │ as T, plus null                  │
/// │ Vec<T>                        │ ARRAY                            │
/// │ BTreeMap<K, V> / HashMap      │ MAP                              │
/// │ DecodedValue                  │ anything (dynamic)               │
/// │ T: SqlData                    │ OBJECT                           │
/// └───────────────────────────────┴──────────────────────────────────┘
/// ```
pub trait Decode: Sized {
    /// Decode a non-null raw value.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the raw shape or the schema's base
    /// type cannot produce `Self`.
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError>;

    /// The value to produce for a null at a nullable node.
    ///
    /// Most targets cannot represent null, so the default is
    /// [`DecodeError::NullViolation`]; wrap the target in `Option` to
    /// accept nulls.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NullViolation`] unless overridden.
    fn decode_null(schema: &FieldDescriptor) -> Result<Self, DecodeError> {
        Err(DecodeError::NullViolation {
            field: schema.name().to_string(),
        })
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        T::decode_raw(cx, raw, schema).map(Some)
    }

    fn decode_null(_schema: &FieldDescriptor) -> Result<Self, DecodeError> {
        Ok(None)
    }
}
