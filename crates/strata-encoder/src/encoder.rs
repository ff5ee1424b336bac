use std::any::type_name;

use strata_types::{BaseType, FieldDescriptor, RawValue};
use tracing::trace;

use crate::encode::Encode;
use crate::error::EncodeError;
use crate::sink::FieldSink;

/// A client-side composite type that can write itself as an OBJECT
/// value.
///
/// Implementations write their fields in schema order, one `write_*`
/// call per declared field, the same order their `SqlData::read_fields`
/// reads them. Every `SqlWrite` type is also [`Encode`], so composites
/// nest inside arrays and maps.
pub trait SqlWrite {
    /// # Errors
    ///
    /// Propagate any [`EncodeError`] returned by `sink`.
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError>;
}

/// Encodes client values into the raw structured representation the
/// decoder consumes.
///
/// Stateless; the schema passed to each call decides the field names
/// and checks every write.
///
/// # Example
///
/// ```rust
/// use strata_encoder::{EncodeError, FieldSink, SqlWrite, StructEncoder};
/// use strata_types::FieldDescriptor;
///
/// struct Point { x: i64, y: i64 }
///
/// impl SqlWrite for Point {
///     fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
///         sink.write_long(Some(self.x))?;
///         sink.write_long(Some(self.y))
///     }
/// }
///
/// let schema = FieldDescriptor::object(
///     "p",
///     vec![FieldDescriptor::fixed("x", 38, 0), FieldDescriptor::fixed("y", 38, 0)],
/// );
/// let raw = StructEncoder::encode(&Point { x: 1, y: 2 }, &schema).unwrap();
/// assert_eq!(raw.to_json_string(), r#"{"x":1,"y":2}"#);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct StructEncoder;

impl StructEncoder {
    /// Encode `value` as an OBJECT under `schema`.
    ///
    /// # Errors
    ///
    /// [`EncodeError::KindMismatch`] if `schema` is not an OBJECT, or any
    /// error from the value's `write_fields`, with the field path
    /// prefixed by `schema`'s name.
    pub fn encode<T: SqlWrite>(value: &T, schema: &FieldDescriptor) -> Result<RawValue, EncodeError> {
        if schema.base() != BaseType::Object {
            return Err(EncodeError::KindMismatch {
                field: schema.name().to_string(),
                base: schema.base().keyword(),
                value: "object",
            });
        }
        let mut sink = FieldSink::new(schema, type_name::<T>());
        let raw = value
            .write_fields(&mut sink)
            .and_then(|()| sink.finish())
            .map_err(|e| e.within(schema.name()))?;
        trace!(target_type = type_name::<T>(), field = %schema.name(), "encoded object");
        Ok(raw)
    }

    /// Encode `values` as an ARRAY under `schema`.
    ///
    /// # Errors
    ///
    /// [`EncodeError::KindMismatch`] if `schema` is not an ARRAY, or the
    /// first element failure, with the element index in its path.
    pub fn encode_array<T: Encode>(
        values: &[T],
        schema: &FieldDescriptor,
    ) -> Result<RawValue, EncodeError> {
        let raw = values.encode_raw(schema)?;
        trace!(field = %schema.name(), len = values.len(), "encoded array");
        Ok(raw)
    }
}
