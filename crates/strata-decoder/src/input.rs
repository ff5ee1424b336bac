use strata_types::{FieldDescriptor, RawValue};

use crate::decode::Decode;
use crate::decoder::{self, DecodeContext};
use crate::error::DecodeError;
use crate::primitive;

/// A client-side composite type that the decoder populates from an
/// OBJECT value.
///
/// Implementors read their fields from a [`FieldSource`] in the order
/// the schema declares them. The mapping is positional: the first read
/// receives the schema's first field, whatever its name, and the target
/// must read exactly as many fields as the schema declares.
///
/// Construction goes through the
/// [`FactoryRegistry`](crate::FactoryRegistry) first. Types that can
/// also build themselves without one override
/// [`construct_default`](Self::construct_default); types that cannot
/// leave it as `None` and fail with
/// [`DecodeError::UnsupportedTarget`] when no factory is registered.
pub trait SqlData: Sized + 'static {
    /// A fresh instance to populate when no factory is registered.
    fn construct_default() -> Option<Self> {
        None
    }

    /// Populate `self` from the object's fields, in schema order.
    ///
    /// # Errors
    ///
    /// Propagate any [`DecodeError`] returned by `source`.
    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError>;
}

impl<T: SqlData> Decode for T {
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        decoder::decode_object(cx, raw, schema)
    }
}

pub(crate) static NULL: RawValue = RawValue::Null;

/// Sequential reader over one OBJECT value's fields.
///
/// Each `read_*` call consumes the next declared field and decodes its
/// raw value under that field's descriptor. A field missing from the raw
/// object reads as null. The typed helpers return `Option` so that a
/// nullable field can come back empty; use [`read`](Self::read) with a
/// non-`Option` target to require a value.
pub struct FieldSource<'a> {
    cx: DecodeContext<'a>,
    schema: &'a FieldDescriptor,
    raw: &'a RawValue,
    cursor: usize,
    target: &'static str,
}

impl<'a> FieldSource<'a> {
    pub(crate) fn new(
        cx: DecodeContext<'a>,
        schema: &'a FieldDescriptor,
        raw: &'a RawValue,
        target: &'static str,
    ) -> Self {
        Self {
            cx,
            schema,
            raw,
            cursor: 0,
            target,
        }
    }

    /// Descriptor of the next field to be read, without consuming it.
    #[must_use]
    pub fn field(&self) -> Option<&'a FieldDescriptor> {
        self.schema.fields().get(self.cursor)
    }

    /// Number of declared fields not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.schema.fields().len().saturating_sub(self.cursor)
    }

    /// Decode the next field into any [`Decode`] target.
    ///
    /// # Errors
    ///
    /// [`DecodeError::FieldCountMismatch`] when every declared field has
    /// already been read, otherwise any error decoding the field.
    pub fn read<T: Decode>(&mut self) -> Result<T, DecodeError> {
        let (raw, field) = self.next_field()?;
        self.cx.decode(raw, field)
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_string(&mut self) -> Result<Option<String>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_boolean(&mut self) -> Result<Option<bool>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_byte(&mut self) -> Result<Option<i8>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_short(&mut self) -> Result<Option<i16>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_int(&mut self) -> Result<Option<i32>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_long(&mut self) -> Result<Option<i64>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_float(&mut self) -> Result<Option<f32>, DecodeError> {
        self.read()
    }

    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_double(&mut self) -> Result<Option<f64>, DecodeError> {
        self.read()
    }

    /// Read a BINARY field. Raw binary passes through; text is taken as
    /// hex.
    ///
    /// # Errors
    ///
    /// [`DecodeError::ShapeMismatch`] for a non-BINARY field or
    /// malformed hex, plus the null rules of [`read`](Self::read).
    pub fn read_bytes(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
        let (raw, field) = self.next_field()?;
        if raw.is_null() {
            if field.nullable() {
                return Ok(None);
            }
            return Err(DecodeError::NullViolation {
                field: field.name().to_string(),
            });
        }
        primitive::binary(raw, field).map(Some)
    }

    /// Read a nested OBJECT field into a composite target.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_object<T: SqlData>(&mut self) -> Result<Option<T>, DecodeError> {
        self.read()
    }

    /// Read an ARRAY field.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_array<T: Decode>(&mut self) -> Result<Option<Vec<T>>, DecodeError> {
        self.read()
    }

    fn next_field(&mut self) -> Result<(&'a RawValue, &'a FieldDescriptor), DecodeError> {
        let Some(field) = self.schema.fields().get(self.cursor) else {
            return Err(DecodeError::FieldCountMismatch {
                field: String::new(),
                target: self.target,
                expected: self.schema.fields().len(),
                actual: self.cursor + 1,
            });
        };
        self.cursor += 1;
        Ok((self.raw.get(field.name()).unwrap_or(&NULL), field))
    }

    /// Confirm the target consumed every declared field.
    ///
    /// # Errors
    ///
    /// [`DecodeError::FieldCountMismatch`] when fields remain unread.
    pub fn finish(&self) -> Result<(), DecodeError> {
        if self.cursor == self.schema.fields().len() {
            Ok(())
        } else {
            Err(DecodeError::FieldCountMismatch {
                field: String::new(),
                target: self.target,
                expected: self.schema.fields().len(),
                actual: self.cursor,
            })
        }
    }
}
