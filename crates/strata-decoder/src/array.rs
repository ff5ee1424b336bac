use std::any::type_name;
use std::borrow::Cow;

use strata_types::{BaseType, FieldDescriptor, RawValue, TypeError};
use tracing::trace;

use crate::decode::Decode;
use crate::decoder::{self, DecodeContext, StructDecoder};
use crate::error::DecodeError;
use crate::input::{FieldSource, SqlData};
use crate::primitive::{wrong_base, wrong_shape};

fn element_of(schema: &FieldDescriptor) -> Result<&FieldDescriptor, DecodeError> {
    schema.element().ok_or_else(|| {
        DecodeError::Type(TypeError::InvalidSchema {
            path: schema.name().to_string(),
            reason: "ARRAY without an element descriptor".to_string(),
        })
    })
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        if schema.base() != BaseType::Array {
            return Err(wrong_base(schema, "ARRAY"));
        }
        let element = element_of(schema)?;
        let RawValue::Array(items) = raw else {
            return Err(wrong_shape(schema, "array", raw));
        };
        let cx = cx.nested(schema)?;
        let values = decode_elements(cx, items, element, schema.name())?;
        trace!(field = %schema.name(), len = values.len(), "decoded array");
        Ok(values)
    }
}

/// Decode each element under `element`, keeping order. Nulls go
/// through the element descriptor's null rule like any other node.
pub(crate) fn materialize<T: Decode>(
    cx: DecodeContext<'_>,
    items: &[RawValue],
    element: &FieldDescriptor,
) -> Result<Vec<T>, DecodeError> {
    decode_elements(cx, items, element, "")
}

fn decode_elements<T: Decode>(
    cx: DecodeContext<'_>,
    items: &[RawValue],
    element: &FieldDescriptor,
    path: &str,
) -> Result<Vec<T>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            cx.decode(item, element)
                .map_err(|e| e.within(&format!("{path}[{i}]")))
        })
        .collect()
}

/// The elements of an ARRAY of OBJECT, handed out as one
/// [`FieldSource`] each so the caller can build and populate its own
/// instances instead of letting the decoder construct them.
///
/// ```text
/// [{"string":"aaa"}, null, {"string":"bbb"}]
///
///   sources()  →  Ok(Some(FieldSource))   ARR[0]
///                 Ok(None)                ARR[1]  (nullable element)
///                 Ok(Some(FieldSource))   ARR[2]
/// ```
///
/// Each source reads exactly like the one a [`SqlData`] implementation
/// receives; call [`FieldSource::finish`] after reading to enforce the
/// declared field count.
pub struct ElementSources<'a> {
    cx: DecodeContext<'a>,
    schema: &'a FieldDescriptor,
    element: &'a FieldDescriptor,
    items: Cow<'a, [RawValue]>,
}

impl<'a> ElementSources<'a> {
    /// `Ok(None)` for a null at a nullable ARRAY node.
    pub(crate) fn new(
        decoder: &'a StructDecoder,
        raw: Cow<'a, RawValue>,
        schema: &'a FieldDescriptor,
    ) -> Result<Option<Self>, DecodeError> {
        if raw.is_null() {
            if schema.nullable() {
                return Ok(None);
            }
            return Err(DecodeError::NullViolation {
                field: schema.name().to_string(),
            });
        }
        if schema.base() != BaseType::Array {
            return Err(wrong_base(schema, "ARRAY"));
        }
        let element = element_of(schema)?;
        let items = match raw {
            Cow::Borrowed(RawValue::Array(items)) => Cow::Borrowed(items.as_slice()),
            Cow::Owned(RawValue::Array(items)) => Cow::Owned(items),
            other => return Err(wrong_shape(schema, "array", &other)),
        };
        let cx = decoder.context().nested(schema)?;
        Ok(Some(Self {
            cx,
            schema,
            element,
            items,
        }))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One source per element, in order. A null element yields
    /// `Ok(None)` when the element descriptor is nullable and
    /// [`DecodeError::NullViolation`] otherwise; an element that is not
    /// an object is [`DecodeError::ShapeMismatch`]. `T` names the
    /// target in field-count diagnostics.
    pub fn sources<T: SqlData>(
        &self,
    ) -> impl Iterator<Item = Result<Option<FieldSource<'_>>, DecodeError>> + '_ {
        self.items.iter().enumerate().map(|(i, raw)| {
            self.source(raw, type_name::<T>())
                .map_err(|e| e.within(&format!("{}[{i}]", self.schema.name())))
        })
    }

    fn source<'s>(
        &'s self,
        raw: &'s RawValue,
        target: &'static str,
    ) -> Result<Option<FieldSource<'s>>, DecodeError> {
        if raw.is_null() {
            if self.element.nullable() {
                return Ok(None);
            }
            return Err(DecodeError::NullViolation {
                field: self.element.name().to_string(),
            });
        }
        decoder::object_fields(self.cx, raw, self.element)?;
        let cx = self.cx.nested(self.element)?;
        Ok(Some(FieldSource::new(cx, self.element, raw, target)))
    }
}
