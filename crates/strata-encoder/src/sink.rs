use strata_types::{BaseType, FieldDescriptor, RawValue};

use crate::encode::{self, Encode};
use crate::encoder::SqlWrite;
use crate::error::EncodeError;

/// Field-by-field builder for one OBJECT value.
///
/// The write-side mirror of the decoder's `FieldSource`: each `write_*`
/// call fills the next field the schema declares, in order, and names
/// the resulting raw field after it. `finish()` hands back the
/// assembled [`RawValue::Object`].
///
/// ```text
/// schema:  OBJECT(string VARCHAR, n NUMBER(38,0), tags ARRAY(VARCHAR))
///
///   sink.write_string(Some("a"))   → ("string", Text("a"))
///   sink.write_long(Some(7))       → ("n",      Integer(7))
///   sink.write(&vec!["x"])         → ("tags",   Array([Text("x")]))
///   sink.finish()                  → Object([...])
/// ```
///
/// Every write is checked against the field it lands on: a value whose
/// kind contradicts the field's base type, or a null for a non-nullable
/// field, is rejected immediately. VARIANT fields accept any leaf.
pub struct FieldSink<'a> {
    schema: &'a FieldDescriptor,
    fields: Vec<(String, RawValue)>,
    target: &'static str,
}

impl<'a> FieldSink<'a> {
    #[must_use]
    pub fn new(schema: &'a FieldDescriptor, target: &'static str) -> Self {
        Self {
            schema,
            fields: Vec::with_capacity(schema.fields().len()),
            target,
        }
    }

    /// Descriptor of the next field to be written.
    #[must_use]
    pub fn field(&self) -> Option<&'a FieldDescriptor> {
        self.schema.fields().get(self.fields.len())
    }

    fn next_field(&self) -> Result<&'a FieldDescriptor, EncodeError> {
        self.field().ok_or(EncodeError::FieldCountMismatch {
            field: String::new(),
            target: self.target,
            expected: self.schema.fields().len(),
            actual: self.fields.len() + 1,
        })
    }

    fn write_option<T: Encode + ?Sized>(&mut self, value: Option<&T>) -> Result<(), EncodeError> {
        let field = self.next_field()?;
        let raw = encode::optional(value, field)?;
        self.fields.push((field.name().to_string(), raw));
        Ok(())
    }

    /// Write any [`Encode`] value into the next field. The general form
    /// of the typed writers below; `Option` values write null for
    /// `None`.
    ///
    /// # Errors
    ///
    /// [`EncodeError`] when the value does not fit the next field.
    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.write_option(Some(value))
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_string(&mut self, value: Option<&str>) -> Result<(), EncodeError> {
        self.write_option(value)
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_boolean(&mut self, value: Option<bool>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_byte(&mut self, value: Option<i8>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_short(&mut self, value: Option<i16>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_int(&mut self, value: Option<i32>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_long(&mut self, value: Option<i64>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// Widened to `f64` exactly, so the value narrows back unchanged.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_float(&mut self, value: Option<f32>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_double(&mut self, value: Option<f64>) -> Result<(), EncodeError> {
        self.write_option(value.as_ref())
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_bytes(&mut self, value: Option<&[u8]>) -> Result<(), EncodeError> {
        let field = self.next_field()?;
        let raw = match value {
            Some(bytes) => {
                encode::check_kind(field, |b| b == BaseType::Binary, "binary")?;
                RawValue::Binary(bytes.to_vec())
            }
            None => encode::null(field)?,
        };
        self.fields.push((field.name().to_string(), raw));
        Ok(())
    }

    /// Encode a nested composite into the next (OBJECT) field.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write), plus any failure encoding `value`
    /// itself.
    pub fn write_object<T: SqlWrite>(&mut self, value: Option<&T>) -> Result<(), EncodeError> {
        self.write_option(value)
    }

    /// Encode a sequence into the next (ARRAY) field. Elements may be
    /// leaves, composites or nested sequences.
    ///
    /// # Errors
    ///
    /// See [`write_object`](Self::write_object); element failures name
    /// their index.
    pub fn write_array<T: Encode>(&mut self, values: Option<&[T]>) -> Result<(), EncodeError> {
        self.write_option(values)
    }

    /// Encode key/value pairs into the next (MAP) field.
    ///
    /// # Errors
    ///
    /// See [`write_object`](Self::write_object); value failures name
    /// their key.
    pub fn write_map<'m, K, V>(
        &mut self,
        entries: Option<impl IntoIterator<Item = (&'m K, &'m V)>>,
    ) -> Result<(), EncodeError>
    where
        K: Encode + 'm,
        V: Encode + 'm,
    {
        let field = self.next_field()?;
        let raw = match entries {
            Some(entries) => encode::entries(entries, field)?,
            None => encode::null(field)?,
        };
        self.fields.push((field.name().to_string(), raw));
        Ok(())
    }

    /// Write a pre-built raw value. Only its outer shape is checked:
    /// text lands on leaf fields only, objects on OBJECT or MAP fields,
    /// arrays on ARRAY fields.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_value(&mut self, value: RawValue) -> Result<(), EncodeError> {
        self.write(&value)
    }

    /// Number of fields written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.fields.len()
    }

    /// Assemble the object.
    ///
    /// # Errors
    ///
    /// [`EncodeError::FieldCountMismatch`] if fewer fields were written
    /// than the schema declares.
    pub fn finish(self) -> Result<RawValue, EncodeError> {
        if self.fields.len() != self.schema.fields().len() {
            return Err(EncodeError::FieldCountMismatch {
                field: String::new(),
                target: self.target,
                expected: self.schema.fields().len(),
                actual: self.fields.len(),
            });
        }
        Ok(RawValue::Object(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FieldDescriptor {
        FieldDescriptor::object(
            "o",
            vec![
                FieldDescriptor::text("s"),
                FieldDescriptor::fixed("n", 38, 0).with_nullable(false),
            ],
        )
    }

    #[test]
    fn names_values_after_schema_fields() {
        let schema = schema();
        let mut sink = FieldSink::new(&schema, "T");
        sink.write_string(Some("a")).unwrap();
        sink.write_int(Some(7)).unwrap();
        assert_eq!(
            sink.finish().unwrap(),
            RawValue::Object(vec![
                ("s".to_string(), RawValue::Text("a".to_string())),
                ("n".to_string(), RawValue::Integer(7)),
            ])
        );
    }

    #[test]
    fn rejects_write_past_schema() {
        let schema = schema();
        let mut sink = FieldSink::new(&schema, "T");
        sink.write_string(None).unwrap();
        sink.write_long(Some(1)).unwrap();
        assert!(matches!(
            sink.write_long(Some(2)),
            Err(EncodeError::FieldCountMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn rejects_contradicting_kind() {
        let schema = schema();
        let mut sink = FieldSink::new(&schema, "T");
        assert!(matches!(
            sink.write_boolean(Some(true)),
            Err(EncodeError::KindMismatch { base: "TEXT", value: "boolean", .. })
        ));
    }

    #[test]
    fn rejects_null_for_required_field() {
        let schema = schema();
        let mut sink = FieldSink::new(&schema, "T");
        sink.write_string(None).unwrap();
        assert!(matches!(
            sink.write_long(None),
            Err(EncodeError::NullViolation { ref field }) if field == "n"
        ));
    }

    #[test]
    fn finish_detects_missing_writes() {
        let schema = schema();
        let mut sink = FieldSink::new(&schema, "T");
        sink.write_string(Some("a")).unwrap();
        assert_eq!(sink.written(), 1);
        assert!(matches!(
            sink.finish(),
            Err(EncodeError::FieldCountMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn write_value_checks_outer_shape() {
        let schema = schema();
        let mut sink = FieldSink::new(&schema, "T");
        sink.write_value(RawValue::Text("free".to_string())).unwrap();
        assert!(sink.write_value(RawValue::Array(Vec::new())).is_err());
    }

    #[test]
    fn write_value_refuses_text_for_composites() {
        let schema = FieldDescriptor::object(
            "o",
            vec![
                FieldDescriptor::array("tags", FieldDescriptor::text("")),
                FieldDescriptor::map("m", FieldDescriptor::text(""), FieldDescriptor::text("")),
            ],
        );
        let mut sink = FieldSink::new(&schema, "T");
        assert!(matches!(
            sink.write_value(RawValue::Text("a".to_string())),
            Err(EncodeError::KindMismatch { ref field, base: "ARRAY", value: "text" }) if field == "tags"
        ));
        assert_eq!(sink.written(), 0);
        sink.write_value(RawValue::Array(vec![RawValue::from("a")])).unwrap();
        assert!(sink.write_value(RawValue::Text("{}".to_string())).is_err());
        sink.write_value(RawValue::Object(Vec::new())).unwrap();
        assert!(sink.finish().is_ok());
    }

    #[test]
    fn writes_primitive_arrays_and_maps() {
        let schema = FieldDescriptor::object(
            "o",
            vec![
                FieldDescriptor::array("tags", FieldDescriptor::text("")),
                FieldDescriptor::map("m", FieldDescriptor::text(""), FieldDescriptor::fixed("", 38, 0)),
                FieldDescriptor::array("none", FieldDescriptor::fixed("", 38, 0)),
            ],
        );
        let tags = vec!["x".to_string(), "y".to_string()];
        let counts = std::collections::BTreeMap::from([("a".to_string(), 1i64)]);
        let mut sink = FieldSink::new(&schema, "T");
        sink.write_array(Some(tags.as_slice())).unwrap();
        sink.write_map(Some(&counts)).unwrap();
        sink.write_array::<i64>(None).unwrap();
        assert_eq!(
            sink.finish().unwrap().to_json_string(),
            r#"{"tags":["x","y"],"m":{"a":1},"none":null}"#
        );
    }
}
