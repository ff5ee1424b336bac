/// Errors that can occur while encoding a client value into its raw
/// structured form.
///
/// The encoder checks every write against the schema it encodes for:
/// field count, null rule and the kind of value each base type holds.
/// A value built only from typed writes therefore decodes under the same
/// schema. `RawValue`s written as-is are checked by outer shape only.
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── FieldCountMismatch  ← write_fields wrote more or fewer fields than declared
///   ├── KindMismatch        ← written value contradicts the field's base type
///   └── NullViolation       ← null written to a non-nullable field
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("field count mismatch at {field} for {target}: schema declares {expected}, wrote {actual}")]
    FieldCountMismatch {
        field: String,
        target: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cannot write {value} to {field} of base type {base}")]
    KindMismatch {
        field: String,
        base: &'static str,
        value: &'static str,
    },

    #[error("null written to non-nullable field {field}")]
    NullViolation { field: String },
}

impl EncodeError {
    /// Prefix the field path with the enclosing node's name.
    #[must_use]
    pub fn within(mut self, parent: &str) -> Self {
        if parent.is_empty() {
            return self;
        }
        if let Self::FieldCountMismatch { field, .. }
        | Self::KindMismatch { field, .. }
        | Self::NullViolation { field } = &mut self
        {
            *field = if field.is_empty() {
                parent.to_string()
            } else {
                format!("{parent}.{field}")
            };
        }
        self
    }
}
