use strata_types::TypeError;

/// Errors that can occur while decoding a structured value.
///
/// Every failure is surfaced to the caller exactly once; the decoder
/// never retries or swallows. Field-level variants carry a dotted path
/// (`column.inner.leaf`) built up as the error unwinds through nested
/// objects, so the offending leaf is identifiable from the message
/// alone.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── ShapeMismatch       ← raw value shape disagrees with the base type
///   ├── UndeclaredField     ← raw object field absent from the schema (strict mode)
///   ├── FieldCountMismatch  ← target reads more or fewer fields than declared
///   ├── UnsupportedTarget   ← no factory registered, no default constructor
///   ├── PrecisionLoss       ← primitive narrowing would lose information
///   ├── NullViolation       ← null where the schema or target forbids it
///   ├── NestingTooDeep      ← recursion guard tripped
///   ├── ColumnOutOfRange    ← row API column index invalid
///   ├── NoCurrentRow        ← row API read before next() / after the end
///   ├── Source              ← row source failed to deliver a chunk
///   └── Type(TypeError)     ← from strata-types (metadata, JSON cells)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("shape mismatch at {field}: expected {expected}, found {found}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Only raised when `DecoderConfig::reject_unknown_fields` is set.
    #[error("undeclared field {name:?} in object at {field}")]
    UndeclaredField { field: String, name: String },

    /// The target type's `read_fields` did not consume exactly the
    /// fields the schema declares.
    ///
    /// `actual` is the number of pulls observed. When the target reads
    /// too many, decoding stops at the first excess pull, so `actual` is
    /// `expected + 1`.
    #[error(
        "field count mismatch at {field} for {target}: schema declares {expected}, target read {actual}"
    )]
    FieldCountMismatch {
        field: String,
        target: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No factory is registered for the target and it does not opt into
    /// default construction.
    #[error("cannot construct {target} at {field}: no registered factory and no default constructor")]
    UnsupportedTarget { field: String, target: &'static str },

    #[error("precision loss at {field}: {value} does not fit {target}")]
    PrecisionLoss {
        field: String,
        value: String,
        target: &'static str,
    },

    /// A null reached a non-nullable schema node, a required field was
    /// missing from the raw object, or the requested target cannot hold
    /// null (ask for `Option<T>` instead).
    #[error("null value at {field} violates a non-null constraint")]
    NullViolation { field: String },

    #[error("nesting deeper than {limit} levels at {field}")]
    NestingTooDeep { field: String, limit: usize },

    /// Column indexes are 1-based.
    #[error("column index {index} out of range (row has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("no current row: call next() before reading columns")]
    NoCurrentRow,

    #[error("row source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Coarse classification of a [`DecodeError`], for callers that branch
/// on the failure category rather than the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShapeMismatch,
    FieldCountMismatch,
    UnsupportedTarget,
    PrecisionLoss,
    NullViolation,
    NestingTooDeep,
    InvalidColumn,
    NoCurrentRow,
    Source,
    Schema,
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. } | Self::UndeclaredField { .. } => ErrorKind::ShapeMismatch,
            Self::FieldCountMismatch { .. } => ErrorKind::FieldCountMismatch,
            Self::UnsupportedTarget { .. } => ErrorKind::UnsupportedTarget,
            Self::PrecisionLoss { .. } => ErrorKind::PrecisionLoss,
            Self::NullViolation { .. } => ErrorKind::NullViolation,
            Self::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            Self::ColumnOutOfRange { .. } => ErrorKind::InvalidColumn,
            Self::NoCurrentRow => ErrorKind::NoCurrentRow,
            Self::Source(_) => ErrorKind::Source,
            Self::Type(_) => ErrorKind::Schema,
        }
    }

    /// Wrap an arbitrary row-source failure.
    pub fn row_source(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Source(err.into())
    }

    /// Prefix the field path with the enclosing node's name.
    ///
    /// Synthetic descriptors (array elements, map keys) often have empty
    /// names; those leave the path untouched.
    #[must_use]
    pub fn within(mut self, parent: &str) -> Self {
        if parent.is_empty() {
            return self;
        }
        match &mut self {
            Self::ShapeMismatch { field, .. }
            | Self::UndeclaredField { field, .. }
            | Self::PrecisionLoss { field, .. }
            | Self::NullViolation { field }
            | Self::NestingTooDeep { field, .. }
            | Self::FieldCountMismatch { field, .. }
            | Self::UnsupportedTarget { field, .. } => {
                *field = if field.is_empty() {
                    parent.to_string()
                } else {
                    format!("{parent}.{field}")
                };
            }
            Self::ColumnOutOfRange { .. }
            | Self::NoCurrentRow
            | Self::Source(_)
            | Self::Type(_) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_builds_dotted_path() {
        let err = DecodeError::NullViolation {
            field: "string".to_string(),
        }
        .within("simpleClass")
        .within("OBJ");
        assert!(matches!(err, DecodeError::NullViolation { ref field } if field == "OBJ.simpleClass.string"));
    }

    #[test]
    fn within_skips_empty_names() {
        let err = DecodeError::ShapeMismatch {
            field: String::new(),
            expected: "text",
            found: "integer",
        }
        .within("")
        .within("tags");
        assert!(matches!(err, DecodeError::ShapeMismatch { ref field, .. } if field == "tags"));
    }

    #[test]
    fn kinds_group_related_variants() {
        assert_eq!(
            DecodeError::UndeclaredField {
                field: "o".into(),
                name: "x".into()
            }
            .kind(),
            ErrorKind::ShapeMismatch
        );
        assert_eq!(
            DecodeError::UnsupportedTarget {
                field: "o".into(),
                target: "T"
            }
            .kind(),
            ErrorKind::UnsupportedTarget
        );
        assert_eq!(
            DecodeError::row_source("connection reset").kind(),
            ErrorKind::Source
        );
    }

    #[test]
    fn messages_include_context() {
        let err = DecodeError::PrecisionLoss {
            field: "o.b".to_string(),
            value: "300".to_string(),
            target: "i8",
        };
        assert_eq!(err.to_string(), "precision loss at o.b: 300 does not fit i8");
    }

    #[test]
    fn field_count_mismatch_gains_a_path() {
        let err = DecodeError::FieldCountMismatch {
            field: String::new(),
            target: "Inner",
            expected: 1,
            actual: 2,
        }
        .within("inner")
        .within("OBJ");
        assert_eq!(
            err.to_string(),
            "field count mismatch at OBJ.inner for Inner: schema declares 1, target read 2"
        );
    }
}
