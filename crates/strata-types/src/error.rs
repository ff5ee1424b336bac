/// Errors raised while building, loading, or validating schema
/// descriptors and raw values.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── UnknownBaseType   for unrecognized type names │
/// │   ├── InvalidSchema     for malformed descriptors   │
/// │   ├── InvalidHex        for bad BINARY text         │
/// │   └── Json              for metadata / value parse  │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The metadata named a base type this client does not know.
    #[error("unknown base type: {name}")]
    UnknownBaseType { name: String },

    /// A descriptor broke the shape invariant for its base type.
    ///
    /// `path` is the dotted field path from the root descriptor, so a
    /// problem deep inside a nested OBJECT is still easy to locate.
    #[error("invalid schema at {path}: {reason}")]
    InvalidSchema { path: String, reason: String },

    /// A BINARY leaf delivered as text was not valid hex.
    #[error("invalid hex in binary value: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
