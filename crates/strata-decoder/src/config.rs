/// Decoder configuration.
///
/// ```text
/// ┌───────────────────────┬──────────┬──────────────────────────────────────┐
/// │ Field                 │ Default  │ Purpose                              │
/// ├───────────────────────┼──────────┼──────────────────────────────────────┤
/// │ max_depth             │ 100      │ Composite nesting limit per value    │
/// │ reject_unknown_fields │ false    │ Fail on raw fields the schema lacks  │
/// └───────────────────────┴──────────┴──────────────────────────────────────┘
/// ```
///
/// The server validates structured values against the declared type
/// before sending them, so extra raw fields do not occur in practice and
/// are ignored by default. Strict mode exists for tooling that checks
/// hand-written fixtures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum number of nested OBJECT/ARRAY/MAP levels in one value.
    /// Exceeding it is `DecodeError::NestingTooDeep`.
    pub max_depth: usize,

    /// When set, raw object fields that the schema does not declare are
    /// `DecodeError::UndeclaredField` instead of being skipped.
    pub reject_unknown_fields: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            reject_unknown_fields: false,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_reject_unknown_fields(mut self, reject: bool) -> Self {
        self.reject_unknown_fields = reject;
        self
    }
}
