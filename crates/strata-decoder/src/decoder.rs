use std::any::type_name;
use std::borrow::Cow;
use std::sync::Arc;

use strata_types::{BaseType, FieldDescriptor, RawValue};
use tracing::trace;

use crate::array::{self, ElementSources};
use crate::config::DecoderConfig;
use crate::decode::Decode;
use crate::error::DecodeError;
use crate::input::{FieldSource, SqlData};
use crate::registry::FactoryRegistry;
use crate::value::DecodedValue;

/// Schema-driven decoder for structured (OBJECT / ARRAY / MAP) values.
///
/// The decoder turns a [`RawValue`] into a typed client-side value by
/// walking it alongside its [`FieldDescriptor`]:
///
///   1. **Null**: a null at a nullable node yields the target's null form
///      immediately; nothing is constructed. A null at a non-nullable
///      node is [`DecodeError::NullViolation`].
///   2. **Primitive**: leaves are coerced per the base type, widening
///      only. Narrowing that would lose information is
///      [`DecodeError::PrecisionLoss`].
///   3. **OBJECT**: the target instance comes from the
///      [`FactoryRegistry`] if a factory is registered, otherwise from
///      [`SqlData::construct_default`]. Its `read_fields` then pulls
///      the fields in schema order, each decoded recursively.
///   4. **ARRAY**: each element is decoded independently under the
///      element descriptor, preserving order.
///   5. **MAP**: entries are decoded under the key and value
///      descriptors; a repeated key keeps the last value.
///
/// The decoder holds no mutable state. Decoding the same input twice
/// produces equal results unless the registry changed in between, and a
/// single decoder may be shared freely across threads.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use strata_decoder::{DecodeError, FactoryRegistry, FieldSource, SqlData, StructDecoder};
/// use strata_types::{FieldDescriptor, RawValue};
///
/// #[derive(Default)]
/// struct SimpleClass { string: Option<String> }
///
/// impl SqlData for SimpleClass {
///     fn construct_default() -> Option<Self> { Some(Self::default()) }
///
///     fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
///         self.string = source.read_string()?;
///         Ok(())
///     }
/// }
///
/// let schema = FieldDescriptor::object("col", vec![FieldDescriptor::text("string")]);
/// let raw = RawValue::parse_json(r#"{"string": "a"}"#).unwrap();
///
/// let decoder = StructDecoder::new(Arc::new(FactoryRegistry::new()));
/// let object = decoder.decode_object::<SimpleClass>(&raw, &schema).unwrap().unwrap();
/// assert_eq!(object.string.as_deref(), Some("a"));
/// ```
#[derive(Clone, Debug)]
pub struct StructDecoder {
    registry: Arc<FactoryRegistry>,
    config: DecoderConfig,
}

impl StructDecoder {
    #[must_use]
    pub fn new(registry: Arc<FactoryRegistry>) -> Self {
        Self::with_config(registry, DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: Arc<FactoryRegistry>, config: DecoderConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Root context for a fresh top-level decode.
    #[must_use]
    pub fn context(&self) -> DecodeContext<'_> {
        DecodeContext {
            decoder: self,
            depth: 0,
        }
    }

    /// Decode `raw` under `schema` into any [`Decode`] target.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] raised while matching `raw` against `schema`.
    pub fn decode<T: Decode>(
        &self,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<T, DecodeError> {
        self.context().decode(raw, schema)
    }

    /// Decode an OBJECT value into a composite target. `Ok(None)` for a
    /// null at a nullable node.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_object<T: SqlData>(
        &self,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Option<T>, DecodeError> {
        self.decode(raw, schema)
    }

    /// Decode an ARRAY value into a vector of `T`. `Ok(None)` for a null
    /// at a nullable node; an empty array yields an empty vector.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_array<T: Decode>(
        &self,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Option<Vec<T>>, DecodeError> {
        self.decode(raw, schema)
    }

    /// Decode without a static target, producing a [`DecodedValue`].
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_value(
        &self,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<DecodedValue, DecodeError> {
        self.decode(raw, schema)
    }

    /// Decode a bare element sequence under `element_schema`.
    ///
    /// # Errors
    ///
    /// The first element failure, unchanged.
    pub fn materialize<T: Decode>(
        &self,
        elements: &[RawValue],
        element_schema: &FieldDescriptor,
    ) -> Result<Vec<T>, DecodeError> {
        array::materialize(self.context(), elements, element_schema)
    }

    /// Split an ARRAY of OBJECT into one [`FieldSource`] per element, for
    /// callers that construct their own instances. `Ok(None)` for a null
    /// at a nullable node.
    ///
    /// # Errors
    ///
    /// [`DecodeError::ShapeMismatch`] unless `raw` is an array under an
    /// ARRAY descriptor, or the nesting limit.
    pub fn element_sources<'a>(
        &'a self,
        raw: &'a RawValue,
        schema: &'a FieldDescriptor,
    ) -> Result<Option<ElementSources<'a>>, DecodeError> {
        ElementSources::new(self, Cow::Borrowed(raw), schema)
    }

    /// Obtain a fresh `T`: registered factory first, default
    /// construction second.
    fn construct<T: SqlData>(&self, schema: &FieldDescriptor) -> Result<T, DecodeError> {
        if let Some(factory) = self.registry.lookup::<T>() {
            return Ok(factory.create());
        }
        T::construct_default().ok_or_else(|| DecodeError::UnsupportedTarget {
            field: schema.name().to_string(),
            target: type_name::<T>(),
        })
    }
}

/// Per-call decoding state threaded through the recursion.
///
/// The context is `Copy` and carries only the decoder and the current
/// nesting depth, so the decoder itself stays free of per-call state.
/// Custom [`Decode`] implementations receive one and must use it for
/// nested decodes.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext<'a> {
    decoder: &'a StructDecoder,
    depth: usize,
}

impl<'a> DecodeContext<'a> {
    #[must_use]
    pub fn decoder(self) -> &'a StructDecoder {
        self.decoder
    }

    /// Number of composite levels entered so far.
    #[must_use]
    pub fn depth(self) -> usize {
        self.depth
    }

    /// Decode one value, applying the null rule before dispatching to
    /// the target.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NullViolation`] for a null at a non-nullable node,
    /// otherwise whatever the target's [`Decode`] implementation raises.
    pub fn decode<T: Decode>(
        self,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<T, DecodeError> {
        if raw.is_null() {
            if schema.nullable() {
                return T::decode_null(schema);
            }
            return Err(DecodeError::NullViolation {
                field: schema.name().to_string(),
            });
        }
        T::decode_raw(self, raw, schema)
    }

    /// Enter one composite level below `schema`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NestingTooDeep`] once the configured depth is
    /// exhausted.
    pub fn nested(self, schema: &FieldDescriptor) -> Result<Self, DecodeError> {
        let limit = self.decoder.config.max_depth;
        if self.depth >= limit {
            return Err(DecodeError::NestingTooDeep {
                field: schema.name().to_string(),
                limit,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }
}

/// Validate that `raw` is an object under an OBJECT descriptor and
/// return its fields.
pub(crate) fn object_fields<'r>(
    cx: DecodeContext<'_>,
    raw: &'r RawValue,
    schema: &FieldDescriptor,
) -> Result<&'r [(String, RawValue)], DecodeError> {
    let fields = match (schema.base(), raw) {
        (BaseType::Object, RawValue::Object(fields)) => fields,
        (BaseType::Object, other) => {
            return Err(DecodeError::ShapeMismatch {
                field: schema.name().to_string(),
                expected: "object",
                found: other.shape(),
            });
        }
        (base, _) => {
            return Err(DecodeError::ShapeMismatch {
                field: schema.name().to_string(),
                expected: "OBJECT",
                found: base.keyword(),
            });
        }
    };

    if cx.decoder.config.reject_unknown_fields {
        if let Some((name, _)) = fields.iter().find(|(name, _)| schema.child(name).is_none()) {
            return Err(DecodeError::UndeclaredField {
                field: schema.name().to_string(),
                name: name.clone(),
            });
        }
    }
    Ok(fields)
}

/// OBJECT decoding for composite targets.
///
/// Raw fields are located by the schema's field names; the target's
/// slots are fed strictly by position through the [`FieldSource`]
/// cursor. The target must consume exactly the declared field count.
pub(crate) fn decode_object<T: SqlData>(
    cx: DecodeContext<'_>,
    raw: &RawValue,
    schema: &FieldDescriptor,
) -> Result<T, DecodeError> {
    object_fields(cx, raw, schema)?;
    let cx = cx.nested(schema)?;

    let mut instance = cx.decoder.construct::<T>(schema)?;
    let mut source = FieldSource::new(cx, schema, raw, type_name::<T>());
    instance
        .read_fields(&mut source)
        .and_then(|()| source.finish())
        .map_err(|e| e.within(schema.name()))?;

    trace!(
        target_type = type_name::<T>(),
        field = %schema.name(),
        depth = cx.depth,
        "decoded object"
    );
    Ok(instance)
}
