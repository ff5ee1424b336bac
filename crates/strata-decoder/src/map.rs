use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use strata_types::{BaseType, FieldDescriptor, RawValue, TypeError};

use crate::decode::Decode;
use crate::decoder::DecodeContext;
use crate::error::DecodeError;
use crate::primitive::{wrong_base, wrong_shape};

/// Walk a MAP value's entries, decoding keys and values under their
/// descriptors. Keys arrive as object field names, so they are decoded
/// from text; entries are yielded in wire order and the caller's insert
/// makes the last duplicate win.
pub(crate) fn entries<K: Decode, V: Decode>(
    cx: DecodeContext<'_>,
    raw: &RawValue,
    schema: &FieldDescriptor,
    mut insert: impl FnMut(K, V),
) -> Result<(), DecodeError> {
    if schema.base() != BaseType::Map {
        return Err(wrong_base(schema, "MAP"));
    }
    let (key_schema, value_schema) = schema.map_entry().ok_or_else(|| {
        DecodeError::Type(TypeError::InvalidSchema {
            path: schema.name().to_string(),
            reason: "MAP needs key and value descriptors".to_string(),
        })
    })?;
    let RawValue::Object(fields) = raw else {
        return Err(wrong_shape(schema, "object", raw));
    };
    let cx = cx.nested(schema)?;

    for (name, value) in fields {
        let entry_path = format!("{}[{name:?}]", schema.name());
        let key = cx
            .decode(&RawValue::Text(name.clone()), key_schema)
            .map_err(|e| e.within(&entry_path))?;
        let value = cx
            .decode(value, value_schema)
            .map_err(|e| e.within(&entry_path))?;
        insert(key, value);
    }
    Ok(())
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Ord,
    V: Decode,
{
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        let mut map = BTreeMap::new();
        entries(cx, raw, schema, |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode_raw(
        cx: DecodeContext<'_>,
        raw: &RawValue,
        schema: &FieldDescriptor,
    ) -> Result<Self, DecodeError> {
        let mut map = HashMap::default();
        entries(cx, raw, schema, |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}
