//! Encode → decode roundtrip tests.
//!
//! Each test writes a value with `StructEncoder`, decodes the raw form
//! with `StructDecoder` under the same schema, and asserts the result
//! equals the original. The JSON text form is exercised too, since that
//! is how structured cells arrive in the JSON result format.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use strata_decoder::{FactoryRegistry, MemoryChunks, ResultSet, StructDecoder};
use strata_encoder::StructEncoder;
use strata_tests::{
    AllTypesClass, Basket, Profile, SimpleClass, all_types_schema, basket_schema, profile_schema,
    sample_all_types, simple_schema,
};
use strata_types::RawValue;

fn decoder() -> StructDecoder {
    let registry = Arc::new(FactoryRegistry::new());
    registry.register(AllTypesClass::default);
    StructDecoder::new(registry)
}

#[test]
fn roundtrip_simple() {
    let value = SimpleClass::new("a");
    let raw = StructEncoder::encode(&value, &simple_schema("OBJ")).unwrap();
    let back: SimpleClass = decoder().decode(&raw, &simple_schema("OBJ")).unwrap();
    assert_eq!(back, value);
}

#[test]
fn roundtrip_all_types() {
    let value = sample_all_types();
    let raw = StructEncoder::encode(&value, &all_types_schema("OBJ")).unwrap();
    let back: AllTypesClass = decoder().decode(&raw, &all_types_schema("OBJ")).unwrap();
    assert_eq!(back, value);
}

#[test]
fn roundtrip_all_types_through_json_text() {
    let value = sample_all_types();
    let text = StructEncoder::encode(&value, &all_types_schema("OBJ"))
        .unwrap()
        .to_json_string();
    let raw = RawValue::parse_json(&text).unwrap();
    let back: AllTypesClass = decoder().decode(&raw, &all_types_schema("OBJ")).unwrap();
    assert_eq!(back, value);
}

#[test]
fn roundtrip_extreme_primitives() {
    let value = AllTypesClass {
        string: Some(String::new()),
        b: Some(i8::MIN),
        s: Some(i16::MAX),
        i: Some(i32::MIN),
        l: Some(i64::MAX),
        f: Some(f32::MAX),
        d: Some(-0.0),
        bool: Some(false),
        simple_class: Some(SimpleClass::default()),
    };
    let raw = StructEncoder::encode(&value, &all_types_schema("OBJ")).unwrap();
    let back: AllTypesClass = decoder().decode(&raw, &all_types_schema("OBJ")).unwrap();
    assert_eq!(back, value);
}

#[test]
fn roundtrip_all_nulls() {
    let value = AllTypesClass::default();
    let raw = StructEncoder::encode(&value, &all_types_schema("OBJ")).unwrap();
    let back: AllTypesClass = decoder().decode(&raw, &all_types_schema("OBJ")).unwrap();
    assert_eq!(back, value);
}

#[test]
fn roundtrip_array_of_objects() {
    let values = vec![SimpleClass::new("aaa"), SimpleClass::new("bbb")];
    let schema = strata_types::FieldDescriptor::array("ARR", simple_schema(""));
    let raw = StructEncoder::encode_array(&values, &schema).unwrap();
    let back = decoder().decode_array::<SimpleClass>(&raw, &schema).unwrap();
    assert_eq!(back, Some(values));
}

#[test]
fn roundtrip_nested_array_field() {
    for items in [None, Some(Vec::new()), Some(vec![SimpleClass::new("x")])] {
        let value = Basket {
            owner: Some("o".to_string()),
            items,
        };
        let raw = StructEncoder::encode(&value, &basket_schema("B")).unwrap();
        let back: Basket = decoder().decode(&raw, &basket_schema("B")).unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn decode_is_deterministic() {
    let raw = StructEncoder::encode(&sample_all_types(), &all_types_schema("OBJ")).unwrap();
    let decoder = decoder();
    let first = decoder.decode_value(&raw, &all_types_schema("OBJ")).unwrap();
    let second = decoder.decode_value(&raw, &all_types_schema("OBJ")).unwrap();
    assert_eq!(first, second);
}

// ── Primitive collections ──────────────────────────────────────────────────

fn profile(tags: Option<Vec<&str>>, scores: Option<Vec<(&str, i64)>>) -> Profile {
    Profile {
        name: Some("p".to_string()),
        tags: tags.map(|t| t.into_iter().map(str::to_string).collect()),
        scores: scores.map(|s| s.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
    }
}

#[test]
fn roundtrip_primitive_collections() {
    let cases = [
        profile(None, None),
        profile(Some(vec![]), Some(vec![])),
        profile(Some(vec!["a", "b"]), Some(vec![("x", 1), ("y", i64::MIN)])),
    ];
    for value in cases {
        let raw = StructEncoder::encode(&value, &profile_schema("P")).unwrap();
        let back: Profile = decoder().decode(&raw, &profile_schema("P")).unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn roundtrip_primitive_collections_through_json_text() {
    let value = profile(Some(vec!["a", ""]), Some(vec![("k", 7)]));
    let text = StructEncoder::encode(&value, &profile_schema("P"))
        .unwrap()
        .to_json_string();
    let mut rs = ResultSet::new(
        vec![profile_schema("P")],
        decoder(),
        MemoryChunks::new([vec![vec![RawValue::Text(text)]]]),
    );
    assert!(rs.next().unwrap());
    assert_eq!(rs.get_object::<Profile>(1).unwrap(), Some(value));
    assert_eq!(
        rs.get_value(1).unwrap().to_json(),
        json!({"name": "p", "tags": ["a", ""], "scores": {"k": 7}})
    );
}

#[test]
fn encoded_collections_have_the_wire_shape() {
    let value = profile(Some(vec!["t"]), Some(vec![("b", 2), ("a", 1)]));
    let raw = StructEncoder::encode(&value, &profile_schema("P")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw.to_json_string()).unwrap();
    assert_eq!(
        json,
        json!({"name": "p", "tags": ["t"], "scores": {"a": 1, "b": 2}})
    );
}

#[test]
fn map_value_failure_names_its_key() {
    let mut scores = BTreeMap::new();
    scores.insert("ok".to_string(), 1);
    let value = Profile {
        scores: Some(scores),
        ..Profile::default()
    };
    let raw = StructEncoder::encode(&value, &profile_schema("P")).unwrap();
    let RawValue::Object(mut fields) = raw else {
        unreachable!()
    };
    fields[2].1 = RawValue::Object(vec![("bad".into(), RawValue::Text("x".into()))]);
    let err = decoder()
        .decode::<Profile>(&RawValue::Object(fields), &profile_schema("P"))
        .unwrap_err();
    assert!(err.to_string().contains(r#"P.scores["bad"]"#), "{err}");
}
