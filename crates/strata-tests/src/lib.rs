//! Shared model types and fixtures for the integration tests and benches.
//!
//! The composite types here implement both sides of the object protocol
//! (`SqlData` to decode, `SqlWrite` to encode), reading and writing their
//! fields in the same order, so every test can build its raw input with
//! the encoder instead of hand-writing JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use strata_decoder::{DecodeError, FieldSource, Row, SqlData};
use strata_encoder::{EncodeError, FieldSink, SqlWrite, StructEncoder};
use strata_types::{FieldDescriptor, RawValue};

// ── Model types ─────────────────────────────────────────────────────────────

/// One nullable string field. Default-constructible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleClass {
    pub string: Option<String>,
}

impl SimpleClass {
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self {
            string: Some(s.to_string()),
        }
    }
}

impl SqlData for SimpleClass {
    fn construct_default() -> Option<Self> {
        Some(Self::default())
    }

    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
        self.string = source.read_string()?;
        Ok(())
    }
}

impl SqlWrite for SimpleClass {
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
        sink.write_string(self.string.as_deref())
    }
}

/// Every supported primitive plus a nested composite. Has no default
/// construction, so decoding it requires a registered factory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AllTypesClass {
    pub string: Option<String>,
    pub b: Option<i8>,
    pub s: Option<i16>,
    pub i: Option<i32>,
    pub l: Option<i64>,
    pub f: Option<f32>,
    pub d: Option<f64>,
    pub bool: Option<bool>,
    pub simple_class: Option<SimpleClass>,
}

impl SqlData for AllTypesClass {
    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
        self.string = source.read_string()?;
        self.b = source.read_byte()?;
        self.s = source.read_short()?;
        self.i = source.read_int()?;
        self.l = source.read_long()?;
        self.f = source.read_float()?;
        self.d = source.read_double()?;
        self.bool = source.read_boolean()?;
        self.simple_class = source.read_object()?;
        Ok(())
    }
}

impl SqlWrite for AllTypesClass {
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
        sink.write_string(self.string.as_deref())?;
        sink.write_byte(self.b)?;
        sink.write_short(self.s)?;
        sink.write_int(self.i)?;
        sink.write_long(self.l)?;
        sink.write_float(self.f)?;
        sink.write_double(self.d)?;
        sink.write_boolean(self.bool)?;
        sink.write_object(self.simple_class.as_ref())
    }
}

/// A composite holding an array of composites.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Basket {
    pub owner: Option<String>,
    pub items: Option<Vec<SimpleClass>>,
}

impl SqlData for Basket {
    fn construct_default() -> Option<Self> {
        Some(Self::default())
    }

    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
        self.owner = source.read_string()?;
        self.items = source.read_array()?;
        Ok(())
    }
}

impl SqlWrite for Basket {
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
        sink.write_string(self.owner.as_deref())?;
        sink.write_array(self.items.as_deref())
    }
}

/// A composite with primitive collections: an array of strings and a
/// string-keyed map of integers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub scores: Option<BTreeMap<String, i64>>,
}

impl SqlData for Profile {
    fn construct_default() -> Option<Self> {
        Some(Self::default())
    }

    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
        self.name = source.read_string()?;
        self.tags = source.read_array()?;
        self.scores = source.read()?;
        Ok(())
    }
}

impl SqlWrite for Profile {
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
        sink.write_string(self.name.as_deref())?;
        sink.write_array(self.tags.as_deref())?;
        sink.write_map(self.scores.as_ref())
    }
}

// ── Schemas ─────────────────────────────────────────────────────────────────

/// `OBJECT(string VARCHAR)`
#[must_use]
pub fn simple_schema(name: &str) -> FieldDescriptor {
    FieldDescriptor::object(name, vec![FieldDescriptor::text("string")])
}

/// The all-types column, built in code. Matches
/// `tests/fixtures/all_types_rowtype.json`.
#[must_use]
pub fn all_types_schema(name: &str) -> FieldDescriptor {
    FieldDescriptor::object(
        name,
        vec![
            FieldDescriptor::text("string"),
            FieldDescriptor::fixed("b", 38, 0).with_type_name("TINYINT"),
            FieldDescriptor::fixed("s", 38, 0).with_type_name("SMALLINT"),
            FieldDescriptor::fixed("i", 38, 0).with_type_name("INTEGER"),
            FieldDescriptor::fixed("l", 38, 0).with_type_name("BIGINT"),
            FieldDescriptor::real("f").with_type_name("FLOAT"),
            FieldDescriptor::real("d"),
            FieldDescriptor::boolean("bool"),
            simple_schema("simpleClass"),
        ],
    )
}

/// `OBJECT(owner VARCHAR, items ARRAY(OBJECT(string VARCHAR)))`
#[must_use]
pub fn basket_schema(name: &str) -> FieldDescriptor {
    FieldDescriptor::object(
        name,
        vec![
            FieldDescriptor::text("owner"),
            FieldDescriptor::array("items", simple_schema("")),
        ],
    )
}

/// `OBJECT(name VARCHAR, tags ARRAY(VARCHAR), scores MAP(VARCHAR, NUMBER))`
#[must_use]
pub fn profile_schema(name: &str) -> FieldDescriptor {
    FieldDescriptor::object(
        name,
        vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::array("tags", FieldDescriptor::text("")),
            FieldDescriptor::map(
                "scores",
                FieldDescriptor::text(""),
                FieldDescriptor::fixed("", 38, 0),
            ),
        ],
    )
}

/// The sample all-types value used across tests.
#[must_use]
pub fn sample_all_types() -> AllTypesClass {
    AllTypesClass {
        string: Some("a".to_string()),
        b: Some(1),
        s: Some(2),
        i: Some(3),
        l: Some(4),
        f: Some(1.1),
        d: Some(2.2),
        bool: Some(true),
        simple_class: Some(SimpleClass::new("b")),
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

/// Path of a file under `tests/fixtures`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Read a fixture file as text.
///
/// # Panics
///
/// Panics if the fixture is missing; fixtures ship with the crate.
#[must_use]
pub fn fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Read a rows fixture: a JSON array of rows, each an array of cells.
///
/// # Panics
///
/// Panics if the fixture is missing or malformed.
#[must_use]
pub fn fixture_rows(name: &str) -> Vec<Row> {
    let RawValue::Array(rows) = RawValue::parse_json(&fixture(name))
        .unwrap_or_else(|e| panic!("invalid rows fixture {name}: {e}"))
    else {
        panic!("rows fixture {name} is not an array");
    };
    rows.into_iter()
        .map(|row| match row {
            RawValue::Array(cells) => cells,
            other => panic!("row in {name} is not an array: {other:?}"),
        })
        .collect()
}

/// `count` single-column rows, each holding `value` encoded under
/// `schema`.
///
/// # Panics
///
/// Panics if `value` does not encode under `schema`.
#[must_use]
pub fn repeated_rows<T: SqlWrite>(value: &T, schema: &FieldDescriptor, count: usize) -> Vec<Row> {
    let raw = StructEncoder::encode(value, schema)
        .unwrap_or_else(|e| panic!("sample value does not encode: {e}"));
    vec![vec![raw]; count]
}
