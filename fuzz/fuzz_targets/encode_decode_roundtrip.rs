#![no_main]

use std::sync::Arc;

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use strata_decoder::{DecodeError, FactoryRegistry, FieldSource, SqlData, StructDecoder};
use strata_encoder::{EncodeError, FieldSink, SqlWrite, StructEncoder};
use strata_types::FieldDescriptor;

#[derive(Debug, Default, PartialEq, Arbitrary)]
struct Leaf {
    text: Option<String>,
}

#[derive(Debug, Default, PartialEq, Arbitrary)]
struct Record {
    text: Option<String>,
    b: Option<i8>,
    s: Option<i16>,
    i: Option<i32>,
    l: Option<i64>,
    d: Option<f64>,
    flag: Option<bool>,
    bytes: Option<Vec<u8>>,
    leaf: Option<Leaf>,
    leaves: Option<Vec<Leaf>>,
}

impl SqlData for Leaf {
    fn construct_default() -> Option<Self> {
        Some(Self::default())
    }

    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
        self.text = source.read_string()?;
        Ok(())
    }
}

impl SqlWrite for Leaf {
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
        sink.write_string(self.text.as_deref())
    }
}

impl SqlData for Record {
    fn read_fields(&mut self, source: &mut FieldSource<'_>) -> Result<(), DecodeError> {
        self.text = source.read_string()?;
        self.b = source.read_byte()?;
        self.s = source.read_short()?;
        self.i = source.read_int()?;
        self.l = source.read_long()?;
        self.d = source.read_double()?;
        self.flag = source.read_boolean()?;
        self.bytes = source.read_bytes()?;
        self.leaf = source.read_object()?;
        self.leaves = source.read_array()?;
        Ok(())
    }
}

impl SqlWrite for Record {
    fn write_fields(&self, sink: &mut FieldSink<'_>) -> Result<(), EncodeError> {
        sink.write_string(self.text.as_deref())?;
        sink.write_byte(self.b)?;
        sink.write_short(self.s)?;
        sink.write_int(self.i)?;
        sink.write_long(self.l)?;
        sink.write_double(self.d)?;
        sink.write_boolean(self.flag)?;
        sink.write_bytes(self.bytes.as_deref())?;
        sink.write_object(self.leaf.as_ref())?;
        sink.write_array(self.leaves.as_deref())
    }
}

fn leaf_schema(name: &str) -> FieldDescriptor {
    FieldDescriptor::object(name, vec![FieldDescriptor::text("text")])
}

fn record_schema() -> FieldDescriptor {
    FieldDescriptor::object(
        "REC",
        vec![
            FieldDescriptor::text("text"),
            FieldDescriptor::fixed("b", 38, 0),
            FieldDescriptor::fixed("s", 38, 0),
            FieldDescriptor::fixed("i", 38, 0),
            FieldDescriptor::fixed("l", 38, 0),
            FieldDescriptor::real("d"),
            FieldDescriptor::boolean("flag"),
            FieldDescriptor::binary("bytes"),
            leaf_schema("leaf"),
            FieldDescriptor::array("leaves", leaf_schema("")),
        ],
    )
}

// Fuzz target: StructEncoder -> StructDecoder roundtrip.
//
// Any record the encoder accepts must decode back to an equal record
// under the same schema.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(record) = Record::arbitrary(&mut u) else {
        return;
    };
    // NaN never compares equal.
    if record.d.is_some_and(f64::is_nan) {
        return;
    }

    let schema = record_schema();
    let Ok(raw) = StructEncoder::encode(&record, &schema) else {
        return;
    };

    let registry = Arc::new(FactoryRegistry::new());
    registry.register(Record::default);
    let decoded = StructDecoder::new(registry).decode::<Record>(&raw, &schema);
    assert!(decoded.is_ok(), "decoder failed on valid encoder output: {:?}", decoded.err());
    assert_eq!(decoded.unwrap(), record);
});
