#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use strata_decoder::{DecoderConfig, FactoryRegistry, MemoryChunks, ResultSet, StructDecoder};
use strata_types::{FieldDescriptor, RawValue};

fn columns() -> Vec<FieldDescriptor> {
    let inner = FieldDescriptor::object("inner", vec![FieldDescriptor::text("s")]);
    vec![
        FieldDescriptor::object(
            "OBJ",
            vec![
                FieldDescriptor::text("s"),
                FieldDescriptor::fixed("n", 38, 0),
                FieldDescriptor::fixed("amount", 12, 2),
                FieldDescriptor::real("r"),
                FieldDescriptor::boolean("flag"),
                FieldDescriptor::binary("bytes"),
                inner.clone(),
            ],
        ),
        FieldDescriptor::array("ARR", inner.clone()),
        FieldDescriptor::map("MAP", FieldDescriptor::text(""), inner),
    ]
}

// Fuzz target: JSON-text structured cells through the row API.
//
// The same arbitrary text is placed in an OBJECT, an ARRAY and a MAP
// column and read back dynamically. Catches bugs in:
// - JSON parsing of cell text
// - Shape checks against each composite base type
// - Primitive coercion of text, integer and float spellings
// - Depth limiting on deeply nested input
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let decoder = StructDecoder::with_config(
        Arc::new(FactoryRegistry::new()),
        DecoderConfig::default().with_max_depth(16),
    );
    let cell = RawValue::Text(text.to_string());
    let mut rs = ResultSet::new(
        columns(),
        decoder,
        MemoryChunks::new([vec![vec![cell.clone(), cell.clone(), cell]]]),
    );
    if !matches!(rs.next(), Ok(true)) {
        return;
    }
    for column in 1..=rs.column_count() {
        if let Ok(value) = rs.get_value(column) {
            let _ = value.to_json();
        }
    }
});
