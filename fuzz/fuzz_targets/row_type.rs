#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: column metadata parsing.
//
// Feeds arbitrary text to `FieldDescriptor::row_type_from_json`. Any
// descriptor that parses must also pass validation and render a
// signature without panicking.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(columns) = strata_types::FieldDescriptor::row_type_from_json(text) {
        for column in &columns {
            assert!(column.validate().is_ok(), "parsed column fails validation: {column}");
            let _ = column.to_string();
        }
    }
});
