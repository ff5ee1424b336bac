/// Implementation of `strata decode`.
///
/// Feeds the rows through a [`ResultSet`] in chunks of `--chunk-size`
/// and prints each row as a JSON object keyed by column name, one line
/// per row (or pretty-printed with `--pretty`).
///
/// ```text
/// {"ID":1,"OBJ":{"string":"a","simpleClass":{"string":"b"}}}
/// {"ID":2,"OBJ":null}
/// ```
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use strata_decoder::{DecodedValue, DecoderConfig, FactoryRegistry, MemoryChunks, ResultSet, StructDecoder};
use tracing::info;

use crate::{DecodeArgs, load};

/// Run the `strata decode` command.
///
/// # Errors
///
/// Returns an error if either file cannot be loaded or a cell fails to
/// decode; the message names the row and column.
pub fn run(args: &DecodeArgs, config: DecoderConfig) -> Result<()> {
    let columns = load::row_type(&args.rowtype)?;
    let rows = load::rows(&args.rows)?;
    let decoder = StructDecoder::with_config(Arc::new(FactoryRegistry::new()), config);
    let mut result = ResultSet::new(columns, decoder, MemoryChunks::split(rows, args.chunk_size));

    while result.next()? {
        let mut object = Map::with_capacity(result.column_count());
        for column in 1..=result.column_count() {
            let name = result.columns()[column - 1].name().to_string();
            let value = result
                .get::<DecodedValue>(column)
                .with_context(|| format!("row {}, column {column} ({name})", result.row_number()))?;
            object.insert(name, value.to_json());
        }
        let row = Value::Object(object);
        if args.pretty {
            println!("{}", serde_json::to_string_pretty(&row)?);
        } else {
            println!("{row}");
        }
    }

    info!(rows = result.row_number(), "decode finished");
    Ok(())
}
