/// Implementation of `strata validate`.
///
/// Decodes every cell of every row dynamically (to `DecodedValue`) and
/// reports either success checkmarks or the first failure with its
/// error kind and location.
///
/// # Success output
///
/// ```text
/// ✓ Rowtype: 3 columns, shapes valid
/// ✓ Rows: 120 rows decoded without error
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Row 7, column 2 (OBJ): PrecisionLoss: precision loss at OBJ.b: 300 does not fit i8
/// ```
use std::sync::Arc;

use anyhow::{Result, anyhow};
use strata_decoder::{DecodedValue, DecoderConfig, FactoryRegistry, MemoryChunks, ResultSet, StructDecoder};

use crate::{ValidateArgs, load};

/// Run the `strata validate` command.
///
/// # Errors
///
/// Returns an error if either file cannot be loaded, or if any cell
/// fails to decode.
pub fn run(args: &ValidateArgs, config: DecoderConfig) -> Result<()> {
    let columns = load::row_type(&args.rowtype)?;
    println!(
        "✓ Rowtype: {} column{}, shapes valid",
        columns.len(),
        if columns.len() == 1 { "" } else { "s" }
    );

    let rows = load::rows(&args.rows)?;
    let decoder = StructDecoder::with_config(Arc::new(FactoryRegistry::new()), config);
    let mut result = ResultSet::new(columns, decoder, MemoryChunks::new([rows]));

    while result.next()? {
        for column in 1..=result.column_count() {
            if let Err(e) = result.get::<DecodedValue>(column) {
                println!(
                    "✗ Row {}, column {column} ({}): {:?}: {e}",
                    result.row_number(),
                    result.columns()[column - 1].name(),
                    e.kind()
                );
                return Err(anyhow!("validation failed"));
            }
        }
    }

    let count = result.row_number();
    println!(
        "✓ Rows: {count} row{} decoded without error",
        if count == 1 { "" } else { "s" }
    );
    Ok(())
}
