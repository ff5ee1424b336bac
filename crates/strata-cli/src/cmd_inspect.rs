/// Implementation of `strata inspect`.
///
/// Prints each column's declared signature, then its descriptor tree
/// with one line per node.
///
/// # Output format
///
/// ```text
/// Column 1: OBJ OBJECT(string VARCHAR, simpleClass OBJECT(string VARCHAR))
///   OBJ              OBJECT     null      type=2002
///     string         TEXT       null      type=12    len=16777216
///     simpleClass    OBJECT     null      type=2002
///       string       TEXT       not null  type=12    len=16777216
/// ```
use anyhow::Result;
use strata_types::{BaseType, FieldDescriptor};

use crate::{InspectArgs, load};

/// Run the `strata inspect` command.
///
/// # Errors
///
/// Returns an error if the rowtype file cannot be read or is invalid.
pub fn run(args: &InspectArgs) -> Result<()> {
    let columns = load::row_type(&args.rowtype)?;
    for (idx, column) in columns.iter().enumerate() {
        println!("Column {}: {} {column}", idx + 1, column.name());
        print_tree(column, 1);
    }
    Ok(())
}

fn print_tree(node: &FieldDescriptor, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if node.name().is_empty() { "-" } else { node.name() };
    let nullable = if node.nullable() { "null" } else { "not null" };
    let mut line = format!(
        "{indent}{name:<width$} {:<10} {nullable:<9} type={:<5}",
        node.base().keyword(),
        node.sql_type(),
        width = 18usize.saturating_sub(indent.len()).max(name.len()),
    );
    match node.base() {
        BaseType::Fixed => line.push_str(&format!(" p={} s={}", node.precision(), node.scale())),
        BaseType::Text | BaseType::Char | BaseType::Binary if node.length() > 0 => {
            line.push_str(&format!(" len={}", node.length()));
        }
        _ => {}
    }
    println!("{}", line.trim_end());
    for child in node.fields() {
        print_tree(child, depth + 1);
    }
}
