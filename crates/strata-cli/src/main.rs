/// Strata command-line tool. Inspects column metadata and decodes
/// structured (OBJECT / ARRAY / MAP) result values from JSON fixtures.
///
/// # Command overview
///
/// ```text
/// strata <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print each column's descriptor tree
///   validate   Decode every cell and report the first failure
///   decode     Walk rows through a result set and print them as JSON
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Debug logging (overridden by RUST_LOG)
///   --strict         Reject raw object fields the schema does not declare
///   --max-depth N    Nesting limit per value (default 100)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Input files
///
/// `rowtype.json` is the driver's column metadata: an array of field
/// descriptors (`name`, `typeName`, `type`, `nullable`, `base`, `fields`,
/// ...). `rows.json` is an array of rows, each an array of cells in
/// column order; structured cells may be JSON values or JSON text.
///
/// # Exit codes
///
/// | Code | Meaning                                       |
/// |------|-----------------------------------------------|
/// | 0    | Success                                       |
/// | 1    | Error (I/O failure, bad metadata, bad value)  |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use strata_decoder::DecoderConfig;
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_inspect;
mod cmd_validate;
mod load;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The Strata structured-type command-line tool.
#[derive(Parser)]
#[command(name = "strata", version, about = "Structured type decoding CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging for the strata crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fail on raw object fields that the schema does not declare.
    #[arg(long, global = true)]
    strict: bool,

    /// Maximum nesting of OBJECT / ARRAY / MAP levels in one value.
    #[arg(long, global = true, default_value_t = DecoderConfig::default().max_depth)]
    max_depth: usize,
}

impl Cli {
    fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::default()
            .with_max_depth(self.max_depth)
            .with_reject_unknown_fields(self.strict)
    }
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print each column's descriptor tree.
    Inspect(InspectArgs),
    /// Decode every cell dynamically and report the first failure.
    Validate(ValidateArgs),
    /// Walk rows through a chunked result set and print each as JSON.
    Decode(DecodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `strata inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the rowtype JSON (column metadata).
    pub rowtype: PathBuf,
}

/// Arguments for `strata validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the rowtype JSON (column metadata).
    pub rowtype: PathBuf,

    /// Path to the rows JSON (array of rows, one cell per column).
    pub rows: PathBuf,
}

/// Arguments for `strata decode`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                               │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ --chunk-size │ rows per chunk fed to the result set (default 1000)  │
/// │ --pretty     │ pretty-print each row instead of one line per row    │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the rowtype JSON (column metadata).
    pub rowtype: PathBuf,

    /// Path to the rows JSON (array of rows, one cell per column).
    pub rows: PathBuf,

    /// Rows per chunk.
    #[arg(long, default_value_t = 1000)]
    pub chunk_size: usize,

    /// Pretty-print each decoded row.
    #[arg(long)]
    pub pretty: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --verbose picks the level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("strata_decoder=debug,strata_cli=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.decoder_config();
    let result = match &cli.command {
        Commands::Inspect(args) => cmd_inspect::run(args),
        Commands::Validate(args) => cmd_validate::run(args, config),
        Commands::Decode(args) => cmd_decode::run(args, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
