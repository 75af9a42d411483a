use std::path::PathBuf;

use block_pattern::{
    bytes_from_megabytes, BlockLayout, BlockWriter, OutputMode, DEFAULT_BLOCK_SIZE,
};
use clap::{error::ErrorKind, Parser};
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const LOG_ENV: &str = "BLOCK_PATTERN_LOG";

/// Write a file of fixed-size blocks, each holding a marker followed by the
/// block's own index.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// File to create or overwrite.
    output: PathBuf,

    /// Size in megabytes; may be fractional. Trailing bytes short of a full
    /// block are not written.
    #[arg(allow_negative_numbers = true)]
    size_mb: f64,

    /// Size of each block in bytes; a multiple of 8.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Marker written at the start of every block, in hex.
    #[arg(long, value_parser = parse_marker, default_value = "0xdeadbeefdeadbeef")]
    marker: u64,

    /// Write to a temporary file and rename it over the output when done.
    #[arg(long)]
    atomic: bool,
}

fn parse_marker(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
        .replace('_', "");
    u64::from_str_radix(&digits, 16).map_err(|e| format!("invalid hex marker {s:?}: {e}"))
}

fn init_logging() -> anyhow::Result<()> {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::WARN.into());
    // RUST_LOG wins over our own variable when both are set.
    let filter = builder
        .try_from_env()
        .or_else(|_| builder.with_env_var(LOG_ENV).from_env())?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn main() -> anyhow::Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };
    init_logging()?;

    let layout = BlockLayout::new(args.block_size, args.marker)?;
    let bytes = bytes_from_megabytes(args.size_mb)?;
    let count = layout.block_count(bytes);
    debug!(bytes, count, "computed block count");

    println!("Writing {} bytes to file {:?}", bytes, args.output);
    let mode = if args.atomic {
        OutputMode::Atomic
    } else {
        OutputMode::InPlace
    };
    BlockWriter::new(layout).write_file(&args.output, count, mode)?;
    println!("Done");

    Ok(())
}
