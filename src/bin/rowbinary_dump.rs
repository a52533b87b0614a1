use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use rowbinary::{reverse_in_place, FillSource, ReaderConfig, Row, RowReader, RowSchema};

#[derive(Parser, Debug)]
#[command(name = "rowbinary-dump")]
#[command(about = "Decode a RowBinary stream of metric rows and print one line per row")]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Row layout of the input: points, tagged or index
    #[arg(long, default_value = "points")]
    schema: RowSchema,

    /// JSON reader config (scratch_capacity)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reverse metric path segments before printing
    #[arg(long)]
    reverse_paths: bool,

    /// Stop after this many rows
    #[arg(long)]
    limit: Option<u64>,

    /// Print the effective reader config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReaderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReaderConfig::default(),
    };
    if cli.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let source: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    // Pipes and buffered stdin hand out short reads on valid input.
    let mut reader = RowReader::with_config(FillSource::new(source), &config)
        .context("Invalid reader config")?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    info!("Decoding {:?} rows", cli.schema);
    let mut rows = 0u64;
    while cli.limit.map_or(true, |limit| rows < limit) {
        let row = match cli.schema.read_row(&mut reader) {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => {
                warn!("Stopped after {rows} rows: {err}");
                return Err(err).context("Failed to decode row");
            }
        };
        let row = if cli.reverse_paths {
            reverse_row_path(row)
        } else {
            row
        };
        writeln!(out, "{row}").context("Failed to write output")?;
        rows += 1;
    }
    out.flush().context("Failed to flush output")?;
    info!("Decoded {rows} rows");
    Ok(())
}

fn reverse_row_path(mut row: Row) -> Row {
    let path = match &mut row {
        Row::Point(point) => &mut point.path,
        Row::Tagged(tagged) => &mut tagged.path,
        Row::Index(index) => &mut index.path,
    };
    let mut bytes = std::mem::take(path).into_bytes();
    reverse_in_place(&mut bytes);
    *path = String::from_utf8_lossy(&bytes).into_owned();
    row
}
