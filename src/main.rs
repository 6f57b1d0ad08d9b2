use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use plotwire::csv_reader;
use plotwire::export;
use plotwire::runtime::{self, DataTable};
use plotwire::{ExportFormat, ExportOptions};

#[derive(Parser, Debug)]
#[command(name = "plotwire")]
#[command(about = "Build interactive plots from CSV or JSON data using a small pipeline script", long_about = None)]
struct Args {
    /// Plot script (e.g., 'line(x: t, y: v) | slider(column: y, frames: [v1, v2])')
    script: String,

    /// Input data file (.csv or .json); CSV is read from stdin when omitted
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output file; written to stdout when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output format: html, png or svg (defaults to the output file extension, then html)
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// Export options as JSON (e.g., '{"width": 800, "title": "Run 3"}')
    #[arg(long)]
    options: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let table = load_table(args.data.as_deref())?;

    let mut options: ExportOptions = match &args.options {
        Some(json) => serde_json::from_str(json).context("Failed to parse --options JSON")?,
        None => ExportOptions::default(),
    };
    if let Some(format) = args
        .format
        .or_else(|| args.out.as_deref().and_then(ExportFormat::from_path))
    {
        options.format = format;
    }

    let document = runtime::run(&args.script, &table).context("Failed to build plot")?;

    match &args.out {
        Some(path) => export::export(&document, path, &options)?,
        None => {
            let bytes = export::render(&document, &options)?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&bytes).context("Failed to write output to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

fn load_table(path: Option<&Path>) -> Result<DataTable> {
    let Some(path) = path else {
        let csv_data = csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?;
        return DataTable::from_csv(csv_data);
    };

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
        DataTable::from_json(&value)
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let csv_data = csv_reader::read_csv(file).with_context(|| format!("Failed to read CSV from {}", path.display()))?;
        DataTable::from_csv(csv_data)
    }
}
