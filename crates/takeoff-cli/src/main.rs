//! Takeoff CLI - calculation workbook and proposal builder

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use takeoff::extract::extract;
use takeoff::prelude::*;
use takeoff::{CsvReadOptions, CsvWriteOptions, PipelineOutput};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "takeoff")]
#[command(
    author,
    version,
    about = "Build calculation workbooks and bid proposals from construction takeoffs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the calculation sheet and proposal
    Build {
        /// Raw takeoff export (CSV with digitizer item, estimate and page columns)
        #[arg(short, long)]
        records: PathBuf,

        /// Parsed items (JSON array; `section` and `item_type` are snake_case,
        /// e.g. `"soe"`, `"subsection_header"`, `"heel_block"`, `"sum"`)
        #[arg(short, long)]
        items: PathBuf,

        /// Engine options (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the aggregation rule table
    Rules {
        /// Engine options whose extra rules are merged in (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the dimensions found in a description
    Extract {
        /// Item description, e.g. `HP12x63 H=24'-9"`
        text: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            records,
            items,
            config,
            out_dir,
        } => {
            let output = build(&records, &items, config.as_deref(), &out_dir)?;
            report(&output, &mut io::stderr().lock())?;
            Ok(())
        }
        Commands::Rules { config } => {
            let options = load_options(config.as_deref())?;
            print_rules(&options, &mut io::stdout().lock())
        }
        Commands::Extract { text } => {
            let dims = extract(&text);
            let json = serde_json::to_string_pretty(&dims).context("Failed to encode dimensions")?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn load_options(config: Option<&Path>) -> Result<EngineOptions> {
    match config {
        Some(path) => EngineOptions::from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(EngineOptions::default()),
    }
}

fn load_items(path: &Path) -> Result<Vec<ParsedItem>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read items '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse items '{}'", path.display()))
}

/// Run the pipeline and write `calculations.csv`, `proposal.csv` and `proposal.json`
fn build(
    records: &Path,
    items: &Path,
    config: Option<&Path>,
    out_dir: &Path,
) -> Result<PipelineOutput> {
    let options = load_options(config)?;
    let records = CsvReader::read_file(records, &CsvReadOptions::default())
        .with_context(|| format!("Failed to read records '{}'", records.display()))?;
    let items = load_items(items)?;
    info!(records = records.len(), items = items.len(), "inputs loaded");

    let output = Pipeline::new(options)
        .run(records, &items)
        .context("Failed to build workbook")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create '{}'", out_dir.display()))?;
    let write_options = CsvWriteOptions::default();
    let sheets = [
        ("calculations.csv", output.calculation_sheet()),
        ("proposal.csv", output.proposal_sheet()),
    ];
    for (name, sheet) in sheets {
        let sheet = sheet.with_context(|| format!("No worksheet for {}", name))?;
        let path = out_dir.join(name);
        CsvWriter::write_file(sheet, &path, &write_options)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
    }

    let path = out_dir.join("proposal.json");
    let json = serde_json::to_string_pretty(&output.proposal).context("Failed to encode proposal")?;
    fs::write(&path, json).with_context(|| format!("Failed to write '{}'", path.display()))?;
    info!(dir = %out_dir.display(), "outputs written");

    Ok(output)
}

fn report<W: Write>(output: &PipelineOutput, out: &mut W) -> Result<()> {
    for p in output.unresolved() {
        writeln!(
            out,
            "unresolved: {} / {} row {}: {{{}}}",
            p.section, p.subsection, p.row, p.token
        )?;
    }
    for s in &output.skipped {
        let column = s.column.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        writeln!(out, "skipped: row {} column {}: {}", s.row, column, s.reason)?;
    }
    Ok(())
}

fn print_rules<W: Write>(options: &EngineOptions, out: &mut W) -> Result<()> {
    let table = RuleTable::standard().extend(&options.extra_rules);
    for entry in table.entries() {
        let section = entry.section.map(|s| s.title()).unwrap_or("-");
        match entry.item_type {
            Some(item_type) => writeln!(
                out,
                "{:<16} {:<28} [{}] {}",
                section, entry.subsection, item_type, entry.columns
            )?,
            None => writeln!(out, "{:<16} {:<28} {}", section, entry.subsection, entry.columns)?,
        }
    }
    Ok(())
}
