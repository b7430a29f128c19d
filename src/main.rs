use std::path::PathBuf;

use cbs_tools::convert;
use cbs_tools::{ConvertError, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Convert(args) => execute_convert(args),
    }
}

fn execute_convert(args: ConvertArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ConvertError::MissingInput(args.input));
    }

    let report = convert::convert_file(&args.input, &args.output)?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "converted '{}': {} rows written to {}",
        report.project_name,
        report.rows.len(),
        args.output.display()
    );

    if let Some(limit) = args.preview {
        let preview = report.preview(limit);
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ConvertError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert a flat 表1 cost sheet into the hierarchical 表2 breakdown."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one source workbook into the normalized breakdown workbook.
    Convert(ConvertArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Source workbook (.xls or .xlsx) holding the 表1 worksheet.
    #[arg(long)]
    input: PathBuf,

    /// Destination path of the converted workbook.
    #[arg(long)]
    output: PathBuf,

    /// Print the first N output rows as JSON after converting.
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}
