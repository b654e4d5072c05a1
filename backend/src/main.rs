//! Titanic CLI - derived tables over the passenger dataset
//!
//! ```bash
//! titanic inspect                      # Load and describe the dataset
//! titanic survival                     # Survival rate by class / sex / age group
//! titanic families --format csv        # Fare statistics by family size / class
//! titanic last-names --top 10          # Most frequent surnames
//! titanic age-division -o ages.json -f json
//! titanic report -o report.json        # Everything, as one JSON document
//! ```
//!
//! The data source defaults to `TITANIC_DATA_SOURCE` (or the canonical URL)
//! and can be overridden per command with `--source`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use titanic::output::{render_last_names, render_rows, write_output};
use titanic::{
    determine_age_division, family_groups, last_names, survival_demographics, AppResult,
    Config, DataSource, Loader, OutputFormat, ParseResult, Report,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "titanic")]
#[command(about = "Grouped statistics over the Titanic passenger dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Dataset URL or file path (default: TITANIC_DATA_SOURCE or the canonical URL)
    #[arg(short, long)]
    source: Option<String>,
}

#[derive(Args)]
struct TableArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dataset and describe it
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Survival rate by passenger class, sex, and age group
    Survival {
        #[command(flatten)]
        args: TableArgs,
    },

    /// Fare statistics by family size and passenger class
    Families {
        #[command(flatten)]
        args: TableArgs,
    },

    /// Surname frequency, most frequent first
    LastNames {
        #[command(flatten)]
        args: TableArgs,

        /// Only show the N most frequent surnames
        #[arg(long)]
        top: Option<usize>,
    },

    /// Every passenger with an older-than-class-median flag
    AgeDivision {
        #[command(flatten)]
        args: TableArgs,
    },

    /// All derived tables as one JSON document
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { source } => cmd_inspect(&source),
        Commands::Survival { args } => cmd_survival(&args),
        Commands::Families { args } => cmd_families(&args),
        Commands::LastNames { args, top } => cmd_last_names(&args, top),
        Commands::AgeDivision { args } => cmd_age_division(&args),
        Commands::Report { source, output } => cmd_report(&source, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the data source and load it once.
fn load(args: &SourceArgs) -> AppResult<(DataSource, ParseResult)> {
    let mut config = Config::from_env()?;
    if let Some(locator) = &args.source {
        config = config.with_data_source(locator.as_str());
    }
    let source = DataSource::parse(&config.data_source);
    debug!(source = %source, timeout = ?config.fetch_timeout, "resolved data source");

    let result = Loader::new(&config).load(&source)?;
    Ok((source, result))
}

fn cmd_inspect(args: &SourceArgs) -> AppResult<()> {
    let (source, result) = load(args)?;
    let table = &result.table;

    let mut summary = String::new();
    summary.push_str(&format!("Source:    {}\n", source));
    summary.push_str(&format!("Encoding:  {}\n", result.encoding));
    summary.push_str(&format!("Delimiter: '{}'\n", format_delimiter(result.delimiter)));
    summary.push_str(&format!("Headers:   {}\n", result.headers.join(", ")));
    summary.push_str(&format!("Columns:   {}\n", result.columns.join(", ")));
    summary.push_str(&format!("Rows:      {}\n", table.len()));
    summary.push_str(&format!(
        "Ages:      {} known, {} unknown\n",
        table.known_age_count(),
        table.len() - table.known_age_count()
    ));

    write_output(&summary, None)?;
    Ok(())
}

fn cmd_survival(args: &TableArgs) -> AppResult<()> {
    let (_, result) = load(&args.source)?;
    let rows = survival_demographics(&result.table);
    let content = render_rows(&rows, args.format)?;
    write_output(&content, args.output.as_deref())?;
    Ok(())
}

fn cmd_families(args: &TableArgs) -> AppResult<()> {
    let (_, result) = load(&args.source)?;
    let rows = family_groups(&result.table);
    let content = render_rows(&rows, args.format)?;
    write_output(&content, args.output.as_deref())?;
    Ok(())
}

fn cmd_last_names(args: &TableArgs, top: Option<usize>) -> AppResult<()> {
    let (_, result) = load(&args.source)?;
    let counts = last_names(&result.table);
    let content = render_last_names(&counts, top, args.format)?;
    write_output(&content, args.output.as_deref())?;
    Ok(())
}

fn cmd_age_division(args: &TableArgs) -> AppResult<()> {
    let (_, result) = load(&args.source)?;
    let rows = determine_age_division(&result.table);
    let content = render_rows(&rows, args.format)?;
    write_output(&content, args.output.as_deref())?;
    Ok(())
}

fn cmd_report(args: &SourceArgs, output: Option<PathBuf>) -> AppResult<()> {
    let (source, result) = load(args)?;
    let table = &result.table;

    let counts = last_names(table);
    let report = Report {
        source: source.to_string(),
        n_records: table.len(),
        survival_demographics: survival_demographics(table),
        family_groups: family_groups(table),
        last_names: &counts,
        age_division: determine_age_division(table),
    };

    let content = report.render(OutputFormat::Json)?;
    write_output(&content, output.as_deref())?;
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
