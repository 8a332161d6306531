use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sheet_concat::concat::ConcatOptions;
use sheet_concat::io::WriteOptions;
use sheet_concat::pipeline::{self, ConcatConfig, SchemaSource};
use sheet_concat::schema::Resolution;
use sheet_concat::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Concat(args) => execute_concat(args),
        Command::Inspect(args) => execute_inspect(args),
    }
}

fn execute_concat(args: ConcatArgs) -> Result<()> {
    let config = args.input.into_config(args.output, args.null_value);
    let summary = pipeline::run(&config)?;

    println!(
        "Wrote {} rows from {} file(s) to {}",
        summary.rows,
        summary.merged.len(),
        summary.output.display()
    );
    for warning in &summary.warnings {
        println!("  skipped {}: {}", warning.source, warning.message);
    }
    Ok(())
}

fn execute_inspect(args: InputArgs) -> Result<()> {
    let config = args.into_config(PathBuf::new(), String::new());
    let reports = pipeline::inspect(&config)?;
    if reports.is_empty() {
        println!("No input files found in {}", config.folder.display());
    }

    for report in reports {
        println!("{}", report.path.display());
        match &report.columns {
            Ok(columns) => println!("  columns: {}", columns.join(", ")),
            Err(error) => println!("  unreadable: {error}"),
        }
        if let Some(mapping) = &report.mapping {
            for (output, resolution) in mapping.entries() {
                match resolution {
                    Resolution::Source(source) => println!("  {output} <- {source}"),
                    Resolution::Absent => println!("  {output} <- (missing)"),
                }
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| ToolError::Logging(error.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn parse_rate(value: &str) -> std::result::Result<f64, String> {
    let rate: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{rate} is outside the range 0.0 to 1.0"))
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Concatenate spreadsheet files whose column layouts differ."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every matching file of a folder into one output file.
    Concat(ConcatArgs),
    /// Show the columns of every input and how they resolve, without writing.
    Inspect(InputArgs),
}

#[derive(Args)]
struct ConcatArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file path. `.csv` writes CSV, anything else xlsx. `{timestamp}`
    /// is replaced by the run time.
    #[arg(short, long, default_value = "combined_data.xlsx")]
    output: PathBuf,

    /// Text written for null cells in CSV output. Empty strings are always
    /// written as `""`.
    #[arg(long, default_value = "")]
    null_value: String,
}

#[derive(Args)]
struct InputArgs {
    /// Folder containing the files to merge.
    folder: PathBuf,

    /// File name pattern to match (e.g. "data_*.xlsx"). Defaults to Excel files.
    #[arg(short, long)]
    pattern: Option<String>,

    /// Worksheet to read from every workbook. Defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// JSON file mapping output columns to accepted aliases.
    #[arg(short, long, conflicts_with_all = ["template", "default_mapping"])]
    mapping: Option<PathBuf>,

    /// Use the built-in column mapping.
    #[arg(long, conflicts_with = "template")]
    default_mapping: bool,

    /// Workbook whose header row defines the output columns.
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Output columns to leave out.
    #[arg(short, long, num_args = 1..)]
    exclude: Vec<String>,

    /// Adds a `datePeriod` column holding this value.
    #[arg(long)]
    period: Option<String>,

    /// Adds a column naming the file each row came from.
    #[arg(long, num_args = 0..=1, default_missing_value = "sourceFile")]
    source_column: Option<String>,

    /// Skip files matching fewer than this fraction of output columns.
    #[arg(long, value_parser = parse_rate)]
    min_match_rate: Option<f64>,
}

impl InputArgs {
    fn schema_source(&self) -> SchemaSource {
        match (&self.mapping, &self.template) {
            (Some(mapping), _) => SchemaSource::Mapping(Some(mapping.clone())),
            (None, Some(template)) => SchemaSource::Template(template.clone()),
            (None, None) if self.default_mapping => SchemaSource::Mapping(None),
            (None, None) => SchemaSource::Identical,
        }
    }

    fn into_config(self, output: PathBuf, null_value: String) -> ConcatConfig {
        let schema = self.schema_source();
        ConcatConfig {
            folder: self.folder,
            output,
            pattern: self.pattern,
            sheet: self.sheet,
            schema,
            options: ConcatOptions {
                exclude: self.exclude,
                source_column: self.source_column,
                period: self.period,
                min_match_rate: self.min_match_rate,
            },
            write: WriteOptions { null_value },
        }
    }
}
