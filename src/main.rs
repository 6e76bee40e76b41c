use clap::{ArgAction, ArgGroup, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tablesplice::cli::{self, ConfigOverrides, ExtractRequest};
use tablesplice::error::SpliceResult;

#[derive(Parser)]
#[command(name = "tablesplice")]
#[command(about = "Extract a marker-delimited table from a spreadsheet report and merge it into a JSON/YAML document.")]
#[command(long_about = "Tablesplice - marker-delimited report extraction

A report sheet holds several tables back-to-back, each introduced by a row
whose first cell is the header keyword. Tablesplice cuts the sheet at those
rows, concatenates the tables, filters the result, and stores it in a
structured document under ROOT -> DATA_GROUP -> CATEGORY.

The output document keeps its format across runs (JSON or YAML). A missing
output file is created as JSON. CSV files cannot be updated.

EXAMPLES:
  tablesplice -i report.xlsx --show_headers
  tablesplice -i report.xlsx --data_group G --category C --output data.json
  tablesplice --base_report_path /reports --data_group G --category C \\
      --select DOG,SIZE --where 'DOG == \"DOG_t\" and SIZE == 25' --output data.yaml

WHERE SYNTAX:
  comparisons  == != < <= > >=
  connectives  and or not, parentheses
  literals     \"text\" 'text' 42 -1.5 True False
  columns      NAME or `name with spaces`")]
#[command(version)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["input", "base_report_path"]),
))]
struct Cli {
    /// Input Excel file path
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Base path to construct file location from the filename pattern
    #[arg(long = "base_report_path")]
    base_report_path: Option<PathBuf>,

    /// Data group name
    #[arg(long = "data_group")]
    data_group: Option<String>,

    /// Category name
    #[arg(long)]
    category: Option<String>,

    /// Columns to select, e.g. 'DOG,SIZE'
    #[arg(long)]
    select: Option<String>,

    /// Filter condition, e.g. 'DOG == "DOG_t" and SIZE == 25'
    #[arg(long = "where")]
    where_clause: Option<String>,

    /// Output file to update/insert content
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print headers only
    #[arg(long = "show_headers")]
    show_headers: bool,

    /// YAML config file
    #[arg(long, env = "TABLESPLICE_CONFIG")]
    config: Option<PathBuf>,

    /// Marker value in column 0 that starts each table
    #[arg(long = "header_keyword", env = "TABLESPLICE_HEADER_KEYWORD")]
    header_keyword: Option<String>,

    /// First row of the concatenated table to keep
    #[arg(long = "start_table", allow_negative_numbers = true)]
    start_table: Option<i64>,

    /// Row after the last one to keep
    #[arg(long = "end_table", allow_negative_numbers = true)]
    end_table: Option<i64>,

    /// Filename pattern with {data_group} and {category} placeholders
    #[arg(long = "filename_pattern", env = "TABLESPLICE_FILENAME_PATTERN")]
    filename_pattern: Option<String>,

    /// Root key of the output document
    #[arg(long = "data_structure", env = "TABLESPLICE_DATA_STRUCTURE")]
    data_structure: Option<String>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "tablesplice=warn",
        1 => "tablesplice=info",
        _ => "tablesplice=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Cli) -> SpliceResult<()> {
    let config = cli::build_config(
        args.config.as_deref(),
        ConfigOverrides {
            header_keyword: args.header_keyword,
            start_table: args.start_table,
            end_table: args.end_table,
            base_report_path: args.base_report_path,
            filename_pattern: args.filename_pattern,
            data_structure: args.data_structure,
        },
    )?;

    let request = ExtractRequest {
        input: args.input,
        data_group: args.data_group,
        category: args.category,
        select: args.select,
        where_clause: args.where_clause,
        output: args.output,
    };

    if args.show_headers {
        cli::print_headers(&config, &request)
    } else {
        cli::run_extract(&config, &request)
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
