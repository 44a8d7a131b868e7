//! valdiff command-line interface.
//!
//! Loads two structured data files and prints their structural diff in the
//! same indented block format used for test failures.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use valdiff::{
    format_diff, format_fallback, parse_file, DiffConfig, Differ, OutputFormat, OutputOptions,
    ValdiffError,
};

/// valdiff - structural diff of two data files
///
/// Compares JSON, YAML and TOML documents facet by facet and prints every
/// added, deleted and changed value as an indented block.
#[derive(Parser)]
#[command(name = "valdiff")]
#[command(version)]
#[command(about = "Structural diff of two data files", long_about = None)]
struct Cli {
    /// Expected file
    #[arg(value_name = "EXPECTED")]
    expected: PathBuf,

    /// Actual file
    #[arg(value_name = "ACTUAL")]
    actual: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "terminal")]
    format: OutputFormatArg,

    /// Spaces per indent level
    #[arg(long, default_value = "2")]
    indent: usize,

    /// Deepest nesting level to diff
    #[arg(long, default_value = "64")]
    max_depth: usize,

    /// Ignore whitespace differences in strings
    #[arg(long)]
    ignore_whitespace: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress the summary line)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Colored terminal output
    Terminal,
    /// JSON representation
    Json,
    /// Plain text (no colors)
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "valdiff=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let expected = parse_file(&cli.expected)
        .with_context(|| format!("Failed to parse first file: {}", cli.expected.display()))?;
    let actual = parse_file(&cli.actual)
        .with_context(|| format!("Failed to parse second file: {}", cli.actual.display()))?;

    let differ = Differ::builder()
        .config(DiffConfig {
            max_depth: cli.max_depth,
            indent_width: cli.indent,
            ignore_whitespace: cli.ignore_whitespace,
        })
        .build();

    let format = OutputFormat::from(cli.format);
    let options = OutputOptions {
        summary: !cli.quiet,
    };
    let rendered = differ
        .operations(&expected, &actual)
        .map_err(ValdiffError::from)
        .and_then(|sequence| {
            debug!("formatting output");
            let output = format_diff(&differ, &sequence, format, &options)?;
            Ok((output, sequence.is_unchanged()))
        });

    let (output, unchanged) = match rendered {
        Ok(rendered) => rendered,
        Err(ValdiffError::Diff(err)) => {
            debug!(error = %err, "structural diff failed, inspecting values instead");
            let output = format_fallback(&differ, &expected, &actual, &err, format)
                .context("Failed to format fallback output")?;
            (output, differ.values_equal(&expected, &actual))
        }
        Err(err) => return Err(err).context("Failed to format diff output"),
    };
    println!("{}", output.trim_end());

    Ok(if unchanged { 0 } else { 1 })
}
