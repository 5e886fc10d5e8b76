//! Implementation of the sledger-replay command.

use crate::cmd::completions::ShellType;
use crate::report::{render_text, JsonReport};
use crate::script::{self, Operation};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use stockledger_core::Ledger;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Output format for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Replay stock operations and report on the resulting ledger.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file holding the operations to replay
    #[arg(
        value_name = "FILE",
        required_unless_present_any = ["demo", "snapshot", "generate_completions"],
        conflicts_with = "demo"
    )]
    pub file: Option<PathBuf>,

    /// Replay the built-in example warehouse instead of a file
    #[arg(long)]
    pub demo: bool,

    /// Start from a saved ledger (JSON snapshot) instead of an empty one
    #[arg(long, short = 's', value_name = "SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Log ledger operations to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,
}

fn operations(args: &Args) -> Result<Vec<Operation>> {
    match &args.file {
        Some(path) => script::load_script(path),
        None if args.demo => Ok(script::demo_script()),
        None if args.snapshot.is_some() => Ok(Vec::new()),
        None => anyhow::bail!("no operation script given"),
    }
}

/// Replay the script named by `args` and write the report.
///
/// Returns whether the resulting stock matches the movement log. Operations
/// keep a ledger consistent, so a mismatch can only come from a `--snapshot`
/// whose stock and movements disagree.
pub fn write_report(args: &Args, out: &mut impl Write) -> Result<bool> {
    let ledger = match &args.snapshot {
        Some(path) => script::load_snapshot(path)?,
        None => Ledger::new(),
    };
    let operations = operations(args)?;
    let (ledger, outcomes) = script::replay_onto(ledger, &operations)?;
    let inconsistencies = ledger.find_inconsistencies();
    let consistent = inconsistencies.is_empty();

    if !args.quiet {
        match args.format {
            OutputFormat::Text => {
                write!(out, "{}", render_text(&ledger, &inconsistencies))?;
            }
            OutputFormat::Json => {
                let report = JsonReport::new(&ledger, outcomes);
                serde_json::to_writer_pretty(&mut *out, &report)
                    .context("failed to write JSON report")?;
                writeln!(out)?;
            }
        }
    }

    Ok(consistent)
}

fn run(args: &Args, out: &mut impl Write) -> Result<ExitCode> {
    if write_report(args, out)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Main entry point for the replay command.
pub fn main() -> ExitCode {
    main_with_name("sledger-replay")
}

/// Main entry point with custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .init();
    }

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sledger-replay").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_args_require_a_source() {
        assert!(Args::try_parse_from(["sledger-replay"]).is_err());
        assert!(Args::try_parse_from(["sledger-replay", "ops.json", "--demo"]).is_err());
        assert!(parse(&["--demo"]).demo);
        assert!(parse(&["--snapshot", "ledger.json"]).file.is_none());
        assert!(parse(&["ops.json", "-s", "ledger.json"]).snapshot.is_some());
        assert_eq!(parse(&["ops.json", "-f", "json"]).format, OutputFormat::Json);
    }

    #[test]
    fn test_run_demo_text() {
        let mut out = Vec::new();
        let consistent = write_report(&parse(&["--demo"]), &mut out).unwrap();

        assert!(consistent);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("===== INVENTORY ====="));
    }

    #[test]
    fn test_run_quiet_writes_nothing() {
        let mut out = Vec::new();
        write_report(&parse(&["--demo", "--quiet"]), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
