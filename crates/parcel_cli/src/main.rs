//! Parcel registry command line driver.
//!
//! # Responsibility
//! - Replay recorded scenario suites against the core registry.
//! - Report mismatches and exit non-zero when any case fails.
//!
//! Usage:
//!   parcel replay cases.json
//!   parcel replay cases.json --case 3 --legacy
//!   parcel replay cases.json --log-dir /tmp/parcel-logs --json

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use parcel_core::{
    default_log_level, init_logging, init_stderr_logging, load_suite, RegistryConfig,
    ReplayRunner, SuiteReport,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "parcel")]
#[command(about = "Temporal package registry tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON scenario suite
    Replay(ReplayArgs),
    /// Print the core version
    Version,
}

#[derive(clap::Args, Debug)]
struct ReplayArgs {
    /// Scenario suite file
    file: PathBuf,

    /// Run only this case
    #[arg(long)]
    case: Option<String>,

    /// Let current queries ignore delivery and free rolled-back ids
    #[arg(long)]
    legacy: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rotated log files; stderr when omitted
    #[arg(long)]
    log_dir: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Replay(args) => replay(args),
        Commands::Version => {
            println!("parcel_core version={}", parcel_core::core_version());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn replay(args: ReplayArgs) -> Result<ExitCode> {
    match &args.log_dir {
        Some(dir) => init_logging(&args.log_level, dir),
        None => init_stderr_logging(&args.log_level),
    }
    .map_err(|err| anyhow!(err))
    .context("failed to initialize logging")?;

    let suite = load_suite(&args.file)?;
    let config = if args.legacy {
        RegistryConfig::legacy()
    } else {
        RegistryConfig::default()
    };

    let runner = ReplayRunner::new(config);
    let report = match &args.case {
        Some(name) => runner.run_named(&suite, name)?,
        None => runner.run_suite(&suite)?,
    };

    info!(
        "event=replay_finish module=cli status={} run_id={} cases={}",
        if report.passed() { "ok" } else { "error" },
        report.run_id,
        report.cases.len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(report: &SuiteReport) {
    for case in &report.cases {
        let status = if case.passed() { "ok" } else { "FAILED" };
        println!(
            "case {}: {status} ({} steps, {} checked)",
            case.name, case.steps_run, case.steps_checked
        );
        for mismatch in &case.mismatches {
            println!(
                "  step {} {}: expected {} got {}",
                mismatch.step_index, mismatch.method, mismatch.expected, mismatch.actual
            );
        }
    }
    let failed = report.failed_cases().count();
    println!(
        "{} passed, {failed} failed (run {})",
        report.cases.len() - failed,
        report.run_id
    );
}
