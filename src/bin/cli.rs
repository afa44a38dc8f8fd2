// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! exprcheck CLI
//! Runs a test file against an expression evaluator and writes a report

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use exprcheck::evaluation::{
    run_suite, CommandEvaluator, HarnessConfig, LineSource, MemoryProbe, Metrics, NoMemoryProbe,
    Report, ReportFormat, ResidentMemoryProbe, SuiteOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "exprcheck")]
#[command(about = "Expression evaluator test harness", long_about = None)]
struct Cli {
    /// Test file: a local path or an http(s) URL
    source: String,

    /// Write an HTML report instead of JSON
    #[arg(long)]
    html: bool,

    /// Directory for the report (defaults to the executable's directory)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Evaluator program to test
    #[arg(short, long)]
    evaluator: Option<String>,

    /// Extra argument passed to the evaluator before the expression
    #[arg(long = "evaluator-arg", allow_hyphen_values = true)]
    evaluator_args: Vec<String>,

    /// Skip memory sampling
    #[arg(long)]
    no_memory: bool,

    /// Configuration file (defaults to ./exprcheck.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "exprcheck=debug".to_string())
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    debug!(?config, "configuration loaded");

    let format = if cli.html {
        ReportFormat::Html
    } else {
        config.format
    };
    let output_dir = resolve_output_dir(cli, &config)?;
    let evaluator = build_evaluator(cli, &config)?;

    let source = LineSource::detect(&cli.source);
    if source.is_remote() {
        println!("The test file will be fetched remotely.");
    }
    let probe: Box<dyn MemoryProbe> = if config.sample_memory && !cli.no_memory {
        Box::new(ResidentMemoryProbe)
    } else {
        Box::new(NoMemoryProbe)
    };

    println!(
        "Running {} against {}...",
        source,
        evaluator.program().display()
    );
    let SuiteOutcome {
        report,
        report_path: path,
    } = with_spinner(source.is_remote(), || {
        run_suite(&source, &evaluator, probe, format, &output_dir)
    })?;

    print_summary(&report);
    println!(
        "{} report saved to \"{}\".",
        format.as_str().to_uppercase(),
        path.display()
    );

    Ok(())
}

fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = HarnessConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => HarnessConfig::load(),
    }
}

fn resolve_output_dir(cli: &Cli, config: &HarnessConfig) -> Result<PathBuf> {
    if let Some(dir) = cli.out.clone().or_else(|| config.output_dir.clone()) {
        return Ok(dir);
    }

    let exe = std::env::current_exe().context("Cannot locate the executable directory")?;
    exe.parent()
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| anyhow!("Cannot write the report next to {}", exe.display()))
}

fn build_evaluator(cli: &Cli, config: &HarnessConfig) -> Result<CommandEvaluator> {
    let program = cli
        .evaluator
        .clone()
        .or_else(|| config.evaluator.program.clone())
        .ok_or_else(|| {
            anyhow!("No evaluator configured (use --evaluator or set EXPRCHECK_EVALUATOR)")
        })?;

    Ok(CommandEvaluator::new(program)
        .with_args(config.evaluator.args.iter().cloned())
        .with_args(cli.evaluator_args.iter().cloned()))
}

fn with_spinner<T>(enabled: bool, work: impl FnOnce() -> T) -> T {
    if !enabled {
        return work();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Downloading and evaluating...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = work();
    spinner.finish_and_clear();
    result
}

fn print_summary(report: &Report) {
    let metrics = report.metrics();

    println!("\n{}", "═".repeat(60).bright_black());
    println!(
        "  {} {}",
        "Total:".bright_black(),
        report.total().to_string().cyan()
    );
    println!(
        "  {} {}",
        "Passed:".bright_black(),
        report.passed().to_string().green()
    );
    println!(
        "  {} {} ({:.0}%)",
        "Failed:".bright_black(),
        if report.failed() > 0 {
            report.failed().to_string().red()
        } else {
            report.failed().to_string().green()
        },
        report.failure_rate()
    );
    println!(
        "  {} {} total, {} per test",
        "Time:".bright_black(),
        Metrics::format_ms(metrics.elapsed_total_ms()).yellow(),
        Metrics::format_ms(metrics.elapsed_average_ms()).yellow()
    );
    if let Some(bytes) = metrics.memory_delta() {
        println!("  {} {} bytes", "Memory:".bright_black(), bytes);
    }
    println!("{}", "═".repeat(60).bright_black());

    if report.all_passed() {
        println!("{}", "All tests PASSED.".green().bold());
    } else {
        println!("{}", "Some tests FAILED.".red().bold());
    }
}
