// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation harness: test cases in, pass/fail report out

pub mod case;
pub mod config;
pub mod dataset;
pub mod evaluator;
pub mod metrics;
pub mod reporter;
pub mod runner;

pub use case::{parse_lines, Binding, LineError, ParseError, TestCase};
pub use config::{EvaluatorConfig, HarnessConfig};
pub use dataset::{load_lines, LineSource, SourceError};
pub use evaluator::{
    evaluate_case, with_quiet_panics, CommandError, CommandEvaluator, EvaluationError, Evaluator,
};
pub use metrics::{MemoryProbe, Metrics, NoMemoryProbe, ResidentMemoryProbe};
pub use reporter::{ReportError, ReportFormat, Reporter};
pub use runner::{BatchRunner, EvaluatedBatch, EvaluatedCase, JudgedCase, Outcome, Report};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// A completed run: the judged batch and where its report went
#[derive(Debug)]
pub struct SuiteOutcome {
    pub report: Report,
    pub report_path: PathBuf,
}

/// Main evaluation entry point.
///
/// Loads and parses every line before evaluating anything, so a bad source
/// or a malformed line aborts the run without a report.
pub fn run_suite<E>(
    source: &LineSource,
    evaluator: &E,
    probe: Box<dyn MemoryProbe>,
    format: ReportFormat,
    output_dir: &Path,
) -> Result<SuiteOutcome>
where
    E: Evaluator + ?Sized,
{
    let lines = load_lines(source).context("Failed to acquire test cases")?;
    let cases = parse_lines(&lines).context("Failed to parse test cases")?;

    let report = BatchRunner::new(evaluator).with_probe(probe).run(cases);
    info!(
        total = report.total(),
        failed = report.failed(),
        "batch judged"
    );

    let report_path = Reporter::write(&report, format, output_dir)
        .context("Failed to write report")?;
    info!(path = %report_path.display(), format = %format, "report written");

    Ok(SuiteOutcome {
        report,
        report_path,
    })
}
