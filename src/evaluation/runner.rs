// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch runner: evaluate every case, then judge
//!
//! The two phases produce distinct types. [`EvaluatedBatch`] only comes out
//! of [`BatchRunner::evaluate`], after the clock and memory samples have
//! been taken, and [`EvaluatedBatch::judge`] is the only way to obtain a
//! [`Report`]. Comparisons therefore never run inside the timed window.

use super::case::TestCase;
use super::evaluator::{evaluate_case, with_quiet_panics, EvaluationError, Evaluator};
use super::metrics::{memory_delta, MemoryProbe, Metrics, NoMemoryProbe, Timer};
use tracing::{debug, info};

/// What the evaluator produced for one case
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Obtained(f64),
    Failed(EvaluationError),
}

/// A case after the evaluate phase
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCase {
    case: TestCase,
    outcome: Outcome,
}

impl EvaluatedCase {
    pub fn case(&self) -> &TestCase {
        &self.case
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    fn judge(self) -> JudgedCase {
        let (obtained, success, error) = match self.outcome {
            // Exact comparison: any difference at all is a failure
            Outcome::Obtained(value) => (Some(value), value == self.case.expected(), None),
            Outcome::Failed(err) => (None, false, Some(err.message)),
        };

        JudgedCase {
            case: self.case,
            obtained,
            success,
            error,
        }
    }
}

/// A case after the judge phase
#[derive(Debug, Clone, PartialEq)]
pub struct JudgedCase {
    case: TestCase,
    obtained: Option<f64>,
    success: bool,
    error: Option<String>,
}

impl JudgedCase {
    pub fn case(&self) -> &TestCase {
        &self.case
    }

    pub fn obtained(&self) -> Option<f64> {
        self.obtained
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Evaluator message for cases that could not be evaluated
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// All cases evaluated and measured, none judged yet
#[derive(Debug, Clone)]
pub struct EvaluatedBatch {
    cases: Vec<EvaluatedCase>,
    metrics: Metrics,
}

impl EvaluatedBatch {
    pub fn cases(&self) -> &[EvaluatedCase] {
        &self.cases
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Judge phase: compare every obtained value with its expected value
    pub fn judge(self) -> Report {
        let cases: Vec<JudgedCase> = self.cases.into_iter().map(EvaluatedCase::judge).collect();

        for judged in cases.iter().filter(|c| !c.success) {
            debug!(
                expression = judged.case.expression(),
                expected = judged.case.expected(),
                obtained = ?judged.obtained,
                error = judged.error.as_deref().unwrap_or(""),
                "test case failed"
            );
        }

        Report {
            cases,
            metrics: self.metrics,
        }
    }
}

/// A finished batch, ready to be serialized
#[derive(Debug, Clone)]
pub struct Report {
    cases: Vec<JudgedCase>,
    metrics: Metrics,
}

impl Report {
    /// Cases in input order
    pub fn cases(&self) -> &[JudgedCase] {
        &self.cases
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn failed(&self) -> usize {
        self.cases.iter().filter(|c| !c.success).count()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }

    /// Failed cases as a percentage of all cases
    pub fn failure_rate(&self) -> f64 {
        if self.cases.is_empty() {
            0.0
        } else {
            (self.failed() as f64 / self.total() as f64) * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.success)
    }
}

/// Sequential batch runner over one evaluator
pub struct BatchRunner<'a, E: Evaluator + ?Sized> {
    evaluator: &'a E,
    probe: Box<dyn MemoryProbe>,
}

impl<'a, E: Evaluator + ?Sized> BatchRunner<'a, E> {
    /// Runner without memory sampling
    pub fn new(evaluator: &'a E) -> Self {
        Self {
            evaluator,
            probe: Box::new(NoMemoryProbe),
        }
    }

    pub fn with_probe(mut self, probe: Box<dyn MemoryProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Evaluate phase. A failing case is recorded and the batch goes on.
    pub fn evaluate(&mut self, cases: Vec<TestCase>) -> EvaluatedBatch {
        let count = cases.len();
        info!(cases = count, "evaluating batch");

        let memory_before = self.probe.sample();
        let timer = Timer::start();

        let evaluator = self.evaluator;
        let evaluated: Vec<EvaluatedCase> = with_quiet_panics(|| {
            cases
                .into_iter()
                .map(|case| {
                    let outcome = match evaluate_case(evaluator, &case) {
                        Ok(value) => Outcome::Obtained(value),
                        Err(err) => Outcome::Failed(err),
                    };
                    EvaluatedCase { case, outcome }
                })
                .collect()
        });

        let elapsed = timer.elapsed();
        let memory_after = self.probe.sample();

        let metrics = Metrics::new(elapsed, count, memory_delta(memory_before, memory_after));
        info!(
            elapsed_ms = metrics.elapsed_total_ms(),
            memory_delta = ?metrics.memory_delta(),
            "batch evaluated"
        );

        EvaluatedBatch {
            cases: evaluated,
            metrics,
        }
    }

    /// Evaluate, then judge
    pub fn run(&mut self, cases: Vec<TestCase>) -> Report {
        self.evaluate(cases).judge()
    }
}
