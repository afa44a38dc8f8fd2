// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluator capability and the adapter that drives it
//!
//! The harness never computes expressions itself. Anything implementing
//! [`Evaluator`] can be put under test: an in-process library wrapper, or
//! an external program through [`CommandEvaluator`].

use super::case::TestCase;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// An expression evaluator under test
pub trait Evaluator {
    type Error: std::error::Error;

    /// Evaluate an expression with no variables
    fn evaluate(&self, expression: &str) -> Result<f64, Self::Error>;

    /// Evaluate an expression under a set of variable bindings
    fn evaluate_with(
        &self,
        expression: &str,
        bindings: &HashMap<String, f64>,
    ) -> Result<f64, Self::Error>;
}

/// Uniform failure of one evaluation, whatever the evaluator reported
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to evaluate `{expression}`: {message}")]
pub struct EvaluationError {
    pub expression: String,
    pub message: String,
}

/// Evaluate one test case, exactly once.
///
/// Cases without bindings use [`Evaluator::evaluate`]; the others get a
/// name to value map. Errors and panics from the evaluator both come back
/// as [`EvaluationError`].
pub fn evaluate_case<E>(evaluator: &E, case: &TestCase) -> Result<f64, EvaluationError>
where
    E: Evaluator + ?Sized,
{
    let expression = case.expression();

    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        if case.has_bindings() {
            evaluator.evaluate_with(expression, &case.binding_map())
        } else {
            evaluator.evaluate(expression)
        }
    }));

    let message = match attempt {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    Err(EvaluationError {
        expression: expression.to_string(),
        message,
    })
}

/// Run `work` with panic messages from the current thread silenced.
///
/// A panicking evaluator is already recorded as a failed case; the default
/// hook would also print to stderr while the batch is being timed. Panics
/// on other threads still reach the previous hook, which is reinstated
/// afterwards.
pub fn with_quiet_panics<T>(work: impl FnOnce() -> T) -> T {
    let owner = thread::current().id();
    let previous = Arc::new(panic::take_hook());
    let forward = Arc::clone(&previous);
    panic::set_hook(Box::new(move |info| {
        if thread::current().id() != owner {
            (**forward)(info)
        }
    }));

    let result = panic::catch_unwind(AssertUnwindSafe(work));

    drop(panic::take_hook());
    match Arc::try_unwrap(previous) {
        Ok(hook) => panic::set_hook(hook),
        // another runner swapped hooks meanwhile; keep forwarding to ours
        Err(shared) => panic::set_hook(Box::new(move |info| (**shared)(info))),
    }

    match result {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("evaluator panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("evaluator panicked: {}", msg)
    } else {
        "evaluator panicked".to_string()
    }
}

/// Errors from an external evaluator process
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Rejected {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{program} printed a non-numeric result `{output}`")]
    NotANumber { program: String, output: String },
}

/// Evaluator backed by an external program.
///
/// The program is called as `program [args..] <expression> [name=value..]`
/// and must print the numeric result on stdout and exit with status 0.
/// Bindings are passed sorted by name.
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEvaluator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Fixed arguments placed before the expression
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn run(&self, expression: &str, bindings: &[(&String, &f64)]) -> Result<f64, CommandError> {
        let program = self.program.display().to_string();

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(expression)
            .args(bindings.iter().map(|(name, value)| format!("{}={}", name, value)))
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Rejected {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        text.parse::<f64>().map_err(|_| CommandError::NotANumber {
            program,
            output: text.to_string(),
        })
    }
}

impl Evaluator for CommandEvaluator {
    type Error = CommandError;

    fn evaluate(&self, expression: &str) -> Result<f64, Self::Error> {
        self.run(expression, &[])
    }

    fn evaluate_with(
        &self,
        expression: &str,
        bindings: &HashMap<String, f64>,
    ) -> Result<f64, Self::Error> {
        let mut sorted: Vec<_> = bindings.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        self.run(expression, &sorted)
    }
}
