// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! exprcheck
//!
//! Conformance harness for mathematical-expression evaluators. Runs a
//! batch of `expression;variables;expected` test lines against any
//! [`Evaluator`] and reports the results as JSON or HTML, with timing and
//! memory figures for the whole batch.

pub mod evaluation;

pub use evaluation::{
    parse_lines, run_suite, BatchRunner, CommandEvaluator, EvaluationError, Evaluator,
    HarnessConfig, LineSource, Report, ReportFormat, Reporter, TestCase,
};

use evaluation::LineError;

/// Parse and run a batch of test lines without memory sampling
pub fn check<E, I, S>(evaluator: &E, lines: I) -> Result<Report, LineError>
where
    E: Evaluator + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cases = parse_lines(lines)?;
    Ok(BatchRunner::new(evaluator).run(cases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, thiserror::Error)]
    #[error("unsupported")]
    struct Unsupported;

    struct Constant(f64);

    impl Evaluator for Constant {
        type Error = Unsupported;

        fn evaluate(&self, _expression: &str) -> Result<f64, Unsupported> {
            Ok(self.0)
        }

        fn evaluate_with(
            &self,
            _expression: &str,
            _bindings: &HashMap<String, f64>,
        ) -> Result<f64, Unsupported> {
            Err(Unsupported)
        }
    }

    #[test]
    fn test_check() {
        let report = check(&Constant(1.0), ["1;;1", "x;x=1;1"]).unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(report.failed(), 1);
    }
}
