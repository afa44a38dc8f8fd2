// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Test case model and line parser
//!
//! A test line has the shape `expression;variables;expected`, for example
//! `x + 2; x=3; 5`. Whitespace anywhere in the line is ignored.

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while parsing a single test line
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("malformed test case: expected 3 `;`-separated fields, found {fields}")]
    MalformedTestCase { fields: usize },

    #[error("malformed binding `{0}`: expected `name=value`")]
    MalformedBinding(String),

    #[error("invalid number `{value}` in {field}")]
    NumberFormat { field: &'static str, value: String },
}

/// A parse error located at a 1-based line of the source
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    #[source]
    pub error: ParseError,
}

/// A variable binding supplied to one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: f64,
}

/// A parsed test case, not yet evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    expression: String,
    variables: String,
    bindings: Vec<Binding>,
    expected: f64,
}

impl TestCase {
    /// Parse one test line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

        let fields: Vec<&str> = compact.split(';').collect();
        if fields.len() != 3 {
            return Err(ParseError::MalformedTestCase {
                fields: fields.len(),
            });
        }

        let bindings = parse_bindings(fields[1])?;
        let expected = parse_number(fields[2], "expected value")?;

        Ok(Self {
            expression: fields[0].to_string(),
            variables: fields[1].to_string(),
            bindings,
            expected,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The variables field as written (whitespace removed)
    pub fn variables(&self) -> &str {
        &self.variables
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }

    pub fn expected(&self) -> f64 {
        self.expected
    }

    /// Name to value lookup; a repeated name keeps its last value
    pub fn binding_map(&self) -> HashMap<String, f64> {
        self.bindings
            .iter()
            .map(|b| (b.name.clone(), b.value))
            .collect()
    }
}

/// Parse every line of a test source, in order.
///
/// Blank lines are skipped. The first malformed line aborts the whole batch.
pub fn parse_lines<I, S>(lines: I) -> Result<Vec<TestCase>, LineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cases = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let case = TestCase::parse(line).map_err(|error| LineError {
            line: index + 1,
            error,
        })?;
        cases.push(case);
    }

    Ok(cases)
}

fn parse_bindings(field: &str) -> Result<Vec<Binding>, ParseError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }

    field
        .split(',')
        .map(|group| {
            let (name, value) = group
                .split_once('=')
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| ParseError::MalformedBinding(group.to_string()))?;

            Ok(Binding {
                name: name.to_string(),
                value: parse_number(value, "variable value")?,
            })
        })
        .collect()
}

fn parse_number(text: &str, field: &'static str) -> Result<f64, ParseError> {
    text.parse::<f64>().map_err(|_| ParseError::NumberFormat {
        field,
        value: text.to_string(),
    })
}
