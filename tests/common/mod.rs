// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Stand-in arithmetic evaluator for integration tests

use exprcheck::Evaluator;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ArithmeticError {
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
}

/// `+ - * /`, parentheses, numbers and variables
pub struct Arithmetic;

impl Evaluator for Arithmetic {
    type Error = ArithmeticError;

    fn evaluate(&self, expression: &str) -> Result<f64, ArithmeticError> {
        self.evaluate_with(expression, &HashMap::new())
    }

    fn evaluate_with(
        &self,
        expression: &str,
        bindings: &HashMap<String, f64>,
    ) -> Result<f64, ArithmeticError> {
        let mut parser = Parser {
            chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
            pos: 0,
            bindings,
        };
        let value = parser.sum()?;
        if parser.pos != parser.chars.len() {
            return Err(ArithmeticError::InvalidExpression(expression.to_string()));
        }
        Ok(value)
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    bindings: &'a HashMap<String, f64>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn sum(&mut self) -> Result<f64, ArithmeticError> {
        let mut value = self.product()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.product()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn product(&mut self) -> Result<f64, ArithmeticError> {
        let mut value = self.atom()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.atom()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn atom(&mut self) -> Result<f64, ArithmeticError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.sum()?;
                if self.peek() != Some(')') {
                    return Err(self.invalid());
                }
                self.pos += 1;
                Ok(value)
            }
            Some('-') => {
                self.pos += 1;
                Ok(-self.atom()?)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
                text.parse().map_err(|_| self.invalid())
            }
            Some(c) if c.is_alphabetic() => {
                let name = self.take_while(char::is_alphanumeric);
                self.bindings
                    .get(&name)
                    .copied()
                    .ok_or(ArithmeticError::UndefinedVariable(name))
            }
            _ => Err(self.invalid()),
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn invalid(&self) -> ArithmeticError {
        ArithmeticError::InvalidExpression(self.chars.iter().collect())
    }
}
