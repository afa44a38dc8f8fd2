// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exprcheck::evaluation::{parse_lines, BatchRunner, Evaluator, Report, Reporter, TestCase};
use std::collections::HashMap;

/// Answers instantly so only harness overhead is measured
struct Echo;

impl Evaluator for Echo {
    type Error = std::num::ParseFloatError;

    fn evaluate(&self, expression: &str) -> Result<f64, Self::Error> {
        expression.parse()
    }

    fn evaluate_with(
        &self,
        _expression: &str,
        bindings: &HashMap<String, f64>,
    ) -> Result<f64, Self::Error> {
        Ok(bindings.values().sum())
    }
}

fn lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 3 {
            0 => format!("{};;{}", i, i),
            1 => format!("a + b; a={}, b=1; {}", i, i + 1),
            _ => format!("x * 2; x={}; 0", i),
        })
        .collect()
}

fn report(count: usize) -> Report {
    let cases = parse_lines(lines(count)).unwrap();
    BatchRunner::new(&Echo).run(cases)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("single_line", |b| {
        b.iter(|| TestCase::parse(black_box("a + b * c; a=1, b=2, c=3; 7")).unwrap());
    });

    for count in [100, 1000] {
        let source = lines(count);
        group.bench_with_input(BenchmarkId::new("batch", count), &source, |b, source| {
            b.iter(|| parse_lines(black_box(source)).unwrap());
        });
    }

    group.finish();
}

fn bench_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    for count in [100, 1000] {
        let report = report(count);
        group.bench_with_input(BenchmarkId::new("json", count), &report, |b, report| {
            b.iter(|| Reporter::to_json(black_box(report)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("html", count), &report, |b, report| {
            b.iter(|| Reporter::to_html(black_box(report)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_reports);
criterion_main!(benches);
