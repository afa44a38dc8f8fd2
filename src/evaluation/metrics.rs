// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch timing and memory metrics

use std::time::{Duration, Instant};

/// Timing and memory figures for one evaluated batch
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    elapsed_total: Duration,
    elapsed_average_ms: f64,
    memory_delta: Option<i64>,
}

impl Metrics {
    /// Build metrics for a batch of `count` cases
    pub fn new(elapsed_total: Duration, count: usize, memory_delta: Option<i64>) -> Self {
        let total_ms = elapsed_total.as_secs_f64() * 1000.0;
        let elapsed_average_ms = if count > 0 {
            total_ms / count as f64
        } else {
            0.0
        };

        Self {
            elapsed_total,
            elapsed_average_ms,
            memory_delta,
        }
    }

    pub fn elapsed_total(&self) -> Duration {
        self.elapsed_total
    }

    /// Total evaluation time in milliseconds
    pub fn elapsed_total_ms(&self) -> f64 {
        self.elapsed_total.as_secs_f64() * 1000.0
    }

    /// Average evaluation time per case in milliseconds
    pub fn elapsed_average_ms(&self) -> f64 {
        self.elapsed_average_ms
    }

    /// Memory growth across the batch in bytes, when it could be sampled.
    /// Coarse: small batches often report 0 or even a negative value.
    pub fn memory_delta(&self) -> Option<i64> {
        self.memory_delta
    }

    /// Format a millisecond figure for console output
    pub fn format_ms(ms: f64) -> String {
        if ms < 1000.0 {
            format!("{:.3}ms", ms)
        } else {
            format!("{:.2}s", ms / 1000.0)
        }
    }
}

/// Timer for measuring the evaluation window
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Best-effort sampler of the process memory footprint, in bytes
pub trait MemoryProbe {
    fn sample(&mut self) -> Option<u64>;
}

/// Disabled sampling
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn sample(&mut self) -> Option<u64> {
        None
    }
}

/// Resident set size read from `/proc/self/status`.
///
/// There is no collector to run before sampling, so the figure includes
/// whatever the allocator has not returned to the OS yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResidentMemoryProbe;

impl MemoryProbe for ResidentMemoryProbe {
    fn sample(&mut self) -> Option<u64> {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        parse_vm_rss(&status)
    }
}

fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line
        .trim_start_matches("VmRSS:")
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(kb * 1024)
}

/// Difference between two samples; unknown if either is missing
pub fn memory_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    Some(after? as i64 - before? as i64)
}
