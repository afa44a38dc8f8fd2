// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Harness configuration

use super::reporter::ReportFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "exprcheck.toml";

/// External evaluator program settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Program to run for each expression
    pub program: Option<String>,
    /// Arguments placed before the expression
    pub args: Vec<String>,
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Report format
    pub format: ReportFormat,
    /// Directory the report is written to; defaults to the executable's directory
    pub output_dir: Option<PathBuf>,
    /// Whether to sample process memory around the batch
    pub sample_memory: bool,
    /// Evaluator under test
    pub evaluator: EvaluatorConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Json,
            output_dir: None,
            sample_memory: true,
            evaluator: EvaluatorConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: HarnessConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `exprcheck.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `EXPRCHECK_*` overrides from the given variable lookup
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = var("EXPRCHECK_EVALUATOR") {
            self.evaluator.program = Some(program);
        }

        if let Some(dir) = var("EXPRCHECK_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }

        if let Some(format) = var("EXPRCHECK_FORMAT") {
            self.format = format
                .parse()
                .context("Invalid EXPRCHECK_FORMAT")?;
        }

        if let Some(sample) = var("EXPRCHECK_SAMPLE_MEMORY") {
            self.sample_memory = sample
                .parse::<bool>()
                .context("Invalid EXPRCHECK_SAMPLE_MEMORY")?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.format, ReportFormat::Json);
        assert!(config.sample_memory);
        assert!(config.evaluator.program.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config: HarnessConfig = toml::from_str(
            r#"
            format = "html"
            output_dir = "out"

            [evaluator]
            program = "calc"
            args = ["--eval"]
            "#,
        )
        .unwrap();

        assert_eq!(config.format, ReportFormat::Html);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.evaluator.program.as_deref(), Some("calc"));
        assert_eq!(config.evaluator.args, ["--eval"]);
        assert!(config.sample_memory);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("EXPRCHECK_EVALUATOR", "other-calc"),
            ("EXPRCHECK_FORMAT", "HTML"),
            ("EXPRCHECK_SAMPLE_MEMORY", "false"),
        ]);
        let mut config = HarnessConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.evaluator.program.as_deref(), Some("other-calc"));
        assert_eq!(config.format, ReportFormat::Html);
        assert!(!config.sample_memory);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_bad_format_override() {
        let mut config = HarnessConfig::default();
        assert!(config
            .apply_env(|key| (key == "EXPRCHECK_FORMAT").then(|| "pdf".to_string()))
            .is_err());
    }

    #[test]
    fn test_bad_sample_memory_override() {
        let mut config = HarnessConfig::default();
        let err = config
            .apply_env(|key| (key == "EXPRCHECK_SAMPLE_MEMORY").then(|| "sometimes".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("EXPRCHECK_SAMPLE_MEMORY"));
        assert!(config.sample_memory);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);

        let mut config = HarnessConfig::default();
        config.evaluator.program = Some("calc".to_string());
        config.save(&path).unwrap();

        assert_eq!(HarnessConfig::from_file(&path).unwrap(), config);
    }
}
