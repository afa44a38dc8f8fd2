// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Test source acquisition from a local file or a remote URL

use reqwest::Url;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Where the test lines come from
#[derive(Debug, Clone, PartialEq)]
pub enum LineSource {
    Local(PathBuf),
    Remote(String),
}

impl LineSource {
    /// Anything starting with `http` is fetched remotely, the rest is a path
    pub fn detect(location: &str) -> Self {
        if location.starts_with("http") {
            LineSource::Remote(location.to_string())
        } else {
            LineSource::Local(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, LineSource::Remote(_))
    }
}

impl fmt::Display for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSource::Local(path) => write!(f, "{}", path.display()),
            LineSource::Remote(url) => f.write_str(url),
        }
    }
}

/// Errors while acquiring the test lines
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("test file not found: {0}")]
    NotFound(PathBuf),

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not fetch {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Read every line of the source, in order
pub fn load_lines(source: &LineSource) -> Result<Vec<String>, SourceError> {
    let content = match source {
        LineSource::Local(path) => read_local(path)?,
        LineSource::Remote(url) => fetch_remote(url)?,
    };

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    info!(source = %source, lines = lines.len(), "test source loaded");
    Ok(lines)
}

fn read_local(path: &Path) -> Result<String, SourceError> {
    debug!(path = %path.display(), "reading local test file");
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn fetch_remote(url: &str) -> Result<String, SourceError> {
    let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    debug!(url = %parsed, "fetching remote test file");
    let unreachable = |source: reqwest::Error| SourceError::Unreachable {
        url: url.to_string(),
        source,
    };

    reqwest::blocking::get(parsed)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(unreachable)
}
