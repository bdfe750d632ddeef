//! Reading entity sets and event scripts from disk.
//!
//! Entity files are either one JSON array of records or JSON lines, one
//! record per line. Scripts are always JSON lines. Blank lines are skipped.

use std::path::Path;

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn read_to_string(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.display().to_string(), source })
}

/// Parse a JSON array or JSON lines, whichever the text holds.
pub fn parse_array_or_lines<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, LoadError> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    parse_lines(text)
}

/// Parse one JSON value per non-blank line.
pub fn parse_lines<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, LoadError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| serde_json::from_str(line).map_err(|source| LoadError::Line { line: idx + 1, source }))
        .collect()
}

#[cfg(test)]
#[path = "load_test.rs"]
mod tests;
