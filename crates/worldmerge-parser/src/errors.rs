use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not find a CSV in {} with keyword '{keyword}'", .dir.display())]
    MissingFile { dir: PathBuf, keyword: String },

    #[error("{} must include column '{column}'; columns are: {available:?}", .path.display())]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
        available: Vec<String>,
    },

    #[error(
        "{} has no column for metric '{metric}' (accepted: {candidates:?}); columns are: {available:?}",
        .path.display()
    )]
    UnresolvedMetric {
        path: PathBuf,
        metric: String,
        candidates: Vec<String>,
        available: Vec<String>,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid search pattern for {}: {source}", .dir.display())]
    Pattern {
        dir: PathBuf,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to build table for {}: {source}", .path.display())]
    Polars {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },
}

impl LoadError {
    /// True for errors caused by the shape of the input header rather than I/O.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            LoadError::MissingColumn { .. } | LoadError::UnresolvedMetric { .. }
        )
    }
}
