use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::LoadError;
use crate::model::MetricTable;
use crate::normalize::TableBuilder;
use crate::resolve::{header_names, ColumnSelector, IdentifierColumns};

/// What to pull out of one source file and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub metric: String,
    pub selector: ColumnSelector,
    pub keep_country: bool,
}

impl LoadOptions {
    pub fn new(metric: impl Into<String>, selector: ColumnSelector) -> Self {
        Self {
            metric: metric.into(),
            selector,
            keep_country: false,
        }
    }

    pub fn keep_country(mut self, keep: bool) -> Self {
        self.keep_country = keep;
        self
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

/// Reads a CSV file and normalizes it into a [`MetricTable`].
///
/// Identifier columns must be present and the metric column must resolve,
/// otherwise nothing is loaded. Bad cells are coerced to missing.
pub fn load_metric_table(path: &Path, options: &LoadOptions) -> Result<MetricTable, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = reader_builder().from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    debug!(path = %path.display(), columns = ?header_names(&headers), "columns found");

    let ids = IdentifierColumns::locate(path, &headers)?;
    let value_idx = options.selector.resolve(path, &options.metric, &headers)?;
    let source_column = headers.get(value_idx).unwrap_or_default().to_string();

    let mut builder = TableBuilder::new(options.keep_country);
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_err)? {
        let cell = |idx: usize| record.get(idx).unwrap_or_default();
        builder.push_raw(cell(ids.country), cell(ids.iso3), cell(ids.year), cell(value_idx));
    }

    let (df, report) = builder
        .finish(&options.metric)
        .map_err(|source| LoadError::Polars {
            path: path.to_path_buf(),
            source,
        })?;

    if report.dropped_duplicate_keys > 0 {
        warn!(
            path = %path.display(),
            duplicates = report.dropped_duplicate_keys,
            "dropped rows repeating an (iso3, year) key"
        );
    }
    info!(
        path = %path.display(),
        metric = %options.metric,
        column = %source_column,
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        rows_dropped = report.rows_dropped(),
        dropped_invalid_iso3 = report.dropped_invalid_iso3,
        "loaded metric table"
    );

    Ok(MetricTable::new(
        options.metric.clone(),
        path,
        source_column,
        df,
        report,
    ))
}
