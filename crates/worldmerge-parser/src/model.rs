use std::path::{Path, PathBuf};

use polars::prelude::*;

pub const COUNTRY: &str = "country";
pub const ISO3: &str = "iso3";
pub const YEAR: &str = "year";

/// Data-quality counters gathered while normalizing one source file.
///
/// None of these abort a run; they exist so the caller can log what was
/// coerced or thrown away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_invalid_iso3: usize,
    pub dropped_duplicate_keys: usize,
    pub missing_years: usize,
    pub missing_values: usize,
}

impl LoadReport {
    /// Rows read but not kept: bad codes plus repeated keys.
    pub fn rows_dropped(&self) -> usize {
        self.dropped_invalid_iso3 + self.dropped_duplicate_keys
    }
}

/// One normalized source: `[country] iso3 year <metric>`.
#[derive(Debug, Clone)]
pub struct MetricTable {
    metric: String,
    source: PathBuf,
    source_column: String,
    df: DataFrame,
    report: LoadReport,
}

impl MetricTable {
    pub(crate) fn new(
        metric: impl Into<String>,
        source: impl Into<PathBuf>,
        source_column: impl Into<String>,
        df: DataFrame,
        report: LoadReport,
    ) -> Self {
        Self {
            metric: metric.into(),
            source: source.into(),
            source_column: source_column.into(),
            df,
            report,
        }
    }

    /// Canonical name of the value column.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Header the metric was read from before renaming.
    pub fn source_column(&self) -> &str {
        &self.source_column
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn has_country(&self) -> bool {
        self.df.column(COUNTRY).is_ok()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Builds a table directly from already-normalized observations.
    ///
    /// Applies the same iso3 gate and duplicate-key rule as file loading.
    pub fn from_observations<I>(metric: &str, observations: I) -> PolarsResult<Self>
    where
        I: IntoIterator<Item = (Option<String>, String, Option<i64>, Option<f64>)>,
    {
        let mut builder = crate::normalize::TableBuilder::new(true);
        for (country, iso3, year, value) in observations {
            builder.push(country, &iso3, year, value);
        }
        let (df, report) = builder.finish(metric)?;
        Ok(Self::new(metric, PathBuf::new(), metric, df, report))
    }

    /// Drops the country column, if any.
    pub fn without_country(mut self) -> Self {
        if let Ok(df) = self.df.drop(COUNTRY) {
            self.df = df;
        }
        self
    }
}
