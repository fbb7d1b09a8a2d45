use std::collections::HashSet;

use polars::prelude::*;

use crate::model::{LoadReport, COUNTRY, ISO3, YEAR};

/// Accepts only codes that are exactly three characters long.
pub fn is_valid_iso3(code: &str) -> bool {
    code.chars().count() == 3
}

/// Coerces a year cell. Integral decimals such as `2019.0` are accepted;
/// anything else, including decimals outside the `i64` range, becomes missing.
pub fn parse_year(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(year) = trimmed.parse::<i64>() {
        return Some(year);
    }
    let parsed = parse_value(trimmed)?;
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    let in_range = parsed >= i64::MIN as f64 && parsed < i64::MAX as f64;
    if parsed.is_finite() && parsed.fract() == 0.0 && in_range {
        Some(parsed as i64)
    } else {
        None
    }
}

/// Coerces a metric cell; empty, `nan` and non-numeric text become missing.
pub fn parse_value(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_nan() => None,
        Ok(parsed) => Some(parsed),
        Err(_) => None,
    }
}

/// Column accumulator for one metric table.
///
/// Rows with an invalid iso3 never enter the buffers, and only the first row
/// seen for a given `(iso3, year)` key is kept.
pub(crate) struct TableBuilder {
    country: Option<Vec<Option<String>>>,
    iso3: Vec<String>,
    year: Vec<Option<i64>>,
    values: Vec<Option<f64>>,
    seen: HashSet<(String, Option<i64>)>,
    report: LoadReport,
}

impl TableBuilder {
    pub fn new(keep_country: bool) -> Self {
        Self {
            country: keep_country.then(Vec::new),
            iso3: Vec::new(),
            year: Vec::new(),
            values: Vec::new(),
            seen: HashSet::new(),
            report: LoadReport::default(),
        }
    }

    pub fn push(
        &mut self,
        country: Option<String>,
        iso3: &str,
        year: Option<i64>,
        value: Option<f64>,
    ) {
        self.report.rows_read += 1;

        if !is_valid_iso3(iso3) {
            self.report.dropped_invalid_iso3 += 1;
            return;
        }
        if !self.seen.insert((iso3.to_string(), year)) {
            self.report.dropped_duplicate_keys += 1;
            return;
        }

        if year.is_none() {
            self.report.missing_years += 1;
        }
        if value.is_none() {
            self.report.missing_values += 1;
        }

        if let Some(countries) = self.country.as_mut() {
            countries.push(country);
        }
        self.iso3.push(iso3.to_string());
        self.year.push(year);
        self.values.push(value);
        self.report.rows_kept += 1;
    }

    pub fn push_raw(&mut self, country: &str, iso3: &str, year: &str, value: &str) {
        let country = Some(country).filter(|c| !c.is_empty()).map(str::to_string);
        self.push(country, iso3, parse_year(year), parse_value(value));
    }

    pub fn finish(self, metric: &str) -> PolarsResult<(DataFrame, LoadReport)> {
        let mut columns: Vec<Column> = Vec::with_capacity(4);
        if let Some(countries) = self.country {
            columns.push(Series::new(COUNTRY.into(), countries).into());
        }
        columns.push(Series::new(ISO3.into(), self.iso3).into());
        columns.push(Series::new(YEAR.into(), self.year).into());
        columns.push(Series::new(metric.into(), self.values).into());

        Ok((DataFrame::new(columns)?, self.report))
    }
}
