use std::collections::HashSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use worldmerge_parser::{MetricTable, COUNTRY, ISO3, YEAR};

/// How several metric tables are combined into one frame keyed by `(iso3, year)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// One row per country at the latest year every table has data for.
    LatestCommonYear,
    /// Every `(iso3, year)` seen in any table, metrics null where absent.
    #[default]
    FullOuter,
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no tables to merge")]
    NoTables,
    #[error("metric '{0}' is provided by more than one table")]
    DuplicateMetric(String),
    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub fn merge(policy: MergePolicy, tables: &[MetricTable]) -> Result<DataFrame, MergeError> {
    let merged = match policy {
        MergePolicy::LatestCommonYear => merge_latest_common_year(tables)?,
        MergePolicy::FullOuter => merge_full_outer(tables)?,
    };
    info!(
        policy = ?policy,
        tables = tables.len(),
        rows = merged.height(),
        "merged metric tables"
    );
    Ok(merged)
}

/// Restricts every table to the `(iso3, year)` pairs they all share, keeps the
/// maximum such year per country and joins the metrics at that year.
///
/// Earlier years are discarded even when they have fuller coverage. Rows with
/// a missing year never take part. Sorted by iso3.
pub fn merge_latest_common_year(tables: &[MetricTable]) -> Result<DataFrame, MergeError> {
    let country_source = check_tables(tables)?;

    let common = tables
        .iter()
        .map(|table| {
            table
                .df()
                .clone()
                .lazy()
                .select(key_exprs())
                .filter(col(YEAR).is_not_null())
        })
        .reduce(|acc, keys| {
            acc.join(
                keys,
                key_exprs(),
                key_exprs(),
                JoinArgs::new(JoinType::Inner),
            )
        })
        .ok_or(MergeError::NoTables)?;

    let latest = common.group_by([col(ISO3)]).agg([col(YEAR).max()]);

    let joined = tables
        .iter()
        .enumerate()
        .fold(latest, |acc, (idx, table)| {
            acc.join(
                join_frame(table, country_source == Some(idx)),
                key_exprs(),
                key_exprs(),
                JoinArgs::new(JoinType::Inner),
            )
        });

    let df = joined
        .select(output_columns(tables, country_source))
        .sort([ISO3], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;
    Ok(df)
}

/// Outer-joins all tables on `(iso3, year)` as a fold, one new frame per step.
/// A missing year is a key of its own, so `(iso3, null)` rows from different
/// tables land on one row. Sorted by iso3 then year, missing years last.
pub fn merge_full_outer(tables: &[MetricTable]) -> Result<DataFrame, MergeError> {
    let country_source = check_tables(tables)?;

    let mut frames = tables
        .iter()
        .enumerate()
        .map(|(idx, table)| join_frame(table, country_source == Some(idx)));
    let first = frames.next().ok_or(MergeError::NoTables)?;

    let joined = frames.fold(first, |acc, frame| {
        acc.join(
            frame,
            key_exprs(),
            key_exprs(),
            full_join_args(),
        )
    });

    let df = joined
        .select(output_columns(tables, country_source))
        .sort(
            [ISO3, YEAR],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(df)
}

fn full_join_args() -> JoinArgs {
    let mut args = JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns);
    args.nulls_equal = true;
    args
}

fn key_exprs() -> [Expr; 2] {
    [col(ISO3), col(YEAR)]
}

/// Validates the table set and returns the index of the table that supplies
/// country names (the first one that kept them).
fn check_tables(tables: &[MetricTable]) -> Result<Option<usize>, MergeError> {
    if tables.is_empty() {
        return Err(MergeError::NoTables);
    }

    let mut seen = HashSet::new();
    for table in tables {
        if !seen.insert(table.metric()) {
            return Err(MergeError::DuplicateMetric(table.metric().to_string()));
        }
    }

    Ok(tables.iter().position(MetricTable::has_country))
}

fn join_frame(table: &MetricTable, with_country: bool) -> LazyFrame {
    let mut exprs = Vec::with_capacity(4);
    if with_country {
        exprs.push(col(COUNTRY));
    }
    exprs.extend(key_exprs());
    exprs.push(col(table.metric()));
    table.df().clone().lazy().select(exprs)
}

fn output_columns(tables: &[MetricTable], country_source: Option<usize>) -> Vec<Expr> {
    let mut exprs = Vec::with_capacity(tables.len() + 3);
    if country_source.is_some() {
        exprs.push(col(COUNTRY));
    }
    exprs.extend(key_exprs());
    exprs.extend(tables.iter().map(|table| col(table.metric())));
    exprs
}
