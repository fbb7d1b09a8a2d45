use std::path::PathBuf;

use tracing::info;
use worldmerge_parser::{load_metric_table, MetricTable};

use crate::config::MergeConfig;
use crate::error::Result;
use crate::merge::merge;
use crate::output::write_csv;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Resolves, loads, merges and writes according to `config`.
///
/// Every input path is resolved before anything is read, and the output is
/// only written once the merge has succeeded.
pub fn run(config: &MergeConfig) -> Result<RunSummary> {
    config.validate()?;

    let sources = config
        .datasets
        .iter()
        .map(|dataset| dataset.resolve_path(&config.data_dir))
        .collect::<Result<Vec<_>>>()?;

    let tables = config
        .datasets
        .iter()
        .zip(&sources)
        .map(|(dataset, path)| load_metric_table(path, &dataset.load_options()))
        .collect::<std::result::Result<Vec<MetricTable>, _>>()?;

    let merged = merge(config.policy, &tables)?;
    write_csv(&merged, &config.output)?;

    let summary = RunSummary {
        output: config.output.clone(),
        rows: merged.height(),
        columns: merged
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
    };
    info!(
        output = %summary.output.display(),
        rows = summary.rows,
        columns = ?summary.columns,
        "merge complete"
    );
    Ok(summary)
}
