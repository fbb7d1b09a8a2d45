use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use worldmerge_parser::{find_file, ColumnSelector, LoadOptions, COUNTRY, ISO3, YEAR};

use crate::merge::MergePolicy;

pub const DEFAULT_DATA_DIR: &str = "public/data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a merge run needs: where inputs live, what to pull from them,
/// how to combine them and where to write the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub policy: MergePolicy,
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Output column name for the value.
    pub metric: String,
    /// Explicit file, relative to `data_dir` unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Case-insensitive file-name fragment searched for in `data_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Accepted source headers in priority order. Omitted means the first
    /// non-identifier column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub keep_country: bool,
}

impl DatasetConfig {
    pub fn from_file(metric: &str, file: &str) -> Self {
        Self {
            metric: metric.to_string(),
            file: Some(PathBuf::from(file)),
            keyword: None,
            aliases: None,
            keep_country: false,
        }
    }

    pub fn from_keyword(metric: &str, keyword: &str, aliases: &[&str]) -> Self {
        Self {
            metric: metric.to_string(),
            file: None,
            keyword: Some(keyword.to_string()),
            aliases: Some(aliases.iter().map(|alias| alias.to_string()).collect()),
            keep_country: false,
        }
    }

    pub fn with_country(mut self) -> Self {
        self.keep_country = true;
        self
    }

    pub fn selector(&self) -> ColumnSelector {
        match &self.aliases {
            Some(aliases) => ColumnSelector::Aliases(aliases.clone()),
            None => ColumnSelector::Positional,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::new(self.metric.clone(), self.selector()).keep_country(self.keep_country)
    }

    /// Resolves the input path, searching `data_dir` when a keyword is configured.
    /// A dataset with neither `file` nor `keyword` is a config error.
    pub fn resolve_path(&self, data_dir: &Path) -> crate::Result<PathBuf> {
        match (&self.file, &self.keyword) {
            (Some(file), _) => Ok(data_dir.join(file)),
            (None, Some(keyword)) => Ok(find_file(data_dir, keyword)?),
            (None, None) => Err(ConfigError::Invalid(format!(
                "dataset '{}' has neither `file` nor `keyword`",
                self.metric
            ))
            .into()),
        }
    }
}

impl MergeConfig {
    /// Life expectancy and GDP per capita at each country's latest common year.
    pub fn latest_snapshot() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            output: data_dir.join("merged_latest.csv"),
            data_dir,
            policy: MergePolicy::LatestCommonYear,
            datasets: vec![
                DatasetConfig::from_file("life_expectancy", "life-expectancy.csv").with_country(),
                DatasetConfig::from_file("gdp_per_capita", "gdp-per-capita-worldbank.csv"),
            ],
        }
    }

    /// GDP, life expectancy, internet use and population for every country-year.
    pub fn world_metrics() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            output: data_dir.join("world_metrics.csv"),
            data_dir,
            policy: MergePolicy::FullOuter,
            datasets: vec![
                DatasetConfig::from_keyword(
                    "gdp_per_capita",
                    "gdp-per-capita",
                    &["GDP per capita"],
                )
                .with_country(),
                DatasetConfig::from_keyword(
                    "life_expectancy",
                    "life-expectancy",
                    &["Life expectancy"],
                ),
                DatasetConfig::from_keyword(
                    "internet_users_pct",
                    "internet",
                    &[
                        "Share of the population using the Internet",
                        "Individuals using the Internet (% of population)",
                        "Internet users (% of population)",
                    ],
                ),
                DatasetConfig::from_keyword("population", "population", &["Population, total"]),
            ],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MergeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.datasets.is_empty() {
            return Err(ConfigError::Invalid("at least one dataset is required".into()));
        }

        let mut metrics = HashSet::new();
        for dataset in &self.datasets {
            let metric = dataset.metric.as_str();
            if metric.is_empty() {
                return Err(ConfigError::Invalid("dataset metric name is empty".into()));
            }
            if [COUNTRY, ISO3, YEAR].contains(&metric) {
                return Err(ConfigError::Invalid(format!(
                    "metric name '{metric}' clashes with an identifier column"
                )));
            }
            if !metrics.insert(metric) {
                return Err(ConfigError::Invalid(format!(
                    "metric '{metric}' is configured more than once"
                )));
            }
            if dataset.file.is_some() == dataset.keyword.is_some() {
                return Err(ConfigError::Invalid(format!(
                    "dataset '{metric}' needs exactly one of `file` or `keyword`"
                )));
            }
            if matches!(&dataset.aliases, Some(aliases) if aliases.is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "dataset '{metric}' has an empty alias list"
                )));
            }
        }
        Ok(())
    }
}
