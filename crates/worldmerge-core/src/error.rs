// crates/worldmerge-core/src/error.rs

use thiserror::Error;

use crate::config::ConfigError;
use crate::merge::MergeError;
use crate::output::OutputError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load failed: {0}")]
    Load(#[from] worldmerge_parser::LoadError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Writing output failed: {0}")]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
