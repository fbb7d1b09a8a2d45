pub mod config;
pub mod error;
pub mod merge;
pub mod output;
pub mod pipeline;

pub use config::{DatasetConfig, MergeConfig};
pub use error::{PipelineError, Result};
pub use merge::{merge, MergePolicy};
pub use pipeline::{run, RunSummary};
