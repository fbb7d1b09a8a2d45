pub mod discovery;
pub mod errors;
pub mod model;
pub mod normalize;
pub mod resolve;
mod loader;

pub use discovery::find_file;
pub use errors::LoadError;
pub use loader::{load_metric_table, LoadOptions};
pub use model::{LoadReport, MetricTable, COUNTRY, ISO3, YEAR};
pub use resolve::{ColumnSelector, IdentifierColumns, IDENTIFIER_HEADERS};
