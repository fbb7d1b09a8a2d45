use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serializes a frame to CSV bytes: header row, comma separated, nulls empty.
pub fn create_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, OutputError> {
    let mut buffer = Vec::new();
    let mut clone = df.clone();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut clone)?;
    Ok(buffer)
}

/// Writes `df` to `path` through a sibling temp file and a rename, so the
/// destination either holds the full output or is left untouched.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), OutputError> {
    let bytes = create_csv_bytes(df)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let staging = staging_path(path);
    fs::write(&staging, &bytes).map_err(io_error(&staging))?;
    if let Err(err) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(io_error(path)(err));
    }

    debug!(path = %path.display(), bytes = bytes.len(), "wrote merged CSV");
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError {
    let path = path.to_path_buf();
    move |source| OutputError::Io { path, source }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_empty_nulls() {
        let df = df![
            "iso3" => ["USA", "BRA"],
            "year" => [Some(2019i64), None],
            "value" => [Some(1.5f64), None],
        ]
        .unwrap();

        let text = String::from_utf8(create_csv_bytes(&df).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["iso3,year,value", "USA,2019,1.5", "BRA,,"]);
    }

    #[test]
    fn staging_file_sits_next_to_target() {
        assert_eq!(
            staging_path(Path::new("public/data/world_metrics.csv")),
            PathBuf::from("public/data/world_metrics.csv.tmp")
        );
    }

    #[test]
    fn creates_parent_directories_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.csv");
        let df = df!["iso3" => ["USA"], "year" => [2019i64]].unwrap();

        write_csv(&df, &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "iso3,year\nUSA,2019\n");
        assert!(!staging_path(&target).exists());
    }
}
