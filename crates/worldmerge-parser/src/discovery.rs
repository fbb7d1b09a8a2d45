use std::path::{Path, PathBuf};

use crate::errors::LoadError;

/// Returns the first `*.csv` in `dir` (sorted by path) whose file name
/// contains `keyword`, ignoring case.
pub fn find_file(dir: &Path, keyword: &str) -> Result<PathBuf, LoadError> {
    let candidates = list_csv_files(dir)?;
    let needle = keyword.to_lowercase();

    candidates
        .into_iter()
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .ok_or_else(|| LoadError::MissingFile {
            dir: dir.to_path_buf(),
            keyword: keyword.to_string(),
        })
}

fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = match escaped.trim_end_matches('/') {
        "" if escaped.is_empty() => "*.csv".to_string(),
        base => format!("{base}/*.csv"),
    };

    let entries = glob::glob(&pattern).map_err(|source| LoadError::Pattern {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(err) => {
                let path = err.path().to_path_buf();
                return Err(LoadError::Io {
                    path,
                    source: err.into_error(),
                });
            }
        }
    }
    paths.sort();
    Ok(paths)
}
