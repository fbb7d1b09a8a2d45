use std::path::Path;

use csv::StringRecord;

use crate::errors::LoadError;

/// Source headers for the identifier columns, in `country, iso3, year` order.
pub const IDENTIFIER_HEADERS: [&str; 3] = ["Entity", "Code", "Year"];

/// How the metric column of a source file is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// First header that is not an identifier column.
    Positional,
    /// Accepted header names in priority order; the first present wins.
    Aliases(Vec<String>),
}

impl ColumnSelector {
    pub fn aliases<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSelector::Aliases(names.into_iter().map(Into::into).collect())
    }

    /// Returns the index of the metric column in `headers`.
    pub fn resolve(
        &self,
        path: &Path,
        metric: &str,
        headers: &StringRecord,
    ) -> Result<usize, LoadError> {
        let found = match self {
            ColumnSelector::Positional => headers
                .iter()
                .position(|header| !IDENTIFIER_HEADERS.contains(&header)),
            ColumnSelector::Aliases(candidates) => candidates
                .iter()
                .find_map(|alias| headers.iter().position(|header| header == alias)),
        };

        found.ok_or_else(|| LoadError::UnresolvedMetric {
            path: path.to_path_buf(),
            metric: metric.to_string(),
            candidates: self.candidates(),
            available: header_names(headers),
        })
    }

    fn candidates(&self) -> Vec<String> {
        match self {
            ColumnSelector::Positional => vec!["<first non-identifier column>".to_string()],
            ColumnSelector::Aliases(candidates) => candidates.clone(),
        }
    }
}

/// Positions of `Entity`, `Code` and `Year` in a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierColumns {
    pub country: usize,
    pub iso3: usize,
    pub year: usize,
}

impl IdentifierColumns {
    pub fn locate(path: &Path, headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                    available: header_names(headers),
                })
        };

        let [country, iso3, year] = IDENTIFIER_HEADERS;
        Ok(Self {
            country: find(country)?,
            iso3: find(iso3)?,
            year: find(year)?,
        })
    }
}

pub(crate) fn header_names(headers: &StringRecord) -> Vec<String> {
    headers.iter().map(str::to_string).collect()
}
