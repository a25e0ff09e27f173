//! Optional sample dataset shown next to the form. Display only.

use std::path::Path;

/// Header and the first rows of a CSV file, kept as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SampleTable {
    /// Reads the header and at most `limit` rows.
    pub fn from_csv(path: &Path, limit: usize) -> Result<Self, csv::Error> {
        let mut rdr = csv::Reader::from_path(path)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        let rows: Vec<Vec<String>> = rdr
            .records()
            .take(limit)
            .map(|row| row.map(|r| r.iter().map(String::from).collect()))
            .collect::<Result<_, csv::Error>>()?;
        Ok(Self { headers, rows })
    }
}
