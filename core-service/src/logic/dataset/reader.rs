use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::record::LabeledUrl;

/// Column holding the URL
pub const URL_COLUMN: &str = "url";
/// Column holding the label
pub const TYPE_COLUMN: &str = "type";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read dataset header: {0}")]
    Header(#[from] csv::Error),
    #[error("dataset is missing the `{0}` column")]
    MissingColumn(&'static str),
    #[error("dataset contains no usable rows")]
    Empty,
}

/// Rows parsed from a dataset
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub records: Vec<LabeledUrl>,
    /// Data rows seen (excluding the header)
    pub rows_read: usize,
    /// Malformed rows or rows without a URL
    pub skipped: usize,
    /// Rows per `type` value
    pub class_counts: BTreeMap<String, usize>,
}

impl LoadedDataset {
    pub fn phishing_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_phishing()).count()
    }
}

/// Read a labeled CSV file
pub fn read_dataset(path: &Path) -> Result<LoadedDataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let dataset = read_dataset_from(file)?;
    log::info!(
        "Loaded {} rows from {} ({} skipped)",
        dataset.records.len(),
        path.display(),
        dataset.skipped
    );
    Ok(dataset)
}

/// Read labeled CSV from any reader. Bad rows are counted, never fatal.
pub fn read_dataset_from<R: Read>(input: R) -> Result<LoadedDataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let url_idx = column(&headers, URL_COLUMN)?;
    let type_idx = column(&headers, TYPE_COLUMN)?;

    let mut dataset = LoadedDataset::default();
    for (line, row) in reader.records().enumerate() {
        dataset.rows_read += 1;

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                log::debug!("Skipping malformed row {}: {}", line + 2, e);
                dataset.skipped += 1;
                continue;
            }
        };

        let (Some(url), Some(kind)) = (row.get(url_idx), row.get(type_idx)) else {
            dataset.skipped += 1;
            continue;
        };
        if url.is_empty() {
            dataset.skipped += 1;
            continue;
        }

        *dataset.class_counts.entry(kind.to_string()).or_insert(0) += 1;
        dataset.records.push(LabeledUrl::new(url, kind));
    }

    if dataset.records.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(dataset)
}

fn column(headers: &csv::StringRecord, name: &'static str) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or(DatasetError::MissingColumn(name))
}
