//! Header-less `t,omega` CSV files.

use std::io::Read;
use std::path::Path;

use mt_ident::IdentificationDataset;

use crate::error::{AppError, AppResult};

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'));
    builder
}

fn parse_rows<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Vec<f64>>, String> {
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let row = record
            .iter()
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|_| format!("row {}: '{}' is not a number", i + 1, field))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Parse a dataset from any reader; `origin` names the source in errors.
pub fn parse_dataset_csv<R: Read>(input: R, origin: &Path) -> AppResult<IdentificationDataset> {
    let mut reader = reader_builder().from_reader(input);
    let rows = parse_rows(&mut reader).map_err(|message| AppError::DatasetRead {
        path: origin.to_path_buf(),
        message,
    })?;
    Ok(IdentificationDataset::from_rows(&rows)?)
}

/// Read a dataset file. A missing or unreadable file is fatal.
pub fn read_dataset_csv(path: &Path) -> AppResult<IdentificationDataset> {
    let file = std::fs::File::open(path).map_err(|e| AppError::DatasetRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let dataset = parse_dataset_csv(file, path)?;
    tracing::debug!(path = %path.display(), samples = dataset.len(), "read dataset");
    Ok(dataset)
}

/// Write `dataset` as header-less CSV with six decimals.
pub fn write_dataset_csv(path: &Path, dataset: &IdentificationDataset) -> AppResult<()> {
    let to_err = |e: csv::Error| AppError::DatasetWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(to_err)?;
    for (t, y) in dataset.rows() {
        writer
            .write_record([format!("{t:.6}"), format!("{y:.6}")])
            .map_err(to_err)?;
    }
    writer.flush()?;
    Ok(())
}
