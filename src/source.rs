//! Loading the athlete/medal dataset from CSV.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::record::Record;

/// Loads every record from the CSV file at `path`.
///
/// Files ending in `.gz` are decompressed on the fly.
///
/// # Errors
///
/// [`DashboardError::SourceUnavailable`] if the file cannot be opened,
/// [`DashboardError::MalformedRecord`] for the first row that fails to parse.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DashboardError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(gzipped, "Opened dataset");

    let records = if gzipped {
        read_records(GzDecoder::new(file))?
    } else {
        read_records(file)?
    };

    info!(rows = records.len(), "Dataset loaded");
    Ok(records)
}

/// Reads header-named CSV rows from any reader.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: Record = result.map_err(|source| DashboardError::MalformedRecord {
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        rows.push(record);
    }

    Ok(rows)
}

/// Dataset loaded on first successful use and reused afterwards.
///
/// A failed load leaves the cache empty so a later pass can retry.
#[derive(Debug)]
pub struct CachedSource {
    path: PathBuf,
    records: Option<Vec<Record>>,
}

impl CachedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CachedSource {
            path: path.into(),
            records: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.records.is_some()
    }

    pub fn records(&mut self) -> Result<&[Record]> {
        if self.records.is_none() {
            self.records = Some(load_records(&self.path)?);
        }
        Ok(self.records.as_deref().unwrap_or_default())
    }
}
