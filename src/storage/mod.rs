// src/storage/mod.rs
use crate::edgar::models::{Cik, FilingRecord};
use crate::utils::error::StorageError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";
pub const HTML_FILE: &str = "filing.html";
pub const TEXT_FILE: &str = "filing.txt";
pub const PDF_FILE: &str = "filing.pdf";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Creates (idempotently) `base/<cik>/<accession without dashes>`.
    pub fn make_output_dir(&self, cik: &Cik, accession_number: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self
            .base_dir
            .join(cik.padded())
            .join(accession_number.replace('-', ""));

        fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        Ok(target_dir)
    }

    pub fn write_text(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        fs::write(path, content).map_err(StorageError::IoError)?;
        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Pretty-printed UTF-8 JSON. Non-ASCII characters are written as-is.
    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.write_text(path, &json)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceUrls {
    pub submissions: String,
    pub filing_document: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutputFiles {
    pub html: String,
    pub text: String,
    pub pdf: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            html: HTML_FILE.to_string(),
            text: TEXT_FILE.to_string(),
            pdf: PDF_FILE.to_string(),
        }
    }
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilingMetadata {
    pub company: String,
    pub cik: String,
    pub form: String,
    pub filing_date: String,
    pub accession_number: String,
    pub primary_document: String,
    pub source_urls: SourceUrls,
    pub fetched_at_utc: String,
    pub outputs: OutputFiles,
}

impl FilingMetadata {
    pub fn new(filing: &FilingRecord, source_urls: SourceUrls, fetched_at: DateTime<Utc>) -> Self {
        Self {
            company: filing.company_name.clone(),
            cik: filing.cik.padded(),
            form: filing.form.clone(),
            filing_date: filing.filing_date.clone(),
            accession_number: filing.accession_number.clone(),
            primary_document: filing.primary_document.clone(),
            source_urls,
            // e.g. 2024-11-01T14:03:09+00:00
            fetched_at_utc: fetched_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            outputs: OutputFiles::default(),
        }
    }
}
