//! Outlook Store - validated uploads persisted as JSON and CSV
//!
//! The current dataset lives only on disk, as two files in the data
//! directory:
//!
//! - `outlook.json` - pretty-printed array of records
//! - `outlook.csv` - header row plus one row per record
//!
//! Every successful upload replaces both. New content is staged in temp
//! files, synced, then renamed over the old files while the store's write
//! lock is held; downloads take the read lock, so a reader never sees the
//! JSON of one upload next to the CSV of another.

use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::logs::{log_error, log_info, log_success};
use crate::codec::{decode_csv, decode_upload_bytes, encode_csv};
use crate::config::ServerConfig;
use crate::error::{PersistError, PersistResult, ReadError, ReadResult};
use crate::models::Dataset;
use crate::validation::validate_owned;

/// File holding the JSON rendition.
pub const JSON_FILE: &str = "outlook.json";

/// File holding the CSV rendition.
pub const CSV_FILE: &str = "outlook.csv";

/// A persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    pub fn file_name(&self) -> &'static str {
        match self {
            Format::Json => JSON_FILE,
            Format::Csv => CSV_FILE,
        }
    }

    /// MIME type served for the format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }
}

/// An upload body, before decoding and validation.
#[derive(Debug, Clone)]
pub enum UploadBody {
    /// Parsed JSON, expected to be an array of records.
    Json(Value),
    /// CSV text, column-major or row-major.
    Csv(String),
}

impl UploadBody {
    /// Parse a JSON request body.
    pub fn json_from_bytes(bytes: &[u8]) -> PersistResult<Self> {
        Ok(UploadBody::Json(serde_json::from_slice(bytes)?))
    }

    /// Decode a CSV request body, detecting its character encoding.
    pub fn csv_from_bytes(bytes: &[u8]) -> PersistResult<Self> {
        Ok(UploadBody::Csv(decode_upload_bytes(bytes)?))
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// Number of records (years) written.
    pub years: usize,
}

/// Persistence gateway for the outlook dataset.
#[derive(Debug)]
pub struct OutlookStore {
    /// Directory holding both files
    data_dir: PathBuf,
    /// Uploads covering fewer years are rejected
    min_years: usize,
    /// Write side held while replacing files, read side while serving them
    lock: RwLock<()>,
}

impl OutlookStore {
    /// Create a store over `data_dir`. The directory is created on first
    /// upload.
    pub fn new(data_dir: impl AsRef<Path>, min_years: usize) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            min_years,
            lock: RwLock::new(()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.data_dir, config.min_years)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn min_years(&self) -> usize {
        self.min_years
    }

    /// Path of the file holding `format`.
    pub fn path_for(&self, format: Format) -> PathBuf {
        self.data_dir.join(format.file_name())
    }

    /// Decode and validate an upload, then apply the minimum-size guard.
    ///
    /// Nothing is written.
    pub fn prepare(&self, body: UploadBody) -> PersistResult<Dataset> {
        let dataset = match body {
            UploadBody::Json(value) => validate_owned(value)?,
            UploadBody::Csv(text) => validate_owned(decode_csv(&text)?)?,
        };

        if dataset.len() < self.min_years {
            return Err(PersistError::InsufficientData {
                min: self.min_years,
                actual: dataset.len(),
            });
        }

        Ok(dataset)
    }

    /// Validate an upload and replace both persisted files with it.
    ///
    /// On any failure the previous files are left untouched.
    pub async fn upload(&self, body: UploadBody) -> PersistResult<UploadSummary> {
        let dataset = self.prepare(body)?;

        log_success(format!(
            "Validated {} years: {}",
            dataset.len(),
            dataset.years().join(", ")
        ));

        let json = dataset
            .to_json_pretty()
            .map_err(|e| PersistError::Render(e.to_string()))?;
        let csv = encode_csv(&dataset).map_err(|e| PersistError::Render(e.to_string()))?;

        self.replace_files(&[(Format::Json, json), (Format::Csv, csv)])
            .await?;

        log_info(format!("Wrote {} and {}", JSON_FILE, CSV_FILE));

        Ok(UploadSummary {
            years: dataset.len(),
        })
    }

    /// Read a persisted file verbatim.
    pub async fn download(&self, format: Format) -> ReadResult<Vec<u8>> {
        let _guard = self.lock.read().await;
        self.read_file(format).await
    }

    async fn read_file(&self, format: Format) -> ReadResult<Vec<u8>> {
        let path = self.path_for(format);

        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ReadError::NotFound(format.file_name().to_string())
            } else {
                ReadError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })
    }

    /// Stage every file, then rename them all into place.
    ///
    /// Current files are copied aside before the first rename. If a rename
    /// fails, the files already replaced are restored from those copies and
    /// every leftover temp file is removed.
    async fn replace_files(&self, files: &[(Format, String)]) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let tag = Uuid::new_v4().simple().to_string();
        let _guard = self.lock.write().await;

        let mut staged = Vec::with_capacity(files.len());
        for (format, content) in files {
            let temp = self.side_path(*format, &tag, "tmp");
            staged.push(temp.clone());

            if let Err(e) = write_synced(&temp, content.as_bytes()).await {
                discard(&staged).await;
                return Err(e);
            }
        }

        let mut backups = Vec::with_capacity(files.len());
        for (format, _) in files {
            match self.back_up(*format, &tag).await {
                Ok(backup) => backups.push(backup),
                Err(e) => {
                    discard(&staged).await;
                    discard(backups.iter().flatten()).await;
                    return Err(e);
                }
            }
        }

        for (done, (temp, (format, _))) in staged.iter().zip(files).enumerate() {
            if let Err(e) = tokio::fs::rename(temp, self.path_for(*format)).await {
                self.roll_back(&files[..done], &backups[..done]).await;
                discard(&staged[done..]).await;
                discard(backups.iter().flatten()).await;
                return Err(e);
            }
        }

        discard(backups.iter().flatten()).await;
        Ok(())
    }

    /// Hidden sibling of the file for `format`, unique to one upload.
    fn side_path(&self, format: Format, tag: &str, suffix: &str) -> PathBuf {
        self.data_dir
            .join(format!(".{}.{}.{}", format.file_name(), tag, suffix))
    }

    /// Copy the current file for `format` aside. Only regular files are
    /// kept; a missing file has nothing to restore.
    async fn back_up(&self, format: Format, tag: &str) -> io::Result<Option<PathBuf>> {
        let target = self.path_for(format);

        match tokio::fs::metadata(&target).await {
            Ok(meta) if meta.is_file() => {
                let backup = self.side_path(format, tag, "bak");
                if let Err(e) = tokio::fs::copy(&target, &backup).await {
                    let _ = tokio::fs::remove_file(&backup).await;
                    return Err(e);
                }
                Ok(Some(backup))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Put back the files replaced so far.
    async fn roll_back(&self, replaced: &[(Format, String)], backups: &[Option<PathBuf>]) {
        for ((format, _), backup) in replaced.iter().zip(backups) {
            let target = self.path_for(*format);
            let restored = match backup {
                Some(backup) => tokio::fs::rename(backup, &target).await,
                None => tokio::fs::remove_file(&target).await,
            };

            if let Err(e) = restored {
                log_error(format!("Could not restore {}: {}", target.display(), e));
            }
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}
