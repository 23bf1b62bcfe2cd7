use axum::body::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::models::StoredFile;
use crate::features::files::repositories::StoredFileRepository;
use crate::shared::constants::{MSG_FILENAME_REQUIRED, MSG_FILE_NOT_FOUND, MSG_INVALID_FILENAME};
use crate::shared::validation::is_valid_filename;

/// What an upload did to the stored file set
#[derive(Debug)]
pub enum UploadOutcome {
    /// New file on disk, registered in the record store
    Created(StoredFile),
    /// Existing file overwritten; the record store was not touched
    Replaced,
}

/// Service for uploaded files and their on-disk location
pub struct FileService {
    repository: Arc<StoredFileRepository>,
    upload_dir: PathBuf,
}

impl FileService {
    pub fn new(repository: Arc<StoredFileRepository>, config: &StorageConfig) -> Self {
        Self {
            repository,
            upload_dir: config.upload_dir.clone(),
        }
    }

    /// Store `data` under `filename`, replacing any file already on disk.
    ///
    /// The create-vs-replace decision looks at the disk only. A record is
    /// created for files that did not exist before; if that fails, the new
    /// file is removed again and the error is returned.
    pub async fn upload(&self, filename: Option<&str>, data: Bytes) -> Result<UploadOutcome> {
        let filename = filename
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidInput(MSG_FILENAME_REQUIRED.to_string()))?;

        if !is_valid_filename(filename) {
            debug!("Rejected upload with invalid filename: {:?}", filename);
            return Err(AppError::InvalidInput(MSG_INVALID_FILENAME.to_string()));
        }

        let path = self.upload_dir.join(filename);
        let existed = fs::try_exists(&path).await?;

        let temp_path = self.upload_dir.join(temp_name(filename));
        write_atomic(&temp_path, &path, &data).await?;

        if existed {
            info!(
                "File replaced: filename={}, size={} bytes",
                filename,
                data.len()
            );
            if !self.repository.exists(filename).await? {
                warn!("Replaced {} which has no alive record", filename);
            }
            return Ok(UploadOutcome::Replaced);
        }

        match self.repository.create(filename).await {
            Ok(record) => {
                info!(
                    "File created: filename={}, size={} bytes",
                    filename,
                    data.len()
                );
                Ok(UploadOutcome::Created(record))
            }
            Err(e) => {
                warn!(
                    "Registering {} failed, removing freshly written file: {}",
                    filename, e
                );
                if let Err(remove_err) = fs::remove_file(&path).await {
                    warn!("Failed to remove {}: {}", path.display(), remove_err);
                }
                Err(e)
            }
        }
    }

    /// Alive files ordered by filename
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        self.repository.list_alive().await
    }

    /// Resolve an uploaded file on disk.
    ///
    /// Names outside the upload character class can never have been
    /// uploaded and are reported as not found without touching the disk.
    pub async fn locate(&self, filename: &str) -> Result<PathBuf> {
        if !is_valid_filename(filename) {
            return Err(AppError::NotFound(MSG_FILE_NOT_FOUND.to_string()));
        }

        let path = self.upload_dir.join(filename);
        if !fs::try_exists(&path).await? {
            return Err(AppError::NotFound(MSG_FILE_NOT_FOUND.to_string()));
        }

        Ok(path)
    }

    /// Compare the upload directory with the record store.
    ///
    /// Reports files on disk with no record at all and soft-deleted records
    /// whose bytes are still on disk. Nothing is changed.
    pub async fn audit(&self) -> Result<AuditReport> {
        let mut report = AuditReport::default();

        let mut entries = fs::read_dir(&self.upload_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_valid_filename(&name) || is_temp_name(&name) {
                continue;
            }
            if self.repository.find_by_filename(&name).await?.is_none() {
                report.orphan_files.push(name);
            }
        }

        for record in self.repository.list_dead().await? {
            if fs::try_exists(self.upload_dir.join(&record.filename)).await? {
                report.dead_on_disk.push(record.filename);
            }
        }

        report.orphan_files.sort();
        Ok(report)
    }
}

/// Mismatches between the upload directory and the record store
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Files on disk without any record; re-uploads of these are "replaced"
    pub orphan_files: Vec<String>,
    /// Soft-deleted records whose file is still on disk and still queryable
    pub dead_on_disk: Vec<String>,
}

const TEMP_MARKER: &str = ".tmp.";

/// `<filename>.tmp.<uuid>`, the name of an in-flight write
fn temp_name(filename: &str) -> String {
    format!("{}{}{}", filename, TEMP_MARKER, Uuid::new_v4())
}

fn is_temp_name(name: &str) -> bool {
    name.rsplit_once(TEMP_MARKER)
        .is_some_and(|(base, suffix)| !base.is_empty() && Uuid::parse_str(suffix).is_ok())
}

/// Write to `temp_path`, fsync, then rename over `path`.
///
/// Both paths must be entries of the same directory.
async fn write_atomic(temp_path: &Path, path: &Path, data: &[u8]) -> Result<()> {
    let written = async {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(temp_path).await;
        return Err(AppError::Io(e));
    }

    Ok(())
}
