use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::{AppError, Result};
use crate::domain::patient_data::{AccessToken, Dataset};

fn io_err(msg: impl Into<String>) -> AppError {
    AppError::IoError(msg.into())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| io_err(format!("Failed to create dir {}: {e}", path.display())))
}

/// Create the dataset directory if needed and return it.
pub fn ensure_storage_root(path: &Path) -> Result<PathBuf> {
    ensure_dir(path)?;
    Ok(path.to_path_buf())
}

/// Write through a sibling temp file and rename, so readers never see a
/// partially written file.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let tmp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    let written = (|| {
        let mut file = fs::File::create(&tmp_path).map_err(|e| {
            io_err(format!(
                "Failed to create temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.write_all(bytes).map_err(|e| {
            io_err(format!(
                "Failed to write temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.sync_all().map_err(|e| {
            io_err(format!(
                "Failed to sync temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        fs::rename(&tmp_path, path).map_err(|e| {
            io_err(format!(
                "Failed to rename temp file {} to {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

/// Durable dataset storage keyed by access token.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn save(&self, token: &AccessToken, dataset: &Dataset) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `token`.
    async fn load(&self, token: &AccessToken) -> Result<Option<Dataset>>;
}

/// One `<token>.json` file per dataset under a single directory.
#[derive(Debug, Clone)]
pub struct JsonFileDatasetStore {
    root: PathBuf,
}

impl JsonFileDatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dataset_path(&self, token: &AccessToken) -> Result<PathBuf> {
        if !token.is_storage_safe() {
            return Err(AppError::ValidationError(
                "Token is not usable as a storage key".to_string(),
            ));
        }
        Ok(self.root.join(format!("{}.json", token.as_str())))
    }
}

#[async_trait]
impl DatasetStore for JsonFileDatasetStore {
    async fn save(&self, token: &AccessToken, dataset: &Dataset) -> Result<()> {
        let path = self.dataset_path(token)?;
        let bytes = serde_json::to_vec(dataset)?;
        tokio::task::spawn_blocking(move || atomic_write_bytes(&path, &bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Dataset write task failed: {e}")))?
    }

    async fn load(&self, token: &AccessToken) -> Result<Option<Dataset>> {
        let path = self.dataset_path(token)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(io_err(format!(
                    "Failed to read dataset {}: {e}",
                    path.display()
                )))
            }
        };
        let dataset = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Internal(format!("Failed to parse dataset {}: {e}", path.display()))
        })?;
        Ok(Some(dataset))
    }
}
