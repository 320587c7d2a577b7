use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::CollaboratorError;

/// File part received with a request, not yet persisted
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Upload collaborator
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn save(&self, file: &IncomingFile) -> Result<StoredFile, CollaboratorError>;

    /// Delete a file saved earlier whose record was never written
    async fn remove(&self, file: &StoredFile) -> Result<(), CollaboratorError>;
}

/// Writes uploads into one directory under random names
#[derive(Debug, Clone)]
pub struct DiskUploadStore {
    dir: PathBuf,
}

impl DiskUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Random name keeping the client's extension, so the client never picks the path
    fn stored_name(original_name: Option<&str>) -> String {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        format!("{}{}", Uuid::new_v4().simple(), extension)
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn save(&self, file: &IncomingFile) -> Result<StoredFile, CollaboratorError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = Self::stored_name(file.original_name.as_deref());
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, &file.bytes).await?;

        tracing::info!("Stored upload {} ({} bytes)", filename, file.bytes.len());
        Ok(StoredFile { filename, path })
    }

    async fn remove(&self, file: &StoredFile) -> Result<(), CollaboratorError> {
        match tokio::fs::remove_file(&file.path).await {
            Ok(()) => {
                tracing::info!("Removed upload {}", file.filename);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
