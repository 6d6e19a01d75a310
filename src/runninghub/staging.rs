use crate::error::{RelayError, Result};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// An image written to a uniquely named temporary file. The file is removed
/// when the value is dropped, whichever way the upload ends.
pub struct StagedImage {
    file: NamedTempFile,
}

impl StagedImage {
    /// Creates the file off the async worker and writes `bytes` through `tokio::fs`.
    pub async fn create(dir: &Path, bytes: &[u8], extension: &str) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            RelayError::Upload(format!(
                "Image upload failed: cannot create staging directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let dir_owned = dir.to_path_buf();
        let suffix = format!(".{}", extension);
        let file = tokio::task::spawn_blocking(move || {
            Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(&dir_owned)
        })
        .await
        .map_err(|e| RelayError::Upload(format!("Image upload failed: {}", e)))?
        .map_err(|e| RelayError::Upload(format!("Image upload failed: {}", e)))?;

        // From here on `staged` owns the file, so a failed write still removes it.
        let staged = Self { file };
        tokio::fs::write(staged.path(), bytes)
            .await
            .map_err(|e| RelayError::Upload(format!("Image upload failed: {}", e)))?;

        log::debug!("Staged {} bytes at {}", bytes.len(), staged.path().display());
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.jpg".to_string())
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(self.path())
            .await
            .map_err(|e| RelayError::Upload(format!("Image upload failed: {}", e)))
    }

    /// Removes the file now and reports failures instead of ignoring them.
    pub fn remove(self) -> Result<PathBuf> {
        let path = self.path().to_path_buf();
        self.file
            .close()
            .map_err(|e| RelayError::Upload(format!("Failed to remove staged image: {}", e)))?;
        Ok(path)
    }
}
