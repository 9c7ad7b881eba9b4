//! Local storage for uploaded raw files

use std::path::PathBuf;
use uuid::Uuid;

use crate::error::Result;

/// Stores uploaded bytes on local disk under a generated unique name
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, ensuring the directory exists
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write the raw bytes to `{file_id}_{filename}` and return the path.
    /// Path separators in the client filename are flattened.
    pub async fn store(&self, file_id: &Uuid, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let safe_name: String = filename
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();

        let path = self.dir.join(format!("{}_{}", file_id, safe_name));
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}
