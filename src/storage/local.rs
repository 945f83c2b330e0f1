use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{
    is_safe_locator, mime_for_extension, AttachmentMeta, AttachmentPolicy, AttachmentStorage,
    StorageError,
};
use crate::config::StorageConfig;
use crate::database::models::Attachment;

/// Stores attachments as content-addressed files in one directory
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    policy: AttachmentPolicy,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, policy: AttachmentPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir, AttachmentPolicy::from_config(config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, locator: &str) -> Result<PathBuf, StorageError> {
        if !is_safe_locator(locator) {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }
        Ok(self.root.join(locator))
    }
}

#[async_trait]
impl AttachmentStorage for LocalDiskStorage {
    async fn put(&self, bytes: &[u8], meta: AttachmentMeta) -> Result<Attachment, StorageError> {
        let ext = self.policy.check(&meta.file_name, bytes.len())?;

        let digest = Sha256::digest(bytes);
        let locator = format!("{:x}.{}", digest, ext);
        let path = self.path_for(&locator)?;

        tokio::fs::create_dir_all(&self.root).await?;
        if tokio::fs::try_exists(&path).await? {
            debug!("Attachment {} already stored", locator);
        } else {
            tokio::fs::write(&path, bytes).await?;
            info!("Stored attachment {} ({} bytes)", locator, bytes.len());
        }

        let mime_type = meta
            .mime_type
            .filter(|m| !m.is_empty() && m != "application/octet-stream")
            .unwrap_or_else(|| mime_for_extension(&ext).to_string());

        Ok(Attachment {
            locator,
            file_name: meta.file_name,
            mime_type,
            size: bytes.len() as i64,
        })
    }

    async fn get(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(locator)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(locator.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        let path = self.path_for(locator)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted attachment {}", locator);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(locator.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> LocalDiskStorage {
        let dir = std::env::temp_dir().join(format!("report-desk-{}", uuid::Uuid::new_v4()));
        LocalDiskStorage::new(
            dir,
            AttachmentPolicy {
                max_bytes: 1024,
                allowed_extensions: vec!["txt".to_string(), "pdf".to_string()],
            },
        )
    }

    fn meta(name: &str) -> AttachmentMeta {
        AttachmentMeta {
            file_name: name.to_string(),
            mime_type: None,
        }
    }

    #[tokio::test]
    async fn put_get_delete() {
        let storage = storage();
        let stored = storage.put(b"quarterly numbers", meta("notes.txt")).await.unwrap();

        assert!(stored.locator.ends_with(".txt"));
        assert_eq!(stored.mime_type, "text/plain");
        assert_eq!(stored.size, 17);
        assert_eq!(storage.get(&stored.locator).await.unwrap(), b"quarterly numbers");

        storage.delete(&stored.locator).await.unwrap();
        assert!(matches!(
            storage.get(&stored.locator).await,
            Err(StorageError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn same_content_same_locator() {
        let storage = storage();
        let a = storage.put(b"same", meta("a.txt")).await.unwrap();
        let b = storage.put(b"same", meta("b.txt")).await.unwrap();
        assert_eq!(a.locator, b.locator);
        assert_ne!(a.file_name, b.file_name);
        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn traversal_locators_are_rejected() {
        let storage = storage();
        assert!(matches!(
            storage.get("../secret.txt").await,
            Err(StorageError::InvalidLocator(_))
        ));
    }
}
