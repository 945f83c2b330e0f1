// storage/mod.rs - Attachment storage capability
//
// Reports may carry one file attachment. Handlers only see the
// `AttachmentStorage` trait; the deployment picks the implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StorageConfig;
use crate::database::models::Attachment;

pub mod local;

pub use local::LocalDiskStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("attachment exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("file type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("invalid locator '{0}'")]
    InvalidLocator(String),

    #[error("attachment '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What the client told us about an uploaded file
#[derive(Debug, Clone)]
pub struct AttachmentMeta {
    pub file_name: String,
    pub mime_type: Option<String>,
}

#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// Validate and persist the bytes, returning the stored attachment record
    async fn put(&self, bytes: &[u8], meta: AttachmentMeta) -> Result<Attachment, StorageError>;
    async fn get(&self, locator: &str) -> Result<Vec<u8>, StorageError>;
    async fn delete(&self, locator: &str) -> Result<(), StorageError>;
}

/// Size and type limits applied before anything touches the backend
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    pub max_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl AttachmentPolicy {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_bytes: config.max_attachment_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    /// Returns the normalized extension on success
    pub fn check(&self, file_name: &str, size: usize) -> Result<String, StorageError> {
        let ext = extension_of(file_name);
        if !self.allowed_extensions.iter().any(|allowed| allowed == &ext) {
            return Err(StorageError::UnsupportedType(if ext.is_empty() {
                file_name.to_string()
            } else {
                ext
            }));
        }
        if size > self.max_bytes {
            return Err(StorageError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(ext)
    }
}

pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Reject path traversal and special characters
pub fn is_safe_locator(locator: &str) -> bool {
    !locator.is_empty()
        && !locator.contains("..")
        && !locator.contains('/')
        && !locator.contains('\\')
        && !locator.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AttachmentPolicy {
        AttachmentPolicy {
            max_bytes: 16,
            allowed_extensions: vec!["pdf".to_string(), "png".to_string()],
        }
    }

    #[test]
    fn accepts_allowed_extension_case_insensitively() {
        assert_eq!(policy().check("Q3.PDF", 10).unwrap(), "pdf");
    }

    #[test]
    fn rejects_unlisted_and_oversize_files() {
        assert!(matches!(
            policy().check("run.exe", 1),
            Err(StorageError::UnsupportedType(ext)) if ext == "exe"
        ));
        assert!(matches!(
            policy().check("noext", 1),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            policy().check("big.png", 17),
            Err(StorageError::TooLarge { limit: 16 })
        ));
    }

    #[test]
    fn locator_safety() {
        assert!(is_safe_locator("abc123.pdf"));
        assert!(!is_safe_locator("../etc/passwd"));
        assert!(!is_safe_locator("a/b.pdf"));
        assert!(!is_safe_locator(""));
    }
}
