use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::domain::SubmissionId;

/// Where uploaded document bytes go. The lifecycle engine keeps only the
/// returned key; it never reads the bytes back.
pub trait DocumentStore: Send + Sync {
    fn store(&self, id: &SubmissionId, bytes: &[u8]) -> Result<String, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write document {key}: {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },
    #[error("storage location unavailable: {source}")]
    Unavailable { source: std::io::Error },
}

/// Filesystem store writing `{upload_dir}/{submission_id}.pdf`.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    upload_dir: PathBuf,
}

impl FsDocumentStore {
    /// Create the store, making sure the upload directory exists.
    pub fn new(upload_dir: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&upload_dir).map_err(|source| StorageError::Unavailable { source })?;
        Ok(Self { upload_dir })
    }
}

impl DocumentStore for FsDocumentStore {
    fn store(&self, id: &SubmissionId, bytes: &[u8]) -> Result<String, StorageError> {
        let path = self.upload_dir.join(format!("{id}.pdf"));
        let key = path.display().to_string();
        fs::write(&path, bytes).map_err(|source| StorageError::Write {
            key: key.clone(),
            source,
        })?;
        Ok(key)
    }
}

/// Map-backed store for tests and the in-process demo.
#[derive(Default, Clone)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryDocumentStore {
    pub fn document(&self, key: &str) -> Option<Vec<u8>> {
        self.documents
            .lock()
            .expect("document mutex poisoned")
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .expect("document mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn store(&self, id: &SubmissionId, bytes: &[u8]) -> Result<String, StorageError> {
        let key = format!("mem://{id}.pdf");
        self.documents
            .lock()
            .expect("document mutex poisoned")
            .insert(key.clone(), bytes.to_vec());
        Ok(key)
    }
}
