use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use studybot_core::{BotError, DocumentStore, StoredDocument};

/// Flat directory of documents, e.g. a locally synced cloud folder.
/// Listing is non-recursive and sorted by name; the handle is the file name.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn storage_error(&self, err: std::io::Error) -> BotError {
        BotError::provider("document store", format!("{}: {err}", self.root.display()))
    }
}

#[async_trait]
impl DocumentStore for DirectoryStore {
    async fn list_files(&self) -> Result<Vec<StoredDocument>, BotError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| self.storage_error(e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.storage_error(e))? {
            let meta = entry.metadata().await.map_err(|e| self.storage_error(e))?;
            if !meta.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            files.push(StoredDocument { handle: name.clone(), name, size_bytes: meta.len() });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(root = %self.root.display(), count = files.len(), "Listed document store");
        Ok(files)
    }

    async fn download(&self, document: &StoredDocument) -> Result<Bytes, BotError> {
        // Handles are bare file names; anything with a path component is foreign.
        let handle = Path::new(&document.handle);
        if handle.components().count() != 1 || handle.file_name().is_none() {
            return Err(BotError::provider("document store", format!("invalid handle {:?}", document.handle)));
        }
        let data = tokio::fs::read(self.root.join(handle))
            .await
            .map_err(|e| self.storage_error(e))?;
        Ok(Bytes::from(data))
    }
}

/// In-process store, insertion order preserved.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<Vec<(StoredDocument, Bytes)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, data: impl Into<Bytes>) {
        let name = name.into();
        let data = data.into();
        let doc = StoredDocument { handle: name.clone(), name, size_bytes: data.len() as u64 };
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((doc, data));
    }

    pub fn with_file(self, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(name, data);
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_files(&self) -> Result<Vec<StoredDocument>, BotError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        Ok(files.iter().map(|(doc, _)| doc.clone()).collect())
    }

    async fn download(&self, document: &StoredDocument) -> Result<Bytes, BotError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .iter()
            .find(|(doc, _)| doc.handle == document.handle)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| BotError::provider("document store", format!("{} vanished", document.name)))
    }
}
