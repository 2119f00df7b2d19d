use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use super::models::Document;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Whole-document persistence.
///
/// `load` never fails: a missing or unreadable document is reported as
/// `None` and the caller substitutes a default tree. `save` always rewrites
/// the entire document.
pub trait DocumentStore: Send + Sync {
    fn load(&self) -> Option<Document>;

    fn save(&self, document: &Document) -> Result<()>;
}

/// Default file name of the persisted document
pub const DOCUMENT_FILE: &str = "document.json";

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self::with_file(data_dir.join(DOCUMENT_FILE))
    }

    pub fn with_file(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("sidenote"))
            .ok_or(StorageError::DataDirNotFound)
    }

    /// Initialize storage directories
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document> {
        let content = fs::read_to_string(&self.path)?;
        let document: Document = serde_json::from_str(&content)?;
        Ok(document)
    }

    /// Move an unparsable document aside so the next save does not
    /// overwrite the only copy of the user's data.
    fn quarantine(&self) {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let target = self.path.with_extension(format!("json.corrupt-{}", stamp));
        match fs::rename(&self.path, &target) {
            Ok(()) => log::warn!("Moved unreadable document to {}", target.display()),
            Err(e) => log::warn!("Failed to move unreadable document aside: {}", e),
        }
    }
}

impl DocumentStore for FileStorage {
    fn load(&self) -> Option<Document> {
        if !self.path.exists() {
            log::info!("No document at {}, starting fresh", self.path.display());
            return None;
        }

        match self.read_document() {
            Ok(document) => {
                log::info!(
                    "Loaded {} categories ({} pages) from {}",
                    document.categories.len(),
                    document.page_count(),
                    self.path.display()
                );
                Some(document)
            }
            Err(StorageError::Json(e)) => {
                log::warn!("Document at {} is malformed: {}", self.path.display(), e);
                self.quarantine();
                None
            }
            // Not UTF-8: the bytes are there, they just are not a document
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                log::warn!("Document at {} is not valid text: {}", self.path.display(), e);
                self.quarantine();
                None
            }
            Err(e) => {
                log::warn!("Failed to read document at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Save using atomic write (write to .tmp then rename)
    fn save(&self, document: &Document) -> Result<()> {
        self.init()?;
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        log::debug!("Saved document to {}", self.path.display());
        Ok(())
    }
}
