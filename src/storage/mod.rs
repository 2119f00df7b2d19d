mod file_storage;
mod local_key;
mod models;

pub use file_storage::{DocumentStore, FileStorage, Result, StorageError, DOCUMENT_FILE};
pub use local_key::{LocalKeyStorage, DOCUMENT_KEY};
pub use models::*;
