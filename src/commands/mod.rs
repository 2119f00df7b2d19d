mod document;
mod editor;
mod folder;
mod tree;
mod ui;

pub use document::*;
pub use editor::*;
pub use folder::*;
pub use tree::*;
pub use ui::*;

use std::sync::MutexGuard;

use tauri::State;
use uuid::Uuid;

use crate::session::Session;
use crate::storage::StorageError;
use crate::tree::TreeError;
use crate::AppState;

/// Error shape the frontend receives and shows as an alert
#[derive(Debug, serde::Serialize)]
pub struct CommandError {
    pub message: String,
}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

impl From<TreeError> for CommandError {
    fn from(err: TreeError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

type CommandResult<T> = Result<T, CommandError>;

fn lock_session<'a>(state: &'a State<AppState>) -> CommandResult<MutexGuard<'a, Session>> {
    state.session.lock().map_err(|e| CommandError {
        message: format!("Session lock poisoned: {}", e),
    })
}

fn parse_id(raw: &str, what: &str) -> CommandResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| CommandError {
        message: format!("Invalid {} ID: {}", what, e),
    })
}

fn parse_ids(raw: &[String], what: &str) -> CommandResult<Vec<Uuid>> {
    raw.iter().map(|id| parse_id(id, what)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_carry_display_text() {
        let err: CommandError = TreeError::LastPage.into();
        assert_eq!(err.message, "Cannot delete the last page");

        let err: CommandError = StorageError::DataDirNotFound.into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "message": "Data directory not found" })
        );
    }

    #[test]
    fn test_parse_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_ids(&[id.to_string()], "page").unwrap(), vec![id]);

        let err = parse_ids(&[id.to_string(), "nope".to_string()], "page").unwrap_err();
        assert!(err.message.starts_with("Invalid page ID"));
    }
}
