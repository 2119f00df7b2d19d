//! Tauri commands for loading and saving the whole document

use tauri::State;

use crate::session::SessionView;
use crate::storage::Document;
use crate::tree::DocumentTree;
use crate::AppState;

use super::{lock_session, CommandResult};

/// Re-read the document from storage and make it the live tree
#[tauri::command]
pub fn load_document(state: State<AppState>) -> CommandResult<Document> {
    let tree = DocumentTree::bootstrap(state.storage.load());
    let mut session = lock_session(&state)?;
    session.replace_tree(tree);
    Ok(session.to_document())
}

/// Adopt a document pushed by the frontend and write it out right away.
///
/// The write goes through the autosave worker, behind any save already
/// running. Returns false when it failed; the document stays live in
/// memory and the next change schedules another save.
#[tauri::command]
pub async fn save_document(state: State<'_, AppState>, document: Document) -> CommandResult<bool> {
    let snapshot = {
        let mut session = lock_session(&state)?;
        session.replace_tree(DocumentTree::bootstrap(Some(document)));
        session.to_document()
    };
    Ok(state.autosave.save_now(snapshot).await)
}

#[tauri::command]
pub fn get_tree(state: State<AppState>) -> CommandResult<SessionView> {
    let session = lock_session(&state)?;
    Ok(session.view())
}
