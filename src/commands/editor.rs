//! Tauri commands that keep the webview editor and the active page in step

use serde_json::Value;
use tauri::State;

use crate::session::{EditorView, SessionView};
use crate::AppState;

use super::{lock_session, parse_id, CommandResult};

#[tauri::command]
pub fn set_active_page(state: State<AppState>, page_id: String) -> CommandResult<SessionView> {
    let id = parse_id(&page_id, "page")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.set_active_page(id));
    Ok(session.view())
}

/// The editor reports its whole document after a change, tagged with the
/// page it was showing
#[tauri::command]
pub fn editor_content_changed(
    state: State<AppState>,
    page_id: String,
    blocks: Vec<Value>,
) -> CommandResult<SessionView> {
    let id = parse_id(&page_id, "page")?;
    let mut session = lock_session(&state)?;
    if !session.editor_changed(id, blocks) {
        log::debug!("Editor change not captured");
    }
    Ok(session.view())
}

/// Content the editor should show once it has mounted
#[tauri::command]
pub fn editor_ready(state: State<AppState>) -> CommandResult<EditorView> {
    let session = lock_session(&state)?;
    Ok(session.editor_view())
}
