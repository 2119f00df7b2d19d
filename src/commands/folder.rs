//! Tauri commands for a category's advisory folder path

use std::path::PathBuf;

use tauri::State;

use crate::session::SessionView;
use crate::AppState;

use super::{lock_session, parse_id, CommandResult};

/// Let the user choose a folder for a category. Cancelling the dialog
/// leaves the category as it was.
#[tauri::command]
pub async fn pick_category_folder(
    app: tauri::AppHandle,
    state: State<'_, AppState>,
    category_id: String,
) -> CommandResult<SessionView> {
    use tauri_plugin_dialog::DialogExt;

    let id = parse_id(&category_id, "category")?;

    let folder = app
        .dialog()
        .file()
        .set_title("Select Category Folder")
        .blocking_pick_folder();

    let mut session = lock_session(&state)?;
    match folder {
        Some(path) => {
            let path = PathBuf::from(path.to_string());
            log::info!("Category {} now points at {}", id, path.display());
            session.update(|tree| tree.set_category_folder(id, Some(path)));
        }
        None => log::debug!("Folder selection cancelled"),
    }
    Ok(session.view())
}

#[tauri::command]
pub fn clear_category_folder(
    state: State<AppState>,
    category_id: String,
) -> CommandResult<SessionView> {
    let id = parse_id(&category_id, "category")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.set_category_folder(id, None));
    Ok(session.view())
}
