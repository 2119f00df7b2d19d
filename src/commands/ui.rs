//! Tauri commands for the sidebar context menu and icon picker

use tauri::State;

use crate::tree::TreeTarget;
use crate::ui_state::UiState;
use crate::AppState;

use super::{lock_session, CommandResult};

#[tauri::command]
pub fn open_context_menu(
    state: State<AppState>,
    target: TreeTarget,
    x: f64,
    y: f64,
) -> CommandResult<UiState> {
    let mut session = lock_session(&state)?;
    session.ui_mut().open_context_menu(target, x, y);
    Ok(session.ui().clone())
}

#[tauri::command]
pub fn close_context_menu(state: State<AppState>) -> CommandResult<UiState> {
    let mut session = lock_session(&state)?;
    session.ui_mut().close_context_menu();
    Ok(session.ui().clone())
}

#[tauri::command]
pub fn open_icon_picker(state: State<AppState>, target: TreeTarget) -> CommandResult<UiState> {
    let mut session = lock_session(&state)?;
    session.ui_mut().open_icon_picker(target);
    Ok(session.ui().clone())
}

#[tauri::command]
pub fn close_icon_picker(state: State<AppState>) -> CommandResult<UiState> {
    let mut session = lock_session(&state)?;
    session.ui_mut().close_icon_picker();
    Ok(session.ui().clone())
}
