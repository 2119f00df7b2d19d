//! Tauri commands for sidebar tree mutations.
//!
//! Every command answers with the full session view so the frontend can
//! re-render the sidebar and, when the revision moved, the editor.

use tauri::State;

use crate::session::SessionView;
use crate::tree::{NewPage, TreeTarget};
use crate::AppState;

use super::{lock_session, parse_id, parse_ids, CommandResult};

#[tauri::command]
pub fn create_page(
    state: State<AppState>,
    category_id: String,
    title: Option<String>,
    parent_id: Option<String>,
    icon: Option<String>,
) -> CommandResult<SessionView> {
    let cat_id = parse_id(&category_id, "category")?;
    let parent = parent_id
        .map(|id| parse_id(&id, "parent page"))
        .transpose()?;

    let opts = NewPage {
        title,
        parent_id: parent,
        icon,
        ..NewPage::default()
    };

    let mut session = lock_session(&state)?;
    session.apply(|tree| tree.create_page(cat_id, opts))?;
    Ok(session.view())
}

#[tauri::command]
pub fn create_category(state: State<AppState>, name: Option<String>) -> CommandResult<SessionView> {
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.create_category(name).0);
    Ok(session.view())
}

#[tauri::command]
pub fn delete_page(state: State<AppState>, page_id: String) -> CommandResult<SessionView> {
    let id = parse_id(&page_id, "page")?;
    let mut session = lock_session(&state)?;
    session.apply(|tree| tree.delete_page(id))?;
    Ok(session.view())
}

#[tauri::command]
pub fn delete_category(state: State<AppState>, category_id: String) -> CommandResult<SessionView> {
    let id = parse_id(&category_id, "category")?;
    let mut session = lock_session(&state)?;
    session.apply(|tree| tree.delete_category(id))?;
    Ok(session.view())
}

#[tauri::command]
pub fn rename_category(
    state: State<AppState>,
    category_id: String,
    name: String,
) -> CommandResult<SessionView> {
    let id = parse_id(&category_id, "category")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.rename_category(id, name));
    Ok(session.view())
}

#[tauri::command]
pub fn set_page_title(
    state: State<AppState>,
    page_id: String,
    title: String,
) -> CommandResult<SessionView> {
    let id = parse_id(&page_id, "page")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.set_page_title(id, title));
    Ok(session.view())
}

/// Set or clear an icon; closes the icon picker if it was open for `target`
#[tauri::command]
pub fn set_icon(
    state: State<AppState>,
    target: TreeTarget,
    icon: Option<String>,
) -> CommandResult<SessionView> {
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.set_icon(target, icon));
    if session.ui().icon_picker_target == Some(target) {
        session.ui_mut().close_icon_picker();
    }
    Ok(session.view())
}

#[tauri::command]
pub fn reorder_pages(
    state: State<AppState>,
    category_id: String,
    page_ids: Vec<String>,
) -> CommandResult<SessionView> {
    let cat_id = parse_id(&category_id, "category")?;
    let order = parse_ids(&page_ids, "page")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.reorder_pages(cat_id, &order));
    Ok(session.view())
}

#[tauri::command]
pub fn reorder_categories(
    state: State<AppState>,
    category_ids: Vec<String>,
) -> CommandResult<SessionView> {
    let order = parse_ids(&category_ids, "category")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.reorder_categories(&order));
    Ok(session.view())
}

/// Move a page under another page, or to the top level when `parent_id`
/// is absent
#[tauri::command]
pub fn reparent_page(
    state: State<AppState>,
    page_id: String,
    parent_id: Option<String>,
) -> CommandResult<SessionView> {
    let id = parse_id(&page_id, "page")?;
    let parent = parent_id
        .map(|p| parse_id(&p, "parent page"))
        .transpose()?;
    let mut session = lock_session(&state)?;
    session.apply(|tree| tree.reparent_page(id, parent))?;
    Ok(session.view())
}

#[tauri::command]
pub fn move_page_to_category(
    state: State<AppState>,
    page_id: String,
    category_id: String,
) -> CommandResult<SessionView> {
    let id = parse_id(&page_id, "page")?;
    let cat_id = parse_id(&category_id, "category")?;
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.move_page_to_category(id, cat_id));
    Ok(session.view())
}

#[tauri::command]
pub fn toggle_expanded(state: State<AppState>, target: TreeTarget) -> CommandResult<SessionView> {
    let mut session = lock_session(&state)?;
    session.update(|tree| tree.toggle_expanded(target));
    Ok(session.view())
}
