use std::sync::{Arc, Mutex};

use tauri::Manager;

pub mod autosave;
mod commands;
pub mod config;
pub mod editor;
pub mod session;
pub mod storage;
pub mod tree;
pub mod ui_state;

use autosave::AutosaveController;
use config::AppConfig;
use session::Session;
use storage::DocumentStore;
use tree::DocumentTree;

pub struct AppState {
    pub session: Mutex<Session>,
    pub storage: Arc<dyn DocumentStore>,
    pub autosave: AutosaveController,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let (config, config_warnings) = AppConfig::load();
    let log_level = config.log_level_filter();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log_level)
                .build(),
        )
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            for warning in &config_warnings {
                log::warn!("{}", warning);
            }

            let storage = config.open_store();
            let (autosave, worker) =
                AutosaveController::new(Arc::clone(&storage), config.autosave_debounce());
            tauri::async_runtime::spawn(worker.run());

            let tree = DocumentTree::bootstrap(storage.load());
            let mut session = Session::new(tree, Some(autosave.clone()));
            session.finish_initial_load();

            app.manage(AppState {
                session: Mutex::new(session),
                storage,
                autosave,
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Document commands
            commands::load_document,
            commands::save_document,
            commands::get_tree,
            // Tree commands
            commands::create_page,
            commands::create_category,
            commands::delete_page,
            commands::delete_category,
            commands::rename_category,
            commands::set_page_title,
            commands::set_icon,
            commands::reorder_pages,
            commands::reorder_categories,
            commands::reparent_page,
            commands::move_page_to_category,
            commands::toggle_expanded,
            // Editor commands
            commands::set_active_page,
            commands::editor_content_changed,
            commands::editor_ready,
            // UI state commands
            commands::open_context_menu,
            commands::close_context_menu,
            commands::open_icon_picker,
            commands::close_icon_picker,
            // Folder commands
            commands::pick_category_folder,
            commands::clear_category_folder,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            if let tauri::RunEvent::Exit = event {
                if let Some(state) = app.try_state::<AppState>() {
                    // Write whatever is still waiting for its quiet period
                    tauri::async_runtime::block_on(state.autosave.flush());
                    state.autosave.shutdown();
                }
            }
        });
}
