//! The live document: one owner for the tree, the editor it is bound to,
//! the sidebar UI state and the autosave handle.
//!
//! Every accepted mutation goes through [`Session::commit`], which reloads
//! the editor when the active page moved and hands a snapshot to autosave.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::autosave::AutosaveController;
use crate::editor::{sanitize_values, BlockEditor, EditorBinding, EditorMirror};
use crate::storage::{Block, Category, Document};
use crate::tree::{self, DocumentTree};
use crate::ui_state::UiState;

/// What the editor should be showing
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub page_id: Option<Uuid>,
    pub blocks: Vec<Block>,
    /// Changes only when content was pushed from this side
    pub revision: u64,
}

/// Everything the frontend renders after a command
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub categories: Vec<Category>,
    pub active_page_id: Uuid,
    pub editor: EditorView,
    pub ui: UiState,
}

pub struct Session {
    tree: DocumentTree,
    binding: EditorBinding,
    editor: EditorMirror,
    ui: UiState,
    autosave: Option<AutosaveController>,
}

impl Session {
    pub fn new(tree: DocumentTree, autosave: Option<AutosaveController>) -> Self {
        Self {
            tree,
            binding: EditorBinding::new(),
            editor: EditorMirror::new(),
            ui: UiState::default(),
            autosave,
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    /// Show the active page and start accepting saves
    pub fn finish_initial_load(&mut self) {
        self.binding.finish_initial_load(&self.tree, &mut self.editor);
        if let Some(autosave) = &self.autosave {
            autosave.mark_loaded();
        }
        log::info!(
            "Session ready: {} categories, {} pages",
            self.tree.category_count(),
            self.tree.page_count()
        );
    }

    /// Apply a mutation that may be refused
    pub fn apply<F>(&mut self, op: F) -> tree::Result<()>
    where
        F: FnOnce(&DocumentTree) -> tree::Result<DocumentTree>,
    {
        let next = op(&self.tree)?;
        self.commit(next);
        Ok(())
    }

    /// Apply a mutation that always succeeds
    pub fn update<F>(&mut self, op: F)
    where
        F: FnOnce(&DocumentTree) -> DocumentTree,
    {
        let next = op(&self.tree);
        self.commit(next);
    }

    /// Install a new snapshot. Unchanged snapshots are dropped.
    pub fn commit(&mut self, next: DocumentTree) {
        if next == self.tree {
            return;
        }
        let active_changed = next.active_page_id() != self.tree.active_page_id();
        self.tree = next;
        self.ui.retain_existing(&self.tree);

        if active_changed {
            self.binding.on_active_page_changed(&self.tree, &mut self.editor);
        }
        self.schedule_save();
    }

    /// Swap in a tree that came from outside (a reload or a pushed
    /// document) without scheduling a save
    pub fn replace_tree(&mut self, tree: DocumentTree) {
        self.tree = tree;
        self.ui.retain_existing(&self.tree);
        self.binding.on_active_page_changed(&self.tree, &mut self.editor);
    }

    pub fn schedule_save(&self) {
        if let Some(autosave) = &self.autosave {
            autosave.notify(self.tree.to_document());
        }
    }

    /// Take content reported by the editor.
    ///
    /// `page_id` is the page the editor was showing when it produced the
    /// content. Returns false when the content was not captured (still
    /// loading, or that page is no longer the one loaded and active); the
    /// mirror is left as it was. Widget requests raised by the new content
    /// are applied one by one; refused ones are logged and skipped.
    pub fn editor_changed(&mut self, page_id: Uuid, blocks: Vec<Value>) -> bool {
        if !self.binding.accepts_content_for(&self.tree, page_id) {
            log::debug!("Dropped editor content for page {}", page_id);
            return false;
        }
        self.editor.set_from_editor(sanitize_values(blocks));

        let Some(outcome) = self.binding.on_editor_changed(&self.tree, &self.editor, page_id) else {
            return false;
        };

        let mut next = outcome.tree;
        for command in &outcome.commands {
            match next.apply_widget_command(command) {
                Ok(applied) => next = applied,
                Err(e) => log::warn!("Widget command {:?} refused: {}", command, e),
            }
        }
        self.commit(next);
        true
    }

    pub fn to_document(&self) -> Document {
        self.tree.to_document()
    }

    pub fn editor_view(&self) -> EditorView {
        EditorView {
            page_id: self.binding.loaded_page(),
            blocks: self.editor.blocks(),
            revision: self.editor.revision(),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            categories: self.tree.categories().to_vec(),
            active_page_id: self.tree.active_page_id(),
            editor: self.editor_view(),
            ui: self.ui.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NewPage, TreeError, TreeTarget};
    use serde_json::json;

    fn ready_session() -> Session {
        let mut session = Session::new(DocumentTree::default_tree(), None);
        session.finish_initial_load();
        session
    }

    #[test]
    fn test_active_change_reloads_editor() {
        let mut session = ready_session();
        let category = session.tree().categories()[0].id;
        let welcome = session.tree().active_page_id();
        assert_eq!(session.editor_view().revision, 1);

        session
            .apply(|t| t.create_page(category, NewPage::titled("Second")))
            .unwrap();
        let view = session.editor_view();
        assert_eq!(view.revision, 2);
        assert_eq!(view.page_id, Some(session.tree().active_page_id()));

        // Title change keeps the editor untouched
        session.update(|t| t.set_page_title(welcome, "Renamed".to_string()));
        assert_eq!(session.editor_view().revision, 2);
    }

    #[test]
    fn test_refused_mutation_leaves_tree() {
        let mut session = ready_session();
        let before = session.tree().clone();
        let only = before.active_page_id();

        assert_eq!(session.apply(|t| t.delete_page(only)), Err(TreeError::LastPage));
        assert_eq!(session.tree(), &before);
    }

    #[test]
    fn test_editor_content_lands_in_active_page() {
        let mut session = ready_session();
        let active = session.tree().active_page_id();

        let captured = session.editor_changed(active, vec![
            json!({ "type": "heading", "content": "Notes" }),
            json!("not a block"),
        ]);

        assert!(captured);
        let blocks = &session.tree().page(active).unwrap().blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type, "heading");
    }

    #[test]
    fn test_late_content_for_previous_page_is_dropped() {
        let mut session = ready_session();
        let category = session.tree().categories()[0].id;
        let first = session.tree().active_page_id();
        let first_blocks = session.tree().page(first).unwrap().blocks.clone();

        session
            .apply(|t| t.create_page(category, NewPage::titled("Second")))
            .unwrap();
        let second = session.tree().active_page_id();
        let second_blocks = session.tree().page(second).unwrap().blocks.clone();
        let shown = session.editor_view();

        // Content typed on the first page arrives after the switch
        let late = vec![json!({ "type": "paragraph", "content": "meant for first" })];
        assert!(!session.editor_changed(first, late));

        assert_eq!(session.tree().page(second).unwrap().blocks, second_blocks);
        assert_eq!(session.tree().page(first).unwrap().blocks, first_blocks);
        assert_eq!(session.editor_view(), shown);

        // Content for the page now shown still lands
        let fresh = vec![json!({ "type": "paragraph", "content": "second page" })];
        assert!(session.editor_changed(second, fresh));
        let blocks = &session.tree().page(second).unwrap().blocks;
        assert_eq!(blocks[0].content, Some(json!("second page")));
    }

    #[test]
    fn test_editor_changes_ignored_while_loading() {
        let mut session = Session::new(DocumentTree::default_tree(), None);
        let before = session.tree().clone();
        let active = before.active_page_id();
        assert!(!session.editor_changed(active, vec![json!({ "type": "heading" })]));
        assert_eq!(session.tree(), &before);
    }

    #[test]
    fn test_flow_node_creates_and_removes_linked_page() {
        let mut session = ready_session();
        let host = session.tree().active_page_id();
        let linked = Uuid::new_v4();

        let state = json!({ "nodes": [{ "id": "n1", "label": "Details", "pageId": linked }] });
        let flow = json!({ "type": "flow", "props": { "data": state.to_string() } });
        assert!(session.editor_changed(host, vec![flow]));

        let page = session.tree().page(linked).unwrap();
        assert_eq!(page.title, "Details");
        assert_eq!(page.parent_id, Some(host));
        assert_eq!(session.tree().active_page_id(), host);

        let empty = json!({ "type": "flow", "props": { "data": r#"{"nodes":[]}"# } });
        assert!(session.editor_changed(host, vec![empty]));
        assert!(session.tree().page(linked).is_none());
    }

    #[test]
    fn test_deleting_menu_target_closes_menu() {
        let mut session = ready_session();
        let category = session.tree().categories()[0].id;
        session
            .apply(|t| t.create_page(category, NewPage::default()))
            .unwrap();
        let page = session.tree().active_page_id();

        session.ui_mut().open_context_menu(TreeTarget::Page(page), 4.0, 8.0);
        session.apply(|t| t.delete_page(page)).unwrap();
        assert!(session.ui().context_menu.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_commits_reach_autosave() {
        use crate::autosave::DEFAULT_DEBOUNCE;
        use crate::storage::LocalKeyStorage;
        use std::sync::Arc;

        let store = Arc::new(LocalKeyStorage::new());
        let (autosave, worker) = AutosaveController::new(store.clone(), DEFAULT_DEBOUNCE);
        tokio::spawn(worker.run());

        let mut session = Session::new(DocumentTree::default_tree(), Some(autosave.clone()));
        session.finish_initial_load();
        let category = session.tree().categories()[0].id;
        session
            .apply(|t| t.create_page(category, NewPage::titled("Saved")))
            .unwrap();

        autosave.flush().await;
        assert_eq!(store.last_saved(), Some(session.to_document()));
    }
}
