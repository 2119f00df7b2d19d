use uuid::Uuid;

use super::sanitize::sanitize_blocks;
use super::widgets::linked_page_commands;
use crate::storage::Block;
use crate::tree::{DocumentTree, WidgetCommand};

/// The external block editor as seen from the tree side
pub trait BlockEditor {
    /// Discard the current document and show `blocks` instead
    fn replace_blocks(&mut self, blocks: Vec<Block>);

    /// The editor's current document
    fn blocks(&self) -> Vec<Block>;
}

/// Last known content of the webview editor.
///
/// The frontend pushes its document on every change; replacements made from
/// this side bump `revision` and travel back in the command response.
#[derive(Debug, Clone, Default)]
pub struct EditorMirror {
    blocks: Vec<Block>,
    revision: u64,
}

impl EditorMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record content reported by the webview
    pub fn set_from_editor(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
    }

    /// Incremented on every replacement pushed to the editor
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl BlockEditor for EditorMirror {
    fn replace_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.revision += 1;
    }

    fn blocks(&self) -> Vec<Block> {
        self.blocks.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    /// Initial document load in flight; both triggers are ignored
    Loading,
    Ready,
}

/// Result of capturing editor content into the tree
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub tree: DocumentTree,
    /// Requests raised by widgets in the captured content
    pub commands: Vec<WidgetCommand>,
}

/// Keeps the editor showing the active page and the active page holding
/// what the editor shows.
#[derive(Debug, Clone)]
pub struct EditorBinding {
    state: BindingState,
    loaded_page: Option<Uuid>,
}

impl Default for EditorBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorBinding {
    pub fn new() -> Self {
        Self {
            state: BindingState::Loading,
            loaded_page: None,
        }
    }

    fn is_loading(&self) -> bool {
        self.state == BindingState::Loading
    }

    /// Page whose content the editor currently holds
    pub fn loaded_page(&self) -> Option<Uuid> {
        self.loaded_page
    }

    /// End the loading phase and show the active page
    pub fn finish_initial_load(&mut self, tree: &DocumentTree, editor: &mut impl BlockEditor) {
        self.state = BindingState::Ready;
        self.load_active(tree, editor);
    }

    /// Replace the editor content with the active page. Returns whether the
    /// editor was touched.
    pub fn on_active_page_changed(&mut self, tree: &DocumentTree, editor: &mut impl BlockEditor) -> bool {
        if self.is_loading() {
            return false;
        }
        self.load_active(tree, editor);
        true
    }

    fn load_active(&mut self, tree: &DocumentTree, editor: &mut impl BlockEditor) {
        let blocks = match tree.active_page() {
            Some(page) => sanitize_blocks(&page.blocks),
            None => vec![Block::paragraph()],
        };
        editor.replace_blocks(blocks);
        self.loaded_page = Some(tree.active_page_id());
    }

    /// Whether content the editor reports for `page_id` may be written
    /// into the tree: loading is over, the editor was last loaded with that
    /// page and it is still the active one.
    pub fn accepts_content_for(&self, tree: &DocumentTree, page_id: Uuid) -> bool {
        !self.is_loading() && self.loaded_page == Some(page_id) && tree.active_page_id() == page_id
    }

    /// Copy the editor content, reported for `source_page`, into the active
    /// page. Last writer wins.
    ///
    /// Returns `None` while loading, or when the content belongs to another
    /// page than the one the editor and the tree currently agree on.
    pub fn on_editor_changed(
        &mut self,
        tree: &DocumentTree,
        editor: &impl BlockEditor,
        source_page: Uuid,
    ) -> Option<CaptureOutcome> {
        if !self.accepts_content_for(tree, source_page) {
            log::debug!("Editor content for page {} is stale, ignored", source_page);
            return None;
        }
        let page_id = source_page;

        let blocks = editor.blocks();
        let commands = match tree.page(page_id) {
            Some(page) => linked_page_commands(&page.blocks, &blocks, page_id),
            None => Vec::new(),
        };

        Some(CaptureOutcome {
            tree: tree.set_page_blocks(page_id, blocks),
            commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::widgets::WIDGET_STATE_PROP;
    use crate::storage::{Category, Document, Page};
    use crate::tree::NewPage;
    use serde_json::{json, Value};

    fn ready_binding(tree: &DocumentTree, editor: &mut EditorMirror) -> EditorBinding {
        let mut binding = EditorBinding::new();
        binding.finish_initial_load(tree, editor);
        binding
    }

    #[test]
    fn test_loading_ignores_triggers() {
        let tree = DocumentTree::default_tree();
        let mut editor = EditorMirror::new();
        let mut binding = EditorBinding::new();

        assert!(!binding.on_active_page_changed(&tree, &mut editor));
        assert_eq!(editor.revision(), 0);
        assert!(binding.on_editor_changed(&tree, &editor, tree.active_page_id()).is_none());
    }

    #[test]
    fn test_empty_or_absent_blocks_load_default_paragraph() {
        let mut category = Category::new("Default".to_string());
        let mut page = Page::new(category.id, "Empty".to_string());
        page.blocks.clear();
        category.pages.push(page);
        let tree = DocumentTree::bootstrap(Some(Document::new(vec![category])));

        let mut editor = EditorMirror::new();
        ready_binding(&tree, &mut editor);
        assert_eq!(
            serde_json::to_value(editor.blocks()).unwrap(),
            json!([{ "type": "paragraph", "content": "" }])
        );

        // Absent field in the stored JSON behaves the same
        let category_id = uuid::Uuid::new_v4();
        let raw = json!([{
            "id": category_id, "name": "C", "isExpanded": true,
            "pages": [{ "id": uuid::Uuid::new_v4(), "title": "No blocks", "categoryId": category_id }]
        }]);
        let doc: Document = serde_json::from_value(raw).unwrap();
        let tree = DocumentTree::bootstrap(Some(doc));
        let mut editor = EditorMirror::new();
        ready_binding(&tree, &mut editor);
        assert_eq!(editor.blocks(), vec![Block::paragraph()]);
    }

    #[test]
    fn test_active_change_replaces_content() {
        let tree = DocumentTree::default_tree();
        let category = tree.categories()[0].id;
        let first = tree.active_page_id();
        let mut heading = Block::new("heading");
        heading.content = Some(Value::String("First".to_string()));
        let tree = tree.set_page_blocks(first, vec![heading.clone()]);

        let mut editor = EditorMirror::new();
        let mut binding = ready_binding(&tree, &mut editor);
        assert_eq!(editor.blocks(), vec![heading.clone()]);

        let tree = tree.create_page(category, NewPage::titled("Second")).unwrap();
        assert!(binding.on_active_page_changed(&tree, &mut editor));
        assert_eq!(editor.blocks(), vec![Block::paragraph()]);
        assert_eq!(binding.loaded_page(), Some(tree.active_page_id()));

        let tree = tree.set_active_page(first);
        binding.on_active_page_changed(&tree, &mut editor);
        assert_eq!(editor.blocks(), vec![heading]);
        assert_eq!(editor.revision(), 3);
    }

    #[test]
    fn test_capture_writes_active_page_only() {
        let tree = DocumentTree::default_tree();
        let category = tree.categories()[0].id;
        let first = tree.active_page_id();
        let tree = tree.create_page(category, NewPage::titled("Second")).unwrap();
        let second = tree.active_page_id();

        let mut editor = EditorMirror::new();
        let mut binding = ready_binding(&tree, &mut editor);

        let mut typed = Block::paragraph();
        typed.content = Some(Value::String("typed".to_string()));
        editor.set_from_editor(vec![typed.clone()]);

        let outcome = binding.on_editor_changed(&tree, &editor, second).unwrap();
        assert_eq!(outcome.tree.page(second).unwrap().blocks, vec![typed]);
        assert_eq!(outcome.tree.page(first).unwrap().blocks, vec![Block::paragraph()]);
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn test_capture_ignored_for_stale_page() {
        let tree = DocumentTree::default_tree();
        let category = tree.categories()[0].id;
        let mut editor = EditorMirror::new();
        let mut binding = ready_binding(&tree, &mut editor);
        let first = tree.active_page_id();

        // Active page switched without reloading the editor
        let tree = tree.create_page(category, NewPage::default()).unwrap();
        let second = tree.active_page_id();
        assert!(binding.on_editor_changed(&tree, &editor, first).is_none());
        assert!(binding.on_editor_changed(&tree, &editor, second).is_none());

        // Reloaded: only content reported for the new page is taken
        binding.on_active_page_changed(&tree, &mut editor);
        assert!(!binding.accepts_content_for(&tree, first));
        assert!(binding.on_editor_changed(&tree, &editor, first).is_none());
        assert!(binding.on_editor_changed(&tree, &editor, second).is_some());
    }

    #[test]
    fn test_capture_reports_flow_links() {
        let tree = DocumentTree::default_tree();
        let host = tree.active_page_id();
        let mut editor = EditorMirror::new();
        let mut binding = ready_binding(&tree, &mut editor);

        let linked = uuid::Uuid::new_v4();
        let mut flow = Block::new("flow");
        let state = json!({ "nodes": [{ "id": "n1", "label": "Next", "pageId": linked }] });
        flow.set_prop(WIDGET_STATE_PROP, Value::String(state.to_string()));
        editor.set_from_editor(vec![flow]);

        let outcome = binding.on_editor_changed(&tree, &editor, host).unwrap();
        assert_eq!(
            outcome.commands,
            vec![WidgetCommand::CreateLinkedPage {
                page_id: linked,
                title: "Next".to_string(),
                parent_id: host,
            }]
        );
    }
}
