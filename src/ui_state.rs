//! Sidebar UI state that used to live in ambient globals: which context
//! menu is open and what the icon picker is choosing an icon for.

use serde::{Deserialize, Serialize};

use crate::tree::{DocumentTree, TreeTarget};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenu {
    pub target: TreeTarget,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub context_menu: Option<ContextMenu>,
    pub icon_picker_target: Option<TreeTarget>,
}

impl UiState {
    pub fn open_context_menu(&mut self, target: TreeTarget, x: f64, y: f64) {
        self.context_menu = Some(ContextMenu { target, x, y });
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Opening the picker closes the context menu it was launched from
    pub fn open_icon_picker(&mut self, target: TreeTarget) {
        self.context_menu = None;
        self.icon_picker_target = Some(target);
    }

    /// Close the picker, returning what it was open for
    pub fn close_icon_picker(&mut self) -> Option<TreeTarget> {
        self.icon_picker_target.take()
    }

    /// Forget anything that points at a category or page no longer in the tree
    pub fn retain_existing(&mut self, tree: &DocumentTree) {
        let exists = |target: &TreeTarget| match target {
            TreeTarget::Category(id) => tree.category(*id).is_some(),
            TreeTarget::Page(id) => tree.page(*id).is_some(),
        };
        if self.context_menu.map_or(false, |m| !exists(&m.target)) {
            self.context_menu = None;
        }
        if self.icon_picker_target.map_or(false, |t| !exists(&t)) {
            self.icon_picker_target = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NewPage;

    #[test]
    fn test_picker_replaces_menu() {
        let mut ui = UiState::default();
        let target = TreeTarget::Page(uuid::Uuid::new_v4());

        ui.open_context_menu(target, 10.0, 20.0);
        assert_eq!(ui.context_menu.unwrap().x, 10.0);

        ui.open_icon_picker(target);
        assert!(ui.context_menu.is_none());
        assert_eq!(ui.close_icon_picker(), Some(target));
        assert_eq!(ui.close_icon_picker(), None);
    }

    #[test]
    fn test_retain_existing_drops_deleted_targets() {
        let tree = DocumentTree::default_tree();
        let category = tree.categories()[0].id;
        let tree = tree.create_page(category, NewPage::default()).unwrap();
        let doomed = tree.active_page_id();

        let mut ui = UiState::default();
        ui.open_context_menu(TreeTarget::Page(doomed), 0.0, 0.0);
        ui.icon_picker_target = Some(TreeTarget::Category(category));

        let tree = tree.delete_page(doomed).unwrap();
        ui.retain_existing(&tree);

        assert!(ui.context_menu.is_none());
        assert_eq!(ui.icon_picker_target, Some(TreeTarget::Category(category)));
    }
}
