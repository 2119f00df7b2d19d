use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DocumentTree, NewPage, Result, TreeError};

/// Requests an embedded widget makes of the tree owner.
///
/// A flow diagram node can stand for a page: adding such a node asks for
/// the page to exist, removing it asks for the page to go away.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WidgetCommand {
    #[serde(rename_all = "camelCase")]
    CreateLinkedPage {
        page_id: Uuid,
        title: String,
        /// Page hosting the widget; the new page is nested under it
        parent_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    DeleteLinkedPage { page_id: Uuid },
}

impl DocumentTree {
    /// Apply a widget request. Creating a linked page leaves the active page
    /// alone so the page hosting the widget stays in the editor.
    pub fn apply_widget_command(&self, command: &WidgetCommand) -> Result<Self> {
        match command {
            WidgetCommand::CreateLinkedPage {
                page_id,
                title,
                parent_id,
            } => {
                if self.page(*page_id).is_some() {
                    return Ok(self.clone());
                }
                if self.contains_id(*page_id) {
                    return Err(TreeError::DuplicateId(*page_id));
                }
                let opts = NewPage {
                    id: Some(*page_id),
                    ..NewPage::titled(title.clone())
                };
                self.add_linked_page(*parent_id, opts)
            }
            WidgetCommand::DeleteLinkedPage { page_id } => self.delete_page(*page_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_linked_page_keeps_active() {
        let tree = DocumentTree::default_tree();
        let host = tree.active_page_id();
        let linked = Uuid::new_v4();

        let next = tree
            .apply_widget_command(&WidgetCommand::CreateLinkedPage {
                page_id: linked,
                title: "Step 1".to_string(),
                parent_id: host,
            })
            .unwrap();

        assert_eq!(next.active_page_id(), host);
        let page = next.page(linked).unwrap();
        assert_eq!(page.parent_id, Some(host));
        assert_eq!(page.title, "Step 1");

        // Re-adding the same node is a no-op
        let again = next
            .apply_widget_command(&WidgetCommand::CreateLinkedPage {
                page_id: linked,
                title: "Step 1".to_string(),
                parent_id: host,
            })
            .unwrap();
        assert_eq!(again, next);
    }

    #[test]
    fn test_create_linked_page_rejects_category_id() {
        let tree = DocumentTree::default_tree();
        let category = tree.categories()[0].id;
        let result = tree.apply_widget_command(&WidgetCommand::CreateLinkedPage {
            page_id: category,
            title: "Clash".to_string(),
            parent_id: tree.active_page_id(),
        });
        assert_eq!(result, Err(TreeError::DuplicateId(category)));
    }

    #[test]
    fn test_delete_linked_page() {
        let tree = DocumentTree::default_tree();
        let host = tree.active_page_id();
        let linked = Uuid::new_v4();
        let created = tree
            .apply_widget_command(&WidgetCommand::CreateLinkedPage {
                page_id: linked,
                title: "Node".to_string(),
                parent_id: host,
            })
            .unwrap();
        assert_eq!(created.page_count(), 2);

        let next = created
            .apply_widget_command(&WidgetCommand::DeleteLinkedPage { page_id: linked })
            .unwrap();
        assert_eq!(next.page_count(), 1);
        assert_eq!(next.active_page_id(), host);
    }

    #[test]
    fn test_wire_format() {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(WidgetCommand::DeleteLinkedPage { page_id: id }).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "deleteLinkedPage", "pageId": id }));
    }
}
