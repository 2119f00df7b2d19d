use std::path::PathBuf;

use serde::Deserialize;
use uuid::Uuid;

use super::{DocumentTree, Result, TreeError, TreeTarget, UNTITLED};
use crate::storage::{Block, Category, Page};

/// Options for [`DocumentTree::create_page`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    /// Caller-chosen id (widgets that link to a page pick it up front)
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub parent_id: Option<Uuid>,
    pub icon: Option<String>,
}

impl NewPage {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn under(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Reorder `items` to follow `order`. Unknown or repeated ids are skipped;
/// items the order does not mention keep their relative order at the end.
fn apply_order<T>(mut items: Vec<T>, order: &[Uuid], id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut ordered = Vec::with_capacity(items.len());
    for id in order {
        match items.iter().position(|item| id_of(item) == *id) {
            Some(pos) => ordered.push(items.remove(pos)),
            None => log::warn!("Reorder: ignoring unknown id {}", id),
        }
    }
    if !items.is_empty() {
        log::warn!(
            "Reorder: {} item(s) missing from the new order, kept at the end",
            items.len()
        );
        ordered.extend(items);
    }
    ordered
}

impl DocumentTree {
    // ===== Page Operations =====

    /// Append a new page with one empty paragraph and make it active.
    /// No-op when the category does not exist.
    pub fn create_page(&self, category_id: Uuid, opts: NewPage) -> Result<Self> {
        let Some(ci) = self.category_index(category_id) else {
            log::debug!("create_page: category {} not found", category_id);
            return Ok(self.clone());
        };

        let page = self.build_page(ci, opts)?;
        let mut next = self.clone();
        next.active_page_id = page.id;
        next.insert_page(ci, page);
        Ok(next)
    }

    fn build_page(&self, ci: usize, opts: NewPage) -> Result<Page> {
        let category = &self.categories[ci];
        let mut page = Page::new(category.id, opts.title.unwrap_or_else(|| UNTITLED.to_string()));

        if let Some(id) = opts.id {
            if self.contains_id(id) {
                return Err(TreeError::DuplicateId(id));
            }
            page.id = id;
        }

        page.icon = opts.icon;
        page.parent_id = opts
            .parent_id
            .filter(|parent| category.pages.iter().any(|p| p.id == *parent));
        Ok(page)
    }

    fn insert_page(&mut self, ci: usize, page: Page) {
        if let Some(parent_id) = page.parent_id {
            if let Some(parent) = self.page_mut(parent_id) {
                parent.is_expanded = true;
            }
        }
        self.categories[ci].pages.push(page);
    }

    /// Remove a page. Its children move up to the removed page's parent.
    pub fn delete_page(&self, page_id: Uuid) -> Result<Self> {
        let Some((ci, pi)) = self.locate(page_id) else {
            return Ok(self.clone());
        };
        if self.page_count() <= 1 {
            return Err(TreeError::LastPage);
        }

        let mut next = self.clone();
        let removed = next.categories[ci].pages.remove(pi);
        for page in next.categories[ci].pages.iter_mut() {
            if page.parent_id == Some(page_id) {
                page.parent_id = removed.parent_id;
            }
        }

        if next.active_page_id == page_id {
            // Prefer the parent, then the neighbouring page, then anything.
            let neighbour = {
                let pages = &next.categories[ci].pages;
                pages.get(pi.saturating_sub(1)).or_else(|| pages.get(pi)).map(|p| p.id)
            };
            if let Some(id) = removed.parent_id.or(neighbour).or_else(|| next.first_page_id()) {
                next.active_page_id = id;
            }
        }

        Ok(next)
    }

    pub fn set_page_title(&self, page_id: Uuid, title: String) -> Self {
        let mut next = self.clone();
        if let Some(page) = next.page_mut(page_id) {
            page.title = title;
        }
        next
    }

    pub fn set_page_blocks(&self, page_id: Uuid, blocks: Vec<Block>) -> Self {
        let mut next = self.clone();
        if let Some(page) = next.page_mut(page_id) {
            page.blocks = blocks;
        }
        next
    }

    pub fn set_active_page(&self, page_id: Uuid) -> Self {
        let mut next = self.clone();
        if next.locate(page_id).is_some() {
            next.active_page_id = page_id;
        }
        next
    }

    /// Nest a page under another page, or lift it to the top level with
    /// `None`. Moving under a page of another category moves the whole
    /// subtree into that category.
    pub fn reparent_page(&self, page_id: Uuid, new_parent: Option<Uuid>) -> Result<Self> {
        if self.locate(page_id).is_none() {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        let Some(parent_id) = new_parent else {
            if let Some(page) = next.page_mut(page_id) {
                page.parent_id = None;
            }
            return Ok(next);
        };

        let Some((parent_ci, _)) = self.locate(parent_id) else {
            return Ok(next);
        };
        if parent_id == page_id || self.is_ancestor(page_id, parent_id) {
            return Err(TreeError::Cycle {
                page: page_id,
                parent: parent_id,
            });
        }

        next.move_subtree(page_id, parent_ci);
        if let Some(page) = next.page_mut(page_id) {
            page.parent_id = Some(parent_id);
        }
        if let Some(parent) = next.page_mut(parent_id) {
            parent.is_expanded = true;
        }
        Ok(next)
    }

    /// Move a page and everything below it to the end of another category
    pub fn move_page_to_category(&self, page_id: Uuid, category_id: Uuid) -> Self {
        let (Some((ci, _)), Some(target_ci)) =
            (self.locate(page_id), self.category_index(category_id))
        else {
            return self.clone();
        };
        if ci == target_ci {
            return self.clone();
        }

        let mut next = self.clone();
        next.move_subtree(page_id, target_ci);
        if let Some(page) = next.page_mut(page_id) {
            page.parent_id = None;
        }
        next
    }

    fn move_subtree(&mut self, page_id: Uuid, target_ci: usize) {
        let Some((ci, _)) = self.locate(page_id) else {
            return;
        };
        if ci == target_ci {
            return;
        }

        let mut ids = vec![page_id];
        ids.extend(self.descendants(page_id));

        let target_id = self.categories[target_ci].id;
        let source = std::mem::take(&mut self.categories[ci].pages);
        let (mut moved, kept): (Vec<Page>, Vec<Page>) =
            source.into_iter().partition(|p| ids.contains(&p.id));
        self.categories[ci].pages = kept;

        for page in moved.iter_mut() {
            page.category_id = target_id;
        }
        self.categories[target_ci].pages.extend(moved);
    }

    pub fn reorder_pages(&self, category_id: Uuid, page_ids: &[Uuid]) -> Self {
        let mut next = self.clone();
        if let Some(category) = next.category_mut(category_id) {
            let pages = std::mem::take(&mut category.pages);
            category.pages = apply_order(pages, page_ids, |p| p.id);
        }
        next
    }

    // ===== Category Operations =====

    /// Append an empty category, returning the new tree and its id
    pub fn create_category(&self, name: Option<String>) -> (Self, Uuid) {
        let category = Category::new(name.unwrap_or_else(|| UNTITLED.to_string()));
        let id = category.id;
        let mut next = self.clone();
        next.categories.push(category);
        (next, id)
    }

    /// Remove a category with all of its pages
    pub fn delete_category(&self, category_id: Uuid) -> Result<Self> {
        let Some(ci) = self.category_index(category_id) else {
            return Ok(self.clone());
        };
        if self.categories.len() <= 1 {
            return Err(TreeError::LastCategory);
        }
        if self.categories[ci].pages.len() == self.page_count() {
            return Err(TreeError::LastPage);
        }

        let mut next = self.clone();
        let removed = next.categories.remove(ci);
        if removed.pages.iter().any(|p| p.id == next.active_page_id) {
            if let Some(id) = next.first_page_id() {
                next.active_page_id = id;
            }
        }
        Ok(next)
    }

    pub fn rename_category(&self, category_id: Uuid, name: String) -> Self {
        let mut next = self.clone();
        if let Some(category) = next.category_mut(category_id) {
            category.name = name;
        }
        next
    }

    /// Record the advisory folder for a category
    pub fn set_category_folder(&self, category_id: Uuid, folder: Option<PathBuf>) -> Self {
        let mut next = self.clone();
        if let Some(category) = next.category_mut(category_id) {
            category.folder_path = folder;
        }
        next
    }

    pub fn reorder_categories(&self, category_ids: &[Uuid]) -> Self {
        let mut next = self.clone();
        let categories = std::mem::take(&mut next.categories);
        next.categories = apply_order(categories, category_ids, |c| c.id);
        next
    }

    // ===== Shared =====

    pub fn set_icon(&self, target: TreeTarget, icon: Option<String>) -> Self {
        let mut next = self.clone();
        match target {
            TreeTarget::Category(id) => {
                if let Some(category) = next.category_mut(id) {
                    category.icon = icon;
                }
            }
            TreeTarget::Page(id) => {
                if let Some(page) = next.page_mut(id) {
                    page.icon = icon;
                }
            }
        }
        next
    }

    /// Flip the sidebar expansion flag. Has no effect on content.
    pub fn toggle_expanded(&self, target: TreeTarget) -> Self {
        let mut next = self.clone();
        match target {
            TreeTarget::Category(id) => {
                if let Some(category) = next.category_mut(id) {
                    category.is_expanded = !category.is_expanded;
                }
            }
            TreeTarget::Page(id) => {
                if let Some(page) = next.page_mut(id) {
                    page.is_expanded = !page.is_expanded;
                }
            }
        }
        next
    }

    /// Add a page without changing the active page
    pub(super) fn add_linked_page(&self, parent_id: Uuid, opts: NewPage) -> Result<Self> {
        let Some((ci, _)) = self.locate(parent_id) else {
            return Ok(self.clone());
        };
        let page = self.build_page(ci, opts.under(parent_id))?;
        let mut next = self.clone();
        next.insert_page(ci, page);
        Ok(next)
    }
}
