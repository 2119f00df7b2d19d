//! In-memory document tree: categories owning ordered pages, pages nested
//! through parent references.
//!
//! `DocumentTree` is a value. Every mutation in [`ops`] takes `&self` and
//! returns the next snapshot, so the caller decides when a snapshot becomes
//! current and what gets handed to autosave.

mod commands;
mod ops;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{Category, Document, Page};

pub use commands::WidgetCommand;
pub use ops::NewPage;

pub const DEFAULT_CATEGORY_NAME: &str = "Default";
pub const WELCOME_PAGE_TITLE: &str = "Welcome";
pub const UNTITLED: &str = "Untitled";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Cannot delete the last page")]
    LastPage,

    #[error("Cannot delete the last category")]
    LastCategory,

    #[error("Cannot move page {page} under its own descendant {parent}")]
    Cycle { page: Uuid, parent: Uuid },

    #[error("Identifier already in use: {0}")]
    DuplicateId(Uuid),
}

pub type Result<T> = std::result::Result<T, TreeError>;

/// A category or a page, addressed by id
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum TreeTarget {
    Category(Uuid),
    Page(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree {
    categories: Vec<Category>,
    active_page_id: Uuid,
}

impl DocumentTree {
    /// A single "Default" category holding a single "Welcome" page
    pub fn default_tree() -> Self {
        let mut category = Category::new(DEFAULT_CATEGORY_NAME.to_string());
        let page = Page::new(category.id, WELCOME_PAGE_TITLE.to_string());
        let active_page_id = page.id;
        category.pages.push(page);
        Self {
            categories: vec![category],
            active_page_id,
        }
    }

    /// Build the live tree from whatever the persistence layer returned.
    ///
    /// An empty load yields the default tree. Loaded data is repaired so the
    /// tree invariants hold: ids unique, `categoryId` matching the owner,
    /// parents inside the same category and acyclic, at least one page.
    pub fn bootstrap(loaded: Option<Document>) -> Self {
        let categories = loaded.map(|d| d.categories).unwrap_or_default();
        if categories.is_empty() {
            log::info!("No stored categories, creating default tree");
            return Self::default_tree();
        }

        let mut tree = Self {
            categories,
            active_page_id: Uuid::nil(),
        };
        tree.repair();
        tree
    }

    fn repair(&mut self) {
        let mut seen = HashSet::new();
        for category in self.categories.iter_mut() {
            if !seen.insert(category.id) {
                let fresh = Uuid::new_v4();
                log::warn!("Duplicate category id {}, re-keyed to {}", category.id, fresh);
                category.id = fresh;
                seen.insert(fresh);
            }
            for page in category.pages.iter_mut() {
                if !seen.insert(page.id) {
                    let fresh = Uuid::new_v4();
                    log::warn!("Duplicate page id {}, re-keyed to {}", page.id, fresh);
                    page.id = fresh;
                    seen.insert(fresh);
                }
                page.category_id = category.id;
            }
        }

        for category in self.categories.iter_mut() {
            let members: HashSet<Uuid> = category.pages.iter().map(|p| p.id).collect();
            let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::new();

            for page in category.pages.iter_mut() {
                if let Some(parent) = page.parent_id {
                    if parent == page.id || !members.contains(&parent) {
                        log::warn!("Page {} had an invalid parent {}, cleared", page.id, parent);
                        page.parent_id = None;
                    }
                }
                parents.insert(page.id, page.parent_id);
            }

            for page in category.pages.iter_mut() {
                let mut current = parents.get(&page.id).copied().flatten();
                let mut steps = 0;
                while let Some(id) = current {
                    if id == page.id {
                        log::warn!("Page {} was part of a parent cycle, detached", page.id);
                        page.parent_id = None;
                        parents.insert(page.id, None);
                        break;
                    }
                    steps += 1;
                    if steps > members.len() {
                        break;
                    }
                    current = parents.get(&id).copied().flatten();
                }
            }
        }

        if self.page_count() == 0 {
            if let Some(category) = self.categories.first_mut() {
                category
                    .pages
                    .push(Page::new(category.id, WELCOME_PAGE_TITLE.to_string()));
            }
        }

        if let Some(id) = self.first_page_id() {
            self.active_page_id = id;
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn active_page_id(&self) -> Uuid {
        self.active_page_id
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.page(self.active_page_id)
    }

    pub fn category(&self, category_id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn page(&self, page_id: Uuid) -> Option<&Page> {
        self.pages().find(|p| p.id == page_id)
    }

    /// Every page, in category order then page order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.categories.iter().flat_map(|c| c.pages.iter())
    }

    pub fn page_count(&self) -> usize {
        self.categories.iter().map(|c| c.pages.len()).sum()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Direct children of a page
    pub fn children(&self, page_id: Uuid) -> Vec<&Page> {
        self.pages()
            .filter(|p| p.parent_id == Some(page_id))
            .collect()
    }

    /// Pages of a category that have no parent
    pub fn root_pages(&self, category_id: Uuid) -> Vec<&Page> {
        self.category(category_id)
            .map(|c| c.pages.iter().filter(|p| p.parent_id.is_none()).collect())
            .unwrap_or_default()
    }

    /// All pages below `page_id`, breadth first
    pub fn descendants(&self, page_id: Uuid) -> Vec<Uuid> {
        let mut found = Vec::new();
        let mut frontier = vec![page_id];
        while let Some(current) = frontier.pop() {
            for child in self.children(current) {
                if child.id != page_id && !found.contains(&child.id) {
                    found.push(child.id);
                    frontier.push(child.id);
                }
            }
        }
        found
    }

    /// Whether `ancestor` appears on the parent chain of `page_id`
    pub fn is_ancestor(&self, ancestor: Uuid, page_id: Uuid) -> bool {
        let mut current = self.page(page_id).and_then(|p| p.parent_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.page_count() {
                break;
            }
            current = self.page(id).and_then(|p| p.parent_id);
        }
        false
    }

    /// Whether any category or page already uses `id`
    pub fn contains_id(&self, id: Uuid) -> bool {
        self.categories
            .iter()
            .any(|c| c.id == id || c.pages.iter().any(|p| p.id == id))
    }

    /// Case-insensitive lookup: exact name first, then prefix
    pub fn find_category_by_name(&self, name: &str) -> Option<&Category> {
        let needle = name.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.to_lowercase().starts_with(&needle))
            })
    }

    /// Case-insensitive lookup: exact title first, then prefix
    pub fn find_page_by_title(&self, title: &str) -> Option<&Page> {
        let needle = title.to_lowercase();
        self.pages()
            .find(|p| p.title.to_lowercase() == needle)
            .or_else(|| self.pages().find(|p| p.title.to_lowercase().starts_with(&needle)))
    }

    pub fn to_document(&self) -> Document {
        Document::new(self.categories.clone())
    }

    fn first_page_id(&self) -> Option<Uuid> {
        self.pages().next().map(|p| p.id)
    }

    fn category_index(&self, category_id: Uuid) -> Option<usize> {
        self.categories.iter().position(|c| c.id == category_id)
    }

    /// (category index, page index) of a page
    fn locate(&self, page_id: Uuid) -> Option<(usize, usize)> {
        self.categories.iter().enumerate().find_map(|(ci, c)| {
            c.pages
                .iter()
                .position(|p| p.id == page_id)
                .map(|pi| (ci, pi))
        })
    }

    fn page_mut(&mut self, page_id: Uuid) -> Option<&mut Page> {
        self.categories
            .iter_mut()
            .flat_map(|c| c.pages.iter_mut())
            .find(|p| p.id == page_id)
    }

    fn category_mut(&mut self, category_id: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == category_id)
    }
}
