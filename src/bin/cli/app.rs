use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use sidenote_lib::config::AppConfig;
use sidenote_lib::storage::{Category, DocumentStore, FileStorage, Page};
use sidenote_lib::tree::DocumentTree;

/// Shared application state for CLI commands
pub struct App {
    pub storage: FileStorage,
    tree: DocumentTree,
}

impl App {
    /// Open the document from the configured data directory, or from
    /// `data_dir` when given
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let (mut config, warnings) = AppConfig::load();
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        config.apply_data_dir_override(data_dir.map(Path::to_path_buf));

        let path = config
            .document_path()
            .context("Failed to get data directory")?;
        Ok(Self::open(path))
    }

    pub fn open(path: PathBuf) -> Self {
        let storage = FileStorage::with_file(path);
        let tree = DocumentTree::bootstrap(storage.load());
        Self { storage, tree }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Replace the tree and write it out immediately
    pub fn commit(&mut self, tree: DocumentTree) -> Result<()> {
        self.tree = tree;
        self.storage
            .save(&self.tree.to_document())
            .with_context(|| format!("Failed to save {}", self.storage.path().display()))
    }

    /// Find a category by id or name (case-insensitive prefix match)
    pub fn find_category(&self, query: &str) -> Result<&Category> {
        if let Some(category) = Uuid::parse_str(query).ok().and_then(|id| self.tree.category(id)) {
            return Ok(category);
        }

        let query_lower = query.to_lowercase();
        let matches: Vec<&Category> = self
            .tree
            .categories()
            .iter()
            .filter(|c| c.name.to_lowercase().starts_with(&query_lower))
            .collect();
        let exact = matches.iter().any(|c| c.name.to_lowercase() == query_lower);

        if matches.len() > 1 && !exact {
            bail!(
                "Ambiguous category name '{}'. Matches:\n{}",
                query,
                matches.iter().map(|c| format!("  - {}", c.name)).collect::<Vec<_>>().join("\n")
            );
        }

        self.tree.find_category_by_name(query).with_context(|| {
            format!(
                "No category matching '{}'. Available categories:\n{}",
                query,
                self.tree
                    .categories()
                    .iter()
                    .map(|c| format!("  - {}", c.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        })
    }

    /// Find a page by id or title (case-insensitive prefix match)
    pub fn find_page(&self, query: &str) -> Result<&Page> {
        if let Some(page) = Uuid::parse_str(query).ok().and_then(|id| self.tree.page(id)) {
            return Ok(page);
        }

        let query_lower = query.to_lowercase();
        let matches: Vec<&Page> = self
            .tree
            .pages()
            .filter(|p| p.title.to_lowercase().starts_with(&query_lower))
            .collect();
        let exact = matches.iter().any(|p| p.title.to_lowercase() == query_lower);

        if matches.len() > 1 && !exact {
            bail!(
                "Ambiguous page title '{}'. Matches:\n{}",
                query,
                matches.iter().map(|p| format!("  - {}", p.title)).collect::<Vec<_>>().join("\n")
            );
        }

        self.tree
            .find_page_by_title(query)
            .with_context(|| format!("No page matching '{}'", query))
    }

    pub fn category_name(&self, category_id: Uuid) -> &str {
        self.tree
            .category(category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?")
    }
}
