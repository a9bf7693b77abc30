//! Application state and command dispatch for the `topics` binary

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::catalog::{Catalog, SearchQuery};
use crate::core::config::IndexConfig;
use crate::core::document::TopicDocument;
use crate::core::file_system::{scan, Scan};
use crate::render;

/// Output format for `topics scan`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Tree,
    Json,
}

/// Main application state
pub struct TopicsApp {
    /// Loaded configuration
    pub config: IndexConfig,
    /// Where the configuration is persisted, if anywhere
    pub config_path: Option<PathBuf>,
}

impl TopicsApp {
    /// Create an app from the config at `config_path`, or the default location
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.or_else(IndexConfig::config_path);
        let config = match &config_path {
            Some(path) => IndexConfig::load_from(path)?,
            None => IndexConfig::default(),
        };
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Create an app with an in-memory configuration that is never saved
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Scan a root and remember it as recently used
    pub fn open_root(&mut self, root: Option<PathBuf>) -> Result<Scan> {
        let root = self.config.resolve_root(root);
        let scan = scan(&root, &self.config.scan)
            .with_context(|| format!("Failed to scan {}", root.display()))?;

        self.config
            .add_recent_root(std::fs::canonicalize(&root).unwrap_or(root));
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                tracing::warn!("Failed to save config: {:#}", e);
            }
        }
        Ok(scan)
    }

    /// Scan a root and load every folder
    pub fn catalog(&mut self, root: Option<PathBuf>) -> Result<Catalog> {
        let scan = self.open_root(root)?;
        Ok(scan.load_catalog()?)
    }

    /// `topics scan`
    pub fn scan(&mut self, root: Option<PathBuf>, format: Format, bodies: bool) -> Result<String> {
        let catalog = self.catalog(root)?;

        match format {
            Format::Tree => Ok(render::tree(&catalog)),
            Format::Json => Ok(render::json(&catalog, bodies)?),
        }
    }

    /// Scan a root and load a single document from it
    pub fn document(
        &mut self,
        root: Option<PathBuf>,
        folder: &str,
        title: &str,
    ) -> Result<TopicDocument> {
        let scan = self.open_root(root)?;
        scan.find_document(folder, title)?
            .with_context(|| format!("No document '{}' in folder '{}'", title, folder))
    }

    /// `topics show`
    pub fn show(&mut self, root: Option<PathBuf>, folder: &str, title: &str) -> Result<String> {
        Ok(self.document(root, folder, title)?.content)
    }

    /// `topics outline`
    pub fn outline(&mut self, root: Option<PathBuf>, folder: &str, title: &str) -> Result<String> {
        let doc = self.document(root, folder, title)?;
        Ok(render::outline(&doc))
    }

    /// `topics search`
    pub fn search(&mut self, root: Option<PathBuf>, query: &str, regex: bool) -> Result<String> {
        let query = if regex {
            SearchQuery::regex(query)?
        } else {
            SearchQuery::literal(query)?
        };
        let catalog = self.catalog(root)?;
        let hits = catalog.search(&query);
        tracing::info!("{} matches", hits.len());
        Ok(render::hits(&hits))
    }
}
