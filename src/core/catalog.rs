//! The in-memory catalog produced by a full scan

use std::path::PathBuf;

use regex_lite::{Regex, RegexBuilder};
use serde::Serialize;

use super::document::TopicDocument;
use super::error::{IndexError, Result};
use super::file_system::TopicFolder;

/// Ordered collection of topic folders and their documents
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub root: PathBuf,
    pub folders: Vec<TopicFolder>,
}

/// A search request against a catalog
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pattern: Regex,
}

impl SearchQuery {
    /// Case-insensitive literal search
    pub fn literal(text: &str) -> Result<Self> {
        Self::regex(&regex_lite::escape(text))
    }

    /// Case-insensitive regular expression search
    pub fn regex(pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| IndexError::Pattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Where a search hit was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HitLocation {
    /// The document title matched
    Title,
    /// A body line matched (1-based)
    Line(usize),
}

/// A single search match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub folder: String,
    pub title: String,
    pub location: HitLocation,
    /// Matching text, trimmed
    pub text: String,
}

impl Catalog {
    pub fn new(root: PathBuf, folders: Vec<TopicFolder>) -> Self {
        Self { root, folders }
    }

    /// Find a folder by name
    pub fn folder(&self, name: &str) -> Option<&TopicFolder> {
        self.folders.iter().find(|f| f.name == name)
    }

    /// Find a document by folder name and title
    pub fn document(&self, folder: &str, title: &str) -> Option<&TopicDocument> {
        self.folder(folder).and_then(|f| f.document(title))
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn document_count(&self) -> usize {
        self.folders.iter().map(|f| f.documents.len()).sum()
    }

    /// Titles that appear more than once in the same folder, as (folder, title)
    pub fn duplicate_titles(&self) -> Vec<(String, String)> {
        let mut duplicates = Vec::new();
        for folder in &self.folders {
            for (i, doc) in folder.documents.iter().enumerate() {
                let seen_before = folder.documents[..i].iter().any(|d| d.title == doc.title);
                let already_listed = duplicates
                    .iter()
                    .any(|(f, t): &(String, String)| f == &folder.name && t == &doc.title);
                if seen_before && !already_listed {
                    duplicates.push((folder.name.clone(), doc.title.clone()));
                }
            }
        }
        duplicates
    }

    /// Search titles and body lines, in catalog order
    pub fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
        let mut hits = Vec::new();

        for folder in &self.folders {
            for doc in &folder.documents {
                let hit = |location, text: &str| SearchHit {
                    folder: folder.name.clone(),
                    title: doc.title.clone(),
                    location,
                    text: text.trim().to_string(),
                };

                if query.is_match(&doc.title) {
                    hits.push(hit(HitLocation::Title, &doc.title));
                }
                for (i, line) in doc.content.lines().enumerate() {
                    if query.is_match(line) {
                        hits.push(hit(HitLocation::Line(i + 1), line));
                    }
                }
            }
        }

        tracing::debug!("Search matched {} locations", hits.len());
        hits
    }
}
