//! Topic documents: a single markdown file and its metadata

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::error::{IndexError, Result};

/// A markdown document inside a topic folder
#[derive(Debug, Clone, Serialize)]
pub struct TopicDocument {
    /// File path
    pub path: PathBuf,
    /// Title derived from the file name
    pub title: String,
    /// Raw markdown content, exactly as stored on disk
    pub content: String,
    /// Last modification time
    #[serde(skip)]
    pub last_modified: Option<SystemTime>,
    /// Metadata from the frontmatter block, if any
    pub metadata: DocumentMetadata,
}

/// Document metadata from frontmatter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A heading found in the document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1-6
    pub level: u8,
    pub text: String,
    /// 1-based line number of the heading
    pub line: usize,
}

/// Load a document from disk, titled after its file stem
pub fn load(path: &Path) -> Result<TopicDocument> {
    let title = title_from_path(path);
    TopicDocument::read(path, title)
}

/// Title for a document path: the file name without its extension
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}

impl TopicDocument {
    /// Read a document with an explicit title
    pub(crate) fn read(path: &Path, title: String) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| IndexError::from_io(path, e))?;
        let content = String::from_utf8(bytes).map_err(|_| IndexError::Decode {
            path: path.to_path_buf(),
        })?;

        let last_modified = fs::metadata(path).ok().and_then(|m| m.modified().ok());
        let metadata = parse_frontmatter(&content).unwrap_or_default();

        tracing::debug!("Loaded document: {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            title,
            content,
            last_modified,
            metadata,
        })
    }

    /// Title to show to readers: frontmatter title if present, otherwise the file title
    pub fn display_title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or(&self.title)
    }

    /// Content without the frontmatter block
    pub fn body(&self) -> &str {
        match frontmatter_end(&self.content) {
            Some(end) => self.content[end..].trim_start(),
            None => &self.content,
        }
    }

    /// Headings in document order
    pub fn headings(&self) -> Vec<Heading> {
        use pulldown_cmark::{Event, Parser, Tag, TagEnd};

        let body_offset = self.content.len() - self.body().len();
        let body = self.body();

        let mut headings = Vec::new();
        let mut current: Option<(u8, usize, String)> = None;

        for (event, range) in Parser::new(body).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    let line = line_at(&self.content, body_offset + range.start);
                    current = Some((level as u8, line, String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, _, ref mut buf)) = current {
                        buf.push_str(&text);
                    }
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, line, text)) = current.take() {
                        headings.push(Heading {
                            level,
                            text: text.trim().to_string(),
                            line,
                        });
                    }
                }
                _ => {}
            }
        }

        headings
    }
}

/// 1-based line number of a byte offset
fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// Byte offset just past the closing frontmatter fence
fn frontmatter_end(content: &str) -> Option<usize> {
    let rest = content.strip_prefix("---")?;
    let end = rest.find("\n---")?;
    Some(3 + end + 4)
}

/// Parse `key: value` frontmatter lines
fn parse_frontmatter(content: &str) -> Option<DocumentMetadata> {
    let end = frontmatter_end(content)?;
    let block = content[3..end - 4].trim();

    let mut metadata = DocumentMetadata::default();
    for line in block.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().trim_matches('"');
            match key.trim() {
                "title" => metadata.title = Some(value.to_string()),
                "tags" => {
                    metadata.tags = value
                        .trim_matches(|c| c == '[' || c == ']')
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                _ => {}
            }
        }
    }
    Some(metadata)
}
