//! Text and JSON rendering of catalogs for the command line

use serde::Serialize;

use crate::core::catalog::{Catalog, HitLocation, SearchHit};
use crate::core::document::TopicDocument;

/// Render the catalog as an indented tree
pub fn tree(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", catalog.root.display()));

    for folder in &catalog.folders {
        out.push_str(&format!("  {}/\n", folder.name));
        if folder.is_empty() {
            out.push_str("    (empty)\n");
        }
        for doc in &folder.documents {
            out.push_str(&format!("    {}\n", doc.title));
        }
    }

    out.push_str(&format!(
        "{} folders, {} documents\n",
        catalog.folder_count(),
        catalog.document_count()
    ));
    out
}

#[derive(Serialize)]
struct FolderSummary<'a> {
    name: &'a str,
    documents: Vec<DocumentSummary<'a>>,
}

#[derive(Serialize)]
struct DocumentSummary<'a> {
    title: &'a str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

/// Render the catalog as pretty JSON, optionally including document bodies
pub fn json(catalog: &Catalog, bodies: bool) -> serde_json::Result<String> {
    let folders: Vec<FolderSummary<'_>> = catalog
        .folders
        .iter()
        .map(|folder| FolderSummary {
            name: &folder.name,
            documents: folder
                .documents
                .iter()
                .map(|doc| DocumentSummary {
                    title: &doc.title,
                    path: doc.path.display().to_string(),
                    content: bodies.then_some(doc.content.as_str()),
                })
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&folders)
}

/// Render a document's heading outline
pub fn outline(doc: &TopicDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", doc.display_title()));

    for heading in doc.headings() {
        let indent = "  ".repeat(heading.level.saturating_sub(1) as usize);
        out.push_str(&format!("{}{} (line {})\n", indent, heading.text, heading.line));
    }
    out
}

/// Render search hits as `folder/title:line: text`
pub fn hits(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        match hit.location {
            HitLocation::Title => {
                out.push_str(&format!("{}/{}\n", hit.folder, hit.title));
            }
            HitLocation::Line(line) => {
                out.push_str(&format!("{}/{}:{}: {}\n", hit.folder, hit.title, line, hit.text));
            }
        }
    }
    out
}
