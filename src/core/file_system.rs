//! Topic folder discovery and scanning

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use super::catalog::Catalog;
use super::document::{self, TopicDocument};
use super::error::{IndexError, Result};

/// A directory grouping related documents under one subject
#[derive(Debug, Clone, Serialize)]
pub struct TopicFolder {
    pub name: String,
    pub path: PathBuf,
    pub documents: Vec<TopicDocument>,
}

impl TopicFolder {
    /// Find a document by title
    pub fn document(&self, title: &str) -> Option<&TopicDocument> {
        self.documents.iter().find(|d| d.title == title)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Options controlling which entries count as folders and documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Document file extensions, compared case-insensitively
    pub extensions: Vec<String>,
    /// Directory names never treated as topics
    pub skip_dirs: Vec<String>,
    /// Include entries whose names start with a dot
    pub include_hidden: bool,
    /// Walk nested directories inside each topic folder
    pub recursive: bool,
    /// Skip folders that fail to load instead of aborting
    pub continue_on_error: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "markdown".to_string()],
            skip_dirs: vec![
                "node_modules".to_string(),
                "target".to_string(),
                ".git".to_string(),
            ],
            include_hidden: false,
            recursive: false,
            continue_on_error: false,
        }
    }
}

impl ScanOptions {
    /// Check whether a path has a document extension
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// Check whether an entry name should be ignored
    fn is_skipped(&self, name: &str) -> bool {
        (!self.include_hidden && name.starts_with('.')) || self.skip_dirs.iter().any(|d| d == name)
    }
}

/// Case-insensitive name ordering with exact-name tie break
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().to_string()
}

/// Whether a walk error comes from a symlink whose target is gone
fn is_broken_link(err: &walkdir::Error) -> bool {
    err.path()
        .map(|p| fs::symlink_metadata(p).is_ok() && fs::metadata(p).is_err())
        .unwrap_or(false)
}

/// Unwrap a walk entry, skipping dangling symlinks
fn walk_entry(
    entry: walkdir::Result<DirEntry>,
    fallback: &Path,
) -> Result<Option<DirEntry>> {
    match entry {
        Ok(entry) => Ok(Some(entry)),
        Err(e) if is_broken_link(&e) => {
            tracing::debug!("Skipping broken link: {}", e);
            Ok(None)
        }
        Err(e) => Err(IndexError::from_walk(fallback, e)),
    }
}

/// Result of scanning a root directory.
///
/// Folders are discovered up front; their documents are read lazily as
/// [`Scan::folders`] advances. Each call to `folders` starts over, so a
/// `Scan` can be iterated any number of times.
#[derive(Debug, Clone)]
pub struct Scan {
    root: PathBuf,
    options: ScanOptions,
    folders: Vec<(String, PathBuf)>,
}

/// Scan a root directory for topic folders
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Scan> {
    let metadata = fs::metadata(root).map_err(|e| IndexError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(IndexError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut folders = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        let Some(entry) = walk_entry(entry, root)? else {
            continue;
        };
        let name = entry_name(&entry);

        if !entry.file_type().is_dir() {
            tracing::debug!("Skipping non-folder entry: {}", name);
            continue;
        }
        if options.is_skipped(&name) {
            tracing::debug!("Skipping ignored folder: {}", name);
            continue;
        }

        folders.push((name, entry.into_path()));
    }

    folders.sort_by(|a, b| by_name(&a.0, &b.0));

    tracing::info!(
        "Found {} topic folders in {}",
        folders.len(),
        root.display()
    );

    Ok(Scan {
        root: root.to_path_buf(),
        options: options.clone(),
        folders,
    })
}

impl Scan {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of topic folders found
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Folder names in scan order
    pub fn folder_names(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate folders, loading each one's documents on demand
    pub fn folders(&self) -> Folders<'_> {
        Folders {
            scan: self,
            next: 0,
        }
    }

    /// Load every folder, failing on the first error
    pub fn catalog(&self) -> Result<Catalog> {
        let folders = self.folders().collect::<Result<Vec<_>>>()?;
        Ok(Catalog::new(self.root.clone(), folders))
    }

    /// Load every folder, skipping the ones that fail
    pub fn catalog_lossy(&self) -> Catalog {
        let folders = self
            .folders()
            .filter_map(|folder| match folder {
                Ok(folder) => Some(folder),
                Err(e) => {
                    tracing::warn!("Skipping folder: {}", e);
                    None
                }
            })
            .collect();
        Catalog::new(self.root.clone(), folders)
    }

    /// Build a catalog honoring `continue_on_error`
    pub fn load_catalog(&self) -> Result<Catalog> {
        if self.options.continue_on_error {
            Ok(self.catalog_lossy())
        } else {
            self.catalog()
        }
    }

    /// Find and load one document without reading the rest of the tree
    pub fn find_document(&self, folder: &str, title: &str) -> Result<Option<TopicDocument>> {
        let Some((_, path)) = self.folders.iter().find(|(name, _)| name == folder) else {
            return Ok(None);
        };

        let found = self
            .document_paths(path)?
            .into_iter()
            .find(|(t, _)| t == title);

        match found {
            Some((title, doc_path)) => {
                let mut doc = document::load(&doc_path)?;
                doc.title = title;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Titles and paths of the documents in a folder, in scan order
    fn document_paths(&self, path: &Path) -> Result<Vec<(String, PathBuf)>> {
        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let options = &self.options;

        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by(|a, b| by_name(&a.file_name().to_string_lossy(), &b.file_name().to_string_lossy()))
            .into_iter()
            .filter_entry(|e| !options.is_skipped(&entry_name(e)));

        let mut paths = Vec::new();
        for entry in walker {
            let Some(entry) = walk_entry(entry, path)? else {
                continue;
            };
            if !entry.file_type().is_file() || !options.is_document(entry.path()) {
                continue;
            }
            paths.push((nested_title(path, entry.path()), entry.into_path()));
        }
        Ok(paths)
    }

    fn load_folder(&self, name: &str, path: &Path) -> Result<TopicFolder> {
        let mut documents: Vec<TopicDocument> = Vec::new();
        for (title, doc_path) in self.document_paths(path)? {
            if documents.iter().any(|d| d.title == title) {
                tracing::warn!("Duplicate title '{}' in folder '{}'", title, name);
            }
            documents.push(TopicDocument::read(&doc_path, title)?);
        }

        tracing::debug!("Loaded folder '{}' with {} documents", name, documents.len());

        Ok(TopicFolder {
            name: name.to_string(),
            path: path.to_path_buf(),
            documents,
        })
    }
}

/// Title relative to the folder: `sub/x` for `<folder>/sub/x.md`
fn nested_title(folder: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(folder).unwrap_or(path);
    let stem = document::title_from_path(relative);
    match relative.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            let parent: Vec<String> = parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            format!("{}/{}", parent.join("/"), stem)
        }
        None => stem,
    }
}

/// Lazy iterator over the folders of a [`Scan`]
pub struct Folders<'a> {
    scan: &'a Scan,
    next: usize,
}

impl Iterator for Folders<'_> {
    type Item = Result<TopicFolder>;

    fn next(&mut self) -> Option<Self::Item> {
        let (name, path) = self.scan.folders.get(self.next)?;
        self.next += 1;
        Some(self.scan.load_folder(name, path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.scan.folders.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Folders<'_> {}

impl<'a> IntoIterator for &'a Scan {
    type Item = Result<TopicFolder>;
    type IntoIter = Folders<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.folders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_scenario() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A/x.md", "hello");
        fs::create_dir(dir.path().join("B")).unwrap();

        let scan = scan(dir.path(), &ScanOptions::default()).unwrap();
        let folders: Vec<TopicFolder> = scan.folders().map(|f| f.unwrap()).collect();

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].name, "A");
        assert_eq!(folders[0].documents.len(), 1);
        assert_eq!(folders[0].documents[0].title, "x");
        assert_eq!(folders[0].documents[0].content, "hello");
        assert_eq!(folders[1].name, "B");
        assert!(folders[1].is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&dir.path().join("missing"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::NotFound { .. }));
    }

    #[test]
    fn test_scan_file_root() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.md", "text");
        let err = scan(&dir.path().join("notes.md"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, IndexError::NotADirectory { .. }));
    }

    #[test]
    fn test_scan_order_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "beta/b.md", "");
        write(dir.path(), "Alpha/Z.markdown", "");
        write(dir.path(), "Alpha/a.MD", "");
        write(dir.path(), "Alpha/notes.txt", "");
        write(dir.path(), ".hidden/h.md", "");
        write(dir.path(), "target/t.md", "");
        write(dir.path(), "top-level.md", "");

        let scan = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(scan.folder_names().collect::<Vec<_>>(), vec!["Alpha", "beta"]);

        let catalog = scan.catalog().unwrap();
        let titles: Vec<&str> = catalog.folders[0]
            .documents
            .iter()
            .map(|d| d.title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "Z"]);
    }

    #[test]
    fn test_folders_restartable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A/x.md", "hello");
        write(dir.path(), "B/y.md", "world");

        let scan = scan(dir.path(), &ScanOptions::default()).unwrap();
        let mut first = scan.folders();
        assert_eq!(first.len(), 2);
        assert_eq!(first.next().unwrap().unwrap().name, "A");

        let again: Vec<String> = scan.folders().map(|f| f.unwrap().name).collect();
        assert_eq!(again, vec!["A", "B"]);
    }

    #[test]
    fn test_recursive_titles() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Pydantic/models.md", "");
        write(dir.path(), "Pydantic/validators/field.md", "");

        let flat = scan(dir.path(), &ScanOptions::default())
            .unwrap()
            .catalog()
            .unwrap();
        assert_eq!(flat.folders[0].documents.len(), 1);

        let options = ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        };
        let nested = scan(dir.path(), &options).unwrap().catalog().unwrap();
        let titles: Vec<&str> = nested.folders[0]
            .documents
            .iter()
            .map(|d| d.title.as_str())
            .collect();
        assert_eq!(titles, vec!["models", "validators/field"]);
    }

    #[test]
    fn test_catalog_lossy_skips_bad_folder() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A/x.md", "hello");
        fs::create_dir_all(dir.path().join("B")).unwrap();
        fs::write(dir.path().join("B/bad.md"), [0xff, 0xfe]).unwrap();

        let scan = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert!(matches!(scan.catalog(), Err(IndexError::Decode { .. })));

        let catalog = scan.catalog_lossy();
        assert_eq!(catalog.folder_count(), 1);
        assert_eq!(catalog.folders[0].name, "A");
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_at_root_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A/x.md", "hello");
        std::os::unix::fs::symlink(dir.path().join("gone.md"), dir.path().join("README.md"))
            .unwrap();

        let scan = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(scan.len(), 1);
        assert_eq!(scan.catalog().unwrap().document_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_in_folder_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A/x.md", "hello");
        let folder = dir.path().join("A");
        std::os::unix::fs::symlink(folder.join("nothing.png"), folder.join("image.png")).unwrap();
        std::os::unix::fs::symlink(folder.join("nothing.md"), folder.join("stale.md")).unwrap();

        let catalog = scan(dir.path(), &ScanOptions::default())
            .unwrap()
            .catalog()
            .unwrap();
        let titles: Vec<&str> = catalog.folders[0]
            .documents
            .iter()
            .map(|d| d.title.as_str())
            .collect();
        assert_eq!(titles, vec!["x"]);
    }

    #[test]
    fn test_find_document_ignores_sibling_folders() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A/x.md", "hello");
        write(dir.path(), "A/sub/y.md", "nested");
        fs::create_dir_all(dir.path().join("B")).unwrap();
        fs::write(dir.path().join("B/bad.md"), [0xff, 0xfe]).unwrap();

        let scan = scan(dir.path(), &ScanOptions::default()).unwrap();
        let doc = scan.find_document("A", "x").unwrap().unwrap();
        assert_eq!(doc.title, "x");
        assert_eq!(doc.content, "hello");
        assert!(scan.find_document("A", "missing").unwrap().is_none());
        assert!(scan.find_document("C", "x").unwrap().is_none());
        assert!(matches!(
            scan.find_document("B", "bad"),
            Err(IndexError::Decode { .. })
        ));

        let options = ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        };
        let nested = super::scan(dir.path(), &options).unwrap();
        let doc = nested.find_document("A", "sub/y").unwrap().unwrap();
        assert_eq!(doc.title, "sub/y");
        assert_eq!(doc.content, "nested");
    }
}
