//! Corpus loading from a category-per-subdirectory directory tree

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CorpusConfig;
use crate::error::{Error, Result};
use crate::types::Document;

/// Loads documents from the corpus root.
///
/// Each first-level subdirectory of the root is a category; files inside it
/// (recursively) become documents tagged with that category. Only UTF-8 text
/// files with an allowed extension are ingested. Documents with identical
/// content are deduplicated by hash.
pub struct CorpusLoader {
    root: PathBuf,
    extensions: Vec<String>,
    follow_links: bool,
}

impl CorpusLoader {
    /// Create a loader from the corpus configuration
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
            follow_links: config.follow_links,
        }
    }

    /// Load all documents. Directory and file order is sorted so repeated
    /// loads of the same corpus produce documents in the same order.
    pub fn load(&self) -> Result<Vec<Document>> {
        if !self.root.is_dir() {
            return Err(Error::config(format!(
                "Corpus root {} is not a directory",
                self.root.display()
            )));
        }

        let mut documents = Vec::new();
        let mut seen_hashes: HashSet<String> = HashSet::new();

        for category_dir in self.category_dirs()? {
            let category = category_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            for entry in WalkDir::new(&category_dir)
                .follow_links(self.follow_links)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || !self.has_allowed_extension(path) {
                    continue;
                }

                let text = match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
                        continue;
                    }
                };

                if text.trim().is_empty() {
                    tracing::debug!("Skipping empty file {}", path.display());
                    continue;
                }

                let content_hash = hash_content(&text);
                if !seen_hashes.insert(content_hash.clone()) {
                    tracing::debug!("Skipping duplicate content at {}", path.display());
                    continue;
                }

                let filename = path
                    .strip_prefix(&category_dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string();

                documents.push(Document::new(filename, category.clone(), text, content_hash));
            }
        }

        tracing::info!("Loaded {} documents from {}", documents.len(), self.root.display());
        Ok(documents)
    }

    /// First-level subdirectories of the corpus root, sorted by name
    fn category_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        Ok(dirs)
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }
}

/// SHA-256 content hash, hex-encoded
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorpusConfig;
    use std::fs;

    fn loader_for(root: &Path) -> CorpusLoader {
        CorpusLoader::new(&CorpusConfig {
            root_dir: root.to_path_buf(),
            ..CorpusConfig::default()
        })
    }

    #[test]
    fn test_category_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("facts")).unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("facts/sky.md"), "The sky is blue.").unwrap();
        fs::write(dir.path().join("notes/todo.txt"), "Water the grass.").unwrap();

        let docs = loader_for(dir.path()).load().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source_category, "facts");
        assert_eq!(docs[0].filename, "sky.md");
        assert_eq!(docs[1].source_category, "notes");
        assert_eq!(
            docs[0].metadata.get("source_category").unwrap(),
            &serde_json::json!("facts")
        );
    }

    #[test]
    fn test_duplicate_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("facts")).unwrap();
        fs::write(dir.path().join("facts/a.md"), "Same content.").unwrap();
        fs::write(dir.path().join("facts/b.md"), "Same content.").unwrap();

        let docs = loader_for(dir.path()).load().unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_disallowed_extensions_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("facts")).unwrap();
        fs::write(dir.path().join("facts/data.csv"), "a,b,c").unwrap();
        fs::write(dir.path().join("facts/readme.md"), "Read me.").unwrap();

        let docs = loader_for(dir.path()).load().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "readme.md");
    }

    #[test]
    fn test_files_outside_categories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("facts")).unwrap();
        fs::write(dir.path().join("stray.md"), "Not in a category.").unwrap();
        fs::write(dir.path().join("facts/kept.md"), "In a category.").unwrap();

        let docs = loader_for(dir.path()).load().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "kept.md");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(loader_for(&missing).load().is_err());
    }
}
