//! Content loader - loads project documents from the source directory

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentError, Document, Library};
use crate::Folio;

/// Directory under the source dir that holds project write-ups
pub const PROJECTS_DIR: &str = "_projects";

/// Loads content from the source directory
pub struct ContentLoader {
    projects_dir: PathBuf,
}

impl ContentLoader {
    /// Create a loader for a site
    pub fn new(folio: &Folio) -> Self {
        Self::with_dir(folio.source_dir.join(PROJECTS_DIR))
    }

    /// Create a loader over an explicit projects directory
    pub fn with_dir<P: AsRef<Path>>(projects_dir: P) -> Self {
        Self {
            projects_dir: projects_dir.as_ref().to_path_buf(),
        }
    }

    /// Load every project document.
    ///
    /// Documents that fail to parse are logged and skipped. Two documents
    /// declaring the same slug fail the whole load.
    pub fn load(&self) -> Result<Library, ContentError> {
        let mut library = Library::new();
        if !self.projects_dir.exists() {
            tracing::debug!("No projects directory at {:?}", self.projects_dir);
            return Ok(library);
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.projects_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .collect();
        paths.sort();

        for path in paths {
            match load_document(&path) {
                Ok(document) => library.insert(document)?,
                Err(e) => {
                    tracing::warn!("Skipping project {:?}: {}", path, e);
                }
            }
        }

        tracing::debug!("Loaded {} projects", library.len());
        Ok(library)
    }
}

/// Load a single document from a file
fn load_document(path: &Path) -> Result<Document, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Document::from_source(path, &text)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project(slug: &str, order: i64, featured: bool) -> String {
        format!(
            "---\ntitle: {slug}\nslug: {slug}\nfeatured: {featured}\norder: {order}\n---\n\n# {slug}\n"
        )
    }

    #[test]
    fn test_load_skips_broken_documents() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "alpha.md", &project("alpha", 1, true));
        write(tmp.path(), "beta.md", &project("beta", 0, true));
        write(tmp.path(), "broken.md", "---\ntitle: [oops\n---\nbody");
        write(tmp.path(), "renamed.md", &project("gamma", 2, true));
        write(tmp.path(), "notes.txt", "not markdown");

        let library = ContentLoader::with_dir(tmp.path()).load().unwrap();
        assert_eq!(library.len(), 2);
        assert!(library.get("alpha").is_some());
        assert!(library.get("gamma").is_none());
        let slugs: Vec<_> = library.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["beta", "alpha"]);
        assert_eq!(library.get("alpha").unwrap().body, "# alpha");
    }

    #[test]
    fn test_duplicate_slug_fails_load() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "one/dup.md", &project("dup", 0, false));
        write(tmp.path(), "two/dup.md", &project("dup", 1, false));

        let err = ContentLoader::with_dir(tmp.path()).load().unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { slug, .. } if slug == "dup"));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let library = ContentLoader::with_dir(tmp.path().join("nope")).load().unwrap();
        assert!(library.is_empty());
    }
}
