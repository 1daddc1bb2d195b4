//! Project document model

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{ContentError, FrontMatter, ProjectMeta};

/// A project write-up: metadata plus markdown body
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Routing key, equal to `meta.slug`
    pub slug: String,

    /// Parsed metadata block
    pub meta: ProjectMeta,

    /// Markdown body with surrounding whitespace trimmed
    pub body: String,

    /// File the document was loaded from
    #[serde(skip)]
    pub source: PathBuf,
}

impl Document {
    /// Build a document from a file's text.
    ///
    /// The file stem is the source identifier and must equal the declared slug.
    pub fn from_source(path: &Path, text: &str) -> Result<Self, ContentError> {
        let (meta, body) = FrontMatter::parse(text)?;

        let file_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if file_stem != meta.slug {
            return Err(ContentError::SlugMismatch {
                declared: meta.slug,
                file_stem: file_stem.to_string(),
            });
        }

        Ok(Self {
            slug: meta.slug.clone(),
            body: body.trim().to_string(),
            meta,
            source: path.to_path_buf(),
        })
    }

    /// Serialize back to the on-disk source format
    pub fn to_source(&self) -> Result<String, ContentError> {
        let block = FrontMatter::serialize(&self.meta)?;
        Ok(format!("{}\n{}\n", block, self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "---\ntitle: Sentiment\nslug: nlp-sentiment-analysis\n---\n\n  Body here.  \n\n";

    #[test]
    fn test_aligned_slug() {
        let doc =
            Document::from_source(Path::new("projects/nlp-sentiment-analysis.md"), SOURCE).unwrap();
        assert_eq!(doc.slug, "nlp-sentiment-analysis");
        assert_eq!(doc.body, "Body here.");
    }

    #[test]
    fn test_misaligned_slug() {
        let err = Document::from_source(Path::new("projects/sentiment.md"), SOURCE).unwrap_err();
        match err {
            ContentError::SlugMismatch {
                declared,
                file_stem,
            } => {
                assert_eq!(declared, "nlp-sentiment-analysis");
                assert_eq!(file_stem, "sentiment");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_to_source_reparses() {
        let path = Path::new("nlp-sentiment-analysis.md");
        let doc = Document::from_source(path, SOURCE).unwrap();
        let again = Document::from_source(path, &doc.to_source().unwrap()).unwrap();
        assert_eq!(again.meta, doc.meta);
        assert_eq!(again.body, doc.body);
    }
}
