//! Content module - handles project documents and content processing

mod document;
mod frontmatter;
mod library;
pub mod loader;
mod text;

use std::path::PathBuf;
use thiserror::Error;

pub use document::Document;
pub use frontmatter::{FrontMatter, ProjectMeta};
pub use library::{Library, FEATURED_LIMIT};
pub use loader::ContentLoader;
pub use text::{excerpt, read_time, word_count};

/// Failures while turning source files into documents
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("malformed metadata block: {0}")]
    Metadata(String),

    #[error("slug `{declared}` does not match file name `{file_stem}`")]
    SlugMismatch { declared: String, file_stem: String },

    #[error("duplicate slug `{slug}` in {first:?} and {second:?}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
