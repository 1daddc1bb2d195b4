//! Create a new project write-up

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::loader::PROJECTS_DIR;
use crate::content::{Document, ProjectMeta};
use crate::Folio;

/// Create `source/_projects/<slug>.md` and return its path
pub fn create_project(folio: &Folio, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = slug::slugify(slug.unwrap_or(title));
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}", title);
    }

    let target_dir = folio.source_dir.join(PROJECTS_DIR);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut meta = ProjectMeta::new(title, slug.clone());
    meta.date = Some(chrono::Local::now().format("%Y-%m").to_string());

    let document = Document {
        slug,
        meta,
        body: "Describe the problem, the approach and the results.".to_string(),
        source: file_path.clone(),
    };
    fs::write(&file_path, document.to_source()?)?;

    Ok(file_path)
}
