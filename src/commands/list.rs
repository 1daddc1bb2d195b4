//! List site content

use anyhow::Result;

use crate::content::{ContentLoader, Document};
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let library = ContentLoader::new(folio).load()?;

    match content_type {
        "project" | "projects" => {
            println!("Projects ({}):", library.len());
            for doc in library.iter() {
                println!("  {}", describe(doc));
            }
        }
        "featured" => {
            let featured = library.featured();
            println!("Featured ({}):", featured.len());
            for doc in featured {
                println!("  {}", describe(doc));
            }
        }
        "tech" => {
            let counts = library.tech_counts();
            println!("Tech ({}):", counts.len());
            for (tech, count) in counts {
                println!("  {} ({})", tech, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: projects, featured, tech",
                content_type
            );
        }
    }

    Ok(())
}

fn describe(doc: &Document) -> String {
    format!(
        "{:>3}  {} - {} [{}]",
        doc.meta.order,
        doc.slug,
        doc.meta.title,
        doc.source.display()
    )
}
