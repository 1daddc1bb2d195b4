//! Slug-indexed collection of loaded documents

use indexmap::IndexMap;

use super::{ContentError, Document};

/// Maximum number of projects shown in the featured grid
pub const FEATURED_LIMIT: usize = 6;

/// All documents, keyed by slug
#[derive(Debug, Clone, Default)]
pub struct Library {
    documents: IndexMap<String, Document>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document; a slug that is already present is rejected
    pub fn insert(&mut self, document: Document) -> Result<(), ContentError> {
        if let Some(existing) = self.documents.get(&document.slug) {
            return Err(ContentError::DuplicateSlug {
                slug: document.slug.clone(),
                first: existing.source.clone(),
                second: document.source.clone(),
            });
        }
        self.documents.insert(document.slug.clone(), document);
        self.documents
            .sort_by(|_, a, _, b| a.meta.order.cmp(&b.meta.order).then(a.slug.cmp(&b.slug)));
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<&Document> {
        self.documents.get(slug)
    }

    /// Documents ordered by `order`, then slug
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Featured documents, ascending by `order`, at most [`FEATURED_LIMIT`]
    pub fn featured(&self) -> Vec<&Document> {
        let mut featured: Vec<_> = self.iter().filter(|d| d.meta.featured).collect();
        featured.sort_by_key(|d| d.meta.order);
        featured.truncate(FEATURED_LIMIT);
        featured
    }

    /// Documents whose tech stack contains `tech` (case-insensitive)
    pub fn by_tech(&self, tech: &str) -> Vec<&Document> {
        self.iter()
            .filter(|d| d.meta.tech_stack.iter().any(|t| t.eq_ignore_ascii_case(tech)))
            .collect()
    }

    /// Every distinct tech tag with its usage count, most used first
    pub fn tech_counts(&self) -> Vec<(String, usize)> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for doc in self.iter() {
            for tech in &doc.meta.tech_stack {
                *counts.entry(tech.clone()).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ProjectMeta;
    use std::path::PathBuf;

    fn doc(slug: &str, order: i64, featured: bool) -> Document {
        let mut meta = ProjectMeta::new(slug.to_uppercase(), slug);
        meta.order = order;
        meta.featured = featured;
        meta.tech_stack = vec!["Python".to_string()];
        Document {
            slug: slug.to_string(),
            meta,
            body: String::new(),
            source: PathBuf::from(format!("{slug}.md")),
        }
    }

    #[test]
    fn test_featured_filters_sorts_and_caps() {
        let mut library = Library::new();
        for i in 0..10 {
            library
                .insert(doc(&format!("p{i}"), 10 - i, i % 5 != 0))
                .unwrap();
        }

        let featured = library.featured();
        assert_eq!(featured.len(), FEATURED_LIMIT);
        assert!(featured.iter().all(|d| d.meta.featured));
        assert!(featured
            .windows(2)
            .all(|w| w[0].meta.order <= w[1].meta.order));
    }

    #[test]
    fn test_featured_fewer_than_limit() {
        let mut library = Library::new();
        library.insert(doc("b", 2, true)).unwrap();
        library.insert(doc("a", 1, false)).unwrap();
        library.insert(doc("c", 0, true)).unwrap();

        let slugs: Vec<_> = library.featured().iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "b"]);
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut library = Library::new();
        library.insert(doc("same", 0, true)).unwrap();
        let err = library.insert(doc("same", 1, true)).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { .. }));
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("same").unwrap().meta.order, 0);
    }

    #[test]
    fn test_iter_ordering_and_tech() {
        let mut library = Library::new();
        library.insert(doc("z", 1, false)).unwrap();
        library.insert(doc("y", 1, false)).unwrap();
        library.insert(doc("x", 0, false)).unwrap();
        let slugs: Vec<_> = library.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["x", "y", "z"]);
        assert_eq!(library.by_tech("python").len(), 3);
        assert_eq!(library.tech_counts(), vec![("Python".to_string(), 3)]);
    }
}
