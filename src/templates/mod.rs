//! Built-in portfolio templates using the Tera template engine
//!
//! Templates and assets are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{Profile, SiteConfig};
use crate::helpers::html_escape;

/// Stylesheet copied to `assets/site.css`
pub const SITE_CSS: &str = include_str!("site/site.css");

/// Template renderer with the embedded portfolio theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Tera's default escaper also rewrites `/`, which mangles urls
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("projects.html", include_str!("site/projects.html")),
            ("project.html", include_str!("site/project.html")),
            ("404.html", include_str!("site/404.html")),
            ("site.js", include_str!("site/site.js")),
            // Partials
            (
                "partials/macros.html",
                include_str!("site/partials/macros.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Site-wide values available to every page
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub profile: Profile,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        // Templates build links as `{{ site.root }}path`
        let root = format!("{}/", config.root.trim_end_matches('/'));
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root,
            profile: config.profile.clone(),
        }
    }

    /// Name shown in the header and hero
    pub fn display_name(&self) -> &str {
        if self.profile.name.trim().is_empty() {
            &self.author
        } else {
            &self.profile.name
        }
    }
}

/// Project summary used by cards and detail pages
#[derive(Debug, Clone, Serialize)]
pub struct ProjectData {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub excerpt: String,
    pub image: Option<String>,
    /// First few tech tags shown as badges
    pub badges: Vec<String>,
    /// Number of tech tags not shown as badges
    pub overflow: usize,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub medium_url: Option<String>,
    /// Display date, e.g. "March 2024"
    pub date: Option<String>,
    pub advantages: Vec<String>,
    pub outcomes: Vec<String>,
}

/// Experience timeline entry
#[derive(Debug, Clone, Serialize)]
pub struct RoleData {
    pub role: String,
    pub company: String,
    pub company_url: Option<String>,
    pub location: Option<String>,
    pub period: String,
    pub achievements: Vec<String>,
}

/// Contact form wiring
#[derive(Debug, Clone, Serialize)]
pub struct ContactData {
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_display_name_falls_back_to_author() {
        let mut config = SiteConfig::default();
        let site = SiteData::from_config(&config);
        assert_eq!(site.display_name(), "Jane Doe");

        config.profile.name = "Ada".to_string();
        config.root = "/portfolio".to_string();
        let site = SiteData::from_config(&config);
        assert_eq!(site.display_name(), "Ada");
        assert_eq!(site.root, "/portfolio/");
    }

    #[test]
    fn test_render_404() {
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::from_config(&SiteConfig::default());
        let mut context = Context::new();
        context.insert("display_name", site.display_name());
        context.insert("site", &site);
        context.insert("version", "test");
        context.insert("year", &2026);
        let html = renderer.render("404.html", &context).unwrap();
        assert!(html.contains("Page not found"));
        assert!(html.contains(r#"href="/assets/site.css""#));
    }
}
