//! Generator module - generates static HTML files using built-in Tera templates

use anyhow::Result;
use chrono::Datelike;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{self, Document, Library};
use crate::helpers::{format_date, format_range, full_url_for, project_path, url_for};
use crate::render::{headings, HtmlRenderer, MarkdownRenderer, COPY_FEEDBACK_MS};
use crate::templates::{ContactData, ProjectData, RoleData, SiteData, TemplateRenderer, SITE_CSS};
use crate::Folio;

/// Tech tags shown on a card before the `+N` badge
pub const BADGE_LIMIT: usize = 5;

/// Route the generated contact form posts to
pub const CONTACT_ACTION: &str = "api/contact";

/// Directory under the source dir copied verbatim into the output
pub const STATIC_DIR: &str = "static";

/// Static site generator using Tera templates
pub struct Generator {
    folio: Folio,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            templates: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::for_site(&folio.config),
        })
    }

    /// Generate the entire site
    pub fn generate(&self, library: &Library) -> Result<()> {
        fs::create_dir_all(&self.folio.public_dir)?;

        let site_data = SiteData::from_config(&self.folio.config);

        self.write_assets(&site_data)?;
        self.copy_static_files()?;

        self.generate_home(library, &site_data)?;
        self.generate_project_index(library, &site_data)?;
        for document in library.iter() {
            self.generate_project_page(document, &site_data)?;
        }
        self.generate_not_found(&site_data)?;

        Ok(())
    }

    /// Create a base context with common variables
    fn create_base_context(&self, site_data: &SiteData) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("display_name", site_data.display_name());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert("year", &chrono::Local::now().year());
        context.insert("canonical", &None::<String>);
        context
    }

    fn project_data(&self, document: &Document) -> ProjectData {
        let config = &self.folio.config;
        let meta = &document.meta;

        ProjectData {
            slug: document.slug.clone(),
            url: url_for(config, &project_path(&document.slug)),
            title: meta.title.clone(),
            summary: meta.display_summary().map(str::to_string),
            excerpt: content::excerpt(&document.body, config.reading.excerpt_length),
            image: meta.image.as_deref().map(|image| url_for(config, image)),
            badges: meta.tech_stack.iter().take(BADGE_LIMIT).cloned().collect(),
            overflow: meta.tech_stack.len().saturating_sub(BADGE_LIMIT),
            repo_url: meta.repo_url.clone(),
            demo_url: meta.demo_url.clone(),
            medium_url: meta.medium_url.clone(),
            date: meta.date.as_deref().map(format_date),
            advantages: meta.advantages.clone(),
            outcomes: meta.outcomes.clone(),
        }
    }

    fn roles(&self) -> Vec<RoleData> {
        let mut roles: Vec<_> = self.folio.config.experience.iter().collect();
        roles.sort_by_key(|r| r.order);
        roles
            .into_iter()
            .map(|r| RoleData {
                role: r.role.clone(),
                company: r.company.clone(),
                company_url: r.company_url.clone(),
                location: r.location.clone(),
                period: format_range(&r.start_date, r.end_date.as_deref()),
                achievements: r.achievements.clone(),
            })
            .collect()
    }

    fn generate_home(&self, library: &Library, site_data: &SiteData) -> Result<()> {
        let config = &self.folio.config;
        let featured: Vec<_> = library
            .featured()
            .into_iter()
            .map(|d| self.project_data(d))
            .collect();

        let mut context = self.create_base_context(site_data);
        context.insert("featured", &featured);
        context.insert("experience", &self.roles());
        context.insert(
            "resume_url",
            &config.profile.resume_url.as_deref().map(|u| url_for(config, u)),
        );
        context.insert(
            "contact",
            &ContactData {
                action: url_for(config, CONTACT_ACTION),
            },
        );

        context.insert("canonical", &full_url_for(config, ""));

        let html = self.templates.render("home.html", &context)?;
        self.write_page("index.html", &html)
    }

    fn generate_project_index(&self, library: &Library, site_data: &SiteData) -> Result<()> {
        let projects: Vec<_> = library.iter().map(|d| self.project_data(d)).collect();

        let mut context = self.create_base_context(site_data);
        context.insert("projects", &projects);

        let html = self.templates.render("projects.html", &context)?;
        self.write_page("projects/index.html", &html)
    }

    fn generate_project_page(&self, document: &Document, site_data: &SiteData) -> Result<()> {
        let reading = &self.folio.config.reading;
        let nodes = self.markdown.parse_tree(&document.body);

        let path = project_path(&document.slug);
        let mut context = self.create_base_context(site_data);
        context.insert("canonical", &full_url_for(&self.folio.config, &path));
        context.insert("project", &self.project_data(document));
        context.insert("tech_stack", &document.meta.tech_stack);
        context.insert(
            "read_time",
            &content::read_time(&document.body, reading.words_per_minute),
        );
        context.insert("toc", &headings(&nodes));
        context.insert("content", &HtmlRenderer::default().render(&nodes));

        let html = self.templates.render("project.html", &context)?;
        self.write_page(&format!("{}index.html", path), &html)
    }

    fn generate_not_found(&self, site_data: &SiteData) -> Result<()> {
        let context = self.create_base_context(site_data);
        let html = self.templates.render("404.html", &context)?;
        self.write_page("404.html", &html)
    }

    fn write_assets(&self, site_data: &SiteData) -> Result<()> {
        let mut context = self.create_base_context(site_data);
        context.insert("copy_feedback_ms", &COPY_FEEDBACK_MS);
        let js = self.templates.render("site.js", &context)?;

        self.write_page("assets/site.js", &js)?;
        self.write_page("assets/site.css", SITE_CSS)
    }

    /// Write one output file relative to the public dir
    fn write_page(&self, relative: &str, contents: &str) -> Result<()> {
        let output_path = self.folio.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy images, resumes and other files from the static directory
    fn copy_static_files(&self) -> Result<()> {
        let static_dir = self.folio.source_dir.join(STATIC_DIR);
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(&static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(&static_dir)?;
                copy_file(path, &self.folio.public_dir.join(relative))?;
            }
        }

        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}
