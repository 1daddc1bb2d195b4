//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `contact.access_key`
pub const ACCESS_KEY_ENV: &str = "WEB3FORMS_ACCESS_KEY";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub reading: ReadingConfig,
    #[serde(default)]
    pub contact: ContactConfig,

    // Portfolio content
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub experience: Vec<Role>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            author: "Jane Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            highlight: HighlightConfig::default(),
            reading: ReadingConfig::default(),
            contact: ContactConfig::default(),

            profile: Profile::default(),
            experience: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides on top of the file values
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ACCESS_KEY_ENV) {
            if !key.trim().is_empty() {
                tracing::debug!("Using relay access key from {}", ACCESS_KEY_ENV);
                self.contact.access_key = Some(key);
            }
        }
    }

    /// Scheme and authority of the site url, e.g. `https://example.com`
    pub fn origin(&self) -> Option<String> {
        crate::render::origin_of(&self.url)
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Read-time and excerpt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
    pub excerpt_length: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            excerpt_length: 150,
        }
    }
}

/// Contact relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub endpoint: String,
    pub access_key: Option<String>,
    pub from_name: String,
    /// Seconds to wait for the relay before giving up
    pub timeout_secs: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key: None,
            from_name: "Portfolio Contact Form".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Biographical header content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    pub bio: String,
    pub email: Option<String>,
    #[serde(rename = "resumeUrl")]
    pub resume_url: Option<String>,
    pub links: Vec<SocialLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

/// One entry of the experience timeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub role: String,
    pub company: String,
    #[serde(rename = "companyUrl")]
    pub company_url: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: String,
    /// Absent while the role is current
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
    pub order: i64,
}
