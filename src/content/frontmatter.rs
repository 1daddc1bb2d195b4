//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::ContentError;

/// Opening and closing line of a metadata block
const DELIMITER: &str = "---";

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Metadata block of a project write-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(
        rename = "techStack",
        deserialize_with = "string_or_vec",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tech_stack: Vec<String>,
    #[serde(rename = "repoUrl", default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(rename = "demoUrl", default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(rename = "mediumUrl", default, skip_serializing_if = "Option::is_none")]
    pub medium_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub order: i64,
    /// `YYYY-MM` or `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        deserialize_with = "string_or_vec",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub advantages: Vec<String>,
    #[serde(
        deserialize_with = "string_or_vec",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub outcomes: Vec<String>,

    /// Additional custom fields, in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl ProjectMeta {
    /// Minimal metadata with only the required keys set
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            summary: None,
            overview: None,
            tech_stack: Vec::new(),
            repo_url: None,
            demo_url: None,
            medium_url: None,
            featured: false,
            order: 0,
            date: None,
            image: None,
            advantages: Vec::new(),
            outcomes: Vec::new(),
            extra: IndexMap::new(),
        }
    }

    /// Card and header text: the overview if present, else the summary
    pub fn display_summary(&self) -> Option<&str> {
        self.overview.as_deref().or(self.summary.as_deref())
    }
}

/// Splits and serializes YAML metadata blocks
pub struct FrontMatter;

impl FrontMatter {
    /// Parse the leading metadata block.
    /// Returns (metadata, remaining_content); the remainder is not trimmed.
    pub fn parse(content: &str) -> Result<(ProjectMeta, &str), ContentError> {
        let (yaml, remaining) = Self::split(content)?;
        let meta = serde_yaml::from_str::<ProjectMeta>(yaml)
            .map_err(|e| ContentError::Metadata(e.to_string()))?;
        Ok((meta, remaining))
    }

    /// Split a source into its raw YAML block and the text after it
    pub fn split(content: &str) -> Result<(&str, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let rest = content
            .strip_prefix(DELIMITER)
            .ok_or_else(|| ContentError::Metadata("missing opening `---`".to_string()))?;
        let rest = rest.trim_start_matches([' ', '\t']);
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .ok_or_else(|| ContentError::Metadata("opening `---` must be on its own line".to_string()))?;

        closing_delimiter(rest)
            .ok_or_else(|| ContentError::Metadata("unterminated metadata block".to_string()))
    }

    /// Serialize metadata back into a delimited block
    pub fn serialize(meta: &ProjectMeta) -> Result<String, ContentError> {
        let yaml =
            serde_yaml::to_string(meta).map_err(|e| ContentError::Metadata(e.to_string()))?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
    }
}

/// Find the first line that is exactly `---` (trailing whitespace allowed).
/// Returns the block before it and the text after it, starting at its line break.
fn closing_delimiter(rest: &str) -> Option<(&str, &str)> {
    let mut start = 0;
    loop {
        let line_end = rest[start..].find('\n').map_or(rest.len(), |i| start + i);
        if rest[start..line_end].trim_end() == DELIMITER {
            return Some((&rest[..start], &rest[line_end..]));
        }
        if line_end == rest.len() {
            return None;
        }
        start = line_end + 1;
    }
}
