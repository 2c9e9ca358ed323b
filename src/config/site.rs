//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::plan::PostOrder;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub templates_dir: String,
    pub content_dir: String,
    pub authors_file: String,

    /// Query result snapshot; when set, the content API is not contacted
    pub snapshot: Option<String>,

    // Posts
    pub post_order: PostOrder,
    pub related_posts: usize,

    // Pagination
    pub per_page: usize,
    pub pagination_dir: String,

    // Store any additional fields, exposed to templates as `config.extra`
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            templates_dir: "templates".to_string(),
            content_dir: "content".to_string(),
            authors_file: "author.yaml".to_string(),
            snapshot: None,

            post_order: PostOrder::default(),
            related_posts: 3,

            per_page: 10,
            pagination_dir: "page".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        if config.per_page == 0 {
            return Err(Error::Config("per_page must be at least 1".to_string()));
        }
        Ok(config)
    }
}
