//! Page templates, rendered with Tera
//!
//! A default theme is embedded in the binary. Any `<name>.html` file in the
//! site's templates directory replaces the embedded template of the same name
//! or adds a new one, so a post `layout` can name a site-specific template.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::helpers::{full_url_for, url_for};
use crate::plan::{author_path, tag_path};

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("default/layout.html")),
    ("index.html", include_str!("default/index.html")),
    ("post.html", include_str!("default/post.html")),
    ("tags.html", include_str!("default/tags.html")),
    ("author.html", include_str!("default/author.html")),
    (
        "partials/post_card.html",
        include_str!("default/partials/post_card.html"),
    ),
    (
        "partials/pagination.html",
        include_str!("default/partials/pagination.html"),
    ),
];

/// Template renderer with the embedded theme plus site overrides
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer with only the embedded templates
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Self::build(config, IndexMap::new())
    }

    /// Create a renderer, layering `*.html` files under `dir` over the defaults
    pub fn with_overrides(config: &SiteConfig, dir: &Path) -> Result<Self> {
        let mut overrides = IndexMap::new();
        if dir.is_dir() {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                    continue;
                }
                let name = path
                    .strip_prefix(dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                tracing::debug!("Template override: {}", name);
                overrides.insert(name, content);
            }
        }
        Self::build(config, overrides)
    }

    fn build(config: &SiteConfig, overrides: IndexMap<String, String>) -> Result<Self> {
        let mut templates: IndexMap<String, String> = DEFAULT_TEMPLATES
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();
        templates.extend(overrides);

        let mut tera = Tera::default();
        // Bodies are pre-rendered HTML and paths must stay unescaped
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map_err(|e| render_error("<templates>", &e))?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("tag_path", path_filter("tag_path", tag_path));
        tera.register_filter("author_path", path_filter("author_path", author_path));

        tera.register_function("url_for", url_function(config, url_for));
        tera.register_function("full_url_for", url_function(config, full_url_for));

        Ok(Self { tera })
    }

    /// File name of the template for a template reference (`post` -> `post.html`)
    pub fn file_name(template: &str) -> String {
        if template.ends_with(".html") {
            template.to_string()
        } else {
            format!("{}.html", template)
        }
    }

    pub fn has_template(&self, template: &str) -> bool {
        let name = Self::file_name(template);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with given context
    pub fn render(&self, template: &str, context: &Context) -> Result<String> {
        let name = Self::file_name(template);
        if !self.has_template(&name) {
            return Err(Error::MissingTemplate(name));
        }
        self.tera
            .render(&name, context)
            .map_err(|e| render_error(&name, &e))
    }
}

/// Flatten a Tera error and its causes into one message
fn render_error(template: &str, err: &tera::Error) -> Error {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::Render {
        template: template.to_string(),
        message,
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}…", truncated.trim_end())))
    }
}

/// Tera filter: reformat an RFC 3339 date (`format` is a chrono format string)
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%d %B %Y".to_string(),
    };

    let Ok(date) = chrono::DateTime::parse_from_rfc3339(&s) else {
        return Ok(tera::Value::String(s));
    };
    let mut out = String::new();
    write!(out, "{}", date.format(&format))
        .map_err(|_| tera::Error::msg(format!("Invalid date format {:?}", format)))?;
    Ok(tera::Value::String(out))
}

/// Tera filter built from a route function, so templates link to the same
/// paths the page plan generates
fn path_filter(
    name: &'static str,
    route: fn(&str) -> String,
) -> impl tera::Filter + 'static {
    move |value: &tera::Value, _args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
        let s = tera::try_get_value!(name, "value", String, value);
        Ok(tera::Value::String(route(&s)))
    }
}

/// Tera function `name(path=...)` backed by a URL helper and the site config
fn url_function(
    config: &SiteConfig,
    helper: fn(&SiteConfig, &str) -> String,
) -> impl tera::Function + 'static {
    let config = config.clone();
    move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        Ok(tera::Value::String(helper(&config, path)))
    }
}

pub(crate) fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Site-wide values available to every template as `config`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            extra: config.extra.clone(),
        }
    }
}

/// A tag as shown in templates
#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub slug: String,
    pub path: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// A post as shown in listings and on its own page
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub id: String,
    pub title: String,
    pub path: String,
    pub date: Option<String>,
    pub tags: Vec<TagData>,
    pub author: Option<String>,
    pub author_path: Option<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub draft: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub current_url: String,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}
