//! Contentful delivery API source
//!
//! Fetches every blog post entry, page by page, resolves linked tag and asset
//! entries from the `includes` block and reshapes everything into a
//! [`QueryResult`]. Authors come from the local authors YAML file.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use super::authors::load_authors;
use super::query::{QueryError, QueryResult};
use super::source::ContentSource;
use super::Post;
use crate::config::ContentfulConfig;
use crate::error::Result;

const CONTENT_TYPE: &str = "blogPost";

/// Highest `limit` the delivery API accepts for one page of entries
const PAGE_LIMIT: usize = 1000;

/// How deep linked entries are followed (tag -> image asset)
const LINK_DEPTH: usize = 2;

#[derive(Debug, Clone)]
pub struct ContentfulSource {
    config: ContentfulConfig,
    authors_file: PathBuf,
    client: reqwest::Client,
}

impl ContentfulSource {
    pub fn new<P: AsRef<Path>>(config: &ContentfulConfig, authors_file: P) -> Self {
        Self {
            config: config.clone(),
            authors_file: authors_file.as_ref().to_path_buf(),
            client: reqwest::Client::new(),
        }
    }

    fn entries_url(&self) -> String {
        format!(
            "https://{}/spaces/{}/environments/{}/entries",
            self.config.host, self.config.space_id, self.config.environment
        )
    }

    /// One page of entries starting at `skip`. Non-2xx responses come back as
    /// a collection carrying a single error.
    async fn fetch_page(&self, skip: usize) -> Result<EntryCollection> {
        let limit = PAGE_LIMIT.to_string();
        let depth = LINK_DEPTH.to_string();
        let skip = skip.to_string();
        let response = self
            .client
            .get(self.entries_url())
            .bearer_auth(&self.config.access_token)
            .query(&[
                ("content_type", CONTENT_TYPE),
                ("include", depth.as_str()),
                ("limit", limit.as_str()),
                ("skip", skip.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Ok(EntryCollection::failed(error_message(status, &body)));
        }

        tracing::debug!("Fetched entries page at offset {}", skip);
        Ok(serde_json::from_str(&body)?)
    }
}

impl ContentSource for ContentfulSource {
    async fn query(&self) -> Result<QueryResult> {
        tracing::info!(
            "Querying {} entries from {} (preview: {})",
            CONTENT_TYPE,
            self.config.host,
            self.config.use_preview
        );

        let collection = fetch_all(|skip| self.fetch_page(skip)).await?;
        collection.into_query_result(load_authors(&self.authors_file)?)
    }
}

/// Request pages until every entry the API reports in `total` is collected.
/// Stops early on the first delivery error.
async fn fetch_all<F, Fut>(mut fetch_page: F) -> Result<EntryCollection>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<EntryCollection>>,
{
    let mut all = fetch_page(0).await?;
    while all.errors.is_empty() && all.items.len() < all.total {
        let fetched = all.items.len();
        let page = fetch_page(fetched).await?;
        if page.errors.is_empty() && page.items.is_empty() {
            all.errors.push(DeliveryError::new(format!(
                "content API reported {} entries but returned {}",
                all.total, fetched
            )));
            break;
        }
        all.merge(page);
    }
    Ok(all)
}

/// `message (status)`, taking the message from a JSON error body when there is
/// one and from the raw body otherwise
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let text: String = body.trim().chars().take(200).collect();
            if text.is_empty() {
                "request failed".to_string()
            } else {
                text
            }
        });
    format!("{} ({})", message, status)
}

#[derive(Debug, Default, Deserialize)]
struct EntryCollection {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    items: Vec<Entry>,
    #[serde(default)]
    includes: Includes,
    #[serde(default)]
    errors: Vec<DeliveryError>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default, rename = "Entry")]
    entries: Vec<Entry>,
    #[serde(default, rename = "Asset")]
    assets: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    sys: Sys,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Sys {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, rename = "linkType")]
    link_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeliveryError {
    sys: Sys,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Value,
}

impl DeliveryError {
    fn new(message: String) -> Self {
        Self {
            sys: Sys::default(),
            message: Some(message),
            details: Value::Null,
        }
    }
}

impl EntryCollection {
    fn failed(message: String) -> Self {
        Self {
            errors: vec![DeliveryError::new(message)],
            ..Default::default()
        }
    }

    /// Append a later page; linked entries from every page stay resolvable
    fn merge(&mut self, page: EntryCollection) {
        self.items.extend(page.items);
        self.includes.entries.extend(page.includes.entries);
        self.includes.assets.extend(page.includes.assets);
        self.errors.extend(page.errors);
    }

    fn into_query_result(self, authors: Vec<super::Author>) -> Result<QueryResult> {
        if !self.errors.is_empty() {
            let errors = self
                .errors
                .iter()
                .map(|e| {
                    let detail = e
                        .details
                        .get("id")
                        .and_then(Value::as_str)
                        .map(|id| format!(" for {}", id))
                        .unwrap_or_default();
                    QueryError::new(format!(
                        "{}{}",
                        e.message.as_deref().unwrap_or(&e.sys.id),
                        detail
                    ))
                })
                .collect();
            return Ok(QueryResult::from_errors(errors));
        }

        let linked = Linked::new(&self.includes);
        let mut posts = Vec::with_capacity(self.items.len());
        for item in &self.items {
            posts.push(linked.post_from_entry(item)?);
        }

        Ok(QueryResult::from_data(posts, authors))
    }
}

/// Lookup table for entries and assets referenced by links
struct Linked<'a> {
    entries: HashMap<&'a str, &'a Entry>,
    assets: HashMap<&'a str, &'a Entry>,
}

impl<'a> Linked<'a> {
    fn new(includes: &'a Includes) -> Self {
        Self {
            entries: includes
                .entries
                .iter()
                .map(|e| (e.sys.id.as_str(), e))
                .collect(),
            assets: includes
                .assets
                .iter()
                .map(|e| (e.sys.id.as_str(), e))
                .collect(),
        }
    }

    fn post_from_entry(&self, entry: &Entry) -> Result<Post> {
        let mut fields = Map::new();
        for (key, value) in &entry.fields {
            let key = match key.as_str() {
                "description" if !entry.fields.contains_key("excerpt") => "excerpt",
                "heroImage" if !entry.fields.contains_key("image") => "image",
                other => other,
            };
            fields.insert(key.to_string(), self.resolve(value, LINK_DEPTH));
        }
        fields.insert("id".to_string(), Value::String(entry.sys.id.clone()));

        if let Some(tags) = fields.get_mut("tags") {
            normalize_tags(tags);
        }

        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Replace links with the linked entry's fields, or an asset's URL
    fn resolve(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.resolve(v, depth)).collect())
            }
            Value::Object(map) => match serde_json::from_value::<Sys>(
                map.get("sys").cloned().unwrap_or(Value::Null),
            ) {
                Ok(sys) if sys.kind == "Link" => self.follow(&sys, depth),
                _ => value.clone(),
            },
            other => other.clone(),
        }
    }

    fn follow(&self, link: &Sys, depth: usize) -> Value {
        match link.link_type.as_deref() {
            Some("Asset") => self
                .assets
                .get(link.id.as_str())
                .and_then(|asset| asset.fields.get("file"))
                .and_then(|file| file.get("url"))
                .and_then(Value::as_str)
                .map(|url| Value::String(absolute_asset_url(url)))
                .unwrap_or(Value::Null),
            _ if depth == 0 => Value::Null,
            _ => match self.entries.get(link.id.as_str()) {
                Some(entry) => Value::Object(
                    entry
                        .fields
                        .iter()
                        .map(|(k, v)| (k.clone(), self.resolve(v, depth - 1)))
                        .collect(),
                ),
                None => {
                    tracing::warn!("Unresolved link to entry {}", link.id);
                    Value::Null
                }
            },
        }
    }
}

/// Tag entries without a `slug` field fall back to their name or title;
/// unresolved links are dropped.
fn normalize_tags(tags: &mut Value) {
    let Value::Array(items) = tags else {
        return;
    };
    items.retain(|t| !t.is_null());
    for tag in items.iter_mut() {
        if let Value::Object(map) = tag {
            if !map.contains_key("slug") {
                if let Some(name) = map.get("name").or_else(|| map.get("title")).cloned() {
                    map.insert("slug".to_string(), name);
                }
            }
        }
    }
}

/// Asset URLs are protocol-relative (`//images.ctfassets.net/...`)
fn absolute_asset_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
