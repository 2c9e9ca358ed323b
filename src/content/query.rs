//! Content query result
//!
//! The result mirrors the shape of a graph query against the content API:
//!
//! ```json
//! {
//!   "data": {
//!     "allContentfulBlogPost": { "edges": [{ "node": { "slug": "...", "id": "...", "tags": [] } }] },
//!     "allAuthorYaml": { "edges": [{ "node": { "id": "..." } }] }
//!   },
//!   "errors": []
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Author, Post};
use crate::error::{Error, Result};

/// Raw response of the single content query issued per build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub data: Option<QueryData>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<QueryError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    #[serde(default)]
    pub all_contentful_blog_post: Connection<Post>,
    #[serde(default)]
    pub all_author_yaml: Connection<Author>,
}

/// A list of nodes wrapped in edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

impl<T> Connection<T> {
    pub fn from_nodes(nodes: impl IntoIterator<Item = T>) -> Self {
        Self {
            edges: nodes.into_iter().map(|node| Edge { node }).collect(),
        }
    }

    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// One error reported by the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            let path: Vec<String> = self
                .path
                .iter()
                .map(|p| match p {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            write!(f, "{} (at {})", self.message, path.join("."))
        }
    }
}

/// The posts and authors of one successful query, read-only for the build
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub posts: Vec<Post>,
    pub authors: Vec<Author>,
}

impl QueryResult {
    pub fn from_data(posts: Vec<Post>, authors: Vec<Author>) -> Self {
        Self {
            data: Some(QueryData {
                all_contentful_blog_post: Connection::from_nodes(posts),
                all_author_yaml: Connection::from_nodes(authors),
            }),
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<QueryError>) -> Self {
        Self { data: None, errors }
    }

    /// Any reported error is fatal: no partial result set is ever produced
    pub fn into_result_set(self) -> Result<ResultSet> {
        if !self.errors.is_empty() {
            for err in &self.errors {
                tracing::error!("Content query error: {}", err);
            }
            return Err(Error::Query(self.errors));
        }

        let data = self
            .data
            .ok_or_else(|| Error::Query(vec![QueryError::new("query returned no data")]))?;

        Ok(ResultSet {
            posts: data.all_contentful_blog_post.into_nodes(),
            authors: data.all_author_yaml.into_nodes(),
        })
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
