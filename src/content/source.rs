//! Content sources
//!
//! A build issues exactly one query and waits for the whole result before any
//! page is derived from it.

use std::future::Future;
use std::path::{Path, PathBuf};

use super::authors::load_authors;
use super::contentful::ContentfulSource;
use super::query::{QueryData, QueryResult};
use crate::error::{Error, Result};

/// Something that can answer the build's content query
pub trait ContentSource {
    fn query(&self) -> impl Future<Output = Result<QueryResult>> + Send;
}

/// Reads a previously exported query result from a JSON file
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
    authors_file: Option<PathBuf>,
}

impl SnapshotSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            authors_file: None,
        }
    }

    /// Take the author list from a YAML file instead of the snapshot, when the file exists
    pub fn with_authors_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.authors_file = Some(path.as_ref().to_path_buf());
        self
    }
}

impl ContentSource for SnapshotSource {
    async fn query(&self) -> Result<QueryResult> {
        tracing::info!("Reading content snapshot {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        let mut result: QueryResult = serde_json::from_str(&content)?;

        if let Some(authors_file) = self.authors_file.as_deref().filter(|p| p.exists()) {
            let authors = load_authors(authors_file)?;
            let data = result.data.get_or_insert_with(QueryData::default);
            data.all_author_yaml = super::query::Connection::from_nodes(authors);
        }

        Ok(result)
    }
}

/// The source selected for a build
#[derive(Debug, Clone)]
pub enum Source {
    Snapshot(SnapshotSource),
    Contentful(ContentfulSource),
}

impl ContentSource for Source {
    async fn query(&self) -> Result<QueryResult> {
        match self {
            Source::Snapshot(source) => source.query().await,
            Source::Contentful(source) => source.query().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SNAPSHOT: &str = r#"{
        "data": {
            "allContentfulBlogPost": { "edges": [{ "node": { "slug": "hello", "id": "1" } }] },
            "allAuthorYaml": { "edges": [{ "node": { "id": "Snapshot Author" } }] }
        }
    }"#;

    #[tokio::test]
    async fn test_snapshot_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let set = SnapshotSource::new(&path)
            .query()
            .await
            .unwrap()
            .into_result_set()
            .unwrap();
        assert_eq!(set.posts[0].slug, "hello");
        assert_eq!(set.authors[0].id, "Snapshot Author");
    }

    #[tokio::test]
    async fn test_authors_file_replaces_snapshot_authors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        let authors = dir.path().join("author.yaml");
        fs::write(&path, SNAPSHOT).unwrap();
        fs::write(&authors, "- id: Jane Doe\n- id: John Smith\n").unwrap();

        let source = Source::Snapshot(SnapshotSource::new(&path).with_authors_file(&authors));
        let set = source.query().await.unwrap().into_result_set().unwrap();
        let ids: Vec<_> = set.authors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["Jane Doe", "John Smith"]);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_io_error() {
        let source = SnapshotSource::new("/nonexistent/content.json");
        assert!(matches!(source.query().await, Err(Error::Io { .. })));
    }
}
