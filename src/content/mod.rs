//! Content module - the data model, the content query and its sources

mod authors;
mod contentful;
mod markdown;
mod model;
mod query;
mod source;

pub use authors::load_authors;
pub use contentful::ContentfulSource;
pub use markdown::MarkdownRenderer;
pub use model::{parse_date_string, Author, Post, Tag};
pub use query::{Connection, Edge, QueryData, QueryError, QueryResult, ResultSet};
pub use source::{ContentSource, SnapshotSource, Source};
