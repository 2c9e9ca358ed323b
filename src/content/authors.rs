//! Author profiles loaded from a YAML file

use std::fs;
use std::path::Path;

use super::Author;
use crate::error::{Error, Result};

/// Load the author list (`- id: Jane Doe ...`). A missing file yields no authors.
pub fn load_authors(path: &Path) -> Result<Vec<Author>> {
    if !path.exists() {
        tracing::debug!("No authors file at {:?}", path);
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let authors: Vec<Author> = serde_yaml::from_str(&content)?;
    tracing::debug!("Loaded {} authors from {:?}", authors.len(), path);
    Ok(authors)
}
