//! Content API credentials
//!
//! Read once at startup and handed to [`crate::content::ContentfulSource`] by
//! reference. Nothing else reads these environment variables.

use std::collections::HashMap;

use crate::error::{Error, Result};

const DELIVERY_HOST: &str = "cdn.contentful.com";
const PREVIEW_HOST: &str = "preview.contentful.com";

#[derive(Clone, PartialEq, Eq)]
pub struct ContentfulConfig {
    pub space_id: String,
    pub access_token: String,
    pub host: String,
    pub environment: String,
    pub use_preview: bool,
}

impl std::fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("space_id", &self.space_id)
            .field("access_token", &"<redacted>")
            .field("host", &self.host)
            .field("environment", &self.environment)
            .field("use_preview", &self.use_preview)
            .finish()
    }
}

impl ContentfulConfig {
    /// Build from the process environment, loading `.env` first if present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let use_preview = get("CONTENTFUL_USE_PREVIEW").as_deref() == Some("true");
        let (host, token_var) = if use_preview {
            (PREVIEW_HOST, "CONTENTFUL_PREVIEW_TOKEN")
        } else {
            (DELIVERY_HOST, "CONTENTFUL_DELIVERY_TOKEN")
        };

        match (get("CONTENTFUL_SPACE_ID"), get(token_var)) {
            (Some(space_id), Some(access_token)) => Ok(Self {
                space_id,
                access_token,
                host: host.to_string(),
                environment: get("CONTENTFUL_ENVIRONMENT").unwrap_or_else(|| "master".into()),
                use_preview,
            }),
            _ => Err(Error::Config(format!(
                "Contentful space id and access token need to be provided \
                 (CONTENTFUL_SPACE_ID and {})",
                token_var
            ))),
        }
    }
}
