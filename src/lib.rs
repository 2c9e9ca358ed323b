//! contentpress: a static blog generator fed by a headless CMS
//!
//! A build runs one content query, derives the page plan from its result
//! (one page per post, tag and author) and renders every planned page with
//! Tera templates into the public directory.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod plan;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use content::{ContentSource, ContentfulSource, ResultSet, SnapshotSource, Source};
use generator::{BuildStage, GenerateReport, Generator};
use plan::{build_plan, order_posts, PagePlan};

/// A site on disk: its configuration and resolved directories
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: PathBuf,
    /// Template overrides
    pub templates_dir: PathBuf,
    /// Local content (authors file, snapshots)
    pub content_dir: PathBuf,
}

impl Site {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            public_dir: base_dir.join(&config.public_dir),
            static_dir: base_dir.join(&config.static_dir),
            templates_dir: base_dir.join(&config.templates_dir),
            content_dir: base_dir.join(&config.content_dir),
            config,
            base_dir,
        }
    }

    pub fn authors_file(&self) -> PathBuf {
        self.content_dir.join(&self.config.authors_file)
    }

    /// Pick the content source: an explicit snapshot, the configured
    /// snapshot, or the content API with credentials from the environment
    pub fn source(&self, snapshot: Option<&Path>) -> Result<Source> {
        let snapshot = snapshot
            .map(Path::to_path_buf)
            .or_else(|| self.config.snapshot.as_ref().map(|s| self.base_dir.join(s)));

        match snapshot {
            Some(path) => Ok(Source::Snapshot(
                SnapshotSource::new(path).with_authors_file(self.authors_file()),
            )),
            None => {
                let credentials = config::ContentfulConfig::from_env()?;
                Ok(Source::Contentful(ContentfulSource::new(
                    &credentials,
                    self.authors_file(),
                )))
            }
        }
    }

    /// Run the content query and order the posts. Query errors are fatal.
    pub async fn fetch<S: ContentSource>(&self, source: &S) -> Result<ResultSet> {
        let mut set = source.query().await?.into_result_set()?;
        order_posts(&mut set.posts, self.config.post_order);
        tracing::info!(
            "Fetched {} posts and {} authors",
            set.posts.len(),
            set.authors.len()
        );
        Ok(set)
    }

    /// Fetch content and derive the page plan without rendering anything
    pub async fn plan<S: ContentSource>(&self, source: &S) -> Result<(ResultSet, PagePlan)> {
        let set = self.fetch(source).await?;
        let plan = build_plan(&set.posts, &set.authors)?;
        Ok((set, plan))
    }

    /// Fetch, plan and render the whole site
    pub async fn generate<S: ContentSource>(
        &self,
        source: &S,
        stage: BuildStage,
    ) -> Result<GenerateReport> {
        let (set, plan) = self.plan(source).await?;
        let generator = Generator::new(self, stage)?;
        generator.generate(&set, &plan)
    }
}
