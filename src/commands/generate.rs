//! Generate static files

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

use crate::generator::{BuildStage, GenerateReport};
use crate::Site;

/// Query the content source once and render the whole site
pub async fn run(site: &Site, stage: BuildStage, snapshot: Option<&Path>) -> Result<GenerateReport> {
    let start = Instant::now();

    let source = site.source(snapshot)?;
    tracing::info!("Generating site ({} stage)", stage);

    let report = site
        .generate(&source, stage)
        .await
        .context("Site generation aborted")?;

    tracing::info!(
        "Generated {} pages ({} static files) in {:.2}s",
        report.total_pages(),
        report.static_files,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}
