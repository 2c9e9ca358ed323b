//! Build stages and the per-stage bundler hook

use serde::Serialize;
use std::fmt;

/// The stage a build runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStage {
    /// Interactive development build (dev server)
    Develop,
    /// Server-side HTML pass of a development build
    DevelopHtml,
    BuildJavascript,
    /// Production HTML build
    BuildHtml,
}

impl BuildStage {
    pub fn is_develop(self) -> bool {
        matches!(self, BuildStage::Develop | BuildStage::DevelopHtml)
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Develop => "develop",
            BuildStage::DevelopHtml => "develop-html",
            BuildStage::BuildJavascript => "build-javascript",
            BuildStage::BuildHtml => "build-html",
        };
        f.write_str(name)
    }
}

/// Extra bundler settings requested for a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerOverrides {
    pub devtool: &'static str,
}

impl BundlerOverrides {
    pub fn inline_source_map(&self) -> bool {
        self.devtool == "eval-source-map"
    }
}

/// Development stages get inline source maps; every other stage is left alone
pub fn on_build_stage(stage: BuildStage) -> Option<BundlerOverrides> {
    if stage.is_develop() {
        tracing::debug!("Enabling inline source maps for {} stage", stage);
        Some(BundlerOverrides {
            devtool: "eval-source-map",
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_develop_stages_request_source_maps() {
        for stage in [BuildStage::Develop, BuildStage::DevelopHtml] {
            let overrides = on_build_stage(stage).unwrap();
            assert_eq!(overrides.devtool, "eval-source-map");
            assert!(overrides.inline_source_map());
        }
    }

    #[test]
    fn test_build_stages_are_noops() {
        assert!(on_build_stage(BuildStage::BuildHtml).is_none());
        assert!(on_build_stage(BuildStage::BuildJavascript).is_none());
    }
}
