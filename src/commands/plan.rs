//! Print the page plan

use anyhow::Result;
use std::path::Path;

use crate::plan::PagePlan;
use crate::Site;

/// Fetch content, build the plan and print it without rendering
pub async fn run(site: &Site, snapshot: Option<&Path>, json: bool) -> Result<()> {
    let source = site.source(snapshot)?;
    let (_, plan) = site.plan(&source).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", format_plan(&plan));
    }

    Ok(())
}

/// One `path  template` line per entry, posts then tags then authors
pub fn format_plan(plan: &PagePlan) -> String {
    let width = plan.iter().map(|e| e.path.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in plan.iter() {
        out.push_str(&format!("{:width$}  {}\n", entry.path, entry.template, width = width));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Author, Post};
    use crate::plan::build_plan;

    #[test]
    fn test_format_plan() {
        let mut post = Post::new("hello");
        post.tags = vec![crate::content::Tag::new("Rust")];
        let plan = build_plan(&[post], &[Author::new("Jane")]).unwrap();

        let text = format_plan(&plan);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("hello "));
        assert!(lines[0].ends_with("  post"));
        assert!(lines[1].starts_with("/tags/rust/"));
        assert!(lines[1].ends_with("tags"));
        assert!(lines[2].starts_with("/author/jane/"));
        assert!(lines[2].ends_with("author"));
    }

    #[test]
    fn test_format_empty_plan() {
        assert_eq!(format_plan(&PagePlan::default()), "");
    }
}
