//! List site content

use anyhow::Result;
use std::path::Path;

use crate::Site;

/// List posts, tags, authors or planned routes
pub async fn run(site: &Site, content_type: &str, snapshot: Option<&Path>) -> Result<()> {
    let source = site.source(snapshot)?;
    let (set, plan) = site.plan(&source).await?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", set.posts.len());
            for post in &set.posts {
                let date = post
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("  {} - {} [{}]", date, post.display_title(), post.slug);
            }
        }
        "tag" | "tags" => {
            println!("Tags ({}):", plan.tags.len());
            for entry in &plan.tags {
                let tag = entry.context_str("tag").unwrap_or_default();
                let count = set.posts.iter().filter(|p| p.has_tag(tag)).count();
                println!("  {} ({}) -> {}", tag, count, entry.path);
            }
        }
        "author" | "authors" => {
            println!("Authors ({}):", plan.authors.len());
            for entry in &plan.authors {
                let author = entry.context_str("author").unwrap_or_default();
                let count = set
                    .posts
                    .iter()
                    .filter(|p| p.author.as_deref() == Some(author))
                    .count();
                println!("  {} ({}) -> {}", author, count, entry.path);
            }
        }
        "route" | "routes" => {
            println!("Routes ({}):", plan.len());
            for entry in plan.iter() {
                println!("  {} [{}]", entry.path, entry.template);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, author, route",
                content_type
            );
        }
    }

    Ok(())
}
