//! Page plan builder
//!
//! Turns the posts and authors of one content query into the full list of
//! pages to generate. Every entry names its output route, the template that
//! renders it and the context handed to that template:
//!
//! - one page per post, routed at the post slug, linked to its neighbours in
//!   list order and tagged with its primary tag;
//! - one page per distinct tag, at `/tags/<kebab-case tag>/`;
//! - one page per author, at `/author/<kebab-case id>/`.
//!
//! Building is a pure function of its inputs. Registering the pages with the
//! renderer happens in [`crate::generator`].

mod order;

pub use order::{order_posts, PostOrder};

use indexmap::IndexSet;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fmt;

use crate::content::{Author, Post};
use crate::error::{Error, Result};
use crate::helpers::{kebab_case, route_key};

/// Name of the template that renders a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TemplateRef(String);

impl TemplateRef {
    pub const POST: &'static str = "post";
    pub const TAGS: &'static str = "tags";
    pub const AUTHOR: &'static str = "author";
    pub const INDEX: &'static str = "index";

    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which group an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Post,
    Tag,
    Author,
}

/// One page to generate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlanEntry {
    pub path: String,
    pub template: TemplateRef,
    pub kind: PageKind,
    pub context: Map<String, Value>,
}

impl PagePlanEntry {
    /// A string value from the context, e.g. `slug`, `tag` or `author`
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

/// The three disjoint groups of pages derived from one result set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PagePlan {
    pub posts: Vec<PagePlanEntry>,
    pub tags: Vec<PagePlanEntry>,
    pub authors: Vec<PagePlanEntry>,
}

impl PagePlan {
    pub fn iter(&self) -> impl Iterator<Item = &PagePlanEntry> {
        self.posts
            .iter()
            .chain(self.tags.iter())
            .chain(self.authors.iter())
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.tags.len() + self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail on the first path claimed by two entries
    pub fn check_unique_paths(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in self.iter() {
            if !seen.insert(route_key(&entry.path)) {
                return Err(Error::DuplicatePath {
                    path: entry.path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Build the page plan for `posts` (in the order given) and `authors`
pub fn build_plan(posts: &[Post], authors: &[Author]) -> Result<PagePlan> {
    let plan = PagePlan {
        posts: post_pages(posts),
        tags: tag_pages(posts),
        authors: author_pages(authors),
    };
    plan.check_unique_paths()?;

    tracing::debug!(
        "Planned {} post, {} tag and {} author pages",
        plan.posts.len(),
        plan.tags.len(),
        plan.authors.len()
    );
    Ok(plan)
}

/// One entry per post, neighbours taken from list position
pub fn post_pages(posts: &[Post]) -> Vec<PagePlanEntry> {
    posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let prev = i.checked_sub(1).and_then(|j| posts.get(j));
            let next = posts.get(i + 1);

            let mut context = Map::new();
            context.insert("slug".into(), Value::String(post.slug.clone()));
            context.insert("prev".into(), prev.map_or(Value::Null, neighbour));
            context.insert("next".into(), next.map_or(Value::Null, neighbour));
            context.insert(
                "primaryTag".into(),
                Value::String(post.primary_tag().to_string()),
            );

            PagePlanEntry {
                path: post.slug.clone(),
                template: TemplateRef::new(post.layout.as_deref().unwrap_or(TemplateRef::POST)),
                kind: PageKind::Post,
                context,
            }
        })
        .collect()
}

/// One entry per distinct tag slug, in order of first appearance
pub fn tag_pages(posts: &[Post]) -> Vec<PagePlanEntry> {
    let tags: IndexSet<&str> = posts
        .iter()
        .flat_map(|p| p.tags.iter().map(|t| t.slug.as_str()))
        .collect();

    tags.into_iter()
        .map(|tag| PagePlanEntry {
            path: tag_path(tag),
            template: TemplateRef::new(TemplateRef::TAGS),
            kind: PageKind::Tag,
            context: single("tag", tag),
        })
        .collect()
}

/// One entry per author, whether or not they wrote any post
pub fn author_pages(authors: &[Author]) -> Vec<PagePlanEntry> {
    authors
        .iter()
        .map(|author| PagePlanEntry {
            path: author_path(&author.id),
            template: TemplateRef::new(TemplateRef::AUTHOR),
            kind: PageKind::Author,
            context: single("author", &author.id),
        })
        .collect()
}

pub fn tag_path(tag: &str) -> String {
    format!("/tags/{}/", kebab_case(tag))
}

pub fn author_path(id: &str) -> String {
    format!("/author/{}/", kebab_case(id))
}

/// The subset of a post passed to its neighbours' templates
fn neighbour(post: &Post) -> Value {
    let mut value = json!({
        "slug": post.slug,
        "id": post.id,
        "tags": post.tags.iter().map(|t| t.slug.as_str()).collect::<Vec<_>>(),
    });
    if let Some(title) = &post.title {
        value["title"] = Value::String(title.clone());
    }
    value
}

fn single(key: &str, value: &str) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert(key.to_string(), Value::String(value.to_string()));
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Tag;

    fn post(slug: &str, tags: &[&str]) -> Post {
        let mut post = Post::new(slug);
        post.id = format!("id-{}", slug);
        post.tags = tags.iter().map(|t| Tag::new(t)).collect();
        post
    }

    fn paths(entries: &[PagePlanEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_two_post_example() {
        let posts = vec![post("a", &[]), post("b", &["Go Lang"])];
        let plan = build_plan(&posts, &[]).unwrap();

        assert_eq!(paths(&plan.posts), vec!["a", "b"]);

        let a = &plan.posts[0];
        assert_eq!(a.template.as_str(), "post");
        assert_eq!(a.context["prev"], Value::Null);
        assert_eq!(a.context["next"]["slug"], "b");
        assert_eq!(a.context_str("primaryTag"), Some(""));

        let b = &plan.posts[1];
        assert_eq!(b.context["prev"]["slug"], "a");
        assert_eq!(b.context["next"], Value::Null);
        assert_eq!(b.context_str("primaryTag"), Some("Go Lang"));

        assert_eq!(plan.tags.len(), 1);
        assert_eq!(plan.tags[0].path, "/tags/go-lang/");
        assert_eq!(plan.tags[0].template.as_str(), "tags");
        assert_eq!(plan.tags[0].context_str("tag"), Some("Go Lang"));
    }

    #[test]
    fn test_single_post_has_no_neighbours() {
        let plan = build_plan(&[post("only", &["x"])], &[]).unwrap();
        assert_eq!(plan.posts[0].context["prev"], Value::Null);
        assert_eq!(plan.posts[0].context["next"], Value::Null);
    }

    #[test]
    fn test_middle_post_neighbours_follow_list_order() {
        let posts = vec![post("c", &[]), post("a", &[]), post("b", &[])];
        let plan = build_plan(&posts, &[]).unwrap();
        let middle = &plan.posts[1];
        assert_eq!(middle.context["prev"]["slug"], "c");
        assert_eq!(middle.context["next"]["slug"], "b");
        assert_eq!(middle.context["next"]["id"], "id-b");
    }

    #[test]
    fn test_layout_selects_template() {
        let mut custom = post("custom", &[]);
        custom.layout = Some("page".to_string());
        let plan = build_plan(&[custom, post("plain", &[])], &[]).unwrap();
        assert_eq!(plan.posts[0].template.as_str(), "page");
        assert_eq!(plan.posts[1].template.as_str(), "post");
    }

    #[test]
    fn test_primary_tag_is_first_tag() {
        let plan = build_plan(&[post("a", &["Rust", "Go"])], &[]).unwrap();
        assert_eq!(plan.posts[0].context_str("primaryTag"), Some("Rust"));
    }

    #[test]
    fn test_tags_deduplicated() {
        let posts = vec![
            post("a", &["Rust", "Web Dev"]),
            post("b", &["Rust"]),
            post("c", &["Web Dev", "CLI"]),
        ];
        let plan = build_plan(&posts, &[]).unwrap();
        assert_eq!(
            paths(&plan.tags),
            vec!["/tags/rust/", "/tags/web-dev/", "/tags/cli/"]
        );
    }

    #[test]
    fn test_author_pages() {
        let authors = vec![Author::new("Jane Doe"), Author::new("johnSmith")];
        let plan = build_plan(&[post("a", &[])], &authors).unwrap();
        assert_eq!(
            paths(&plan.authors),
            vec!["/author/jane-doe/", "/author/john-smith/"]
        );
        assert_eq!(plan.authors[0].template.as_str(), "author");
        assert_eq!(plan.authors[1].context_str("author"), Some("johnSmith"));
    }

    #[test]
    fn test_empty_inputs() {
        let plan = build_plan(&[], &[]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_duplicate_paths_conflict() {
        let posts = vec![post("same", &[]), post("/same/", &[])];
        match build_plan(&posts, &[]) {
            Err(Error::DuplicatePath { path }) => assert_eq!(path, "/same/"),
            other => panic!("expected duplicate path, got {:?}", other),
        }

        let clashing_tags = vec![post("a", &["Go Lang", "go-lang"])];
        assert!(matches!(
            build_plan(&clashing_tags, &[]),
            Err(Error::DuplicatePath { .. })
        ));
    }

    #[test]
    fn test_entry_counts() {
        let posts: Vec<Post> = (0..5).map(|i| post(&format!("p{}", i), &["t"])).collect();
        let authors = vec![Author::new("a"), Author::new("b")];
        let plan = build_plan(&posts, &authors).unwrap();
        assert_eq!(plan.posts.len(), 5);
        assert_eq!(plan.tags.len(), 1);
        assert_eq!(plan.authors.len(), 2);
        assert_eq!(plan.len(), 8);
        assert_eq!(plan.iter().count(), 8);
    }
}
