//! Generator module - registers planned pages and writes them to disk
//!
//! Each [`PagePlanEntry`] is resolved to a template, enriched with the data the
//! template displays and rendered into `public/<path>/index.html`. The index
//! feed is paginated here as well since it is not part of the page plan.

mod stage;

pub use stage::{on_build_stage, BuildStage, BundlerOverrides};

use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use walkdir::WalkDir;

use crate::content::{Author, MarkdownRenderer, Post, ResultSet};
use crate::error::{Error, Result};
use crate::helpers::{post_path, route_key};
use crate::plan::{author_path, tag_path, PageKind, PagePlan, PagePlanEntry, TemplateRef};
use crate::templates::{ConfigData, PaginationData, PostData, TagData, TemplateRenderer};
use crate::Site;

/// Summary of a finished generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub post_pages: usize,
    pub tag_pages: usize,
    pub author_pages: usize,
    pub index_pages: usize,
    pub static_files: usize,
}

impl GenerateReport {
    pub fn total_pages(&self) -> usize {
        self.post_pages + self.tag_pages + self.author_pages + self.index_pages
    }
}

/// Renders a page plan with the site's templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
    stage: BuildStage,
    overrides: Option<BundlerOverrides>,
}

impl Generator {
    pub fn new(site: &Site, stage: BuildStage) -> Result<Self> {
        let renderer = TemplateRenderer::with_overrides(&site.config, &site.templates_dir)?;
        Ok(Self {
            site: site.clone(),
            renderer,
            markdown: MarkdownRenderer::new(),
            stage,
            overrides: on_build_stage(stage),
        })
    }

    /// Generate every planned page plus the index feed and static files.
    /// All pages are checked and rendered before anything is written.
    pub fn generate(&self, set: &ResultSet, plan: &PagePlan) -> Result<GenerateReport> {
        self.validate(set, plan)?;

        let mut report = GenerateReport::default();
        let mut pages = Vec::with_capacity(plan.len());
        for entry in plan.iter() {
            pages.push(self.render_entry(entry, set)?);
            match entry.kind {
                PageKind::Post => report.post_pages += 1,
                PageKind::Tag => report.tag_pages += 1,
                PageKind::Author => report.author_pages += 1,
            }
        }
        let index_pages = self.render_index_pages(&set.posts)?;
        report.index_pages = index_pages.len();
        pages.extend(index_pages);

        fs::create_dir_all(&self.site.public_dir)
            .map_err(|e| Error::io(&self.site.public_dir, e))?;
        report.static_files = self.copy_static_assets()?;
        for (path, html) in &pages {
            write_page(path, html)?;
        }

        tracing::info!(
            "Generated {} post, {} tag and {} author pages",
            report.post_pages,
            report.tag_pages,
            report.author_pages
        );
        Ok(report)
    }

    /// Reject plans that cannot be written in full: bad paths, unknown
    /// templates, or posts landing on an index feed route
    pub fn validate(&self, set: &ResultSet, plan: &PagePlan) -> Result<()> {
        let index_routes: HashSet<String> = (1..=self.index_page_count(set.posts.len()))
            .map(|n| route_key(&self.index_url(n)).to_string())
            .collect();

        for entry in plan.iter() {
            let key = output_key(entry)?;
            if index_routes.contains(key) {
                return Err(Error::DuplicatePath {
                    path: entry.path.clone(),
                });
            }
            let name = TemplateRenderer::file_name(entry.template.as_str());
            if !self.renderer.has_template(&name) {
                return Err(Error::MissingTemplate(name));
            }
        }

        if !self.renderer.has_template(TemplateRef::INDEX) {
            return Err(Error::MissingTemplate(TemplateRenderer::file_name(
                TemplateRef::INDEX,
            )));
        }
        Ok(())
    }

    /// Render one plan entry and write it to its route
    pub fn register(&self, entry: &PagePlanEntry, set: &ResultSet) -> Result<PathBuf> {
        let (output_path, html) = self.render_entry(entry, set)?;
        write_page(&output_path, &html)?;
        Ok(output_path)
    }

    fn render_entry(&self, entry: &PagePlanEntry, set: &ResultSet) -> Result<(PathBuf, String)> {
        let key = output_key(entry)?;

        let mut context = self.base_context(&format!("/{}/", key));
        context.insert("page", &entry.context);
        match entry.kind {
            PageKind::Post => self.post_context(entry, set, &mut context),
            PageKind::Tag => self.tag_context(entry, set, &mut context),
            PageKind::Author => self.author_context(entry, set, &mut context),
        }

        let html = self.render(&entry.template, entry, &context)?;
        let output_path = self.site.public_dir.join(key).join("index.html");
        tracing::debug!("Rendered {}: {:?}", entry.template, output_path);
        Ok((output_path, html))
    }

    fn render(
        &self,
        template: &TemplateRef,
        entry: &PagePlanEntry,
        context: &Context,
    ) -> Result<String> {
        let html = self.renderer.render(template.as_str(), context)?;
        match &self.overrides {
            Some(o) if o.inline_source_map() => Ok(inline_source_map(&html, entry)),
            _ => Ok(html),
        }
    }

    fn base_context(&self, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&self.site.config));
        context.insert("current_path", current_path);
        context.insert("stage", &self.stage);
        context.insert("develop", &self.stage.is_develop());
        context
    }

    fn post_context(&self, entry: &PagePlanEntry, set: &ResultSet, context: &mut Context) {
        let slug = entry.context_str("slug").unwrap_or(&entry.path);
        let post = set.posts.iter().find(|p| p.slug == slug);
        let primary_tag = entry.context_str("primaryTag").unwrap_or("");

        let (data, content) = match post {
            Some(post) => (
                self.post_data(post),
                post.body
                    .as_deref()
                    .map(|body| self.markdown.render(&MarkdownRenderer::split_excerpt(body).1))
                    .unwrap_or_default(),
            ),
            None => (self.post_data(&Post::new(slug)), String::new()),
        };

        let related = related_posts(&set.posts, slug, primary_tag);
        let related_total = related.len();
        let related: Vec<PostData> = related
            .into_iter()
            .take(self.site.config.related_posts)
            .map(|p| self.post_data(p))
            .collect();

        let author = post
            .and_then(|p| p.author.as_deref())
            .and_then(|id| set.authors.iter().find(|a| a.id == id));

        context.insert("post", &data);
        context.insert("content", &content);
        context.insert("related_posts", &related);
        context.insert("related_total", &related_total);
        context.insert("author", &author);
        for (key, name) in [("prev", "prev_post"), ("next", "next_post")] {
            let neighbour = entry.context.get(key).unwrap_or(&Value::Null);
            context.insert(name, &self.neighbour_data(neighbour, set));
        }
    }

    fn tag_context(&self, entry: &PagePlanEntry, set: &ResultSet, context: &mut Context) {
        let tag = entry.context_str("tag").unwrap_or_default();
        let posts: Vec<&Post> = set.posts.iter().filter(|p| p.has_tag(tag)).collect();

        // Tag details come from the first post carrying the tag
        let record = posts
            .iter()
            .flat_map(|p| p.tags.iter())
            .find(|t| t.slug.eq_ignore_ascii_case(tag));
        let data = TagData {
            slug: tag.to_string(),
            path: tag_path(tag),
            description: record.and_then(|t| t.description.clone()),
            image: record.and_then(|t| t.image.clone()),
        };

        let posts: Vec<PostData> = posts.into_iter().map(|p| self.post_data(p)).collect();
        context.insert("tag", &data);
        context.insert("total_count", &posts.len());
        context.insert("posts", &posts);
    }

    fn author_context(&self, entry: &PagePlanEntry, set: &ResultSet, context: &mut Context) {
        let id = entry.context_str("author").unwrap_or_default();
        let author = set
            .authors
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .unwrap_or_else(|| Author::new(id));

        let posts: Vec<PostData> = set
            .posts
            .iter()
            .filter(|p| p.author.as_deref() == Some(id))
            .filter(|p| !p.draft || self.stage.is_develop())
            .map(|p| self.post_data(p))
            .collect();

        context.insert("author", &author);
        context.insert("total_count", &posts.len());
        context.insert("posts", &posts);
    }

    /// Look a neighbour reference up in the result set, falling back to the
    /// reference itself
    fn neighbour_data(&self, neighbour: &Value, set: &ResultSet) -> Option<PostData> {
        let slug = neighbour.get("slug")?.as_str()?;
        match set.posts.iter().find(|p| p.slug == slug) {
            Some(post) => Some(self.post_data(post)),
            None => Some(self.post_data(&Post::new(slug))),
        }
    }

    fn post_data(&self, post: &Post) -> PostData {
        let excerpt = post.excerpt.clone().or_else(|| {
            post.body
                .as_deref()
                .and_then(|body| MarkdownRenderer::split_excerpt(body).0)
                .map(|e| self.markdown.render(&e))
        });

        PostData {
            slug: post.slug.clone(),
            id: post.id.clone(),
            title: post.display_title().to_string(),
            path: post_path(&post.slug),
            date: post.date.map(|d| d.to_rfc3339()),
            tags: post
                .tags
                .iter()
                .map(|t| TagData {
                    slug: t.slug.clone(),
                    path: tag_path(&t.slug),
                    description: t.description.clone(),
                    image: t.image.clone(),
                })
                .collect(),
            author: post.author.clone(),
            author_path: post.author.as_deref().map(author_path),
            excerpt,
            image: post.image.clone(),
            draft: post.draft,
        }
    }

    fn index_page_count(&self, posts: usize) -> usize {
        posts.div_ceil(self.site.config.per_page.max(1)).max(1)
    }

    /// `/` for the first index page, `/{pagination_dir}/N/` after it
    fn index_url(&self, n: usize) -> String {
        if n == 1 {
            "/".to_string()
        } else {
            let pagination_dir = self.site.config.pagination_dir.trim_matches('/');
            format!("/{}/{}/", pagination_dir, n)
        }
    }

    /// Render the index feed: `/index.html`, then `/page/N/index.html`
    fn render_index_pages(&self, posts: &[Post]) -> Result<Vec<(PathBuf, String)>> {
        let per_page = self.site.config.per_page.max(1);
        let total_pages = self.index_page_count(posts.len());
        let mut pages = Vec::with_capacity(total_pages);

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(posts.len());
            let page_posts: Vec<PostData> =
                posts[start..end].iter().map(|p| self.post_data(p)).collect();

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                current_url: self.index_url(page_num),
                prev_link: (page_num > 1).then(|| self.index_url(page_num - 1)),
                next_link: (page_num < total_pages).then(|| self.index_url(page_num + 1)),
            };

            let mut context = self.base_context(&pagination.current_url);
            context.insert("posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.renderer.render(TemplateRef::INDEX, &context)?;
            let output_path = self
                .site
                .public_dir
                .join(route_key(&pagination.current_url))
                .join("index.html");
            tracing::debug!("Rendered index page {}: {:?}", page_num, output_path);
            pages.push((output_path, html));
        }

        Ok(pages)
    }

    /// Copy the static directory (stylesheets, images) into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.site.static_dir;
        if !static_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir).unwrap_or(path);
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::copy(path, &dest).map_err(|e| Error::io(&dest, e))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(copied)
    }
}

/// Other posts sharing the primary tag, in list order. Unlike a plain
/// primary-tag lookup, the post itself is never listed as related to itself.
pub fn related_posts<'a>(posts: &'a [Post], slug: &str, primary_tag: &str) -> Vec<&'a Post> {
    if primary_tag.is_empty() {
        return Vec::new();
    }
    posts
        .iter()
        .filter(|p| p.slug != slug && p.has_tag(primary_tag))
        .collect()
}

/// Embed the page's template and plan entry as an inline JSON block
fn inline_source_map(html: &str, entry: &PagePlanEntry) -> String {
    let map = serde_json::json!({
        "path": entry.path,
        "template": entry.template,
        "context": entry.context,
    });
    // `</` cannot appear inside a script element
    let json = map.to_string().replace("</", "<\\/");
    let script = format!(
        "<script type=\"application/json\" id=\"page-source-map\">{}</script>\n",
        json
    );
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], script, &html[pos..]),
        None => format!("{}{}", html, script),
    }
}

/// Output directory of an entry relative to the public directory. Empty
/// paths and `.`/`..` segments would escape or clobber other routes.
fn output_key(entry: &PagePlanEntry) -> Result<&str> {
    let key = route_key(&entry.path);
    if key.is_empty() || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(Error::InvalidPath {
            path: entry.path.clone(),
            template: entry.template.to_string(),
        });
    }
    Ok(key)
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, html).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Tag;
    use crate::plan::build_plan;

    fn post(slug: &str, tags: &[&str], author: Option<&str>) -> Post {
        let mut post = Post::new(slug);
        post.title = Some(format!("Title {}", slug));
        post.tags = tags.iter().map(|t| Tag::new(t)).collect();
        post.author = author.map(str::to_string);
        post.body = Some(format!("Intro of {}\n<!-- more -->\nRest of {}", slug, slug));
        post
    }

    fn site(dir: &Path) -> Site {
        let mut config = SiteConfig::default();
        config.per_page = 2;
        Site::with_config(dir, config)
    }

    fn result_set() -> ResultSet {
        let mut draft = post("draft", &["Rust"], Some("Jane Doe"));
        draft.draft = true;
        ResultSet {
            posts: vec![
                post("first", &["Rust", "Go Lang"], Some("Jane Doe")),
                post("second", &["Go Lang"], None),
                draft,
            ],
            authors: vec![Author::new("Jane Doe"), Author::new("Nobody")],
        }
    }

    #[test]
    fn test_generate_writes_all_routes() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let set = result_set();
        let plan = build_plan(&set.posts, &set.authors).unwrap();

        let generator = Generator::new(&site, BuildStage::BuildHtml).unwrap();
        let report = generator.generate(&set, &plan).unwrap();

        assert_eq!(report.post_pages, 3);
        assert_eq!(report.tag_pages, 2);
        assert_eq!(report.author_pages, 2);
        assert_eq!(report.index_pages, 2);

        let public = &site.public_dir;
        for path in [
            "first/index.html",
            "second/index.html",
            "tags/rust/index.html",
            "tags/go-lang/index.html",
            "author/jane-doe/index.html",
            "author/nobody/index.html",
            "index.html",
            "page/2/index.html",
        ] {
            assert!(public.join(path).exists(), "missing {}", path);
        }

        let first = fs::read_to_string(public.join("first/index.html")).unwrap();
        assert!(first.contains("Title first"));
        assert!(first.contains("Rest of first"));
        assert!(first.contains("/second/"));
        assert!(!first.contains("page-source-map"));

        // Drafts are hidden on author pages outside develop
        let jane = fs::read_to_string(public.join("author/jane-doe/index.html")).unwrap();
        assert!(jane.contains("Title first"));
        assert!(!jane.contains("Title draft"));

        let tag = fs::read_to_string(public.join("tags/go-lang/index.html")).unwrap();
        assert!(tag.contains("Title first"));
        assert!(tag.contains("Title second"));
    }

    #[test]
    fn test_develop_stage_inlines_source_map_and_shows_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let set = result_set();
        let plan = build_plan(&set.posts, &set.authors).unwrap();

        let generator = Generator::new(&site, BuildStage::Develop).unwrap();
        generator.generate(&set, &plan).unwrap();

        let first = fs::read_to_string(site.public_dir.join("first/index.html")).unwrap();
        assert!(first.contains(r#"id="page-source-map""#));
        assert!(first.contains(r#""template":"post""#));

        let jane = fs::read_to_string(site.public_dir.join("author/jane-doe/index.html")).unwrap();
        assert!(jane.contains("Title draft"));
    }

    #[test]
    fn test_missing_layout_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let mut custom = post("custom", &[], None);
        custom.layout = Some("gallery".to_string());
        let set = ResultSet {
            posts: vec![custom],
            authors: Vec::new(),
        };
        let plan = build_plan(&set.posts, &set.authors).unwrap();

        let generator = Generator::new(&site, BuildStage::BuildHtml).unwrap();
        assert!(matches!(
            generator.generate(&set, &plan),
            Err(Error::MissingTemplate(name)) if name == "gallery.html"
        ));
    }

    #[test]
    fn test_empty_slug_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let set = ResultSet {
            posts: vec![post("", &[], None)],
            authors: Vec::new(),
        };
        let plan = build_plan(&set.posts, &set.authors).unwrap();

        let generator = Generator::new(&site, BuildStage::BuildHtml).unwrap();
        assert!(matches!(
            generator.generate(&set, &plan),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_failed_build_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        fs::create_dir_all(&site.static_dir).unwrap();
        fs::write(site.static_dir.join("style.css"), "body {}").unwrap();

        let mut second = post("second", &[], None);
        second.layout = Some("gallery".to_string());
        let set = ResultSet {
            posts: vec![post("first", &[], None), second],
            authors: Vec::new(),
        };
        let plan = build_plan(&set.posts, &set.authors).unwrap();

        let generator = Generator::new(&site, BuildStage::BuildHtml).unwrap();
        assert!(generator.generate(&set, &plan).is_err());
        assert!(!site.public_dir.exists());
    }

    #[test]
    fn test_post_on_index_route_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.per_page = 1;
        let site = Site::with_config(dir.path(), config);
        let set = ResultSet {
            posts: vec![post("a", &[], None), post("page/2", &[], None)],
            authors: Vec::new(),
        };
        let plan = build_plan(&set.posts, &set.authors).unwrap();

        let generator = Generator::new(&site, BuildStage::BuildHtml).unwrap();
        assert!(matches!(
            generator.generate(&set, &plan),
            Err(Error::DuplicatePath { path }) if path == "page/2"
        ));
        assert!(!site.public_dir.exists());

        // Past the last index page the route is free
        let set = ResultSet {
            posts: vec![post("a", &[], None), post("page/3", &[], None)],
            authors: Vec::new(),
        };
        let plan = build_plan(&set.posts, &set.authors).unwrap();
        generator.generate(&set, &plan).unwrap();
        let page = fs::read_to_string(site.public_dir.join("page/3/index.html")).unwrap();
        assert!(page.contains("Rest of page/3"));
    }

    #[test]
    fn test_dot_segments_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path());
        let generator = Generator::new(&site, BuildStage::BuildHtml).unwrap();

        for slug in [".", "../escape", "a/./b", "a//b"] {
            let set = ResultSet {
                posts: vec![post(slug, &[], None)],
                authors: Vec::new(),
            };
            let plan = build_plan(&set.posts, &set.authors).unwrap();
            assert!(
                matches!(generator.validate(&set, &plan), Err(Error::InvalidPath { .. })),
                "{} accepted",
                slug
            );
        }
    }

    #[test]
    fn test_related_posts_exclude_self() {
        let posts = vec![
            post("a", &["Rust"], None),
            post("b", &["Go", "Rust"], None),
            post("c", &["Rust"], None),
        ];
        let related: Vec<_> = related_posts(&posts, "a", "Rust")
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(related, vec!["b", "c"]);
        assert!(related_posts(&posts, "a", "").is_empty());
    }

    #[test]
    fn test_inline_source_map_placement() {
        let entry = PagePlanEntry {
            path: "a".to_string(),
            template: TemplateRef::new("post"),
            kind: PageKind::Post,
            context: serde_json::Map::new(),
        };
        let html = inline_source_map("<html><body><p>x</p></body></html>", &entry);
        assert!(html.ends_with("</script>\n</body></html>"));
    }
}
