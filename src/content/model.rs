//! Post, Tag and Author models

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A blog post as returned by the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Routing key, unique across posts
    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Tags in the order the author attached them
    #[serde(default, deserialize_with = "one_or_many_tags")]
    pub tags: Vec<Tag>,

    /// Template variant; `post` when absent
    #[serde(default)]
    pub layout: Option<String>,

    /// Publication date
    #[serde(
        default,
        alias = "publishDate",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<FixedOffset>>,

    /// Id of the author who wrote the post
    #[serde(default, deserialize_with = "author_ref")]
    pub author: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub excerpt: Option<String>,

    /// Markdown body
    #[serde(default)]
    pub body: Option<String>,

    /// Cover image URL
    #[serde(default)]
    pub image: Option<String>,
}

impl Post {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            id: String::new(),
            title: None,
            tags: Vec::new(),
            layout: None,
            date: None,
            author: None,
            draft: false,
            excerpt: None,
            body: None,
            image: None,
        }
    }

    /// Slug of the first tag, used to group related posts
    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(|t| t.slug.as_str()).unwrap_or("")
    }

    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug.eq_ignore_ascii_case(slug))
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.slug)
    }
}

/// A tag reference attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagRepr")]
pub struct Tag {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Tag {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            description: None,
            image: None,
        }
    }
}

/// Tags arrive either as bare slugs or as full records
#[derive(Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Slug(String),
    Record {
        slug: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        image: Option<String>,
    },
}

impl From<TagRepr> for Tag {
    fn from(repr: TagRepr) -> Self {
        match repr {
            TagRepr::Slug(slug) => Tag::new(&slug),
            TagRepr::Record {
                slug,
                description,
                image,
            } => Tag {
                slug,
                description,
                image,
            },
        }
    }
}

/// An author profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl Author {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            bio: None,
            website: None,
            twitter: None,
            github: None,
            linkedin: None,
            location: None,
            avatar: None,
            profile_image: None,
        }
    }
}

/// Accepts a missing value, a single tag or a list of tags
fn one_or_many_tags<'de, D>(deserializer: D) -> Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Tag>),
        One(Tag),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(tags)) => tags,
        Some(OneOrMany::One(tag)) => vec![tag],
    })
}

/// Accepts `"Jane Doe"`, `{ "id": "Jane Doe" }` or a linked person record,
/// which falls back to its `name` or `title`
fn author_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AuthorRef {
        Id(String),
        Node {
            id: Option<String>,
            name: Option<String>,
            title: Option<String>,
        },
    }

    Ok(
        Option::<AuthorRef>::deserialize(deserializer)?.and_then(|r| match r {
            AuthorRef::Id(id) => Some(id),
            AuthorRef::Node { id, name, title } => id.or(name).or(title),
        }),
    )
}

/// Unparseable dates are dropped with a warning rather than failing the query
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let parsed = parse_date_string(&s);
        if parsed.is_none() {
            tracing::warn!("Ignoring unparseable post date {:?}", s);
        }
        parsed
    }))
}

/// Parse a date string in the formats content APIs commonly emit
pub fn parse_date_string(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;
    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, utc));
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        utc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_accept_strings_records_and_single_values() {
        let post: Post = serde_json::from_str(
            r#"{"slug": "a", "tags": ["Go Lang", {"slug": "rust", "description": "Systems"}]}"#,
        )
        .unwrap();
        assert_eq!(post.tags.len(), 2);
        assert_eq!(post.tags[0], Tag::new("Go Lang"));
        assert_eq!(post.tags[1].description.as_deref(), Some("Systems"));

        let single: Post = serde_json::from_str(r#"{"slug": "b", "tags": "solo"}"#).unwrap();
        assert_eq!(single.tags, vec![Tag::new("solo")]);

        let none: Post = serde_json::from_str(r#"{"slug": "c", "tags": null}"#).unwrap();
        assert!(none.tags.is_empty());
        assert_eq!(none.primary_tag(), "");
    }

    #[test]
    fn test_author_ref_forms() {
        let by_id: Post = serde_json::from_str(r#"{"slug": "a", "author": "Jane"}"#).unwrap();
        let by_node: Post =
            serde_json::from_str(r#"{"slug": "a", "author": {"id": "Jane"}}"#).unwrap();
        assert_eq!(by_id.author.as_deref(), Some("Jane"));
        assert_eq!(by_node.author, by_id.author);

        let person: Post = serde_json::from_str(
            r#"{"slug": "a", "author": {"name": "Jane Doe", "shortBio": "Writes"}}"#,
        )
        .unwrap();
        assert_eq!(person.author.as_deref(), Some("Jane Doe"));

        let anonymous: Post =
            serde_json::from_str(r#"{"slug": "a", "author": {"shortBio": "Writes"}}"#).unwrap();
        assert!(anonymous.author.is_none());
    }

    #[test]
    fn test_dates() {
        let post: Post =
            serde_json::from_str(r#"{"slug": "a", "publishDate": "2020-03-01"}"#).unwrap();
        assert_eq!(
            post.date.unwrap().to_rfc3339(),
            "2020-03-01T00:00:00+00:00"
        );

        let bad: Post = serde_json::from_str(r#"{"slug": "a", "date": "someday"}"#).unwrap();
        assert!(bad.date.is_none());

        assert!(parse_date_string("2021-06-01T10:00:00.000+02:00").is_some());
        assert!(parse_date_string("2021-06-01T10:00").is_some());
    }
}
