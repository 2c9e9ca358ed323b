//! Explicit post ordering applied before neighbours are linked

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::content::Post;

/// Order in which posts are handed to the page plan builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOrder {
    /// Newest first; undated posts last
    #[default]
    DateDesc,
    /// Oldest first; undated posts last
    DateAsc,
    /// Keep the order the content API returned
    Source,
}

/// Sort posts in place. The sort is stable, so posts with equal or missing
/// dates keep their relative source order.
pub fn order_posts(posts: &mut [Post], order: PostOrder) {
    let by_date = |a: &Post, b: &Post, newest_first: bool| match (&a.date, &b.date) {
        (Some(x), Some(y)) if newest_first => y.cmp(x),
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    match order {
        PostOrder::DateDesc => posts.sort_by(|a, b| by_date(a, b, true)),
        PostOrder::DateAsc => posts.sort_by(|a, b| by_date(a, b, false)),
        PostOrder::Source => {}
    }

    if order != PostOrder::Source {
        let undated = posts.iter().filter(|p| p.date.is_none()).count();
        if undated > 0 {
            tracing::warn!("{} posts have no date and were placed last", undated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_date_string;

    fn dated(slug: &str, date: Option<&str>) -> Post {
        let mut post = Post::new(slug);
        post.date = date.and_then(parse_date_string);
        post
    }

    fn slugs(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            dated("old", Some("2019-01-01")),
            dated("undated-a", None),
            dated("new", Some("2021-05-01")),
            dated("undated-b", None),
            dated("mid", Some("2020-03-01")),
        ]
    }

    #[test]
    fn test_date_desc() {
        let mut posts = sample();
        order_posts(&mut posts, PostOrder::DateDesc);
        assert_eq!(
            slugs(&posts),
            vec!["new", "mid", "old", "undated-a", "undated-b"]
        );
    }

    #[test]
    fn test_date_asc() {
        let mut posts = sample();
        order_posts(&mut posts, PostOrder::DateAsc);
        assert_eq!(
            slugs(&posts),
            vec!["old", "mid", "new", "undated-a", "undated-b"]
        );
    }

    #[test]
    fn test_source_order_untouched() {
        let mut posts = sample();
        order_posts(&mut posts, PostOrder::Source);
        assert_eq!(
            slugs(&posts),
            vec!["old", "undated-a", "new", "undated-b", "mid"]
        );
    }
}
