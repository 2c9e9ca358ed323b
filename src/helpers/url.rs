//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/tags/go-lang/") // -> "/blog/tags/go-lang/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/author/jane-doe/") // -> "https://example.com/blog/author/jane-doe/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Normalise a page path for comparison: no leading or trailing slashes
pub fn route_key(path: &str) -> &str {
    path.trim_matches('/')
}

/// Link path for a post slug, which may be given with or without slashes
pub fn post_path(slug: &str) -> String {
    let key = route_key(slug);
    if key.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/author/jane-doe/"),
            "https://example.com/blog/author/jane-doe/"
        );
    }

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("hello-world"), "/hello-world/");
        assert_eq!(post_path("/2020/hello/"), "/2020/hello/");
        assert_eq!(route_key("/tags/go/"), "tags/go");
    }
}
