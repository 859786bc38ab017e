//! URL helper functions

/// Site path of a post page
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", slug.trim_matches('/'))
}

/// Join a site base URL and a path
///
/// # Examples
/// ```ignore
/// full_url_for("https://example.com/", "/post/hello") // -> "https://example.com/post/hello"
/// ```
pub fn full_url_for(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{}/", base)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Whether a link target may be emitted as an `href`: `http`, `https` and
/// `mailto` URLs, or a relative reference. Whitespace and control characters
/// are ignored when reading the scheme, as browsers do.
pub fn is_safe_href(href: &str) -> bool {
    let href: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match href.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if href[i..].starts_with(':') => {
            matches!(
                href[..i].to_ascii_lowercase().as_str(),
                "http" | "https" | "mailto"
            )
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("hello-world"), "/post/hello-world");
        assert_eq!(post_path("/hello-world/"), "/post/hello-world");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(
            full_url_for("https://example.com/", "/post/a"),
            "https://example.com/post/a"
        );
        assert_eq!(full_url_for("https://example.com", ""), "https://example.com/");
    }

    #[test]
    fn test_is_safe_href() {
        for href in [
            "https://example.com/a?b=c",
            "HTTP://example.com",
            "mailto:jane@example.com",
            "/post/hello",
            "#top",
            "?page=2",
            "./about",
            "about/team",
            "/search?q=a:b",
            "",
        ] {
            assert!(is_safe_href(href), "{:?}", href);
        }

        for href in [
            "javascript:alert(1)",
            "  JAVASCRIPT:alert(1)",
            "java\nscript:alert(1)",
            "vbscript:x",
            "data:text/html;base64,PHNjcmlwdD4=",
            "file:///etc/passwd",
        ] {
            assert!(!is_safe_href(href), "{:?}", href);
        }
    }
}
