//! Content-side document analysis: visible-text extraction and client-side
//! redirect detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::protocol::TabMessage;

static STRIPPED_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    // Elements whose entire content is invisible or chrome, not page text.
    [
        "script", "style", "noscript", "iframe", "svg", "canvas", "header", "footer", "nav",
        "aside",
    ]
    .iter()
    .map(|tag| Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).unwrap())
    .collect()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static META_REFRESH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]+http-equiv\s*=\s*["']?refresh["']?[^>]*>"#).unwrap()
});
static CONTENT_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)content\s*=\s*["']([^"']*)["']"#).unwrap());
static REFRESH_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)url=(.*)").unwrap());

/// Extract the visible text of a document, whitespace-collapsed.
pub fn extract_page_text(html: &str) -> String {
    let mut text = html.to_string();
    for block in STRIPPED_BLOCKS.iter() {
        text = block.replace_all(&text, " ").into_owned();
    }
    let text = TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// A redirect that fired before the document settled: the committed URL is
/// not the one navigation started with.
pub fn detect_instant_redirect(initial_url: &str, current_url: &str) -> Option<TabMessage> {
    if initial_url.is_empty() || initial_url == current_url {
        return None;
    }
    Some(TabMessage::DetectedRedirect {
        initial_url: initial_url.to_string(),
        final_url: current_url.to_string(),
        redirect_type: "instant_onload".to_string(),
    })
}

/// A `<meta http-equiv="refresh">` tag pointing somewhere else.
pub fn detect_meta_refresh(html: &str, current_url: &str) -> Option<TabMessage> {
    let tag = META_REFRESH.find(html)?;
    let content = CONTENT_ATTR.captures(tag.as_str())?.get(1)?.as_str();
    let target = REFRESH_URL.captures(content)?.get(1)?.as_str().trim();
    if target.is_empty() || target == current_url {
        return None;
    }
    Some(TabMessage::DetectedRedirect {
        initial_url: current_url.to_string(),
        final_url: target.to_string(),
        redirect_type: "meta_refresh".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_tags_and_scripts() {
        let html = r#"<html><head><style>body { color: red }</style></head>
            <body><script>var x = "account locked";</script>
            <p>Welcome   to <b>our</b> site</p></body></html>"#;
        assert_eq!(extract_page_text(html), "Welcome to our site");
    }

    #[test]
    fn test_extract_strips_chrome_elements() {
        let html = "<nav>Home About</nav><p>Body text</p><footer>© 2026</footer>";
        assert_eq!(extract_page_text(html), "Body text");
    }

    #[test]
    fn test_extract_empty_document() {
        assert_eq!(extract_page_text(""), "");
        assert_eq!(extract_page_text("<html><body></body></html>"), "");
    }

    #[test]
    fn test_instant_redirect_detected() {
        let msg =
            detect_instant_redirect("https://start.test/", "https://elsewhere.test/").unwrap();
        match msg {
            TabMessage::DetectedRedirect {
                initial_url,
                final_url,
                redirect_type,
            } => {
                assert_eq!(initial_url, "https://start.test/");
                assert_eq!(final_url, "https://elsewhere.test/");
                assert_eq!(redirect_type, "instant_onload");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_instant_redirect_same_url_is_none() {
        assert!(detect_instant_redirect("https://a.test/", "https://a.test/").is_none());
        assert!(detect_instant_redirect("", "https://a.test/").is_none());
    }

    #[test]
    fn test_meta_refresh_detected() {
        let html = r#"<meta http-equiv="refresh" content="0; URL=https://landing.test/next">"#;
        let msg = detect_meta_refresh(html, "https://a.test/").unwrap();
        match msg {
            TabMessage::DetectedRedirect {
                final_url,
                redirect_type,
                ..
            } => {
                assert_eq!(final_url, "https://landing.test/next");
                assert_eq!(redirect_type, "meta_refresh");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_meta_refresh_without_url_is_none() {
        // A plain timed reload of the same page is not a redirect.
        let html = r#"<meta http-equiv="refresh" content="30">"#;
        assert!(detect_meta_refresh(html, "https://a.test/").is_none());
    }

    #[test]
    fn test_meta_refresh_to_current_url_is_none() {
        let html = r#"<meta http-equiv="refresh" content="0;url=https://a.test/">"#;
        assert!(detect_meta_refresh(html, "https://a.test/").is_none());
    }

    #[test]
    fn test_no_meta_refresh() {
        assert!(detect_meta_refresh("<p>hello</p>", "https://a.test/").is_none());
    }
}
