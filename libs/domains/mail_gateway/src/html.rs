//! Markup sniffing and HTML-to-text rendition.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::warn;

/// A tag starts with `<` followed by a letter, `/`, `!` or `?`, and runs to
/// the next `>`. An unterminated tag swallows the rest of the input.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[a-zA-Z/!?][^>]*(?:>|$)").expect("tag pattern is a valid regex")
});

/// Remove every tag from `input`. Borrows when there is nothing to strip.
pub fn strip_tags(input: &str) -> Cow<'_, str> {
    TAG.replace_all(input, "")
}

/// True when stripping tags changes the text.
pub fn is_html(input: &str) -> bool {
    strip_tags(input) != input
}

/// Produces a plain-text rendition of an HTML document.
///
/// Implementations are expected to be pure and infallible from the
/// caller's point of view. Any `Fn(&str) -> String` closure qualifies.
pub trait HtmlToText: Send + Sync {
    fn convert(&self, html: &str) -> String;
}

impl<F> HtmlToText for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn convert(&self, html: &str) -> String {
        self(html)
    }
}

/// Default converter backed by `htmd`.
///
/// The result is lightweight Markdown rather than bare text: headings come
/// out as `# Title`, bold as `**word**`, and links as `[text](url)`. Use
/// a closure over [`strip_tags`] when tags should simply disappear.
///
/// Falls back to the tag-stripped input if `htmd` cannot parse the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmdConverter;

impl HtmlToText for HtmdConverter {
    fn convert(&self, html: &str) -> String {
        match htmd::convert(html) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "HTML conversion failed, falling back to stripped tags");
                strip_tags(html).trim().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_removes_markup() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("<!-- note --><br/>Hi"), "Hi");
    }

    #[test]
    fn test_strip_tags_borrows_plain_text() {
        assert!(matches!(strip_tags("no markup here"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_tags_keeps_comparisons() {
        assert_eq!(strip_tags("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn test_strip_tags_unterminated_tag() {
        assert_eq!(strip_tags("Hello <b"), "Hello ");
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("<p>Hi</p>"));
        assert!(is_html("line<br>break"));
        assert!(!is_html("Hello"));
        assert!(!is_html("a < b"));
    }

    #[test]
    fn test_closure_converter() {
        let upper = |html: &str| strip_tags(html).to_uppercase();
        assert_eq!(upper.convert("<i>quiet</i>"), "QUIET");
    }

    #[test]
    fn test_htmd_converter_keeps_text() {
        let text = HtmdConverter.convert("<p>Hi there</p>");
        assert!(text.contains("Hi there"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_htmd_converter_writes_markdown() {
        let text = HtmdConverter
            .convert(r#"<h1>T</h1><p>Hi <b>there</b>, see <a href="http://x">link</a></p>"#);
        assert!(text.starts_with("# T"));
        assert!(text.contains("**there**"));
        assert!(text.contains("[link](http://x)"));
    }
}
