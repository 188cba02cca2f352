use std::collections::HashSet;
use std::fmt;

use ammonia::Builder;

use crate::document::SanitizedHtml;

/// URL schemes allowed in `href` and `src`. Relative URLs always pass.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Allow-list HTML sanitizer.
///
/// Script and style elements are removed along with their content, as are
/// event handler attributes and comments. Links get
/// `rel="noopener noreferrer"`.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            .add_tags(["dl", "dt", "dd"])
            .add_tag_attributes("code", ["class"])
            .url_schemes(ALLOWED_SCHEMES.iter().copied().collect::<HashSet<_>>())
            .link_rel(Some("noopener noreferrer"))
            .strip_comments(true);
        Self { builder }
    }

    pub fn clean(&self, html: &str) -> SanitizedHtml {
        SanitizedHtml::new(self.builder.clean(html).to_string())
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("schemes", &ALLOWED_SCHEMES)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(html: &str) -> String {
        Sanitizer::new().clean(html).into_string()
    }

    #[test]
    fn test_script_is_removed_with_content() {
        let out = clean("<p>hi</p><script>alert(1)</script>");
        assert_eq!(out, "<p>hi</p>");
    }

    #[test]
    fn test_event_handlers_are_stripped() {
        let out = clean(r#"<img src="a.png" onerror="alert(1)">"#);
        assert!(!out.contains("onerror"), "{out}");
        assert!(out.contains(r#"src="a.png""#), "{out}");
    }

    #[test]
    fn test_javascript_urls_are_dropped() {
        let out = clean(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!out.contains("javascript"), "{out}");
    }

    #[test]
    fn test_allowed_links_get_rel() {
        let out = clean(r#"<a href="https://example.com">x</a>"#);
        assert!(out.contains(r#"rel="noopener noreferrer""#), "{out}");
        let mail = clean(r#"<a href="mailto:a@b.c">m</a>"#);
        assert!(mail.contains("mailto:a@b.c"), "{mail}");
    }

    #[test]
    fn test_definition_markup_survives() {
        let out = clean("<dt>term</dt><dd>definition</dd>");
        assert!(out.contains("<dt>term</dt>"), "{out}");
        assert!(out.contains("<dd>definition</dd>"), "{out}");
    }

    #[test]
    fn test_code_language_class_survives() {
        let out = clean(r#"<pre><code class="language-rust">x</code></pre>"#);
        assert_eq!(out, r#"<pre><code class="language-rust">x</code></pre>"#);
    }

    #[test]
    fn test_iframes_and_comments_are_removed() {
        let out = clean(r#"<!-- note --><iframe src="https://evil"></iframe><p>ok</p>"#);
        assert_eq!(out, "<p>ok</p>");
    }
}
