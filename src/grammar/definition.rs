//! The `{TERM|DEFINITION}` inline extension.
//!
//! Renders to a `<dt>`/`<dd>` pair. TERM and DEFINITION are themselves
//! inline Markdown.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::extension::InlineExtension;
use super::inline::InlineLexer;
use super::render::Renderer;
use super::token::ExtensionToken;

/// `}` has to be followed by a newline or the end of the span.
static FORMAT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{([^|\n]+)\|([^}\n]+)\}(?:\n|$)").expect("format token regex is valid")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefinitionExtension;

impl DefinitionExtension {
    pub const NAME: &'static str = "format";
    pub const TERM: &'static str = "dt";
    pub const DEFINITION: &'static str = "dd";
}

impl InlineExtension for DefinitionExtension {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn start(&self, src: &str) -> Option<usize> {
        src.find('{')
    }

    fn tokenize(&self, src: &str, lexer: &InlineLexer<'_>) -> Option<ExtensionToken> {
        let caps = FORMAT_TOKEN.captures(src)?;
        let raw = caps.get(0)?.as_str();
        let term = caps.get(1)?.as_str().trim();
        let definition = caps.get(2)?.as_str().trim();
        trace!(term, definition, "format token");
        Some(
            ExtensionToken::new(Self::NAME, raw)
                .with_field(Self::TERM, lexer.inline_tokens(term))
                .with_field(Self::DEFINITION, lexer.inline_tokens(definition)),
        )
    }

    fn render(&self, token: &ExtensionToken, renderer: &Renderer<'_>) -> String {
        let render = |field| {
            token
                .field(field)
                .map(|tokens| renderer.render_inline(tokens))
                .unwrap_or_default()
        };
        format!(
            "\n<dt>{}</dt><dd>{}</dd>",
            render(Self::TERM),
            render(Self::DEFINITION)
        )
    }

    fn child_fields(&self) -> &'static [&'static str] {
        &[Self::TERM, Self::DEFINITION]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, Token};

    fn grammar() -> Grammar {
        Grammar::builder().extension(DefinitionExtension).build()
    }

    fn format_token(src: &str) -> Option<ExtensionToken> {
        let grammar = grammar();
        grammar.inline_tokens(src).into_iter().find_map(|t| match t {
            Token::Extension(ext) => Some(ext),
            _ => None,
        })
    }

    #[test]
    fn test_renders_definition_pair() {
        let grammar = grammar();
        assert_eq!(
            grammar.parse_inline("{hello world|lasts 3 hours}"),
            "\n<dt>hello world</dt><dd>lasts 3 hours</dd>"
        );
    }

    #[test]
    fn test_nested_inline_markdown_is_parsed() {
        let grammar = grammar();
        assert_eq!(
            grammar.parse_inline("{*term*|see [docs](https://example.com)}"),
            "\n<dt><em>term</em></dt><dd>see <a href=\"https://example.com\">docs</a></dd>"
        );
    }

    #[test]
    fn test_term_and_definition_are_trimmed() {
        let token = format_token("{  spaced  |  out  }").expect("should match");
        assert_eq!(token.field("dt"), Some(&[Token::text("spaced")][..]));
        assert_eq!(token.field("dd"), Some(&[Token::text("out")][..]));
    }

    #[test]
    fn test_consumes_trailing_newline() {
        let token = format_token("{a|b}\nnext").expect("should match");
        assert_eq!(token.raw, "{a|b}\n");
    }

    #[test]
    fn test_definition_may_contain_pipes() {
        let token = format_token("{a|b|c}").expect("should match");
        assert_eq!(token.field("dd"), Some(&[Token::text("b|c")][..]));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        for src in [
            "{|definition}",
            "{term|}",
            "{term}",
            "{term|definition",
            "{term|definition} trailing",
            "{te\nrm|definition}",
        ] {
            assert!(format_token(src).is_none(), "{src:?} should not match");
        }
    }

    #[test]
    fn test_declined_match_leaves_text_intact() {
        let grammar = grammar();
        assert_eq!(grammar.parse_inline("{term} and {x|y"), "{term} and {x|y");
    }

    #[test]
    fn test_mid_line_token_is_reached() {
        let grammar = grammar();
        assert_eq!(
            grammar.parse_inline("meeting {standup|15 min}"),
            "meeting \n<dt>standup</dt><dd>15 min</dd>"
        );
    }

    #[test]
    fn test_later_token_is_tried_after_a_decline() {
        let grammar = grammar();
        assert_eq!(
            grammar.parse_inline("{a|b} {c|d}"),
            "{a|b} \n<dt>c</dt><dd>d</dd>"
        );
        assert!(
            grammar
                .parse("use {braces} here\n{term|def}")
                .contains("<dt>term</dt><dd>def</dd>")
        );
    }

    #[test]
    fn test_hint_points_at_first_brace() {
        assert_eq!(DefinitionExtension.start("ab{c"), Some(2));
        assert_eq!(DefinitionExtension.start("abc"), None);
    }
}
