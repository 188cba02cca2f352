use std::fmt::Write as _;

use super::Grammar;
use super::token::{ExtensionToken, ListItem, Token};

/// Renders token trees to HTML.
///
/// The output is *not* safe for display on its own; raw HTML tokens pass
/// through untouched. Run it through [`crate::pipeline::Sanitizer`] first.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'g> {
    grammar: &'g Grammar,
}

impl<'g> Renderer<'g> {
    pub(crate) const fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Render a block-level token sequence.
    pub fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            self.block(token, &mut out);
        }
        out
    }

    /// Render an inline token sequence.
    pub fn render_inline(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            self.inline(token, &mut out);
        }
        out
    }

    fn block(&self, token: &Token, out: &mut String) {
        match token {
            Token::Space => {}
            Token::Heading { depth, tokens, .. } => {
                let _ = writeln!(out, "<h{depth}>{}</h{depth}>", self.render_inline(tokens));
            }
            Token::Paragraph { tokens, .. } => {
                let _ = writeln!(out, "<p>{}</p>", self.render_inline(tokens));
            }
            Token::Code { lang, text } => {
                out.push_str("<pre><code");
                if let Some(lang) = lang {
                    let _ = write!(out, " class=\"language-{}\"", escape_html(lang));
                }
                out.push('>');
                if !text.is_empty() {
                    out.push_str(&escape_html(text));
                    out.push('\n');
                }
                out.push_str("</code></pre>\n");
            }
            Token::Blockquote { tokens } => {
                let _ = write!(out, "<blockquote>\n{}</blockquote>\n", self.render(tokens));
            }
            Token::List {
                ordered,
                start,
                loose,
                items,
            } => {
                let tag = if *ordered { "ol" } else { "ul" };
                if *ordered && *start != 1 {
                    let _ = writeln!(out, "<{tag} start=\"{start}\">");
                } else {
                    let _ = writeln!(out, "<{tag}>");
                }
                for item in items {
                    self.list_item(item, *loose, out);
                }
                let _ = writeln!(out, "</{tag}>");
            }
            Token::Hr => out.push_str("<hr>\n"),
            Token::Html { block: true, text } => {
                out.push_str(text);
                out.push('\n');
            }
            inline => self.inline(inline, out),
        }
    }

    fn list_item(&self, item: &ListItem, loose: bool, out: &mut String) {
        out.push_str("<li>");
        if loose {
            out.push_str(&self.render(&item.tokens));
        } else {
            // Tight items render their paragraphs without the <p> wrapper.
            for token in &item.tokens {
                match token {
                    Token::Paragraph { tokens, .. } => out.push_str(&self.render_inline(tokens)),
                    Token::Space => {}
                    other => self.block(other, out),
                }
            }
        }
        out.push_str("</li>\n");
    }

    fn inline(&self, token: &Token, out: &mut String) {
        match token {
            Token::Text { text } | Token::Escape { text } => out.push_str(&escape_html(text)),
            Token::Strong { tokens, .. } => {
                let _ = write!(out, "<strong>{}</strong>", self.render_inline(tokens));
            }
            Token::Em { tokens, .. } => {
                let _ = write!(out, "<em>{}</em>", self.render_inline(tokens));
            }
            Token::Del { tokens, .. } => {
                let _ = write!(out, "<del>{}</del>", self.render_inline(tokens));
            }
            Token::Codespan { text } => {
                let _ = write!(out, "<code>{}</code>", escape_html(text));
            }
            Token::Br => out.push_str("<br>"),
            Token::Link {
                href,
                title,
                tokens,
                ..
            } => {
                let _ = write!(out, "<a href=\"{}\"", escape_html(href));
                if let Some(title) = title {
                    let _ = write!(out, " title=\"{}\"", escape_html(title));
                }
                let _ = write!(out, ">{}</a>", self.render_inline(tokens));
            }
            Token::Image { href, title, text } => {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{}\"",
                    escape_html(href),
                    escape_html(text)
                );
                if let Some(title) = title {
                    let _ = write!(out, " title=\"{}\"", escape_html(title));
                }
                out.push('>');
            }
            Token::Html { text, .. } => out.push_str(text),
            Token::Extension(ext) => out.push_str(&self.extension(ext)),
            block => self.block(block, out),
        }
    }

    fn extension(&self, token: &ExtensionToken) -> String {
        match self.grammar.extension(&token.name) {
            Some(extension) => extension.render(token, self),
            // Tokens from a grammar that doesn't know this extension degrade to text.
            None => escape_html(&token.raw),
        }
    }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(src: &str) -> String {
        Grammar::base().parse(src)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_paragraph_and_heading() {
        assert_eq!(html("# Hi\n\nthere"), "<h1>Hi</h1>\n<p>there</p>\n");
    }

    #[test]
    fn test_code_block_with_language() {
        assert_eq!(
            html("```rust\nfn main() {}\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_tight_list_has_no_paragraphs() {
        assert_eq!(html("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_ordered_list_with_start() {
        assert_eq!(
            html("2. a\n\n3. b"),
            "<ol start=\"2\">\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(html("> quote"), "<blockquote>\n<p>quote</p>\n</blockquote>\n");
    }

    #[test]
    fn test_link_and_image_attributes_are_escaped() {
        assert_eq!(
            html(r#"[a](/x?a=1&b=2 "t\"q") ![i](p.png)"#),
            "<p><a href=\"/x?a=1&amp;b=2\" title=\"t&quot;q\">a</a> <img src=\"p.png\" alt=\"i\"></p>\n"
        );
    }

    #[test]
    fn test_unknown_extension_token_renders_raw_text() {
        let grammar = Grammar::base();
        let token = Token::Extension(ExtensionToken::new("mystery", "{<x>}"));
        assert_eq!(grammar.render_inline(&[token]), "{&lt;x&gt;}");
    }
}
