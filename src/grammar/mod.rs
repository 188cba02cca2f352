//! Markdown grammar: lexing, post-processing and HTML rendering.
//!
//! A [`Grammar`] is an ordinary value. Extensions and walkers are registered
//! on the instance through [`GrammarBuilder`], so grammars with different
//! rule sets can be used side by side.
//!
//! ```
//! use markedit::grammar::{DefinitionExtension, Grammar};
//!
//! let grammar = Grammar::builder().extension(DefinitionExtension).build();
//! assert!(grammar.parse("{tea|hot}").contains("<dt>tea</dt><dd>hot</dd>"));
//! assert!(!Grammar::base().parse("{tea|hot}").contains("<dt>"));
//! ```

mod block;
mod definition;
mod extension;
mod inline;
mod render;
mod token;
mod walk;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use definition::DefinitionExtension;
pub use extension::InlineExtension;
pub use inline::InlineLexer;
pub use render::{Renderer, escape_html};
pub use token::{ExtensionToken, ListItem, Token};
pub use walk::{StrongSuffix, TokenWalker, walk_tokens};

use block::BlockLexer;

/// Switches for optional base-grammar behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarOptions {
    /// GitHub-flavored additions: `~~strike~~` and bare URL autolinks.
    pub gfm: bool,
    /// Pass raw HTML through to the output. When off, it is escaped as text.
    pub raw_html: bool,
    /// Treat single newlines inside paragraphs as `<br>`.
    pub breaks: bool,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            raw_html: true,
            breaks: false,
        }
    }
}

/// A Markdown grammar instance.
#[derive(Clone, Default)]
pub struct Grammar {
    options: GrammarOptions,
    extensions: Vec<Arc<dyn InlineExtension>>,
    walkers: Vec<Arc<dyn TokenWalker>>,
}

impl Grammar {
    /// The base grammar with default options and nothing registered.
    pub fn base() -> Self {
        Self::default()
    }

    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    pub const fn options(&self) -> GrammarOptions {
        self.options
    }

    /// Look up a registered extension by token name.
    pub fn extension(&self, name: &str) -> Option<&dyn InlineExtension> {
        self.extensions
            .iter()
            .find(|ext| ext.name() == name)
            .map(|ext| &**ext)
    }

    pub fn extension_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.extensions.iter().map(|ext| ext.name())
    }

    pub fn walker_count(&self) -> usize {
        self.walkers.len()
    }

    /// Lex a whole document and run the registered walkers over the result.
    pub fn lex(&self, src: &str) -> Vec<Token> {
        let tokens = BlockLexer::new(self).lex(src);
        self.walk(tokens)
    }

    /// Lex `src` as inline content only. Walkers are not applied.
    pub fn inline_tokens(&self, src: &str) -> Vec<Token> {
        InlineLexer::new(self).inline_tokens(src)
    }

    pub fn walk(&self, tokens: Vec<Token>) -> Vec<Token> {
        walk_tokens(self, tokens)
    }

    pub fn render(&self, tokens: &[Token]) -> String {
        Renderer::new(self).render(tokens)
    }

    pub fn render_inline(&self, tokens: &[Token]) -> String {
        Renderer::new(self).render_inline(tokens)
    }

    /// Markdown to (unsanitized) HTML.
    pub fn parse(&self, src: &str) -> String {
        self.render(&self.lex(src))
    }

    /// Inline Markdown to HTML, walkers included.
    pub fn parse_inline(&self, src: &str) -> String {
        self.render_inline(&self.walk(self.inline_tokens(src)))
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("options", &self.options)
            .field("extensions", &self.extension_names().collect::<Vec<_>>())
            .field("walkers", &self.walker_count())
            .finish()
    }
}

/// Builder for [`Grammar`].
#[derive(Default)]
pub struct GrammarBuilder {
    options: GrammarOptions,
    extensions: Vec<Arc<dyn InlineExtension>>,
    walkers: Vec<Arc<dyn TokenWalker>>,
}

impl GrammarBuilder {
    #[must_use]
    pub const fn options(mut self, options: GrammarOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn gfm(mut self, enabled: bool) -> Self {
        self.options.gfm = enabled;
        self
    }

    #[must_use]
    pub const fn raw_html(mut self, enabled: bool) -> Self {
        self.options.raw_html = enabled;
        self
    }

    #[must_use]
    pub const fn breaks(mut self, enabled: bool) -> Self {
        self.options.breaks = enabled;
        self
    }

    /// Register an inline extension. A later extension with the same name
    /// replaces the earlier one.
    #[must_use]
    pub fn extension(mut self, extension: impl InlineExtension + 'static) -> Self {
        let name = extension.name();
        if let Some(existing) = self.extensions.iter().position(|ext| ext.name() == name) {
            debug!(extension = name, "replacing registered extension");
            self.extensions.remove(existing);
        }
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Register a walker. Walkers run in registration order.
    #[must_use]
    pub fn walker(mut self, walker: impl TokenWalker + 'static) -> Self {
        self.walkers.push(Arc::new(walker));
        self
    }

    pub fn build(self) -> Grammar {
        Grammar {
            options: self.options,
            extensions: self.extensions,
            walkers: self.walkers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammars_are_independent() {
        let plain = Grammar::base();
        let extended = Grammar::builder()
            .extension(DefinitionExtension)
            .walker(StrongSuffix::default())
            .build();

        assert_eq!(plain.parse("{a|b}"), "<p>{a|b}</p>\n");
        assert_eq!(extended.parse("{a|b}"), "<p>\n<dt>a</dt><dd>b</dd></p>\n");
        assert_eq!(plain.parse("**x**"), "<p><strong>x</strong></p>\n");
        assert_eq!(extended.parse("**x**"), "<p><strong>x walked</strong></p>\n");
    }

    #[test]
    fn test_registering_same_name_replaces() {
        let grammar = Grammar::builder()
            .extension(DefinitionExtension)
            .extension(DefinitionExtension)
            .build();
        assert_eq!(grammar.extension_names().collect::<Vec<_>>(), vec!["format"]);
    }

    #[test]
    fn test_debug_lists_extensions() {
        let grammar = Grammar::builder().extension(DefinitionExtension).build();
        let debug = format!("{grammar:?}");
        assert!(debug.contains("format"));
    }

    #[test]
    fn test_grammar_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
