use super::inline::InlineLexer;
use super::render::Renderer;
use super::token::ExtensionToken;

/// A custom inline rule registered on a [`super::Grammar`].
///
/// Extensions are tried before every built-in inline rule at each position
/// the inline lexer stops at. Declining a match is signalled by returning
/// `None` from [`InlineExtension::tokenize`]; the base grammar then carries on.
pub trait InlineExtension: Send + Sync {
    /// Token name. Extension tokens are routed back to the renderer by it.
    fn name(&self) -> &'static str;

    /// Fast-path hint: byte offset of the next place in `src` where this
    /// extension could match, or `None` if it cannot match anywhere in `src`.
    ///
    /// The lexer only calls [`InlineExtension::tokenize`] when the hint is
    /// `Some(0)`, and stops plain text runs at the hinted offset. The hint is
    /// an optimization; `tokenize` still has to validate the match.
    fn start(&self, src: &str) -> Option<usize> {
        let _ = src;
        Some(0)
    }

    /// Try to match at the very start of `src`.
    ///
    /// On success the returned token's `raw` must be a prefix of `src`; the
    /// lexer advances by its length.
    fn tokenize(&self, src: &str, lexer: &InlineLexer<'_>) -> Option<ExtensionToken>;

    /// Render a token this extension produced.
    fn render(&self, token: &ExtensionToken, renderer: &Renderer<'_>) -> String;

    /// Names of the token fields holding child tokens.
    fn child_fields(&self) -> &'static [&'static str] {
        &[]
    }
}
