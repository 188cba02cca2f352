//! Post-processing over a finished token tree.
//!
//! Walkers are pure rewrites: each takes a token by value and returns its
//! replacement. The walk is bottom-up, so children are already rewritten
//! when a walker sees their parent, and every token reaches every walker
//! exactly once.

use super::Grammar;
use super::token::{ListItem, Token};

/// A post-processing pass registered on a [`Grammar`].
pub trait TokenWalker: Send + Sync {
    fn rewrite(&self, token: Token) -> Token;
}

impl<F> TokenWalker for F
where
    F: Fn(Token) -> Token + Send + Sync,
{
    fn rewrite(&self, token: Token) -> Token {
        self(token)
    }
}

/// Run every walker registered on `grammar` over `tokens`.
pub fn walk_tokens(grammar: &Grammar, tokens: Vec<Token>) -> Vec<Token> {
    if grammar.walkers.is_empty() {
        return tokens;
    }
    tokens
        .into_iter()
        .map(|token| walk_token(grammar, token))
        .collect()
}

fn walk_token(grammar: &Grammar, token: Token) -> Token {
    let token = walk_children(grammar, token);
    grammar
        .walkers
        .iter()
        .fold(token, |token, walker| walker.rewrite(token))
}

fn walk_children(grammar: &Grammar, token: Token) -> Token {
    let walk = |tokens| walk_tokens(grammar, tokens);
    match token {
        Token::Heading {
            depth,
            text,
            tokens,
        } => Token::Heading {
            depth,
            text,
            tokens: walk(tokens),
        },
        Token::Paragraph { text, tokens } => Token::Paragraph {
            text,
            tokens: walk(tokens),
        },
        Token::Blockquote { tokens } => Token::Blockquote {
            tokens: walk(tokens),
        },
        Token::List {
            ordered,
            start,
            loose,
            items,
        } => Token::List {
            ordered,
            start,
            loose,
            items: items
                .into_iter()
                .map(|item| ListItem {
                    tokens: walk(item.tokens),
                })
                .collect(),
        },
        Token::Strong { text, tokens } => Token::Strong {
            text,
            tokens: walk(tokens),
        },
        Token::Em { text, tokens } => Token::Em {
            text,
            tokens: walk(tokens),
        },
        Token::Del { text, tokens } => Token::Del {
            text,
            tokens: walk(tokens),
        },
        Token::Link {
            href,
            title,
            text,
            tokens,
        } => Token::Link {
            href,
            title,
            text,
            tokens: walk(tokens),
        },
        Token::Extension(mut ext) => {
            let declared = grammar
                .extension(&ext.name)
                .map_or(&[][..], |extension| extension.child_fields());
            ext.fields = ext
                .fields
                .into_iter()
                .map(|(name, tokens)| {
                    let tokens = if declared.contains(&name.as_str()) {
                        walk(tokens)
                    } else {
                        tokens
                    };
                    (name, tokens)
                })
                .collect();
            Token::Extension(ext)
        }
        leaf => leaf,
    }
}

/// Appends a fixed suffix to every strong-emphasis token.
///
/// The suffix lands both in the token's `text` and as a trailing text child,
/// so it shows up in the rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrongSuffix {
    suffix: String,
}

impl StrongSuffix {
    pub const DEFAULT: &'static str = " walked";

    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for StrongSuffix {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl TokenWalker for StrongSuffix {
    fn rewrite(&self, token: Token) -> Token {
        match token {
            Token::Strong {
                mut text,
                mut tokens,
            } => {
                text.push_str(&self.suffix);
                match tokens.last_mut() {
                    Some(Token::Text { text: last }) => last.push_str(&self.suffix),
                    _ => tokens.push(Token::text(self.suffix.clone())),
                }
                Token::Strong { text, tokens }
            }
            other => other,
        }
    }
}
