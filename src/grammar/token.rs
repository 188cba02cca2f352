/// A node in the parsed token tree.
///
/// Block tokens own inline children through their `tokens` field; inline
/// tokens nest the same way. Trees are produced by [`crate::grammar::Grammar::lex`]
/// and consumed by the renderer. They are never edited in place: walkers
/// take a token by value and hand back its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Block level
    /// One or more blank lines between blocks.
    Space,
    Heading {
        depth: u8,
        text: String,
        tokens: Vec<Token>,
    },
    Paragraph {
        text: String,
        tokens: Vec<Token>,
    },
    /// Fenced or indented code block. `text` is the literal body.
    Code {
        lang: Option<String>,
        text: String,
    },
    Blockquote {
        tokens: Vec<Token>,
    },
    List {
        ordered: bool,
        start: u64,
        loose: bool,
        items: Vec<ListItem>,
    },
    Hr,
    /// Raw HTML, either a block or an inline tag. Passed to the sanitizer as-is.
    Html {
        block: bool,
        text: String,
    },

    // Inline level
    Text {
        text: String,
    },
    /// A backslash escape; `text` is the escaped character without the backslash.
    Escape {
        text: String,
    },
    Strong {
        text: String,
        tokens: Vec<Token>,
    },
    Em {
        text: String,
        tokens: Vec<Token>,
    },
    Del {
        text: String,
        tokens: Vec<Token>,
    },
    Codespan {
        text: String,
    },
    Link {
        href: String,
        title: Option<String>,
        text: String,
        tokens: Vec<Token>,
    },
    Image {
        href: String,
        title: Option<String>,
        text: String,
    },
    Br,

    /// A token produced by a registered inline extension.
    Extension(ExtensionToken),
}

impl Token {
    /// Convenience constructor for a plain text token.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Short kind name, mostly for logging and tests.
    pub fn kind(&self) -> &str {
        match self {
            Self::Space => "space",
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::Code { .. } => "code",
            Self::Blockquote { .. } => "blockquote",
            Self::List { .. } => "list",
            Self::Hr => "hr",
            Self::Html { .. } => "html",
            Self::Text { .. } => "text",
            Self::Escape { .. } => "escape",
            Self::Strong { .. } => "strong",
            Self::Em { .. } => "em",
            Self::Del { .. } => "del",
            Self::Codespan { .. } => "codespan",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::Br => "br",
            Self::Extension(ext) => &ext.name,
        }
    }
}

/// One entry of a [`Token::List`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub tokens: Vec<Token>,
}

/// Output of an inline extension's tokenizer.
///
/// `fields` holds named child-token sequences in the order the extension
/// produced them. Walkers only descend into the fields the owning extension
/// declares through [`crate::grammar::InlineExtension::child_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionToken {
    pub name: String,
    /// Exact source text consumed by the match.
    pub raw: String,
    pub fields: Vec<(String, Vec<Token>)>,
}

impl ExtensionToken {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style helper to attach a named child sequence.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, tokens: Vec<Token>) -> Self {
        self.fields.push((name.into(), tokens));
        self
    }

    /// Look up a child sequence by name.
    pub fn field(&self, name: &str) -> Option<&[Token]> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, tokens)| tokens.as_slice())
    }
}
