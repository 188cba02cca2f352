//! Markdown to safe HTML.
//!
//! A [`RenderPipeline`] pairs a [`Grammar`] with a [`Sanitizer`]. Rendering
//! is synchronous and deterministic: the same document always produces the
//! same bytes.

mod sanitize;

pub use sanitize::{ALLOWED_SCHEMES, Sanitizer};

use std::sync::Arc;

use tracing::debug;

use crate::document::SanitizedHtml;
use crate::grammar::{DefinitionExtension, Grammar, StrongSuffix, Token};
use crate::perf;

/// Options for the standard grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Register the `{TERM|DEFINITION}` extension.
    pub extensions: bool,
    /// Suffix appended to strong emphasis. `None` disables the walker.
    pub strong_marker: Option<String>,
    pub raw_html: bool,
    pub breaks: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extensions: true,
            strong_marker: Some(StrongSuffix::DEFAULT.to_string()),
            raw_html: true,
            breaks: false,
        }
    }
}

impl PipelineConfig {
    /// The base grammar with no extension and no walker.
    pub fn plain() -> Self {
        Self {
            extensions: false,
            strong_marker: None,
            ..Self::default()
        }
    }

    pub fn grammar(&self) -> Grammar {
        let mut builder = Grammar::builder()
            .raw_html(self.raw_html)
            .breaks(self.breaks);
        if self.extensions {
            builder = builder.extension(DefinitionExtension);
        }
        if let Some(marker) = &self.strong_marker {
            builder = builder.walker(StrongSuffix::new(marker.clone()));
        }
        builder.build()
    }
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    grammar: Grammar,
    sanitizer: Arc<Sanitizer>,
}

impl RenderPipeline {
    pub fn new(grammar: Grammar, sanitizer: Sanitizer) -> Self {
        Self {
            grammar,
            sanitizer: Arc::new(sanitizer),
        }
    }

    /// Pipeline over the grammar described by `config`.
    pub fn standard(config: &PipelineConfig) -> Self {
        Self::new(config.grammar(), Sanitizer::new())
    }

    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn tokens(&self, doc: &str) -> Vec<Token> {
        let _scope = perf::scope("pipeline.lex");
        self.grammar.lex(doc)
    }

    /// Grammar output before sanitizing. Not safe to display.
    pub fn unsanitized_html(&self, doc: &str) -> String {
        let tokens = self.tokens(doc);
        let _scope = perf::scope("pipeline.render");
        self.grammar.render(&tokens)
    }

    pub fn render(&self, doc: &str) -> SanitizedHtml {
        let html = self.unsanitized_html(doc);
        let _scope = perf::scope("pipeline.sanitize");
        let clean = self.sanitizer.clean(&html);
        debug!(
            input_bytes = doc.len(),
            raw_bytes = html.len(),
            sanitized_bytes = clean.as_str().len(),
            "rendered document"
        );
        clean
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::standard(&PipelineConfig::default())
    }
}
