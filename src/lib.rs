// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. grammar::GrammarOptions)
    clippy::module_name_repetitions
)]

//! # markedit
//!
//! A Markdown editing core: a pluggable grammar, a sanitizing HTML pipeline
//! and toolbar formatting over UTF-16 selections.
//!
//! Markdown is rendered with:
//! - A marked-style block and inline grammar
//! - Inline extensions such as `{TERM|DEFINITION}` definition pairs
//! - Token walkers that rewrite the parsed tree before rendering
//! - An allow-list sanitizer on the final HTML
//!
//! ## Architecture
//!
//! The editor uses The Elm Architecture (TEA) pattern:
//! - **Model**: Editor state
//! - **Message**: Input, selection and toolbar events
//! - **Update**: Pure state transitions
//! - **Effects**: Pushing text, preview and selection to an [`app::EditorHost`]
//!
//! ## Modules
//!
//! - [`app`]: Editor state machine and runtime
//! - [`config`]: Saved default flags
//! - [`document`]: Raw and rendered document values
//! - [`editor`]: Selection mutation engine and toolbar actions
//! - [`grammar`]: Lexing, walking and rendering Markdown
//! - [`pipeline`]: Grammar plus sanitizer
//! - [`watcher`]: File watching

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod grammar;
pub mod perf;
pub mod pipeline;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{Editor, EditorHost, Message, Model};
    pub use crate::document::{RawDocument, SanitizedHtml};
    pub use crate::editor::{Mutation, SelectionError, SelectionRange, ToolbarAction};
    pub use crate::grammar::{Grammar, InlineExtension, Token, TokenWalker};
    pub use crate::pipeline::{PipelineConfig, RenderPipeline};
}
