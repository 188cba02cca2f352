//! Document values shared by the pipeline and the editor.
//!
//! The raw Markdown text is the single source of truth. Everything else,
//! token trees and sanitized HTML alike, is recomputed from it.

mod types;

pub use types::{RawDocument, SanitizedHtml};
