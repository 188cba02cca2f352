//! Core document types.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use ropey::Rope;

/// The full Markdown source of a document.
///
/// Immutable: edits produce a new `RawDocument`. Cloning shares the
/// underlying buffer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawDocument(Arc<str>);

impl RawDocument {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// An empty document.
    pub fn empty() -> Self {
        Self(Arc::from(""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in UTF-16 code units, the unit selection offsets are given in.
    pub fn len_utf16(&self) -> usize {
        Rope::from_str(&self.0).len_utf16_cu()
    }

    /// Whether two handles point at the same buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for RawDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for RawDocument {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawDocument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RawDocument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawDocument").field(&&*self.0).finish()
    }
}

impl fmt::Display for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTML that has been through the sanitizer and is safe to display.
///
/// Only [`crate::pipeline`] constructs these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub(crate) const fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
