//! Marker insertion around a selection.
//!
//! Offsets are UTF-16 code units. They are converted to char indices with
//! `ropey` and rejected, never clamped, when they are out of range or land
//! inside a surrogate pair.

use ropey::Rope;
use serde::Serialize;
use tracing::debug;

use super::selection::{SelectionError, SelectionRange};

/// New text plus the selection to restore on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
    pub text: String,
    #[serde(flatten)]
    pub selection: SelectionRange,
}

impl Mutation {
    pub(crate) fn unchanged(text: &str, selection: SelectionRange) -> Self {
        Self {
            text: text.to_string(),
            selection,
        }
    }
}

/// Wrap the selection in `marker` on both sides.
pub fn wrap_with_marker(
    text: &str,
    selection: SelectionRange,
    marker: &str,
) -> Result<Mutation, SelectionError> {
    wrap_with_pair(text, selection, marker, marker)
}

/// Insert `left` before the selection and `right` after it.
///
/// A caret ends up between the two markers. A range selection is widened to
/// cover the markers and the original content.
pub fn wrap_with_pair(
    text: &str,
    selection: SelectionRange,
    left: &str,
    right: &str,
) -> Result<Mutation, SelectionError> {
    let mut rope = Rope::from_str(text);
    let start = char_index(&rope, selection.start())?;
    let end = char_index(&rope, selection.end())?;

    // Right first so `start` still points at the same char.
    rope.insert(end, right);
    rope.insert(start, left);

    let left_len = utf16_len(left);
    let selection = if selection.is_caret() {
        SelectionRange::caret(selection.start() + left_len)
    } else {
        SelectionRange::ordered(
            selection.start(),
            selection.end() + left_len + utf16_len(right),
        )
    };
    debug!(left, right, start = selection.start(), end = selection.end(), "wrapped selection");
    Ok(Mutation {
        text: rope.to_string(),
        selection,
    })
}

/// Check that `selection` can be applied to `text`.
pub fn validate(text: &str, selection: SelectionRange) -> Result<(), SelectionError> {
    let rope = Rope::from_str(text);
    char_index(&rope, selection.start())?;
    char_index(&rope, selection.end())?;
    Ok(())
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

fn char_index(rope: &Rope, offset: usize) -> Result<usize, SelectionError> {
    let len = rope.len_utf16_cu();
    if offset > len {
        return Err(SelectionError::OutOfBounds { offset, len });
    }
    let idx = rope.utf16_cu_to_char(offset);
    if rope.char_to_utf16_cu(idx) != offset {
        return Err(SelectionError::SplitsSurrogatePair { offset });
    }
    Ok(idx)
}
