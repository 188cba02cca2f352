use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A selection in UTF-16 code units, `start <= end`.
///
/// `start == end` is a caret. Bounds against a particular text are checked
/// when the selection is applied, not here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSelection")]
pub struct SelectionRange {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawSelection {
    start: usize,
    end: usize,
}

impl TryFrom<RawSelection> for SelectionRange {
    type Error = SelectionError;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl SelectionRange {
    pub const fn new(start: usize, end: usize) -> Result<Self, SelectionError> {
        if start > end {
            return Err(SelectionError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Callers guarantee `start <= end`.
    pub(crate) const fn ordered(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub const fn start(self) -> usize {
        self.start
    }

    pub const fn end(self) -> usize {
        self.end
    }

    pub const fn is_caret(self) -> bool {
        self.start == self.end
    }

    /// Width in UTF-16 code units.
    pub const fn width(self) -> usize {
        self.end - self.start
    }
}

/// Why a selection cannot be applied to a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection start {start} is after its end {end}")]
    Inverted { start: usize, end: usize },
    #[error("offset {offset} is past the end of the text ({len} UTF-16 units)")]
    OutOfBounds { offset: usize, len: usize },
    #[error("offset {offset} falls inside a surrogate pair")]
    SplitsSurrogatePair { offset: usize },
}
