use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use super::mutation::{self, Mutation};
use super::selection::{SelectionError, SelectionRange};

/// A formatting button in the editor toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolbarAction {
    Bold,
    Italic,
    Strikethrough,
    /// Insert a `{TERM|hours}` definition around the selection.
    Format,
    /// Reserved for table insertion. Currently leaves the text as it is.
    #[value(name = "table")]
    #[serde(rename = "table")]
    InsertTable,
}

impl ToolbarAction {
    pub const ALL: [Self; 5] = [
        Self::Bold,
        Self::Italic,
        Self::Strikethrough,
        Self::Format,
        Self::InsertTable,
    ];

    /// The `(left, right)` markers this action inserts.
    pub const fn markers(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Bold => Some(("**", "**")),
            Self::Italic => Some(("*", "*")),
            Self::Strikethrough => Some(("~~", "~~")),
            Self::Format => Some(("{", "|hours}")),
            Self::InsertTable => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Strikethrough => "Strikethrough",
            Self::Format => "Format",
            Self::InsertTable => "Table",
        }
    }

    pub fn apply(self, text: &str, selection: SelectionRange) -> Result<Mutation, SelectionError> {
        debug!(action = self.label(), "toolbar action");
        match self.markers() {
            Some((left, right)) => mutation::wrap_with_pair(text, selection, left, right),
            None => {
                mutation::validate(text, selection)?;
                Ok(Mutation::unchanged(text, selection))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: usize, end: usize) -> SelectionRange {
        SelectionRange::new(start, end).unwrap()
    }

    #[test]
    fn test_marker_table() {
        assert_eq!(ToolbarAction::Bold.markers(), Some(("**", "**")));
        assert_eq!(ToolbarAction::Italic.markers(), Some(("*", "*")));
        assert_eq!(ToolbarAction::Strikethrough.markers(), Some(("~~", "~~")));
        assert_eq!(ToolbarAction::Format.markers(), Some(("{", "|hours}")));
        assert_eq!(ToolbarAction::InsertTable.markers(), None);
    }

    #[test]
    fn test_bold_wraps_selection() {
        let m = ToolbarAction::Bold.apply("hello world", range(6, 11)).unwrap();
        assert_eq!(m.text, "hello **world**");
        assert_eq!(m.selection, range(6, 15));
    }

    #[test]
    fn test_format_on_selection() {
        let m = ToolbarAction::Format
            .apply("3 hours of meetings", range(0, 7))
            .unwrap();
        assert_eq!(m.text, "{3 hours|hours} of meetings");
    }

    #[test]
    fn test_insert_table_is_noop() {
        let m = ToolbarAction::InsertTable.apply("abc", range(1, 2)).unwrap();
        assert_eq!(m.text, "abc");
        assert_eq!(m.selection, range(1, 2));
    }

    #[test]
    fn test_insert_table_still_checks_bounds() {
        assert_eq!(
            ToolbarAction::InsertTable.apply("abc", range(1, 9)),
            Err(SelectionError::OutOfBounds { offset: 9, len: 3 })
        );
    }

    #[test]
    fn test_value_names() {
        let names: Vec<_> = ToolbarAction::ALL
            .iter()
            .filter_map(|a| a.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, ["bold", "italic", "strikethrough", "format", "table"]);
    }
}
