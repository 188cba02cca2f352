//! Selection-based Markdown editing.
//!
//! Toolbar actions wrap the current selection in literal markers and report
//! the selection to restore afterwards. Offsets follow the host's UTF-16
//! convention throughout.

mod mutation;
mod selection;
mod toolbar;

pub use mutation::{Mutation, utf16_len, validate, wrap_with_marker, wrap_with_pair};
pub use selection::{SelectionError, SelectionRange};
pub use toolbar::ToolbarAction;
