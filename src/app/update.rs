use tracing::{debug, warn};

use crate::app::Model;
use crate::app::model::PendingRestore;
use crate::document::RawDocument;
use crate::editor::{SelectionRange, ToolbarAction};
use crate::pipeline::RenderPipeline;

/// All events the editor reacts to.
///
/// Host input, toolbar clicks, and the deferred follow-ups the editor
/// schedules for itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Text typed in the host input, with the selection after the edit
    Input {
        text: String,
        selection: SelectionRange,
    },
    /// Selection moved without editing
    Select(SelectionRange),
    /// Toolbar button pressed
    Toolbar(ToolbarAction),
    /// Hand the selection of the given generation back to the host
    RestoreSelection(u64),
    /// Copy the raw Markdown to the clipboard
    CopyMarkdown,
    /// Input attached to the host
    Mount,
    /// Input detached from the host
    Unmount,
}

/// Pure state transition.
pub fn update(mut model: Model, msg: Message, pipeline: &RenderPipeline) -> Model {
    model.last_restored = None;
    match msg {
        Message::Input { text, selection } => {
            model.set_document(RawDocument::from(text), pipeline);
            model.selection = selection;
            model.last_error = None;
            model.bump_generation();
        }
        Message::Select(selection) => {
            model.selection = selection;
            model.bump_generation();
        }
        Message::Toolbar(action) => match action.apply(&model.document, model.selection) {
            Ok(mutation) => {
                model.set_document(RawDocument::from(mutation.text), pipeline);
                model.selection = mutation.selection;
                model.last_error = None;
                let generation = model.bump_generation();
                model.pending_restore = Some(PendingRestore {
                    generation,
                    selection: mutation.selection,
                });
            }
            Err(err) => {
                warn!(action = action.label(), %err, "toolbar action rejected");
                model.last_error = Some(err);
            }
        },
        Message::RestoreSelection(generation) => {
            match model.pending_restore {
                Some(pending) if pending.generation == generation && model.mounted => {
                    model.selection = pending.selection;
                    model.pending_restore = None;
                    model.last_restored = Some(pending);
                }
                _ => {
                    debug!(
                        generation,
                        current = model.restore_generation,
                        mounted = model.mounted,
                        "skipping selection restore"
                    );
                }
            }
        }
        Message::CopyMarkdown => {}
        Message::Mount => model.mounted = true,
        Message::Unmount => {
            model.mounted = false;
            model.pending_restore = None;
        }
    }
    model
}
