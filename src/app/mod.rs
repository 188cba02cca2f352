//! Editor state machine and runtime.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete editor state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`Editor`]: Runtime that applies side effects to an [`EditorHost`]

mod effects;
mod model;
mod scheduler;
mod update;

pub use model::{Model, PendingRestore};
pub use scheduler::Scheduler;
pub use update::{Message, update};

use tracing::trace;

use crate::document::{RawDocument, SanitizedHtml};
use crate::editor::SelectionRange;
use crate::pipeline::RenderPipeline;

/// The surface the editor drives: an input, a preview pane and a clipboard.
pub trait EditorHost {
    /// Replace the contents of the input.
    fn set_text(&mut self, text: &str);
    fn show_preview(&mut self, html: &SanitizedHtml);
    /// Put the input's selection back after its text was replaced.
    fn restore_selection(&mut self, selection: SelectionRange);
    fn copy_to_clipboard(&mut self, text: &str);
}

/// Host that keeps whatever the editor last pushed to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedHost {
    pub text: Option<String>,
    pub preview: Option<SanitizedHtml>,
    pub restored: Vec<SelectionRange>,
    pub clipboard: Option<String>,
}

impl EditorHost for CapturedHost {
    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn show_preview(&mut self, html: &SanitizedHtml) {
        self.preview = Some(html.clone());
    }

    fn restore_selection(&mut self, selection: SelectionRange) {
        self.restored.push(selection);
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }
}

/// Owns the model, the pipeline and the scheduler, and runs messages
/// through [`update`] followed by their side effects.
#[derive(Debug)]
pub struct Editor {
    model: Model,
    pipeline: RenderPipeline,
    scheduler: Scheduler,
}

impl Editor {
    /// Create an unmounted editor over `document`.
    pub fn new(document: RawDocument, pipeline: RenderPipeline) -> Self {
        Self {
            model: Model::new(document, &pipeline),
            pipeline,
            scheduler: Scheduler::new(),
        }
    }

    /// Set the initial selection.
    #[must_use]
    pub const fn with_selection(mut self, selection: SelectionRange) -> Self {
        self.model.selection = selection;
        self
    }

    pub const fn model(&self) -> &Model {
        &self.model
    }

    pub const fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Messages waiting for the next tick.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn dispatch(&mut self, msg: Message, host: &mut dyn EditorHost) {
        trace!(?msg, "dispatch");
        let model = std::mem::take(&mut self.model);
        self.model = update(model, msg.clone(), &self.pipeline);
        self.handle_message_side_effects(&msg, host);
    }

    /// Run the messages scheduled before this tick. Returns how many ran.
    pub fn tick(&mut self, host: &mut dyn EditorHost) -> usize {
        let due = self.scheduler.take_due();
        let count = due.len();
        for msg in due {
            self.dispatch(msg, host);
        }
        count
    }
}

#[cfg(test)]
mod tests;
