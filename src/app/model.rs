use crate::document::{RawDocument, SanitizedHtml};
use crate::editor::{SelectionError, SelectionRange};
use crate::pipeline::RenderPipeline;

/// A selection waiting to be handed back to the host on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRestore {
    pub generation: u64,
    pub selection: SelectionRange,
}

/// The complete editor state.
///
/// All state lives here. The preview is always the rendering of `document`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    /// Current Markdown source
    pub document: RawDocument,
    /// Current selection in UTF-16 units
    pub selection: SelectionRange,
    /// Sanitized rendering of `document`
    pub preview: SanitizedHtml,
    /// Whether the input is attached to a host
    pub mounted: bool,
    /// Bumped on every edit or selection change; older restores are stale
    pub restore_generation: u64,
    pub pending_restore: Option<PendingRestore>,
    /// The restore applied by the most recent `RestoreSelection`, if any
    pub last_restored: Option<PendingRestore>,
    /// Why the last toolbar action was rejected
    pub last_error: Option<SelectionError>,
}

impl Model {
    pub fn new(document: RawDocument, pipeline: &RenderPipeline) -> Self {
        let preview = pipeline.render(&document);
        Self {
            document,
            preview,
            ..Self::default()
        }
    }

    /// Replace the document and recompute the preview.
    pub(super) fn set_document(&mut self, document: RawDocument, pipeline: &RenderPipeline) {
        self.preview = pipeline.render(&document);
        self.document = document;
    }

    /// Invalidate any restore scheduled so far and return the new generation.
    pub(super) const fn bump_generation(&mut self) -> u64 {
        self.restore_generation += 1;
        self.pending_restore = None;
        self.restore_generation
    }
}
