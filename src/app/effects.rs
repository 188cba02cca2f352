use crate::app::{Editor, EditorHost, Message};

impl Editor {
    pub(super) fn handle_message_side_effects(&mut self, msg: &Message, host: &mut dyn EditorHost) {
        match msg {
            Message::Mount => {
                host.set_text(&self.model.document);
                host.show_preview(&self.model.preview);
            }
            Message::Input { .. } => host.show_preview(&self.model.preview),
            Message::Toolbar(_) => {
                if self.model.last_error.is_some() {
                    return;
                }
                host.set_text(&self.model.document);
                host.show_preview(&self.model.preview);
                if let Some(pending) = self.model.pending_restore {
                    self.scheduler
                        .schedule(Message::RestoreSelection(pending.generation));
                }
            }
            Message::RestoreSelection(_) => {
                if let Some(restored) = self.model.last_restored {
                    host.restore_selection(restored.selection);
                }
            }
            Message::CopyMarkdown => host.copy_to_clipboard(&self.model.document),
            Message::Select(_) | Message::Unmount => {}
        }
    }
}
