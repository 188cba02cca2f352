use crate::document::RawDocument;
use crate::editor::{SelectionError, SelectionRange, ToolbarAction};
use crate::pipeline::{PipelineConfig, RenderPipeline};

use super::{CapturedHost, Editor, Message, Model, update};

fn range(start: usize, end: usize) -> SelectionRange {
    SelectionRange::new(start, end).unwrap()
}

fn create_test_model(text: &str) -> (Model, RenderPipeline) {
    let pipeline = RenderPipeline::default();
    let mut model = Model::new(RawDocument::from(text), &pipeline);
    model.mounted = true;
    (model, pipeline)
}

fn create_mounted_editor(text: &str) -> (Editor, CapturedHost) {
    let mut editor = Editor::new(RawDocument::from(text), RenderPipeline::default());
    let mut host = CapturedHost::default();
    editor.dispatch(Message::Mount, &mut host);
    (editor, host)
}

#[test]
fn test_new_model_has_rendered_preview() {
    let (model, _) = create_test_model("**hi**");
    assert_eq!(model.preview.as_str(), "<p><strong>hi walked</strong></p>\n");
}

#[test]
fn test_input_replaces_document_and_preview() {
    let (model, pipeline) = create_test_model("old");
    let model = update(
        model,
        Message::Input {
            text: "{a|b}".into(),
            selection: SelectionRange::caret(5),
        },
        &pipeline,
    );
    assert_eq!(model.document.as_str(), "{a|b}");
    assert_eq!(model.selection, SelectionRange::caret(5));
    assert!(model.preview.as_str().contains("<dt>a</dt><dd>b</dd>"));
}

#[test]
fn test_toolbar_applies_mutation_and_records_restore() {
    let (mut model, pipeline) = create_test_model("hello world");
    model.selection = range(0, 5);
    let model = update(model, Message::Toolbar(ToolbarAction::Bold), &pipeline);

    assert_eq!(model.document.as_str(), "**hello** world");
    assert_eq!(model.selection, range(0, 9));
    assert_eq!(model.restore_generation, 1);
    let pending = model.pending_restore.expect("restore should be pending");
    assert_eq!(pending.generation, 1);
    assert_eq!(pending.selection, range(0, 9));
}

#[test]
fn test_toolbar_error_leaves_document_untouched() {
    let (mut model, pipeline) = create_test_model("abc");
    model.selection = range(0, 7);
    let model = update(model, Message::Toolbar(ToolbarAction::Italic), &pipeline);

    assert_eq!(model.document.as_str(), "abc");
    assert_eq!(
        model.last_error,
        Some(SelectionError::OutOfBounds { offset: 7, len: 3 })
    );
    assert!(model.pending_restore.is_none());
    assert_eq!(model.restore_generation, 0);
}

#[test]
fn test_successful_action_clears_previous_error() {
    let (mut model, pipeline) = create_test_model("abc");
    model.selection = range(0, 7);
    let model = update(model, Message::Toolbar(ToolbarAction::Italic), &pipeline);
    let model = update(model, Message::Select(range(0, 1)), &pipeline);
    let model = update(model, Message::Toolbar(ToolbarAction::Italic), &pipeline);
    assert_eq!(model.last_error, None);
    assert_eq!(model.document.as_str(), "*a*bc");
}

#[test]
fn test_select_invalidates_pending_restore() {
    let (model, pipeline) = create_test_model("abc");
    let model = update(model, Message::Toolbar(ToolbarAction::Bold), &pipeline);
    let generation = model.restore_generation;
    let model = update(model, Message::Select(range(1, 2)), &pipeline);
    let model = update(model, Message::RestoreSelection(generation), &pipeline);
    assert_eq!(model.selection, range(1, 2));
    assert!(model.last_restored.is_none());
}

#[test]
fn test_restore_after_unmount_is_noop() {
    let (model, pipeline) = create_test_model("abc");
    let model = update(model, Message::Toolbar(ToolbarAction::Bold), &pipeline);
    let generation = model.restore_generation;
    let model = update(model, Message::Unmount, &pipeline);
    let model = update(model, Message::RestoreSelection(generation), &pipeline);
    assert!(!model.mounted);
    assert!(model.last_restored.is_none());
}

#[test]
fn test_mount_pushes_text_and_preview() {
    let (_, host) = create_mounted_editor("# T");
    assert_eq!(host.text.as_deref(), Some("# T"));
    assert_eq!(
        host.preview.as_ref().map(|p| p.as_str()),
        Some("<h1>T</h1>\n")
    );
}

#[test]
fn test_restore_runs_on_next_tick() {
    let (mut editor, mut host) = create_mounted_editor("hello");
    editor.dispatch(Message::Select(range(0, 5)), &mut host);
    editor.dispatch(Message::Toolbar(ToolbarAction::Strikethrough), &mut host);

    assert_eq!(host.text.as_deref(), Some("~~hello~~"));
    assert!(host.restored.is_empty(), "restore must wait for the next tick");
    assert_eq!(editor.pending_tasks(), 1);

    assert_eq!(editor.tick(&mut host), 1);
    assert_eq!(host.restored, vec![range(0, 9)]);
    assert_eq!(editor.tick(&mut host), 0);
}

#[test]
fn test_stale_restore_is_skipped() {
    let (mut editor, mut host) = create_mounted_editor("ab");
    editor.dispatch(Message::Select(range(0, 1)), &mut host);
    editor.dispatch(Message::Toolbar(ToolbarAction::Bold), &mut host);
    editor.dispatch(Message::Toolbar(ToolbarAction::Italic), &mut host);

    assert_eq!(host.text.as_deref(), Some("***a***b"));
    assert_eq!(editor.tick(&mut host), 2);
    assert_eq!(host.restored, vec![range(0, 7)]);
}

#[test]
fn test_unmount_before_tick_cancels_restore() {
    let (mut editor, mut host) = create_mounted_editor("ab");
    editor.dispatch(Message::Toolbar(ToolbarAction::Format), &mut host);
    editor.dispatch(Message::Unmount, &mut host);
    editor.tick(&mut host);
    assert!(host.restored.is_empty());
    assert_eq!(editor.model().document.as_str(), "{|hours}ab");
}

#[test]
fn test_typing_before_tick_cancels_restore() {
    let (mut editor, mut host) = create_mounted_editor("ab");
    editor.dispatch(Message::Toolbar(ToolbarAction::Bold), &mut host);
    editor.dispatch(
        Message::Input {
            text: "**x**ab".into(),
            selection: SelectionRange::caret(3),
        },
        &mut host,
    );
    editor.tick(&mut host);
    assert!(host.restored.is_empty());
    assert_eq!(editor.model().selection, SelectionRange::caret(3));
}

#[test]
fn test_copy_markdown_exports_raw_text() {
    let (mut editor, mut host) = create_mounted_editor("**raw** <script>x</script>");
    editor.dispatch(Message::CopyMarkdown, &mut host);
    assert_eq!(host.clipboard.as_deref(), Some("**raw** <script>x</script>"));
}

#[test]
fn test_rejected_action_pushes_nothing() {
    let mut editor = Editor::new(RawDocument::from("ab"), RenderPipeline::default())
        .with_selection(range(0, 9));
    let mut host = CapturedHost::default();
    editor.dispatch(Message::Toolbar(ToolbarAction::Bold), &mut host);
    assert_eq!(host, CapturedHost::default());
    assert_eq!(editor.pending_tasks(), 0);
}

#[test]
fn test_insert_table_keeps_text() {
    let (mut editor, mut host) = create_mounted_editor("ab");
    editor.dispatch(Message::Select(range(1, 1)), &mut host);
    editor.dispatch(Message::Toolbar(ToolbarAction::InsertTable), &mut host);
    editor.tick(&mut host);
    assert_eq!(editor.model().document.as_str(), "ab");
    assert_eq!(host.restored, vec![SelectionRange::caret(1)]);
}

#[test]
fn test_editor_uses_its_own_pipeline() {
    let pipeline = RenderPipeline::standard(&PipelineConfig::plain());
    let mut editor = Editor::new(RawDocument::from("**a**"), pipeline);
    let mut host = CapturedHost::default();
    editor.dispatch(Message::Mount, &mut host);
    assert_eq!(
        host.preview.map(|p| p.into_string()).as_deref(),
        Some("<p><strong>a</strong></p>\n")
    );
}
