//! markedit - Markdown preview and toolbar formatting from the command line.
//!
//! # Usage
//!
//! ```bash
//! markedit notes.md -o notes.html
//! markedit --watch notes.md -o notes.html
//! echo "3 hours of meetings" | markedit --action format --selection 0:7
//! ```

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use markedit::app::{CapturedHost, Editor, Message};
use markedit::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use markedit::document::RawDocument;
use markedit::editor::{Mutation, SelectionRange, ToolbarAction};
use markedit::perf;
use markedit::pipeline::RenderPipeline;
use markedit::watcher::{DEFAULT_DEBOUNCE, DocumentWatcher};

/// Render Markdown to sanitized HTML, or apply a toolbar action to it
#[derive(Parser, Debug)]
#[command(name = "markedit", version, about, long_about = None)]
struct Cli {
    /// Markdown file to read; `-` or nothing reads stdin
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Re-render whenever FILE changes
    #[arg(short, long)]
    watch: bool,

    /// Apply a toolbar action and print the resulting text and selection as JSON
    #[arg(long, value_enum, conflicts_with = "watch")]
    action: Option<ToolbarAction>,

    /// Selection for --action, in UTF-16 units
    #[arg(long, value_name = "START:END", value_parser = parse_selection, requires = "action")]
    selection: Option<SelectionRange>,

    /// Disable the {TERM|DEFINITION} syntax
    #[arg(long)]
    no_extensions: bool,

    /// Do not append a marker to strong emphasis
    #[arg(long)]
    no_strong_marker: bool,

    /// Text appended to strong emphasis
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    strong_marker: Option<String>,

    /// Escape raw HTML instead of passing it to the sanitizer
    #[arg(long)]
    no_raw_html: bool,

    /// Render single newlines as line breaks
    #[arg(long)]
    breaks: bool,

    /// Log timing of each pipeline stage
    #[arg(long)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Parse `START:END`, or a single offset for a caret.
fn parse_selection(s: &str) -> Result<SelectionRange, String> {
    let (start, end) = s.split_once(':').unwrap_or((s, s));
    let offset = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid offset {part:?}: {err}"))
    };
    SelectionRange::new(offset(start)?, offset(end)?).map_err(|err| err.to_string())
}

fn read_input(file: Option<&Path>) -> Result<RawDocument> {
    match file {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(RawDocument::from(text))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(RawDocument::from(text))
        }
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write stdout")
        }
    }
}

fn run_action(
    document: RawDocument,
    pipeline: RenderPipeline,
    action: ToolbarAction,
    selection: SelectionRange,
) -> Result<Mutation> {
    let mut editor = Editor::new(document, pipeline);
    let mut host = CapturedHost::default();
    editor.dispatch(Message::Mount, &mut host);
    editor.dispatch(Message::Select(selection), &mut host);
    editor.dispatch(Message::Toolbar(action), &mut host);
    if let Some(err) = editor.model().last_error {
        anyhow::bail!("{} failed: {err}", action.label());
    }
    editor.tick(&mut host);
    let model = editor.model();
    Ok(Mutation {
        text: model.document.to_string(),
        selection: host.restored.last().copied().unwrap_or(model.selection),
    })
}

fn watch(
    path: &Path,
    document: RawDocument,
    pipeline: RenderPipeline,
    output: Option<&Path>,
) -> Result<()> {
    let mut watcher = DocumentWatcher::new(path, document.clone(), DEFAULT_DEBOUNCE)?;
    let mut editor = Editor::new(document, pipeline);
    let mut host = CapturedHost::default();
    editor.dispatch(Message::Mount, &mut host);
    write_output(output, editor.model().preview.as_str())?;
    info!(path = %watcher.path().display(), "watching for changes");

    loop {
        std::thread::sleep(Duration::from_millis(250));
        let Some(changed) = watcher.poll()? else {
            continue;
        };
        let selection = SelectionRange::caret(0);
        editor.dispatch(
            Message::Input {
                text: changed.to_string(),
                selection,
            },
            &mut host,
        );
        write_output(output, editor.model().preview.as_str())?;
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let pipeline = RenderPipeline::standard(&effective.pipeline_config());
    let document = {
        let _scope = perf::scope("input.read");
        read_input(cli.file.as_deref())?
    };
    let output = cli.output.as_deref();

    if let Some(action) = cli.action {
        let selection = cli.selection.unwrap_or_default();
        let mutation = run_action(document, pipeline, action, selection)?;
        let json = serde_json::to_string(&mutation).context("Failed to encode result")?;
        return write_output(output, &format!("{json}\n"));
    }

    if effective.watch {
        let path = cli
            .file
            .as_deref()
            .filter(|path| *path != Path::new("-"))
            .context("--watch needs a FILE argument")?;
        return watch(path, document, pipeline, output);
    }

    write_output(output, pipeline.render(&document).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("0:7"), Ok(SelectionRange::new(0, 7).unwrap()));
        assert_eq!(parse_selection("4"), Ok(SelectionRange::caret(4)));
        assert!(parse_selection("7:0").unwrap_err().contains("after its end"));
        assert!(parse_selection("a:1").is_err());
    }

    #[test]
    fn test_run_action_returns_restored_selection() {
        let mutation = run_action(
            RawDocument::from("3 hours of meetings"),
            RenderPipeline::default(),
            ToolbarAction::Format,
            SelectionRange::new(0, 7).unwrap(),
        )
        .unwrap();
        assert_eq!(mutation.text, "{3 hours|hours} of meetings");
        assert_eq!(mutation.selection, SelectionRange::new(0, 15).unwrap());
    }

    #[test]
    fn test_run_action_reports_bad_selection() {
        let err = run_action(
            RawDocument::from("ab"),
            RenderPipeline::default(),
            ToolbarAction::Bold,
            SelectionRange::new(0, 5).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Bold failed"), "{err}");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
