use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::grammar::StrongSuffix;
use crate::pipeline::PipelineConfig;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_extensions: bool,
    pub no_strong_marker: bool,
    pub strong_marker: Option<String>,
    pub no_raw_html: bool,
    pub breaks: bool,
    pub perf: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_extensions: self.no_extensions || other.no_extensions,
            no_strong_marker: self.no_strong_marker || other.no_strong_marker,
            strong_marker: other
                .strong_marker
                .clone()
                .or_else(|| self.strong_marker.clone()),
            no_raw_html: self.no_raw_html || other.no_raw_html,
            breaks: self.breaks || other.breaks,
            perf: self.perf || other.perf,
        }
    }

    /// Grammar options for the render pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let strong_marker = if self.no_strong_marker {
            None
        } else {
            Some(
                self.strong_marker
                    .clone()
                    .unwrap_or_else(|| StrongSuffix::DEFAULT.to_string()),
            )
        };
        PipelineConfig {
            extensions: !self.no_extensions,
            strong_marker,
            raw_html: !self.no_raw_html,
            breaks: self.breaks,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("markedit").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("markedit")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("markedit").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("markedit")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".markeditrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut tokens = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = split_config_line(line)
            .with_context(|| format!("{}:{}: malformed line", path.display(), number + 1))?;
        tokens.extend(parsed);
    }
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# markedit defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_extensions {
        lines.push("--no-extensions".to_string());
    }
    if flags.no_strong_marker {
        lines.push("--no-strong-marker".to_string());
    }
    if let Some(marker) = &flags.strong_marker {
        // Quoted so leading and trailing spaces survive.
        let quoted = serde_json::to_string(marker).context("Failed to encode strong marker")?;
        lines.push(format!("--strong-marker {quoted}"));
    }
    if flags.no_raw_html {
        lines.push("--no-raw-html".to_string());
    }
    if flags.breaks {
        lines.push("--breaks".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--watch" || token == "-w" {
            flags.watch = true;
        } else if token == "--no-extensions" {
            flags.no_extensions = true;
        } else if token == "--no-strong-marker" {
            flags.no_strong_marker = true;
        } else if token == "--no-raw-html" {
            flags.no_raw_html = true;
        } else if token == "--breaks" {
            flags.breaks = true;
        } else if token == "--perf" {
            flags.perf = true;
        } else if token == "--strong-marker" {
            if let Some(next) = tokens.get(i + 1) {
                flags.strong_marker = Some(next.clone());
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--strong-marker=") {
            flags.strong_marker = Some(value.to_string());
        }
        i += 1;
    }
    flags
}

/// Split a config line on whitespace. Double-quoted segments are JSON
/// string literals and may contain spaces.
fn split_config_line(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut pos = 0;
    while let Some(ch) = line[pos..].chars().next() {
        if ch.is_whitespace() {
            if in_token {
                tokens.push(std::mem::take(&mut current));
                in_token = false;
            }
            pos += ch.len_utf8();
            continue;
        }
        in_token = true;
        if ch == '"' {
            let len = quoted_len(&line[pos..]).context("unterminated string")?;
            let literal = &line[pos..pos + len];
            let value: String = serde_json::from_str(literal)
                .with_context(|| format!("invalid string {literal}"))?;
            current.push_str(&value);
            pos += len;
        } else {
            current.push(ch);
            pos += ch.len_utf8();
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Byte length of the quoted literal at the start of `s`, quotes included.
fn quoted_len(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, byte) in s.bytes().enumerate().skip(1) {
        match byte {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}
