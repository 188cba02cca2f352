//! Block tokenizer.
//!
//! Works line by line over normalized source. Container blocks (quotes and
//! list items) strip their prefix and recurse on the remaining line slices.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Grammar;
use super::inline::InlineLexer;
use super::token::{ListItem, Token};

static HTML_BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}</?([a-zA-Z][a-zA-Z0-9]*)(?:[\s/>]|$)").expect("html block regex is valid")
});

/// Tags whose block runs until the matching close tag rather than a blank line.
const RAW_TEXT_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "dd", "div", "dl", "dt",
    "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "iframe", "li", "main", "nav", "object", "ol", "p", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

pub(crate) struct BlockLexer<'g> {
    grammar: &'g Grammar,
}

impl<'g> BlockLexer<'g> {
    pub(crate) const fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub(crate) fn lex(&self, src: &str) -> Vec<Token> {
        let normalized = src
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\t', "    ");
        let lines: Vec<&str> = normalized.split('\n').collect();
        self.blocks(&lines)
    }

    fn inline(&self, text: &str) -> Vec<Token> {
        InlineLexer::new(self.grammar).inline_tokens(text)
    }

    fn blocks(&self, lines: &[&str]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];

            if is_blank(line) {
                while i < lines.len() && is_blank(lines[i]) {
                    i += 1;
                }
                tokens.push(Token::Space);
                continue;
            }

            if let Some(fence) = Fence::open(line) {
                i = fenced_code(lines, i, &fence, &mut tokens);
                continue;
            }

            if indent(line) >= 4 {
                i = indented_code(lines, i, &mut tokens);
                continue;
            }

            if let Some((depth, text)) = atx_heading(line) {
                tokens.push(Token::Heading {
                    depth,
                    tokens: self.inline(&text),
                    text,
                });
                i += 1;
                continue;
            }

            if is_hr(line) {
                tokens.push(Token::Hr);
                i += 1;
                continue;
            }

            if strip_quote(line).is_some() {
                i = self.blockquote(lines, i, &mut tokens);
                continue;
            }

            if let Some(marker) = ListMarker::parse(line) {
                i = self.list(lines, i, marker, &mut tokens);
                continue;
            }

            if self.grammar.options.raw_html {
                if let Some(end) = html_block_end(lines, i) {
                    tokens.push(Token::Html {
                        block: true,
                        text: lines[i..end].join("\n"),
                    });
                    i = end;
                    continue;
                }
            }

            i = self.paragraph(lines, i, &mut tokens);
        }
        tokens
    }

    fn blockquote(&self, lines: &[&str], start: usize, out: &mut Vec<Token>) -> usize {
        let mut quoted: Vec<&str> = Vec::new();
        let mut i = start;
        while i < lines.len() {
            let line = lines[i];
            if let Some(rest) = strip_quote(line) {
                quoted.push(rest);
            } else if !is_blank(line)
                && quoted.last().is_some_and(|last| !is_blank(last))
                && !interrupts_paragraph(line)
            {
                // Lazy continuation of a quoted paragraph.
                quoted.push(line);
            } else {
                break;
            }
            i += 1;
        }
        out.push(Token::Blockquote {
            tokens: self.blocks(&quoted),
        });
        i
    }

    fn list(&self, lines: &[&str], start: usize, first: ListMarker, out: &mut Vec<Token>) -> usize {
        let mut items = Vec::new();
        let mut loose = false;
        let mut i = start;
        let mut marker = first;

        loop {
            let mut item_lines: Vec<&str> = vec![lines[i].get(marker.content_offset..).unwrap_or("")];
            i += 1;
            while i < lines.len() {
                let line = lines[i];
                if is_blank(line) {
                    let next = (i..lines.len()).find(|&j| !is_blank(lines[j]));
                    match next {
                        Some(j) if indent(lines[j]) >= marker.content_offset => {
                            loose = true;
                            item_lines.extend(std::iter::repeat_n("", j - i));
                            i = j;
                        }
                        _ => break,
                    }
                } else if indent(line) >= marker.content_offset {
                    item_lines.push(&line[marker.content_offset..]);
                    i += 1;
                } else if ListMarker::parse(line).is_some_and(|m| m.same_kind(&first)) {
                    break;
                } else if item_lines.last().is_some_and(|last| !is_blank(last))
                    && !interrupts_paragraph(line)
                {
                    item_lines.push(line.trim_start());
                    i += 1;
                } else {
                    break;
                }
            }
            items.push(ListItem {
                tokens: self.blocks(&item_lines),
            });

            // Blank lines between items make the list loose.
            let next = (i..lines.len()).find(|&j| !is_blank(lines[j]));
            let Some(j) = next else {
                break;
            };
            match ListMarker::parse(lines[j]) {
                Some(next_marker) if next_marker.same_kind(&first) && !is_hr(lines[j]) => {
                    if j > i {
                        loose = true;
                    }
                    i = j;
                    marker = next_marker;
                }
                _ => break,
            }
        }

        out.push(Token::List {
            ordered: first.ordered,
            start: first.start,
            loose,
            items,
        });
        i
    }

    fn paragraph(&self, lines: &[&str], start: usize, out: &mut Vec<Token>) -> usize {
        let mut para: Vec<&str> = vec![lines[start].trim_start()];
        let mut i = start + 1;
        while i < lines.len() {
            let line = lines[i];
            if let Some(depth) = setext_underline(line) {
                let text = para.join("\n").trim_end().to_string();
                out.push(Token::Heading {
                    depth,
                    tokens: self.inline(&text),
                    text,
                });
                return i + 1;
            }
            if is_blank(line) || interrupts_paragraph(line) {
                break;
            }
            para.push(line.trim_start());
            i += 1;
        }
        let text = para.join("\n").trim_end().to_string();
        out.push(Token::Paragraph {
            tokens: self.inline(&text),
            text,
        });
        i
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

fn strip_indent(line: &str, n: usize) -> &str {
    let n = indent(line).min(n);
    &line[n..]
}

fn fenced_code(lines: &[&str], start: usize, fence: &Fence, out: &mut Vec<Token>) -> usize {
    let mut body = Vec::new();
    let mut i = start + 1;
    while i < lines.len() {
        if fence.closes(lines[i]) {
            i += 1;
            break;
        }
        body.push(strip_indent(lines[i], fence.indent));
        i += 1;
    }
    out.push(Token::Code {
        lang: fence.lang.clone(),
        text: body.join("\n"),
    });
    i
}

fn indented_code(lines: &[&str], start: usize, out: &mut Vec<Token>) -> usize {
    let mut body: Vec<&str> = Vec::new();
    let mut i = start;
    while i < lines.len() && (indent(lines[i]) >= 4 || is_blank(lines[i])) {
        body.push(strip_indent(lines[i], 4));
        i += 1;
    }
    while body.last().is_some_and(|last| is_blank(last)) {
        body.pop();
    }
    out.push(Token::Code {
        lang: None,
        text: body.join("\n"),
    });
    i
}

/// A block starting on `line` would end a paragraph running into it.
fn interrupts_paragraph(line: &str) -> bool {
    Fence::open(line).is_some()
        || atx_heading(line).is_some()
        || is_hr(line)
        || strip_quote(line).is_some()
        || ListMarker::parse(line)
            .is_some_and(|m| (!m.ordered || m.start == 1) && !is_blank(&line[m.content_offset.min(line.len())..]))
}

fn atx_heading(line: &str) -> Option<(u8, String)> {
    if indent(line) > 3 {
        return None;
    }
    let trimmed = line.trim_start();
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let mut text = rest.trim();
    // Optional closing sequence: trailing #'s preceded by a space (or nothing else).
    let without_close = text.trim_end_matches('#');
    if without_close.is_empty() || without_close.ends_with(' ') {
        text = without_close.trim_end();
    }
    u8::try_from(hashes).ok().map(|depth| (depth, text.to_string()))
}

fn is_hr(line: &str) -> bool {
    if indent(line) > 3 {
        return false;
    }
    let mut marker = None;
    let mut count = 0;
    for ch in line.chars() {
        match ch {
            ' ' => {}
            '*' | '-' | '_' => {
                if marker.is_some_and(|m| m != ch) {
                    return false;
                }
                marker = Some(ch);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

fn setext_underline(line: &str) -> Option<u8> {
    if indent(line) > 3 {
        return None;
    }
    let trimmed = line.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'=') {
        Some(1)
    } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn strip_quote(line: &str) -> Option<&str> {
    if indent(line) > 3 {
        return None;
    }
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// End (exclusive) of a raw HTML block starting at `start`, if one starts there.
fn html_block_end(lines: &[&str], start: usize) -> Option<usize> {
    let line = lines[start];
    let close_marker = if line.trim_start().starts_with("<!--") {
        Some("-->".to_string())
    } else {
        let caps = HTML_BLOCK_OPEN.captures(line)?;
        let tag = caps[1].to_ascii_lowercase();
        if RAW_TEXT_TAGS.contains(&tag.as_str()) {
            Some(format!("</{tag}>"))
        } else if BLOCK_TAGS.contains(&tag.as_str()) {
            None
        } else {
            return None;
        }
    };

    let mut i = start;
    match close_marker {
        Some(marker) => {
            while i < lines.len() {
                let done = lines[i].to_ascii_lowercase().contains(&marker);
                i += 1;
                if done {
                    break;
                }
            }
        }
        None => {
            while i < lines.len() && !is_blank(lines[i]) {
                i += 1;
            }
        }
    }
    Some(i)
}

struct Fence {
    marker: u8,
    len: usize,
    indent: usize,
    lang: Option<String>,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let indent = indent(line);
        if indent > 3 {
            return None;
        }
        let rest = &line[indent..];
        let marker = *rest.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = rest.bytes().take_while(|&b| b == marker).count();
        if len < 3 {
            return None;
        }
        let info = rest[len..].trim();
        if marker == b'`' && info.contains('`') {
            return None;
        }
        let lang = info.split_whitespace().next().map(str::to_string);
        Some(Self {
            marker,
            len,
            indent,
            lang,
        })
    }

    fn closes(&self, line: &str) -> bool {
        if indent(line) > 3 {
            return false;
        }
        let trimmed = line.trim();
        let run = trimmed.bytes().take_while(|&b| b == self.marker).count();
        run >= self.len && run == trimmed.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    ordered: bool,
    /// Bullet character, or the delimiter (`.` / `)`) for ordered lists.
    delimiter: u8,
    start: u64,
    content_offset: usize,
}

impl ListMarker {
    fn parse(line: &str) -> Option<Self> {
        let indent = indent(line);
        if indent > 3 {
            return None;
        }
        let rest = &line.as_bytes()[indent..];
        let (ordered, delimiter, start, marker_len) = match rest.first()? {
            b @ (b'-' | b'*' | b'+') => (false, *b, 1, 1),
            b'0'..=b'9' => {
                let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > 9 {
                    return None;
                }
                let delimiter = *rest.get(digits)?;
                if delimiter != b'.' && delimiter != b')' {
                    return None;
                }
                let start = line[indent..indent + digits].parse().ok()?;
                (true, delimiter, start, digits + 1)
            }
            _ => return None,
        };
        let after = &rest[marker_len..];
        let spaces = after.iter().take_while(|&&b| b == b' ').count();
        if spaces == 0 && !after.is_empty() {
            return None;
        }
        let padding = if spaces == 0 || spaces > 4 || spaces == after.len() {
            1
        } else {
            spaces
        };
        Some(Self {
            ordered,
            delimiter,
            start,
            content_offset: indent + marker_len + padding,
        })
    }

    const fn same_kind(&self, other: &Self) -> bool {
        self.ordered == other.ordered && self.delimiter == other.delimiter
    }
}
