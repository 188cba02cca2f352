//! Inline tokenizer.
//!
//! Scans a span of text left to right. At every stop the registered
//! extensions get the first chance to match, then the built-in rules, and
//! finally the text rule swallows everything up to the next character that
//! could start a rule. Delimiters that never close fall through to text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::Grammar;
use super::token::Token;

static AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([a-zA-Z][a-zA-Z0-9+.\-]{1,31}:[^\s<>]*)>").expect("autolink regex is valid")
});

static EMAIL_AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<([a-zA-Z0-9.!#$%&'*+/=?^_`{|}~\-]+@[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*)>",
    )
    .expect("email autolink regex is valid")
});

static INLINE_HTML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:<[a-zA-Z][a-zA-Z0-9\-]*(?:\s+[a-zA-Z_:][a-zA-Z0-9_.:\-]*(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)*\s*/?>|</[a-zA-Z][a-zA-Z0-9\-]*\s*>|<!--[\s\S]*?-->)"#,
    )
    .expect("inline html regex is valid")
});

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s<]+").expect("bare url regex is valid"));

/// Inline lexer bound to one [`Grammar`].
///
/// Extensions receive a reference to the lexer so they can tokenize nested
/// spans with the same grammar.
#[derive(Debug, Clone, Copy)]
pub struct InlineLexer<'g> {
    grammar: &'g Grammar,
    in_link: bool,
}

impl<'g> InlineLexer<'g> {
    pub(crate) const fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            in_link: false,
        }
    }

    /// The grammar driving this lexer.
    pub const fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Whether the lexer is currently inside link text (links don't nest).
    pub const fn in_link(&self) -> bool {
        self.in_link
    }

    const fn inside_link(self) -> Self {
        Self {
            grammar: self.grammar,
            in_link: true,
        }
    }

    /// Tokenize `src` as inline content.
    pub fn inline_tokens(&self, src: &str) -> Vec<Token> {
        let mut out = Vec::new();
        let extensions = &self.grammar.extensions;
        let mut hints: Vec<Option<usize>> = extensions.iter().map(|ext| ext.start(src)).collect();
        let mut pos = 0;

        'scan: while pos < src.len() {
            let rest = &src[pos..];

            for (ext, hint) in extensions.iter().zip(hints.iter_mut()) {
                if hint.is_some_and(|h| h < pos) {
                    *hint = ext.start(rest).map(|offset| offset + pos);
                }
                if *hint != Some(pos) {
                    continue;
                }
                if let Some(token) = ext.tokenize(rest, self) {
                    if !token.raw.is_empty() && rest.starts_with(token.raw.as_str()) {
                        trace!(extension = ext.name(), raw = %token.raw, "extension matched");
                        pos += token.raw.len();
                        out.push(Token::Extension(token));
                        continue 'scan;
                    }
                }
            }

            // Extensions that declined here look again past this character.
            let step = rest.chars().next().map_or(1, char::len_utf8);
            for (ext, hint) in extensions.iter().zip(hints.iter_mut()) {
                if *hint == Some(pos) {
                    *hint = ext.start(&rest[step..]).map(|offset| offset + pos + step);
                }
            }

            let prev = src[..pos].chars().next_back();
            if let Some((token, consumed)) = self.builtin(rest, prev) {
                push_token(&mut out, token);
                pos += consumed;
                continue;
            }

            let next_hint = hints
                .iter()
                .filter_map(|hint| hint.filter(|&h| h > pos))
                .min()
                .map(|h| h - pos);
            let len = self.text_run(rest, prev, next_hint);
            push_token(&mut out, Token::text(&rest[..len]));
            pos += len;
        }

        out
    }

    fn builtin(&self, rest: &str, prev: Option<char>) -> Option<(Token, usize)> {
        let options = self.grammar.options;
        match rest.chars().next()? {
            '\\' => escape(rest),
            '<' => self.angle(rest),
            '!' => self.image(rest),
            '[' if !self.in_link => self.link(rest),
            '*' | '_' => self.emphasis(rest, prev),
            '`' => Some(codespan(rest)),
            '~' if options.gfm => self.delimited(rest, "~~", Delimited::Del),
            ' ' => hard_break(rest),
            '\n' if options.breaks => Some((Token::Br, 1)),
            'h' if options.gfm && !self.in_link && !prev.is_some_and(char::is_alphanumeric) => {
                bare_url(rest)
            }
            _ => None,
        }
    }

    fn text_run(&self, rest: &str, prev: Option<char>, hint: Option<usize>) -> usize {
        let options = self.grammar.options;
        let mut prev = prev;
        for (idx, ch) in rest.char_indices() {
            if idx > 0 {
                if hint.is_some_and(|h| idx >= h) {
                    return idx;
                }
                let stop = match ch {
                    '\\' | '<' | '!' | '[' | '*' | '_' | '`' => true,
                    '~' => options.gfm,
                    '\n' => options.breaks,
                    ' ' => hard_break(&rest[idx..]).is_some(),
                    'h' => {
                        options.gfm
                            && !self.in_link
                            && !prev.is_some_and(char::is_alphanumeric)
                            && rest[idx..].starts_with("http")
                    }
                    _ => false,
                };
                if stop {
                    return idx;
                }
            }
            prev = Some(ch);
        }
        rest.len()
    }

    fn angle(&self, rest: &str) -> Option<(Token, usize)> {
        if !self.in_link {
            if let Some(caps) = AUTOLINK.captures(rest) {
                let href = caps[1].to_string();
                return Some((autolink(href.clone(), href), caps[0].len()));
            }
            if let Some(caps) = EMAIL_AUTOLINK.captures(rest) {
                let address = caps[1].to_string();
                return Some((autolink(format!("mailto:{address}"), address), caps[0].len()));
            }
        }
        if self.grammar.options.raw_html {
            if let Some(m) = INLINE_HTML.find(rest) {
                return Some((
                    Token::Html {
                        block: false,
                        text: m.as_str().to_string(),
                    },
                    m.len(),
                ));
            }
        }
        None
    }

    fn image(&self, rest: &str) -> Option<(Token, usize)> {
        let parts = link_parts(rest.strip_prefix('!')?)?;
        Some((
            Token::Image {
                href: parts.href,
                title: parts.title,
                text: parts.label.to_string(),
            },
            parts.len + 1,
        ))
    }

    fn link(&self, rest: &str) -> Option<(Token, usize)> {
        let parts = link_parts(rest)?;
        let tokens = self.inside_link().inline_tokens(parts.label);
        Some((
            Token::Link {
                href: parts.href,
                title: parts.title,
                text: parts.label.to_string(),
                tokens,
            },
            parts.len,
        ))
    }

    fn emphasis(&self, rest: &str, prev: Option<char>) -> Option<(Token, usize)> {
        let (single, double) = if rest.starts_with('*') {
            ("*", "**")
        } else {
            // Intraword underscores are literal.
            if prev.is_some_and(char::is_alphanumeric) {
                return None;
            }
            ("_", "__")
        };
        if rest.starts_with(double) {
            if let Some(found) = self.delimited(rest, double, Delimited::Strong) {
                return Some(found);
            }
        }
        self.delimited(rest, single, Delimited::Em)
    }

    fn delimited(&self, rest: &str, delim: &str, kind: Delimited) -> Option<(Token, usize)> {
        let after = rest.strip_prefix(delim)?;
        if after.chars().next()?.is_whitespace() {
            return None;
        }
        let close = find_closing(after, delim)?;
        let inner = &after[..close];
        let text = inner.to_string();
        let tokens = self.inline_tokens(inner);
        let token = match kind {
            Delimited::Strong => Token::Strong { text, tokens },
            Delimited::Em => Token::Em { text, tokens },
            Delimited::Del => Token::Del { text, tokens },
        };
        Some((token, close + delim.len() * 2))
    }
}

#[derive(Debug, Clone, Copy)]
enum Delimited {
    Strong,
    Em,
    Del,
}

/// Append a token, merging adjacent text runs.
fn push_token(out: &mut Vec<Token>, token: Token) {
    if let Token::Text { text } = &token {
        if text.is_empty() {
            return;
        }
        if let Some(Token::Text { text: last }) = out.last_mut() {
            last.push_str(text);
            return;
        }
    }
    out.push(token);
}

fn autolink(href: String, text: String) -> Token {
    Token::Link {
        href,
        title: None,
        tokens: vec![Token::text(text.clone())],
        text,
    }
}

fn escape(rest: &str) -> Option<(Token, usize)> {
    let next = rest[1..].chars().next()?;
    if next == '\n' {
        return Some((Token::Br, 2));
    }
    if next.is_ascii_punctuation() {
        return Some((
            Token::Escape {
                text: next.to_string(),
            },
            2,
        ));
    }
    None
}

fn hard_break(rest: &str) -> Option<(Token, usize)> {
    let spaces = rest.bytes().take_while(|&b| b == b' ').count();
    (spaces >= 2 && rest[spaces..].starts_with('\n')).then_some((Token::Br, spaces + 1))
}

fn bare_url(rest: &str) -> Option<(Token, usize)> {
    let m = BARE_URL.find(rest)?;
    let mut url = m.as_str();
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'', '*', '_', '~']);
        let unbalanced = trimmed.matches(')').count() > trimmed.matches('(').count();
        let trimmed = if trimmed.ends_with(')') && unbalanced {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            break;
        }
        url = trimmed;
    }
    let host = url.split_once("://").map_or("", |(_, host)| host);
    if host.is_empty() {
        return None;
    }
    Some((autolink(url.to_string(), url.to_string()), url.len()))
}

/// Length of a backtick run at the start of `src`.
fn backtick_run(src: &str) -> usize {
    src.bytes().take_while(|&b| b == b'`').count()
}

/// Total length of a complete code span at the start of `src`, if any.
fn codespan_len(src: &str) -> Option<usize> {
    let open = backtick_run(src);
    let mut i = open;
    while i < src.len() {
        if src.as_bytes()[i] == b'`' {
            let run = backtick_run(&src[i..]);
            if run == open {
                return Some(i + run);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

fn codespan(rest: &str) -> (Token, usize) {
    let open = backtick_run(rest);
    let Some(total) = codespan_len(rest) else {
        return (Token::text(&rest[..open]), open);
    };
    let body = rest[open..total - open].replace('\n', " ");
    let text = if body.len() >= 2
        && body.starts_with(' ')
        && body.ends_with(' ')
        && !body.chars().all(|c| c == ' ')
    {
        body[1..body.len() - 1].to_string()
    } else {
        body
    };
    (Token::Codespan { text }, total)
}

/// Find the closing delimiter for an emphasis-like span.
///
/// `src` starts right after the opening delimiter. Escapes and code spans
/// are skipped. A closer must follow a non-whitespace character; an `_`
/// closer must not be followed by an alphanumeric one.
fn find_closing(src: &str, delim: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let marker = delim.as_bytes()[0];
    let mut prev: Option<char> = None;
    let mut i = 0;
    while i < src.len() {
        let ch = src[i..].chars().next()?;
        if ch == '\\' {
            let next = src[i + 1..].chars().next();
            i += 1 + next.map_or(0, char::len_utf8);
            prev = next;
            continue;
        }
        if ch == '`' {
            if let Some(len) = codespan_len(&src[i..]) {
                i += len;
                prev = Some('`');
                continue;
            }
        }
        if bytes[i] == marker {
            let run = bytes[i..].iter().take_while(|&&b| b == marker).count();
            let closes = prev.is_some_and(|p| !p.is_whitespace()) && {
                let after = src[i + run..].chars().next();
                !(marker == b'_' && after.is_some_and(char::is_alphanumeric))
            };
            match (delim.len(), run) {
                (1, 1) | (2, 2) if closes => return Some(i),
                // A longer run closes with its last delimiter(s), so the
                // inner span keeps the nested markers.
                (1, n) if closes && n % 2 == 1 => return Some(i + n - 1),
                (2, n) if closes && n > 2 => return Some(i + n - 2),
                _ => {}
            }
            i += run;
            prev = Some(ch);
            continue;
        }
        i += ch.len_utf8();
        prev = Some(ch);
    }
    None
}

struct LinkParts<'a> {
    label: &'a str,
    href: String,
    title: Option<String>,
    len: usize,
}

/// Parse `[label](destination "title")` at the start of `src`.
fn link_parts(src: &str) -> Option<LinkParts<'_>> {
    let close = matching_bracket(src)?;
    let label = &src[1..close];
    let inner = src[close + 1..].strip_prefix('(')?;

    let mut offset = leading_whitespace(inner);
    let (href, href_len) = link_destination(&inner[offset..])?;
    offset += href_len;

    let mut title = None;
    let ws = leading_whitespace(&inner[offset..]);
    if ws > 0 {
        if let Some((parsed, title_len)) = link_title(&inner[offset + ws..]) {
            title = Some(parsed);
            offset += ws + title_len;
        }
    }
    offset += leading_whitespace(&inner[offset..]);
    if !inner[offset..].starts_with(')') {
        return None;
    }
    Some(LinkParts {
        label,
        href,
        title,
        len: close + 2 + offset + 1,
    })
}

fn leading_whitespace(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn matching_bracket(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < src.len() {
        match src.as_bytes()[i] {
            b'\\' => {
                i += 1 + src[i + 1..].chars().next().map_or(0, char::len_utf8);
                continue;
            }
            b'`' => {
                if let Some(len) = codespan_len(&src[i..]) {
                    i += len;
                    continue;
                }
            }
            b'[' => depth += 1,
            b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn link_destination(src: &str) -> Option<(String, usize)> {
    if let Some(body) = src.strip_prefix('<') {
        let end = body.find(['>', '<', '\n'])?;
        if body.as_bytes()[end] != b'>' {
            return None;
        }
        return Some((unescape(&body[..end]), end + 2));
    }
    let mut depth = 0usize;
    let mut end = src.len();
    let mut chars = src.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '(' => depth += 1,
            ')' if depth == 0 => {
                end = idx;
                break;
            }
            ')' => depth -= 1,
            c if c.is_whitespace() || c.is_control() => {
                end = idx;
                break;
            }
            _ => {}
        }
    }
    (depth == 0).then(|| (unescape(&src[..end]), end))
}

fn link_title(src: &str) -> Option<(String, usize)> {
    let open = src.chars().next()?;
    let close = match open {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let mut chars = src.char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            chars.next();
        } else if ch == close {
            return Some((unescape(&src[1..idx]), idx + 1));
        }
    }
    None
}

/// Drop backslashes in front of ASCII punctuation.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek().is_some_and(char::is_ascii_punctuation) {
            continue;
        }
        out.push(ch);
    }
    out
}
