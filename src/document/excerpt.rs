//! Plain-text summaries of Markdown bodies.
//!
//! Excerpts are derived on demand (through the memory optimizer), never at
//! parse time.

use regex::Regex;
use std::sync::LazyLock;

/// Suffix appended when text is cut mid-sentence.
pub const ELLIPSIS: &str = "...";

static RE_IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_REF_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\[[^\]]*\]").unwrap());
static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());
static RE_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*{1,3}|~~|`+|\b__|__\b").unwrap());

/// Strip inline Markdown/HTML markup from a single block of text and
/// collapse whitespace.
pub fn strip_inline(text: &str) -> String {
    let text = RE_IMAGE.replace_all(text, "$1");
    let text = RE_LINK.replace_all(&text, "$1");
    let text = RE_REF_LINK.replace_all(&text, "$1");
    let text = RE_HTML_TAG.replace_all(&text, " ");
    let text = RE_EMPHASIS.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Block classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading,
    Code,
    List,
    Rule,
    Paragraph,
}

/// Split a Markdown body into blank-line separated blocks.
///
/// Fenced code blocks are kept whole even when they contain blank lines.
fn blocks(markdown: &str) -> Vec<(BlockKind, String)> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<&str> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
                out.push((BlockKind::Code, String::new()));
            }
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            flush(&mut current, &mut out);
            fence = Some(&trimmed[..3]);
            continue;
        }
        if trimmed.is_empty() {
            flush(&mut current, &mut out);
            continue;
        }
        current.push(line);
    }
    flush(&mut current, &mut out);

    // An unclosed fence swallows the rest of the body
    if fence.is_some() {
        out.push((BlockKind::Code, String::new()));
    }
    out
}

fn flush(current: &mut Vec<&str>, out: &mut Vec<(BlockKind, String)>) {
    if !current.is_empty() {
        out.push((classify(current), current.join("\n")));
        current.clear();
    }
}

fn classify(lines: &[&str]) -> BlockKind {
    if lines.iter().all(|l| l.starts_with("    ") || l.starts_with('\t')) {
        return BlockKind::Code;
    }
    if lines.len() == 1 && is_rule(lines[0]) {
        return BlockKind::Rule;
    }
    if lines.iter().all(|l| is_atx_heading(l)) {
        return BlockKind::Heading;
    }
    if lines.iter().all(|l| is_list_item(l) || l.starts_with("  ")) && is_list_item(lines[0]) {
        return BlockKind::List;
    }
    BlockKind::Paragraph
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&m| compact.chars().all(|c| c == m))
}

/// `#` to `######` followed by a space or the end of the line.
fn is_atx_heading(line: &str) -> bool {
    let line = line.trim_start();
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes) && line[hashes..].chars().next().is_none_or(char::is_whitespace)
}

fn is_list_item(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("+ ") {
        return true;
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(line.as_bytes().get(digits), Some(b'.' | b')'))
}

/// Paragraph text without block-level prefixes (`>` quotes).
fn paragraph_text(block: &str) -> String {
    let joined = block
        .lines()
        .map(|l| l.trim_start().trim_start_matches('>').trim())
        .collect::<Vec<_>>()
        .join(" ");
    strip_inline(&joined)
}

/// Markup-free text of the whole body, code blocks excluded.
pub fn plain_text(markdown: &str) -> String {
    blocks(markdown)
        .into_iter()
        .filter(|(kind, _)| !matches!(kind, BlockKind::Code | BlockKind::Rule))
        .map(|(kind, text)| match kind {
            BlockKind::Heading => strip_inline(text.trim_start_matches(['#', ' '])),
            BlockKind::List => strip_inline(
                &text
                    .lines()
                    .map(strip_list_marker)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => paragraph_text(&text),
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start();
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))
    {
        return rest;
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && matches!(line.as_bytes().get(digits), Some(b'.' | b')')) {
        return line[digits + 1..].trim_start();
    }
    line
}

// ============================================================================
// Excerpt
// ============================================================================

/// Build a plain-text excerpt of roughly `target` characters.
///
/// Leading heading, code and list blocks are skipped. The first paragraph is
/// returned whole when it fits; otherwise the text is cut at the last
/// sentence end inside the target window, falling back to a word-boundary cut
/// with an ellipsis.
pub fn generate(markdown: &str, target: usize) -> String {
    let paragraph = blocks(markdown)
        .into_iter()
        .filter(|(kind, _)| *kind == BlockKind::Paragraph)
        .map(|(_, text)| paragraph_text(&text))
        .find(|t| !t.is_empty());

    let text = match paragraph {
        Some(text) => text,
        // Nothing but headings/lists/code: summarize whatever text exists
        None => plain_text(markdown),
    };

    if text.chars().count() <= target {
        return text;
    }
    if let Some(end) = sentence_cut(&text, target) {
        return text[..end].to_owned();
    }
    truncate_words(&text, target)
}

/// Byte offset just past the last sentence terminator within the first
/// `target` characters, if it lies in the back half of the window.
fn sentence_cut(text: &str, target: usize) -> Option<usize> {
    let min_chars = target / 2;
    let mut best = None;
    let mut chars = text.char_indices().enumerate().peekable();

    while let Some((n, (idx, c))) = chars.next() {
        if n >= target {
            break;
        }
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, (_, next))| next.is_whitespace());
            if at_boundary && n + 1 >= min_chars {
                best = Some(idx + c.len_utf8());
            }
        }
    }
    best
}

/// Cut `text` to at most `max_chars` characters (ellipsis included) at a
/// word boundary when one exists.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let budget = max_chars.saturating_sub(ELLIPSIS.len());
    let hard_end = text
        .char_indices()
        .nth(budget)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..hard_end];

    let cut = match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };
    format!("{}{ELLIPSIS}", cut.trim_end_matches([',', ';', ':', ' ']))
}
