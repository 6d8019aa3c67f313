//! Splits a guide detail / solution string into typed content blocks.
//!
//! Rules are applied in a fixed precedence: fenced code first, then inline
//! code inside what is left, then `**emphasis**` (or breadcrumbs), and
//! finally bullet lines inside the remaining plain text. Every layer only
//! ever looks at the plain runs the previous layer left behind, so blocks
//! never nest and a stray marker simply stays in a `Text` block.

use std::ops::Range;

use crate::types::ContentBlock;

const FENCE: &str = "```";
const EMPHASIS: &str = "**";
const BULLET: &str = "- ";

/// A delimited match: `outer` covers the markers, `inner` only the payload.
struct Span {
    outer: Range<usize>,
    inner: Range<usize>,
}

pub(crate) fn segment(source: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0usize;

    while let Some(span) = find_fence(source, cursor) {
        code_spans(source, cursor..span.outer.start, &mut blocks);
        let body = source[span.inner].trim();
        if !body.is_empty() {
            blocks.push(ContentBlock::CodeBlock(body.to_string()));
        }
        cursor = span.outer.end;
    }
    code_spans(source, cursor..source.len(), &mut blocks);

    blocks
}

fn code_spans(source: &str, run: Range<usize>, out: &mut Vec<ContentBlock>) {
    let mut cursor = run.start;
    while let Some(span) = find_code_span(source, cursor, run.end) {
        emphasis(source, cursor..span.outer.start, out);
        out.push(ContentBlock::InlineCode(source[span.inner].to_string()));
        cursor = span.outer.end;
    }
    emphasis(source, cursor..run.end, out);
}

fn emphasis(source: &str, run: Range<usize>, out: &mut Vec<ContentBlock>) {
    let mut cursor = run.start;
    while let Some(span) = find_emphasis(source, cursor, run.end) {
        bullets(source, cursor..span.outer.start, out);
        out.push(emphasis_block(&source[span.inner]));
        cursor = span.outer.end;
    }
    bullets(source, cursor..run.end, out);
}

/// Split a plain run at lines starting with `- `. The newline in front of a
/// bullet belongs to the bullet marker; text after it stays with the next run.
fn bullets(source: &str, run: Range<usize>, out: &mut Vec<ContentBlock>) {
    let text = &source[run.clone()];
    let starts_line = run.start == 0 || source[..run.start].ends_with('\n');

    let mut pending = 0usize;
    let mut pos = 0usize;
    while pos < text.len() {
        let marker_len = if pos == 0 && starts_line && text.starts_with(BULLET) {
            BULLET.len()
        } else if text[pos..].starts_with('\n') && text[pos + 1..].starts_with(BULLET) {
            1 + BULLET.len()
        } else {
            pos += next_char_len(text, pos);
            continue;
        };

        push_text(&text[pending..pos], out);
        let item_start = pos + marker_len;
        let item_end = text[item_start..]
            .find('\n')
            .map_or(text.len(), |rel| item_start + rel);
        let item = &text[item_start..item_end];
        if !item.is_empty() {
            out.push(ContentBlock::BulletItem(item.to_string()));
        }
        pending = item_end;
        pos = item_end;
    }
    push_text(&text[pending..], out);
}

fn push_text(text: &str, out: &mut Vec<ContentBlock>) {
    if !text.is_empty() {
        out.push(ContentBlock::Text(text.to_string()));
    }
}

fn next_char_len(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(1, char::len_utf8)
}

fn emphasis_block(inner: &str) -> ContentBlock {
    if inner.contains('>') {
        let parts: Vec<String> = inner
            .split('>')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        if parts.len() >= 2 {
            return ContentBlock::Breadcrumb(parts);
        }
    }
    ContentBlock::Bold(inner.to_string())
}

/// Shortest span between two triple-backtick markers.
fn find_fence(source: &str, from: usize) -> Option<Span> {
    let open = from + source[from..].find(FENCE)?;
    let body = open + FENCE.len();
    let close = body + source[body..].find(FENCE)?;
    Some(Span {
        outer: open..close + FENCE.len(),
        inner: body..close,
    })
}

/// Single backticks around a non-empty payload without backticks. Runs of
/// three or more backticks are unclosed fences here and never open or close
/// a span.
fn find_code_span(source: &str, from: usize, limit: usize) -> Option<Span> {
    let text = &source[..limit];
    let mut search = from;
    loop {
        let open = search + text[search..].find('`')?;
        let open_run = backtick_run(text, open);
        if open_run >= FENCE.len() {
            search = open + open_run;
            continue;
        }
        let close = open + 1 + text[open + 1..].find('`')?;
        if close == open + 1 {
            search = open + 1;
            continue;
        }
        let close_run = backtick_run(text, close);
        if close_run >= FENCE.len() {
            search = close + close_run;
            continue;
        }
        return Some(Span {
            outer: open..close + 1,
            inner: open + 1..close,
        });
    }
}

fn backtick_run(text: &str, at: usize) -> usize {
    text[at..].bytes().take_while(|&b| b == b'`').count()
}

/// `**...**` on a single line with a non-empty payload. Markers on different
/// lines never pair, so a stray `**` cannot embolden the rest of a paragraph.
fn find_emphasis(source: &str, from: usize, limit: usize) -> Option<Span> {
    let text = &source[..limit];
    let mut search = from;
    loop {
        let open = search + text[search..].find(EMPHASIS)?;
        let body = open + EMPHASIS.len();
        let close = body + text[body..].find(EMPHASIS)?;
        let inner = &text[body..close];
        if !inner.is_empty() && !inner.contains('\n') {
            return Some(Span {
                outer: open..close + EMPHASIS.len(),
                inner: body..close,
            });
        }
        search = open + 1;
    }
}
