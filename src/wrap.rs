//! # Text Wrapping
//!
//! Breaks substituted text into lines that fit a pixel width.
//!
//! ## Budget
//!
//! The width of a capital "M" is taken as the width of every character:
//!
//! ```text
//! budget = max(floor(max_width / width("M")), 1)
//!
//! max_width 200px, "M" 20px → 10 characters per line
//! ```
//!
//! This is a fixed-pitch approximation, fine for the short bounded strings
//! printed on labels.
//!
//! ## Rules
//!
//! - Each input line is a paragraph and is wrapped on its own; empty
//!   paragraphs come out as empty lines.
//! - Lines break at spaces only, never at hyphens.
//! - A word longer than the budget is split mid-word, filling the rest of
//!   the current line first.
//! - Whitespace at the start and end of wrapped lines is dropped, except
//!   indentation at the very start of a paragraph.

use crate::font::GlyphMetrics;

/// Glyph whose width sets the character budget.
pub const REFERENCE_GLYPH: char = 'M';

/// Tab stops used when expanding tabs before wrapping.
const TAB_SIZE: usize = 8;

/// Characters per line that fit in `max_width` pixels for this face.
pub fn wrap_budget(font: &impl GlyphMetrics, max_width: u32) -> usize {
    let reference = font.glyph_width(REFERENCE_GLYPH).max(1.0);
    ((max_width as f32 / reference) as usize).max(1)
}

/// Wrap `text` so no line exceeds `max_width` pixels (as estimated).
///
/// Returns the text unchanged when `max_width` is `None` or the text is empty.
pub fn wrap_text_to_width(text: &str, font: &impl GlyphMetrics, max_width: Option<u32>) -> String {
    match max_width {
        Some(max_width) if max_width > 0 && !text.is_empty() => {
            wrap_paragraphs(text, wrap_budget(font, max_width))
        }
        _ => text.to_string(),
    }
}

/// Wrap every paragraph of `text` to `width` characters.
pub fn wrap_paragraphs(text: &str, width: usize) -> String {
    text.lines()
        .map(|paragraph| {
            if paragraph.is_empty() {
                String::new()
            } else {
                fill_paragraph(paragraph, width).join("\n")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedily wrap a single paragraph to `width` characters per line.
///
/// A paragraph holding only whitespace wraps to no lines at all.
pub fn fill_paragraph(paragraph: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let normalized = normalize_whitespace(paragraph);

    // Chunks alternate between words and runs of spaces; consumed from the back
    let mut chunks: Vec<String> = split_chunks(&normalized);
    chunks.reverse();

    let mut lines: Vec<String> = Vec::new();
    while !chunks.is_empty() {
        let mut line: Vec<String> = Vec::new();
        let mut line_len = 0usize;

        // Leading whitespace is dropped on every line but the first
        if !lines.is_empty() && chunks.last().is_some_and(|c| is_space(c)) {
            chunks.pop();
        }

        while let Some(chunk) = chunks.last() {
            let len = char_len(chunk);
            if line_len + len > width {
                break;
            }
            line_len += len;
            if let Some(chunk) = chunks.pop() {
                line.push(chunk);
            }
        }

        if chunks.last().is_some_and(|c| char_len(c) > width) {
            break_long_word(&mut chunks, &mut line, line_len, width);
        }

        if line.last().is_some_and(|c| is_space(c)) {
            line.pop();
        }

        if !line.is_empty() {
            lines.push(line.concat());
        }
    }
    lines
}

/// Move as much of the oversized chunk on top of `chunks` as fits onto `line`.
///
/// A full line takes nothing; the chunk starts the next line instead.
fn break_long_word(chunks: &mut [String], line: &mut Vec<String>, line_len: usize, width: usize) {
    let space_left = width.saturating_sub(line_len);
    if space_left == 0 {
        return;
    }
    if let Some(chunk) = chunks.last_mut() {
        let split = chunk
            .char_indices()
            .nth(space_left)
            .map(|(idx, _)| idx)
            .unwrap_or(chunk.len());
        let rest = chunk.split_off(split);
        line.push(std::mem::replace(chunk, rest));
    }
}

/// Expand tabs to the next tab stop and turn other ASCII whitespace into spaces.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(' ');
                column = 0;
            }
            '\x0b' | '\x0c' => {
                out.push(' ');
                column += 1;
            }
            other => {
                out.push(other);
                column += 1;
            }
        }
    }
    out
}

/// Split into maximal runs of spaces and of non-spaces.
fn split_chunks(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_is_space = false;
    for ch in text.chars() {
        let space = ch == ' ';
        if !current.is_empty() && space != current_is_space {
            chunks.push(std::mem::take(&mut current));
        }
        current_is_space = space;
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[inline]
fn is_space(chunk: &str) -> bool {
    chunk.chars().all(|c| c == ' ')
}

#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}
