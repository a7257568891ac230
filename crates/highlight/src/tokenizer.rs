//! Single-pass classifier.
//!
//! Each line is split at its first comment introducer. The code part is
//! scanned left to right, so strings, numbers, words and operators claim
//! disjoint ranges and nothing is emitted inside a comment. Flagged
//! characters are collected in a separate pass over the whole text.

use crate::span::{Span, SpanCategory, SpanSet};
use crate::vocabulary::Vocabulary;

/// Classify `text` using the Lua vocabulary.
pub fn tokenize(text: &str) -> SpanSet {
    tokenize_with(text, &Vocabulary::LUA)
}

/// Classify `text` against `vocab`. Offsets are byte offsets.
pub fn tokenize_with(text: &str, vocab: &Vocabulary) -> SpanSet {
    let mut spans = Vec::new();
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let code_len = if vocab.comment.is_empty() {
            None
        } else {
            content.find(vocab.comment)
        };

        match code_len {
            Some(idx) => {
                scan_code(content.get(..idx).unwrap_or(""), line_start, vocab, &mut spans);
                spans.push(Span::new(
                    line_start + idx,
                    line_start + content.len(),
                    SpanCategory::Comment,
                ));
            }
            None => scan_code(content, line_start, vocab, &mut spans),
        }

        line_start += line.len();
    }

    spans.extend(
        text.match_indices(vocab.flagged)
            .map(|(idx, m)| Span::new(idx, idx + m.len(), SpanCategory::FlaggedChar)),
    );

    SpanSet::from_unsorted(spans)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scan one comment-free line segment starting at byte `base`.
fn scan_code(code: &str, base: usize, vocab: &Vocabulary, spans: &mut Vec<Span>) {
    let mut i = 0;

    while let Some(c) = code.get(i..).and_then(|rest| rest.chars().next()) {
        if c == '"' || c == '\'' {
            if let Some(end) = string_end(code, i, c) {
                spans.push(Span::new(base + i, base + end, SpanCategory::String));
                i = end;
                continue;
            }
        } else if is_word_char(c) {
            let end = word_end(code, i);
            if c.is_ascii_digit() {
                if let Some(num_end) = number_end(code, i) {
                    spans.push(Span::new(base + i, base + num_end, SpanCategory::Number));
                    i = num_end;
                    continue;
                }
            } else if let Some(word) = code.get(i..end) {
                let category = if vocab.is_keyword(word) {
                    Some(SpanCategory::Keyword)
                } else if vocab.is_builtin(word) {
                    Some(SpanCategory::FunctionName)
                } else {
                    None
                };
                if let Some(category) = category {
                    spans.push(Span::new(base + i, base + end, category));
                }
            }
            i = end;
            continue;
        } else if vocab.is_operator(c) {
            spans.push(Span::new(base + i, base + i + c.len_utf8(), SpanCategory::Operator));
        }

        i += c.len_utf8();
    }
}

/// End (exclusive) of the run of word characters starting at `start`.
fn word_end(code: &str, start: usize) -> usize {
    code.get(start..)
        .and_then(|rest| rest.find(|c: char| !is_word_char(c)))
        .map(|len| start + len)
        .unwrap_or(code.len())
}

/// End of a quoted string opened at `start`, honoring backslash escapes.
/// `None` if the quote is never closed on this segment.
fn string_end(code: &str, start: usize, quote: char) -> Option<usize> {
    let rest = code.get(start + quote.len_utf8()..)?;
    let mut chars = rest.char_indices();

    while let Some((idx, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return Some(start + quote.len_utf8() + idx + c.len_utf8());
        }
    }
    None
}

/// Digits with an optional `.digits` fraction, followed by a non-word char.
fn number_end(code: &str, start: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    let digits_from = |from: usize| {
        bytes
            .get(from..)
            .map(|tail| tail.iter().take_while(|b| b.is_ascii_digit()).count())
            .unwrap_or(0)
    };

    let mut end = start + digits_from(start);
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(|b| b.is_ascii_digit()) {
        end += 1 + digits_from(end + 1);
    }

    let followed_by_word = code
        .get(end..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(is_word_char);
    if followed_by_word {
        None
    } else {
        Some(end)
    }
}
