// src/extractors/comments.rs
use crate::extractors::region::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// Leftmost match wins, so a `//` inside a block comment stays part of the
// block and a `/*` after `//` is part of the line comment.
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").expect("Failed to compile COMMENT_RE")
});

/// Removes `/* ... */` and `// ...` comments.
///
/// Same blind spot as the region scanner: the patterns do not know about
/// string literals, so `'http://host'` loses everything after `//`.
/// Offsets into the result do not map back to the input; use
/// [`comment_spans`] when they must.
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    COMMENT_RE.replace_all(text, "")
}

/// Byte ranges of every comment in `text`, in order. A line comment's span
/// stops before the newline.
pub fn comment_spans(text: &str) -> Vec<Span> {
    COMMENT_RE.find_iter(text).map(|m| Span::new(m.start(), m.end())).collect()
}

/// The comment containing byte `offset`, if any.
pub fn comment_at(spans: &[Span], offset: usize) -> Option<Span> {
    let idx = spans.partition_point(|s| s.end <= offset);
    spans.get(idx).copied().filter(|s| s.start <= offset)
}
