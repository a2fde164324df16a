// src/extractors/region.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// --- Constants ---
/// How many characters after a closing delimiter are searched for a terminator.
pub const DEFAULT_TERMINATOR_LOOKAHEAD: usize = 10;

// --- Data Structures ---

/// Byte range `[start, end)` into an immutable text buffer.
///
/// Spans returned by [`SectionExtractor::find_balanced_region`] always start at
/// the anchor match and end one past the delimiter that brought the depth back
/// to zero (or one past the terminator, when one was requested and found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrows the spanned text. Panics if the span does not belong to `text`.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    /// Shifts a span computed over a sub-slice back into the parent's coordinates.
    pub const fn offset_by(self, base: usize) -> Self {
        Self::new(self.start + base, self.end + base)
    }
}

/// A pair of distinct delimiter characters to balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    open: char,
    close: char,
}

impl Delimiters {
    pub const SQUARE: Self = Self { open: '[', close: ']' };
    pub const CURLY: Self = Self { open: '{', close: '}' };

    pub fn new(open: char, close: char) -> Result<Self, ExtractError> {
        if open == close {
            return Err(ExtractError::InvalidDelimiters(open));
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> char {
        self.open
    }

    pub fn close(&self) -> char {
        self.close
    }
}

/// Where a region starts.
///
/// * `Literal` - exact substring.
/// * `Pattern` - a regex; also what [`Anchor::wildcard`] compiles to.
#[derive(Debug, Clone)]
pub enum Anchor {
    Literal(String),
    Pattern(Regex),
}

impl Anchor {
    pub fn literal(text: impl Into<String>) -> Self {
        Anchor::Literal(text.into())
    }

    /// Simple wildcard: `*` matches any run of non-newline characters (as few
    /// as possible), `?` matches exactly one. Everything else is literal.
    pub fn wildcard(pattern: &str) -> Result<Self, ExtractError> {
        let mut translated = String::with_capacity(pattern.len() * 2);
        for c in pattern.chars() {
            match c {
                '*' => translated.push_str(r"[^\n]*?"),
                '?' => translated.push_str(r"[^\n]"),
                other => translated.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
            }
        }
        Self::regex(&translated)
    }

    pub fn regex(pattern: &str) -> Result<Self, ExtractError> {
        Regex::new(pattern)
            .map(Anchor::Pattern)
            .map_err(|e| ExtractError::InvalidPattern(format!("'{}': {}", pattern, e)))
    }

    /// First match at or after `from`, as `(start, end)` byte offsets.
    /// `from` must be a char boundary within `text`.
    pub fn find_at(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        match self {
            Anchor::Literal(needle) => text[from..]
                .find(needle.as_str())
                .map(|idx| (from + idx, from + idx + needle.len())),
            Anchor::Pattern(re) => re.find_at(text, from).map(|m| (m.start(), m.end())),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Literal(needle) => write!(f, "{:?}", needle),
            Anchor::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Command-line form: `re:<regex>`, `glob:<wildcard>`, anything else is literal.
impl FromStr for Anchor {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(pattern) = s.strip_prefix("re:") {
            Anchor::regex(pattern)
        } else if let Some(pattern) = s.strip_prefix("glob:") {
            Anchor::wildcard(pattern)
        } else {
            Ok(Anchor::literal(s))
        }
    }
}

/// Outcome of feeding one character to a [`DepthScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Closed,
    /// A closer arrived with nothing open; the region can never balance.
    Stray,
}

/// Running depth over a character stream.
struct DepthScanner {
    delimiters: Delimiters,
    depth: usize,
}

impl DepthScanner {
    /// Seeds the depth from the anchor text itself, so an anchor such as
    /// `const A: T[] = [` starts the scan at depth 1 instead of closing on `T[]`.
    /// Returns `None` when the anchor closes more than it opens at any point.
    fn seeded(delimiters: Delimiters, anchor_text: &str) -> Option<Self> {
        let mut depth = 0usize;
        for ch in anchor_text.chars() {
            if ch == delimiters.open {
                depth += 1;
            } else if ch == delimiters.close {
                depth = depth.checked_sub(1)?;
            }
        }
        Some(Self { delimiters, depth })
    }

    fn feed(&mut self, c: char) -> Step {
        if c == self.delimiters.open {
            self.depth += 1;
            Step::Continue
        } else if c == self.delimiters.close {
            match self.depth.checked_sub(1) {
                None => Step::Stray,
                Some(0) => {
                    self.depth = 0;
                    Step::Closed
                }
                Some(d) => {
                    self.depth = d;
                    Step::Continue
                }
            }
        } else {
            Step::Continue
        }
    }
}

// --- Main Extractor Structure ---

/// Locates bracket-balanced regions that begin at an anchor.
///
/// The scan counts delimiter characters literally. It knows nothing about
/// string literals or comments: a `]` inside `'a]b'` closes the region just
/// like a real one would. Callers that need tolerance for that must strip or
/// tokenize first.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    terminator_lookahead: usize,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionExtractor {
    pub fn new() -> Self {
        Self { terminator_lookahead: DEFAULT_TERMINATOR_LOOKAHEAD }
    }

    pub fn with_terminator_lookahead(mut self, chars: usize) -> Self {
        self.terminator_lookahead = chars;
        self
    }

    /// Finds the region opened by the first `anchor` match at or after `from`.
    ///
    /// When `terminator` is set and appears after the closing delimiter,
    /// separated only by whitespace and within the lookahead window, the span
    /// is extended past it.
    pub fn find_balanced_region(
        &self,
        text: &str,
        anchor: &Anchor,
        delimiters: Delimiters,
        from: usize,
        terminator: Option<char>,
    ) -> Result<Span, ExtractError> {
        if from > text.len() || !text.is_char_boundary(from) {
            return Err(ExtractError::InvalidOffset(from));
        }

        let (start, anchor_end) = anchor
            .find_at(text, from)
            .ok_or_else(|| ExtractError::NotFound(anchor.to_string()))?;

        let unbalanced = ExtractError::UnbalancedRegion { start };
        let mut scanner = DepthScanner::seeded(delimiters, &text[start..anchor_end]).ok_or(unbalanced.clone())?;
        let (offset, c, step) = text[anchor_end..]
            .char_indices()
            .map(|(offset, c)| (offset, c, scanner.feed(c)))
            .find(|&(_, _, step)| step != Step::Continue)
            .ok_or(unbalanced.clone())?;
        if step == Step::Stray {
            tracing::trace!("Unmatched {:?} at {} after {}", c, anchor_end + offset, anchor);
            return Err(unbalanced);
        }
        let close_end = anchor_end + offset + c.len_utf8();

        let end = match terminator {
            Some(t) => self.include_terminator(text, close_end, t),
            None => close_end,
        };

        tracing::trace!("Region for {} spans {}..{}", anchor, start, end);
        Ok(Span::new(start, end))
    }

    /// Every region for `anchor`, scanning on from the end of the previous one.
    /// Anchors nested inside an earlier region are not reported separately.
    pub fn find_all_regions(
        &self,
        text: &str,
        anchor: &Anchor,
        delimiters: Delimiters,
        terminator: Option<char>,
    ) -> Result<Vec<Span>, ExtractError> {
        self.find_all_regions_from(text, anchor, delimiters, 0, terminator)
    }

    /// [`find_all_regions`](Self::find_all_regions) starting at byte offset `from`.
    pub fn find_all_regions_from(
        &self,
        text: &str,
        anchor: &Anchor,
        delimiters: Delimiters,
        from: usize,
        terminator: Option<char>,
    ) -> Result<Vec<Span>, ExtractError> {
        if from > text.len() || !text.is_char_boundary(from) {
            return Err(ExtractError::InvalidOffset(from));
        }

        let mut spans = Vec::new();
        let mut from = from;

        while from < text.len() {
            match self.find_balanced_region(text, anchor, delimiters, from, terminator) {
                Ok(span) => {
                    from = span.end;
                    spans.push(span);
                }
                Err(ExtractError::NotFound(_)) => break,
                Err(e) => return Err(e),
            }
        }

        tracing::debug!("Found {} region(s) for {}", spans.len(), anchor);
        Ok(spans)
    }

    fn include_terminator(&self, text: &str, close_end: usize, terminator: char) -> usize {
        for (offset, c) in text[close_end..].char_indices().take(self.terminator_lookahead) {
            if c == terminator {
                return close_end + offset + c.len_utf8();
            }
            if !c.is_whitespace() {
                break;
            }
        }
        close_end
    }
}

/// Convenience form of [`SectionExtractor::find_balanced_region`] with the
/// default lookahead window.
pub fn find_balanced_region(
    text: &str,
    anchor: &Anchor,
    open: char,
    close: char,
    from: usize,
    terminator: Option<char>,
) -> Result<Span, ExtractError> {
    let delimiters = Delimiters::new(open, close)?;
    SectionExtractor::new().find_balanced_region(text, anchor, delimiters, from, terminator)
}

/// Spans of each depth-zero `open ... close` group in `text`, relative to `text`.
/// A trailing group that never closes is dropped.
pub fn split_top_level(text: &str, delimiters: Delimiters) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut group_start = None;

    for (idx, c) in text.char_indices() {
        if c == delimiters.open {
            if depth == 0 {
                group_start = Some(idx);
            }
            depth += 1;
        } else if c == delimiters.close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(start) = group_start.take() {
                    spans.push(Span::new(start, idx + c.len_utf8()));
                }
            }
        }
    }

    spans
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn region<'t>(text: &'t str, anchor: &str, terminator: Option<char>) -> Result<&'t str, ExtractError> {
        find_balanced_region(text, &Anchor::literal(anchor), '[', ']', 0, terminator)
            .map(|span| span.slice(text))
    }

    #[test]
    fn test_nested_region_is_not_truncated() {
        let text = "HEAD[ a, [ b, c ], d ]TAIL";
        assert_eq!(region(text, "HEAD[", None).unwrap(), "HEAD[ a, [ b, c ], d ]");
    }

    #[test]
    fn test_terminator_is_included() {
        let text = "X[1,2];\nY";
        assert_eq!(region(text, "X[", Some(';')).unwrap(), "X[1,2];");
        assert_eq!(region(text, "X[", None).unwrap(), "X[1,2]");
    }

    #[test]
    fn test_terminator_after_whitespace_within_window() {
        let text = "X[1]  \n ;rest";
        assert_eq!(region(text, "X[", Some(';')).unwrap(), "X[1]  \n ;");
    }

    #[test]
    fn test_terminator_outside_window_or_after_text_is_ignored() {
        let far = format!("X[1]{};", " ".repeat(12));
        assert_eq!(region(&far, "X[", Some(';')).unwrap(), "X[1]");
        assert_eq!(region("X[1] a;", "X[", Some(';')).unwrap(), "X[1]");
    }

    #[test]
    fn test_custom_lookahead_window() {
        let text = format!("X[1]{};", " ".repeat(12));
        let span = SectionExtractor::new()
            .with_terminator_lookahead(20)
            .find_balanced_region(&text, &Anchor::literal("X["), Delimiters::SQUARE, 0, Some(';'))
            .unwrap();
        assert_eq!(span.end, text.len());
    }

    #[test]
    fn test_missing_anchor_is_not_found() {
        let result = find_balanced_region("abc", &Anchor::literal("ZZZ["), '[', ']', 0, None);
        assert!(matches!(result, Err(ExtractError::NotFound(_))), "got {:?}", result);
    }

    #[test]
    fn test_unclosed_region_is_unbalanced() {
        let result = find_balanced_region("HEAD[ a, b", &Anchor::literal("HEAD["), '[', ']', 0, None);
        assert_eq!(result, Err(ExtractError::UnbalancedRegion { start: 0 }));
    }

    #[test]
    fn test_delimiter_inside_quotes_closes_early() {
        // Literal-blind scan: the `]` inside the quoted text ends the region.
        let text = "H[ 'a]b' , x ]T";
        assert_eq!(region(text, "H[", None).unwrap(), "H[ 'a]");
    }

    #[test]
    fn test_same_arguments_give_same_span() {
        let text = "A[1] B[2, [3]] C[4]";
        let anchor = Anchor::literal("B[");
        let first = find_balanced_region(text, &anchor, '[', ']', 0, None).unwrap();
        let second = find_balanced_region(text, &anchor, '[', ']', 0, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.slice(text), "B[2, [3]]");
    }

    #[test]
    fn test_anchor_with_type_brackets() {
        let text = "const A: T[] = [ 1, [2] ];\nconst B: T[] = [];";
        assert_eq!(region(text, "const A: T[] = [", Some(';')).unwrap(), "const A: T[] = [ 1, [2] ];");
    }

    #[test]
    fn test_anchor_without_opener_scans_forward() {
        let text = "items = \n  [ 1, 2 ] ;";
        assert_eq!(region(text, "items =", Some(';')).unwrap(), "items = \n  [ 1, 2 ] ;");
    }

    #[test]
    fn test_from_offset_selects_later_occurrence() {
        let text = "R[1] R[2]";
        let span = find_balanced_region(text, &Anchor::literal("R["), '[', ']', 1, None).unwrap();
        assert_eq!(span, Span::new(5, 9));
    }

    #[test]
    fn test_invalid_arguments() {
        let anchor = Anchor::literal("[");
        assert_eq!(
            find_balanced_region("[]", &anchor, '|', '|', 0, None),
            Err(ExtractError::InvalidDelimiters('|'))
        );
        assert_eq!(
            find_balanced_region("[]", &anchor, '[', ']', 3, None),
            Err(ExtractError::InvalidOffset(3))
        );
        assert_eq!(
            find_balanced_region("é[]", &anchor, '[', ']', 1, None),
            Err(ExtractError::InvalidOffset(1))
        );
    }

    #[test]
    fn test_curly_regions() {
        let text = "let cfg = { a: { b: 1 }, c: 2 };";
        let span = find_balanced_region(text, &Anchor::literal("cfg ="), '{', '}', 0, Some(';')).unwrap();
        assert_eq!(span.slice(text), "cfg = { a: { b: 1 }, c: 2 };");
    }

    #[test]
    fn test_wildcard_and_regex_anchors() {
        let text = "// header\nconst HEALTH_SERVICES: ServiceDefinition[] = [ {a}, {b} ];\n";
        let glob = Anchor::wildcard("const *_SERVICES: ServiceDefinition[] = [").unwrap();
        let re: Anchor = r"re:const\s+\w+_SERVICES:\s*ServiceDefinition\[\]\s*=\s*\[".parse().unwrap();
        let extractor = SectionExtractor::new();

        for anchor in [glob, re] {
            let span = extractor
                .find_balanced_region(text, &anchor, Delimiters::SQUARE, 0, Some(';'))
                .unwrap();
            assert_eq!(span.slice(text), "const HEALTH_SERVICES: ServiceDefinition[] = [ {a}, {b} ];");
        }
    }

    #[test]
    fn test_invalid_regex_anchor() {
        assert!(matches!("re:(".parse::<Anchor>(), Err(ExtractError::InvalidPattern(_))));
        assert!(matches!("plain(".parse::<Anchor>(), Ok(Anchor::Literal(_))));
    }

    #[test]
    fn test_find_all_regions() {
        let text = "const A: T[] = [ {name:'x'}, {name:'y'} ];\nconst B: T[] = [ {name:'y'} ];";
        let anchor = Anchor::wildcard("const ?: T[] = [").unwrap();
        let spans = SectionExtractor::new()
            .find_all_regions(text, &anchor, Delimiters::SQUARE, Some(';'))
            .unwrap();
        let regions: Vec<&str> = spans.iter().map(|s| s.slice(text)).collect();
        assert_eq!(
            regions,
            vec!["const A: T[] = [ {name:'x'}, {name:'y'} ];", "const B: T[] = [ {name:'y'} ];"]
        );
    }

    #[test]
    fn test_find_all_regions_propagates_unbalanced() {
        let text = "R[1] R[2";
        let result = SectionExtractor::new().find_all_regions(text, &Anchor::literal("R["), Delimiters::SQUARE, None);
        assert_eq!(result, Err(ExtractError::UnbalancedRegion { start: 5 }));
    }

    #[test]
    fn test_split_top_level_ignores_nested_and_unclosed() {
        let text = "[ {a: {b: 1}}, {c: 2}, {d ";
        let groups: Vec<&str> = split_top_level(text, Delimiters::CURLY)
            .iter()
            .map(|s| s.slice(text))
            .collect();
        assert_eq!(groups, vec!["{a: {b: 1}}", "{c: 2}"]);
    }

    #[rstest]
    #[case("HEAD[ a, [ b, c ], d ]TAIL", "HEAD[")]
    #[case("x = [ [ ] [ ] ] ]", "x =")]
    #[case("const A: T[] = [ [], [[1]], 2 ];", "const A: T[] = [")]
    #[case("pre [ 'ü]' ] post", "pre")]
    fn test_region_is_balanced(#[case] text: &str, #[case] anchor: &str) {
        let span = find_balanced_region(text, &Anchor::literal(anchor), '[', ']', 0, None).unwrap();
        let region = span.slice(text);

        let opens = region.matches('[').count();
        let closes = region.matches(']').count();
        assert_eq!(opens, closes, "region {:?} is not balanced", region);

        let mut depth = 0i64;
        for c in region.chars() {
            match c {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0, "region {:?} went negative", region);
        }
        assert!(region.ends_with(']'));
    }

    #[rstest]
    #[case("items = ] [1, 2];", "items =")]
    #[case("A] [1]", "A]")]
    #[case("A[]] [1]", "A[]]")]
    #[case("x = [1] ] [2]", "x = [1]")]
    fn test_stray_closer_is_unbalanced(#[case] text: &str, #[case] anchor: &str) {
        let result = find_balanced_region(text, &Anchor::literal(anchor), '[', ']', 0, Some(';'));
        assert_eq!(result, Err(ExtractError::UnbalancedRegion { start: 0 }));
    }

    #[test]
    fn test_find_all_regions_from_offset() {
        let text = "R[1] R[2] R[3]";
        let extractor = SectionExtractor::new();
        let anchor = Anchor::literal("R[");

        let spans = extractor.find_all_regions_from(text, &anchor, Delimiters::SQUARE, 3, None).unwrap();
        assert_eq!(spans, vec![Span::new(5, 9), Span::new(10, 14)]);

        let result = extractor.find_all_regions_from(text, &anchor, Delimiters::SQUARE, 99, None);
        assert_eq!(result, Err(ExtractError::InvalidOffset(99)));
    }
}
