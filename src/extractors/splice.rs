// src/extractors/splice.rs
use crate::extractors::comments::{comment_at, comment_spans, strip_comments};
use crate::extractors::entries::{diff_entries, entries_in, extract_named_entries, Entry, KeyPattern};
use crate::extractors::region::{Anchor, Delimiters, SectionExtractor, Span};
use crate::utils::error::ExtractError;
use std::collections::HashSet;

const ENTRY_INDENT: &str = "  ";

/// Result of copying missing entries from one region into another.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The full target document after insertion.
    pub text: String,
    /// Names of the inserted entries, in insertion order.
    pub added: Vec<String>,
    /// Top-level entries in the target region before insertion.
    pub target_before: usize,
    /// Top-level entries in the source region.
    pub source_total: usize,
}

/// Appends `entries` to the region at `region` just before its closing delimiter.
///
/// Trailing whitespace before the closer is dropped, a `,` is added unless the
/// region is empty or already ends with one, and each entry gets two extra
/// spaces of indentation on its non-blank lines. Trailing `//` comments on the
/// last entry stay after the added comma.
pub fn insert_entries<S: AsRef<str>>(
    text: &str,
    region: Span,
    delimiters: Delimiters,
    entries: &[S],
) -> Result<String, ExtractError> {
    if entries.is_empty() {
        return Ok(text.to_string());
    }

    let close_at = region
        .slice(text)
        .rfind(delimiters.close())
        .map(|idx| region.start + idx)
        .ok_or(ExtractError::UnbalancedRegion { start: region.start })?;

    let before = text[..close_at].trim_end();
    let (code, trailing_comments) = before.split_at(code_end(before));

    let formatted: Vec<String> = entries.iter().map(|e| indent(e.as_ref())).collect();

    let mut out = String::with_capacity(text.len() + formatted.iter().map(String::len).sum::<usize>() + 8);
    out.push_str(code);
    if !code.ends_with(delimiters.open()) && !code.ends_with(',') {
        out.push(',');
    }
    out.push_str(trailing_comments);
    out.push('\n');
    out.push_str(&formatted.join(",\n"));
    out.push('\n');
    out.push_str(&text[close_at..]);
    Ok(out)
}

/// End of `text` once trailing `//` comments (and the whitespace before them)
/// are set aside.
fn code_end(text: &str) -> usize {
    let mut end = text.len();
    for comment in comment_spans(text).iter().rev() {
        if comment.end != end || !comment.slice(text).starts_with("//") {
            break;
        }
        end = text[..comment.start].trim_end().len();
    }
    end
}

fn indent(entry: &str) -> String {
    entry
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", ENTRY_INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Copies every top-level entry of the source region whose name is missing
/// from the target region into the target region.
///
/// Both regions are located with `[`/`]` and an optional `;` terminator.
/// Anchors and entries inside comments are skipped, and names are read with
/// comments stripped, so commented-out entries neither count as present nor
/// get copied. Entries without a name are never copied.
pub fn merge_missing_entries(
    extractor: &SectionExtractor,
    source_text: &str,
    source_anchor: &Anchor,
    target_text: &str,
    target_anchor: &Anchor,
    key: &KeyPattern,
) -> Result<MergeOutcome, ExtractError> {
    let source_comments = comment_spans(source_text);
    let source_span = find_live_region(extractor, source_text, source_anchor, &source_comments)?;
    let target_span = find_live_region(extractor, target_text, target_anchor, &comment_spans(target_text))?;

    let source_region = source_span.slice(source_text);
    let source_entries: Vec<Entry> = entries_in(source_region, key)
        .into_iter()
        .filter(|e| comment_at(&source_comments, source_span.start + e.span.start).is_none())
        .map(|e| Entry { name: live_name(e.text(source_region), key), ..e })
        .collect();
    let target_region = strip_comments(target_span.slice(target_text));
    let target_entries = entries_in(&target_region, key);

    let source_names: Vec<&str> = source_entries.iter().filter_map(|e| e.name.as_deref()).collect();
    let target_names: Vec<&str> = target_entries.iter().filter_map(|e| e.name.as_deref()).collect();
    let missing: HashSet<&str> = diff_entries(&source_names, &target_names).into_iter().collect();

    let to_add: Vec<&Entry> = source_entries
        .iter()
        .filter(|e| e.name.as_deref().is_some_and(|n| missing.contains(n)))
        .collect();
    tracing::debug!(
        "{} of {} source entries missing from target region",
        to_add.len(),
        source_entries.len()
    );

    let texts: Vec<&str> = to_add.iter().map(|e| e.text(source_region)).collect();
    let text = insert_entries(target_text, target_span, Delimiters::SQUARE, &texts)?;

    Ok(MergeOutcome {
        text,
        added: to_add.iter().filter_map(|e| e.name.clone()).collect(),
        target_before: target_entries.len(),
        source_total: source_entries.len(),
    })
}

/// First region for `anchor` whose anchor match is not inside a comment.
fn find_live_region(
    extractor: &SectionExtractor,
    text: &str,
    anchor: &Anchor,
    comments: &[Span],
) -> Result<Span, ExtractError> {
    let mut from = 0;
    loop {
        let (start, _) = anchor
            .find_at(text, from)
            .ok_or_else(|| ExtractError::NotFound(anchor.to_string()))?;
        match comment_at(comments, start) {
            Some(comment) => {
                tracing::trace!("Skipping commented-out {} at {}", anchor, start);
                from = comment.end;
            }
            None => return extractor.find_balanced_region(text, anchor, Delimiters::SQUARE, start, Some(';')),
        }
    }
}

fn live_name(entry_text: &str, key: &KeyPattern) -> Option<String> {
    let stripped = strip_comments(entry_text);
    let name = extract_named_entries(&stripped, key).next().map(str::to_string);
    name
}
