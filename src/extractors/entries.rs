// src/extractors/entries.rs
use crate::extractors::region::{split_top_level, Delimiters, Span};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

static NAME_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"name:\s*['"]([^'"]+)['"]"#).expect("Failed to compile NAME_KEY_RE")
});

/// A regex whose first capture group is the value of interest.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    re: Regex,
}

impl KeyPattern {
    pub fn new(pattern: &str) -> Result<Self, ExtractError> {
        let re = Regex::new(pattern)
            .map_err(|e| ExtractError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
        if re.captures_len() < 2 {
            return Err(ExtractError::InvalidPattern(format!(
                "'{}' has no capture group for the value",
                pattern
            )));
        }
        Ok(Self { re })
    }

    /// `field: 'value'` or `field: "value"`.
    pub fn quoted_field(field: &str) -> Result<Self, ExtractError> {
        Self::new(&format!(r#"{}:\s*['"]([^'"]+)['"]"#, regex::escape(field)))
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }
}

impl Default for KeyPattern {
    fn default() -> Self {
        Self { re: NAME_KEY_RE.clone() }
    }
}

/// Accepts a bare identifier (treated as a quoted field) or `re:<regex>`.
impl FromStr for KeyPattern {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("re:") {
            Some(pattern) => KeyPattern::new(pattern),
            None => KeyPattern::quoted_field(s),
        }
    }
}

/// A top-level object literal inside a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: Option<String>,
    /// Relative to the text passed to [`entries_in`].
    pub span: Span,
}

impl Entry {
    pub fn text<'t>(&self, region_text: &'t str) -> &'t str {
        self.span.slice(region_text)
    }
}

/// Values captured by `key`, in order of appearance, duplicates included.
pub fn extract_named_entries<'t>(text: &'t str, key: &'t KeyPattern) -> impl Iterator<Item = &'t str> + 't {
    key.re
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Elements of `source` that never occur in `target`, in source order.
/// Membership only: one occurrence in `target` covers any number in `source`.
pub fn diff_entries<'s, S, T>(source: &'s [S], target: &[T]) -> Vec<&'s str>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let present: HashSet<&str> = target.iter().map(AsRef::as_ref).collect();
    source
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !present.contains(name))
        .collect()
}

/// Names that appear more than once, with their counts, in order of first appearance.
pub fn find_duplicates<S: AsRef<str>>(names: &[S]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for name in names.iter().map(AsRef::as_ref) {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|name| match counts[name] {
            n if n > 1 => Some((name.to_string(), n)),
            _ => None,
        })
        .collect()
}

/// Splits a region into its top-level `{ ... }` entries and names each one by
/// the first `key` match inside it. Nested objects with their own `name:`
/// fields do not become entries.
pub fn entries_in(region_text: &str, key: &KeyPattern) -> Vec<Entry> {
    split_top_level(region_text, Delimiters::CURLY)
        .into_iter()
        .map(|span| Entry {
            name: extract_named_entries(span.slice(region_text), key)
                .next()
                .map(str::to_string),
            span,
        })
        .collect()
}
