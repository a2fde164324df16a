// src/documents/models.rs
use crate::extractors::Span;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket for named entries without a match for the grouping key.
pub const GROUP_UNDEFINED: &str = "undefined";

/// One anchored region and the names of its top-level entries.
#[derive(Debug, Clone, Serialize)]
pub struct RegionInventory {
    /// First line of the region, e.g. `const HEALTH_SERVICES: ServiceDefinition[] = [`.
    pub label: String,
    pub span: Span,
    pub names: Vec<String>,
    /// Top-level entries with no key match.
    pub unnamed: usize,
    /// Named entries per value of the grouping key, when one was given.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, usize>,
}

impl RegionInventory {
    pub fn entry_count(&self) -> usize {
        self.names.len() + self.unnamed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentInventory {
    pub path: String,
    /// Spans refer to the comment-stripped text when this is set.
    pub comments_stripped: bool,
    pub regions: Vec<RegionInventory>,
    pub duplicates: Vec<DuplicateName>,
}

impl DocumentInventory {
    /// All entry names across regions, in document order.
    pub fn names(&self) -> Vec<&str> {
        self.regions
            .iter()
            .flat_map(|r| r.names.iter().map(String::as_str))
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.regions.iter().map(RegionInventory::entry_count).sum()
    }
}

#[derive(Debug, Serialize)]
pub struct CountReport {
    pub documents: Vec<DocumentInventory>,
    pub total_entries: usize,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub source: String,
    pub target: String,
    pub source_total: usize,
    pub target_total: usize,
    pub missing: Vec<String>,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractReport {
    pub document: String,
    pub anchor: String,
    pub span: Span,
    pub length: usize,
    pub output: String,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub source: String,
    pub target: String,
    pub output: Option<String>,
    pub dry_run: bool,
    pub source_total: usize,
    pub target_before: usize,
    pub target_after: usize,
    pub added: Vec<String>,
    pub generated_at: String,
}
