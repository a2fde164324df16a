// src/extractors/mod.rs
pub mod comments;
pub mod entries;
pub mod region;
pub mod splice;

// Re-export key extraction types for convenience
pub use comments::{comment_at, comment_spans, strip_comments};
pub use entries::{diff_entries, entries_in, extract_named_entries, find_duplicates, Entry, KeyPattern};
pub use region::{
    find_balanced_region,
    split_top_level,
    Anchor,
    Delimiters,
    SectionExtractor,
    Span,
    DEFAULT_TERMINATOR_LOOKAHEAD,
};
pub use splice::{insert_entries, merge_missing_entries, MergeOutcome};
