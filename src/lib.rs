// src/lib.rs
//! Balanced-delimiter region extraction for hand-written seed catalogs.
//!
//! The [`extractors`] module is the pure core: locate a bracket-balanced
//! region after an anchor, pull named values out of it, and compare name
//! sequences. The remaining modules drive it over files for the
//! `seed-sections` binary.
pub mod cli;
pub mod commands;
pub mod documents;
pub mod extractors;
pub mod storage;
pub mod utils;

pub use extractors::{diff_entries, extract_named_entries, find_balanced_region, Anchor, Span};
pub use utils::AppError;
