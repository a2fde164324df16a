// src/documents/mod.rs
pub mod inventory;
pub mod loader;
pub mod models;

pub use inventory::{inventory, InventoryOptions};
pub use loader::{load_document, load_optional_document, SourceDocument};
