#![forbid(unsafe_code)]
//! Translation round-trips for Android string resources.
//!
//! Reads `strings.xml` resources of a source and a target language, remembers which
//! translations a human approved against which source text, and reconciles translations
//! edited in a spreadsheet back into the resource files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use droidtrans::{
//!     ReadOptions, ResourceSet, WriteOptions, merge_translations,
//!     codec::{find_language_directories, read_directory, write_directory},
//! };
//!
//! let dirs = find_language_directories(Path::new("app/src/main/res"), "en", "de")?;
//! let mut source = ResourceSet::new("en", true)?;
//! read_directory(&dirs.source, &mut source, &ReadOptions::default())?;
//! let mut target = ResourceSet::new("de", false)?;
//! read_directory(&dirs.target, &mut target, &ReadOptions::default())?;
//!
//! let outcome = merge_translations(&source, &target, None);
//! println!("{} translations final", outcome.report.final_targets);
//! write_directory(&dirs.target, &outcome.merged, &WriteOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Final translations
//!
//! A translation is final when it carries a snapshot of the source resource it was approved
//! against. The snapshot is written into the target file as a `**DO NOT EDIT**` comment in
//! front of the translation, so final status survives a write/read cycle and is revoked
//! automatically once the source text changes.

pub mod codec;
pub mod error;
pub mod formats;
pub mod operations;
pub mod options;
pub mod provenance;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    formats::{Sheet, SheetRow},
    operations::{MergeOutcome, MergeReport, merge_translations},
    options::{ReadOptions, WriteOptions},
    types::{Content, Quantity, ResourceKind, ResourceRecord, ResourceSet},
};
