//! CLI library for testing purposes

pub mod report;
pub mod validation;
pub mod workspace;

pub use report::{LanguageSummary, MergeSummary, print_merge_summary};
pub use workspace::LanguagePair;
