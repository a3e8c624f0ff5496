//! File formats droidtrans reads and writes.
//!
//! - [`android_strings`]: Android `res/values*/*.xml` resource files.
//! - [`sheet`]: the CSV sheet handed to translators.

pub mod android_strings;
pub mod sheet;

// Reexporting the formats for easier access
pub use sheet::{Sheet, SheetRow};
