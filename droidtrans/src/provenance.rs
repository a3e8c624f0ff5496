//! Embedding and recovering source snapshots.
//!
//! A finalized translation is written with a comment directly in front of it that holds the
//! source record it was approved against:
//!
//! ```xml
//! <!--**DO NOT EDIT**PHN0cmluZyBuYW1lPSJncmVldGluZyI+SGVsbG88L3N0cmluZz4=-->
//! <string name="greeting">Hallo</string>
//! ```
//!
//! The payload is [`ResourceRecord::serialize_self`]. Recovery never fails: anything that does
//! not decode is treated as "no snapshot".

use tracing::debug;

use crate::{error::Error, types::ResourceRecord};

pub const ANNOTATION_MARKER: &str = "**DO NOT EDIT**";

/// Comment text that records `snapshot` as the approved source.
pub fn annotation_for(snapshot: &ResourceRecord) -> Result<String, Error> {
    Ok(format!("{}{}", ANNOTATION_MARKER, snapshot.serialize_self()?))
}

pub fn is_annotation(comment: &str) -> bool {
    comment.trim().starts_with(ANNOTATION_MARKER)
}

/// Decodes the snapshot held by a comment, if it is a well-formed annotation.
pub fn snapshot_from_annotation(comment: &str) -> Option<ResourceRecord> {
    let encoded = comment.trim().strip_prefix(ANNOTATION_MARKER)?;
    match ResourceRecord::deserialize_self(encoded) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            debug!(error = %err, "ignoring undecodable source snapshot");
            None
        }
    }
}
