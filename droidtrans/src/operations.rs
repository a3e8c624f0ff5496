//! Three-way reconciliation of source resources, on-disk translations and external edits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ResourceRecord, ResourceSet};

/// Counters collected while merging one language pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeReport {
    /// Source resources marked `translatable="false"`.
    pub untranslatable_sources: usize,
    /// Translatable source resources without anything to translate.
    pub empty_sources: usize,
    /// On-disk translations still approved against the current source.
    pub final_targets: usize,
    /// On-disk translations that exist but are not (or no longer) approved.
    pub non_final_targets: usize,
    /// Translatable sources with no on-disk translation of the same kind.
    pub missing_targets: usize,
    /// On-disk translations with no source of the same name and kind.
    pub extra_targets: usize,
}

impl MergeReport {
    /// Source resources that need a translation.
    pub fn translatable_sources(&self, total_sources: usize) -> usize {
        total_sources.saturating_sub(self.untranslatable_sources + self.empty_sources)
    }
}

/// Result of [`merge_translations`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: ResourceSet,
    pub report: MergeReport,
}

/// Merges the on-disk translations in `target` with optional `external` edits.
///
/// For every translatable source resource that needs translating, candidates of the same
/// kind are taken from `target` and `external`, moved to the source's file and flags, and
/// stripped of a snapshot that no longer matches the source. When both candidates exist
/// the final one wins; if both are final or both are not, the external edit wins. Resources
/// without a candidate, or without a source, are left out of the merged collection.
pub fn merge_translations(
    source: &ResourceSet,
    target: &ResourceSet,
    external: Option<&ResourceSet>,
) -> MergeOutcome {
    let mut merged = ResourceSet::empty_like(target);
    let mut report = MergeReport::default();

    for source_record in source {
        if !source_record.is_translatable {
            report.untranslatable_sources += 1;
            continue;
        }
        if !source_record.requires_translation() {
            report.empty_sources += 1;
            continue;
        }

        let from_disk = candidate(source_record, target);
        let from_edits = external.and_then(|edits| candidate(source_record, edits));

        match &from_disk {
            Some(t) if t.is_final() => report.final_targets += 1,
            Some(_) => report.non_final_targets += 1,
            None => report.missing_targets += 1,
        }

        let winner = match (from_disk, from_edits) {
            (None, None) => None,
            (Some(t), None) | (None, Some(t)) => Some(t),
            (Some(disk), Some(edit)) => {
                if disk.is_final() == edit.is_final() || edit.is_final() {
                    Some(edit)
                } else {
                    Some(disk)
                }
            }
        };

        if let Some(winner) = winner {
            merged.upsert(winner);
        }
    }

    for target_record in target {
        let has_source = source
            .get(target_record.name())
            .is_some_and(|s| s.kind() == target_record.kind());
        if !has_source {
            debug!(name = target_record.name(), "dropping translation without source");
            report.extra_targets += 1;
        }
    }

    MergeOutcome { merged, report }
}

/// The translation of `source_record` in `set`, aligned to the source's metadata.
///
/// A record of another kind does not count as a translation.
fn candidate(source_record: &ResourceRecord, set: &ResourceSet) -> Option<ResourceRecord> {
    let found = set
        .get(source_record.name())
        .filter(|t| t.kind() == source_record.kind())?;

    let mut record = found.clone();
    record.origin_file = source_record.origin_file.clone();
    record.is_translatable = true;
    record.has_format_specifiers = source_record.has_format_specifiers;
    record.leading_comments.clear();
    if record.is_final_for_text(source_record) {
        record.set_source_snapshot(Some(source_record.clone()));
    } else {
        record.clear_source_snapshot();
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, ResourceKind};

    fn record(name: &str, content: Content) -> ResourceRecord {
        ResourceRecord::new(name, content).unwrap()
    }

    fn set(language: &str, is_source: bool, records: Vec<ResourceRecord>) -> ResourceSet {
        let mut set = ResourceSet::new(language, is_source).unwrap();
        for r in records {
            set.insert(r).unwrap();
        }
        set
    }

    #[test]
    fn test_merge_counts_and_skips_sources() {
        let greeting = record("greeting", Content::scalar("Hello"));
        let source = set(
            "en",
            true,
            vec![
                greeting.clone(),
                record("internal_id", Content::scalar("@string/other")),
                record("build", Content::scalar("x")).with_translatable(false),
                record("bye", Content::scalar("Bye")),
            ],
        );
        let target = set(
            "de",
            false,
            vec![
                record("greeting", Content::scalar("Hallo")).with_source_snapshot(greeting),
                record("build", Content::scalar("y")),
            ],
        );

        let outcome = merge_translations(&source, &target, None);
        assert_eq!(
            outcome.report,
            MergeReport {
                untranslatable_sources: 1,
                empty_sources: 1,
                final_targets: 1,
                non_final_targets: 0,
                missing_targets: 1,
                extra_targets: 0,
            }
        );
        assert_eq!(outcome.report.translatable_sources(source.len()), 2);
        assert_eq!(outcome.merged.len(), 1);
        assert!(outcome.merged.get("greeting").unwrap().is_final());
        assert!(!outcome.merged.contains("build"));
        assert_eq!(outcome.merged.language(), "de");
    }

    #[test]
    fn test_drifted_source_revokes_final() {
        let old = record("greeting", Content::scalar("Hello"));
        let source = set("en", true, vec![record("greeting", Content::scalar("Hello!"))]);
        let target = set(
            "de",
            false,
            vec![record("greeting", Content::scalar("Hallo")).with_source_snapshot(old)],
        );

        let outcome = merge_translations(&source, &target, None);
        assert_eq!(outcome.report.final_targets, 0);
        assert_eq!(outcome.report.non_final_targets, 1);
        let merged = outcome.merged.get("greeting").unwrap();
        assert_eq!(merged.content(), &Content::scalar("Hallo"));
        assert!(!merged.is_final());
    }

    #[test]
    fn test_candidate_takes_source_metadata() {
        let source = set(
            "en",
            true,
            vec![
                record("pct", Content::scalar("100%"))
                    .with_format_specifiers(false)
                    .with_origin_file("misc.xml"),
            ],
        );
        let mut on_disk = record("pct", Content::scalar("100 %")).with_translatable(false);
        on_disk.leading_comments.push("stray".to_string());
        let target = set("fr", false, vec![on_disk]);

        let outcome = merge_translations(&source, &target, None);
        let merged = outcome.merged.get("pct").unwrap();
        assert_eq!(merged.origin_file, "misc.xml");
        assert!(merged.is_translatable);
        assert!(!merged.has_format_specifiers);
        assert!(merged.leading_comments.is_empty());
    }

    #[test]
    fn test_kind_change_orphans_translation() {
        let source = set("en", true, vec![record("days", Content::list(["Mon"]))]);
        let target = set(
            "de",
            false,
            vec![
                record("days", Content::scalar("Mo")),
                record("gone", Content::scalar("Weg")),
            ],
        );

        let outcome = merge_translations(&source, &target, None);
        assert_eq!(outcome.report.missing_targets, 1);
        assert_eq!(outcome.report.extra_targets, 2);
        assert!(outcome.merged.is_empty());
    }

    #[test]
    fn test_final_candidate_wins_disagreement() {
        let greeting = record("greeting", Content::scalar("Hello"));
        let source = set("en", true, vec![greeting.clone()]);
        let final_disk = set(
            "de",
            false,
            vec![record("greeting", Content::scalar("Hallo")).with_source_snapshot(greeting.clone())],
        );
        let loose_edit = set("de", false, vec![record("greeting", Content::scalar("Hi"))]);

        let merged = merge_translations(&source, &final_disk, Some(&loose_edit)).merged;
        assert_eq!(merged.get("greeting").unwrap().content(), &Content::scalar("Hallo"));

        let loose_disk = set("de", false, vec![record("greeting", Content::scalar("Hi"))]);
        let final_edit = set(
            "de",
            false,
            vec![record("greeting", Content::scalar("Servus")).with_source_snapshot(greeting)],
        );
        let merged = merge_translations(&source, &loose_disk, Some(&final_edit)).merged;
        let winner = merged.get("greeting").unwrap();
        assert_eq!(winner.content(), &Content::scalar("Servus"));
        assert!(winner.is_final());
    }

    #[test]
    fn test_external_edit_wins_when_status_agrees() {
        let source = set("en", true, vec![record("greeting", Content::scalar("Hello"))]);
        let disk = set("de", false, vec![record("greeting", Content::scalar("Hallo"))]);
        let edits = set("de", false, vec![record("greeting", Content::scalar("Guten Tag"))]);

        let outcome = merge_translations(&source, &disk, Some(&edits));
        assert_eq!(
            outcome.merged.get("greeting").unwrap().content(),
            &Content::scalar("Guten Tag")
        );
        // statistics describe the on-disk state only
        assert_eq!(outcome.report.non_final_targets, 1);
    }

    #[test]
    fn test_external_edit_fills_missing_translation() {
        let source = set("en", true, vec![record("files", Content::list(["a", "b"]))]);
        let disk = set("de", false, vec![]);
        let edits = set("de", false, vec![record("files", Content::list(["A", "B"]))]);

        let outcome = merge_translations(&source, &disk, Some(&edits));
        assert_eq!(outcome.report.missing_targets, 1);
        assert_eq!(outcome.merged.get("files").unwrap().kind(), ResourceKind::List);
    }

    #[test]
    fn test_snapshot_with_missing_value_stays_final_for_empty_source_item() {
        let source_days = record(
            "days",
            Content::List(vec![Some("Mon".into()), Some(String::new())]),
        );
        let source = set("en", true, vec![source_days.clone()]);
        let edits = set(
            "de",
            false,
            vec![record("days", Content::List(vec![Some("Mo".into()), None]))
                .with_source_snapshot(record("days", Content::List(vec![Some("Mon".into()), None])))],
        );

        let outcome = merge_translations(&source, &set("de", false, vec![]), Some(&edits));
        let days = outcome.merged.get("days").unwrap();
        assert!(days.is_final());
        assert_eq!(days.source_snapshot(), Some(&source_days));
        assert_eq!(outcome.report.missing_targets, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let greeting = record("greeting", Content::scalar("Hello"));
        let source = set(
            "en",
            true,
            vec![greeting.clone(), record("days", Content::list(["Mon", "Tue"]))],
        );
        let target = set(
            "de",
            false,
            vec![
                record("greeting", Content::scalar("Hallo")).with_source_snapshot(greeting),
                record("days", Content::list(["Mo", "Di"])),
                record("orphan", Content::scalar("x")),
            ],
        );

        let first = merge_translations(&source, &target, Some(&target));
        let second = merge_translations(&source, &first.merged, Some(&first.merged));
        let names: Vec<&str> = second.merged.iter().map(ResourceRecord::name).collect();
        assert_eq!(names, ["greeting", "days"]);
        for r in &first.merged {
            let again = second.merged.get(r.name()).unwrap();
            assert_eq!(again, r);
            assert_eq!(again.is_final(), r.is_final());
        }
        assert_eq!(second.report.extra_targets, 0);
        assert_eq!(second.report.final_targets, first.report.final_targets);
    }
}
