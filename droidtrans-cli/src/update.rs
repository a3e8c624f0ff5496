use std::path::Path;

use droidtrans::{ReadOptions, WriteOptions, codec::write_directory, merge_translations};
use droidtrans_cli::{LanguagePair, MergeSummary, print_merge_summary};

/// Re-merges the target directory against the current source: stale translations lose their
/// final status and translations without a source are dropped.
pub fn run_update_command(
    res_dir: &Path,
    source_language: &str,
    target_language: &str,
    read_options: &ReadOptions,
    dry_run: bool,
    json_output: bool,
) -> Result<(), String> {
    let pair = LanguagePair::load(res_dir, source_language, target_language, read_options)?;

    let outcome = merge_translations(&pair.source, &pair.target, None);
    let written = if dry_run {
        None
    } else {
        Some(
            write_directory(&pair.directories.target, &outcome.merged, &WriteOptions::default())
                .map_err(|e| format!("Could not recreate the target directory: {}", e))?,
        )
    };

    let summary = MergeSummary {
        source: pair.source_summary(),
        target: pair.target_summary(),
        translatable_sources: outcome.report.translatable_sources(pair.source.len()),
        report: outcome.report,
        written,
        dry_run,
    };
    print_merge_summary(&summary, json_output)
}
