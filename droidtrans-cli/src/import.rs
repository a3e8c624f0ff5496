use std::path::Path;

use droidtrans::{ReadOptions, Sheet, WriteOptions, codec::write_directory, merge_translations};
use droidtrans_cli::{LanguagePair, MergeSummary, print_merge_summary, validation::validate_file_path};

pub fn run_import_command(
    res_dir: &Path,
    source_language: &str,
    target_language: &str,
    input: &Path,
    read_options: &ReadOptions,
    dry_run: bool,
    json_output: bool,
) -> Result<(), String> {
    validate_file_path(input)?;
    let pair = LanguagePair::load(res_dir, source_language, target_language, read_options)?;

    let edits = Sheet::read_from(input)
        .and_then(|sheet| sheet.to_resource_set(source_language, target_language))
        .map_err(|e| format!("The data in {} is not valid: {}", input.display(), e))?;

    let outcome = merge_translations(&pair.source, &pair.target, Some(&edits));
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
