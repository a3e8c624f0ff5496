//! Human and JSON rendering of command results.

use std::path::Path;

use droidtrans::{
    MergeReport, ResourceSet,
    codec::{ParseSummary, WriteSummary},
};
use serde::Serialize;

/// What was read for one language.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageSummary {
    pub language: String,
    pub directory: String,
    pub resources: usize,
    pub parse: ParseSummary,
}

impl LanguageSummary {
    pub fn new(set: &ResourceSet, directory: &Path, parse: ParseSummary) -> Self {
        Self {
            language: set.language().to_string(),
            directory: directory.display().to_string(),
            resources: set.len(),
            parse,
        }
    }
}

/// Result of `import` and `update-target`.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub source: LanguageSummary,
    pub target: LanguageSummary,
    pub translatable_sources: usize,
    pub report: MergeReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<WriteSummary>,
    pub dry_run: bool,
}

pub fn print_merge_summary(summary: &MergeSummary, json_output: bool) -> Result<(), String> {
    if json_output {
        let body = serde_json::to_string_pretty(summary).map_err(|e| e.to_string())?;
        println!("{}", body);
        return Ok(());
    }

    for language in [&summary.source, &summary.target] {
        println!(
            "Parsed {} resource files in {} with {} string resources. {} files had errors.",
            language.parse.files,
            language.directory,
            language.parse.records,
            language.parse.files_with_errors
        );
    }

    let report = &summary.report;
    println!(
        "Source directory: {} strings = {} translatable + {} untranslatable + {} empty",
        summary.source.resources,
        summary.translatable_sources,
        report.untranslatable_sources,
        report.empty_sources
    );
    println!(
        "Target directory: {} translations final, {} not final, {} missing, {} extra",
        report.final_targets, report.non_final_targets, report.missing_targets, report.extra_targets
    );

    match &summary.written {
        Some(written) => println!(
            "Deleted {} resource files, created {} resource files with a total of {} string resources.",
            written.files_deleted, written.files_written, written.records_written
        ),
        None if summary.dry_run => println!("Dry run: target directory left unchanged."),
        None => {}
    }
    Ok(())
}
