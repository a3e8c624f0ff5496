use std::path::{Path, PathBuf};

use droidtrans::{ReadOptions, Sheet};
use droidtrans_cli::{LanguagePair, validation::validate_output_path};

/// Default sheet name for a language pair.
pub fn default_output_path(source_language: &str, target_language: &str) -> PathBuf {
    PathBuf::from(format!("{}-to-{}.csv", source_language, target_language))
}

pub fn run_export_command(
    res_dir: &Path,
    source_language: &str,
    target_language: &str,
    output: Option<PathBuf>,
    read_options: &ReadOptions,
) -> Result<(), String> {
    let output = output.unwrap_or_else(|| default_output_path(source_language, target_language));
    validate_output_path(&output)?;

    let pair = LanguagePair::load(res_dir, source_language, target_language, read_options)?;
    let sheet = Sheet::export(&pair.source, &pair.target);

    let mut names: Vec<&str> = sheet.rows.iter().map(|r| r.name.as_str()).collect();
    names.dedup();

    sheet
        .write_to(&output)
        .map_err(|e| format!("Could not write {}: {}", output.display(), e))?;
    println!(
        "Exported {} rows for {} string resources to {}",
        sheet.rows.len(),
        names.len(),
        output.display()
    );
    Ok(())
}
