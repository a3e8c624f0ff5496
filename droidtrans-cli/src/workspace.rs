//! Loading the source and target language directories of a `res/` tree.

use std::path::Path;

use droidtrans::{
    ReadOptions, ResourceSet,
    codec::{LanguageDirectories, ParseSummary, find_language_directories, read_directory},
};
use tracing::info;

use crate::report::LanguageSummary;

/// Parsed resources of one language pair.
#[derive(Debug)]
pub struct LanguagePair {
    pub directories: LanguageDirectories,
    pub source: ResourceSet,
    pub target: ResourceSet,
    pub source_parse: ParseSummary,
    pub target_parse: ParseSummary,
}

impl LanguagePair {
    /// Locates and parses both language directories below `res_dir`.
    pub fn load(
        res_dir: &Path,
        source_language: &str,
        target_language: &str,
        options: &ReadOptions,
    ) -> Result<Self, String> {
        let directories = find_language_directories(res_dir, source_language, target_language)
            .map_err(|e| e.to_string())?;

        let mut source = ResourceSet::new(source_language, true).map_err(|e| e.to_string())?;
        let source_parse = read_directory(&directories.source, &mut source, options)
            .map_err(|e| parse_error(&directories.source, e))?;
        info!(dir = %directories.source.display(), ?source_parse, "parsed source language directory");

        let mut target = ResourceSet::new(target_language, false).map_err(|e| e.to_string())?;
        let target_parse = read_directory(&directories.target, &mut target, options)
            .map_err(|e| parse_error(&directories.target, e))?;
        info!(dir = %directories.target.display(), ?target_parse, "parsed target language directory");

        Ok(Self {
            directories,
            source,
            target,
            source_parse,
            target_parse,
        })
    }

    pub fn source_summary(&self) -> LanguageSummary {
        LanguageSummary::new(&self.source, &self.directories.source, self.source_parse)
    }

    pub fn target_summary(&self) -> LanguageSummary {
        LanguageSummary::new(&self.target, &self.directories.target, self.target_parse)
    }
}

fn parse_error(dir: &Path, error: droidtrans::Error) -> String {
    match error {
        droidtrans::Error::DuplicateName(name) => format!(
            "{} has a string (name=\"{}\") that is defined more than once, aborting",
            dir.display(),
            name
        ),
        other => format!("Failed to parse {}: {}", dir.display(), other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_language_pair() {
        let temp_dir = TempDir::new().unwrap();
        let res = temp_dir.path();
        fs::create_dir_all(res.join("values")).unwrap();
        fs::create_dir_all(res.join("values-fr")).unwrap();
        fs::write(
            res.join("values").join("strings.xml"),
            r#"<resources><string name="a">A</string></resources>"#,
        )
        .unwrap();

        let pair = LanguagePair::load(res, "en", "fr", &ReadOptions::default()).unwrap();
        assert_eq!(pair.source.len(), 1);
        assert!(pair.target.is_empty());
        assert_eq!(pair.source_summary().resources, 1);
        assert_eq!(pair.target_parse.files, 0);
    }

    #[test]
    fn test_duplicate_names_abort_loading() {
        let temp_dir = TempDir::new().unwrap();
        let res = temp_dir.path();
        fs::create_dir_all(res.join("values")).unwrap();
        fs::create_dir_all(res.join("values-fr")).unwrap();
        let xml = r#"<resources><string name="a">A</string></resources>"#;
        fs::write(res.join("values").join("a.xml"), xml).unwrap();
        fs::write(res.join("values").join("b.xml"), xml).unwrap();

        let err = LanguagePair::load(res, "en", "fr", &ReadOptions::default()).unwrap_err();
        assert!(err.contains("name=\"a\""), "{err}");
    }
}
