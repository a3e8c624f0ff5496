//! Reading and writing whole `values*` resource directories.
//!
//! An Android `res/` directory holds one `values` directory per language, for example
//! `values` (the default), `values-de`, `values-pt-rBR` or `values-b+sr+Latn`. Every `*.xml`
//! file in such a directory contributes to one [`ResourceSet`].

use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::Error,
    options::{ReadOptions, WriteOptions},
    types::ResourceSet,
};

/// Name of the directory holding the default resources.
pub const DEFAULT_VALUES_DIR: &str = "values";

lazy_static! {
    static ref VALUES_DIR_REGEX: Regex = Regex::new(
        r"^values(?:-mcc\d+(?:-mnc\d+)?)?-(?:(?P<lc>[a-z]{2})(?:-[A-Za-z]+)?|b\+(?P<lcb>[a-z]{2})(?:\+[A-Za-z0-9]+)?)(?:-[A-Za-z0-9-]+)?$"
    )
    .unwrap();
}

/// The two-letter language of a `values-*` directory name, if it names one.
///
/// ```rust
/// use droidtrans::codec::language_of_values_dir;
/// assert_eq!(language_of_values_dir("values-pt-rBR"), Some("pt"));
/// assert_eq!(language_of_values_dir("values-b+sr+Latn"), Some("sr"));
/// assert_eq!(language_of_values_dir("values-night"), None);
/// assert_eq!(language_of_values_dir("values"), None);
/// ```
pub fn language_of_values_dir(name: &str) -> Option<&str> {
    let captures = VALUES_DIR_REGEX.captures(name)?;
    captures
        .name("lc")
        .or_else(|| captures.name("lcb"))
        .map(|m| m.as_str())
}

/// The directories holding the source and target language resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDirectories {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Locates the `values*` directories of both languages below `res_dir`.
///
/// Language codes are compared case-insensitively. When no directory names the source
/// language, the plain `values` directory stands in for it.
pub fn find_language_directories(
    res_dir: &Path,
    source_language: &str,
    target_language: &str,
) -> Result<LanguageDirectories, Error> {
    if source_language.eq_ignore_ascii_case(target_language) {
        return Err(Error::InvalidLanguage(format!(
            "source and target language are both {}",
            source_language
        )));
    }

    let mut entries = fs::read_dir(res_dir)
        .map_err(|e| Error::MissingDirectory(format!("{}: {}", res_dir.display(), e)))?
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut source = None;
    let mut fallback = None;
    let mut target = None;
    for entry in entries {
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        match language_of_values_dir(name) {
            Some(lang) if lang.eq_ignore_ascii_case(source_language) => {
                source.get_or_insert(entry.path());
            }
            Some(lang) if lang.eq_ignore_ascii_case(target_language) => {
                target.get_or_insert(entry.path());
            }
            Some(_) => {}
            None if name.eq_ignore_ascii_case(DEFAULT_VALUES_DIR) => fallback = Some(entry.path()),
            None => {}
        }
    }

    let source = source.or(fallback).ok_or_else(|| {
        Error::MissingDirectory(format!(
            "values directory for source language {} not found in {}",
            source_language,
            res_dir.display()
        ))
    })?;
    let target = target.ok_or_else(|| {
        Error::MissingDirectory(format!(
            "values directory for target language {} not found in {}, please create it",
            target_language,
            res_dir.display()
        ))
    })?;
    debug!(source = %source.display(), target = %target.display(), "found language directories");
    Ok(LanguageDirectories { source, target })
}

/// Outcome of [`read_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseSummary {
    pub files: usize,
    pub records: usize,
    pub files_with_errors: usize,
}

/// Outcome of [`write_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteSummary {
    pub files_deleted: usize,
    pub files_written: usize,
    pub records_written: usize,
}

/// Parses every `*.xml` file in `dir` into `set`, in file name order.
///
/// A file that fails to parse is skipped as a whole and counted, unless `options.strict` is
/// set. A resource name defined twice, in one file or across files, always aborts.
pub fn read_directory(
    dir: &Path,
    set: &mut ResourceSet,
    options: &ReadOptions,
) -> Result<ParseSummary, Error> {
    let mut summary = ParseSummary::default();
    for path in xml_files(dir)? {
        summary.files += 1;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut staging = ResourceSet::empty_like(set);
        let parsed = read_decoded(&path).and_then(|xml| staging.parse_str(&file_name, &xml));
        match parsed {
            Ok(count) => {
                set.absorb(staging)?;
                summary.records += count;
            }
            Err(err) if options.strict || err.is_fatal_for_collection() => return Err(err),
            Err(err) => {
                warn!(file = %file_name, error = %err, "skipping resource file");
                summary.files_with_errors += 1;
            }
        }
    }
    Ok(summary)
}

/// Replaces the resource files in `dir` with the contents of `set`.
///
/// Every `*.xml` file is deleted first, then one file is written per origin file of the
/// records that need translation.
pub fn write_directory(
    dir: &Path,
    set: &ResourceSet,
    options: &WriteOptions,
) -> Result<WriteSummary, Error> {
    let mut summary = WriteSummary::default();
    for path in xml_files(dir)? {
        fs::remove_file(&path)?;
        summary.files_deleted += 1;
    }

    for file_name in set.output_file_names() {
        let mut writer = BufWriter::new(File::create(dir.join(file_name))?);
        summary.records_written += set.write_file(file_name, &mut writer, options)?;
        writer.flush()?;
        summary.files_written += 1;
    }
    debug!(dir = %dir.display(), ?summary, "recreated resource directory");
    Ok(summary)
}

/// `*.xml` files directly inside `dir`, sorted by name.
fn xml_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir.display().to_string()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads a file to UTF-8, honouring a byte order mark.
fn read_decoded(path: &Path) -> Result<String, Error> {
    let file = File::open(path)?;
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .build(file);
    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded)?;
    Ok(decoded)
}
