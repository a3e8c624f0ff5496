use std::path::Path;

use unic_langid::LanguageIdentifier;

/// Validate file path exists and is a file
pub fn validate_file_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            // Try to create the directory
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }

    Ok(())
}

/// Parse a two-letter language code ("en", "hi", ...), normalized to lowercase.
///
/// Used as a clap value parser for the language arguments.
pub fn parse_language_code(lang: &str) -> Result<String, String> {
    if lang.is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    match lang.parse::<LanguageIdentifier>() {
        Ok(lang_id) if lang.len() == 2 && lang_id.language.as_str().len() == 2 => {
            Ok(lang_id.language.as_str().to_string())
        }
        _ => Err(format!(
            "Invalid language code: {}. A two-letter language code ('en' or 'hi', for example) is required",
            lang
        )),
    }
}
