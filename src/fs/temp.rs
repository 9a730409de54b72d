//! Temp file templates and exclusive creation of the staged file.
use std::fs::File;
use std::path::Path;

use tempfile::TempPath;

use crate::constants::{MIN_TEMPLATE_PLACEHOLDERS, TEMPLATE_PLACEHOLDER};
use crate::types::errors::{Result, WriteError};

/// A template split into its literal prefix and the number of random characters to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Template<'a> {
    pub prefix: &'a str,
    pub placeholders: usize,
}

/// Validate `template`: it must be a bare file name ending in at least
/// `MIN_TEMPLATE_PLACEHOLDERS` `X` characters.
///
/// # Errors
///
/// Returns `InvalidTemplate` otherwise.
pub fn parse_template(template: &str) -> Result<Template<'_>> {
    let invalid = |reason: String| WriteError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };
    if template.contains(std::path::is_separator) {
        return Err(invalid("must not contain a path separator".into()));
    }
    let prefix = template.trim_end_matches(TEMPLATE_PLACEHOLDER);
    let placeholders = template.len() - prefix.len();
    if placeholders < MIN_TEMPLATE_PLACEHOLDERS {
        return Err(invalid(format!(
            "needs at least {MIN_TEMPLATE_PLACEHOLDERS} trailing '{TEMPLATE_PLACEHOLDER}', \
             found {placeholders}"
        )));
    }
    Ok(Template {
        prefix,
        placeholders,
    })
}

/// Exclusively create a new file in `dir` named after `template`.
///
/// Returns the open handle and a [`TempPath`] that unlinks the file when dropped, so the
/// staged file cannot outlive its owner unless it is explicitly disarmed after the rename.
///
/// # Errors
///
/// `InvalidTemplate` for a malformed template, `StageFailed` if no file could be created.
pub fn create_staged(dir: &Path, template: &str) -> Result<(File, TempPath)> {
    let t = parse_template(template)?;
    let named = tempfile::Builder::new()
        .prefix(t.prefix)
        .suffix("")
        .rand_bytes(t.placeholders)
        .tempfile_in(dir)
        .map_err(|source| WriteError::StageFailed {
            dir: dir.to_path_buf(),
            source,
        })?;
    Ok(named.into_parts())
}
