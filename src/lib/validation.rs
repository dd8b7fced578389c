//! Input validation utilities
//!
//! Checks on parameters and paths that run before a sort touches any data, so that
//! configuration problems are reported up front with consistent messages.

use crate::errors::{Result, SortError};
use std::fmt::Display;
use std::fs::File;
use std::path::Path;

/// Validate that a file exists
///
/// # Errors
/// Returns an error if the path does not exist or is not a regular file
///
/// # Example
/// ```
/// use ivsort_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.bed", "Input file");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(invalid_path(path_ref, description, "File does not exist"));
    }
    if !path_ref.is_file() {
        return Err(invalid_path(path_ref, description, "Not a regular file"));
    }
    Ok(())
}

/// Validate that a file exists and can be opened for reading
///
/// # Errors
/// Returns an error if the file is missing or cannot be opened
pub fn validate_readable_file<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    validate_file_exists(path_ref, description)?;
    File::open(path_ref)
        .map(drop)
        .map_err(|e| invalid_path(path_ref, description, &format!("Cannot be read: {e}")))
}

/// Validate that a directory exists and is writable
///
/// Writability is checked by creating (and immediately removing) a scratch file.
///
/// # Errors
/// Returns an error if the path is missing, not a directory, or not writable
pub fn validate_writable_dir<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.is_dir() {
        return Err(invalid_path(path_ref, description, "Directory does not exist"));
    }
    tempfile::tempfile_in(path_ref).map(drop).map_err(|e| {
        invalid_path(path_ref, description, &format!("Directory is not writable: {e}"))
    })
}

/// Validate that a value is positive (> 0)
///
/// # Errors
/// Returns an error if the value is not positive
///
/// # Example
/// ```
/// use ivsort_lib::validation::validate_positive;
///
/// validate_positive(500, "max-memory").unwrap();
///
/// let result = validate_positive(0, "max-memory");
/// assert!(result.is_err());
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(SortError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be positive (> 0), got: {value}"),
        });
    }
    Ok(())
}

fn invalid_path(path: &Path, description: &str, reason: &str) -> SortError {
    SortError::InvalidPath {
        description: description.to_string(),
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
