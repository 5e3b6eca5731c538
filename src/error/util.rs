//! Utility functions for error handling
//!
//! Opening files and scanning directories with the path attached to every failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(Error::invalid_path(
            path,
            format!("file not found (needed for {purpose})"),
        ));
    }

    if !path.is_file() {
        return Err(Error::invalid_path(
            path,
            format!("path is not a file (expected a file for {purpose})"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "permission denied - check file permissions".to_string()
            }
            _ => format!("failed to open file for {purpose}"),
        };
        Error::io(path, context, e)
    })
}

/// Safely create (or truncate) a file for writing
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(Error::invalid_path(
                parent,
                format!("output directory does not exist (needed for {purpose})"),
            ));
        }
    }

    fs::File::create(path).map_err(|e| Error::io(path, format!("failed to create file for {purpose}"), e))
}

/// Check that a directory exists and is readable
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::invalid_path(
            path,
            format!("directory not found (needed for {purpose})"),
        ));
    }

    if !path.is_dir() {
        return Err(Error::invalid_path(
            path,
            format!("path is not a directory (expected a directory for {purpose})"),
        ));
    }

    fs::read_dir(path)
        .map(|_| ())
        .map_err(|e| Error::io(path, format!("failed to access directory for {purpose}"), e))
}

/// List the files directly inside `dir` whose extension is one of `extensions`,
/// sorted by path
pub fn list_files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    validate_directory(dir, "scanning for input files")?;

    let entries =
        fs::read_dir(dir).map_err(|e| Error::io(dir, "failed to read directory", e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, "failed to read directory entry", e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
