//! Input file collection.
//!
//! Explicitly named files must be a supported format; directories are
//! walked recursively, keeping only files the registry can handle and
//! skipping hidden entries.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use linkvet_core::ExtractorRegistry;

/// Resolves CLI path arguments into a sorted list of extractable files.
pub fn collect_files(paths: &[PathBuf], registry: &ExtractorRegistry) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot access '{}'", path.display()))?;
        if metadata.is_dir() {
            collect_dir(path, registry, &mut files);
        } else {
            let name = path.to_string_lossy().into_owned();
            if registry.get_by_filename(&name).is_none() {
                bail!(
                    "unsupported file type '{}' (supported: {})",
                    path.display(),
                    registry.supported_types().join(", ")
                );
            }
            files.push(name);
        }
    }
    files.sort_unstable();
    files.dedup();
    Ok(files)
}

fn collect_dir(root: &Path, registry: &ExtractorRegistry, files: &mut Vec<String>) {
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        // Keep the root itself; skip hidden files and directories below it.
        entry.depth() == 0 || !is_hidden(entry.file_name())
    });
    for entry in walker.filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.path().to_string_lossy().into_owned();
        if registry.get_by_filename(&name).is_some() {
            files.push(name);
        }
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
