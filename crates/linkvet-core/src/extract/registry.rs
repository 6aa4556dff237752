//! Extractor dispatch and parallel multi-file extraction.
//!
//! A registry maps normalized file extensions to extractors behind a
//! read-biased lock: registration happens once at startup from the
//! composition root, and extraction threads only ever read.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

use super::{Extractor, JsonExtractor, MarkdownExtractor, TomlExtractor, XmlExtractor, YamlExtractor};
use crate::types::Link;
use crate::{Error, Result};

/// Files at or below this count are extracted sequentially.
const SEQUENTIAL_THRESHOLD: usize = 2;

/// Extension-keyed extractor registry.
pub struct ExtractorRegistry {
    by_extension: RwLock<HashMap<String, Arc<dyn Extractor>>>,
}

impl ExtractorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_extension: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry with all built-in extractors registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(MarkdownExtractor));
        registry.register(Arc::new(JsonExtractor));
        registry.register(Arc::new(YamlExtractor));
        registry.register(Arc::new(TomlExtractor));
        registry.register(Arc::new(XmlExtractor));
        registry
    }

    /// Registers an extractor for each of its extensions.
    ///
    /// Later registrations replace earlier ones for the same extension.
    pub fn register(&self, extractor: Arc<dyn Extractor>) {
        let Ok(mut map) = self.by_extension.write() else {
            return;
        };
        for extension in extractor.extensions() {
            map.insert(normalize_extension(extension), Arc::clone(&extractor));
        }
    }

    /// Looks up an extractor by extension, with or without a leading dot.
    #[must_use]
    pub fn get_by_extension(&self, extension: &str) -> Option<Arc<dyn Extractor>> {
        let map = self.by_extension.read().ok()?;
        map.get(&normalize_extension(extension)).cloned()
    }

    /// Looks up an extractor for a file path by its extension.
    #[must_use]
    pub fn get_by_filename(&self, path: &str) -> Option<Arc<dyn Extractor>> {
        let extension = Path::new(path).extension()?.to_str()?;
        self.get_by_extension(extension)
    }

    /// True when an extractor is registered for `extension`.
    #[must_use]
    pub fn has(&self, extension: &str) -> bool {
        self.get_by_extension(extension).is_some()
    }

    /// Sorted, de-duplicated short names of all registered formats.
    #[must_use]
    pub fn supported_types(&self) -> Vec<&'static str> {
        let Ok(map) = self.by_extension.read() else {
            return Vec::new();
        };
        let mut names: Vec<&'static str> = map.values().map(|e| e.format()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// All extensions registered for the given format names.
    #[must_use]
    pub fn extensions_for_types(&self, formats: &[&str]) -> Vec<String> {
        let Ok(map) = self.by_extension.read() else {
            return Vec::new();
        };
        let mut extensions: Vec<String> = map
            .iter()
            .filter(|(_, extractor)| formats.contains(&extractor.format()))
            .map(|(extension, _)| extension.clone())
            .collect();
        extensions.sort_unstable();
        extensions
    }

    /// Extracts links from every file in `paths`.
    ///
    /// Small sets run sequentially; larger ones fan out over a worker pool
    /// of `min(cpu_count, N)` threads, each reading and extracting whole
    /// files. Order across files is not preserved; order within a file is.
    /// The first failing file aborts the whole extraction.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error, unsupported-extension error, or (in
    /// strict mode) parse error encountered.
    pub fn extract_files(&self, paths: &[String], strict: bool) -> Result<Vec<Link>> {
        if paths.len() <= SEQUENTIAL_THRESHOLD {
            let mut links = Vec::new();
            for path in paths {
                links.extend(self.extract_one(path, strict)?);
            }
            return Ok(links);
        }

        let workers = std::thread::available_parallelism()
            .map_or(1, std::num::NonZeroUsize::get)
            .min(paths.len());
        debug!(files = paths.len(), workers, "extracting in parallel");

        let next = AtomicUsize::new(0);
        let links = Mutex::new(Vec::new());
        let failure: Mutex<Option<Error>> = Mutex::new(None);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = paths.get(i) else { break };
                    if failure.lock().map_or(true, |f| f.is_some()) {
                        break;
                    }
                    match self.extract_one(path, strict) {
                        Ok(mut file_links) => {
                            if let Ok(mut all) = links.lock() {
                                all.append(&mut file_links);
                            }
                        }
                        Err(err) => {
                            if let Ok(mut slot) = failure.lock() {
                                slot.get_or_insert(err);
                            }
                            break;
                        }
                    }
                });
            }
        });

        if let Ok(mut slot) = failure.lock() {
            if let Some(err) = slot.take() {
                return Err(err);
            }
        }
        Ok(links.into_inner().unwrap_or_default())
    }

    fn extract_one(&self, path: &str, strict: bool) -> Result<Vec<Link>> {
        let extractor = self
            .get_by_filename(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.to_string()))?;
        let content = std::fs::read_to_string(path)?;
        extractor.extract(path, &content, strict)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Lowercases and dot-prefixes an extension.
fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_lookup_by_extension_variants() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.get_by_extension("md").is_some());
        assert!(registry.get_by_extension(".md").is_some());
        assert!(registry.get_by_extension("MD").is_some());
        assert!(registry.get_by_extension(".docx").is_none());
    }

    #[test]
    fn test_lookup_by_filename() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.get_by_filename("docs/readme.md").is_some());
        assert!(registry.get_by_filename("config.yml").is_some());
        assert!(registry.get_by_filename("binary.exe").is_none());
        assert!(registry.get_by_filename("no_extension").is_none());
    }

    #[test]
    fn test_supported_types_sorted_and_deduped() {
        let registry = ExtractorRegistry::with_defaults();
        assert_eq!(
            registry.supported_types(),
            vec!["json", "md", "toml", "xml", "yaml"]
        );
    }

    #[test]
    fn test_yaml_covers_both_extensions() {
        let registry = ExtractorRegistry::with_defaults();
        let extensions = registry.extensions_for_types(&["yaml"]);
        assert_eq!(extensions, vec![".yaml", ".yml"]);
    }

    #[test]
    fn test_has() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.has("json"));
        assert!(!registry.has("ini"));
    }

    #[test]
    fn test_extract_files_sequential_and_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..6 {
            let path = dir.path().join(format!("f{i}.md"));
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "[x](http://file-{i}.test/)").unwrap();
            paths.push(path.to_string_lossy().into_owned());
        }

        let registry = ExtractorRegistry::with_defaults();
        let links = registry.extract_files(&paths, false).unwrap();
        assert_eq!(links.len(), 6);

        let links = registry.extract_files(&paths[..2], false).unwrap();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_extract_files_fails_fast_on_missing_file() {
        let registry = ExtractorRegistry::with_defaults();
        let paths = vec!["does-not-exist.md".to_string()];
        assert!(registry.extract_files(&paths, false).is_err());
    }

    #[test]
    fn test_extract_files_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "http://a.test/").unwrap();
        let registry = ExtractorRegistry::with_defaults();
        let err = registry
            .extract_files(&[path.to_string_lossy().into_owned()], false)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
