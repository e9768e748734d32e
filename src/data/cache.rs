use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::{self, DataLoadError, Encoding};
use super::model::InvoiceDataset;

// ---------------------------------------------------------------------------
// Session-scoped dataset cache
// ---------------------------------------------------------------------------

/// Invalidation key for the cached dataset. The encoding is part of the key
/// since re-reading the same bytes under a different encoding yields a
/// different table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    encoding: Encoding,
}

/// Holds the one dataset loaded for this session. `get_or_load` returns the
/// cached `Arc` while the file path, its mtime, and the encoding are
/// unchanged, and reloads otherwise.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(CacheKey, Arc<InvoiceDataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it if the cache is
    /// empty or stale.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        encoding: Encoding,
    ) -> Result<Arc<InvoiceDataset>, DataLoadError> {
        let modified = std::fs::metadata(path)?.modified().ok();
        let key = CacheKey {
            path: path.to_path_buf(),
            modified,
            encoding,
        };

        if let Some((cached_key, dataset)) = &self.entry {
            if *cached_key == key {
                log::debug!("dataset cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(loader::load_file(path, encoding)?);
        log::info!(
            "loaded {} invoices from {} ({encoding})",
            dataset.len(),
            path.display()
        );
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset, forcing the next `get_or_load` to re-read.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "Tapaht.pvm;Laskun summa ilman ALV;Tilin nimi;Toimittajan nimi\n\
                       01.02.2023;10,00;Tili;Acme\n";

    #[test]
    fn second_load_returns_the_cached_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(file.path(), Encoding::Utf8).unwrap();
        let second = cache.get_or_load(file.path(), Encoding::Utf8).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn encoding_change_invalidates_the_cache() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(file.path(), Encoding::Utf8).unwrap();
        let second = cache.get_or_load(file.path(), Encoding::Latin1).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(Path::new("/no/such/file.csv"), Encoding::Latin1)
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }
}
