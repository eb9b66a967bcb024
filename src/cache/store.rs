//! Envelope store backed by a single JSON file
//!
//! Provides an `EnvelopeStore` that persists the latest [`FetchEnvelope`] and
//! reports how old the persisted copy is.

use directories::ProjectDirs;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::data::FetchEnvelope;

/// File name the envelope is stored under
pub const CACHE_FILE_NAME: &str = "weather_data.json";

/// Errors that can occur when reading or writing the cache file
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file does not exist yet
    #[error("Cache file not found: {0}")]
    Missing(PathBuf),

    /// The cache file exists but does not hold a valid envelope
    #[error("Cache file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Reading or writing the file failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] io::Error),

    /// The blocking file task panicked or was cancelled
    #[error("Cache task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Returns `~/.cache/smnview/weather_data.json` on Linux, or the platform
/// equivalent. `None` when no home directory can be determined.
pub fn default_cache_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "smnview")?;
    Some(project_dirs.cache_dir().join(CACHE_FILE_NAME))
}

/// Reads and writes the cached envelope
#[derive(Debug, Clone)]
pub struct EnvelopeStore {
    /// Location of the cache file
    path: PathBuf,
}

impl EnvelopeStore {
    /// Creates a store for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time elapsed since the cache file was last modified
    ///
    /// Returns `None` when the file does not exist. A modification time in the
    /// future counts as age zero.
    pub fn age(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Whether the cached copy is at least `max_age` old (or missing)
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age().map_or(true, |age| age >= max_age)
    }

    /// Replaces the cache file with `envelope`
    ///
    /// The envelope is serialized first and written to a temporary file in the
    /// same directory, which is then renamed over the target. Readers see
    /// either the old file or the new one, never a partial write.
    pub fn write(&self, envelope: &FetchEnvelope) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(envelope)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Reads the whole envelope back
    pub fn read(&self) -> Result<FetchEnvelope, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.map_io(e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Raw bytes of the cache file, for serving it unchanged
    pub fn read_bytes(&self) -> Result<Vec<u8>, CacheError> {
        fs::read(&self.path).map_err(|e| self.map_io(e))
    }

    /// [`EnvelopeStore::age`] on the blocking pool; `None` if the task fails
    pub async fn age_async(&self) -> Option<Duration> {
        self.unblock(Self::age).await.ok().flatten()
    }

    /// [`EnvelopeStore::write`] on the blocking pool
    pub async fn write_async(&self, envelope: FetchEnvelope) -> Result<(), CacheError> {
        self.unblock(move |store| store.write(&envelope)).await?
    }

    /// [`EnvelopeStore::read`] on the blocking pool
    pub async fn read_async(&self) -> Result<FetchEnvelope, CacheError> {
        self.unblock(Self::read).await?
    }

    /// [`EnvelopeStore::read_bytes`] on the blocking pool
    pub async fn read_bytes_async(&self) -> Result<Vec<u8>, CacheError> {
        self.unblock(Self::read_bytes).await?
    }

    async fn unblock<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: FnOnce(&EnvelopeStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        Ok(tokio::task::spawn_blocking(move || op(&store)).await?)
    }

    fn map_io(&self, e: io::Error) -> CacheError {
        if e.kind() == io::ErrorKind::NotFound {
            CacheError::Missing(self.path.clone())
        } else {
            CacheError::Io(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WeatherReading;
    use tempfile::TempDir;

    fn create_test_store() -> (EnvelopeStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = EnvelopeStore::new(temp_dir.path().join(CACHE_FILE_NAME));
        (store, temp_dir)
    }

    fn sample_envelope() -> FetchEnvelope {
        FetchEnvelope::success(
            vec![WeatherReading {
                name: Some("Bariloche".to_string()),
                province: Some("Río Negro".to_string()),
                ..Default::default()
            }],
            "http://example.test/map_items/weather",
        )
    }

    #[test]
    fn test_age_is_none_for_missing_file() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.age().is_none());
        assert!(store.is_stale(Duration::from_secs(3600)));
    }

    #[test]
    fn test_fresh_file_is_not_stale() {
        let (store, _temp_dir) = create_test_store();
        store.write(&sample_envelope()).expect("Write should succeed");

        let age = store.age().expect("File should have an age");
        assert!(age < Duration::from_secs(60));
        assert!(!store.is_stale(Duration::from_secs(15 * 60)));
    }

    #[test]
    fn test_zero_threshold_is_always_stale() {
        let (store, _temp_dir) = create_test_store();
        store.write(&sample_envelope()).expect("Write should succeed");
        assert!(store.is_stale(Duration::ZERO));
    }

    #[test]
    fn test_write_then_read_returns_same_envelope() {
        let (store, _temp_dir) = create_test_store();
        let envelope = sample_envelope();

        store.write(&envelope).expect("Write should succeed");
        let read = store.read().expect("Read should succeed");

        assert_eq!(read, envelope);
    }

    #[test]
    fn test_write_overwrites_wholesale() {
        let (store, _temp_dir) = create_test_store();
        store.write(&sample_envelope()).expect("First write should succeed");

        let second = FetchEnvelope::success(Vec::new(), "http://example.test");
        store.write(&second).expect("Second write should succeed");

        let read = store.read().expect("Read should succeed");
        assert_eq!(read.readings().map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_write_leaves_no_temp_files_behind() {
        let (store, temp_dir) = create_test_store();
        store.write(&sample_envelope()).expect("Write should succeed");
        store.write(&sample_envelope()).expect("Write should succeed");

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "Only the cache file should remain");
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("cache");
        let store = EnvelopeStore::new(nested.join(CACHE_FILE_NAME));

        store.write(&sample_envelope()).expect("Write should succeed");

        assert!(nested.join(CACHE_FILE_NAME).exists());
    }

    #[test]
    fn test_read_missing_file() {
        let (store, _temp_dir) = create_test_store();
        assert!(matches!(store.read(), Err(CacheError::Missing(_))));
        assert!(matches!(store.read_bytes(), Err(CacheError::Missing(_))));
    }

    #[test]
    fn test_read_corrupt_file() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "{ not an envelope").unwrap();
        assert!(matches!(store.read(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn test_read_bytes_matches_file_contents() {
        let (store, _temp_dir) = create_test_store();
        store.write(&sample_envelope()).expect("Write should succeed");

        let bytes = store.read_bytes().unwrap();
        assert_eq!(bytes, fs::read(store.path()).unwrap());
    }

    #[tokio::test]
    async fn test_async_methods_match_blocking_ones() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.age_async().await.is_none());
        assert!(matches!(
            store.read_async().await,
            Err(CacheError::Missing(_))
        ));

        store
            .write_async(sample_envelope())
            .await
            .expect("Write should succeed");

        assert!(store.age_async().await.is_some());
        assert_eq!(store.read_async().await.unwrap(), store.read().unwrap());
        assert_eq!(
            store.read_bytes_async().await.unwrap(),
            fs::read(store.path()).unwrap()
        );
    }

    #[test]
    fn test_default_path_uses_project_name() {
        if let Some(path) = default_cache_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("smnview"));
            assert!(path_str.ends_with(CACHE_FILE_NAME));
        }
        // Passes when no home directory is available (e.g. in CI)
    }
}
