use crate::foundation::cache::CachedResponse;
use crate::foundation::utils::to_pretty_json;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File extensions of the entries written by the cache.
const CACHE_EXTENSIONS: [&str; 2] = ["json", "jpg"];

/// Storage for catalog responses and cover images, keyed by album id.
///
/// Entries are read, then written, without any locking. Two processes sharing
/// a cache directory may overwrite each other's entries.
pub trait CacheStore: Send + Sync {
    fn read_response(&self, album_id: &str) -> io::Result<Option<CachedResponse>>;
    fn write_response(&self, album_id: &str, response: &CachedResponse) -> io::Result<()>;
    fn read_cover(&self, album_id: &str) -> io::Result<Option<Vec<u8>>>;
    fn write_cover(&self, album_id: &str, image: &[u8]) -> io::Result<()>;
}

/// A cache kept as one `<album_id>.json` and one `<album_id>.jpg` per album.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

/// What a cache clean-up removed (or would remove, on a dry run).
#[derive(Debug, Default, PartialEq)]
pub struct CleanReport {
    pub files: Vec<PathBuf>,
    pub total_size: u64,
    pub dry_run: bool,
}

impl FileCacheStore {
    /// Opens the cache directory, creating it when missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use ammg::FileCacheStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let cache = FileCacheStore::open(&dir.path().join("ammg")).unwrap();
    /// assert!(cache.cache_dir().is_dir());
    /// ```
    pub fn open(cache_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(cache_dir)?;
        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn response_path(&self, album_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{album_id}.json"))
    }

    fn cover_path(&self, album_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{album_id}.jpg"))
    }

    /// Lists the cache entries with their sizes in bytes.
    ///
    /// Only `.json` and `.jpg` files count as entries; anything else a user
    /// put into the directory is ignored.
    pub fn entries(&self) -> io::Result<Vec<(PathBuf, u64)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() && is_cache_file(&path) {
                entries.push((path, entry.metadata()?.len()));
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Returns the summed size of all cache entries in bytes.
    ///
    /// This is the apparent file size, not the disk space consumed.
    pub fn size(&self) -> io::Result<u64> {
        Ok(self.entries()?.iter().map(|(_, size)| size).sum())
    }

    /// Deletes every cache entry. With `dry_run` set, nothing is deleted but
    /// the report lists what would have been.
    pub fn clean(&self, dry_run: bool) -> io::Result<CleanReport> {
        let entries = self.entries()?;
        let total_size = entries.iter().map(|(_, size)| size).sum();

        let mut files = Vec::with_capacity(entries.len());
        for (path, _) in entries {
            if !dry_run {
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
            files.push(path);
        }

        Ok(CleanReport {
            files,
            total_size,
            dry_run,
        })
    }
}

impl CacheStore for FileCacheStore {
    fn read_response(&self, album_id: &str) -> io::Result<Option<CachedResponse>> {
        let path = self.response_path(album_id);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read(&path)?;
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write_response(&self, album_id: &str, response: &CachedResponse) -> io::Result<()> {
        let content =
            to_pretty_json(response).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.response_path(album_id), content)
    }

    fn read_cover(&self, album_id: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.cover_path(album_id);
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(path).map(Some)
    }

    fn write_cover(&self, album_id: &str, image: &[u8]) -> io::Result<()> {
        fs::write(self.cover_path(album_id), image)
    }
}

/// An in-memory cache, for running the pipeline without touching the disk.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    responses: Mutex<HashMap<String, CachedResponse>>,
    covers: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> io::Error {
    io::Error::new(io::ErrorKind::Other, "cache lock poisoned")
}

impl CacheStore for MemoryCacheStore {
    fn read_response(&self, album_id: &str) -> io::Result<Option<CachedResponse>> {
        Ok(self.responses.lock().map_err(poisoned)?.get(album_id).cloned())
    }

    fn write_response(&self, album_id: &str, response: &CachedResponse) -> io::Result<()> {
        self.responses
            .lock()
            .map_err(poisoned)?
            .insert(album_id.to_string(), response.clone());
        Ok(())
    }

    fn read_cover(&self, album_id: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.covers.lock().map_err(poisoned)?.get(album_id).cloned())
    }

    fn write_cover(&self, album_id: &str, image: &[u8]) -> io::Result<()> {
        self.covers
            .lock()
            .map_err(poisoned)?
            .insert(album_id.to_string(), image.to_vec());
        Ok(())
    }
}

fn is_cache_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CACHE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
