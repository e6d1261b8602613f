//! File-backed cache for test runs
//!
//! Entries live as plain files under one directory. Only allowed cache kinds
//! are stored; everything else is silently skipped, which mirrors a disabled
//! cache type.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Cache kinds kept during test runs
pub const TEST_CACHE_KINDS: [&str; 3] = ["eav", "layout", "translate"];

/// Directory-backed cache
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    allowed: BTreeSet<String>,
}

impl FileCache {
    /// Create cache rooted at `dir` storing only `allowed` kinds
    #[must_use]
    pub fn new<I, S>(dir: impl Into<PathBuf>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Create cache with the kinds kept during test runs
    #[inline]
    #[must_use]
    pub fn for_test(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, TEST_CACHE_KINDS)
    }

    /// Cache directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether entries of `kind` are stored
    #[inline]
    #[must_use]
    pub fn is_allowed(&self, kind: &str) -> bool {
        self.allowed.contains(kind)
    }

    /// Store an entry; returns `false` when the kind is not allowed
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be written
    pub fn save(&self, kind: &str, id: &str, data: &[u8]) -> Result<bool, CacheError> {
        if !self.is_allowed(kind) {
            return Ok(false);
        }
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.entry_path(kind, id);
        fs::write(&path, data).map_err(|source| CacheError::Io { path, source })?;
        Ok(true)
    }

    /// Load an entry
    ///
    /// # Errors
    /// Returns error if the entry exists but cannot be read
    pub fn load(&self, kind: &str, id: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if !self.is_allowed(kind) {
            return Ok(None);
        }
        let path = self.entry_path(kind, id);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    /// Remove an entry; returns whether it existed
    ///
    /// # Errors
    /// Returns error if the entry exists but cannot be removed
    pub fn remove(&self, kind: &str, id: &str) -> Result<bool, CacheError> {
        let path = self.entry_path(kind, id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    /// Remove everything under the cache directory
    ///
    /// Returns the number of removed entries. A missing directory is empty.
    ///
    /// # Errors
    /// Returns error if an entry cannot be removed
    pub fn clean(&self) -> Result<usize, CacheError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry
                .map_err(|source| CacheError::Io {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }

        tracing::debug!("Cleaned {} cache entries in {}", removed, self.dir.display());
        Ok(removed)
    }

    fn entry_path(&self, kind: &str, id: &str) -> PathBuf {
        self.dir
            .join(format!("{}--{}", sanitize(kind), sanitize(id)))
    }
}

/// Map an id onto a file-name-safe string
///
/// Every byte but ASCII alphanumerics becomes `_xx`; the mapping is
/// reversible and never produces `--`.
fn sanitize(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("_{byte:02x}"));
        }
    }
    out
}
