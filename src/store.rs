//! Template store with a process-lifetime content cache
//!
//! Paths are resolved to a normalized absolute form before lookup, so
//! `views/a.html`, `./views/a.html` and `/cwd/views/a.html` share one entry.
//! The first successful read of a path wins: entries are never invalidated,
//! and later changes on disk are not observed. Failed reads are not cached.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::error::RenderError;

/// Resolves template paths to their raw text, reading each path at most once.
pub struct TemplateStore {
    /// Base directory for relative paths (`None` = current directory)
    root: Option<PathBuf>,
    /// Canonical absolute path -> raw content
    cache: DashMap<PathBuf, Arc<str>>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    /// Create an empty store resolving relative paths against the working directory
    pub fn new() -> Self {
        Self {
            root: None,
            cache: DashMap::new(),
        }
    }

    /// Create an empty store resolving relative paths against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            cache: DashMap::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Load the raw content for `path`.
    ///
    /// Returns the cached content when the resolved path was read before,
    /// otherwise reads it from disk and caches it. Read failures become
    /// [`RenderError::TemplateNotFound`] carrying the resolved path.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<str>, RenderError> {
        let absolute = self.resolve(path.as_ref())?;

        // Fast path without taking a write lock
        if let Some(cached) = self.cache.get(&absolute) {
            debug!(path = %absolute.display(), "template cache hit");
            return Ok(Arc::clone(cached.value()));
        }

        // The entry guard holds the shard lock across the read, so concurrent
        // loads of the same key populate it once.
        match self.cache.entry(absolute) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let content = match fs::read_to_string(entry.key()) {
                    Ok(content) => content,
                    Err(source) => {
                        debug!(path = %entry.key().display(), error = %source, "template read failed");
                        return Err(RenderError::TemplateNotFound {
                            path: entry.key().clone(),
                            source,
                        });
                    }
                };
                debug!(path = %entry.key().display(), bytes = content.len(), "template cache miss");
                let content: Arc<str> = Arc::from(content);
                entry.insert(Arc::clone(&content));
                Ok(content)
            }
        }
    }

    /// Resolve `path` to the absolute key used by the cache.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf, RenderError> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let base = match &self.root {
                Some(root) if root.is_absolute() => root.clone(),
                Some(root) => current_dir(path)?.join(root),
                None => current_dir(path)?,
            };
            base.join(path)
        };
        Ok(normalize(&joined))
    }

    /// Whether the resolved `path` has cached content
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.resolve(path.as_ref())
            .map(|key| self.cache.contains_key(&key))
            .unwrap_or(false)
    }

    /// Number of cached templates
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn current_dir(path: &Path) -> Result<PathBuf, RenderError> {
    std::env::current_dir().map_err(|source| RenderError::TemplateNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// Lexically normalize an absolute path: drop `.` and fold `..`.
///
/// Symlinks are left alone and the target does not need to exist.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/srv/views/./partials/../page.html")),
            PathBuf::from("/srv/views/page.html")
        );
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let store = TemplateStore::with_root("/srv/views");
        let resolved = store.resolve(Path::new("partials/../head.html")).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/views/head.html"));
    }

    #[test]
    fn relative_paths_resolve_against_cwd_by_default() {
        let store = TemplateStore::new();
        let resolved = store.resolve(Path::new("head.html")).unwrap();
        assert_eq!(resolved, std::env::current_dir().unwrap().join("head.html"));
    }

    #[test]
    fn load_reads_once_and_serves_from_cache() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("page.html");
        fs::write(&file, "first").unwrap();

        let store = TemplateStore::new();
        let first = store.load(&file).unwrap();
        fs::write(&file, "second").unwrap();
        let second = store.load(&file).unwrap();

        assert_eq!(&*first, "first");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn equivalent_paths_share_an_entry() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("page.html"), "x").unwrap();

        let store = TemplateStore::with_root(dir.path());
        store.load("page.html").unwrap();
        store.load("./partials/../page.html").unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.contains(dir.path().join("page.html")));
    }

    #[test]
    fn failed_reads_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("late.html");
        let store = TemplateStore::new();

        let err = store.load(&file).unwrap_err();
        match &err {
            RenderError::TemplateNotFound { path, .. } => assert_eq!(path, &file),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty());

        fs::write(&file, "now here").unwrap();
        assert_eq!(&*store.load(&file).unwrap(), "now here");
    }

    #[test]
    fn empty_files_are_cached_too() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("empty.html");
        fs::write(&file, "").unwrap();

        let store = TemplateStore::new();
        assert_eq!(&*store.load(&file).unwrap(), "");
        fs::write(&file, "changed").unwrap();
        assert_eq!(&*store.load(&file).unwrap(), "");
    }
}
