//! Filesystem access used by the scanners.

use std::io;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use sizewise_core::Stat;
use tracing::trace;

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    /// Full path of the item.
    pub path: PathBuf,
    /// Final path component.
    pub name: CompactString,
    /// Non-following metadata captured while listing, `None` if that probe failed.
    pub stat: Option<Stat>,
}

impl DirItem {
    /// Create a listing item for `path`.
    pub fn new(path: impl Into<PathBuf>, stat: Option<Stat>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_default();
        Self { path, name, stat }
    }

    /// Check if the listing reported a directory.
    pub fn is_dir(&self) -> bool {
        self.stat.is_some_and(|s| s.is_dir())
    }

    /// Check if the listing reported a symlink.
    pub fn is_symlink(&self) -> bool {
        self.stat.is_some_and(|s| s.is_symlink())
    }

    /// Size reported by the listing, 0 when unknown.
    pub fn listed_size(&self) -> u64 {
        self.stat.map_or(0, |s| s.size)
    }
}

/// The filesystem operations the scanning engine needs.
///
/// Implementations must never follow symlinks.
pub trait FileSystem: Send + Sync {
    /// Metadata for `path` without following symlinks.
    fn stat(&self, path: &Path) -> io::Result<Stat>;

    /// List the entries of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirItem>>;

    /// Resolve `path` to the absolute form used as a cache key.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileSystem for StdFs {
    fn stat(&self, path: &Path) -> io::Result<Stat> {
        std::fs::symlink_metadata(path).map(|meta| Stat::from(&meta))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        let mut items = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    trace!(path = %path.display(), error = %err, "unreadable listing entry");
                    continue;
                }
            };
            // DirEntry::metadata does not traverse symlinks.
            let stat = entry.metadata().ok().map(|meta| Stat::from(&meta));
            items.push(DirItem::new(entry.path(), stat));
        }
        Ok(items)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}
