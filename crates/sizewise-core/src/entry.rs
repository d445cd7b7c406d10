//! Result tree and filesystem metadata types.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Type of a filesystem object, as reported by a non-following stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed).
    Symlink,
    /// Sockets, devices, fifos.
    Other,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(self) -> bool {
        matches!(self, EntryKind::Symlink)
    }
}

/// Metadata of a single path, as returned by a non-following stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Logical length in bytes.
    pub size: u64,
    /// Object type.
    pub kind: EntryKind,
}

impl Stat {
    /// Metadata for a regular file.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            kind: EntryKind::File,
        }
    }

    /// Metadata for a directory. `size` is the directory's own on-disk record size.
    pub fn directory(size: u64) -> Self {
        Self {
            size,
            kind: EntryKind::Directory,
        }
    }

    /// Metadata for a symlink.
    pub fn symlink(size: u64) -> Self {
        Self {
            size,
            kind: EntryKind::Symlink,
        }
    }

    /// Check if this describes a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this describes a symlink.
    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }
}

impl From<&std::fs::Metadata> for Stat {
    fn from(meta: &std::fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Self {
            size: meta.len(),
            kind,
        }
    }
}

/// A node in the result tree.
///
/// A directory's `size` is the sum of its children's sizes and its children are sorted
/// by size, largest first, once the directory has been finalized. Content that could not
/// be read is never folded into `size`; scanners report it separately as skipped bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Absolute path of this entry.
    pub path: PathBuf,

    /// Final path component.
    pub name: CompactString,

    /// Size in bytes (aggregate for directories).
    pub size: u64,

    /// Whether this entry is a directory.
    pub is_dir: bool,

    /// Children, sorted by size descending.
    pub children: Vec<DirEntry>,
}

impl DirEntry {
    /// Create a leaf entry for a file.
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        Self {
            name: name_of(&path),
            path,
            size,
            is_dir: false,
            children: Vec::new(),
        }
    }

    /// Create an empty directory entry.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: name_of(&path),
            path,
            size: 0,
            is_dir: true,
            children: Vec::new(),
        }
    }

    /// Create a directory entry from its resolved children.
    pub fn with_children(path: impl Into<PathBuf>, children: Vec<DirEntry>) -> Self {
        let mut entry = Self::directory(path);
        entry.children = children;
        entry.finalize();
        entry
    }

    /// Sort children by size descending and recompute `size` as their sum.
    pub fn finalize(&mut self) {
        self.children.sort_by(|a, b| b.size.cmp(&a.size));
        self.size = self.children.iter().map(|c| c.size).sum();
    }

    /// Check if this entry has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of files in this subtree (1 for a file).
    pub fn file_count(&self) -> u64 {
        if self.is_dir {
            self.children.iter().map(DirEntry::file_count).sum()
        } else {
            1
        }
    }

    /// Number of directories below this entry, not counting itself.
    pub fn dir_count(&self) -> u64 {
        self.children
            .iter()
            .filter(|c| c.is_dir)
            .map(|c| c.dir_count() + 1)
            .sum()
    }

    /// Find a descendant (or this entry) by absolute path.
    pub fn find(&self, path: &Path) -> Option<&DirEntry> {
        if self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    /// A copy of this subtree keeping only `depth` levels below this entry.
    ///
    /// Sizes are left untouched, so a truncated directory still reports the full
    /// size of its content.
    pub fn truncated(&self, depth: usize) -> DirEntry {
        DirEntry {
            path: self.path.clone(),
            name: self.name.clone(),
            size: self.size,
            is_dir: self.is_dir,
            children: if depth == 0 {
                Vec::new()
            } else {
                self.children.iter().map(|c| c.truncated(depth - 1)).collect()
            },
        }
    }
}

/// Final path component, or the whole path for roots like `/`.
fn name_of(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}
