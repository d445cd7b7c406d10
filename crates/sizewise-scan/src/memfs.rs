//! In-memory filesystem for exercising scanner failure paths.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sizewise_core::Stat;

use crate::fs::{DirItem, FileSystem};

const DIR_RECORD_SIZE: u64 = 4096;
const LINK_SIZE: u64 = 11;

#[derive(Debug, Clone, Copy)]
enum Node {
    File(u64),
    Dir,
    Symlink,
    /// Listed with a size, but stat fails.
    Unreadable(u64),
    /// Directory whose listing fails.
    Unlistable(u64),
    /// Listing metadata and stat both fail.
    Unprobeable,
}

impl Node {
    fn stat(self) -> Option<Stat> {
        match self {
            Node::File(size) => Some(Stat::file(size)),
            Node::Dir => Some(Stat::directory(DIR_RECORD_SIZE)),
            Node::Symlink => Some(Stat::symlink(LINK_SIZE)),
            Node::Unlistable(size) => Some(Stat::directory(size)),
            Node::Unreadable(_) | Node::Unprobeable => None,
        }
    }

    fn listed(self) -> Option<Stat> {
        match self {
            Node::Unreadable(size) => Some(Stat::file(size)),
            other => other.stat(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemFs {
    nodes: HashMap<PathBuf, Node>,
    children: HashMap<PathBuf, Vec<PathBuf>>,
    delay: Option<Duration>,
}

impl MemFs {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        let mut fs = Self::default();
        fs.nodes.insert(root.into(), Node::Dir);
        fs
    }

    /// Sleep this long in every `stat` call.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.insert(path.into(), Node::Dir)
    }

    pub(crate) fn file(&mut self, path: impl Into<PathBuf>, size: u64) -> &mut Self {
        self.insert(path.into(), Node::File(size))
    }

    pub(crate) fn symlink(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.insert(path.into(), Node::Symlink)
    }

    pub(crate) fn unreadable(&mut self, path: impl Into<PathBuf>, size: u64) -> &mut Self {
        self.insert(path.into(), Node::Unreadable(size))
    }

    pub(crate) fn unlistable(&mut self, path: impl Into<PathBuf>, size: u64) -> &mut Self {
        self.insert(path.into(), Node::Unlistable(size))
    }

    pub(crate) fn unprobeable(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.insert(path.into(), Node::Unprobeable)
    }

    fn insert(&mut self, path: PathBuf, node: Node) -> &mut Self {
        if !self.nodes.contains_key(&path) {
            if let Some(parent) = path.parent().map(Path::to_path_buf) {
                if !self.nodes.contains_key(&parent) {
                    self.insert(parent.clone(), Node::Dir);
                }
                self.children.entry(parent).or_default().push(path.clone());
            }
        }
        self.nodes.insert(path, node);
        self
    }
}

impl FileSystem for MemFs {
    fn stat(&self, path: &Path) -> io::Result<Stat> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.nodes.get(path) {
            Some(node) => node
                .stat()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "stat denied")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such entry")),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        match self.nodes.get(path) {
            Some(Node::Dir) => Ok(self
                .children
                .get(path)
                .map(|paths| {
                    paths
                        .iter()
                        .map(|p| DirItem::new(p.clone(), self.nodes.get(p).and_then(|n| n.listed())))
                        .collect()
                })
                .unwrap_or_default()),
            Some(Node::Unlistable(_)) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "listing denied",
            )),
            Some(_) => Err(io::Error::other("not a directory")),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such entry")),
        }
    }
}
