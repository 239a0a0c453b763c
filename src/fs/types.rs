use std::cmp::Ordering;

/// Kind of a listed object. Declaration order is the display order:
/// directories first, then files, then links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Directory,
    File,
    Link,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Directory => "d",
            EntryKind::File => "f",
            EntryKind::Link => "l",
        }
    }
}

/// One object returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

impl Entry {
    pub fn new(name: impl Into<String>, kind: EntryKind, size: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, EntryKind::File, size)
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory, 0)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn format_size(&self) -> String {
        if self.is_dir() {
            return "<DIR>".to_string();
        }
        humansize::format_size(self.size, humansize::BINARY)
    }

    /// Kind first, then case-sensitive name.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Sort entries into display order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(Entry::display_cmp);
}

/// A node reported by a depth-first traversal. `path` is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkNode {
    pub path: String,
    pub kind: EntryKind,
}

impl WalkNode {
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
