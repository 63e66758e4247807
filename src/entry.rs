//! Entry metadata yielded during iteration.
//!
//! The codec's entry handle is only valid for one iteration step, so the
//! session snapshots its metadata into an owned [`Entry`] at yield time.
//! The raw handle never leaves the session; callers keep the snapshot for
//! as long as they like.

/// File type of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Any other type (device node, fifo, socket, ...).
    Other,
}

/// Metadata snapshot of one archive entry.
///
/// Produced by [`ReadSession::next_entry`](crate::ReadSession::next_entry)
/// and by the [`Pour`](crate::Pour) iterator. Entries carry their position
/// in the archive (`index`), which also fixes the order guarantees: entries
/// are delivered exactly as the container stores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Pathname within the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// File type.
    pub kind: EntryKind,
    /// Permission bits.
    pub mode: u32,
    /// Zero-based position within the archive.
    pub index: usize,
}

impl Entry {
    /// Returns true for regular files.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Returns true for directories.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns true for symbolic links.
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}
