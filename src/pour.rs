//! The extraction pump: pouring an archive's entries onto disk.
//!
//! [`Pour`] drives a [`ReadSession`] and a disk-write handle in lockstep.
//! For each entry it writes the header, copies the entry's data block by
//! block at each block's reported file offset, finalizes the entry, and
//! yields the entry's metadata so callers can observe progress without
//! re-reading anything.
//!
//! Blocks are written at the offset the codec reports rather than appended,
//! so sparse files and out-of-order block delivery are reproduced
//! faithfully. Both the read-side and the write-side status of every call
//! are checked; any failure aborts the whole pour.

use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use crate::config::ReaderOptions;
use crate::entry::Entry;
use crate::error::{Error, ExtractionPhase, Result};
use crate::gateway::{DataBlock, Gateway};
use crate::session::ReadSession;
use crate::status::RawStatus;

/// Options bitmask for the disk-write handle.
///
/// Passed through verbatim to the codec; the named constants mirror the
/// native library's extract flags.
///
/// # Example
///
/// ```rust
/// use decant::WriteFlags;
///
/// let flags = WriteFlags::TIME | WriteFlags::PERM;
/// assert!(flags.contains(WriteFlags::PERM));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteFlags(pub i32);

impl WriteFlags {
    /// No special behavior.
    pub const NONE: WriteFlags = WriteFlags(0);
    /// Restore owner and group.
    pub const OWNER: WriteFlags = WriteFlags(0x0001);
    /// Restore permission bits.
    pub const PERM: WriteFlags = WriteFlags(0x0002);
    /// Restore timestamps.
    pub const TIME: WriteFlags = WriteFlags(0x0004);
    /// Fail instead of overwriting existing files.
    pub const NO_OVERWRITE: WriteFlags = WriteFlags(0x0008);
    /// Unlink existing files before writing.
    pub const UNLINK: WriteFlags = WriteFlags(0x0010);
    /// Restore ACLs.
    pub const ACL: WriteFlags = WriteFlags(0x0020);
    /// Restore file flags.
    pub const FFLAGS: WriteFlags = WriteFlags(0x0040);
    /// Restore extended attributes.
    pub const XATTR: WriteFlags = WriteFlags(0x0080);
    /// Refuse to write through symlinks.
    pub const SECURE_SYMLINKS: WriteFlags = WriteFlags(0x0100);
    /// Refuse paths containing `..`.
    pub const SECURE_NODOTDOT: WriteFlags = WriteFlags(0x0200);

    /// Returns the raw bitmask.
    pub fn bits(self) -> i32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub fn contains(self, other: WriteFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WriteFlags {
    type Output = WriteFlags;

    fn bitor(self, rhs: WriteFlags) -> WriteFlags {
        WriteFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for WriteFlags {
    fn bitor_assign(&mut self, rhs: WriteFlags) {
        self.0 |= rhs.0;
    }
}

/// Scoped owner of one write-to-disk handle.
///
/// Mirrors the read session's ownership discipline: the handle is released
/// in `Drop`, so every exit path of a pour run (completion, early break,
/// error) releases it exactly once.
pub(crate) struct DiskWriter<G: Gateway> {
    gateway: G,
    handle: Option<G::Write>,
}

impl<G: Gateway> DiskWriter<G> {
    pub(crate) fn open(gateway: G, flags: WriteFlags) -> Self {
        let mut handle = gateway.new_write_handle();
        gateway.set_write_options(&mut handle, flags);
        Self {
            gateway,
            handle: Some(handle),
        }
    }

    fn check(raw: RawStatus, phase: ExtractionPhase) -> Result<()> {
        if raw.classify().is_ok() {
            Ok(())
        } else {
            Err(Error::Extraction {
                phase,
                code: raw.code(),
            })
        }
    }

    pub(crate) fn write_header(&mut self, entry: &G::Entry) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };
        let raw = self.gateway.write_header(handle, entry);
        Self::check(raw, ExtractionPhase::WriteHeader)
    }

    pub(crate) fn write_block(&mut self, block: DataBlock<'_>) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };
        let raw = self.gateway.write_data_block(handle, block.data, block.offset);
        Self::check(raw, ExtractionPhase::WriteBlock)
    }

    pub(crate) fn finish_entry(&mut self) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };
        let raw = self.gateway.finish_entry(handle);
        Self::check(raw, ExtractionPhase::FinishEntry)
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.gateway.release_write(handle);
            log::trace!("released disk-write handle");
        }
    }
}

impl<G: Gateway> Drop for DiskWriter<G> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Lazy extraction of an archive onto the filesystem.
///
/// Created by [`Pour::open`]. Iterating yields each entry *after* it has
/// been fully written and finalized on disk, in container order. Entry
/// pathnames are passed through to the codec verbatim, so extraction lands
/// relative to the process working directory unless the archive carries
/// absolute paths.
///
/// The iterator is fused: the first failure (read side or write side)
/// terminates the run, and no subsequent entries are extracted. Both the
/// read handle and the disk-write handle are released when the `Pour` goes
/// out of scope, however the run ended.
///
/// # Example
///
/// ```rust,ignore
/// let pump = Pour::open(gateway, "archive.7z", WriteFlags::TIME, &ReaderOptions::new())?;
/// for entry in pump {
///     let entry = entry?;
///     println!("extracted {}", entry.name);
/// }
/// ```
pub struct Pour<G: Gateway> {
    session: ReadSession<G>,
    writer: DiskWriter<G>,
    finished: bool,
}

impl<G: Gateway> Pour<G> {
    /// Opens an extraction run over the archive at `path`.
    ///
    /// Opens a read session internally and creates one disk-write handle
    /// configured with `flags`.
    ///
    /// # Errors
    ///
    /// Same as [`ReadSession::open`].
    pub fn open<P: AsRef<Path>>(
        gateway: G,
        path: P,
        flags: WriteFlags,
        options: &ReaderOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("pouring archive: {}", path.display());

        let session = ReadSession::open(gateway.clone(), path, options)?;
        let writer = DiskWriter::open(gateway, flags);
        Ok(Self {
            session,
            writer,
            finished: false,
        })
    }

    /// Extracts the next entry completely, returning its metadata.
    fn pour_next(&mut self) -> Result<Option<Entry>> {
        let Some(entry) = self.session.next_entry()? else {
            return Ok(None);
        };

        if let Some(handle) = self.session.current_entry() {
            self.writer.write_header(handle)?;
        }

        loop {
            let Some(block) = self.session.read_data_block()? else {
                break;
            };
            self.writer.write_block(block)?;
        }

        self.writer.finish_entry()?;
        Ok(Some(entry))
    }
}

impl<G: Gateway> Iterator for Pour<G> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.pour_next() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<G: Gateway> std::iter::FusedIterator for Pour<G> {}
