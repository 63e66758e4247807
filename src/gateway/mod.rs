//! The codec gateway boundary.
//!
//! All archive parsing and decompression is delegated to an external codec
//! library; this module defines the [`Gateway`] trait through which the
//! session and the extraction pump talk to it. The trait surface mirrors
//! the native library's read, entry-metadata, and write-to-disk primitives
//! one call per method, with every fallible call reporting a [`RawStatus`].
//!
//! The crate never interprets archive bytes itself; correctness here is
//! about handle lifetimes and status handling, which is why the trait deals
//! in owned handle values (released exactly once, by value) and in
//! [`DataBlock`]s whose lifetime is tied to the read handle.

use std::path::Path;

use crate::config::{Filter, Format};
use crate::entry::EntryKind;
use crate::pour::WriteFlags;
use crate::status::RawStatus;

#[cfg(feature = "libarchive")]
pub mod system;

/// One block of an entry's payload, borrowed from the read handle.
///
/// The codec owns the underlying buffer and reuses it on the next read
/// call; the borrow on the handle encodes that validity window. `offset`
/// is the position of this block within the entry's file, which is not
/// necessarily the end of the previous block: sparse files and
/// out-of-order delivery are expressed through it and must be honored by
/// writers.
#[derive(Debug, Clone, Copy)]
pub struct DataBlock<'a> {
    /// Block payload.
    pub data: &'a [u8],
    /// Offset of this block within the entry's file.
    pub offset: u64,
}

impl DataBlock<'_> {
    /// Returns the block length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the block carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The external archive codec, as seen by this crate.
///
/// Implementations wrap a concrete codec library (the built-in
/// [`system::SystemGateway`] wraps the native libarchive library behind
/// the `libarchive` feature) or a test double. The trait is `Clone`
/// because the read session and the disk writer each hold their own
/// gateway value for release-on-drop; implementations are expected to be
/// cheap to clone (a ZST for FFI gateways, a shared reference for fakes).
///
/// # Contract
///
/// * Handles are owned values: a handle returned by `new_read_handle` or
///   `new_write_handle` must eventually be passed to the matching
///   `release_*` call, exactly once.
/// * An entry handle returned by [`next_header`][Self::next_header] is
///   only valid until the next `next_header` or `release_read` call on
///   the same read handle; the codec reuses it.
/// * Calls on one read handle are strictly sequential; the trait takes
///   `&mut` borrows of the handle to make concurrent use unrepresentable.
pub trait Gateway: Clone {
    /// Archive-read handle.
    type Read;
    /// Transient per-entry handle, reused by the codec on each advance.
    type Entry;
    /// Write-to-disk handle.
    type Write;

    /// Allocates a fresh archive-read handle.
    fn new_read_handle(&self) -> Self::Read;

    /// Enables filter support on the handle.
    fn support_filter(&self, handle: &mut Self::Read, filter: Filter) -> RawStatus;

    /// Enables container-format support on the handle.
    fn support_format(&self, handle: &mut Self::Read, format: Format) -> RawStatus;

    /// Opens the file at `path` for reading with the given block size.
    fn open_filename(&self, handle: &mut Self::Read, path: &Path, block_size: usize) -> RawStatus;

    /// Advances to the next entry header.
    ///
    /// Returns the entry handle alongside an OK status; on EOF or failure
    /// the entry is `None`.
    fn next_header(&self, handle: &mut Self::Read) -> (RawStatus, Option<Self::Entry>);

    /// Discards the unread remainder of the current entry's data.
    fn skip_data(&self, handle: &mut Self::Read) -> RawStatus;

    /// Reads the next data block of the current entry.
    ///
    /// EOF status marks the end of this entry's data, not of the archive.
    fn read_data_block<'a>(&self, handle: &'a mut Self::Read)
    -> (RawStatus, Option<DataBlock<'a>>);

    /// Releases the read handle. Consumes it so release happens once.
    fn release_read(&self, handle: Self::Read);

    // Entry metadata accessors. These wrap the external entry-metadata
    // collaborator; the entry handle alone identifies the entry, the data
    // stream stays on the read handle.

    /// Returns the entry's pathname within the archive.
    fn entry_pathname(&self, entry: &Self::Entry) -> String;

    /// Returns the entry's uncompressed size in bytes.
    fn entry_size(&self, entry: &Self::Entry) -> u64;

    /// Returns the entry's file type.
    fn entry_kind(&self, entry: &Self::Entry) -> EntryKind;

    /// Returns the entry's permission bits.
    fn entry_mode(&self, entry: &Self::Entry) -> u32;

    /// Allocates a fresh write-to-disk handle.
    fn new_write_handle(&self) -> Self::Write;

    /// Applies overwrite/permission flags to the write handle.
    fn set_write_options(&self, handle: &mut Self::Write, flags: WriteFlags);

    /// Writes an entry's header/metadata to disk.
    fn write_header(&self, handle: &mut Self::Write, entry: &Self::Entry) -> RawStatus;

    /// Writes one data block to disk at its reported offset.
    fn write_data_block(&self, handle: &mut Self::Write, data: &[u8], offset: u64) -> RawStatus;

    /// Finalizes the entry currently being written.
    fn finish_entry(&self, handle: &mut Self::Write) -> RawStatus;

    /// Releases the write handle. Consumes it so release happens once.
    fn release_write(&self, handle: Self::Write);
}
