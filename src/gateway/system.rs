//! [`Gateway`] implementation over the system libarchive library.
//!
//! Raw FFI bindings to the handful of `archive_read_*`, `archive_entry_*`,
//! and `archive_write_disk_*` entry points this crate needs. Enabled by the
//! `libarchive` cargo feature; the crate links against `-larchive`.
//!
//! The handle types here are thin raw-pointer wrappers. All sequencing and
//! lifetime rules (one call site at a time, entry handles invalid after the
//! next advance, release exactly once) are enforced by [`ReadSession`] and
//! [`Pour`], not repeated here.
//!
//! [`ReadSession`]: crate::ReadSession
//! [`Pour`]: crate::Pour

use std::ffi::{CStr, CString, c_char, c_int, c_uint, c_void};
use std::path::Path;
use std::ptr;

use crate::config::{Filter, Format};
use crate::entry::EntryKind;
use crate::gateway::{DataBlock, Gateway};
use crate::pour::WriteFlags;
use crate::status::RawStatus;

// libarchive file type constants (archive_entry_filetype values).
const AE_IFREG: c_uint = 0o100000;
const AE_IFDIR: c_uint = 0o040000;
const AE_IFLNK: c_uint = 0o120000;

// Status returned when a path cannot be handed to the C library.
const FATAL: c_int = -30;

#[link(name = "archive")]
unsafe extern "C" {
    fn archive_read_new() -> *mut c_void;
    fn archive_read_support_filter_all(a: *mut c_void) -> c_int;
    fn archive_read_support_format_all(a: *mut c_void) -> c_int;
    fn archive_read_support_format_7zip(a: *mut c_void) -> c_int;
    fn archive_read_open_filename(
        a: *mut c_void,
        filename: *const c_char,
        block_size: usize,
    ) -> c_int;
    fn archive_read_next_header(a: *mut c_void, entry: *mut *mut c_void) -> c_int;
    fn archive_read_data_skip(a: *mut c_void) -> c_int;
    fn archive_read_data_block(
        a: *mut c_void,
        buff: *mut *const c_void,
        size: *mut usize,
        offset: *mut i64,
    ) -> c_int;
    fn archive_read_free(a: *mut c_void) -> c_int;

    fn archive_entry_pathname(e: *mut c_void) -> *const c_char;
    fn archive_entry_size(e: *mut c_void) -> i64;
    fn archive_entry_filetype(e: *mut c_void) -> c_uint;
    fn archive_entry_perm(e: *mut c_void) -> c_uint;

    fn archive_write_disk_new() -> *mut c_void;
    fn archive_write_disk_set_options(a: *mut c_void, flags: c_int) -> c_int;
    fn archive_write_header(a: *mut c_void, e: *mut c_void) -> c_int;
    fn archive_write_data_block(
        a: *mut c_void,
        buff: *const c_void,
        size: usize,
        offset: i64,
    ) -> isize;
    fn archive_write_finish_entry(a: *mut c_void) -> c_int;
    fn archive_write_free(a: *mut c_void) -> c_int;
}

/// Owned archive-read handle.
pub struct SystemRead {
    raw: *mut c_void,
}

/// Transient entry handle, owned by the codec and reused on each advance.
pub struct SystemEntry {
    raw: *mut c_void,
}

/// Owned write-to-disk handle.
pub struct SystemWrite {
    raw: *mut c_void,
}

/// The system libarchive library as a [`Gateway`].
///
/// Zero-sized; cloning is free. Handles produced by one `SystemGateway`
/// value are usable with any other, since all state lives in the native
/// library.
///
/// # Example
///
/// ```rust,no_run
/// use decant::{ReadSession, ReaderOptions, SystemGateway};
///
/// # fn main() -> decant::Result<()> {
/// let mut session = ReadSession::open(SystemGateway, "a.7z", &ReaderOptions::new())?;
/// for entry in session.entries() {
///     println!("{}", entry?.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGateway;

impl Gateway for SystemGateway {
    type Read = SystemRead;
    type Entry = SystemEntry;
    type Write = SystemWrite;

    fn new_read_handle(&self) -> SystemRead {
        SystemRead {
            raw: unsafe { archive_read_new() },
        }
    }

    fn support_filter(&self, handle: &mut SystemRead, filter: Filter) -> RawStatus {
        let code = match filter {
            Filter::All => unsafe { archive_read_support_filter_all(handle.raw) },
        };
        RawStatus(code)
    }

    fn support_format(&self, handle: &mut SystemRead, format: Format) -> RawStatus {
        let code = match format {
            Format::All => unsafe { archive_read_support_format_all(handle.raw) },
            Format::SevenZip => unsafe { archive_read_support_format_7zip(handle.raw) },
        };
        RawStatus(code)
    }

    fn open_filename(&self, handle: &mut SystemRead, path: &Path, block_size: usize) -> RawStatus {
        let Ok(filename) = CString::new(path.to_string_lossy().as_bytes()) else {
            log::warn!("archive path contains an interior NUL byte");
            return RawStatus(FATAL);
        };
        let code =
            unsafe { archive_read_open_filename(handle.raw, filename.as_ptr(), block_size) };
        RawStatus(code)
    }

    fn next_header(&self, handle: &mut SystemRead) -> (RawStatus, Option<SystemEntry>) {
        let mut entry: *mut c_void = ptr::null_mut();
        let code = unsafe { archive_read_next_header(handle.raw, &mut entry) };
        if code == 0 && !entry.is_null() {
            (RawStatus(code), Some(SystemEntry { raw: entry }))
        } else {
            (RawStatus(code), None)
        }
    }

    fn skip_data(&self, handle: &mut SystemRead) -> RawStatus {
        RawStatus(unsafe { archive_read_data_skip(handle.raw) })
    }

    fn read_data_block<'a>(
        &self,
        handle: &'a mut SystemRead,
    ) -> (RawStatus, Option<DataBlock<'a>>) {
        let mut buff: *const c_void = ptr::null();
        let mut size: usize = 0;
        let mut offset: i64 = 0;
        let code =
            unsafe { archive_read_data_block(handle.raw, &mut buff, &mut size, &mut offset) };

        if code != 0 {
            return (RawStatus(code), None);
        }

        // SAFETY: on ARCHIVE_OK the library guarantees `buff` points at
        // `size` readable bytes that stay valid until the next read call on
        // this handle; the `&'a mut` borrow prevents that call while the
        // block is alive.
        let data = if size == 0 {
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts(buff as *const u8, size) }
        };
        (
            RawStatus(code),
            Some(DataBlock {
                data,
                offset: offset as u64,
            }),
        )
    }

    fn release_read(&self, handle: SystemRead) {
        unsafe {
            archive_read_free(handle.raw);
        }
    }

    fn entry_pathname(&self, entry: &SystemEntry) -> String {
        let name = unsafe { archive_entry_pathname(entry.raw) };
        if name.is_null() {
            String::new()
        } else {
            // SAFETY: libarchive returns a NUL-terminated string owned by
            // the entry handle; we copy it out immediately.
            unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()
        }
    }

    fn entry_size(&self, entry: &SystemEntry) -> u64 {
        let size = unsafe { archive_entry_size(entry.raw) };
        size.max(0) as u64
    }

    fn entry_kind(&self, entry: &SystemEntry) -> EntryKind {
        match unsafe { archive_entry_filetype(entry.raw) } {
            AE_IFREG => EntryKind::File,
            AE_IFDIR => EntryKind::Directory,
            AE_IFLNK => EntryKind::Symlink,
            _ => EntryKind::Other,
        }
    }

    fn entry_mode(&self, entry: &SystemEntry) -> u32 {
        unsafe { archive_entry_perm(entry.raw) }
    }

    fn new_write_handle(&self) -> SystemWrite {
        SystemWrite {
            raw: unsafe { archive_write_disk_new() },
        }
    }

    fn set_write_options(&self, handle: &mut SystemWrite, flags: WriteFlags) {
        unsafe {
            archive_write_disk_set_options(handle.raw, flags.bits());
        }
    }

    fn write_header(&self, handle: &mut SystemWrite, entry: &SystemEntry) -> RawStatus {
        RawStatus(unsafe { archive_write_header(handle.raw, entry.raw) })
    }

    fn write_data_block(&self, handle: &mut SystemWrite, data: &[u8], offset: u64) -> RawStatus {
        let written = unsafe {
            archive_write_data_block(
                handle.raw,
                data.as_ptr() as *const c_void,
                data.len(),
                offset as i64,
            )
        };
        // archive_write_data_block reports bytes written; negative values
        // are status codes.
        if written < 0 {
            RawStatus(written as i32)
        } else {
            RawStatus::OK
        }
    }

    fn finish_entry(&self, handle: &mut SystemWrite) -> RawStatus {
        RawStatus(unsafe { archive_write_finish_entry(handle.raw) })
    }

    fn release_write(&self, handle: SystemWrite) {
        unsafe {
            archive_write_free(handle.raw);
        }
    }
}
