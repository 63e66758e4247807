//! Read sessions: scoped ownership of one archive-read handle and the
//! forward-only entry iteration protocol.
//!
//! A [`ReadSession`] owns exactly one native read handle from the moment it
//! is allocated until the session is closed or dropped, whichever comes
//! first. Release happens on every exit path: normal exhaustion, early
//! abandonment, and error propagation all go through the same `Drop`-backed
//! teardown.
//!
//! Iteration is single-pass and non-restartable. Each step the codec reuses
//! its entry handle, so the session snapshots entry metadata into an owned
//! [`Entry`] and keeps the raw handle to itself; advancing invalidates the
//! previous step's handle before the codec is touched again.

use std::path::Path;

use crate::config::ReaderOptions;
use crate::entry::Entry;
use crate::error::{Error, ExtractionPhase, Result};
use crate::gateway::{DataBlock, Gateway};
use crate::status::Status;

/// Where the session is in its lifecycle.
///
/// `Drained` and `Poisoned` are terminal: the codec is never advanced
/// again once either is reached. Closing is represented by the handle
/// itself being gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Entries may still be produced.
    Active,
    /// The codec signaled end-of-archive.
    Drained,
    /// The codec reported a failure; the session must not advance again.
    Poisoned,
}

/// A streaming read session over one archive.
///
/// Created by [`ReadSession::open`], which allocates the native handle,
/// configures filter and format support, and opens the file. Entries are
/// produced lazily and in container order by [`next_entry`][Self::next_entry]
/// or the [`entries`][Self::entries] iterator.
///
/// If a consumer examines an entry without reading its data, the session
/// discards the unread data automatically before the next advance, so plain
/// metadata walks need no extra calls.
///
/// # Example
///
/// ```rust,ignore
/// let mut session = ReadSession::open(gateway, "archive.7z", &ReaderOptions::new())?;
/// for entry in session.entries() {
///     let entry = entry?;
///     println!("{}: {} bytes", entry.name, entry.size);
/// }
/// // The native handle is released when `session` goes out of scope.
/// ```
pub struct ReadSession<G: Gateway> {
    gateway: G,
    handle: Option<G::Read>,
    /// Entry handle for the current step; invalidated on every advance.
    current: Option<G::Entry>,
    /// True while the current entry's data has not been consumed.
    pending_skip: bool,
    next_index: usize,
    state: SessionState,
}

impl<G: Gateway> ReadSession<G> {
    /// Opens a read session over the archive at `path`.
    ///
    /// Allocates the native read handle, enables the configured filter and
    /// format support, then opens the file with the configured block size.
    /// The handle is owned by the session from the moment it is allocated,
    /// so a failure partway through configuration or opening still releases
    /// it when the error unwinds.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBlockSize`] for a zero block size (checked before
    /// any handle is allocated), [`Error::Configure`] if the codec rejects
    /// a support call, [`Error::Open`] if the file cannot be opened or
    /// parsed as an archive.
    pub fn open<P: AsRef<Path>>(gateway: G, path: P, options: &ReaderOptions) -> Result<Self> {
        options.validate()?;
        let path = path.as_ref();
        log::debug!("reading through archive: {}", path.display());

        let handle = gateway.new_read_handle();
        let mut session = Self {
            handle: Some(handle),
            gateway,
            current: None,
            pending_skip: false,
            next_index: 0,
            state: SessionState::Active,
        };

        session.configure(options)?;
        session.open_file(path, options.block_size)?;
        Ok(session)
    }

    fn configure(&mut self, options: &ReaderOptions) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };

        let raw = self.gateway.support_filter(handle, options.filter);
        log::trace!("filter [{}] returned {}", options.filter, raw.code());
        if !raw.classify().is_ok() {
            return Err(Error::Configure {
                stage: "filter",
                code: raw.code(),
            });
        }

        let raw = self.gateway.support_format(handle, options.format);
        log::trace!("format [{}] returned {}", options.format, raw.code());
        if !raw.classify().is_ok() {
            return Err(Error::Configure {
                stage: "format",
                code: raw.code(),
            });
        }

        Ok(())
    }

    fn open_file(&mut self, path: &Path, block_size: usize) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };

        let raw = self.gateway.open_filename(handle, path, block_size);
        if !raw.classify().is_ok() {
            return Err(Error::Open {
                path: path.to_owned(),
                code: raw.code(),
            });
        }
        Ok(())
    }

    /// Advances to the next entry.
    ///
    /// Returns `Ok(Some(entry))` while entries remain, `Ok(None)` once the
    /// archive is exhausted. Any unread data of the previous entry is
    /// discarded first.
    ///
    /// After exhaustion or a failure the session is terminal: further calls
    /// return `Ok(None)` without touching the codec.
    ///
    /// # Errors
    ///
    /// [`Error::Iteration`] if the codec reports a failure while skipping
    /// or advancing.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        if self.state != SessionState::Active {
            return Ok(None);
        }

        // The previous step's entry handle is invalid from here on.
        self.current = None;
        if self.pending_skip {
            self.skip_entry_data()?;
        }

        let Some(handle) = self.handle.as_mut() else {
            return Ok(None);
        };

        let (raw, entry_handle) = self.gateway.next_header(handle);
        match raw.classify() {
            Status::Ok => {
                let Some(entry_handle) = entry_handle else {
                    self.state = SessionState::Poisoned;
                    return Err(Error::Iteration { code: raw.code() });
                };

                let entry = Entry {
                    name: self.gateway.entry_pathname(&entry_handle),
                    size: self.gateway.entry_size(&entry_handle),
                    kind: self.gateway.entry_kind(&entry_handle),
                    mode: self.gateway.entry_mode(&entry_handle),
                    index: self.next_index,
                };
                log::trace!("entry {}: {}", entry.index, entry.name);

                self.next_index += 1;
                self.current = Some(entry_handle);
                self.pending_skip = true;
                Ok(Some(entry))
            }
            Status::EndOfArchive => {
                log::debug!("archive exhausted after {} entries", self.next_index);
                self.state = SessionState::Drained;
                Ok(None)
            }
            Status::Failed(code) => {
                self.state = SessionState::Poisoned;
                Err(Error::Iteration { code })
            }
        }
    }

    /// Discards the unread remainder of the current entry's data.
    ///
    /// Issued automatically on the next advance when the consumer has not
    /// read the entry's data; calling it again for the same entry is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`Error::Iteration`] if the codec reports a failure while skipping.
    pub fn skip_entry_data(&mut self) -> Result<()> {
        if !self.pending_skip {
            return Ok(());
        }
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };

        self.pending_skip = false;
        let raw = self.gateway.skip_data(handle);
        match raw.classify() {
            Status::Ok | Status::EndOfArchive => Ok(()),
            Status::Failed(code) => {
                self.state = SessionState::Poisoned;
                Err(Error::Iteration { code })
            }
        }
    }

    /// Reads the next data block of the current entry.
    ///
    /// Returns `Ok(None)` when the entry's data is exhausted (or when no
    /// entry is current). The block borrows from the session and is valid
    /// until the next session call; the codec reuses its buffer.
    ///
    /// # Errors
    ///
    /// [`Error::Extraction`] with [`ExtractionPhase::ReadBlock`] if the
    /// codec reports a failure mid-stream. This poisons the session.
    pub fn read_data_block(&mut self) -> Result<Option<DataBlock<'_>>> {
        if self.current.is_none() || self.state != SessionState::Active {
            return Ok(None);
        }
        let Some(handle) = self.handle.as_mut() else {
            return Ok(None);
        };

        let (raw, block) = self.gateway.read_data_block(handle);
        match raw.classify() {
            Status::Ok => Ok(block),
            Status::EndOfArchive => {
                // Data fully consumed; nothing left to skip on advance.
                self.pending_skip = false;
                Ok(None)
            }
            Status::Failed(code) => {
                self.state = SessionState::Poisoned;
                self.pending_skip = false;
                Err(Error::Extraction {
                    phase: ExtractionPhase::ReadBlock,
                    code,
                })
            }
        }
    }

    /// Returns a lazy, forward-only iterator over the remaining entries.
    ///
    /// The iterator is fused: after exhaustion or a failure it yields
    /// `None` forever. Abandoning it early is fine; the session still
    /// releases its handle exactly once when it goes out of scope.
    pub fn entries(&mut self) -> Entries<'_, G> {
        Entries { session: self }
    }

    /// Returns true once the archive has been fully enumerated.
    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Drained
    }

    /// Closes the session, releasing the native handle eagerly.
    ///
    /// Dropping the session has the same effect; this method only makes
    /// the release point explicit.
    pub fn close(mut self) {
        self.release();
    }

    /// Entry handle for the current iteration step, if any.
    ///
    /// Only valid until the next advance; never exposed outside the crate.
    pub(crate) fn current_entry(&self) -> Option<&G::Entry> {
        self.current.as_ref()
    }

    fn release(&mut self) {
        // The entry handle is codec-owned memory tied to the read handle;
        // drop our reference to it before freeing the handle itself.
        self.current = None;
        if let Some(handle) = self.handle.take() {
            self.gateway.release_read(handle);
            log::trace!("released archive read handle");
        }
    }
}

impl<G: Gateway> Drop for ReadSession<G> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Lazy iterator over a session's remaining entries.
///
/// Created by [`ReadSession::entries`]. Single-pass: each item is produced
/// by advancing the underlying session, so interleaving this iterator with
/// direct session calls observes the same sequence.
pub struct Entries<'s, G: Gateway> {
    session: &'s mut ReadSession<G>,
}

impl<G: Gateway> Iterator for Entries<'_, G> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.session.next_entry().transpose()
    }
}

impl<G: Gateway> std::iter::FusedIterator for Entries<'_, G> {}
