//! # decant
//!
//! Streaming enumeration and extraction for archive containers.
//!
//! This crate wraps an external archive codec library behind the
//! [`Gateway`] trait and builds two things on top of it: a forward-only
//! [`ReadSession`] that walks an archive's entries without materializing
//! the archive in memory, and a [`Pour`] pump that extracts every entry
//! onto the filesystem block by block. Which formats and filters exist,
//! and how entry metadata is decoded, is entirely the codec's business;
//! this crate is about handle lifetimes, the iteration protocol, and
//! status-code handling.
//!
//! ## Quick Start
//!
//! ### Listing entries
//!
//! ```rust,ignore
//! use decant::{ReadSession, ReaderOptions, Format};
//!
//! let options = ReaderOptions::new().format(Format::SevenZip);
//! let mut session = ReadSession::open(gateway, "archive.7z", &options)?;
//!
//! for entry in session.entries() {
//!     let entry = entry?;
//!     println!("{}: {} bytes", entry.name, entry.size);
//! }
//! ```
//!
//! ### Extracting to disk
//!
//! ```rust,ignore
//! use decant::{Pour, ReaderOptions, WriteFlags};
//!
//! let flags = WriteFlags::TIME | WriteFlags::PERM;
//! for entry in Pour::open(gateway, "archive.7z", flags, &ReaderOptions::new())? {
//!     println!("extracted {}", entry?.name);
//! }
//! ```
//!
//! With the `libarchive` feature enabled, [`reader`] and [`pour`] provide
//! the same walks over the system libarchive library directly:
//!
//! ```rust,ignore
//! for entry in decant::reader("archive.7z")?.entries() {
//!     println!("{}", entry?.name);
//! }
//! ```
//!
//! ## Resource model
//!
//! Native handles are scoped: a [`ReadSession`] owns its read handle from
//! allocation to drop, and a [`Pour`] additionally owns its write-to-disk
//! handle the same way. Every exit path (exhaustion, early abandonment,
//! or a propagated error) releases each handle exactly once. Iteration is
//! single-pass and strictly sequential; the codec's transient entry handle
//! never escapes the session, so use-after-advance is unrepresentable.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Failures are phase-tagged
//! ([`Error`] identifies configuration, open, iteration, or extraction)
//! and carry the raw codec status code where one exists. Nothing is
//! retried: archive corruption is not transient.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `libarchive` | No | [`SystemGateway`] FFI bindings to the system libarchive library |

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod pour;
pub mod session;
pub mod status;

pub use config::{DEFAULT_BLOCK_SIZE, Filter, Format, ReaderOptions};
pub use entry::{Entry, EntryKind};
pub use error::{Error, ExtractionPhase, Result};
pub use gateway::{DataBlock, Gateway};
pub use pour::{Pour, WriteFlags};
pub use session::{Entries, ReadSession};
pub use status::{RawStatus, Status};

#[cfg(feature = "libarchive")]
pub use gateway::system::SystemGateway;

/// Opens a metadata-only walk over the archive at `path` with default
/// options, backed by the system libarchive library.
///
/// Equivalent to `ReadSession::open(SystemGateway, path, &ReaderOptions::new())`.
#[cfg(feature = "libarchive")]
pub fn reader<P: AsRef<std::path::Path>>(path: P) -> Result<ReadSession<SystemGateway>> {
    reader_with(path, &ReaderOptions::new())
}

/// Opens a metadata-only walk with explicit options, backed by the system
/// libarchive library.
#[cfg(feature = "libarchive")]
pub fn reader_with<P: AsRef<std::path::Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<ReadSession<SystemGateway>> {
    ReadSession::open(SystemGateway, path, options)
}

/// Extracts the archive at `path` into the current working directory with
/// default options, backed by the system libarchive library.
///
/// Returns the lazy [`Pour`] iterator; entries are only written to disk as
/// the iterator is consumed.
#[cfg(feature = "libarchive")]
pub fn pour<P: AsRef<std::path::Path>>(path: P) -> Result<Pour<SystemGateway>> {
    pour_with(path, WriteFlags::NONE, &ReaderOptions::new())
}

/// Extracts with explicit flags and options, backed by the system
/// libarchive library.
#[cfg(feature = "libarchive")]
pub fn pour_with<P: AsRef<std::path::Path>>(
    path: P,
    flags: WriteFlags,
    options: &ReaderOptions,
) -> Result<Pour<SystemGateway>> {
    Pour::open(SystemGateway, path, flags, options)
}
