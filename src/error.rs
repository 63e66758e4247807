//! Error types for archive session and extraction operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when enumerating or extracting archives, along with a
//! convenient [`Result<T>`] type alias.
//!
//! Errors are phase-tagged: a failure identifies whether configuration,
//! opening, iteration, or extraction went wrong, and carries the raw codec
//! status code where one exists, so the failing native operation can be
//! diagnosed without re-running it.
//!
//! # Example
//!
//! ```rust,no_run
//! use decant::Error;
//!
//! fn describe(error: &Error) {
//!     match error {
//!         Error::UnknownFormat(name) => {
//!             eprintln!("'{name}' is not a supported format selector");
//!         }
//!         Error::Open { path, code } => {
//!             eprintln!("cannot open {}: codec status {code}", path.display());
//!         }
//!         Error::Iteration { code } => {
//!             eprintln!("archive walk failed with codec status {code}");
//!         }
//!         other => eprintln!("{other}"),
//!     }
//! }
//! ```

use std::path::PathBuf;

/// A specialized `Result` type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which step of the extraction pump failed.
///
/// The pump alternates between the read side (pulling data blocks out of
/// the archive) and the write side (materializing them on disk); this enum
/// records which side, and which call, reported the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPhase {
    /// Reading the next data block from the entry's stream.
    ReadBlock,
    /// Writing the entry's header/metadata to the disk-write handle.
    WriteHeader,
    /// Writing a data block to the disk-write handle.
    WriteBlock,
    /// Finalizing the entry on the disk-write handle.
    FinishEntry,
}

impl std::fmt::Display for ExtractionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadBlock => write!(f, "reading a data block"),
            Self::WriteHeader => write!(f, "writing the entry header"),
            Self::WriteBlock => write!(f, "writing a data block"),
            Self::FinishEntry => write!(f, "finalizing the entry"),
        }
    }
}

/// The main error type for archive session and extraction operations.
///
/// Variants fall into the four phases a caller can observe:
///
/// | Phase | Variants |
/// |-------|----------|
/// | Configuration | [`UnknownFilter`][Self::UnknownFilter], [`UnknownFormat`][Self::UnknownFormat], [`InvalidBlockSize`][Self::InvalidBlockSize], [`Configure`][Self::Configure] |
/// | Open | [`Open`][Self::Open] |
/// | Iteration | [`Iteration`][Self::Iteration] |
/// | Extraction | [`Extraction`][Self::Extraction] |
///
/// None of these are retried automatically: archive corruption and format
/// errors are not transient. Native handles are still released when any of
/// them propagates; release is tied to scope, not to the success path.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A filter selector name outside the supported enumeration.
    ///
    /// Surfaced while parsing the selector, before any native handle is
    /// allocated or any file is touched.
    #[error("unknown filter selector '{0}' (supported: \"all\")")]
    UnknownFilter(String),

    /// A format selector name outside the supported enumeration.
    ///
    /// Surfaced while parsing the selector, before any native handle is
    /// allocated or any file is touched.
    #[error("unknown format selector '{0}' (supported: \"all\", \"7z\")")]
    UnknownFormat(String),

    /// The configured block size is not a positive byte count.
    #[error("block size must be a positive byte count")]
    InvalidBlockSize,

    /// The codec rejected a filter or format configuration call.
    ///
    /// `stage` names the configuration call (`"filter"` or `"format"`).
    #[error("failed to configure {stage} support: codec status {code}")]
    Configure {
        /// Which configuration call failed.
        stage: &'static str,
        /// Raw codec status code.
        code: i32,
    },

    /// The underlying file could not be opened or parsed as an archive.
    #[error("failed to open archive '{}': codec status {code}", path.display())]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Raw codec status code.
        code: i32,
    },

    /// The codec reported a failure while advancing to the next entry.
    ///
    /// Terminal for the session: no further entries will be produced, but
    /// the native handle is still released when the session goes out of
    /// scope.
    #[error("archive iteration failed: codec status {code}")]
    Iteration {
        /// Raw codec status code.
        code: i32,
    },

    /// The codec reported a failure during extraction.
    ///
    /// Terminal for the whole pour operation; no subsequent entries are
    /// extracted.
    #[error("extraction failed while {phase}: codec status {code}")]
    Extraction {
        /// Which step of the pump failed.
        phase: ExtractionPhase,
        /// Raw codec status code.
        code: i32,
    },
}
