//! Session configuration: filter/format selectors and reader options.
//!
//! Filters (decompression stages) and formats (container layouts) are
//! closed enumerations resolved to a single codec configuration call when a
//! session opens. The string surface (`"all"`, `"7z"`) exists for callers
//! holding selector names from configuration or a command line; an unknown
//! name fails during parsing, before any native handle is allocated.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Default block size in bytes for archive reads.
pub const DEFAULT_BLOCK_SIZE: usize = 10240;

/// Decompression filter support requested for a read session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Enable every filter the codec supports.
    #[default]
    All,
}

impl Filter {
    /// Returns the selector name for this filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            other => Err(Error::UnknownFilter(other.to_owned())),
        }
    }
}

/// Container format support requested for a read session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Enable every container format the codec supports.
    #[default]
    All,
    /// Restrict to the 7z container format.
    SevenZip,
}

impl Format {
    /// Returns the selector name for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::SevenZip => "7z",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "7z" => Ok(Self::SevenZip),
            other => Err(Error::UnknownFormat(other.to_owned())),
        }
    }
}

/// Options for opening a read session.
///
/// # Example
///
/// ```rust
/// use decant::{Format, ReaderOptions};
///
/// let options = ReaderOptions::new()
///     .block_size(64 * 1024)
///     .format(Format::SevenZip);
///
/// assert_eq!(options.block_size, 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Read block size in bytes. Must be positive.
    pub block_size: usize,
    /// Filter support to configure.
    pub filter: Filter,
    /// Format support to configure.
    pub format: Format,
}

impl ReaderOptions {
    /// Creates options with the default block size and "all" selectors.
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            filter: Filter::All,
            format: Format::All,
        }
    }

    /// Sets the read block size in bytes.
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the filter selector.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the format selector.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Validates the options.
    ///
    /// Runs before any native handle is allocated, so an invalid block
    /// size never touches the codec.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::InvalidBlockSize);
        }
        Ok(())
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::new()
    }
}
