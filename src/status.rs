//! Status-code classification for the codec gateway boundary.
//!
//! Every fallible gateway call reports its outcome as a flat integer drawn
//! from the native library's vocabulary. This module is the single place
//! where that integer space is folded into the three-way [`Status`] used by
//! the rest of the crate; no other module inspects raw codes.

/// Raw status integer returned by a codec gateway call.
///
/// The values follow the native library's convention: `0` is success, `1`
/// marks end-of-archive, and anything else (in practice, negative values)
/// is a failure whose code is preserved for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatus(pub i32);

impl RawStatus {
    /// The call completed successfully.
    pub const OK: RawStatus = RawStatus(0);

    /// No more entries (or, for a data read, no more blocks in this entry).
    pub const EOF: RawStatus = RawStatus(1);

    /// Classifies this raw code into the closed [`Status`] vocabulary.
    pub fn classify(self) -> Status {
        match self.0 {
            0 => Status::Ok,
            1 => Status::EndOfArchive,
            code => Status::Failed(code),
        }
    }

    /// Returns the underlying integer code.
    pub fn code(self) -> i32 {
        self.0
    }
}

impl From<i32> for RawStatus {
    fn from(code: i32) -> Self {
        RawStatus(code)
    }
}

/// Outcome of a codec gateway call, after classification.
///
/// This is the universal contract connecting the session and the pump to
/// the gateway: success, exhaustion, or a failure carrying the raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The call succeeded.
    Ok,
    /// The sequence (archive entries, or one entry's data blocks) is exhausted.
    EndOfArchive,
    /// The call failed with the given native status code.
    Failed(i32),
}

impl Status {
    /// Returns true for [`Status::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true for [`Status::EndOfArchive`].
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfArchive)
    }
}
