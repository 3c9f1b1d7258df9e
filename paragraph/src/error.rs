// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// Error type for paragraph editing and font loading.
///
/// Carries a non-exhaustive [`ErrorKind`] plus the byte range and text length
/// involved, when relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The caller-provided byte range, for range errors.
    range: Range<usize>,

    /// The length in bytes of the text at the time of failure.
    len: usize,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`Error::len` reports source text length context; an `is_empty` method would be misleading and unused."
)]
impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The byte range provided by the caller.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The length in bytes of the text at the time of the error.
    pub fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn invalid_bounds(range: Range<usize>, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidBounds,
            range,
            len,
        }
    }

    pub(crate) fn invalid_range(range: Range<usize>, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidRange,
            range,
            len,
        }
    }

    pub(crate) fn not_on_char_boundary(range: Range<usize>, len: usize) -> Self {
        Self {
            kind: ErrorKind::NotOnCharBoundary,
            range,
            len,
        }
    }

    #[cfg(feature = "harfrust")]
    pub(crate) fn invalid_font_data(len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidFontData,
            range: 0..0,
            len,
        }
    }

    /// Checks that `range` is a valid char-aligned range into `text`.
    pub(crate) fn check_range(text: &str, range: &Range<usize>) -> Result<(), Self> {
        let len = text.len();
        if range.start > range.end {
            return Err(Self::invalid_range(range.clone(), len));
        }
        if range.end > len {
            return Err(Self::invalid_bounds(range.clone(), len));
        }
        if !text.is_char_boundary(range.start) || !text.is_char_boundary(range.end) {
            return Err(Self::not_on_char_boundary(range.clone(), len));
        }
        Ok(())
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::InvalidBounds => write!(
                f,
                "range {}..{} out of bounds for len {}",
                self.range.start, self.range.end, self.len
            ),
            ErrorKind::InvalidRange => write!(
                f,
                "invalid range {}..{}: start > end",
                self.range.start, self.range.end
            ),
            ErrorKind::NotOnCharBoundary => write!(
                f,
                "range {}..{} not on UTF-8 boundary",
                self.range.start, self.range.end
            ),
            ErrorKind::InvalidFontData => {
                write!(f, "font data of {} bytes could not be read", self.len)
            }
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Provided range indices were out of bounds relative to the text length.
    InvalidBounds,

    /// The provided range had `start > end`.
    InvalidRange,

    /// Either `start` or `end` was not aligned to a UTF-8 character boundary.
    NotOnCharBoundary,

    /// Font data could not be parsed.
    InvalidFontData,
}
