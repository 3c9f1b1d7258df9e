// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typefaces, font handles and font matching.

mod collection;
mod matching;
#[cfg(feature = "harfrust")]
mod opentype;

use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::style::FontAttributes;

pub use collection::{FontCollection, FontMatcher};
#[cfg(feature = "harfrust")]
pub use opentype::SkrifaFace;

/// Returns a process-wide unique typeface identifier.
pub fn next_typeface_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Vertical metrics of a font scaled to a font size.
///
/// Ascent and descent are both positive distances from the baseline. Decoration
/// offsets are measured from the baseline, positive downward.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
    /// Recommended additional spacing between lines.
    pub leading: f32,
    /// Offset of the top of the underline.
    pub underline_offset: f32,
    /// Thickness of the underline.
    pub underline_size: f32,
    /// Offset of the top of the strikethrough.
    pub strikethrough_offset: f32,
    /// Thickness of the strikethrough.
    pub strikethrough_size: f32,
}

impl FontMetrics {
    /// Returns the height of a line set with these metrics.
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.leading
    }

    /// Stretches ascent and descent so that they sum to `height`, dropping the leading.
    pub(crate) fn with_height(mut self, height: f32) -> Self {
        let natural = self.ascent + self.descent;
        if natural > 0.0 {
            let scale = height / natural;
            self.ascent *= scale;
            self.descent *= scale;
        } else {
            self.ascent = height;
        }
        self.leading = 0.0;
        self
    }
}

/// A typeface, provided by the font matching service.
pub trait Typeface: Send + Sync + fmt::Debug + Any {
    /// Unique identifier of the typeface.
    fn id(&self) -> u64;

    /// Family name used for matching.
    fn family_name(&self) -> &str;

    /// Width, style and weight of the typeface.
    fn attributes(&self) -> FontAttributes;

    /// Returns `true` if the typeface maps `ch` to a glyph.
    fn has_glyph(&self, ch: char) -> bool;

    /// Metrics at the given font size.
    fn metrics(&self, size: f32) -> FontMetrics;

    /// Upcast used by shaper adapters to reach their concrete typeface type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a [`Typeface`].
///
/// Handles compare equal when their typeface identifiers are equal.
#[derive(Clone)]
pub struct Font {
    face: Arc<dyn Typeface>,
}

impl Font {
    /// Creates a handle for the given typeface.
    pub fn new(face: impl Typeface) -> Self {
        Self {
            face: Arc::new(face),
        }
    }

    /// Creates a handle from an already shared typeface.
    pub fn from_arc(face: Arc<dyn Typeface>) -> Self {
        Self { face }
    }

    /// Returns the typeface.
    pub fn typeface(&self) -> &dyn Typeface {
        &*self.face
    }

    /// Returns the typeface identifier.
    pub fn id(&self) -> u64 {
        self.face.id()
    }

    /// Returns the metrics at the given font size.
    pub fn metrics(&self, size: f32) -> FontMetrics {
        self.face.metrics(size)
    }

    /// Returns `true` if the typeface maps `ch` to a glyph.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.face.has_glyph(ch)
    }

    /// Returns the font used when no typeface is available at all.
    ///
    /// It has no glyphs and approximates metrics from the font size.
    pub(crate) fn last_resort() -> Self {
        static LAST_RESORT: std::sync::OnceLock<Font> = std::sync::OnceLock::new();
        LAST_RESORT
            .get_or_init(|| Self::new(LastResortTypeface { id: next_typeface_id() }))
            .clone()
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Font {}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("id", &self.id())
            .field("family", &self.face.family_name())
            .finish()
    }
}

#[derive(Debug)]
struct LastResortTypeface {
    id: u64,
}

impl Typeface for LastResortTypeface {
    fn id(&self) -> u64 {
        self.id
    }

    fn family_name(&self) -> &str {
        ""
    }

    fn attributes(&self) -> FontAttributes {
        FontAttributes::default()
    }

    fn has_glyph(&self, _ch: char) -> bool {
        false
    }

    fn metrics(&self, size: f32) -> FontMetrics {
        FontMetrics {
            ascent: size * 0.8,
            descent: size * 0.2,
            leading: 0.0,
            underline_offset: size * 0.1,
            underline_size: size / 14.0,
            strikethrough_offset: -size * 0.3,
            strikethrough_size: size / 14.0,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fonts_compare_by_typeface_id() {
        let a = Font::last_resort();
        let b = Font::last_resort();
        assert_eq!(a, b);
        assert!(!a.has_glyph('a'));
    }

    #[test]
    fn with_height_keeps_ascent_descent_ratio() {
        let metrics = FontMetrics {
            ascent: 8.0,
            descent: 2.0,
            leading: 1.0,
            ..FontMetrics::default()
        };
        let stretched = metrics.with_height(20.0);
        assert_eq!(stretched.ascent, 16.0);
        assert_eq!(stretched.descent, 4.0);
        assert_eq!(stretched.leading, 0.0);
        assert_eq!(stretched.line_height(), 20.0);
    }
}
