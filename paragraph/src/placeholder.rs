// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// Vertical alignment of a placeholder relative to its line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum PlaceholderAlignment {
    /// The baseline crosses the placeholder `baseline_offset` below its top.
    #[default]
    Baseline,
    /// The bottom of the placeholder sits on the baseline.
    AboveBaseline,
    /// The top of the placeholder sits on the baseline.
    BelowBaseline,
    /// The top of the placeholder is aligned with the top of the text.
    Top,
    /// The bottom of the placeholder is aligned with the bottom of the text.
    Bottom,
    /// The placeholder is centered on the text.
    Middle,
}

/// Size and alignment of an inline placeholder.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct PlaceholderStyle {
    /// Width reserved on the line.
    pub width: f32,
    /// Height of the placeholder.
    pub height: f32,
    /// Vertical alignment.
    pub alignment: PlaceholderAlignment,
    /// Distance from the top of the placeholder to the baseline, for
    /// [`PlaceholderAlignment::Baseline`].
    pub baseline_offset: f32,
}

impl PlaceholderStyle {
    /// Creates a style with the given size and alignment.
    pub fn new(width: f32, height: f32, alignment: PlaceholderAlignment) -> Self {
        Self {
            width,
            height,
            alignment,
            baseline_offset: height,
        }
    }

    /// Returns the ascent and descent of the placeholder given the ascent and
    /// descent of the surrounding text.
    pub(crate) fn resolve(&self, text_ascent: f32, text_descent: f32) -> (f32, f32) {
        let height = self.height;
        match self.alignment {
            PlaceholderAlignment::Baseline => (self.baseline_offset, height - self.baseline_offset),
            PlaceholderAlignment::AboveBaseline => (height, 0.0),
            PlaceholderAlignment::BelowBaseline => (0.0, height),
            PlaceholderAlignment::Top => (text_ascent, height - text_ascent),
            PlaceholderAlignment::Bottom => (height - text_descent, text_descent),
            PlaceholderAlignment::Middle => {
                let center = (text_ascent - text_descent) * 0.5;
                (center + height * 0.5, height * 0.5 - center)
            }
        }
    }
}

/// A placeholder occupying an object replacement character in the text.
#[derive(Clone, PartialEq, Debug)]
pub struct Placeholder {
    /// Byte range of the replacement character.
    pub range: Range<usize>,
    /// Size and alignment.
    pub style: PlaceholderStyle,
}

/// Character inserted in the text for every placeholder.
pub(crate) const REPLACEMENT_CHAR: char = '\u{FFFC}';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignments_resolve_against_text_metrics() {
        let (ascent, descent) = (8.0, 2.0);
        let resolve = |alignment| PlaceholderStyle::new(20.0, 12.0, alignment).resolve(ascent, descent);
        assert_eq!(resolve(PlaceholderAlignment::Baseline), (12.0, 0.0));
        assert_eq!(resolve(PlaceholderAlignment::BelowBaseline), (0.0, 12.0));
        assert_eq!(resolve(PlaceholderAlignment::Top), (8.0, 4.0));
        assert_eq!(resolve(PlaceholderAlignment::Bottom), (10.0, 2.0));
        assert_eq!(resolve(PlaceholderAlignment::Middle), (9.0, 3.0));
    }
}
