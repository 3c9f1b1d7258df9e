// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unicode segmentation and bidi services.

mod bidi;

pub use bidi::{BidiOracle, UnicodeBidiOracle, reorder_visual};

use icu_properties::props::{GeneralCategory, GraphemeExtend, LineBreak, Script};
use icu_properties::{CodePointMapData, CodePointSetData, PropertyNamesShort};
use icu_segmenter::options::{LineBreakOptions, WordBreakInvariantOptions};
use icu_segmenter::{GraphemeClusterSegmenter, LineSegmenter, WordSegmenter};

/// The kind of boundaries a [`TextBreaker`] iterates over.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BreakKind {
    /// Line break opportunities (UAX #14).
    Line,
    /// Word boundaries (UAX #29).
    Word,
    /// Extended grapheme cluster boundaries (UAX #29).
    Grapheme,
}

/// Whether a boundary is mandatory.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum BreakStatus {
    /// A break opportunity.
    #[default]
    Soft,
    /// A mandatory break, after a line terminator.
    Hard,
}

/// Source of Unicode boundaries.
pub trait BreakOracle: Send + Sync {
    /// Returns the boundaries of `text` in ascending byte order, excluding the
    /// leading boundary at offset 0.
    ///
    /// Returns `None` when the segmenter for `kind` is unavailable.
    fn boundaries(&self, text: &str, kind: BreakKind) -> Option<Vec<(usize, BreakStatus)>>;
}

/// Iterator over the boundaries of one text, for one pass.
#[derive(Clone, Default, Debug)]
pub struct TextBreaker {
    boundaries: Vec<(usize, BreakStatus)>,
    next: usize,
    status: BreakStatus,
}

impl TextBreaker {
    /// Creates an empty breaker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the boundaries of `text`.
    ///
    /// Returns `false` if the oracle is unavailable, in which case the breaker
    /// yields no boundaries.
    pub fn initialize(&mut self, oracle: &dyn BreakOracle, text: &str, kind: BreakKind) -> bool {
        self.next = 0;
        self.status = BreakStatus::Soft;
        match oracle.boundaries(text, kind) {
            Some(boundaries) => {
                self.boundaries = boundaries;
                true
            }
            None => {
                log::warn!("{kind:?} break oracle unavailable");
                self.boundaries.clear();
                false
            }
        }
    }

    /// Returns the status of the most recently returned boundary.
    pub fn status(&self) -> BreakStatus {
        self.status
    }

    /// Returns `true` once every boundary has been returned.
    pub fn eof(&self) -> bool {
        self.next >= self.boundaries.len()
    }
}

impl Iterator for TextBreaker {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let (position, status) = *self.boundaries.get(self.next)?;
        self.next += 1;
        self.status = status;
        Some(position)
    }
}

/// A [`BreakOracle`] backed by ICU4X segmenters with compiled data.
#[derive(Copy, Clone, Default, Debug)]
pub struct IcuBreakOracle;

impl IcuBreakOracle {
    /// Creates the oracle.
    pub fn new() -> Self {
        Self
    }
}

impl BreakOracle for IcuBreakOracle {
    fn boundaries(&self, text: &str, kind: BreakKind) -> Option<Vec<(usize, BreakStatus)>> {
        let positions: Vec<usize> = match kind {
            BreakKind::Line => LineSegmenter::new_auto(LineBreakOptions::default())
                .segment_str(text)
                .collect(),
            BreakKind::Word => WordSegmenter::new_auto(WordBreakInvariantOptions::default())
                .segment_str(text)
                .collect(),
            BreakKind::Grapheme => GraphemeClusterSegmenter::new().segment_str(text).collect(),
        };
        Some(
            positions
                .into_iter()
                .filter(|&position| position > 0)
                .map(|position| {
                    let hard = kind == BreakKind::Line
                        && text[..position]
                            .chars()
                            .next_back()
                            .is_some_and(is_line_terminator);
                    let status = if hard {
                        BreakStatus::Hard
                    } else {
                        BreakStatus::Soft
                    };
                    (position, status)
                })
                .collect(),
        )
    }
}

/// Returns `true` for characters with a mandatory line break after them.
pub fn is_line_terminator(ch: char) -> bool {
    matches!(
        CodePointMapData::<LineBreak>::new().get(ch),
        LineBreak::MandatoryBreak
            | LineBreak::CarriageReturn
            | LineBreak::LineFeed
            | LineBreak::NextLine
    )
}

/// Returns `true` for whitespace, control characters and non-spacing marks.
pub(crate) fn is_whitespace_like(ch: char) -> bool {
    ch.is_whitespace()
        || ch.is_control()
        || CodePointMapData::<GeneralCategory>::new().get(ch) == GeneralCategory::NonspacingMark
}

/// Returns `true` for code points that attach to the preceding base.
pub(crate) fn is_combining(ch: char) -> bool {
    ch == '\u{200D}'
        || matches!(
            CodePointMapData::<GeneralCategory>::new().get(ch),
            GeneralCategory::NonspacingMark
                | GeneralCategory::SpacingMark
                | GeneralCategory::EnclosingMark
        )
        || CodePointSetData::new::<GraphemeExtend>().contains(ch)
}

pub(crate) fn script_of(ch: char) -> Script {
    CodePointMapData::<Script>::new().get(ch)
}

/// Returns `true` for scripts that take on the script of surrounding text.
pub(crate) fn is_neutral_script(script: Script) -> bool {
    matches!(script, Script::Common | Script::Inherited | Script::Unknown)
}

/// Returns the ISO 15924 tag of `script`, `Zyyy` when it has none.
pub(crate) fn script_tag(script: Script) -> [u8; 4] {
    let mut tag = *b"Zyyy";
    if let Some(name) = PropertyNamesShort::<Script>::new().get(script) {
        if name.len() == 4 {
            tag.copy_from_slice(name.as_bytes());
        }
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_boundaries_mark_terminators_hard() {
        let mut breaker = TextBreaker::new();
        assert!(breaker.initialize(&IcuBreakOracle, "ab cd\nef", BreakKind::Line));
        let mut found = Vec::new();
        while let Some(position) = breaker.next() {
            found.push((position, breaker.status()));
        }
        assert!(breaker.eof());
        assert_eq!(
            found,
            [
                (3, BreakStatus::Soft),
                (6, BreakStatus::Hard),
                (8, BreakStatus::Soft)
            ]
        );
    }

    #[test]
    fn graphemes_keep_combining_marks() {
        let text = "e\u{301}x";
        let boundaries = IcuBreakOracle
            .boundaries(text, BreakKind::Grapheme)
            .unwrap_or_default();
        let positions: Vec<usize> = boundaries.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, [3, 4]);
    }

    #[test]
    fn unavailable_oracle_yields_nothing() {
        struct Unavailable;
        impl BreakOracle for Unavailable {
            fn boundaries(&self, _: &str, _: BreakKind) -> Option<Vec<(usize, BreakStatus)>> {
                None
            }
        }
        let mut breaker = TextBreaker::new();
        assert!(!breaker.initialize(&Unavailable, "abc", BreakKind::Line));
        assert!(breaker.eof());
        assert_eq!(breaker.next(), None);
    }

    #[test]
    fn character_classes() {
        assert!(is_line_terminator('\n'));
        assert!(is_line_terminator('\u{2029}'));
        assert!(!is_line_terminator(' '));
        assert!(is_whitespace_like('\t'));
        assert!(is_whitespace_like('\u{301}'));
        assert!(!is_whitespace_like('a'));
        assert!(is_combining('\u{301}'));
        assert!(is_combining('\u{FE0F}'));
        assert!(!is_combining('a'));
        assert_eq!(&script_tag(script_of('a')), b"Latn");
        assert_eq!(&script_tag(script_of('\u{5d0}')), b"Hebr");
        assert!(is_neutral_script(script_of(' ')));
    }
}
