// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich styling support.

mod brush;
mod font;

use core::hash::{Hash, Hasher};

pub use brush::*;
pub use font::{FontAttributes, FontStyle, FontWeight, FontWidth};

use crate::util::nearly_eq;

/// Alignment of the lines of a paragraph.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum TextAlign {
    /// Align content to the left edge.
    Left,
    /// Align content to the right edge.
    Right,
    /// Align each line centered within the paragraph.
    Center,
    /// Justify each line by spacing out words, except for the last line.
    Justify,
    /// This is [`TextAlign::Left`] for LTR text and [`TextAlign::Right`] for RTL text.
    #[default]
    Start,
    /// This is [`TextAlign::Right`] for LTR text and [`TextAlign::Left`] for RTL text.
    End,
}

/// Base direction of a paragraph or of a laid out box.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum TextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl TextDirection {
    /// Returns the direction for a bidi embedding level.
    pub fn from_level(level: u8) -> Self {
        if level & 1 != 0 {
            Self::Rtl
        } else {
            Self::Ltr
        }
    }

    /// Returns `true` for [`TextDirection::Rtl`].
    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }
}

/// Which decoration lines to draw.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct DecorationLines {
    /// Line below the baseline.
    pub underline: bool,
    /// Line above the ascent.
    pub overline: bool,
    /// Line through the middle of the text.
    pub line_through: bool,
}

impl DecorationLines {
    /// No decoration.
    pub const NONE: Self = Self {
        underline: false,
        overline: false,
        line_through: false,
    };

    /// Underline only.
    pub const UNDERLINE: Self = Self {
        underline: true,
        overline: false,
        line_through: false,
    };

    /// Returns `true` if no line is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.underline || self.overline || self.line_through)
    }
}

/// Stroke style of decoration lines.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum DecorationStyle {
    /// A single continuous line.
    #[default]
    Solid,
    /// Two parallel lines.
    Double,
    /// A dotted line.
    Dotted,
    /// A dashed line.
    Dashed,
    /// A wavy line.
    Wavy,
}

/// Text decoration.
#[derive(Clone, PartialEq, Debug)]
pub struct Decoration<B: Brush> {
    /// Lines to draw.
    pub lines: DecorationLines,
    /// Stroke style of the lines.
    pub style: DecorationStyle,
    /// Brush for the lines. Defaults to the text brush.
    pub brush: Option<B>,
    /// Multiplier applied to the font's decoration thickness.
    pub thickness_multiplier: f32,
}

impl<B: Brush> Default for Decoration<B> {
    fn default() -> Self {
        Self {
            lines: DecorationLines::NONE,
            style: DecorationStyle::Solid,
            brush: None,
            thickness_multiplier: 1.0,
        }
    }
}

/// Shadow painted behind the glyphs of a style.
#[derive(Clone, PartialEq, Debug)]
pub struct TextShadow<B: Brush> {
    /// Brush for the shadow glyphs.
    pub brush: B,
    /// Offset of the shadow from the glyphs.
    pub offset: (f32, f32),
    /// Blur radius, forwarded to the canvas.
    pub blur_radius: f32,
}

/// Style of a range of text.
#[derive(Clone, PartialEq, Debug)]
pub struct TextStyle<B: Brush> {
    /// Font families, in order of preference.
    pub font_families: Vec<String>,
    /// Font size.
    pub font_size: f32,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Font width.
    pub font_width: FontWidth,
    /// Font style.
    pub font_style: FontStyle,
    /// BCP 47 locale.
    pub locale: Option<String>,
    /// Brush for rendering text.
    pub brush: B,
    /// Brush for the background behind the text.
    pub background: Option<B>,
    /// Decoration lines.
    pub decoration: Decoration<B>,
    /// Shadows, painted in order before the text.
    pub shadows: Vec<TextShadow<B>>,
    /// Extra spacing after every cluster.
    pub letter_spacing: f32,
    /// Extra spacing after every space.
    pub word_spacing: f32,
    /// Line height as a multiple of the font size. `None` uses the font metrics.
    pub height: Option<f32>,
}

impl<B: Brush> Default for TextStyle<B> {
    fn default() -> Self {
        Self {
            font_families: Vec::new(),
            font_size: 14.0,
            font_weight: FontWeight::default(),
            font_width: FontWidth::default(),
            font_style: FontStyle::default(),
            locale: None,
            brush: B::default(),
            background: None,
            decoration: Decoration::default(),
            shadows: Vec::new(),
            letter_spacing: 0.0,
            word_spacing: 0.0,
            height: None,
        }
    }
}

impl<B: Brush> TextStyle<B> {
    /// Returns the font matching attributes of the style.
    pub fn font_attributes(&self) -> FontAttributes {
        FontAttributes::new(self.font_width, self.font_style, self.font_weight)
    }

    /// Returns the subset of the style that affects shaping.
    pub fn shaping_attributes(&self) -> ShapingAttributes {
        ShapingAttributes {
            font_families: self.font_families.clone(),
            font_size: self.font_size,
            attributes: self.font_attributes(),
            locale: self.locale.clone(),
            letter_spacing: self.letter_spacing,
            word_spacing: self.word_spacing,
            height: self.height,
        }
    }

    /// Returns `true` if both styles shape identically.
    ///
    /// Paint-only properties (brushes, decorations, shadows) are ignored.
    pub fn shapes_like(&self, other: &Self) -> bool {
        self.font_families == other.font_families
            && nearly_eq(self.font_size, other.font_size)
            && self.font_attributes() == other.font_attributes()
            && self.locale == other.locale
            && nearly_eq(self.letter_spacing, other.letter_spacing)
            && nearly_eq(self.word_spacing, other.word_spacing)
            && self.height.map(f32::to_bits) == other.height.map(f32::to_bits)
    }
}

/// The properties of a [`TextStyle`] that influence shaping.
#[derive(Clone, PartialEq, Debug)]
pub struct ShapingAttributes {
    /// Font families, in order of preference.
    pub font_families: Vec<String>,
    /// Font size.
    pub font_size: f32,
    /// Font matching attributes.
    pub attributes: FontAttributes,
    /// BCP 47 locale.
    pub locale: Option<String>,
    /// Extra spacing after every cluster.
    pub letter_spacing: f32,
    /// Extra spacing after every space.
    pub word_spacing: f32,
    /// Line height multiplier.
    pub height: Option<f32>,
}

impl Eq for ShapingAttributes {}

impl Hash for ShapingAttributes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font_families.hash(state);
        self.font_size.to_bits().hash(state);
        self.attributes.key().hash(state);
        self.locale.hash(state);
        self.letter_spacing.to_bits().hash(state);
        self.word_spacing.to_bits().hash(state);
        self.height.map(f32::to_bits).hash(state);
    }
}

/// Strut: a minimum (or forced) line height independent of the content.
#[derive(Clone, PartialEq, Debug)]
pub struct StrutStyle {
    /// Whether the strut applies.
    pub enabled: bool,
    /// Font families used to resolve the strut metrics.
    pub font_families: Vec<String>,
    /// Font size of the strut.
    pub font_size: f32,
    /// Line height as a multiple of the font size. `None` uses the font metrics.
    pub height: Option<f32>,
    /// Leading as a multiple of the font size. `None` uses the font leading.
    pub leading: Option<f32>,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Font style.
    pub font_style: FontStyle,
    /// When set, every line uses exactly the strut metrics.
    pub force_height: bool,
}

impl Default for StrutStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            font_families: Vec::new(),
            font_size: 14.0,
            height: None,
            leading: None,
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            force_height: false,
        }
    }
}

/// Paragraph-wide settings.
#[derive(Clone, PartialEq, Debug)]
pub struct ParagraphStyle<B: Brush> {
    /// Style used where no text style applies, and for empty paragraphs.
    pub text_style: TextStyle<B>,
    /// Strut settings.
    pub strut: StrutStyle,
    /// Line alignment.
    pub align: TextAlign,
    /// Base direction.
    pub direction: TextDirection,
    /// Maximum number of lines. `None` is unlimited.
    pub max_lines: Option<usize>,
    /// String appended to the last line when text is truncated by `max_lines`.
    pub ellipsis: Option<String>,
}

impl<B: Brush> Default for ParagraphStyle<B> {
    fn default() -> Self {
        Self {
            text_style: TextStyle::default(),
            strut: StrutStyle::default(),
            align: TextAlign::default(),
            direction: TextDirection::default(),
            max_lines: None,
            ellipsis: None,
        }
    }
}

impl<B: Brush> ParagraphStyle<B> {
    /// Returns the alignment with `Start`, `End` and a non justifiable line
    /// resolved to a physical side.
    pub(crate) fn effective_align(&self, justifiable: bool) -> TextAlign {
        let rtl = self.direction.is_rtl();
        match self.align {
            TextAlign::Start => start_for(rtl),
            TextAlign::End => {
                if rtl {
                    TextAlign::Left
                } else {
                    TextAlign::Right
                }
            }
            TextAlign::Justify if !justifiable => start_for(rtl),
            align => align,
        }
    }

    /// Returns `true` if an ellipsis is configured.
    pub(crate) fn has_ellipsis(&self) -> bool {
        self.ellipsis.as_deref().is_some_and(|e| !e.is_empty())
    }
}

fn start_for(rtl: bool) -> TextAlign {
    if rtl {
        TextAlign::Right
    } else {
        TextAlign::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_properties_do_not_affect_shaping() {
        let a = TextStyle::<[u8; 4]>::default();
        let mut b = a.clone();
        b.brush = [255, 0, 0, 255];
        b.decoration.lines = DecorationLines::UNDERLINE;
        b.background = Some([0, 0, 0, 255]);
        assert!(a.shapes_like(&b));
        assert_eq!(a.shaping_attributes(), b.shaping_attributes());

        b.font_size = 20.0;
        assert!(!a.shapes_like(&b));
    }

    #[test]
    fn start_and_end_follow_direction() {
        let mut style = ParagraphStyle::<()>::default();
        assert_eq!(style.effective_align(true), TextAlign::Left);
        style.direction = TextDirection::Rtl;
        assert_eq!(style.effective_align(true), TextAlign::Right);
        style.align = TextAlign::End;
        assert_eq!(style.effective_align(true), TextAlign::Left);
        style.align = TextAlign::Justify;
        assert_eq!(style.effective_align(true), TextAlign::Justify);
        assert_eq!(style.effective_align(false), TextAlign::Right);
    }
}
