// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use crate::analysis::is_combining;
use crate::font::{Font, FontCollection, FontMetrics, Typeface, next_typeface_id};
use crate::shape::{ShapeRequest, ShapedGlyph, Shaper};
use crate::style::{FontAttributes, ParagraphStyle, TextStyle};
use crate::{LayoutContext, Paragraph, ParagraphBuilder};

/// Brush identified by an arbitrary color value.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) struct ColorBrush(pub(crate) u32);

/// A synthetic typeface with square glyphs.
///
/// Every glyph is one em wide, except combining marks which have no advance.
/// The ascent is 0.8 em and the descent 0.2 em, so a line is exactly one em.
#[derive(Debug)]
pub(crate) struct FakeFace {
    id: u64,
    family: String,
    covers: fn(char) -> bool,
}

impl FakeFace {
    /// A face covering every character.
    pub(crate) fn new(family: &str) -> Self {
        Self::covering(family, |_| true)
    }

    /// A face covering the characters accepted by `covers`.
    pub(crate) fn covering(family: &str, covers: fn(char) -> bool) -> Self {
        Self {
            id: next_typeface_id(),
            family: family.to_owned(),
            covers,
        }
    }
}

impl Typeface for FakeFace {
    fn id(&self) -> u64 {
        self.id
    }

    fn family_name(&self) -> &str {
        &self.family
    }

    fn attributes(&self) -> FontAttributes {
        FontAttributes::default()
    }

    fn has_glyph(&self, ch: char) -> bool {
        (self.covers)(ch)
    }

    fn metrics(&self, size: f32) -> FontMetrics {
        FontMetrics {
            ascent: size * 0.8,
            descent: size * 0.2,
            leading: 0.0,
            underline_offset: size * 0.1,
            underline_size: size * 0.05,
            strikethrough_offset: -size * 0.3,
            strikethrough_size: size * 0.05,
        }
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }
}

/// Shapes one glyph per character, using the code point as glyph id.
///
/// Marks join the cluster of their base. Output is in visual order.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct FakeShaper;

impl Shaper for FakeShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        let face = request
            .font
            .typeface()
            .as_any()
            .downcast_ref::<FakeFace>();
        let mut glyphs = Vec::new();
        let mut cluster = request.range.start;
        for (offset, ch) in request.text[request.range.clone()].char_indices() {
            let mark = is_combining(ch);
            if !mark {
                cluster = request.range.start + offset;
            }
            let covered = face.is_some_and(|face| face.has_glyph(ch));
            glyphs.push(ShapedGlyph {
                id: if covered { u32::from(ch) } else { 0 },
                cluster,
                advance: if mark { 0.0 } else { request.font_size },
                ..ShapedGlyph::default()
            });
        }
        if request.rtl {
            glyphs.reverse();
        }
        glyphs
    }
}

pub(crate) const DEFAULT_FAMILY: &str = "Square";

pub(crate) struct TestEnv {
    lcx: LayoutContext,
    font_size: f32,
}

impl TestEnv {
    /// An environment with one face covering everything.
    pub(crate) fn new() -> Self {
        Self::with_faces(vec![FakeFace::new(DEFAULT_FAMILY)])
    }

    /// An environment with `faces`; the first one's family is the default.
    pub(crate) fn with_faces(faces: Vec<FakeFace>) -> Self {
        let mut collection = FontCollection::new();
        let default = faces.first().map(|face| face.family_name().to_owned());
        for face in faces {
            collection.register(Font::new(face));
        }
        if let Some(name) = default {
            collection.set_default_family(name);
        }
        let lcx = LayoutContext::new(Arc::new(collection), Arc::new(FakeShaper));
        Self {
            lcx,
            font_size: 10.0,
        }
    }

    pub(crate) fn lcx(&self) -> &LayoutContext {
        &self.lcx
    }

    pub(crate) fn set_lcx(&mut self, lcx: LayoutContext) {
        self.lcx = lcx;
    }

    /// The text style used by [`Self::paragraph_style`].
    pub(crate) fn text_style(&self) -> TextStyle<ColorBrush> {
        TextStyle {
            font_size: self.font_size,
            brush: ColorBrush(1),
            ..TextStyle::default()
        }
    }

    pub(crate) fn paragraph_style(&self) -> ParagraphStyle<ColorBrush> {
        ParagraphStyle {
            text_style: self.text_style(),
            ..ParagraphStyle::default()
        }
    }

    pub(crate) fn builder(&self, style: ParagraphStyle<ColorBrush>) -> ParagraphBuilder<ColorBrush> {
        ParagraphBuilder::new(style, self.lcx.clone())
    }

    /// Builds a paragraph of `text` in the default style.
    pub(crate) fn paragraph(&self, text: &str) -> Paragraph<ColorBrush> {
        self.paragraph_with(self.paragraph_style(), text)
    }

    /// Builds a paragraph of `text` with `style`.
    pub(crate) fn paragraph_with(
        &self,
        style: ParagraphStyle<ColorBrush>,
        text: &str,
    ) -> Paragraph<ColorBrush> {
        let mut builder = self.builder(style);
        builder.add_text(text);
        builder.build()
    }

    /// Builds and lays out a paragraph of `text` in the default style.
    pub(crate) fn layout(&self, text: &str, width: f32) -> Paragraph<ColorBrush> {
        let mut paragraph = self.paragraph(text);
        paragraph.layout(width);
        paragraph
    }
}
