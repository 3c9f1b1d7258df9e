// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout types: lines, runs and query results.

pub(crate) mod alignment;
pub(crate) mod cluster;
pub(crate) mod data;
pub(crate) mod line_break;

use core::ops::Range;

use peniko::kurbo::Rect;

use crate::font::{Font, FontMetrics};
use crate::style::TextDirection;
use alignment::{LineFormat, VisualCluster, visual_clusters};
use data::{LayoutData, LineData, LineItemData, RunData};

pub use data::{BreakReason, BreakType, Glyph};

/// Side of a text position a caret is attached to.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum Affinity {
    /// The caret belongs to the character after the position.
    #[default]
    Downstream,
    /// The caret belongs to the character before the position.
    Upstream,
}

/// A byte offset in the paragraph text with an affinity.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct PositionWithAffinity {
    /// Byte offset.
    pub position: usize,
    /// Which side of `position` was hit.
    pub affinity: Affinity,
}

impl PositionWithAffinity {
    /// Creates a position.
    pub fn new(position: usize, affinity: Affinity) -> Self {
        Self { position, affinity }
    }
}

/// Vertical extent of the boxes returned by range queries.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum RectHeightStyle {
    /// The ascent and descent of each run.
    #[default]
    Tight,
    /// The ascent and descent of the line.
    Max,
    /// The whole line box, half leading included on both sides.
    IncludeLineSpacingMiddle,
    /// From the top of the line box to the bottom of the text.
    IncludeLineSpacingTop,
    /// From the top of the text to the bottom of the line box.
    IncludeLineSpacingBottom,
    /// The strut ascent and descent, or [`RectHeightStyle::Tight`] without a strut.
    Strut,
}

/// Horizontal extent of the boxes returned by range queries.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum RectWidthStyle {
    /// Boxes cover the selected glyphs only.
    #[default]
    Tight,
    /// Lines the range continues across are extended to the paragraph edges.
    Max,
}

/// A rectangle covering part of the text, with the direction of that text.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TextBox {
    /// Bounds in paragraph coordinates.
    pub rect: Rect,
    /// Direction of the covered text.
    pub direction: TextDirection,
}

/// Metrics of a laid out line.
#[derive(Clone, PartialEq, Debug)]
pub struct LineMetrics {
    /// Byte offset of the start of the line.
    pub start_index: usize,
    /// Byte offset of the end of the line, trailing whitespace included.
    pub end_index: usize,
    /// Byte offset of the end of the line before trailing whitespace.
    pub end_excluding_whitespace: usize,
    /// The line ends with a mandatory break.
    pub hard_break: bool,
    /// Distance from the baseline to the top of the text.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the text.
    pub descent: f32,
    /// Position of the baseline from the top of the paragraph.
    pub baseline: f32,
    /// Height of the line box.
    pub height: f32,
    /// Visible width of the line.
    pub width: f32,
    /// Position of the left edge of the visible line.
    pub left: f32,
    /// Index of the line.
    pub line_number: usize,
}

/// A glyph positioned in paragraph coordinates.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct PositionedGlyph {
    /// Glyph identifier.
    pub id: u32,
    /// Horizontal position of the glyph origin.
    pub x: f32,
    /// Vertical position of the glyph origin.
    pub y: f32,
}

/// A laid out line.
#[derive(Clone, Debug)]
pub struct Line<'a> {
    data: &'a LayoutData,
    line: &'a LineData,
    index: usize,
    clusters: Vec<VisualCluster>,
}

impl<'a> Line<'a> {
    pub(crate) fn new(data: &'a LayoutData, index: usize, format: LineFormat) -> Option<Self> {
        let line = data.lines.get(index)?;
        Some(Self {
            data,
            line,
            index,
            clusters: visual_clusters(data, line, format),
        })
    }

    /// Returns the index of the line.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the range of text of the line, trailing whitespace included.
    pub fn text_range(&self) -> Range<usize> {
        self.line.text_range.clone()
    }

    /// Returns the end of the text before trailing whitespace.
    pub fn trimmed_end(&self) -> usize {
        self.line.trimmed_end
    }

    /// Returns why the line ended.
    pub fn break_reason(&self) -> BreakReason {
        self.line.break_reason
    }

    /// Returns the visible width of the line, ellipsis included.
    pub fn advance(&self) -> f32 {
        self.line.advance
    }

    /// Returns the width of the trailing whitespace.
    pub fn trailing_whitespace(&self) -> f32 {
        self.line.trailing_whitespace
    }

    /// Returns the top of the line box.
    pub fn top(&self) -> f32 {
        self.line.top
    }

    /// Returns the position of the baseline.
    pub fn baseline(&self) -> f32 {
        self.line.baseline
    }

    /// Returns the height of the line box.
    pub fn height(&self) -> f32 {
        self.line.height()
    }

    /// Returns `true` if the line ends with an ellipsis.
    pub fn has_ellipsis(&self) -> bool {
        self.line.ellipsis.is_some()
    }

    /// Returns the runs of the line in visual order, left to right.
    pub fn runs(&self) -> impl Iterator<Item = Run<'_>> + '_ {
        self.line.item_range.clone().map(move |item_index| {
            let item = &self.data.line_items[item_index];
            let first = self.clusters.partition_point(|c| c.item < item_index);
            let last = self.clusters.partition_point(|c| c.item <= item_index);
            Run {
                data: self.data,
                run: &self.data.runs[item.run_index],
                item,
                clusters: &self.clusters[first..last],
                baseline: self.line.baseline,
            }
        })
    }
}

/// The part of a shaped run on one line.
#[derive(Clone, Debug)]
pub struct Run<'a> {
    data: &'a LayoutData,
    run: &'a RunData,
    item: &'a LineItemData,
    clusters: &'a [VisualCluster],
    baseline: f32,
}

impl Run<'_> {
    /// Returns the font of the run.
    pub fn font(&self) -> &Font {
        &self.data.fonts[self.run.font_index]
    }

    /// Returns the font size of the run.
    pub fn font_size(&self) -> f32 {
        self.run.font_size
    }

    /// Returns the range of text covered on this line.
    pub fn text_range(&self) -> Range<usize> {
        self.item.text_range.clone()
    }

    /// Returns the bidi level of the run on this line.
    pub fn bidi_level(&self) -> u8 {
        self.item.bidi_level
    }

    /// Returns `true` if the run is laid out right to left.
    pub fn is_rtl(&self) -> bool {
        self.item.bidi_level & 1 != 0
    }

    /// Returns `true` for the ellipsis appended to a truncated line.
    pub fn is_ellipsis(&self) -> bool {
        self.run.is_ellipsis
    }

    /// Returns the index of the placeholder for placeholder runs.
    pub fn placeholder(&self) -> Option<usize> {
        self.run.placeholder
    }

    /// Returns the metrics of the run.
    pub fn metrics(&self) -> &FontMetrics {
        &self.run.metrics
    }

    /// Returns the position of the left edge of the run.
    pub fn x(&self) -> f32 {
        self.clusters.first().map_or(0.0, |c| c.x)
    }

    /// Returns the width of the run on this line.
    pub fn advance(&self) -> f32 {
        self.item.advance
    }

    /// Returns the positioned glyphs of the run, in visual order.
    pub fn glyphs(&self) -> impl Iterator<Item = PositionedGlyph> + '_ {
        self.clusters.iter().flat_map(move |cluster| {
            let mut x = cluster.x;
            let glyphs = self.data.clusters[cluster.index].glyph_range.clone();
            self.data.glyphs[glyphs].iter().map(move |glyph| {
                let positioned = PositionedGlyph {
                    id: glyph.id,
                    x: x + glyph.x,
                    y: self.baseline + glyph.y,
                };
                x += glyph.advance;
                positioned
            })
        })
    }
}
