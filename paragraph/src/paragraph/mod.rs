// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paragraph layout driver.

mod query;

use core::cell::OnceCell;
use core::ops::Range;

use peniko::kurbo::{Rect, Vec2};

use crate::builder::StyleBlock;
use crate::context::LayoutContext;
use crate::error::Error;
use crate::font::FontMetrics;
use crate::layout::alignment::{self, Formatting};
use crate::layout::cluster::{build_clusters, grapheme_boundaries, intrinsic_widths, mark_breaks};
use crate::layout::data::LayoutData;
use crate::layout::line_break::{BreakLines, break_lines};
use crate::layout::Line;
use crate::paint::{self, Canvas, DisplayList, PaintInput};
use crate::placeholder::Placeholder;
use crate::shape::{ShapeInput, primary_font, run_metrics, shape_text};
use crate::style::{Brush, FontAttributes, ParagraphStyle, TextAlign};

/// Progress of a paragraph through the layout pipeline.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum LayoutState {
    /// Nothing is computed.
    #[default]
    Unknown,
    /// The text is shaped into runs.
    Shaped,
    /// The cluster table is built.
    Clusterized,
    /// Line break opportunities are marked.
    Marked,
    /// Lines are broken for the current width.
    LineBroken,
    /// Lines are aligned.
    Formatted,
    /// The painted output is recorded.
    Drawn,
}

/// A paragraph of styled text.
///
/// Call [`layout`](Self::layout) before querying metrics or painting.
#[derive(Debug)]
pub struct Paragraph<B: Brush> {
    text: String,
    blocks: Vec<StyleBlock<B>>,
    placeholders: Vec<Placeholder>,
    style: ParagraphStyle<B>,
    lcx: LayoutContext,
    data: LayoutData,
    /// Progress up to [`LayoutState::LineBroken`]. Later states are derived
    /// from the memoized fields.
    state: LayoutState,
    /// Bidi level of every byte of the text.
    levels: Vec<u8>,
    graphemes: Vec<usize>,
    strut: Option<FontMetrics>,
    empty_metrics: FontMetrics,
    width: f32,
    height: f32,
    longest_line: f32,
    min_intrinsic_width: f32,
    max_intrinsic_width: f32,
    exceeded: bool,
    words: OnceCell<Option<Vec<usize>>>,
    formatting: OnceCell<Formatting>,
    display_list: OnceCell<DisplayList<B>>,
}

impl<B: Brush> Paragraph<B> {
    pub(crate) fn new(
        style: ParagraphStyle<B>,
        lcx: LayoutContext,
        text: String,
        blocks: Vec<StyleBlock<B>>,
        placeholders: Vec<Placeholder>,
    ) -> Self {
        Self {
            text,
            blocks,
            placeholders,
            style,
            lcx,
            data: LayoutData::default(),
            state: LayoutState::Unknown,
            levels: Vec::new(),
            graphemes: Vec::new(),
            strut: None,
            empty_metrics: FontMetrics::default(),
            width: 0.0,
            height: 0.0,
            longest_line: 0.0,
            min_intrinsic_width: 0.0,
            max_intrinsic_width: 0.0,
            exceeded: false,
            words: OnceCell::new(),
            formatting: OnceCell::new(),
            display_list: OnceCell::new(),
        }
    }

    /// Returns the text of the paragraph.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the style blocks covering the text.
    pub fn style_blocks(&self) -> &[StyleBlock<B>] {
        &self.blocks
    }

    /// Returns the placeholders of the paragraph.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Returns the paragraph style.
    pub fn style(&self) -> &ParagraphStyle<B> {
        &self.style
    }

    /// Returns how far the layout pipeline has progressed.
    pub fn state(&self) -> LayoutState {
        if self.state < LayoutState::LineBroken {
            self.state
        } else if self.display_list.get().is_some() {
            LayoutState::Drawn
        } else if self.formatting.get().is_some() {
            LayoutState::Formatted
        } else {
            LayoutState::LineBroken
        }
    }

    /// Lays the paragraph out in lines of at most `width`.
    ///
    /// An infinite width never wraps. Repeated calls with the same width are
    /// no-ops.
    pub fn layout(&mut self, width: f32) {
        let width = if width.is_nan() { f32::INFINITY } else { width.max(0.0) };
        if self.state >= LayoutState::LineBroken {
            if width == self.width || (width - self.width).abs() <= f32::EPSILON {
                return;
            }
            self.invalidate(LayoutState::Marked);
        }
        self.width = width;
        if self.state < LayoutState::Shaped {
            self.shape();
        }
        if self.state < LayoutState::Clusterized {
            self.clusterize();
        }
        if self.state < LayoutState::Marked {
            self.mark();
        }
        self.break_lines();
    }

    /// Rolls the state back to at most `target`, dropping what depends on
    /// later stages.
    fn invalidate(&mut self, target: LayoutState) {
        self.display_list.take();
        if target < LayoutState::Formatted {
            self.formatting.take();
        }
        if target < LayoutState::Shaped {
            self.words.take();
        }
        if target < self.state {
            log::trace!("layout state {:?} -> {target:?}", self.state);
            self.state = target;
        }
    }

    fn shape(&mut self) {
        self.data.clear();
        self.resolve_metrics();
        let rtl = self.style.direction.is_rtl();
        if self.text.is_empty() {
            self.levels.clear();
        } else {
            self.levels = self.lcx.bidi.levels(&self.text, rtl);
            if self.levels.len() != self.text.len() {
                log::warn!("bidi oracle returned {} levels for {} bytes", self.levels.len(), self.text.len());
                self.levels = vec![u8::from(rtl); self.text.len()];
            }
            let input = ShapeInput {
                text: &self.text,
                blocks: &self.blocks,
                placeholders: &self.placeholders,
                levels: &self.levels,
                rtl,
            };
            shape_text(&self.lcx, &input, &mut self.data);
        }
        self.data.seal();
        self.advance_to(LayoutState::Shaped);
    }

    /// Resolves the strut and the metrics of an empty line.
    fn resolve_metrics(&mut self) {
        let fonts = &*self.lcx.fonts;
        let text_style = &self.style.text_style;
        let font = primary_font(fonts, &text_style.font_families, text_style.font_attributes());
        self.empty_metrics = run_metrics(&font, text_style);

        let strut = &self.style.strut;
        self.strut = strut.enabled.then(|| {
            let attributes = FontAttributes::new(
                text_style.font_width,
                strut.font_style,
                strut.font_weight,
            );
            let families = if strut.font_families.is_empty() {
                &text_style.font_families
            } else {
                &strut.font_families
            };
            let font = primary_font(fonts, families, attributes);
            let mut metrics = font.metrics(strut.font_size);
            if let Some(height) = strut.height {
                metrics = metrics.with_height(height * strut.font_size);
            }
            if let Some(leading) = strut.leading {
                metrics.leading = leading * strut.font_size;
            }
            metrics
        });
    }

    fn clusterize(&mut self) {
        if !self.text.is_empty() {
            build_clusters(&self.text, &self.blocks, &mut self.data);
        }
        self.advance_to(LayoutState::Clusterized);
    }

    fn mark(&mut self) {
        if self.text.is_empty() {
            self.graphemes = vec![0];
            (self.min_intrinsic_width, self.max_intrinsic_width) = (0.0, 0.0);
        } else {
            mark_breaks(&*self.lcx.breaks, &self.text, &mut self.data);
            self.graphemes = grapheme_boundaries(&*self.lcx.breaks, &self.text);
            (self.min_intrinsic_width, self.max_intrinsic_width) = intrinsic_widths(&self.data);
        }
        self.advance_to(LayoutState::Marked);
    }

    fn break_lines(&mut self) {
        let input = BreakLines {
            lcx: &self.lcx,
            blocks: &self.blocks,
            placeholders: &self.placeholders,
            style: &self.style,
            graphemes: &self.graphemes,
            strut: self.strut.as_ref(),
            empty_metrics: self.empty_metrics,
            text_len: self.text.len(),
            max_width: self.width,
        };
        self.exceeded = break_lines(&input, &mut self.data);
        self.height = self.data.lines.last().map_or(0.0, |line| line.bottom());
        self.longest_line = self
            .data
            .lines
            .iter()
            .map(|line| line.advance)
            .max_by(f32::total_cmp)
            .unwrap_or(0.0);
        self.formatting.take();
        self.display_list.take();
        self.advance_to(LayoutState::LineBroken);
    }

    fn advance_to(&mut self, state: LayoutState) {
        log::trace!("layout state {:?} -> {state:?}", self.state);
        self.state = state;
    }

    fn is_laid_out(&self) -> bool {
        self.state >= LayoutState::LineBroken
    }

    /// Returns the line alignment, computing it on first use.
    pub(crate) fn formatting(&self) -> &Formatting {
        self.formatting
            .get_or_init(|| alignment::format(&self.data, &self.style, self.width))
    }

    /// Paints the paragraph with its top left corner at `(x, y)`.
    ///
    /// The drawing is recorded on the first call and replayed afterwards.
    /// Does nothing before [`layout`](Self::layout).
    pub fn paint<C: Canvas<B> + ?Sized>(&self, canvas: &mut C, x: f32, y: f32) {
        let Some(list) = self.display_list() else {
            log::debug!("paint called before layout");
            return;
        };
        canvas.save();
        canvas.translate(Vec2::new(f64::from(x), f64::from(y)));
        list.replay(canvas);
        canvas.restore();
    }

    /// Returns the recorded drawing, recording it on first use.
    pub fn display_list(&self) -> Option<&DisplayList<B>> {
        if !self.is_laid_out() {
            return None;
        }
        Some(self.display_list.get_or_init(|| {
            let formatting = self.formatting();
            // Text cut without an ellipsis is clipped to the paragraph.
            let clip = (self.exceeded && self.data.lines.iter().all(|l| l.ellipsis.is_none()))
                .then(|| {
                    let width = if self.width.is_finite() {
                        self.width
                    } else {
                        formatting.width
                    };
                    Rect::new(0.0, 0.0, f64::from(width), f64::from(self.height))
                });
            paint::record(&PaintInput {
                data: &self.data,
                formatting,
                blocks: &self.blocks,
                default_style: &self.style.text_style,
                clip,
            })
        }))
    }

    /// Returns the width passed to the last [`layout`](Self::layout).
    pub fn max_width(&self) -> f32 {
        self.width
    }

    /// Returns the height of all lines.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the width of the widest line.
    pub fn longest_line(&self) -> f32 {
        self.longest_line
    }

    /// Returns the width of the widest unbreakable stretch of text.
    pub fn min_intrinsic_width(&self) -> f32 {
        self.min_intrinsic_width
    }

    /// Returns the width the paragraph takes without wrapping.
    pub fn max_intrinsic_width(&self) -> f32 {
        self.max_intrinsic_width
    }

    /// Returns the baseline of the first line.
    pub fn alphabetic_baseline(&self) -> f32 {
        self.data.lines.first().map_or(0.0, |line| line.baseline)
    }

    /// Returns the bottom of the text of the first line.
    pub fn ideographic_baseline(&self) -> f32 {
        self.data
            .lines
            .first()
            .map_or(0.0, |line| line.baseline + line.descent)
    }

    /// Returns `true` if text was cut by the maximum line count.
    pub fn did_exceed_max_lines(&self) -> bool {
        self.exceeded
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.data.lines.len()
    }

    /// Returns line `index`.
    pub fn get_line(&self, index: usize) -> Option<Line<'_>> {
        Line::new(&self.data, index, self.formatting().line(index))
    }

    /// Returns an iterator over the lines.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> + '_ {
        (0..self.line_count()).filter_map(|index| self.get_line(index))
    }

    /// Replaces `range` of the text with `replacement`.
    ///
    /// The style block containing `range.start` takes the inserted text.
    /// Placeholders overlapping `range` are removed.
    pub fn update_text(&mut self, range: Range<usize>, replacement: &str) -> Result<(), Error> {
        Error::check_range(&self.text, &range)?;
        let old_len = self.text.len();
        let inserted = replacement.len();
        let removed = range.len();
        let map = |offset: usize| {
            if offset <= range.start {
                offset
            } else if offset >= range.end {
                offset - removed + inserted
            } else {
                range.start + inserted
            }
        };
        self.text.replace_range(range.clone(), replacement);
        let fallback = self.blocks.first().map(|block| block.style.clone());
        for block in &mut self.blocks {
            block.range = map(block.range.start)..map(block.range.end);
        }
        if range.start == old_len {
            if let Some(last) = self.blocks.last_mut() {
                last.range.end = self.text.len();
            }
        }
        self.blocks.retain(|block| !block.range.is_empty());
        if self.blocks.is_empty() {
            let style = fallback.unwrap_or_else(|| self.style.text_style.clone());
            self.blocks.push(StyleBlock {
                range: 0..self.text.len(),
                style,
            });
        }
        self.placeholders.retain(|placeholder| {
            placeholder.range.end <= range.start || placeholder.range.start >= range.end
        });
        // Text inserted at a placeholder's start goes before it.
        for placeholder in &mut self.placeholders {
            if placeholder.range.start >= range.end {
                placeholder.range = placeholder.range.start - removed + inserted
                    ..placeholder.range.end - removed + inserted;
            }
        }
        self.invalidate(LayoutState::Unknown);
        Ok(())
    }

    /// Sets the font size of all text.
    pub fn update_font_size(&mut self, font_size: f32) {
        self.style.text_style.font_size = font_size;
        for block in &mut self.blocks {
            block.style.font_size = font_size;
        }
        self.invalidate(LayoutState::Unknown);
    }

    /// Sets the line alignment.
    pub fn update_text_align(&mut self, align: TextAlign) {
        self.style.align = align;
        self.invalidate(LayoutState::LineBroken);
    }

    /// Sets the brush of all text.
    pub fn update_foreground(&mut self, brush: B) {
        for block in &mut self.blocks {
            block.style.brush = brush.clone();
        }
        self.style.text_style.brush = brush;
        self.invalidate(LayoutState::Formatted);
    }

    /// Sets the background brush of all text.
    pub fn update_background(&mut self, brush: Option<B>) {
        for block in &mut self.blocks {
            block.style.background = brush.clone();
        }
        self.style.text_style.background = brush;
        self.invalidate(LayoutState::Formatted);
    }
}
