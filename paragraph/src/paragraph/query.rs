// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset and coordinate queries.

use core::ops::Range;

use peniko::kurbo::Rect;

use super::Paragraph;
use crate::analysis::{BreakKind, TextBreaker};
use crate::layout::alignment::{VisualCluster, visual_clusters};
use crate::layout::data::LineData;
use crate::layout::{
    Affinity, BreakReason, LineMetrics, PositionWithAffinity, RectHeightStyle, RectWidthStyle,
    TextBox,
};
use crate::style::{Brush, TextDirection};
use crate::util::WIDTH_EPSILON;

/// A box being accumulated for a range query.
#[derive(Clone, Debug)]
struct PendingBox {
    run: usize,
    x0: f32,
    x1: f32,
    top: f32,
    bottom: f32,
    direction: TextDirection,
}

impl PendingBox {
    fn to_text_box(&self) -> TextBox {
        TextBox {
            rect: Rect::new(
                f64::from(self.x0),
                f64::from(self.top),
                f64::from(self.x1),
                f64::from(self.bottom),
            ),
            direction: self.direction,
        }
    }
}

impl<B: Brush> Paragraph<B> {
    /// Returns boxes covering `range` of the text, one per line and run.
    ///
    /// The range is extended to whole graphemes. Returns nothing before
    /// layout or for an empty range.
    pub fn get_rects_for_range(
        &self,
        range: Range<usize>,
        height_style: RectHeightStyle,
        width_style: RectWidthStyle,
    ) -> Vec<TextBox> {
        if !self.is_laid_out() {
            return Vec::new();
        }
        let formatting = self.formatting();
        if self.text.is_empty() {
            if range.start != 0 || range.end != 0 {
                return Vec::new();
            }
            return self
                .data
                .lines
                .first()
                .map(|line| {
                    let x = formatting.line(0).offset;
                    PendingBox {
                        run: 0,
                        x0: x,
                        x1: x,
                        top: line.top,
                        bottom: line.bottom(),
                        direction: self.style.direction,
                    }
                    .to_text_box()
                })
                .into_iter()
                .collect();
        }

        let len = self.text.len();
        let (start, end) = (range.start.min(len), range.end.min(len));
        if start >= end {
            return Vec::new();
        }
        let start = self.graphemes[self.graphemes.partition_point(|&g| g <= start) - 1];
        let end = self
            .graphemes
            .get(self.graphemes.partition_point(|&g| g < end))
            .copied()
            .unwrap_or(len);

        let edge = self.longest_line.max(formatting.width);
        let mut boxes = Vec::new();
        for (index, line) in self.data.lines.iter().enumerate() {
            if line.text_range.start >= end || line.text_range.end <= start {
                continue;
            }
            let format = formatting.line(index);
            let mut line_boxes: Vec<PendingBox> = Vec::new();
            for cluster in visual_clusters(&self.data, line, format) {
                let Some(pending) = self.cluster_box(line, cluster, start..end, height_style) else {
                    continue;
                };
                match line_boxes.last_mut() {
                    Some(last)
                        if last.run == pending.run
                            && last.direction == pending.direction
                            && (last.top - pending.top).abs() <= WIDTH_EPSILON
                            && (last.bottom - pending.bottom).abs() <= WIDTH_EPSILON
                            && pending.x0 >= last.x1 - WIDTH_EPSILON
                            && pending.x0 <= last.x1 + format.step + WIDTH_EPSILON =>
                    {
                        last.x1 = pending.x1;
                    }
                    _ => line_boxes.push(pending),
                }
            }
            if width_style == RectWidthStyle::Max && !line_boxes.is_empty() {
                self.extend_to_edges(&mut line_boxes, line, start..end, edge);
            }
            boxes.extend(line_boxes.iter().map(PendingBox::to_text_box));
        }
        boxes
    }

    /// Returns the part of `cluster` inside `range`, if any.
    fn cluster_box(
        &self,
        line: &LineData,
        cluster: VisualCluster,
        range: Range<usize>,
        height_style: RectHeightStyle,
    ) -> Option<PendingBox> {
        let data = &self.data;
        if cluster.index >= data.text_cluster_count() {
            return None;
        }
        let cluster_data = &data.clusters[cluster.index];
        if cluster_data.is_terminator {
            return None;
        }
        let text_range = cluster_data.text_range.clone();
        let (start, end) = (
            text_range.start.max(range.start),
            text_range.end.min(range.end),
        );
        if start >= end {
            return None;
        }
        let item = &data.line_items[cluster.item];
        let rtl = item.bidi_level & 1 != 0;
        let (mut x0, mut x1) = (cluster.x, cluster.x + cluster.advance);
        if start > text_range.start || end < text_range.end {
            // Ligatures are split in proportion to their bytes.
            let fraction = |offset: usize| {
                (offset - text_range.start) as f32 / text_range.len() as f32
            };
            let (from, to) = if rtl {
                (1.0 - fraction(end), 1.0 - fraction(start))
            } else {
                (fraction(start), fraction(end))
            };
            x0 = cluster.x + cluster.advance * from;
            x1 = cluster.x + cluster.advance * to;
        }
        let metrics = &data.runs[item.run_index].metrics;
        let baseline = line.baseline;
        let (top, bottom) = match height_style {
            RectHeightStyle::Tight => (baseline - metrics.ascent, baseline + metrics.descent),
            RectHeightStyle::Max => (baseline - line.ascent, baseline + line.descent),
            RectHeightStyle::IncludeLineSpacingMiddle => (line.top, line.bottom()),
            RectHeightStyle::IncludeLineSpacingTop => (line.top, baseline + line.descent),
            RectHeightStyle::IncludeLineSpacingBottom => (baseline - line.ascent, line.bottom()),
            RectHeightStyle::Strut => match &self.strut {
                Some(strut) => (baseline - strut.ascent, baseline + strut.descent),
                None => (baseline - metrics.ascent, baseline + metrics.descent),
            },
        };
        Some(PendingBox {
            run: item.run_index,
            x0,
            x1,
            top,
            bottom,
            direction: TextDirection::from_level(item.bidi_level),
        })
    }

    /// Adds boxes from the outermost boxes of a line to the paragraph edges
    /// on the sides the range continues past.
    fn extend_to_edges(
        &self,
        boxes: &mut Vec<PendingBox>,
        line: &LineData,
        range: Range<usize>,
        edge: f32,
    ) {
        let rtl = self.style.direction.is_rtl();
        let continues_after = range.end > line.text_range.end;
        let continues_before = range.start < line.text_range.start;
        let (Some(left), Some(right)) = (
            boxes.iter().min_by(|a, b| a.x0.total_cmp(&b.x0)).cloned(),
            boxes.iter().max_by(|a, b| a.x1.total_cmp(&b.x1)).cloned(),
        ) else {
            return;
        };
        // The trailing edge is on the right for LTR paragraphs.
        let (extend_right, extend_left) = if rtl {
            (continues_before, continues_after)
        } else {
            (continues_after, continues_before)
        };
        if extend_right && right.x1 < edge {
            boxes.push(PendingBox {
                run: usize::MAX,
                x0: right.x1,
                x1: edge,
                direction: self.style.direction,
                ..right
            });
        }
        if extend_left && left.x0 > 0.0 {
            boxes.insert(
                0,
                PendingBox {
                    run: usize::MAX,
                    x0: 0.0,
                    x1: left.x0,
                    direction: self.style.direction,
                    ..left
                },
            );
        }
    }

    /// Returns boxes covering every placeholder, in line and visual order.
    pub fn get_rects_for_placeholders(&self) -> Vec<TextBox> {
        if !self.is_laid_out() {
            return Vec::new();
        }
        let formatting = self.formatting();
        let data = &self.data;
        let mut boxes = Vec::new();
        for (index, line) in data.lines.iter().enumerate() {
            for cluster in visual_clusters(data, line, formatting.line(index)) {
                let item = &data.line_items[cluster.item];
                let run = &data.runs[item.run_index];
                if run.placeholder.is_none() {
                    continue;
                }
                let pending = PendingBox {
                    run: item.run_index,
                    x0: cluster.x,
                    x1: cluster.x + cluster.advance,
                    top: line.baseline - run.metrics.ascent,
                    bottom: line.baseline + run.metrics.descent,
                    direction: TextDirection::from_level(item.bidi_level),
                };
                boxes.push(pending.to_text_box());
            }
        }
        boxes
    }

    /// Returns the text position closest to `(dx, dy)`.
    ///
    /// Positions are never placed after a line terminator. Returns offset 0
    /// before layout.
    pub fn get_glyph_position_at_coordinate(&self, dx: f32, dy: f32) -> PositionWithAffinity {
        if !self.is_laid_out() || self.text.is_empty() {
            return PositionWithAffinity::default();
        }
        let lines = &self.data.lines;
        let Some(index) = lines
            .iter()
            .position(|line| dy < line.bottom())
            .or_else(|| lines.len().checked_sub(1))
        else {
            return PositionWithAffinity::default();
        };
        let line = &lines[index];
        let data = &self.data;
        let text_clusters = data.text_cluster_count();
        let clusters: Vec<VisualCluster> =
            visual_clusters(data, line, self.formatting().line(index))
                .into_iter()
                .filter(|c| c.index < text_clusters && !data.clusters[c.index].is_terminator)
                .collect();
        let Some(first) = clusters.first() else {
            return PositionWithAffinity::new(line.text_range.start, Affinity::Downstream);
        };
        let hit = clusters.iter().rev().find(|c| c.x <= dx).unwrap_or(first);

        let text_range = data.clusters[hit.index].text_range.clone();
        let mut graphemes: Vec<usize> = self
            .graphemes
            .iter()
            .copied()
            .filter(|&g| g > text_range.start && g < text_range.end)
            .collect();
        graphemes.insert(0, text_range.start);
        graphemes.push(text_range.end);
        let count = graphemes.len() - 1;
        let width = hit.advance / count as f32;
        let local = (dx - hit.x).max(0.0);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the quotient is non-negative and clamped to the grapheme count"
        )]
        let visual = if width > 0.0 {
            ((local / width) as usize).min(count - 1)
        } else {
            0
        };
        let mut before_middle = local - visual as f32 * width < width * 0.5;
        let rtl = data.line_items[hit.item].bidi_level & 1 != 0;
        let logical = if rtl { count - 1 - visual } else { visual };
        let (mut start, mut end) = (graphemes[logical], graphemes[logical + 1]);

        // A grapheme spanning several clusters is hit as a whole.
        let grapheme_start = self.graphemes[self.graphemes.partition_point(|&g| g <= start) - 1];
        let grapheme_end = self
            .graphemes
            .get(self.graphemes.partition_point(|&g| g < end))
            .copied()
            .unwrap_or(self.text.len());
        if grapheme_start < start || grapheme_end > end {
            let (x0, x1) = clusters
                .iter()
                .filter(|c| {
                    let range = &data.clusters[c.index].text_range;
                    range.start < grapheme_end && range.end > grapheme_start
                })
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(x0, x1), c| {
                    (x0.min(c.x), x1.max(c.x + c.advance))
                });
            before_middle = dx < (x0 + x1) * 0.5;
            (start, end) = (grapheme_start, grapheme_end);
        }
        if before_middle != rtl {
            PositionWithAffinity::new(start, Affinity::Downstream)
        } else {
            PositionWithAffinity::new(end, Affinity::Upstream)
        }
    }

    /// Returns the word containing `offset`.
    ///
    /// Offsets at or past the end of the text give the last word. Without a
    /// word break oracle the whole text is one word.
    pub fn get_word_boundary(&self, offset: usize) -> Range<usize> {
        let len = self.text.len();
        if len == 0 {
            return 0..0;
        }
        let words = self.words.get_or_init(|| {
            let mut breaker = TextBreaker::new();
            if !breaker.initialize(&*self.lcx.breaks, &self.text, BreakKind::Word) {
                return None;
            }
            let mut boundaries = vec![0];
            boundaries.extend(breaker);
            if boundaries.last() != Some(&len) {
                boundaries.push(len);
            }
            Some(boundaries)
        });
        let Some(words) = words else {
            return 0..len;
        };
        if offset >= len {
            return words[words.len() - 2]..len;
        }
        let index = words.partition_point(|&b| b <= offset) - 1;
        words[index]..words[index + 1]
    }

    /// Returns the metrics of every line.
    pub fn get_line_metrics(&self) -> Vec<LineMetrics> {
        if !self.is_laid_out() {
            return Vec::new();
        }
        let formatting = self.formatting();
        let rtl = self.style.direction.is_rtl();
        self.data
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let offset = formatting.line(index).offset;
                LineMetrics {
                    start_index: line.text_range.start,
                    end_index: line.text_range.end,
                    end_excluding_whitespace: line.trimmed_end,
                    hard_break: line.break_reason == BreakReason::Explicit,
                    ascent: line.ascent,
                    descent: line.descent,
                    baseline: line.baseline,
                    height: line.height(),
                    width: line.advance,
                    left: if rtl {
                        offset + line.trailing_whitespace
                    } else {
                        offset
                    },
                    line_number: index,
                }
            })
            .collect()
    }

    /// Returns the index of the line containing `offset`.
    pub fn get_line_number_at(&self, offset: usize) -> Option<usize> {
        let lines = &self.data.lines;
        lines
            .iter()
            .position(|line| line.text_range.contains(&offset))
            .or_else(|| {
                (offset == self.text.len())
                    .then(|| lines.len().checked_sub(1))
                    .flatten()
            })
    }
}
