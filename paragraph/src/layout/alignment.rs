// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::data::{BreakReason, LayoutData, LineData};
use crate::style::{Brush, ParagraphStyle, TextAlign};

/// Horizontal placement of one line.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub(crate) struct LineFormat {
    /// Position of the left edge of the first visual cluster.
    pub(crate) offset: f32,
    /// Extra space after every justification gap.
    pub(crate) step: f32,
}

/// Placement of every line of a layout.
#[derive(Clone, Default, Debug)]
pub(crate) struct Formatting {
    pub(crate) lines: Vec<LineFormat>,
    /// Width the lines were aligned in.
    pub(crate) width: f32,
}

impl Formatting {
    pub(crate) fn line(&self, index: usize) -> LineFormat {
        self.lines.get(index).copied().unwrap_or_default()
    }
}

/// Aligns the lines of `data` within `max_width`, or within the longest line
/// when the width is unbounded.
pub(crate) fn format<B: Brush>(
    data: &LayoutData,
    style: &ParagraphStyle<B>,
    max_width: f32,
) -> Formatting {
    let is_rtl = style.direction.is_rtl();
    let width = if max_width.is_finite() {
        max_width
    } else {
        data.lines
            .iter()
            .map(|line| line.advance)
            .max_by(f32::total_cmp)
            .unwrap_or(0.0)
    };
    let last = data.lines.len().saturating_sub(1);
    let lines = data
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let gaps = data.justify_gaps(line);
            let justifiable = index != last && line.break_reason != BreakReason::Explicit && gaps > 0;
            let free_space = width - line.advance;
            let mut format = LineFormat::default();
            if free_space > 0.0 {
                match style.effective_align(justifiable) {
                    TextAlign::Right => format.offset = free_space,
                    TextAlign::Center => format.offset = free_space * 0.5,
                    TextAlign::Justify => format.step = free_space / gaps as f32,
                    _ => {}
                }
            }
            // Trailing whitespace hangs off the visual start of RTL lines.
            if is_rtl {
                format.offset -= line.trailing_whitespace;
            }
            format
        })
        .collect();
    Formatting { lines, width }
}

/// A cluster placed on a line.
#[derive(Copy, Clone, Debug)]
pub(crate) struct VisualCluster {
    /// Index in the cluster arena.
    pub(crate) index: usize,
    /// Index in the line item arena.
    pub(crate) item: usize,
    pub(crate) x: f32,
    pub(crate) advance: f32,
}

/// Returns the clusters of `line` in visual order, left to right.
pub(crate) fn visual_clusters(
    data: &LayoutData,
    line: &LineData,
    format: LineFormat,
) -> Vec<VisualCluster> {
    let mut x = format.offset;
    let mut clusters = Vec::new();
    for item_index in line.item_range.clone() {
        let item = &data.line_items[item_index];
        let mut place = |index: usize| {
            let advance = data.clusters[index].advance;
            clusters.push(VisualCluster {
                index,
                item: item_index,
                x,
                advance,
            });
            x += advance;
            if data.is_justify_gap(line, index) {
                x += format.step;
            }
        };
        if item.bidi_level & 1 != 0 {
            item.cluster_range.clone().rev().for_each(&mut place);
        } else {
            item.cluster_range.clone().for_each(&mut place);
        }
    }
    clusters
}
