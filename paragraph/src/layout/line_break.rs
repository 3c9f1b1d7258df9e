// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking.

use core::ops::Range;

use super::data::{BreakReason, BreakType, ClusterData, Glyph, LayoutData, LineData, LineItemData};
use crate::builder::StyleBlock;
use crate::context::LayoutContext;
use crate::font::FontMetrics;
use crate::placeholder::Placeholder;
use crate::shape::shape_ellipsis;
use crate::style::{Brush, ParagraphStyle};
use crate::util::exceeds;

/// Everything line breaking reads besides the layout arena.
pub(crate) struct BreakLines<'a, B: Brush> {
    pub(crate) lcx: &'a LayoutContext,
    pub(crate) blocks: &'a [StyleBlock<B>],
    pub(crate) placeholders: &'a [Placeholder],
    pub(crate) style: &'a ParagraphStyle<B>,
    /// Grapheme boundaries, including `0` and the text length.
    pub(crate) graphemes: &'a [usize],
    /// Strut metrics, when the strut is enabled.
    pub(crate) strut: Option<&'a FontMetrics>,
    /// Metrics of an empty line in the default style.
    pub(crate) empty_metrics: FontMetrics,
    pub(crate) text_len: usize,
    pub(crate) max_width: f32,
}

/// Breaks the marked clusters of `data` into lines.
///
/// Returns `true` if text was cut by the maximum line count.
pub(crate) fn break_lines<B: Brush>(input: &BreakLines<'_, B>, data: &mut LayoutData) -> bool {
    data.clear_lines();
    let count = data.text_cluster_count();
    let mut lines = wrap(&data.clusters[..count], input.graphemes, input.max_width);

    let mut exceeded = false;
    if let Some(max_lines) = input.style.max_lines.map(|max| max.max(1)) {
        if lines.len() > max_lines {
            // A trailing empty line is not more text.
            exceeded = lines[max_lines - 1].0.end < count;
            lines.truncate(max_lines);
        }
    }
    let mut ellipsis = None;
    if exceeded && input.style.has_ellipsis() {
        if let Some((range, _)) = lines.last_mut() {
            ellipsis = Some(append_ellipsis(input, data, range));
        }
    }

    let last = lines.len().saturating_sub(1);
    let mut y = 0.0;
    for (index, (range, reason)) in lines.into_iter().enumerate() {
        let ellipsis = if index == last { ellipsis } else { None };
        let line = build_line(input, data, range, reason, ellipsis, y);
        y = line.bottom();
        data.lines.push(line);
    }
    exceeded
}

/// Greedily breaks `clusters` into ranges of clusters no wider than `max_width`.
fn wrap(
    clusters: &[ClusterData],
    graphemes: &[usize],
    max_width: f32,
) -> Vec<(Range<usize>, BreakReason)> {
    let count = clusters.len();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut width = 0.0;
    let mut last_break = None;
    // Leading whitespace stays with the first word of the line.
    let mut has_content = false;
    let mut i = 0;
    while i < count {
        let cluster = &clusters[i];
        // Whitespace hangs past the end of the line.
        if has_content && !cluster.is_whitespace && exceeds(width + cluster.advance, max_width) {
            let (end, reason) = match last_break {
                Some(end) => (end, BreakReason::Regular),
                None => (emergency_end(clusters, graphemes, start, i), BreakReason::Emergency),
            };
            lines.push((start..end, reason));
            start = end;
            i = end;
            width = 0.0;
            last_break = None;
            has_content = false;
            continue;
        }
        width += cluster.advance;
        has_content |= !cluster.is_whitespace;
        i += 1;
        match cluster.break_type {
            BreakType::HardLineBreak => {
                lines.push((start..i, BreakReason::Explicit));
                start = i;
                width = 0.0;
                last_break = None;
                has_content = false;
            }
            BreakType::SoftLineBreak if has_content => last_break = Some(i),
            BreakType::SoftLineBreak | BreakType::None => {}
        }
    }

    if start < count {
        let whitespace = clusters[start..].iter().all(|cluster| cluster.is_whitespace);
        match lines.last_mut() {
            Some((range, reason)) if whitespace && *reason != BreakReason::Explicit => {
                range.end = count;
                *reason = BreakReason::None;
            }
            _ => lines.push((start..count, BreakReason::None)),
        }
    } else if lines
        .last()
        .is_none_or(|(_, reason)| *reason == BreakReason::Explicit)
    {
        lines.push((count..count, BreakReason::None));
    }
    lines
}

/// Returns where to break inside a word when nothing before cluster `i` is a
/// break opportunity.
///
/// Prefers the last grapheme boundary on the line. The result is always past
/// `start`.
fn emergency_end(clusters: &[ClusterData], graphemes: &[usize], start: usize, i: usize) -> usize {
    let on_grapheme = |index: &usize| {
        graphemes
            .binary_search(&clusters[*index].text_range.start)
            .is_ok()
    };
    (start + 1..=i)
        .rev()
        .find(on_grapheme)
        .or_else(|| (i + 1..clusters.len()).find(on_grapheme))
        .unwrap_or(clusters.len())
}

/// Truncates `range` until the ellipsis fits after it, and pushes the
/// ellipsis run. Returns the run index.
fn append_ellipsis<B: Brush>(
    input: &BreakLines<'_, B>,
    data: &mut LayoutData,
    range: &mut Range<usize>,
) -> usize {
    let ellipsis = input.style.ellipsis.as_deref().unwrap_or_default();
    let clusters = &data.clusters[..data.text_cluster_count()];
    let style_index = clusters[range.clone()]
        .iter()
        .rev()
        .find(|cluster| !cluster.is_whitespace)
        .or_else(|| clusters.get(range.start))
        .map_or(0, |cluster| cluster.style_index);
    let style = input
        .blocks
        .get(style_index)
        .map_or(&input.style.text_style, |block| &block.style);
    let rtl = input.style.direction.is_rtl();
    let shaped = shape_ellipsis(input.lcx, ellipsis, style, rtl);

    let trimmed_width = |clusters: &[ClusterData]| -> f32 {
        let visible = clusters
            .iter()
            .rposition(|cluster| !cluster.is_whitespace)
            .map_or(0, |last| last + 1);
        clusters[..visible].iter().map(|cluster| cluster.advance).sum()
    };
    let mut end = range.end;
    while end > range.start
        && exceeds(
            trimmed_width(&clusters[range.start..end]) + shaped.advance,
            input.max_width,
        )
    {
        end -= 1;
    }
    while end > range.start && clusters[end - 1].is_whitespace {
        end -= 1;
    }
    if end < range.end {
        log::debug!("removed {} clusters to fit the ellipsis", range.end - end);
    }
    let offset = if end > range.start {
        clusters[end - 1].text_range.end
    } else {
        clusters[range.start].text_range.start
    };
    range.end = end;

    let cluster = u32::try_from(offset).unwrap_or(u32::MAX);
    let mut glyphs = shaped.glyphs;
    if rtl {
        reverse_clusters(&mut glyphs);
    }
    for glyph in &mut glyphs {
        glyph.cluster = cluster;
    }
    let level = u8::from(rtl);
    let run = data.push_run(
        &shaped.font,
        shaped.font_size,
        level,
        offset..offset,
        glyphs,
        shaped.metrics,
    );
    let cluster_index = data.clusters.len();
    let run_data = &mut data.runs[run];
    run_data.is_ellipsis = true;
    run_data.cluster_range = cluster_index..cluster_index + 1;
    data.clusters.push(ClusterData {
        run_index: run,
        glyph_range: run_data.glyph_range.clone(),
        text_range: offset..offset,
        advance: run_data.advance,
        style_index,
        is_whitespace: false,
        is_terminator: false,
        break_type: BreakType::None,
    });
    run
}

/// Reverses the order of glyph clusters, keeping the glyphs of each cluster
/// in order.
fn reverse_clusters(glyphs: &mut Vec<Glyph>) {
    let mut groups: Vec<&[Glyph]> = glyphs
        .chunk_by(|a, b| a.cluster == b.cluster)
        .collect();
    groups.reverse();
    let reversed = groups.concat();
    *glyphs = reversed;
}

fn build_line<B: Brush>(
    input: &BreakLines<'_, B>,
    data: &mut LayoutData,
    range: Range<usize>,
    break_reason: BreakReason,
    ellipsis: Option<usize>,
    top: f32,
) -> LineData {
    let base_level = u8::from(input.style.direction.is_rtl());
    let clusters = &data.clusters;
    let (start, end) = (range.start, range.end);
    let mut trimmed = end;
    while trimmed > start && clusters[trimmed - 1].is_whitespace {
        trimmed -= 1;
    }
    let text_start = clusters
        .get(start)
        .filter(|_| start < data.text_cluster_count())
        .map_or(input.text_len, |cluster| cluster.text_range.start);
    let text_end = |end: usize| {
        if end > start {
            clusters[end - 1].text_range.end
        } else {
            text_start
        }
    };
    let text_range = text_start..text_end(end);
    let trimmed_end = text_end(trimmed);
    let mut advance: f32 = clusters[start..trimmed].iter().map(|c| c.advance).sum();
    let trailing_whitespace = clusters[trimmed..end].iter().map(|c| c.advance).sum();

    let mut items: Vec<LineItemData> = Vec::new();
    for (index, cluster) in clusters[range.clone()].iter().enumerate() {
        let index = start + index;
        // Trailing whitespace takes the paragraph level.
        let level = if index >= trimmed {
            base_level
        } else {
            data.runs[cluster.run_index].bidi_level
        };
        match items.last_mut() {
            Some(item) if item.run_index == cluster.run_index && item.bidi_level == level => {
                item.cluster_range.end = index + 1;
                item.text_range.end = cluster.text_range.end;
                item.advance += cluster.advance;
            }
            _ => items.push(LineItemData {
                run_index: cluster.run_index,
                bidi_level: level,
                cluster_range: index..index + 1,
                text_range: cluster.text_range.clone(),
                advance: cluster.advance,
            }),
        }
    }
    if let Some(run_index) = ellipsis {
        let run = &data.runs[run_index];
        advance += run.advance;
        items.push(LineItemData {
            run_index,
            bidi_level: run.bidi_level,
            cluster_range: run.cluster_range.clone(),
            text_range: run.text_range.clone(),
            advance: run.advance,
        });
    }

    let (ascent, descent, leading) = line_metrics(input, data, start..trimmed, end, ellipsis);

    let levels: Vec<u8> = items.iter().map(|item| item.bidi_level).collect();
    let mut order = input.lcx.bidi.reorder_visual(&levels);
    if order.len() != items.len() {
        log::warn!("bidi oracle returned an invalid visual order");
        order = (0..items.len()).collect();
    }
    let item_start = data.line_items.len();
    data.line_items
        .extend(order.into_iter().filter_map(|index| items.get(index).cloned()));

    LineData {
        text_range,
        trimmed_end,
        cluster_range: range,
        trimmed_cluster_end: trimmed,
        item_range: item_start..data.line_items.len(),
        ascent,
        descent,
        leading,
        top,
        baseline: top + leading * 0.5 + ascent,
        advance,
        trailing_whitespace,
        break_reason,
        ellipsis,
    }
}

/// Returns the ascent, descent and leading of a line.
///
/// Placeholder runs get their metrics resolved against the text of the line.
fn line_metrics<B: Brush>(
    input: &BreakLines<'_, B>,
    data: &mut LayoutData,
    visible: Range<usize>,
    end: usize,
    ellipsis: Option<usize>,
) -> (f32, f32, f32) {
    // Whitespace-only lines are measured on their whitespace.
    let measured = if visible.is_empty() {
        visible.start..end
    } else {
        visible
    };
    let mut runs: Vec<usize> = Vec::new();
    for cluster in &data.clusters[measured] {
        if runs.last() != Some(&cluster.run_index) {
            runs.push(cluster.run_index);
        }
    }
    runs.extend(ellipsis);

    let mut text: Option<FontMetrics> = None;
    for &run in &runs {
        let run = &data.runs[run];
        if run.placeholder.is_some() {
            continue;
        }
        let m = text.get_or_insert(run.metrics);
        m.ascent = m.ascent.max(run.metrics.ascent);
        m.descent = m.descent.max(run.metrics.descent);
        m.leading = m.leading.max(run.metrics.leading);
    }
    let has_placeholders = runs.iter().any(|&run| data.runs[run].placeholder.is_some());
    let reference = text.unwrap_or(input.empty_metrics);
    let (mut ascent, mut descent, mut leading) = match text {
        Some(m) => (m.ascent, m.descent, m.leading),
        None if has_placeholders => (0.0, 0.0, 0.0),
        None => (
            input.empty_metrics.ascent,
            input.empty_metrics.descent,
            input.empty_metrics.leading,
        ),
    };
    for &run in &runs {
        let Some(index) = data.runs[run].placeholder else {
            continue;
        };
        let Some(placeholder) = input.placeholders.get(index) else {
            continue;
        };
        let (a, d) = placeholder.style.resolve(reference.ascent, reference.descent);
        let metrics = &mut data.runs[run].metrics;
        metrics.ascent = a;
        metrics.descent = d;
        ascent = ascent.max(a);
        descent = descent.max(d);
    }

    if let Some(strut) = input.strut {
        if input.style.strut.force_height {
            (ascent, descent, leading) = (strut.ascent, strut.descent, strut.leading);
        } else {
            ascent = ascent.max(strut.ascent);
            descent = descent.max(strut.descent);
            leading = leading.max(strut.leading);
        }
    }
    (ascent, descent, leading)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(advance: f32, whitespace: bool, break_type: BreakType, start: usize) -> ClusterData {
        ClusterData {
            run_index: 0,
            glyph_range: 0..0,
            text_range: start..start + 1,
            advance,
            style_index: 0,
            is_whitespace: whitespace,
            is_terminator: break_type == BreakType::HardLineBreak,
            break_type,
        }
    }

    fn clusters(text: &str) -> Vec<ClusterData> {
        let count = text.len();
        text.bytes()
            .enumerate()
            .map(|(i, byte)| {
                let break_type = match byte {
                    b'\n' => BreakType::HardLineBreak,
                    b' ' => BreakType::SoftLineBreak,
                    _ if i + 1 == count => BreakType::SoftLineBreak,
                    _ => BreakType::None,
                };
                let advance = if byte == b'\n' { 0.0 } else { 10.0 };
                cluster(advance, byte == b' ' || byte == b'\n', break_type, i)
            })
            .collect()
    }

    fn graphemes(len: usize) -> Vec<usize> {
        (0..=len).collect()
    }

    #[test]
    fn breaks_after_trailing_whitespace() {
        let lines = wrap(&clusters("AAAA BBBB"), &graphemes(9), 45.0);
        assert_eq!(
            lines,
            [(0..5, BreakReason::Regular), (5..9, BreakReason::None)]
        );
    }

    #[test]
    fn leading_whitespace_joins_the_first_word() {
        let lines = wrap(&clusters(" A"), &graphemes(2), 5.0);
        assert_eq!(lines, [(0..2, BreakReason::None)]);

        let lines = wrap(&clusters("  AA BB"), &graphemes(7), 45.0);
        assert_eq!(
            lines,
            [(0..5, BreakReason::Regular), (5..7, BreakReason::None)]
        );
    }

    #[test]
    fn long_words_break_in_emergency() {
        let lines = wrap(&clusters("AAAAAA"), &graphemes(6), 25.0);
        assert_eq!(
            lines,
            [
                (0..2, BreakReason::Emergency),
                (2..4, BreakReason::Emergency),
                (4..6, BreakReason::None)
            ]
        );
    }

    #[test]
    fn emergency_breaks_respect_graphemes() {
        // A grapheme spans clusters 1 and 2.
        let lines = wrap(&clusters("AAAA"), &[0, 1, 3, 4], 25.0);
        assert_eq!(lines[0], (0..1, BreakReason::Emergency));
        assert_eq!(lines[1], (1..3, BreakReason::Emergency));
    }

    #[test]
    fn hard_breaks_end_lines() {
        let lines = wrap(&clusters("ab\n\ncd\n"), &graphemes(7), f32::INFINITY);
        assert_eq!(
            lines,
            [
                (0..3, BreakReason::Explicit),
                (3..4, BreakReason::Explicit),
                (4..7, BreakReason::Explicit),
                (7..7, BreakReason::None)
            ]
        );
    }

    #[test]
    fn oversized_cluster_gets_its_own_line() {
        let mut clusters = clusters("A BC");
        clusters[2].advance = 100.0;
        let lines = wrap(&clusters, &graphemes(4), 30.0);
        assert_eq!(
            lines,
            [
                (0..2, BreakReason::Regular),
                (2..3, BreakReason::Emergency),
                (3..4, BreakReason::None)
            ]
        );
    }

    #[test]
    fn cluster_order_reverses_for_rtl() {
        let glyph = |id, cluster| Glyph {
            id,
            cluster,
            ..Glyph::default()
        };
        let mut glyphs = vec![glyph(1, 0), glyph(2, 0), glyph(3, 1), glyph(4, 2)];
        reverse_clusters(&mut glyphs);
        let ids: Vec<_> = glyphs.iter().map(|g| g.id).collect();
        assert_eq!(ids, [4, 3, 1, 2]);
    }
}
