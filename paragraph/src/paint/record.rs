// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{BezPath, Point, Rect};

use super::{Canvas, DisplayList, GlyphRun};
use crate::builder::StyleBlock;
use crate::font::FontMetrics;
use crate::layout::PositionedGlyph;
use crate::layout::alignment::{Formatting, visual_clusters};
use crate::layout::data::LayoutData;
use crate::style::{Brush, DecorationStyle, TextStyle};

/// The laid out paragraph to record.
pub(crate) struct PaintInput<'a, B: Brush> {
    pub(crate) data: &'a LayoutData,
    pub(crate) formatting: &'a Formatting,
    pub(crate) blocks: &'a [StyleBlock<B>],
    pub(crate) default_style: &'a TextStyle<B>,
    /// Clip applied to everything, when text overflows the maximum line count.
    pub(crate) clip: Option<Rect>,
}

/// Consecutive visual clusters of one run and one style.
struct Segment {
    run: usize,
    style: usize,
    line: usize,
    x0: f32,
    x1: f32,
    glyphs: Vec<PositionedGlyph>,
}

/// Records backgrounds, shadows, glyphs and decorations, in that order.
pub(crate) fn record<B: Brush>(input: &PaintInput<'_, B>) -> DisplayList<B> {
    let data = input.data;
    let segments = segments(input);
    let mut list = DisplayList::new();
    if let Some(clip) = input.clip {
        list.save();
        list.clip_rect(clip);
    }
    let style = |segment: &Segment| {
        input
            .blocks
            .get(segment.style)
            .map_or(input.default_style, |block| &block.style)
    };

    for segment in &segments {
        if let Some(background) = &style(segment).background {
            let line = &data.lines[segment.line];
            let rect = Rect::new(
                f64::from(segment.x0),
                f64::from(line.top),
                f64::from(segment.x1),
                f64::from(line.bottom()),
            );
            list.draw_rect(rect, background);
        }
    }
    for segment in &segments {
        let run = &data.runs[segment.run];
        let glyph_run = GlyphRun {
            font: &data.fonts[run.font_index],
            font_size: run.font_size,
            glyphs: &segment.glyphs,
        };
        let baseline = data.lines[segment.line].baseline;
        for shadow in &style(segment).shadows {
            let origin = Point::new(
                f64::from(segment.x0 + shadow.offset.0),
                f64::from(baseline + shadow.offset.1),
            );
            list.draw_glyph_run(&glyph_run, origin, &shadow.brush, shadow.blur_radius);
        }
    }
    for segment in &segments {
        let run = &data.runs[segment.run];
        let glyph_run = GlyphRun {
            font: &data.fonts[run.font_index],
            font_size: run.font_size,
            glyphs: &segment.glyphs,
        };
        let origin = Point::new(
            f64::from(segment.x0),
            f64::from(data.lines[segment.line].baseline),
        );
        list.draw_glyph_run(&glyph_run, origin, &style(segment).brush, 0.0);
    }
    for segment in &segments {
        let style = style(segment);
        let run = &data.runs[segment.run];
        decorate(
            &mut list,
            style,
            &run.metrics,
            run.font_size,
            segment,
            data.lines[segment.line].baseline,
        );
    }

    if input.clip.is_some() {
        list.restore();
    }
    list
}

fn segments<B: Brush>(input: &PaintInput<'_, B>) -> Vec<Segment> {
    let data = input.data;
    let mut segments: Vec<Segment> = Vec::new();
    for (index, line) in data.lines.iter().enumerate() {
        for cluster in visual_clusters(data, line, input.formatting.line(index)) {
            let item = &data.line_items[cluster.item];
            let cluster_data = &data.clusters[cluster.index];
            if data.runs[item.run_index].placeholder.is_some() || cluster_data.is_terminator {
                continue;
            }
            let continues = segments.last().is_some_and(|segment| {
                segment.line == index
                    && segment.run == item.run_index
                    && segment.style == cluster_data.style_index
            });
            if !continues {
                segments.push(Segment {
                    run: item.run_index,
                    style: cluster_data.style_index,
                    line: index,
                    x0: cluster.x,
                    x1: cluster.x,
                    glyphs: Vec::new(),
                });
            }
            let Some(segment) = segments.last_mut() else {
                continue;
            };
            let mut x = cluster.x - segment.x0;
            for glyph in &data.glyphs[cluster_data.glyph_range.clone()] {
                segment.glyphs.push(PositionedGlyph {
                    id: glyph.id,
                    x: x + glyph.x,
                    y: glyph.y,
                });
                x += glyph.advance;
            }
            segment.x1 = cluster.x + cluster.advance;
        }
    }
    segments
}

fn decorate<B: Brush>(
    list: &mut DisplayList<B>,
    style: &TextStyle<B>,
    metrics: &FontMetrics,
    font_size: f32,
    segment: &Segment,
    baseline: f32,
) {
    let decoration = &style.decoration;
    if decoration.lines.is_empty() || segment.x1 <= segment.x0 {
        return;
    }
    let brush = decoration.brush.as_ref().unwrap_or(&style.brush);
    let fallback_size = font_size / 18.0;
    let thickness = |size: f32| {
        let size = if size > 0.0 { size } else { fallback_size };
        size * decoration.thickness_multiplier
    };
    let mut lines = Vec::new();
    if decoration.lines.underline {
        let size = thickness(metrics.underline_size);
        lines.push((baseline + metrics.underline_offset + size * 0.5, size));
    }
    if decoration.lines.overline {
        let size = thickness(metrics.underline_size);
        lines.push((baseline - metrics.ascent + size * 0.5, size));
    }
    if decoration.lines.line_through {
        let size = thickness(metrics.strikethrough_size);
        lines.push((baseline + metrics.strikethrough_offset + size * 0.5, size));
    }
    let (x0, x1) = (f64::from(segment.x0), f64::from(segment.x1));
    for (y, size) in lines {
        let (y, size) = (f64::from(y), f64::from(size));
        if size <= 0.0 {
            continue;
        }
        match decoration.style {
            DecorationStyle::Solid => {
                list.draw_line(Point::new(x0, y), Point::new(x1, y), size, brush);
            }
            DecorationStyle::Double => {
                for y in [y, y + size * 2.0] {
                    list.draw_line(Point::new(x0, y), Point::new(x1, y), size, brush);
                }
            }
            DecorationStyle::Dotted | DecorationStyle::Dashed => {
                let (dash, gap) = if decoration.style == DecorationStyle::Dotted {
                    (size, size)
                } else {
                    (size * 3.0, size * 2.0)
                };
                let mut x = x0;
                while x < x1 {
                    let end = (x + dash).min(x1);
                    list.draw_line(Point::new(x, y), Point::new(end, y), size, brush);
                    x = end + gap;
                }
            }
            DecorationStyle::Wavy => {
                let wavelength = size * 4.0;
                let amplitude = size;
                let mut path = BezPath::new();
                path.move_to((x0, y));
                let mut x = x0;
                let mut up = true;
                while x < x1 {
                    let end = (x + wavelength * 0.5).min(x1);
                    let control = if up { y - amplitude } else { y + amplitude };
                    path.quad_to(((x + end) * 0.5, control), (end, y));
                    x = end;
                    up = !up;
                }
                list.draw_path(&path, size, brush);
            }
        }
    }
}
