// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting laid out paragraphs.

mod record;

pub(crate) use record::{PaintInput, record};

use peniko::kurbo::{BezPath, Point, Rect, Vec2};

use crate::font::Font;
use crate::layout::PositionedGlyph;
use crate::style::Brush;

/// Glyphs of one font and size to draw together.
#[derive(Copy, Clone, Debug)]
pub struct GlyphRun<'a> {
    /// Font of the glyphs.
    pub font: &'a Font,
    /// Font size.
    pub font_size: f32,
    /// Glyphs positioned relative to the origin of the run.
    pub glyphs: &'a [PositionedGlyph],
}

/// A drawing surface.
///
/// Coordinates are in paragraph space after the transforms applied with
/// [`translate`](Canvas::translate).
pub trait Canvas<B: Brush> {
    /// Saves the transform and clip.
    fn save(&mut self);

    /// Restores the most recently saved transform and clip.
    fn restore(&mut self);

    /// Translates subsequent drawing.
    fn translate(&mut self, offset: Vec2);

    /// Intersects the clip with `rect`.
    fn clip_rect(&mut self, rect: Rect);

    /// Draws `run` with its origin at `origin`.
    ///
    /// A positive `blur_radius` is only used for shadows.
    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>, origin: Point, brush: &B, blur_radius: f32);

    /// Fills `rect`.
    fn draw_rect(&mut self, rect: Rect, brush: &B);

    /// Strokes a straight line.
    fn draw_line(&mut self, p0: Point, p1: Point, width: f64, brush: &B);

    /// Strokes `path`.
    fn draw_path(&mut self, path: &BezPath, width: f64, brush: &B);
}

/// A recorded drawing operation.
#[derive(Clone, PartialEq, Debug)]
pub enum DrawCommand<B: Brush> {
    /// See [`Canvas::save`].
    Save,
    /// See [`Canvas::restore`].
    Restore,
    /// See [`Canvas::translate`].
    Translate(Vec2),
    /// See [`Canvas::clip_rect`].
    ClipRect(Rect),
    /// See [`Canvas::draw_glyph_run`].
    GlyphRun {
        /// Font of the glyphs.
        font: Font,
        /// Font size.
        font_size: f32,
        /// Glyphs relative to `origin`.
        glyphs: Vec<PositionedGlyph>,
        /// Origin of the run.
        origin: Point,
        /// Brush of the glyphs.
        brush: B,
        /// Blur radius.
        blur_radius: f32,
    },
    /// See [`Canvas::draw_rect`].
    Rect {
        /// Filled rectangle.
        rect: Rect,
        /// Fill brush.
        brush: B,
    },
    /// See [`Canvas::draw_line`].
    Line {
        /// Start point.
        p0: Point,
        /// End point.
        p1: Point,
        /// Stroke width.
        width: f64,
        /// Stroke brush.
        brush: B,
    },
    /// See [`Canvas::draw_path`].
    Path {
        /// Stroked path.
        path: BezPath,
        /// Stroke width.
        width: f64,
        /// Stroke brush.
        brush: B,
    },
}

/// A list of drawing operations that can be replayed into any canvas.
#[derive(Clone, PartialEq, Debug)]
pub struct DisplayList<B: Brush> {
    commands: Vec<DrawCommand<B>>,
}

impl<B: Brush> Default for DisplayList<B> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<B: Brush> DisplayList<B> {
    /// Creates an empty display list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded commands.
    pub fn commands(&self) -> &[DrawCommand<B>] {
        &self.commands
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Removes every command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Replays the recorded commands into `canvas`.
    pub fn replay<C: Canvas<B> + ?Sized>(&self, canvas: &mut C) {
        for command in &self.commands {
            match command {
                DrawCommand::Save => canvas.save(),
                DrawCommand::Restore => canvas.restore(),
                DrawCommand::Translate(offset) => canvas.translate(*offset),
                DrawCommand::ClipRect(rect) => canvas.clip_rect(*rect),
                DrawCommand::GlyphRun {
                    font,
                    font_size,
                    glyphs,
                    origin,
                    brush,
                    blur_radius,
                } => {
                    let run = GlyphRun {
                        font,
                        font_size: *font_size,
                        glyphs,
                    };
                    canvas.draw_glyph_run(&run, *origin, brush, *blur_radius);
                }
                DrawCommand::Rect { rect, brush } => canvas.draw_rect(*rect, brush),
                DrawCommand::Line {
                    p0,
                    p1,
                    width,
                    brush,
                } => canvas.draw_line(*p0, *p1, *width, brush),
                DrawCommand::Path { path, width, brush } => canvas.draw_path(path, *width, brush),
            }
        }
    }
}

impl<B: Brush> Canvas<B> for DisplayList<B> {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClipRect(rect));
    }

    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>, origin: Point, brush: &B, blur_radius: f32) {
        self.commands.push(DrawCommand::GlyphRun {
            font: run.font.clone(),
            font_size: run.font_size,
            glyphs: run.glyphs.to_vec(),
            origin,
            brush: brush.clone(),
            blur_radius,
        });
    }

    fn draw_rect(&mut self, rect: Rect, brush: &B) {
        self.commands.push(DrawCommand::Rect {
            rect,
            brush: brush.clone(),
        });
    }

    fn draw_line(&mut self, p0: Point, p1: Point, width: f64, brush: &B) {
        self.commands.push(DrawCommand::Line {
            p0,
            p1,
            width,
            brush: brush.clone(),
        });
    }

    fn draw_path(&mut self, path: &BezPath, width: f64, brush: &B) {
        self.commands.push(DrawCommand::Path {
            path: path.clone(),
            width,
            brush: brush.clone(),
        });
    }
}
