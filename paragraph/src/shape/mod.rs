// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaping orchestration: itemization, font selection and fallback.

mod cache;
#[cfg(feature = "harfrust")]
mod harfrust_shaper;

use core::cmp::Reverse;
use core::ops::Range;
use core::str::CharIndices;
use std::collections::BinaryHeap;

use icu_properties::props::Script;
use smallvec::{SmallVec, smallvec};

use crate::analysis::{is_combining, is_line_terminator, is_neutral_script, script_of, script_tag};
use crate::builder::StyleBlock;
use crate::context::LayoutContext;
use crate::font::{Font, FontMatcher, FontMetrics};
use crate::layout::data::{Glyph, LayoutData};
use crate::placeholder::Placeholder;
use crate::style::{Brush, FontAttributes, TextStyle};

pub use cache::ShapeCache;
#[cfg(feature = "harfrust")]
pub use harfrust_shaper::HarfrustShaper;

/// A request to shape one range of text with one font.
#[derive(Clone, Debug)]
pub struct ShapeRequest<'a> {
    /// The whole text. Context outside of `range` may be used by the shaper.
    pub text: &'a str,
    /// Byte range of `text` to shape.
    pub range: Range<usize>,
    /// Font to shape with.
    pub font: &'a Font,
    /// Font size.
    pub font_size: f32,
    /// Shape right to left.
    pub rtl: bool,
    /// ISO 15924 script tag.
    pub script: [u8; 4],
    /// BCP 47 locale.
    pub locale: Option<&'a str>,
}

/// A glyph produced by a [`Shaper`].
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct ShapedGlyph {
    /// Glyph identifier. Zero means the font has no glyph for the cluster.
    pub id: u32,
    /// Byte offset in [`ShapeRequest::text`] of the cluster the glyph belongs to.
    pub cluster: usize,
    /// Horizontal advance.
    pub advance: f32,
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset, positive downward.
    pub y: f32,
}

/// A glyph shaping engine.
pub trait Shaper: Send + Sync {
    /// Shapes `request.range` of `request.text`.
    ///
    /// Glyphs are returned in visual order. Every byte of the range must
    /// belong to the cluster of some glyph.
    fn shape(&self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph>;
}

/// The text and styles handed to the shaping orchestrator.
pub(crate) struct ShapeInput<'a, B: Brush> {
    pub(crate) text: &'a str,
    pub(crate) blocks: &'a [StyleBlock<B>],
    pub(crate) placeholders: &'a [Placeholder],
    /// Bidi level of every byte of `text`.
    pub(crate) levels: &'a [u8],
    pub(crate) rtl: bool,
}

/// Shapes the whole input into runs in text order.
pub(crate) fn shape_text<B: Brush>(
    lcx: &LayoutContext,
    input: &ShapeInput<'_, B>,
    data: &mut LayoutData,
) {
    if input.text.is_empty() {
        return;
    }
    if let Some(cache) = &lcx.shape_cache {
        let key = cache::ShapeKey::new(input, lcx.font_fallback);
        if cache.restore(&key, data) {
            return;
        }
        shape_items(lcx, input, data);
        cache.store(key, data);
    } else {
        shape_items(lcx, input, data);
    }
}

fn shape_items<B: Brush>(lcx: &LayoutContext, input: &ShapeInput<'_, B>, data: &mut LayoutData) {
    for item in itemize(input) {
        match item.placeholder {
            Some(index) => push_placeholder(input, index, &item, data),
            None => shape_item(lcx, input, &item, data),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Item {
    range: Range<usize>,
    /// Index of the style block the item starts in.
    block: usize,
    level: u8,
    script: Script,
    placeholder: Option<usize>,
}

/// One of the boundary streams merged by [`itemize`].
enum BoundarySource<'a> {
    /// Starts of style blocks that shape differently from their predecessor.
    Style { starts: Vec<usize>, next: usize },
    /// Changes between real scripts. Neutral characters never split.
    Script {
        chars: CharIndices<'a>,
        current: Option<Script>,
    },
    /// Changes of bidi level.
    Bidi { levels: &'a [u8], pos: usize },
    /// Both edges of every placeholder.
    Placeholder { edges: Vec<usize>, next: usize },
}

impl BoundarySource<'_> {
    /// Returns the next boundary of this source, in ascending order.
    fn advance(&mut self) -> Option<usize> {
        match self {
            Self::Style { starts, next }
            | Self::Placeholder {
                edges: starts,
                next,
            } => {
                let boundary = starts.get(*next).copied();
                *next += 1;
                boundary
            }
            Self::Script { chars, current } => {
                for (offset, ch) in chars.by_ref() {
                    let script = script_of(ch);
                    if is_neutral_script(script) {
                        continue;
                    }
                    match current {
                        Some(c) if *c == script => {}
                        Some(c) => {
                            *c = script;
                            return Some(offset);
                        }
                        None => *current = Some(script),
                    }
                }
                None
            }
            Self::Bidi { levels, pos } => {
                let mut i = *pos + 1;
                while i < levels.len() {
                    if levels[i] != levels[i - 1] {
                        *pos = i;
                        return Some(i);
                    }
                    i += 1;
                }
                *pos = levels.len();
                None
            }
        }
    }
}

/// Splits the text into maximal ranges of uniform shaping attributes, script,
/// bidi level and placeholder membership.
fn itemize<B: Brush>(input: &ShapeInput<'_, B>) -> Vec<Item> {
    let text = input.text;
    let mut sources = [
        BoundarySource::Style {
            starts: input
                .blocks
                .windows(2)
                .filter(|pair| !pair[0].style.shapes_like(&pair[1].style))
                .map(|pair| pair[1].range.start)
                .collect(),
            next: 0,
        },
        BoundarySource::Script {
            chars: text.char_indices(),
            current: None,
        },
        BoundarySource::Bidi {
            levels: input.levels,
            pos: 0,
        },
        BoundarySource::Placeholder {
            edges: input
                .placeholders
                .iter()
                .flat_map(|p| [p.range.start, p.range.end])
                .collect(),
            next: 0,
        },
    ];
    let mut heap = BinaryHeap::new();
    for (index, source) in sources.iter_mut().enumerate() {
        if let Some(boundary) = source.advance() {
            heap.push(Reverse((boundary, index)));
        }
    }
    let mut boundaries = vec![0];
    while let Some(Reverse((boundary, index))) = heap.pop() {
        if boundary < text.len() && boundaries.last().is_some_and(|&last| boundary > last) {
            boundaries.push(boundary);
        }
        if let Some(next) = sources[index].advance() {
            heap.push(Reverse((next, index)));
        }
    }
    boundaries.push(text.len());

    let default_script = text
        .chars()
        .map(script_of)
        .find(|&script| !is_neutral_script(script))
        .unwrap_or(Script::Latin);
    let mut script = default_script;
    let mut block = 0;
    let mut items = Vec::with_capacity(boundaries.len() - 1);
    for pair in boundaries.windows(2) {
        let range = pair[0]..pair[1];
        while block + 1 < input.blocks.len() && input.blocks[block].range.end <= range.start {
            block += 1;
        }
        if let Some(real) = text[range.clone()]
            .chars()
            .map(script_of)
            .find(|&script| !is_neutral_script(script))
        {
            script = real;
        }
        items.push(Item {
            level: input.levels.get(range.start).copied().unwrap_or(0),
            placeholder: input
                .placeholders
                .iter()
                .position(|p| p.range.start == range.start),
            range,
            block,
            script,
        });
    }
    items
}

fn push_placeholder<B: Brush>(
    input: &ShapeInput<'_, B>,
    index: usize,
    item: &Item,
    data: &mut LayoutData,
) {
    let style = &input.placeholders[index].style;
    let (ascent, descent) = style.resolve(0.0, 0.0);
    let glyph = Glyph {
        id: 0,
        x: 0.0,
        y: 0.0,
        advance: style.width,
        cluster: cluster_u32(item.range.start),
    };
    let metrics = FontMetrics {
        ascent,
        descent,
        ..FontMetrics::default()
    };
    let run = data.push_run(
        &Font::last_resort(),
        input.blocks[item.block].style.font_size,
        item.level,
        item.range.clone(),
        [glyph],
        metrics,
    );
    data.runs[run].placeholder = Some(index);
}

/// Glyphs of one source cluster, in visual order.
#[derive(Clone, Debug)]
struct GlyphGroup {
    text_range: Range<usize>,
    glyphs: SmallVec<[ShapedGlyph; 2]>,
    resolved: bool,
}

/// A shaped range whose glyphs all come from `font`.
#[derive(Debug)]
struct Piece {
    range: Range<usize>,
    font: Font,
    groups: Vec<GlyphGroup>,
}

fn shape_item<B: Brush>(
    lcx: &LayoutContext,
    input: &ShapeInput<'_, B>,
    item: &Item,
    data: &mut LayoutData,
) {
    let text = input.text;
    let style = &input.blocks[item.block].style;
    let script = script_tag(item.script);
    let rtl = item.level & 1 != 0;
    let request = |font: &Font, range: Range<usize>| -> Vec<GlyphGroup> {
        let request = ShapeRequest {
            text,
            range,
            font,
            font_size: style.font_size,
            rtl,
            script,
            locale: style.locale.as_deref(),
        };
        shape_groups(lcx, &request)
    };

    let mut selector = FontSelector::new(&*lcx.fonts, style, lcx.font_fallback);
    let mut pieces: Vec<Piece> = Vec::new();
    let mut unresolved = vec![item.range.clone()];
    let mut last_font = None;
    while !unresolved.is_empty() {
        let Some(font) = selector.select(text, &unresolved) else {
            break;
        };
        let mut remaining = Vec::new();
        for range in unresolved.drain(..) {
            let groups = request(&font, range);
            split_resolved(text, &font, groups, &mut pieces, &mut remaining);
        }
        unresolved = remaining;
        last_font = Some(font);
    }
    if !unresolved.is_empty() {
        let font = last_font.unwrap_or_else(|| {
            log::warn!("no typeface available for {:?}", item.range);
            Font::last_resort()
        });
        for range in unresolved {
            log::debug!("{range:?} left unresolved, shaped with {font:?}");
            let groups = request(&font, range.clone());
            pieces.push(Piece {
                range,
                font: font.clone(),
                groups,
            });
        }
    }

    if pieces.len() == 1 {
        // Resolved in one go: the shaped run covers the item as is.
        if let Some(piece) = pieces.pop() {
            push_piece(data, text, style, item, piece);
        }
        return;
    }
    pieces.sort_by_key(|piece| piece.range.start);
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match merged.last_mut() {
            Some(last) if last.font == piece.font && last.range.end == piece.range.start => {
                last.range.end = piece.range.end;
                last.groups.extend(piece.groups);
            }
            _ => merged.push(piece),
        }
    }
    let mut end = item.range.start;
    for piece in &merged {
        assert_eq!(
            piece.range.start, end,
            "shaped pieces do not tile item {:?}",
            item.range
        );
        end = piece.range.end;
    }
    assert_eq!(end, item.range.end, "shaped pieces do not cover item {:?}", item.range);
    for piece in merged {
        push_piece(data, text, style, item, piece);
    }
}

/// Shapes `request` and groups the glyphs by source cluster, in logical order.
fn shape_groups(lcx: &LayoutContext, request: &ShapeRequest<'_>) -> Vec<GlyphGroup> {
    let range = request.range.clone();
    let mut visual: Vec<GlyphGroup> = Vec::new();
    for glyph in lcx.shaper.shape(request) {
        let cluster = glyph.cluster.clamp(range.start, range.end);
        match visual.last_mut() {
            Some(group) if group.text_range.start == cluster => group.glyphs.push(glyph),
            _ => visual.push(GlyphGroup {
                text_range: cluster..cluster,
                glyphs: smallvec![glyph],
                resolved: true,
            }),
        }
    }
    if request.rtl {
        visual.reverse();
    }
    // Clusters out of logical order are folded into their predecessor.
    let mut groups: Vec<GlyphGroup> = Vec::with_capacity(visual.len());
    for group in visual {
        match groups.last_mut() {
            Some(last) if group.text_range.start <= last.text_range.start => {
                last.glyphs.extend(group.glyphs);
            }
            _ => groups.push(group),
        }
    }
    if groups.is_empty() {
        groups.push(GlyphGroup {
            text_range: range.clone(),
            glyphs: SmallVec::new(),
            resolved: false,
        });
    }
    let count = groups.len();
    for i in 0..count {
        let start = if i == 0 {
            range.start
        } else {
            groups[i].text_range.start
        };
        let end = groups
            .get(i + 1)
            .map_or(range.end, |next| next.text_range.start);
        let group = &mut groups[i];
        group.text_range = start..end;
        group.resolved = !group.glyphs.is_empty() && group.glyphs.iter().all(|g| g.id != 0);
    }
    groups
}

/// Sorts the groups of one shaping call into resolved pieces and unresolved
/// ranges.
fn split_resolved(
    text: &str,
    font: &Font,
    mut groups: Vec<GlyphGroup>,
    pieces: &mut Vec<Piece>,
    unresolved: &mut Vec<Range<usize>>,
) {
    let starts_with_mark = |group: &GlyphGroup| {
        text[group.text_range.clone()]
            .chars()
            .next()
            .is_some_and(is_combining)
    };
    // Marks stay with their base in both directions.
    for i in (1..groups.len()).rev() {
        if !groups[i].resolved && starts_with_mark(&groups[i]) {
            groups[i - 1].resolved = false;
        }
    }
    for i in 1..groups.len() {
        if !groups[i - 1].resolved && starts_with_mark(&groups[i]) {
            groups[i].resolved = false;
        }
    }
    for group in &mut groups {
        if !group.resolved
            && text[group.text_range.clone()]
                .chars()
                .all(|ch| ch.is_whitespace() || ch.is_control())
        {
            group.resolved = true;
        }
    }

    let mut current: Option<Piece> = None;
    for group in groups {
        if group.resolved {
            match &mut current {
                Some(piece) => {
                    piece.range.end = group.text_range.end;
                    piece.groups.push(group);
                }
                None => {
                    current = Some(Piece {
                        range: group.text_range.clone(),
                        font: font.clone(),
                        groups: vec![group],
                    });
                }
            }
        } else {
            pieces.extend(current.take());
            match unresolved.last_mut() {
                Some(last) if last.end == group.text_range.start => {
                    last.end = group.text_range.end;
                }
                _ => unresolved.push(group.text_range),
            }
        }
    }
    pieces.extend(current);
}

fn push_piece<B: Brush>(
    data: &mut LayoutData,
    text: &str,
    style: &TextStyle<B>,
    item: &Item,
    piece: Piece,
) {
    let metrics = run_metrics(&piece.font, style);
    let glyphs = spaced_glyphs(text, style, &piece.groups);
    data.push_run(
        &piece.font,
        style.font_size,
        item.level,
        piece.range,
        glyphs,
        metrics,
    );
}

/// Converts groups to arena glyphs, applying letter and word spacing.
///
/// Line terminators get no advance.
fn spaced_glyphs<B: Brush>(text: &str, style: &TextStyle<B>, groups: &[GlyphGroup]) -> Vec<Glyph> {
    let mut glyphs = Vec::with_capacity(groups.len());
    for group in groups {
        let source = &text[group.text_range.clone()];
        let is_terminator = source.chars().next_back().is_some_and(is_line_terminator);
        let is_space = !source.is_empty() && source.chars().all(|ch| ch == ' ' || ch == '\u{a0}');
        let cluster = cluster_u32(group.text_range.start);
        let last = group.glyphs.len().saturating_sub(1);
        for (i, g) in group.glyphs.iter().enumerate() {
            let mut advance = if is_terminator { 0.0 } else { g.advance };
            if i == last && !is_terminator {
                advance += style.letter_spacing;
                if is_space {
                    advance += style.word_spacing;
                }
            }
            glyphs.push(Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
                advance,
                cluster,
            });
        }
    }
    glyphs
}

/// Returns the metrics of `font` for `style`, honoring the height multiplier.
pub(crate) fn run_metrics<B: Brush>(font: &Font, style: &TextStyle<B>) -> FontMetrics {
    let metrics = font.metrics(style.font_size);
    match style.height {
        Some(height) => metrics.with_height(height * style.font_size),
        None => metrics,
    }
}

/// Returns the first font a style resolves to, without fallback.
pub(crate) fn primary_font(
    fonts: &dyn FontMatcher,
    families: &[String],
    attributes: FontAttributes,
) -> Font {
    families
        .iter()
        .find_map(|family| fonts.match_family(family, attributes))
        .or_else(|| fonts.default_font(attributes))
        .unwrap_or_else(Font::last_resort)
}

/// The ellipsis, shaped for the style of the text it follows.
#[derive(Clone, Debug)]
pub(crate) struct ShapedEllipsis {
    pub(crate) font: Font,
    pub(crate) font_size: f32,
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) metrics: FontMetrics,
    pub(crate) advance: f32,
}

/// Shapes `ellipsis` with the first candidate font of `style` covering all of it.
pub(crate) fn shape_ellipsis<B: Brush>(
    lcx: &LayoutContext,
    ellipsis: &str,
    style: &TextStyle<B>,
    rtl: bool,
) -> ShapedEllipsis {
    let script = ellipsis
        .chars()
        .map(script_of)
        .find(|&script| !is_neutral_script(script))
        .map_or(*b"Zyyy", script_tag);
    let whole = [0..ellipsis.len()];
    let mut selector = FontSelector::new(&*lcx.fonts, style, lcx.font_fallback);
    let mut chosen = None;
    while let Some(font) = selector.select(ellipsis, &whole) {
        let request = ShapeRequest {
            text: ellipsis,
            range: 0..ellipsis.len(),
            font: &font,
            font_size: style.font_size,
            rtl,
            script,
            locale: style.locale.as_deref(),
        };
        let groups = shape_groups(lcx, &request);
        let complete = groups.iter().all(|group| group.resolved);
        chosen = Some((font, groups));
        if complete {
            break;
        }
    }
    let (font, groups) = chosen.unwrap_or_else(|| {
        let font = Font::last_resort();
        let request = ShapeRequest {
            text: ellipsis,
            range: 0..ellipsis.len(),
            font: &font,
            font_size: style.font_size,
            rtl,
            script,
            locale: style.locale.as_deref(),
        };
        let groups = shape_groups(lcx, &request);
        (font, groups)
    });
    let glyphs = spaced_glyphs(ellipsis, style, &groups);
    ShapedEllipsis {
        metrics: run_metrics(&font, style),
        advance: glyphs.iter().map(|g| g.advance).sum(),
        font,
        font_size: style.font_size,
        glyphs,
    }
}

/// Walks the candidate fonts of a style: the explicit families, the default
/// font, then fallback fonts for unresolved characters.
struct FontSelector<'a> {
    fonts: &'a dyn FontMatcher,
    families: core::slice::Iter<'a, String>,
    attributes: FontAttributes,
    locale: Option<&'a str>,
    tried_default: bool,
    fallback: bool,
    tried: SmallVec<[Font; 4]>,
}

impl<'a> FontSelector<'a> {
    fn new<B: Brush>(fonts: &'a dyn FontMatcher, style: &'a TextStyle<B>, fallback: bool) -> Self {
        Self {
            fonts,
            families: style.font_families.iter(),
            attributes: style.font_attributes(),
            locale: style.locale.as_deref(),
            tried_default: false,
            fallback,
            tried: SmallVec::new(),
        }
    }

    /// Returns the next untried candidate for the `unresolved` ranges of `text`.
    fn select(&mut self, text: &str, unresolved: &[Range<usize>]) -> Option<Font> {
        let (fonts, attributes, tried) = (self.fonts, self.attributes, &self.tried);
        let explicit = self
            .families
            .by_ref()
            .filter_map(|family| fonts.match_family(family, attributes))
            .find(|font| !tried.contains(font));
        if let Some(font) = explicit {
            self.tried.push(font.clone());
            return Some(font);
        }
        if !self.tried_default {
            self.tried_default = true;
            if let Some(font) = self.fonts.default_font(self.attributes) {
                if self.accept(&font) {
                    return Some(font);
                }
            }
        }
        if !self.fallback {
            return None;
        }
        let chars = unresolved
            .iter()
            .flat_map(|range| text[range.clone()].chars())
            .filter(|ch| !ch.is_whitespace() && !ch.is_control());
        for ch in chars {
            if let Some(font) = self.fonts.match_fallback(ch, self.attributes, self.locale) {
                if self.accept(&font) {
                    log::debug!("fallback to {font:?} for U+{:04X}", u32::from(ch));
                    return Some(font);
                }
            }
        }
        None
    }

    fn accept(&mut self, font: &Font) -> bool {
        if self.tried.contains(font) {
            false
        } else {
            self.tried.push(font.clone());
            true
        }
    }
}

fn cluster_u32(offset: usize) -> u32 {
    u32::try_from(offset).unwrap_or(u32::MAX)
}
