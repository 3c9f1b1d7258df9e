// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::font::{Font, FontMetrics};

/// Glyph with an offset and advance.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Glyph {
    /// Glyph identifier. Zero is the missing glyph.
    pub id: u32,
    /// Horizontal offset from the pen position.
    pub x: f32,
    /// Vertical offset from the baseline, positive downward.
    pub y: f32,
    /// Horizontal advance, including letter and word spacing.
    pub advance: f32,
    /// Byte offset of the source cluster in the paragraph text.
    pub cluster: u32,
}

/// Line break opportunity after a cluster.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum BreakType {
    /// No break is allowed after the cluster.
    #[default]
    None,
    /// A break is allowed after the cluster.
    SoftLineBreak,
    /// A break is required after the cluster.
    HardLineBreak,
}

/// The cause of a line break.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum BreakReason {
    /// The line is the last one.
    #[default]
    None,
    /// The line ends at a break opportunity because the next word did not fit.
    Regular,
    /// The line ends with a mandatory break.
    Explicit,
    /// The line was broken inside a word because nothing else fit.
    Emergency,
}

#[derive(Clone, Debug)]
pub(crate) struct RunData {
    /// Index of the font in the layout font table.
    pub(crate) font_index: usize,
    pub(crate) font_size: f32,
    pub(crate) text_range: Range<usize>,
    pub(crate) bidi_level: u8,
    /// Range in the cluster arena. Empty until the cluster table is built.
    pub(crate) cluster_range: Range<usize>,
    pub(crate) glyph_range: Range<usize>,
    pub(crate) metrics: FontMetrics,
    pub(crate) advance: f32,
    /// Index of the placeholder, for placeholder runs.
    pub(crate) placeholder: Option<usize>,
    pub(crate) is_ellipsis: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ClusterData {
    pub(crate) run_index: usize,
    pub(crate) glyph_range: Range<usize>,
    pub(crate) text_range: Range<usize>,
    pub(crate) advance: f32,
    /// Index of the style block the cluster starts in.
    pub(crate) style_index: usize,
    pub(crate) is_whitespace: bool,
    /// The cluster ends with a line terminator.
    pub(crate) is_terminator: bool,
    pub(crate) break_type: BreakType,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineItemData {
    pub(crate) run_index: usize,
    pub(crate) bidi_level: u8,
    pub(crate) cluster_range: Range<usize>,
    pub(crate) text_range: Range<usize>,
    pub(crate) advance: f32,
}

#[derive(Clone, Default, Debug, PartialEq)]
pub(crate) struct LineData {
    /// Range of the source text, including trailing whitespace.
    pub(crate) text_range: Range<usize>,
    /// End of the text before trailing whitespace.
    pub(crate) trimmed_end: usize,
    /// Range of text clusters, excluding the ellipsis.
    pub(crate) cluster_range: Range<usize>,
    /// End of the clusters before trailing whitespace.
    pub(crate) trimmed_cluster_end: usize,
    /// Range of line items, in visual order.
    pub(crate) item_range: Range<usize>,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) leading: f32,
    /// Top of the line box.
    pub(crate) top: f32,
    pub(crate) baseline: f32,
    /// Advance without trailing whitespace, including the ellipsis.
    pub(crate) advance: f32,
    pub(crate) trailing_whitespace: f32,
    pub(crate) break_reason: BreakReason,
    /// Run index of the ellipsis.
    pub(crate) ellipsis: Option<usize>,
}

impl LineData {
    pub(crate) fn height(&self) -> f32 {
        self.ascent + self.descent + self.leading
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.top + self.height()
    }
}

/// Arena holding every stage of a paragraph layout.
///
/// Runs, clusters and glyphs referenced by lines live past the counts recorded
/// in `shaped`, and are dropped with the lines.
#[derive(Clone, Default, Debug)]
pub(crate) struct LayoutData {
    pub(crate) fonts: Vec<Font>,
    pub(crate) runs: Vec<RunData>,
    pub(crate) clusters: Vec<ClusterData>,
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) lines: Vec<LineData>,
    pub(crate) line_items: Vec<LineItemData>,
    /// Runs, clusters and glyphs that belong to the text rather than to lines.
    shaped: (usize, usize, usize),
}

impl LayoutData {
    /// Clears every stage.
    pub(crate) fn clear(&mut self) {
        self.fonts.clear();
        self.runs.clear();
        self.clusters.clear();
        self.glyphs.clear();
        self.clear_lines();
        self.shaped = (0, 0, 0);
    }

    /// Clears the cluster table and everything built on it.
    pub(crate) fn clear_clusters(&mut self) {
        self.clear_lines();
        self.clusters.clear();
        self.shaped.1 = 0;
        for run in &mut self.runs {
            run.cluster_range = 0..0;
        }
    }

    /// Clears lines and the ellipsis runs they own.
    pub(crate) fn clear_lines(&mut self) {
        self.lines.clear();
        self.line_items.clear();
        let (runs, clusters, glyphs) = self.shaped;
        self.runs.truncate(runs);
        self.clusters.truncate(clusters);
        self.glyphs.truncate(glyphs);
    }

    /// Records the current arenas as belonging to the text.
    pub(crate) fn seal(&mut self) {
        self.shaped = (self.runs.len(), self.clusters.len(), self.glyphs.len());
    }

    /// Returns the number of clusters belonging to the text.
    pub(crate) fn text_cluster_count(&self) -> usize {
        self.shaped.1.min(self.clusters.len())
    }

    pub(crate) fn font_index(&mut self, font: &Font) -> usize {
        match self.fonts.iter().position(|f| f == font) {
            Some(index) => index,
            None => {
                self.fonts.push(font.clone());
                self.fonts.len() - 1
            }
        }
    }

    /// Appends a run of glyphs in logical cluster order and returns its index.
    pub(crate) fn push_run(
        &mut self,
        font: &Font,
        font_size: f32,
        bidi_level: u8,
        text_range: Range<usize>,
        glyphs: impl IntoIterator<Item = Glyph>,
        metrics: FontMetrics,
    ) -> usize {
        let font_index = self.font_index(font);
        let glyph_start = self.glyphs.len();
        self.glyphs.extend(glyphs);
        let glyph_range = glyph_start..self.glyphs.len();
        let advance = self.glyphs[glyph_range.clone()]
            .iter()
            .map(|g| g.advance)
            .sum();
        self.runs.push(RunData {
            font_index,
            font_size,
            text_range,
            bidi_level,
            cluster_range: 0..0,
            glyph_range,
            metrics,
            advance,
            placeholder: None,
            is_ellipsis: false,
        });
        self.runs.len() - 1
    }

    /// Returns `true` if justification space is added after `cluster`.
    ///
    /// That is the case for the last whitespace cluster of every gap between
    /// two visible clusters of `line`.
    pub(crate) fn is_justify_gap(&self, line: &LineData, cluster: usize) -> bool {
        cluster >= line.cluster_range.start
            && cluster + 1 < line.trimmed_cluster_end
            && self.clusters[cluster].is_whitespace
            && !self.clusters[cluster + 1].is_whitespace
    }

    /// Returns the number of justification gaps on `line`.
    pub(crate) fn justify_gaps(&self, line: &LineData) -> usize {
        (line.cluster_range.start..line.trimmed_cluster_end)
            .filter(|&i| self.is_justify_gap(line, i))
            .count()
    }
}
