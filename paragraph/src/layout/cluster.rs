// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cluster table construction and break marking.

use crate::analysis::{
    BreakKind, BreakOracle, BreakStatus, TextBreaker, is_line_terminator, is_whitespace_like,
};
use crate::builder::StyleBlock;
use crate::style::Brush;

use super::data::{BreakType, ClusterData, LayoutData};

/// Builds the cluster table of every run of `data`.
///
/// The clusters partition `text` in logical order.
pub(crate) fn build_clusters<B: Brush>(text: &str, blocks: &[StyleBlock<B>], data: &mut LayoutData) {
    data.clear_clusters();
    let mut block = 0;
    let mut style_index = |start: usize| {
        while block + 1 < blocks.len() && blocks[block].range.end <= start {
            block += 1;
        }
        block
    };
    for run_index in 0..data.runs.len() {
        let run = &data.runs[run_index];
        let run_range = run.text_range.clone();
        let glyph_range = run.glyph_range.clone();
        let cluster_start = data.clusters.len();
        if run.placeholder.is_some() {
            data.clusters.push(ClusterData {
                run_index,
                glyph_range,
                style_index: style_index(run_range.start),
                text_range: run_range,
                advance: run.advance,
                is_whitespace: false,
                is_terminator: false,
                break_type: BreakType::SoftLineBreak,
            });
            data.runs[run_index].cluster_range = cluster_start..data.clusters.len();
            continue;
        }

        // Glyphs are stored in logical cluster order: grouping by source
        // cluster yields ascending starts.
        let mut groups: Vec<(usize, core::ops::Range<usize>)> = Vec::new();
        for g in glyph_range.clone() {
            let cluster = (data.glyphs[g].cluster as usize).clamp(run_range.start, run_range.end);
            match groups.last_mut() {
                Some((start, glyphs)) if *start >= cluster => glyphs.end = g + 1,
                _ => groups.push((cluster, g..g + 1)),
            }
        }
        if groups.is_empty() {
            groups.push((run_range.start, glyph_range.start..glyph_range.start));
        }
        if let Some(first) = groups.first_mut() {
            first.0 = run_range.start;
        }
        for (i, (start, glyphs)) in groups.iter().enumerate() {
            let end = groups.get(i + 1).map_or(run_range.end, |next| next.0);
            if end <= *start {
                continue;
            }
            let source = &text[*start..end];
            data.clusters.push(ClusterData {
                run_index,
                glyph_range: glyphs.clone(),
                text_range: *start..end,
                advance: data.glyphs[glyphs.clone()].iter().map(|g| g.advance).sum(),
                style_index: style_index(*start),
                is_whitespace: source.chars().all(is_whitespace_like),
                is_terminator: source.chars().next_back().is_some_and(is_line_terminator),
                break_type: BreakType::None,
            });
        }
        data.runs[run_index].cluster_range = cluster_start..data.clusters.len();
    }

    let mut end = 0;
    for cluster in &data.clusters {
        assert_eq!(
            cluster.text_range.start, end,
            "cluster table does not partition the text"
        );
        end = cluster.text_range.end;
    }
    assert_eq!(end, text.len(), "cluster table does not cover the text");
    data.seal();
}

/// Annotates clusters with the line break opportunities following them.
pub(crate) fn mark_breaks(oracle: &dyn BreakOracle, text: &str, data: &mut LayoutData) {
    let count = data.text_cluster_count();
    let clusters = &mut data.clusters[..count];
    for cluster in clusters.iter_mut() {
        cluster.break_type = if data.runs[cluster.run_index].placeholder.is_some() {
            BreakType::SoftLineBreak
        } else {
            BreakType::None
        };
    }

    let mut breaker = TextBreaker::new();
    breaker.initialize(oracle, text, BreakKind::Line);
    let mut index = 0;
    while let Some(boundary) = breaker.next() {
        while index < clusters.len() && clusters[index].text_range.end < boundary {
            index += 1;
        }
        let Some(cluster) = clusters.get_mut(index) else {
            break;
        };
        // Boundaries inside a cluster are not break opportunities.
        if cluster.text_range.end == boundary {
            cluster.break_type = match breaker.status() {
                BreakStatus::Hard => BreakType::HardLineBreak,
                BreakStatus::Soft => BreakType::SoftLineBreak,
            };
        }
    }

    for i in 0..clusters.len() {
        if !clusters[i].is_terminator {
            continue;
        }
        let crlf = text[clusters[i].text_range.clone()].ends_with('\r')
            && text[clusters[i].text_range.end..].starts_with('\n');
        clusters[i].break_type = if crlf {
            BreakType::None
        } else {
            BreakType::HardLineBreak
        };
    }
}

/// Returns the boundaries of grapheme clusters, including `0` and `text.len()`.
///
/// Falls back to char boundaries when the oracle is unavailable.
pub(crate) fn grapheme_boundaries(oracle: &dyn BreakOracle, text: &str) -> Vec<usize> {
    let mut breaker = TextBreaker::new();
    let mut boundaries = vec![0];
    if breaker.initialize(oracle, text, BreakKind::Grapheme) {
        boundaries.extend(breaker);
    } else {
        boundaries.extend(text.char_indices().skip(1).map(|(offset, _)| offset));
    }
    if boundaries.last() != Some(&text.len()) {
        boundaries.push(text.len());
    }
    boundaries.dedup();
    boundaries
}

/// Returns the minimum and maximum intrinsic widths of the marked clusters.
///
/// The minimum is the widest stretch between two break opportunities, the
/// maximum the widest stretch between two mandatory breaks. Trailing
/// whitespace is excluded from both.
pub(crate) fn intrinsic_widths(data: &LayoutData) -> (f32, f32) {
    #[derive(Default)]
    struct Stretch {
        width: f32,
        trimmed: f32,
        widest: f32,
    }

    impl Stretch {
        fn push(&mut self, cluster: &ClusterData) {
            self.width += cluster.advance;
            if !cluster.is_whitespace {
                self.trimmed = self.width;
            }
        }

        fn end(&mut self) {
            self.widest = self.widest.max(self.trimmed);
            self.width = 0.0;
            self.trimmed = 0.0;
        }
    }

    let mut min = Stretch::default();
    let mut max = Stretch::default();
    for cluster in &data.clusters[..data.text_cluster_count()] {
        min.push(cluster);
        max.push(cluster);
        match cluster.break_type {
            BreakType::None => {}
            BreakType::SoftLineBreak => min.end(),
            BreakType::HardLineBreak => {
                min.end();
                max.end();
            }
        }
    }
    min.end();
    max.end();
    (min.widest, max.widest)
}
