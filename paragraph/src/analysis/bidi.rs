// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use unicode_bidi::{BidiInfo, Level};

/// Source of bidi embedding levels and visual reordering.
pub trait BidiOracle: Send + Sync {
    /// Returns the embedding level of every byte of `text`.
    fn levels(&self, text: &str, rtl: bool) -> Vec<u8>;

    /// Returns the logical indices of `levels` in visual order.
    fn reorder_visual(&self, levels: &[u8]) -> Vec<usize> {
        reorder_visual(levels)
    }
}

/// A [`BidiOracle`] implementing UAX #9 with `unicode-bidi`.
#[derive(Copy, Clone, Default, Debug)]
pub struct UnicodeBidiOracle;

impl BidiOracle for UnicodeBidiOracle {
    fn levels(&self, text: &str, rtl: bool) -> Vec<u8> {
        let base = if rtl { Level::rtl() } else { Level::ltr() };
        if text.is_empty() {
            return Vec::new();
        }
        BidiInfo::new(text, Some(base))
            .levels
            .iter()
            .map(|level| level.number())
            .collect()
    }
}

/// Reorders runs with the given levels from logical to visual order
/// (rule L2 of UAX #9).
pub fn reorder_visual(levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    let run_count = levels.len();

    // Find the max level and the min *odd* level
    let mut max_level = 0;
    let mut lowest_odd_level = 255;
    for &level in levels {
        max_level = max_level.max(level);
        if level & 1 != 0 && level < lowest_odd_level {
            lowest_odd_level = level;
        }
    }

    for level in (lowest_odd_level..=max_level).rev() {
        let mut i = 0;
        while i < run_count {
            if levels[order[i]] >= level {
                let mut end = i + 1;
                while end < run_count && levels[order[end]] >= level {
                    end += 1;
                }
                order[i..end].reverse();
                i = end;
            }
            i += 1;
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorders_nested_levels() {
        assert_eq!(reorder_visual(&[0, 0, 0]), [0, 1, 2]);
        assert_eq!(reorder_visual(&[1, 1, 1]), [2, 1, 0]);
        assert_eq!(reorder_visual(&[0, 1, 1, 0]), [0, 2, 1, 3]);
        assert_eq!(reorder_visual(&[1, 2, 2, 1]), [3, 1, 2, 0]);
    }

    #[test]
    fn hebrew_is_odd_in_ltr_paragraph() {
        let text = "ab \u{5d0}\u{5d1}";
        let levels = UnicodeBidiOracle.levels(text, false);
        assert_eq!(levels.len(), text.len());
        assert_eq!(levels[0], 0);
        assert_eq!(levels[3], 1);
    }

    #[test]
    fn rtl_base_level() {
        let levels = UnicodeBidiOracle.levels("\u{5d0} b", true);
        assert_eq!(levels[0], 1);
        assert_eq!(levels[levels.len() - 1], 2);
    }
}
