// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Implementation of the CSS font matching algorithm.

use crate::style::{FontAttributes, FontStyle};
use smallvec::SmallVec;

use core::cmp::Ordering::Less;

/// Returns the index of the member of `set` that best matches `request`.
///
/// Width is matched first, then style, then weight.
pub(crate) fn match_font(set: &[FontAttributes], request: FontAttributes) -> Option<usize> {
    match set.len() {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }
    #[derive(Copy, Clone)]
    struct Candidate {
        index: usize,
        width: i32,
        style: FontStyle,
        weight: f32,
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Width percentages are small and only compared for equality."
    )]
    let percent = |ratio: f32| (ratio * 100.0) as i32;
    let mut set: SmallVec<[Candidate; 16]> = set
        .iter()
        .enumerate()
        .map(|(i, attrs)| Candidate {
            index: i,
            width: percent(attrs.width.ratio()),
            style: attrs.style,
            weight: attrs.weight.value(),
        })
        .collect();
    let width = percent(request.width.ratio());
    let weight = request.weight.value();

    // font-width is tried first:
    let narrower = set
        .iter()
        .filter(|f| f.width < width)
        .max_by_key(|f| f.width)
        .map(|f| f.width);
    let wider = set
        .iter()
        .filter(|f| f.width > width)
        .min_by_key(|f| f.width)
        .map(|f| f.width);
    let use_width = if set.iter().any(|f| f.width == width) {
        width
    } else if width <= 100 {
        // narrower widths in descending order, then wider in ascending order
        narrower.or(wider).unwrap_or(set[0].width)
    } else {
        wider.or(narrower).unwrap_or(set[0].width)
    };
    set.retain(|f| f.width == use_width);

    // font-style is tried next:
    let find = |pred: fn(&FontStyle) -> bool| set.iter().map(|f| f.style).find(pred);
    let use_style = if set.iter().any(|f| f.style == request.style) {
        request.style
    } else {
        match request.style {
            // italic falls back to oblique, then normal
            FontStyle::Italic => find(is_oblique).or_else(|| find(is_normal)),
            // oblique falls back to italic, then normal
            FontStyle::Oblique(_) => find(is_italic).or_else(|| find(is_normal)),
            // normal falls back to oblique, then italic
            FontStyle::Normal => find(is_oblique).or_else(|| find(is_italic)),
        }
        .unwrap_or(set[0].style)
    };
    set.retain(|f| f.style == use_style);

    // font-weight is matched next:
    if let Some(f) = set.iter().find(|f| f.weight == weight) {
        return Some(f.index);
    }
    let lighter = |limit: f32| {
        set.iter()
            .filter(|f| f.weight < limit)
            .max_by(|x, y| x.weight.partial_cmp(&y.weight).unwrap_or(Less))
            .map(|f| f.index)
    };
    let heavier = |floor: f32, ceiling: f32| {
        set.iter()
            .filter(|f| f.weight >= floor && f.weight <= ceiling)
            .min_by(|x, y| x.weight.partial_cmp(&y.weight).unwrap_or(Less))
            .map(|f| f.index)
    };
    if (400.0..=500.0).contains(&weight) {
        // heavier weights up to 500, then lighter weights, then weights above 500
        heavier(weight, 500.0)
            .or_else(|| lighter(weight))
            .or_else(|| heavier(500.0, f32::MAX))
    } else if weight < 400.0 {
        lighter(weight).or_else(|| heavier(weight, f32::MAX))
    } else {
        heavier(weight, f32::MAX).or_else(|| lighter(weight))
    }
}

fn is_normal(style: &FontStyle) -> bool {
    *style == FontStyle::Normal
}

fn is_italic(style: &FontStyle) -> bool {
    *style == FontStyle::Italic
}

fn is_oblique(style: &FontStyle) -> bool {
    matches!(style, FontStyle::Oblique(_))
}
