// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

pub(crate) fn nearly_eq(x: f32, y: f32) -> bool {
    (x - y).abs() < f32::EPSILON
}

/// Tolerance used when comparing accumulated advances against a width.
pub(crate) const WIDTH_EPSILON: f32 = 1e-3;

/// Returns `true` if `x` exceeds `limit` by more than the width tolerance.
pub(crate) fn exceeds(x: f32, limit: f32) -> bool {
    x > limit + WIDTH_EPSILON
}
