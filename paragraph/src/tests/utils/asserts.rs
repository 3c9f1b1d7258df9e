// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Rect;

const TOLERANCE: f64 = 1e-3;

#[track_caller]
pub(crate) fn assert_close(actual: impl Into<f64>, expected: impl Into<f64>) {
    let (actual, expected) = (actual.into(), expected.into());
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

/// Asserts that `rect` spans `x0..x1` horizontally and `y0..y1` vertically.
#[track_caller]
pub(crate) fn assert_rect(rect: Rect, (x0, y0, x1, y1): (f64, f64, f64, f64)) {
    let close = |a: f64, b: f64| (a - b).abs() <= TOLERANCE;
    assert!(
        close(rect.x0, x0) && close(rect.y0, y0) && close(rect.x1, x1) && close(rect.y1, y1),
        "expected ({x0}, {y0}, {x1}, {y1}), got {rect:?}"
    );
}
