// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::layout::BreakReason;
use crate::style::{ParagraphStyle, StrutStyle, TextStyle};
use crate::tests::utils::{ColorBrush, TestEnv, assert_close};
use crate::{PlaceholderAlignment, PlaceholderStyle};

#[test]
fn hard_break_starts_a_new_line() {
    let env = TestEnv::new();
    let paragraph = env.layout("line1\nline2", f32::INFINITY);

    assert_eq!(paragraph.line_count(), 2, "one line per hard break");
    let lines: Vec<_> = paragraph.lines().collect();
    assert_eq!(lines[0].text_range(), 0..6);
    assert_eq!(lines[0].trimmed_end(), 5);
    assert_eq!(lines[0].break_reason(), BreakReason::Explicit);
    assert_eq!(lines[1].text_range(), 6..11);
    assert_eq!(lines[1].break_reason(), BreakReason::None);
    assert_close(lines[0].advance(), 50.0);
    assert_close(lines[1].top(), lines[0].height());
    assert_close(paragraph.height(), 20.0);

    let metrics = paragraph.get_line_metrics();
    assert!(metrics[0].hard_break, "the first line ends with a newline");
    assert!(!metrics[1].hard_break, "the last line ends with the text");
    assert_close(metrics[1].baseline, 18.0);
}

#[test]
fn soft_break_after_trailing_whitespace() {
    let env = TestEnv::new();
    let paragraph = env.layout("AAAA BBBB", 45.0);

    let lines: Vec<_> = paragraph.lines().collect();
    assert_eq!(lines.len(), 2, "the second word does not fit");
    assert_eq!(lines[0].text_range(), 0..5);
    assert_eq!(lines[0].trimmed_end(), 4);
    assert_eq!(lines[0].break_reason(), BreakReason::Regular);
    assert_close(lines[0].advance(), 40.0);
    assert_close(lines[0].trailing_whitespace(), 10.0);
    assert_eq!(lines[1].text_range(), 5..9);
    assert_close(paragraph.longest_line(), 40.0);
    assert_close(paragraph.height(), 20.0);
}

#[test]
fn whitespace_hangs_past_the_width() {
    let env = TestEnv::new();
    let paragraph = env.layout("AAAA   BBBB", 45.0);

    let first = paragraph.get_line(0).unwrap();
    assert_eq!(first.text_range(), 0..7);
    assert_close(first.advance(), 40.0);
    assert_close(first.trailing_whitespace(), 30.0);
}

#[test]
fn trailing_newline_adds_an_empty_line() {
    let env = TestEnv::new();
    let paragraph = env.layout("ab\n", f32::INFINITY);

    assert_eq!(paragraph.line_count(), 2, "the newline opens a line");
    let last = paragraph.get_line(1).unwrap();
    assert_eq!(last.text_range(), 3..3);
    assert_close(last.height(), 10.0);
    assert_close(paragraph.height(), 20.0);
}

#[test]
fn lone_newline_is_two_lines() {
    let env = TestEnv::new();
    let paragraph = env.layout("\n", 100.0);

    assert_eq!(paragraph.line_count(), 2, "empty line before and after");
    assert_close(paragraph.height(), 20.0);
}

#[test]
fn empty_paragraph_has_one_default_line() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph("");
    paragraph.layout(100.0);

    assert_eq!(paragraph.line_count(), 1, "empty text still has a line");
    assert_close(paragraph.height(), 10.0);
    assert_close(paragraph.alphabetic_baseline(), 8.0);
    assert_close(paragraph.ideographic_baseline(), 10.0);
    assert_close(paragraph.longest_line(), 0.0);
    assert_close(paragraph.min_intrinsic_width(), 0.0);
    assert_close(paragraph.max_intrinsic_width(), 0.0);

    let metrics = paragraph.get_line_metrics();
    assert_eq!(metrics.len(), 1);
    assert_eq!((metrics[0].start_index, metrics[0].end_index), (0, 0));
}

#[test]
fn lines_tile_the_text_at_every_width() {
    let env = TestEnv::new();
    let text = "The quick brown fox jumps over the lazy dog\nand then\u{301} some";
    for width in [0.0, 5.0, 15.0, 25.0, 45.0, 95.0, 1000.0, f32::INFINITY] {
        let paragraph = env.layout(text, width);
        let lines: Vec<_> = paragraph.lines().collect();
        assert_eq!(lines[0].text_range().start, 0, "width {width}");
        assert_eq!(
            lines.last().map(|line| line.text_range().end),
            Some(text.len()),
            "width {width}"
        );
        for pair in lines.windows(2) {
            assert_eq!(
                pair[0].text_range().end,
                pair[1].text_range().start,
                "lines are contiguous at width {width}"
            );
            assert_close(pair[1].top(), pair[0].top() + pair[0].height());
        }
        for line in &lines {
            let visible = &text[line.text_range().start..line.trimmed_end()];
            assert!(
                line.advance() <= width + 1e-3 || visible.chars().filter(|&c| c != '\u{301}').count() == 1,
                "line {visible:?} is {} wide at width {width}",
                line.advance()
            );
        }
    }
}

#[test]
fn relayout_is_idempotent() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph("one two three four five");
    paragraph.layout(55.0);
    let first = paragraph.get_line_metrics();
    paragraph.layout(55.0);
    assert_eq!(paragraph.get_line_metrics(), first);

    paragraph.layout(1000.0);
    paragraph.layout(55.0);
    assert_eq!(paragraph.get_line_metrics(), first);

    let fresh = env.layout("one two three four five", 55.0);
    assert_eq!(fresh.get_line_metrics(), first);
}

#[test]
fn intrinsic_widths() {
    let env = TestEnv::new();
    let paragraph = env.layout("aa bbb\nc", 10.0);

    assert_close(paragraph.min_intrinsic_width(), 30.0);
    assert_close(paragraph.max_intrinsic_width(), 60.0);
}

#[test]
fn nan_width_never_wraps() {
    let env = TestEnv::new();
    let paragraph = env.layout("many words on one line", f32::NAN);

    assert_eq!(paragraph.line_count(), 1, "an unbounded width does not wrap");
    assert!(paragraph.max_width().is_infinite(), "NaN becomes infinity");
}

#[test]
fn height_multiplier_scales_the_line() {
    let env = TestEnv::new();
    let mut style = env.paragraph_style();
    style.text_style.height = Some(2.0);
    let mut paragraph = env.paragraph_with(style, "ab");
    paragraph.layout(100.0);

    let line = paragraph.get_line(0).unwrap();
    assert_close(line.height(), 20.0);
    assert_close(line.baseline(), 16.0);
}

#[test]
fn larger_style_raises_the_line() {
    let env = TestEnv::new();
    let mut builder = env.builder(env.paragraph_style());
    builder.add_text("ab");
    builder.push_style(TextStyle {
        font_size: 20.0,
        ..env.text_style()
    });
    builder.add_text("CD");
    builder.pop();
    builder.add_text("ef");
    let mut paragraph = builder.build();
    paragraph.layout(f32::INFINITY);

    assert_eq!(paragraph.style_blocks().len(), 3, "one block per style change");
    let line = paragraph.get_line(0).unwrap();
    assert_close(line.height(), 20.0);
    assert_close(line.baseline(), 16.0);
    assert_close(line.advance(), 80.0);
    assert_eq!(line.runs().count(), 3, "sizes shape separately");
}

fn strut_style(env: &TestEnv, strut: StrutStyle) -> ParagraphStyle<ColorBrush> {
    ParagraphStyle {
        strut,
        ..env.paragraph_style()
    }
}

#[test]
fn strut_is_a_minimum_line_height() {
    let env = TestEnv::new();
    let style = strut_style(
        &env,
        StrutStyle {
            enabled: true,
            font_size: 20.0,
            ..StrutStyle::default()
        },
    );
    let mut paragraph = env.paragraph_with(style, "ab\ncd");
    paragraph.layout(100.0);

    for line in paragraph.lines() {
        assert_close(line.height(), 20.0);
        assert_close(line.baseline() - line.top(), 16.0);
    }
    assert_close(paragraph.height(), 40.0);
}

#[test]
fn forced_strut_overrides_the_content() {
    let env = TestEnv::new();
    let style = strut_style(
        &env,
        StrutStyle {
            enabled: true,
            font_size: 5.0,
            force_height: true,
            ..StrutStyle::default()
        },
    );
    let mut paragraph = env.paragraph_with(style, "ab");
    paragraph.layout(100.0);

    assert_close(paragraph.height(), 5.0);
    assert_close(paragraph.alphabetic_baseline(), 4.0);
}

#[test]
fn strut_height_and_leading() {
    let env = TestEnv::new();
    let style = strut_style(
        &env,
        StrutStyle {
            enabled: true,
            font_size: 10.0,
            height: Some(2.0),
            leading: Some(0.5),
            ..StrutStyle::default()
        },
    );
    let mut paragraph = env.paragraph_with(style, "ab");
    paragraph.layout(100.0);

    // Ascent 16 and descent 4 from the height, plus 5 of leading.
    assert_close(paragraph.height(), 25.0);
    assert_close(paragraph.alphabetic_baseline(), 18.5);
}

#[test]
fn disabled_strut_is_ignored() {
    let env = TestEnv::new();
    let style = strut_style(
        &env,
        StrutStyle {
            enabled: false,
            font_size: 40.0,
            ..StrutStyle::default()
        },
    );
    let mut paragraph = env.paragraph_with(style, "ab");
    paragraph.layout(100.0);

    assert_close(paragraph.height(), 10.0);
}

#[test]
fn placeholder_takes_space_and_height() {
    let env = TestEnv::new();
    let mut builder = env.builder(env.paragraph_style());
    builder.add_text("ab");
    builder.add_placeholder(PlaceholderStyle::new(30.0, 20.0, PlaceholderAlignment::Baseline));
    builder.add_text("cd");
    let mut paragraph = builder.build();
    paragraph.layout(100.0);

    assert_eq!(paragraph.text(), "ab\u{FFFC}cd");
    assert_eq!(paragraph.placeholders()[0].range, 2..5);
    let line = paragraph.get_line(0).unwrap();
    assert_close(line.advance(), 70.0);
    assert_close(line.baseline(), 20.0);
    assert_close(line.height(), 22.0);
    let placeholder = line.runs().find(|run| run.placeholder().is_some()).unwrap();
    assert_eq!(placeholder.placeholder(), Some(0));
    assert_close(placeholder.x(), 20.0);
}

#[test]
fn placeholder_only_line_uses_its_own_height() {
    let env = TestEnv::new();
    let mut builder = env.builder(env.paragraph_style());
    builder.add_placeholder(PlaceholderStyle::new(30.0, 30.0, PlaceholderAlignment::AboveBaseline));
    let mut paragraph = builder.build();
    paragraph.layout(100.0);

    assert_close(paragraph.height(), 30.0);
    assert_close(paragraph.alphabetic_baseline(), 30.0);
}

#[test]
fn middle_placeholder_centers_on_the_text() {
    let env = TestEnv::new();
    let mut builder = env.builder(env.paragraph_style());
    builder.add_text("a");
    builder.add_placeholder(PlaceholderStyle::new(10.0, 20.0, PlaceholderAlignment::Middle));
    let mut paragraph = builder.build();
    paragraph.layout(100.0);

    let boxes = paragraph.get_rects_for_placeholders();
    assert_eq!(boxes.len(), 1, "one placeholder");
    // The text spans 8 above and 2 below the baseline: its center is 3 above.
    let line = paragraph.get_line(0).unwrap();
    let rect = boxes[0].rect;
    assert_close(rect.height(), 20.0);
    assert_close(
        (rect.y0 + rect.y1) * 0.5,
        f64::from(line.baseline()) - 3.0,
    );
}
