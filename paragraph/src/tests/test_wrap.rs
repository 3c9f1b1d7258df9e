// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Rect;

use crate::layout::BreakReason;
use crate::paint::DrawCommand;
use crate::style::ParagraphStyle;
use crate::tests::utils::{ColorBrush, TestEnv, assert_close};

fn truncated(env: &TestEnv, max_lines: usize, ellipsis: Option<&str>) -> ParagraphStyle<ColorBrush> {
    ParagraphStyle {
        max_lines: Some(max_lines),
        ellipsis: ellipsis.map(str::to_owned),
        ..env.paragraph_style()
    }
}

#[test]
fn long_word_breaks_in_emergency() {
    let env = TestEnv::new();
    let paragraph = env.layout("AAAAAAAA", 35.0);

    let lines: Vec<_> = paragraph.lines().map(|line| (line.text_range(), line.break_reason())).collect();
    assert_eq!(
        lines,
        [
            (0..3, BreakReason::Emergency),
            (3..6, BreakReason::Emergency),
            (6..8, BreakReason::None),
        ]
    );
}

#[test]
fn emergency_breaks_keep_marks_with_their_base() {
    let env = TestEnv::new();
    let text = "e\u{301}e\u{301}e\u{301}";
    let paragraph = env.layout(text, 15.0);

    let ranges: Vec<_> = paragraph.lines().map(|line| line.text_range()).collect();
    assert_eq!(ranges, [0..3, 3..6, 6..9]);
}

#[test]
fn word_wider_than_the_line_gets_its_own_line() {
    let env = TestEnv::new();
    let paragraph = env.layout("a bbbbbb c", 45.0);

    let ranges: Vec<_> = paragraph.lines().map(|line| line.text_range()).collect();
    assert_eq!(ranges, [0..2, 2..6, 6..10]);
    assert_eq!(paragraph.get_line(1).unwrap().break_reason(), BreakReason::Emergency);
}

#[test]
fn leading_whitespace_is_not_a_line() {
    let env = TestEnv::new();
    let paragraph = env.layout(" a", 5.0);

    let ranges: Vec<_> = paragraph.lines().map(|line| line.text_range()).collect();
    assert_eq!(ranges, [0..2]);
}

#[test]
fn zero_width_puts_every_cluster_on_a_line() {
    let env = TestEnv::new();
    let paragraph = env.layout("ab", 0.0);

    assert_eq!(paragraph.line_count(), 2, "nothing fits");
    let paragraph = env.layout("ab", -10.0);
    assert_eq!(paragraph.line_count(), 2, "negative widths clamp to zero");
}

#[test]
fn ellipsis_replaces_truncated_text() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 1, Some("\u{2026}")), "AAAA BBBB CCCC");
    paragraph.layout(45.0);

    assert!(paragraph.did_exceed_max_lines(), "two lines were cut");
    assert_eq!(paragraph.line_count(), 1);
    let line = paragraph.get_line(0).unwrap();
    assert!(line.has_ellipsis(), "the last line ends with an ellipsis");
    assert_eq!(line.text_range(), 0..3);
    assert_close(line.advance(), 40.0);
    assert!(line.advance() <= 45.0, "the ellipsis fits the width");

    let ellipsis = line.runs().last().unwrap();
    assert!(ellipsis.is_ellipsis(), "the ellipsis is the last run");
    assert_close(ellipsis.x(), 30.0);
    let ids: Vec<u32> = ellipsis.glyphs().map(|glyph| glyph.id).collect();
    assert_eq!(ids, [0x2026]);
    assert_close(paragraph.height(), 10.0);
}

#[test]
fn ellipsis_drops_trailing_whitespace() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 1, Some("\u{2026}")), "AA BBBB");
    paragraph.layout(45.0);

    let line = paragraph.get_line(0).unwrap();
    assert_eq!(line.text_range(), 0..2);
    assert_close(line.advance(), 30.0);
    // Painting the ellipsis does not clip.
    let list = paragraph.display_list().unwrap();
    assert!(
        !list.commands().iter().any(|command| matches!(command, DrawCommand::ClipRect(_))),
        "ellipsized text is not clipped"
    );
}

#[test]
fn multi_character_ellipsis() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 1, Some("...")), "AAAA BBBB");
    paragraph.layout(45.0);

    let line = paragraph.get_line(0).unwrap();
    assert_eq!(line.text_range(), 0..1);
    assert_close(line.advance(), 40.0);
}

#[test]
fn truncation_without_ellipsis_is_clipped() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 1, None), "AAAA BBBB CCCC");
    paragraph.layout(45.0);

    assert!(paragraph.did_exceed_max_lines(), "text was cut");
    assert_eq!(paragraph.line_count(), 1);
    assert!(!paragraph.get_line(0).unwrap().has_ellipsis(), "no ellipsis was asked for");
    let commands = paragraph.display_list().unwrap().commands();
    assert_eq!(commands[0], DrawCommand::Save);
    assert_eq!(commands[1], DrawCommand::ClipRect(Rect::new(0.0, 0.0, 45.0, 10.0)));
    assert_eq!(commands.last(), Some(&DrawCommand::Restore));
}

#[test]
fn fitting_text_does_not_exceed() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 2, Some("\u{2026}")), "AAAA BBBB");
    paragraph.layout(45.0);

    assert!(!paragraph.did_exceed_max_lines(), "two lines are allowed");
    assert_eq!(paragraph.line_count(), 2);
    assert!(paragraph.lines().all(|line| !line.has_ellipsis()), "nothing was cut");
}

#[test]
fn trailing_empty_line_is_not_more_text() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 1, Some("\u{2026}")), "ab\n");
    paragraph.layout(100.0);

    assert!(!paragraph.did_exceed_max_lines(), "only the empty line was cut");
    assert_eq!(paragraph.line_count(), 1);
    assert!(!paragraph.get_line(0).unwrap().has_ellipsis(), "no text was cut");
}

#[test]
fn hard_breaks_count_towards_max_lines() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 2, None), "a\nb\nc");
    paragraph.layout(f32::INFINITY);

    assert!(paragraph.did_exceed_max_lines(), "the third line was cut");
    assert_eq!(paragraph.line_count(), 2);
    assert_close(paragraph.height(), 20.0);
}

#[test]
fn zero_max_lines_keeps_one_line() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph_with(truncated(&env, 0, None), "a\nb");
    paragraph.layout(f32::INFINITY);

    assert_eq!(paragraph.line_count(), 1);
    assert!(paragraph.did_exceed_max_lines(), "the second line was cut");
}
