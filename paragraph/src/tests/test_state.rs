// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::paint::DrawCommand;
use crate::style::{TextAlign, TextStyle};
use crate::tests::utils::{ColorBrush, TestEnv, assert_close};
use crate::{ErrorKind, LayoutState, Paragraph, PlaceholderAlignment, PlaceholderStyle};

fn two_styles(env: &TestEnv) -> Paragraph<ColorBrush> {
    let mut builder = env.builder(env.paragraph_style());
    builder.add_text("Hello");
    builder.push_style(TextStyle {
        brush: ColorBrush(4),
        ..env.text_style()
    });
    builder.add_text(" world");
    builder.build()
}

fn block_ranges(paragraph: &Paragraph<ColorBrush>) -> Vec<(core::ops::Range<usize>, ColorBrush)> {
    paragraph
        .style_blocks()
        .iter()
        .map(|block| (block.range.clone(), block.style.brush))
        .collect()
}

#[test]
fn states_advance_through_the_pipeline() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph("some text");
    assert_eq!(paragraph.state(), LayoutState::Unknown);

    paragraph.layout(100.0);
    assert_eq!(paragraph.state(), LayoutState::LineBroken);
    paragraph.get_line_metrics();
    assert_eq!(paragraph.state(), LayoutState::Formatted);
    paragraph.display_list();
    assert_eq!(paragraph.state(), LayoutState::Drawn);

    paragraph.layout(100.0);
    assert_eq!(paragraph.state(), LayoutState::Drawn, "same width is a no-op");
    paragraph.layout(50.0);
    assert_eq!(paragraph.state(), LayoutState::LineBroken, "new width rebreaks");
}

#[test]
fn paint_only_updates_keep_the_lines() {
    let env = TestEnv::new();
    let mut paragraph = env.layout("some text", 100.0);
    paragraph.display_list();

    paragraph.update_foreground(ColorBrush(9));
    assert_eq!(paragraph.state(), LayoutState::Formatted);
    let brushes: Vec<_> = paragraph
        .display_list()
        .unwrap()
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::GlyphRun { brush, .. } => Some(*brush),
            _ => None,
        })
        .collect();
    assert_eq!(brushes, [ColorBrush(9)]);

    paragraph.update_background(Some(ColorBrush(3)));
    let first = paragraph.display_list().unwrap().commands()[0].clone();
    assert!(
        matches!(first, DrawCommand::Rect { brush: ColorBrush(3), .. }),
        "the background is painted first, got {first:?}"
    );
}

#[test]
fn realigning_keeps_the_line_breaks() {
    let env = TestEnv::new();
    let mut paragraph = env.layout("some text", 100.0);
    paragraph.get_line_metrics();

    paragraph.update_text_align(TextAlign::Center);
    assert_eq!(paragraph.state(), LayoutState::LineBroken);
    assert_close(paragraph.get_line_metrics()[0].left, 5.0);
}

#[test]
fn font_size_update_relayouts_from_scratch() {
    let env = TestEnv::new();
    let mut paragraph = env.layout("ab", 100.0);

    paragraph.update_font_size(20.0);
    assert_eq!(paragraph.state(), LayoutState::Unknown);
    paragraph.layout(100.0);
    assert_close(paragraph.height(), 20.0);
    assert_close(paragraph.longest_line(), 40.0);
}

#[test]
fn inserted_text_joins_the_block_at_the_insertion_point() {
    let env = TestEnv::new();
    let mut paragraph = two_styles(&env);
    paragraph.layout(1000.0);

    paragraph.update_text(5..5, ",").unwrap();
    assert_eq!(paragraph.text(), "Hello, world");
    assert_eq!(paragraph.state(), LayoutState::Unknown);
    assert_eq!(
        block_ranges(&paragraph),
        [(0..5, ColorBrush(1)), (5..12, ColorBrush(4))]
    );

    paragraph.layout(1000.0);
    assert_close(paragraph.longest_line(), 120.0);
}

#[test]
fn replacing_text_drops_empty_blocks() {
    let env = TestEnv::new();
    let mut paragraph = two_styles(&env);

    paragraph.update_text(0..5, "").unwrap();
    assert_eq!(paragraph.text(), " world");
    assert_eq!(block_ranges(&paragraph), [(0..6, ColorBrush(4))]);

    paragraph.update_text(0..6, "").unwrap();
    assert_eq!(paragraph.text(), "");
    assert_eq!(paragraph.style_blocks().len(), 1, "a block always remains");
    paragraph.layout(100.0);
    assert_eq!(paragraph.line_count(), 1);
}

#[test]
fn appended_text_extends_the_last_block() {
    let env = TestEnv::new();
    let mut paragraph = two_styles(&env);

    paragraph.update_text(11..11, "!").unwrap();
    assert_eq!(paragraph.text(), "Hello world!");
    assert_eq!(
        block_ranges(&paragraph),
        [(0..5, ColorBrush(1)), (5..12, ColorBrush(4))]
    );
}

#[test]
fn invalid_edits_are_rejected() {
    let env = TestEnv::new();
    let mut paragraph = env.paragraph("caf\u{e9}");

    let kind = |result: Result<(), crate::Error>| result.map_err(|error| error.kind()).err();
    assert_eq!(kind(paragraph.update_text(3..99, "")), Some(ErrorKind::InvalidBounds));
    let reversed = core::ops::Range { start: 3, end: 1 };
    assert_eq!(kind(paragraph.update_text(reversed, "")), Some(ErrorKind::InvalidRange));
    assert_eq!(kind(paragraph.update_text(4..5, "")), Some(ErrorKind::NotOnCharBoundary));
    assert_eq!(paragraph.text(), "caf\u{e9}", "failed edits change nothing");
}

#[test]
fn edits_move_and_remove_placeholders() {
    let env = TestEnv::new();
    let mut builder = env.builder(env.paragraph_style());
    builder.add_text("ab");
    builder.add_placeholder(PlaceholderStyle::new(10.0, 10.0, PlaceholderAlignment::Baseline));
    builder.add_text("cd");
    let mut paragraph = builder.build();
    let placeholder_text = |paragraph: &Paragraph<ColorBrush>| {
        paragraph.text()[paragraph.placeholders()[0].range.clone()].to_owned()
    };

    paragraph.update_text(2..2, "XY").unwrap();
    assert_eq!(paragraph.placeholders()[0].range, 4..7, "text goes before the placeholder");
    assert_eq!(placeholder_text(&paragraph), "\u{fffc}");
    paragraph.layout(1000.0);
    assert_close(paragraph.get_line(0).unwrap().advance(), 70.0);

    paragraph.update_text(0..1, "xyz").unwrap();
    assert_eq!(paragraph.placeholders()[0].range, 6..9);
    paragraph.update_text(9..9, "!").unwrap();
    assert_eq!(paragraph.placeholders()[0].range, 6..9, "text goes after the placeholder");
    assert_eq!(placeholder_text(&paragraph), "\u{fffc}");

    paragraph.update_text(5..10, "").unwrap();
    assert!(paragraph.placeholders().is_empty(), "the placeholder was deleted");
    assert_eq!(paragraph.text(), "xyzbXcd");
    paragraph.layout(100.0);
    assert!(paragraph.get_rects_for_placeholders().is_empty(), "nothing left to box");
}

#[test]
fn builder_merges_equal_styles() {
    let env = TestEnv::new();
    let mut builder = env.builder(env.paragraph_style());
    builder.add_text("ab");
    builder.push_style(env.text_style());
    builder.add_text("cd");
    assert_eq!(builder.peek_style(), &env.text_style());
    builder.pop().pop();
    builder.add_text("");
    assert_eq!(builder.text(), "abcd");
    let paragraph = builder.build();

    assert_eq!(block_ranges(&paragraph), [(0..4, ColorBrush(1))]);
    assert!(builder.text().is_empty(), "building empties the builder");
}
