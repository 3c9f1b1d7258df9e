// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Context for building a paragraph.

use core::ops::Range;

use crate::context::LayoutContext;
use crate::paragraph::Paragraph;
use crate::placeholder::{Placeholder, PlaceholderStyle, REPLACEMENT_CHAR};
use crate::style::{Brush, ParagraphStyle, TextStyle};

/// A range of text with one style.
#[derive(Clone, PartialEq, Debug)]
pub struct StyleBlock<B: Brush> {
    /// Byte range of the paragraph text.
    pub range: Range<usize>,
    /// Style of the range.
    pub style: TextStyle<B>,
}

/// Builder for a [`Paragraph`].
///
/// Text is appended with the style on top of the style stack, or the
/// paragraph's default text style when the stack is empty.
#[derive(Debug)]
pub struct ParagraphBuilder<B: Brush> {
    style: ParagraphStyle<B>,
    lcx: LayoutContext,
    text: String,
    style_stack: Vec<TextStyle<B>>,
    blocks: Vec<StyleBlock<B>>,
    placeholders: Vec<Placeholder>,
}

impl<B: Brush> ParagraphBuilder<B> {
    /// Creates a builder for a paragraph with `style`, laid out with `lcx`.
    pub fn new(style: ParagraphStyle<B>, lcx: LayoutContext) -> Self {
        Self {
            style,
            lcx,
            text: String::new(),
            style_stack: Vec::new(),
            blocks: Vec::new(),
            placeholders: Vec::new(),
        }
    }

    /// Pushes a style applying to the text added until the matching [`pop`](Self::pop).
    pub fn push_style(&mut self, style: TextStyle<B>) -> &mut Self {
        self.style_stack.push(style);
        self
    }

    /// Pops the innermost style. Does nothing on an empty stack.
    pub fn pop(&mut self) -> &mut Self {
        self.style_stack.pop();
        self
    }

    /// Returns the style applied to text added now.
    pub fn peek_style(&self) -> &TextStyle<B> {
        self.style_stack.last().unwrap_or(&self.style.text_style)
    }

    /// Appends `text` with the current style.
    pub fn add_text(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        let start = self.text.len();
        self.text.push_str(text);
        self.extend_blocks(start..self.text.len());
        self
    }

    /// Appends a placeholder with the current style.
    ///
    /// The placeholder occupies one U+FFFC in the paragraph text.
    pub fn add_placeholder(&mut self, style: PlaceholderStyle) -> &mut Self {
        let start = self.text.len();
        self.text.push(REPLACEMENT_CHAR);
        let range = start..self.text.len();
        self.extend_blocks(range.clone());
        self.placeholders.push(Placeholder { range, style });
        self
    }

    fn extend_blocks(&mut self, range: Range<usize>) {
        let style = self.style_stack.last().unwrap_or(&self.style.text_style);
        match self.blocks.last_mut() {
            Some(last) if last.style == *style => last.range.end = range.end,
            _ => self.blocks.push(StyleBlock {
                range,
                style: style.clone(),
            }),
        }
    }

    /// Returns the text added so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Builds the paragraph, leaving the builder empty.
    pub fn build(&mut self) -> Paragraph<B> {
        let text = core::mem::take(&mut self.text);
        let mut blocks = core::mem::take(&mut self.blocks);
        if blocks.is_empty() {
            blocks.push(StyleBlock {
                range: 0..0,
                style: self.style.text_style.clone(),
            });
        }
        self.style_stack.clear();
        Paragraph::new(
            self.style.clone(),
            self.lcx.clone(),
            text,
            blocks,
            core::mem::take(&mut self.placeholders),
        )
    }
}
