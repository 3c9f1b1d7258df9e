// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

use hashbrown::HashMap;

use super::ShapeInput;
use crate::font::Font;
use crate::layout::data::{Glyph, LayoutData, RunData};
use crate::style::{Brush, ShapingAttributes};

/// Everything that determines the shaped runs of a paragraph.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ShapeKey {
    text: String,
    blocks: Vec<(Range<usize>, ShapingAttributes)>,
    /// Placeholder ranges with the bits of their width.
    placeholders: Vec<(Range<usize>, u32)>,
    rtl: bool,
    font_fallback: bool,
}

impl ShapeKey {
    pub(crate) fn new<B: Brush>(input: &ShapeInput<'_, B>, font_fallback: bool) -> Self {
        Self {
            text: input.text.to_owned(),
            blocks: input
                .blocks
                .iter()
                .map(|block| (block.range.clone(), block.style.shaping_attributes()))
                .collect(),
            placeholders: input
                .placeholders
                .iter()
                .map(|p| (p.range.clone(), p.style.width.to_bits()))
                .collect(),
            rtl: input.rtl,
            font_fallback,
        }
    }
}

#[derive(Debug)]
struct ShapedText {
    fonts: Vec<Font>,
    runs: Vec<RunData>,
    glyphs: Vec<Glyph>,
}

/// A cache of shaped paragraphs, shared between layout contexts.
///
/// Entries are never evicted. A cache must only be shared between contexts
/// that use the same font matcher and shaper.
#[derive(Default)]
pub struct ShapeCache {
    entries: Mutex<HashMap<ShapeKey, Arc<ShapedText>>>,
}

impl ShapeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached paragraphs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ShapeKey, Arc<ShapedText>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the runs cached for `key` into `data`.
    pub(crate) fn restore(&self, key: &ShapeKey, data: &mut LayoutData) -> bool {
        let Some(shaped) = self.lock().get(key).cloned() else {
            return false;
        };
        log::trace!("shape cache hit for {} bytes", key.text.len());
        data.fonts.clone_from(&shaped.fonts);
        data.runs.clone_from(&shaped.runs);
        data.glyphs.clone_from(&shaped.glyphs);
        true
    }

    /// Caches the runs of `data` for `key`.
    pub(crate) fn store(&self, key: ShapeKey, data: &LayoutData) {
        let shaped = ShapedText {
            fonts: data.fonts.clone(),
            runs: data.runs.clone(),
            glyphs: data.glyphs.clone(),
        };
        self.lock().insert(key, Arc::new(shaped));
    }
}

impl core::fmt::Debug for ShapeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShapeCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
