// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Mutex, PoisonError};

use super::{ShapeRequest, ShapedGlyph, Shaper};
use crate::font::SkrifaFace;
use crate::lru_cache::{LookupKey, LruCache};

#[derive(PartialEq, Copy, Clone, Debug)]
struct ShapeDataKey {
    /// The font data blob ID.
    font_blob_id: u64,
    /// The font's index in its collection file.
    font_index: u32,
}

impl LookupKey<ShapeDataKey> for ShapeDataKey {
    fn eq(&self, other: &ShapeDataKey) -> bool {
        self == other
    }

    fn to_id(self) -> ShapeDataKey {
        self
    }
}

/// A [`Shaper`] using `harfrust` for fonts loaded as [`SkrifaFace`].
///
/// Other typefaces shape to missing glyphs, so the orchestrator moves on to
/// the next candidate font.
pub struct HarfrustShaper {
    shape_data_cache: Mutex<LruCache<ShapeDataKey, harfrust::ShaperData>>,
}

impl Default for HarfrustShaper {
    fn default() -> Self {
        const MAX_ENTRIES: usize = 16;
        Self {
            shape_data_cache: Mutex::new(LruCache::new(MAX_ENTRIES)),
        }
    }
}

impl HarfrustShaper {
    /// Creates a shaper.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Shaper for HarfrustShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        let source = &request.text[request.range.clone()];
        let unresolved = || {
            source
                .char_indices()
                .map(|(offset, _)| ShapedGlyph {
                    cluster: request.range.start + offset,
                    ..ShapedGlyph::default()
                })
                .collect()
        };
        let Some(face) = request
            .font
            .typeface()
            .as_any()
            .downcast_ref::<SkrifaFace>()
        else {
            return unresolved();
        };
        let Ok(font_ref) = harfrust::FontRef::from_index(face.data().as_ref(), face.index()) else {
            log::warn!("font data of {:?} is unreadable", request.font);
            return unresolved();
        };

        let mut cache = self
            .shape_data_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let shaper_data = cache.entry(
            ShapeDataKey {
                font_blob_id: face.data().id(),
                font_index: face.index(),
            },
            || harfrust::ShaperData::new(&font_ref),
        );
        let shaper = shaper_data
            .shaper(&font_ref)
            .point_size(Some(request.font_size))
            .build();

        let direction = if request.rtl {
            harfrust::Direction::RightToLeft
        } else {
            harfrust::Direction::LeftToRight
        };
        let mut buffer = harfrust::UnicodeBuffer::new();
        buffer.reserve(source.len());
        for (offset, ch) in source.char_indices() {
            let cluster = u32::try_from(request.range.start + offset).unwrap_or(u32::MAX);
            buffer.add(ch, cluster);
        }
        buffer.set_direction(direction);
        if let Some(script) =
            harfrust::Script::from_iso15924_tag(harfrust::Tag::new(&request.script))
        {
            buffer.set_script(script);
        }
        if let Some(language) = request
            .locale
            .and_then(|locale| locale.parse::<harfrust::Language>().ok())
        {
            buffer.set_language(language);
        }

        let glyph_buffer = shaper.shape(buffer, &[]);
        let scale = request.font_size / face.units_per_em();
        glyph_buffer
            .glyph_infos()
            .iter()
            .zip(glyph_buffer.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                id: info.glyph_id,
                cluster: info.cluster as usize,
                advance: pos.x_advance as f32 * scale,
                x: pos.x_offset as f32 * scale,
                y: -(pos.y_offset as f32) * scale,
            })
            .collect()
    }
}

impl core::fmt::Debug for HarfrustShaper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HarfrustShaper").finish_non_exhaustive()
    }
}
