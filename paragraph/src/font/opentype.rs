// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typefaces backed by OpenType font data.

use core::any::Any;
use std::sync::Arc;

use linebender_resource_handle::Blob;
use skrifa::instance::{LocationRef, Size};
use skrifa::string::StringId;
use skrifa::{FontRef, MetadataProvider};

use super::{FontMetrics, Typeface, next_typeface_id};
use crate::Error;
use crate::style::{FontAttributes, FontStyle, FontWeight, FontWidth};

/// A [`Typeface`] reading an OpenType font with `skrifa`.
///
/// Shaped by [`HarfrustShaper`](crate::shape::HarfrustShaper).
#[derive(Clone, Debug)]
pub struct SkrifaFace {
    id: u64,
    data: Blob<u8>,
    index: u32,
    family: String,
    attributes: FontAttributes,
    units_per_em: f32,
    /// Unscaled metrics, in font units.
    metrics: FontMetrics,
}

impl SkrifaFace {
    /// Loads the font at `index` in `data`.
    pub fn new(data: Blob<u8>, index: u32) -> Result<Self, Error> {
        let font = FontRef::from_index(data.as_ref(), index)
            .map_err(|_| Error::invalid_font_data(data.as_ref().len()))?;
        let family = font
            .localized_strings(StringId::FAMILY_NAME)
            .english_or_first()
            .map(|name| name.chars().collect::<String>())
            .unwrap_or_default();
        let attrs = font.attributes();
        let attributes = FontAttributes::new(
            FontWidth::from_ratio(attrs.stretch.ratio()),
            match attrs.style {
                skrifa::attribute::Style::Normal => FontStyle::Normal,
                skrifa::attribute::Style::Italic => FontStyle::Italic,
                skrifa::attribute::Style::Oblique(angle) => FontStyle::Oblique(angle),
            },
            FontWeight::new(attrs.weight.value()),
        );
        let raw = font.metrics(Size::unscaled(), LocationRef::default());
        let (underline_offset, underline_size) = raw
            .underline
            .map(|d| (-d.offset, d.thickness))
            .unwrap_or_default();
        let (strikethrough_offset, strikethrough_size) = raw
            .strikeout
            .map(|d| (-d.offset, d.thickness))
            .unwrap_or_default();
        let metrics = FontMetrics {
            ascent: raw.ascent,
            descent: -raw.descent,
            leading: raw.leading,
            underline_offset,
            underline_size,
            strikethrough_offset,
            strikethrough_size,
        };
        Ok(Self {
            id: next_typeface_id(),
            data,
            index,
            family,
            attributes,
            units_per_em: f32::from(raw.units_per_em.max(1)),
            metrics,
        })
    }

    /// Loads the font at `index` in an owned buffer.
    pub fn from_vec(data: Vec<u8>, index: u32) -> Result<Self, Error> {
        Self::new(Blob::new(Arc::new(data)), index)
    }

    /// Overrides the family name read from the font.
    pub fn with_family_name(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    /// Returns the font data.
    pub fn data(&self) -> &Blob<u8> {
        &self.data
    }

    /// Returns the index of the font in its collection file.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the design units per em.
    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    pub(crate) fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(self.data.as_ref(), self.index).ok()
    }
}

impl Typeface for SkrifaFace {
    fn id(&self) -> u64 {
        self.id
    }

    fn family_name(&self) -> &str {
        &self.family
    }

    fn attributes(&self) -> FontAttributes {
        self.attributes
    }

    fn has_glyph(&self, ch: char) -> bool {
        self.font_ref()
            .and_then(|font| font.charmap().map(ch))
            .is_some_and(|glyph| glyph.to_u32() != 0)
    }

    fn metrics(&self, size: f32) -> FontMetrics {
        let scale = size / self.units_per_em;
        let m = &self.metrics;
        FontMetrics {
            ascent: m.ascent * scale,
            descent: m.descent * scale,
            leading: m.leading * scale,
            underline_offset: m.underline_offset * scale,
            underline_size: m.underline_size * scale,
            strikethrough_offset: m.strikethrough_offset * scale,
            strikethrough_size: m.strikethrough_size * scale,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
