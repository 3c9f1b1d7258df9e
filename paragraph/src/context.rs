// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Context for layout.

use std::sync::Arc;

use crate::analysis::{BidiOracle, BreakOracle, IcuBreakOracle, UnicodeBidiOracle};
use crate::font::FontMatcher;
use crate::shape::{ShapeCache, Shaper};

/// Services used to lay out paragraphs.
///
/// This is cheap to clone. Paragraphs built from clones share the font
/// matcher, shaper, oracles and shaping cache.
#[derive(Clone)]
pub struct LayoutContext {
    pub(crate) fonts: Arc<dyn FontMatcher>,
    pub(crate) shaper: Arc<dyn Shaper>,
    pub(crate) breaks: Arc<dyn BreakOracle>,
    pub(crate) bidi: Arc<dyn BidiOracle>,
    pub(crate) shape_cache: Option<Arc<ShapeCache>>,
    pub(crate) font_fallback: bool,
}

impl LayoutContext {
    /// Creates a context with the ICU break oracle, the `unicode-bidi` oracle,
    /// font fallback enabled and no shaping cache.
    pub fn new(fonts: Arc<dyn FontMatcher>, shaper: Arc<dyn Shaper>) -> Self {
        Self {
            fonts,
            shaper,
            breaks: Arc::new(IcuBreakOracle),
            bidi: Arc::new(UnicodeBidiOracle),
            shape_cache: None,
            font_fallback: true,
        }
    }

    /// Creates a context shaping with [`HarfrustShaper`](crate::shape::HarfrustShaper).
    #[cfg(feature = "harfrust")]
    pub fn with_harfrust(fonts: Arc<dyn FontMatcher>) -> Self {
        Self::new(fonts, Arc::new(crate::shape::HarfrustShaper::new()))
    }

    /// Replaces the break oracle.
    pub fn with_break_oracle(mut self, breaks: Arc<dyn BreakOracle>) -> Self {
        self.breaks = breaks;
        self
    }

    /// Replaces the bidi oracle.
    pub fn with_bidi_oracle(mut self, bidi: Arc<dyn BidiOracle>) -> Self {
        self.bidi = bidi;
        self
    }

    /// Shares shaping results through `cache`.
    pub fn with_shape_cache(mut self, cache: Arc<ShapeCache>) -> Self {
        self.shape_cache = Some(cache);
        self
    }

    /// Enables or disables per-character font fallback.
    pub fn with_font_fallback(mut self, enabled: bool) -> Self {
        self.font_fallback = enabled;
        self
    }

    /// Returns the font matcher.
    pub fn fonts(&self) -> &dyn FontMatcher {
        &*self.fonts
    }

    /// Returns `true` if per-character font fallback is enabled.
    pub fn font_fallback(&self) -> bool {
        self.font_fallback
    }
}

impl core::fmt::Debug for LayoutContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("shape_cache", &self.shape_cache)
            .field("font_fallback", &self.font_fallback)
            .finish_non_exhaustive()
    }
}
