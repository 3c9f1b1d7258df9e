// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Mutex, PoisonError};

use hashbrown::HashMap;

use super::Font;
use super::matching::match_font;
use crate::style::FontAttributes;

/// Font resolution service consulted by the shaping orchestrator.
///
/// Every method may return `None`; the orchestrator then moves on to the
/// next candidate in its fallback chain.
pub trait FontMatcher: Send + Sync {
    /// Returns the typeface of `family` that best matches `attributes`.
    fn match_family(&self, family: &str, attributes: FontAttributes) -> Option<Font>;

    /// Returns a typeface able to render `ch`.
    fn match_fallback(
        &self,
        ch: char,
        attributes: FontAttributes,
        locale: Option<&str>,
    ) -> Option<Font>;

    /// Returns the default typeface of the collection.
    fn default_font(&self, attributes: FontAttributes) -> Option<Font>;
}

type MatchKey = (String, (u32, (u8, u32), u32));
type FallbackKey = (char, (u32, (u8, u32), u32));

struct Family {
    name: String,
    fonts: Vec<Font>,
}

/// A registry of typefaces grouped by family, with memoized matching.
///
/// Family names are compared ASCII case-insensitively. Fallback searches the
/// families in registration order, preferring the default family.
#[derive(Default)]
pub struct FontCollection {
    families: Vec<Family>,
    default_family: Option<String>,
    family_cache: Mutex<HashMap<MatchKey, Option<Font>>>,
    fallback_cache: Mutex<HashMap<FallbackKey, Option<Font>>>,
}

impl FontCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a typeface under its family name.
    pub fn register(&mut self, font: Font) {
        let name = font.typeface().family_name().to_owned();
        match self.family_index(&name) {
            Some(index) => self.families[index].fonts.push(font),
            None => self.families.push(Family {
                name,
                fonts: vec![font],
            }),
        }
        self.clear_caches();
    }

    /// Sets the family used by [`FontMatcher::default_font`].
    ///
    /// Without one, the first registered family is the default.
    pub fn set_default_family(&mut self, name: impl Into<String>) {
        self.default_family = Some(name.into());
        self.clear_caches();
    }

    /// Returns an iterator over the registered family names.
    pub fn family_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.families.iter().map(|family| family.name.as_str())
    }

    fn family_index(&self, name: &str) -> Option<usize> {
        self.families
            .iter()
            .position(|family| family.name.eq_ignore_ascii_case(name))
    }

    fn best_in(family: &Family, attributes: FontAttributes) -> Option<Font> {
        let set: Vec<FontAttributes> = family
            .fonts
            .iter()
            .map(|font| font.typeface().attributes())
            .collect();
        let index = match_font(&set, attributes)?;
        family.fonts.get(index).cloned()
    }

    fn clear_caches(&mut self) {
        self.family_cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.fallback_cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn default_family(&self) -> Option<&Family> {
        match &self.default_family {
            Some(name) => self.family_index(name).map(|index| &self.families[index]),
            None => self.families.first(),
        }
    }
}

impl FontMatcher for FontCollection {
    fn match_family(&self, family: &str, attributes: FontAttributes) -> Option<Font> {
        let key = (family.to_ascii_lowercase(), attributes.key());
        let mut cache = self
            .family_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(key)
            .or_insert_with(|| {
                let index = self.family_index(family)?;
                Self::best_in(&self.families[index], attributes)
            })
            .clone()
    }

    fn match_fallback(
        &self,
        ch: char,
        attributes: FontAttributes,
        _locale: Option<&str>,
    ) -> Option<Font> {
        let key = (ch, attributes.key());
        let mut cache = self
            .fallback_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(key)
            .or_insert_with(|| {
                let default = self.default_family();
                let families = default.into_iter().chain(
                    self.families
                        .iter()
                        .filter(|family| default.is_none_or(|d| !core::ptr::eq(*family, d))),
                );
                for family in families {
                    let covering = Family {
                        name: family.name.clone(),
                        fonts: family
                            .fonts
                            .iter()
                            .filter(|font| font.has_glyph(ch))
                            .cloned()
                            .collect(),
                    };
                    if let Some(font) = Self::best_in(&covering, attributes) {
                        log::debug!(
                            "fallback for U+{:04X}: family {:?}",
                            u32::from(ch),
                            family.name
                        );
                        return Some(font);
                    }
                }
                None
            })
            .clone()
    }

    fn default_font(&self, attributes: FontAttributes) -> Option<Font> {
        Self::best_in(self.default_family()?, attributes)
    }
}

impl core::fmt::Debug for FontCollection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontCollection")
            .field("families", &self.family_names().collect::<Vec<_>>())
            .field("default_family", &self.default_family)
            .finish_non_exhaustive()
    }
}
