// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Visual weight class of a font, typically on a scale from 1.0 to 1000.0.
///
/// In CSS, this corresponds to the `font-weight` property.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FontWeight(f32);

impl FontWeight {
    /// Weight value of 100.
    pub const THIN: Self = Self(100.0);

    /// Weight value of 300.
    pub const LIGHT: Self = Self(300.0);

    /// Weight value of 400. This is the default value.
    pub const NORMAL: Self = Self(400.0);

    /// Weight value of 500.
    pub const MEDIUM: Self = Self(500.0);

    /// Weight value of 600.
    pub const SEMI_BOLD: Self = Self(600.0);

    /// Weight value of 700.
    pub const BOLD: Self = Self(700.0);

    /// Weight value of 900.
    pub const BLACK: Self = Self(900.0);

    /// Creates a new weight value.
    pub fn new(weight: f32) -> Self {
        Self(weight)
    }

    /// Returns the underlying weight value.
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual width of a font, as a ratio of the normal width.
///
/// In CSS, this corresponds to the `font-width` (`font-stretch`) property.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FontWidth(f32);

impl FontWidth {
    /// Width that is 50% of normal.
    pub const ULTRA_CONDENSED: Self = Self(0.5);

    /// Width that is 75% of normal.
    pub const CONDENSED: Self = Self(0.75);

    /// Width that is 100% of normal. This is the default value.
    pub const NORMAL: Self = Self(1.0);

    /// Width that is 125% of normal.
    pub const EXPANDED: Self = Self(1.25);

    /// Width that is 200% of normal.
    pub const ULTRA_EXPANDED: Self = Self(2.0);

    /// Creates a new width attribute with the given ratio.
    pub fn from_ratio(ratio: f32) -> Self {
        Self(ratio)
    }

    /// Returns the width as a ratio, with 1.0 being the normal width.
    pub fn ratio(self) -> f32 {
        self.0
    }

    /// Returns the width as a percentage, with 100.0 being the normal width.
    pub fn percentage(self) -> f32 {
        self.0 * 100.0
    }
}

impl Default for FontWidth {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for FontWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

/// Visual style or "slope" of a font.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum FontStyle {
    /// `normal`.
    #[default]
    Normal,
    /// `italic`.
    Italic,
    /// `oblique` with an optional angle in degrees.
    Oblique(Option<f32>),
}

impl FontStyle {
    /// Default oblique angle in degrees.
    pub const DEFAULT_OBLIQUE_ANGLE: f32 = 14.0;

    fn key(self) -> (u8, u32) {
        match self {
            Self::Normal => (0, 0),
            Self::Italic => (1, 0),
            Self::Oblique(angle) => (
                2,
                angle.unwrap_or(Self::DEFAULT_OBLIQUE_ANGLE).to_bits(),
            ),
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Italic => f.write_str("italic"),
            Self::Oblique(None) => f.write_str("oblique"),
            Self::Oblique(Some(angle)) => write!(f, "oblique {angle}deg"),
        }
    }
}

/// Primary attributes for font matching: width, style and weight.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct FontAttributes {
    /// Font width.
    pub width: FontWidth,
    /// Font style.
    pub style: FontStyle,
    /// Font weight.
    pub weight: FontWeight,
}

impl FontAttributes {
    /// Creates new attributes from the given width, style and weight.
    pub fn new(width: FontWidth, style: FontStyle, weight: FontWeight) -> Self {
        Self {
            width,
            style,
            weight,
        }
    }

    /// Returns a hashable representation of the attributes.
    pub(crate) fn key(&self) -> (u32, (u8, u32), u32) {
        (
            self.width.ratio().to_bits(),
            self.style.key(),
            self.weight.value().to_bits(),
        )
    }
}

impl fmt::Display for FontAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width: {}, style: {}, weight: {}",
            self.width, self.style, self.weight
        )
    }
}
