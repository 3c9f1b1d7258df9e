// Copyright 2021 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph layout.
//!
//! A [`ParagraphBuilder`] collects styled text and placeholders into a
//! [`Paragraph`]. Laying the paragraph out shapes the text with font fallback,
//! builds a table of glyph clusters, breaks it into lines and aligns them.
//! The result can be painted into any [`Canvas`](paint::Canvas) and queried
//! for line metrics, selection boxes and hit testing.
//!
//! Shaping, font matching, segmentation and bidi analysis are services held
//! by a [`LayoutContext`], so each can be replaced. With the `harfrust`
//! feature, [`shape::HarfrustShaper`] shapes [`font::SkrifaFace`] fonts.

mod builder;
mod context;
mod error;
#[cfg(feature = "harfrust")]
mod lru_cache;
mod paragraph;
mod placeholder;
mod util;

pub mod analysis;
pub mod font;
pub mod layout;
pub mod paint;
pub mod shape;
pub mod style;

#[cfg(test)]
mod tests;

pub use peniko::kurbo;

pub use builder::{ParagraphBuilder, StyleBlock};
pub use context::LayoutContext;
pub use error::{Error, ErrorKind};
pub use paragraph::{LayoutState, Paragraph};
pub use placeholder::{Placeholder, PlaceholderAlignment, PlaceholderStyle};
