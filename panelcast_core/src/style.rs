// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style bits, colors, and the palette service that resolves them.
//!
//! Element colors are normally *not* transmitted: the receiver derives them
//! from the element's style bits, its touch state, and the panel's color
//! scheme and blink phase. [`Palette::effective_color`] is that derivation,
//! and both sides of a transport must agree on it.
//!
//! A [`Palette`] is an ordinary value. Construct one, hand it to whatever
//! needs to resolve colors, and swap in a fixed palette for tests.

use core::fmt;

use bitflags::bitflags;

use crate::element::ElementState;
use crate::panel::PanelState;

/// A 32-bit ARGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self(0);

    /// Creates an opaque color from 8-bit channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    /// Creates a color from 8-bit channels including alpha.
    #[must_use]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Returns the `[a, r, g, b]` channels.
    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Linearly blends the color channels towards `target` by `t` (0.0–1.0).
    ///
    /// Alpha is kept from `self`.
    #[must_use]
    pub fn blend(self, target: Self, t: f32) -> Self {
        let [a, r, g, b] = self.channels();
        let [_, tr, tg, tb] = target.channels();
        let mix = |from: u8, to: u8| -> u8 {
            let v = f32::from(from) + (f32::from(to) - f32::from(from)) * t.clamp(0.0, 1.0);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "value is clamped to the u8 range before the cast"
            )]
            let out = v.round().clamp(0.0, 255.0) as u8;
            out
        };
        Self::argb(a, mix(r, tr), mix(g, tg), mix(b, tb))
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08x})", self.0)
    }
}

bitflags! {
    /// Visual style of an element.
    ///
    /// The low four bits select one of sixteen palette entries; the remaining
    /// bits select a variant of that entry or modify behavior.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StyleBits: u32 {
        /// Palette entry index (0–15).
        const COLOR = 0x0000_000F;
        /// Selected variant. Also toggled by touch and by the blink phase.
        const SELECTED = 0x0000_0010;
        /// Disabled variant.
        const DISABLED = 0x0000_0020;
        /// The element takes part in the panel's blink phase.
        const BLINKING = 0x0000_0040;
        /// The element does not react to touch.
        const STATIC = 0x0000_0080;
    }
}

impl StyleBits {
    /// Returns style bits with the given palette entry index (masked to 0–15).
    #[must_use]
    pub const fn with_color_index(index: u8) -> Self {
        Self::from_bits_retain(index as u32 & Self::COLOR.bits())
    }

    /// Returns the palette entry index.
    #[must_use]
    pub const fn color_index(self) -> usize {
        (self.bits() & Self::COLOR.bits()) as usize
    }

    /// Returns the variant slot (0 plain, 1 selected, 2 disabled, 3 both).
    #[must_use]
    pub const fn variant(self) -> usize {
        let mut v = 0;
        if self.contains(Self::SELECTED) {
            v |= 1;
        }
        if self.contains(Self::DISABLED) {
            v |= 2;
        }
        v
    }
}

/// Identifies one of the palette's color schemes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSchemeId(pub u8);

impl fmt::Debug for ColorSchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColorSchemeId({})", self.0)
    }
}

/// Colors of one scheme: sixteen entries with four variants each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTable {
    entries: [[Color; 4]; 16],
    text: Color,
}

impl ColorTable {
    /// Builds a table from sixteen base colors.
    ///
    /// The selected variant is lightened, the disabled variant darkened.
    #[must_use]
    pub fn from_base(base: [Color; 16], text: Color) -> Self {
        let entries = base.map(|c| {
            [
                c,
                c.blend(Color::WHITE, 0.4),
                c.blend(Color::BLACK, 0.5),
                c.blend(Color::BLACK, 0.3),
            ]
        });
        Self { entries, text }
    }

    /// Builds a table from explicit entries.
    #[must_use]
    pub const fn from_entries(entries: [[Color; 4]; 16], text: Color) -> Self {
        Self { entries, text }
    }

    /// Returns the color for the given style key.
    #[must_use]
    pub fn lookup(&self, key: StyleBits) -> Color {
        self.entries[key.color_index()][key.variant()]
    }

    /// Returns the text color of this scheme.
    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }
}

/// Style-resolution service mapping `(scheme, style key)` to colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    // Never empty: index 0 is the fallback for unknown schemes.
    schemes: Vec<ColorTable>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl Palette {
    /// Creates a palette with a single scheme.
    #[must_use]
    pub fn new(default_scheme: ColorTable) -> Self {
        Self {
            schemes: vec![default_scheme],
        }
    }

    /// The built-in palette with a warm and a cool scheme.
    #[must_use]
    pub fn standard() -> Self {
        let warm = ColorTable::from_base(
            [
                Color::rgb(0xFF, 0x99, 0x00),
                Color::rgb(0xCC, 0x99, 0xCC),
                Color::rgb(0x99, 0x99, 0xCC),
                Color::rgb(0xCC, 0x66, 0x66),
                Color::rgb(0xFF, 0xCC, 0x99),
                Color::rgb(0x99, 0x99, 0xFF),
                Color::rgb(0xFF, 0x99, 0x66),
                Color::rgb(0xCC, 0x66, 0x99),
                Color::rgb(0x66, 0x88, 0xCC),
                Color::rgb(0xDD, 0xBB, 0x55),
                Color::rgb(0x88, 0xCC, 0x88),
                Color::rgb(0xBB, 0x44, 0x11),
                Color::rgb(0x77, 0x77, 0x77),
                Color::rgb(0xAA, 0xAA, 0xAA),
                Color::rgb(0x33, 0x33, 0x33),
                Color::rgb(0xFF, 0xFF, 0xFF),
            ],
            Color::BLACK,
        );
        let cool = ColorTable::from_base(
            [
                Color::rgb(0x33, 0x66, 0x99),
                Color::rgb(0x66, 0x99, 0xCC),
                Color::rgb(0x99, 0xCC, 0xFF),
                Color::rgb(0x33, 0x99, 0x99),
                Color::rgb(0x66, 0xCC, 0xCC),
                Color::rgb(0x44, 0x55, 0x88),
                Color::rgb(0x22, 0x44, 0x66),
                Color::rgb(0x55, 0x77, 0xAA),
                Color::rgb(0x88, 0xAA, 0xCC),
                Color::rgb(0x33, 0x77, 0x55),
                Color::rgb(0x55, 0xAA, 0x77),
                Color::rgb(0xCC, 0x33, 0x33),
                Color::rgb(0x66, 0x66, 0x66),
                Color::rgb(0x99, 0x99, 0x99),
                Color::rgb(0x22, 0x22, 0x22),
                Color::rgb(0xEE, 0xEE, 0xEE),
            ],
            Color::WHITE,
        );
        Self {
            schemes: vec![warm, cool],
        }
    }

    /// Adds or replaces the table for `id`.
    ///
    /// Gaps below `id` are filled with copies of the fallback scheme.
    #[must_use]
    pub fn with_scheme(mut self, id: ColorSchemeId, table: ColorTable) -> Self {
        let idx = usize::from(id.0);
        while self.schemes.len() <= idx {
            let fallback = self.schemes[0].clone();
            self.schemes.push(fallback);
        }
        self.schemes[idx] = table;
        self
    }

    /// Returns the table for `id`, falling back to the first scheme.
    #[must_use]
    pub fn scheme(&self, id: ColorSchemeId) -> &ColorTable {
        self.schemes
            .get(usize::from(id.0))
            .unwrap_or(&self.schemes[0])
    }

    /// Looks up a color for an already-combined style key.
    #[must_use]
    pub fn lookup(&self, id: ColorSchemeId, key: StyleBits) -> Color {
        self.scheme(id).lookup(key)
    }

    /// Returns the key an element's color is looked up with.
    ///
    /// Touch and the blink phase each toggle the selected variant, so the
    /// key is `style XOR touch XOR blink`.
    #[must_use]
    pub fn style_key(element: &ElementState, panel: &PanelState) -> StyleBits {
        let touch = if element.touched() {
            StyleBits::SELECTED
        } else {
            StyleBits::empty()
        };
        let blink = if element.style().contains(StyleBits::BLINKING) && panel.blink() {
            StyleBits::SELECTED
        } else {
            StyleBits::empty()
        };
        element.style() ^ touch ^ blink
    }

    /// Resolves the background color an element is painted with.
    ///
    /// An explicit color override wins, then white for highlighted elements,
    /// then the palette entry for [`style_key`](Self::style_key).
    #[must_use]
    pub fn effective_color(&self, element: &ElementState, panel: &PanelState) -> Color {
        if let Some(color) = element.color() {
            return color;
        }
        if element.highlighted() {
            return Color::WHITE;
        }
        self.lookup(panel.color_scheme(), Self::style_key(element, panel))
    }

    /// Returns the text color for the panel's current scheme.
    #[must_use]
    pub fn text_color(&self, panel: &PanelState) -> Color {
        self.scheme(panel.color_scheme()).text()
    }
}
