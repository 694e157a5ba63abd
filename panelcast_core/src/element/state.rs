// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-tracked per-element attributes.

use bitflags::bitflags;
use kurbo::Rect;

use crate::style::{Color, StyleBits};

bitflags! {
    /// One bit per logical field group of an element.
    ///
    /// [`GEOMETRY`](Self::GEOMETRY) never appears in an [`ElementState`]'s own
    /// mask; it is reported by [`ElementData::apply_update`] when a record
    /// carried different geometry.
    ///
    /// [`ElementData::apply_update`]: super::ElementData::apply_update
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ElementChanges: u16 {
        /// Bounds rectangle.
        const BOUNDS = 1 << 0;
        /// Explicit color override.
        const COLOR = 1 << 1;
        /// Opacity.
        const OPACITY = 1 << 2;
        /// Style bits.
        const STYLE = 1 << 3;
        /// Visibility flag.
        const VISIBILITY = 1 << 4;
        /// Highlight flag.
        const HIGHLIGHT = 1 << 5;
        /// Transient touch state.
        const TOUCH = 1 << 6;
        /// Shape list.
        const GEOMETRY = 1 << 7;
        /// Every state field group.
        const STATE = Self::BOUNDS.bits()
            | Self::COLOR.bits()
            | Self::OPACITY.bits()
            | Self::STYLE.bits()
            | Self::VISIBILITY.bits()
            | Self::HIGHLIGHT.bits()
            | Self::TOUCH.bits();
    }
}

/// Attributes of one element, with a mask of what changed since the last
/// transfer.
///
/// Equality compares the observable fields only; the change mask is
/// bookkeeping and does not take part.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementState {
    bounds: Rect,
    color: Option<Color>,
    opacity: f32,
    style: StyleBits,
    visible: bool,
    highlighted: bool,
    touched: bool,
    changed: ElementChanges,
}

impl PartialEq for ElementState {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_empty()
    }
}

impl ElementState {
    /// Creates a visible, fully opaque state with the given bounds.
    ///
    /// Every field group starts out marked as changed, since nothing has been
    /// transmitted yet.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            color: None,
            opacity: 1.0,
            style: StyleBits::empty(),
            visible: true,
            highlighted: false,
            touched: false,
            changed: ElementChanges::STATE,
        }
    }

    // -- Getters --

    /// Returns the bounds rectangle in panel coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the explicit color override, if any.
    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns the opacity (0.0–1.0).
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Returns the style bits.
    #[must_use]
    pub fn style(&self) -> StyleBits {
        self.style
    }

    /// Returns the visibility flag.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Returns the highlight flag.
    #[must_use]
    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    /// Returns whether the element is currently touched.
    #[must_use]
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Returns whether the element covers any area on screen.
    ///
    /// Hidden elements and elements with zero-area bounds are not painted.
    #[must_use]
    pub fn is_displayed(&self) -> bool {
        self.visible && !self.bounds.is_zero_area()
    }

    // -- Setters (mark changed only on an actual change) --

    /// Sets the bounds rectangle.
    pub fn set_bounds(&mut self, bounds: Rect) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.changed |= ElementChanges::BOUNDS;
        }
    }

    /// Sets or clears the explicit color override.
    pub fn set_color(&mut self, color: Option<Color>) {
        if self.color != color {
            self.color = color;
            self.changed |= ElementChanges::COLOR;
        }
    }

    /// Sets the opacity.
    pub fn set_opacity(&mut self, opacity: f32) {
        if self.opacity != opacity {
            self.opacity = opacity;
            self.changed |= ElementChanges::OPACITY;
        }
    }

    /// Replaces the style bits.
    pub fn set_style(&mut self, style: StyleBits) {
        if self.style != style {
            self.style = style;
            self.changed |= ElementChanges::STYLE;
        }
    }

    /// Sets or clears individual style bits.
    pub fn set_style_bits(&mut self, bits: StyleBits, on: bool) {
        let mut style = self.style;
        style.set(bits, on);
        self.set_style(style);
    }

    /// Sets the visibility flag.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.changed |= ElementChanges::VISIBILITY;
        }
    }

    /// Sets the highlight flag.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        if self.highlighted != highlighted {
            self.highlighted = highlighted;
            self.changed |= ElementChanges::HIGHLIGHT;
        }
    }

    /// Sets the transient touch state.
    pub fn set_touched(&mut self, touched: bool) {
        if self.touched != touched {
            self.touched = touched;
            self.changed |= ElementChanges::TOUCH;
        }
    }

    // -- Change tracking --

    /// Returns the mask of field groups changed since the last transfer.
    #[must_use]
    pub fn changes(&self) -> ElementChanges {
        self.changed
    }

    /// Returns whether anything changed since the last transfer.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Marks every field group as changed, forcing the next incremental
    /// transfer to carry the state.
    pub fn mark_all_changed(&mut self) {
        self.changed = ElementChanges::STATE;
    }

    /// Takes a copy for transfer and clears the change mask.
    ///
    /// Returns `None` when `incremental` is set and nothing changed. The
    /// returned copy keeps the mask it was taken with, for diagnostics.
    pub fn take_update(&mut self, incremental: bool) -> Option<Self> {
        if incremental && self.changed.is_empty() {
            return None;
        }
        let copy = self.clone();
        self.changed = ElementChanges::empty();
        Some(copy)
    }

    /// Compares observable fields and returns the groups that differ.
    ///
    /// All comparisons are exact; every field is a flag, an integer, a color
    /// or a coordinate that is copied rather than computed.
    #[must_use]
    pub fn diff(&self, other: &Self) -> ElementChanges {
        let mut diff = ElementChanges::empty();
        if self.bounds != other.bounds {
            diff |= ElementChanges::BOUNDS;
        }
        if self.color != other.color {
            diff |= ElementChanges::COLOR;
        }
        if self.opacity != other.opacity {
            diff |= ElementChanges::OPACITY;
        }
        if self.style != other.style {
            diff |= ElementChanges::STYLE;
        }
        if self.visible != other.visible {
            diff |= ElementChanges::VISIBILITY;
        }
        if self.highlighted != other.highlighted {
            diff |= ElementChanges::HIGHLIGHT;
        }
        if self.touched != other.touched {
            diff |= ElementChanges::TOUCH;
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn new_state_is_fully_changed() {
        let state = ElementState::new(rect());
        assert_eq!(state.changes(), ElementChanges::STATE);
    }

    #[test]
    fn setting_same_value_does_not_mark() {
        let mut state = ElementState::new(rect());
        let _ = state.take_update(false);
        state.set_bounds(rect());
        state.set_opacity(1.0);
        state.set_visible(true);
        state.set_style(StyleBits::empty());
        assert!(!state.is_changed(), "no-op setters marked {:?}", state.changes());
    }

    #[test]
    fn setters_mark_their_group() {
        let mut state = ElementState::new(rect());
        let _ = state.take_update(false);

        state.set_bounds(Rect::new(1.0, 0.0, 11.0, 10.0));
        state.set_touched(true);
        assert_eq!(
            state.changes(),
            ElementChanges::BOUNDS | ElementChanges::TOUCH
        );
    }

    #[test]
    fn incremental_update_twice_yields_none() {
        let mut state = ElementState::new(rect());
        assert!(state.take_update(true).is_some());
        assert!(state.take_update(true).is_none());
    }

    #[test]
    fn full_update_always_returns_copy() {
        let mut state = ElementState::new(rect());
        let _ = state.take_update(true);
        let copy = state.take_update(false);
        assert_eq!(copy, Some(state.clone()));
    }

    #[test]
    fn copy_keeps_mask_and_source_clears() {
        let mut state = ElementState::new(rect());
        let _ = state.take_update(false);
        state.set_highlighted(true);
        let copy = state.take_update(true).unwrap();
        assert_eq!(copy.changes(), ElementChanges::HIGHLIGHT);
        assert!(!state.is_changed());
    }

    #[test]
    fn equality_ignores_mask() {
        let mut a = ElementState::new(rect());
        let b = a.clone();
        let _ = a.take_update(false);
        assert_eq!(a, b);
    }

    #[test]
    fn diff_reports_each_group() {
        let a = ElementState::new(rect());
        let mut b = a.clone();
        b.set_color(Some(Color::BLACK));
        b.set_style_bits(StyleBits::DISABLED, true);
        assert_eq!(a.diff(&b), ElementChanges::COLOR | ElementChanges::STYLE);
    }

    #[test]
    fn zero_area_bounds_are_not_displayed() {
        let mut state = ElementState::new(rect());
        assert!(state.is_displayed());
        state.set_bounds(Rect::new(5.0, 5.0, 5.0, 20.0));
        assert!(!state.is_displayed());
        state.set_bounds(rect());
        state.set_visible(false);
        assert!(!state.is_displayed());
    }
}
