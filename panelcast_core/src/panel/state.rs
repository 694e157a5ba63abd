// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-tracked panel-wide attributes.

use core::fmt;

use bitflags::bitflags;
use kurbo::{Rect, Size};

use crate::style::ColorSchemeId;

bitflags! {
    /// One bit per panel-wide field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PanelChanges: u8 {
        /// Panel dimension.
        const DIMENSION = 1 << 0;
        /// Color scheme.
        const COLOR_SCHEME = 1 << 1;
        /// Blink phase.
        const BLINK = 1 << 2;
        /// Modal flag.
        const MODAL = 1 << 3;
        /// Silent flag.
        const SILENT = 1 << 4;
        /// Locked flag.
        const LOCKED = 1 << 5;
        /// Panel opacity.
        const OPACITY = 1 << 6;
        /// Background image reference.
        const BACKGROUND = 1 << 7;
    }
}

/// Reference to a background image, resolved by the painting side.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackgroundRef(pub String);

impl BackgroundRef {
    /// Creates a reference from any string-like value.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BackgroundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackgroundRef({:?})", self.0)
    }
}

/// Panel-wide attributes with a mask of what changed since the last
/// transfer.
///
/// Two states are equal iff every observable field matches; the change mask
/// does not take part.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelState {
    dimension: Size,
    color_scheme: ColorSchemeId,
    blink: bool,
    modal: bool,
    silent: bool,
    locked: bool,
    opacity: f32,
    background: Option<BackgroundRef>,
    changed: PanelChanges,
}

impl PartialEq for PanelState {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_empty()
    }
}

impl PanelState {
    /// Creates an opaque panel of the given dimension with no background.
    #[must_use]
    pub fn new(dimension: Size) -> Self {
        Self {
            dimension,
            color_scheme: ColorSchemeId::default(),
            blink: false,
            modal: false,
            silent: false,
            locked: false,
            opacity: 1.0,
            background: None,
            changed: PanelChanges::all(),
        }
    }

    /// Returns the panel dimension.
    #[must_use]
    pub fn dimension(&self) -> Size {
        self.dimension
    }

    /// Returns the panel rectangle, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.dimension.to_rect()
    }

    /// Returns the color scheme.
    #[must_use]
    pub fn color_scheme(&self) -> ColorSchemeId {
        self.color_scheme
    }

    /// Returns the blink phase.
    #[must_use]
    pub fn blink(&self) -> bool {
        self.blink
    }

    /// Returns whether the panel is modal.
    #[must_use]
    pub fn modal(&self) -> bool {
        self.modal
    }

    /// Returns whether audio feedback is suppressed.
    #[must_use]
    pub fn silent(&self) -> bool {
        self.silent
    }

    /// Returns whether touch input is locked.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Returns the panel opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Returns the background image reference, if any.
    #[must_use]
    pub fn background(&self) -> Option<&BackgroundRef> {
        self.background.as_ref()
    }

    /// Sets the panel dimension.
    pub fn set_dimension(&mut self, dimension: Size) {
        if self.dimension != dimension {
            self.dimension = dimension;
            self.changed |= PanelChanges::DIMENSION;
        }
    }

    /// Sets the color scheme.
    pub fn set_color_scheme(&mut self, scheme: ColorSchemeId) {
        if self.color_scheme != scheme {
            self.color_scheme = scheme;
            self.changed |= PanelChanges::COLOR_SCHEME;
        }
    }

    /// Sets the blink phase.
    pub fn set_blink(&mut self, blink: bool) {
        if self.blink != blink {
            self.blink = blink;
            self.changed |= PanelChanges::BLINK;
        }
    }

    /// Sets the modal flag.
    pub fn set_modal(&mut self, modal: bool) {
        if self.modal != modal {
            self.modal = modal;
            self.changed |= PanelChanges::MODAL;
        }
    }

    /// Sets the silent flag.
    pub fn set_silent(&mut self, silent: bool) {
        if self.silent != silent {
            self.silent = silent;
            self.changed |= PanelChanges::SILENT;
        }
    }

    /// Sets the locked flag.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            self.locked = locked;
            self.changed |= PanelChanges::LOCKED;
        }
    }

    /// Sets the panel opacity.
    pub fn set_opacity(&mut self, opacity: f32) {
        if self.opacity != opacity {
            self.opacity = opacity;
            self.changed |= PanelChanges::OPACITY;
        }
    }

    /// Sets or clears the background image reference.
    pub fn set_background(&mut self, background: Option<BackgroundRef>) {
        if self.background != background {
            self.background = background;
            self.changed |= PanelChanges::BACKGROUND;
        }
    }

    /// Returns the mask of fields changed since the last transfer.
    #[must_use]
    pub fn changes(&self) -> PanelChanges {
        self.changed
    }

    /// Returns whether anything changed since the last transfer.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Takes a copy for transfer and clears the change mask.
    ///
    /// Returns `None` when `incremental` is set and nothing changed.
    pub fn take_update(&mut self, incremental: bool) -> Option<Self> {
        if incremental && self.changed.is_empty() {
            return None;
        }
        Some(self.take_copy())
    }

    /// Takes a copy for transfer unconditionally and clears the change mask.
    pub fn take_copy(&mut self) -> Self {
        let copy = self.clone();
        self.changed = PanelChanges::empty();
        copy
    }

    /// Compares observable fields and returns those that differ.
    #[must_use]
    pub fn diff(&self, other: &Self) -> PanelChanges {
        let mut diff = PanelChanges::empty();
        if self.dimension != other.dimension {
            diff |= PanelChanges::DIMENSION;
        }
        if self.color_scheme != other.color_scheme {
            diff |= PanelChanges::COLOR_SCHEME;
        }
        if self.blink != other.blink {
            diff |= PanelChanges::BLINK;
        }
        if self.modal != other.modal {
            diff |= PanelChanges::MODAL;
        }
        if self.silent != other.silent {
            diff |= PanelChanges::SILENT;
        }
        if self.locked != other.locked {
            diff |= PanelChanges::LOCKED;
        }
        if self.opacity != other.opacity {
            diff |= PanelChanges::OPACITY;
        }
        if self.background != other.background {
            diff |= PanelChanges::BACKGROUND;
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_covers_all_observable_fields() {
        let a = PanelState::new(Size::new(800.0, 480.0));
        let mut b = a.clone();
        assert_eq!(a, b);

        b.set_locked(true);
        assert_ne!(a, b);
        assert_eq!(a.diff(&b), PanelChanges::LOCKED);

        b.set_locked(false);
        b.set_background(Some(BackgroundRef::new("deck.png")));
        assert_eq!(a.diff(&b), PanelChanges::BACKGROUND);
    }

    #[test]
    fn take_update_clears_mask() {
        let mut state = PanelState::new(Size::new(800.0, 480.0));
        assert!(state.take_update(true).is_some());
        assert!(state.take_update(true).is_none());

        state.set_blink(true);
        let copy = state.take_update(true).unwrap();
        assert_eq!(copy.changes(), PanelChanges::BLINK);
        assert!(copy.blink());
        assert!(!state.is_changed());
    }

    #[test]
    fn same_value_is_not_a_change() {
        let mut state = PanelState::new(Size::new(800.0, 480.0));
        let _ = state.take_update(false);
        state.set_dimension(Size::new(800.0, 480.0));
        state.set_color_scheme(ColorSchemeId(0));
        state.set_background(None);
        assert!(!state.is_changed());
    }

    #[test]
    fn bounds_anchor_at_origin() {
        let state = PanelState::new(Size::new(800.0, 480.0));
        assert_eq!(state.bounds(), Rect::new(0.0, 0.0, 800.0, 480.0));
    }
}
