// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer-side element objects.

use std::sync::Arc;

use parking_lot::Mutex;

use super::data::ElementData;
use super::id::ElementSerial;
use super::state::ElementState;
use crate::shape::{Geometry, Shape};

#[derive(Debug)]
struct GeometryCell {
    shapes: Geometry,
    changed: bool,
}

/// A live widget instance owned by a [`Panel`](crate::panel::Panel).
///
/// State and geometry each sit behind their own monitor, so application
/// threads may call setters while a snapshot is being taken. No method holds
/// both locks at once.
#[derive(Debug)]
pub struct Element {
    serial: ElementSerial,
    state: Mutex<ElementState>,
    geometry: Mutex<GeometryCell>,
}

impl Element {
    /// Creates an element with a fresh serial.
    ///
    /// Both state and geometry start out marked as changed.
    #[must_use]
    pub fn new(state: ElementState, shapes: Vec<Shape>) -> Self {
        Self {
            serial: ElementSerial::next(),
            state: Mutex::new(state),
            geometry: Mutex::new(GeometryCell {
                shapes: Arc::from(shapes),
                changed: true,
            }),
        }
    }

    /// Returns the element's identity.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> ElementSerial {
        self.serial
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> ElementState {
        self.state.lock().clone()
    }

    /// Mutates the state under the element's monitor.
    ///
    /// Setters on [`ElementState`] record what they change, so the closure
    /// does not need to mark anything itself.
    pub fn modify<R>(&self, f: impl FnOnce(&mut ElementState) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Returns the current geometry.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Arc::clone(&self.geometry.lock().shapes)
    }

    /// Replaces the geometry.
    ///
    /// An identical shape list does not count as a change.
    pub fn set_geometry(&self, shapes: Vec<Shape>) {
        let mut cell = self.geometry.lock();
        if cell.shapes[..] != shapes[..] {
            cell.shapes = Arc::from(shapes);
            cell.changed = true;
        }
    }

    /// Returns whether state or geometry changed since the last transfer.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.state.lock().is_changed() || self.geometry.lock().changed
    }

    /// Forces the next incremental transfer to carry everything.
    pub fn mark_all_changed(&self) {
        self.state.lock().mark_all_changed();
        self.geometry.lock().changed = true;
    }

    /// Produces a transfer record.
    ///
    /// State is carried if it changed (or always, when `incremental` is
    /// false); geometry is carried if `include_geometry` is set or the
    /// transfer is not incremental. Both change markers are cleared for
    /// whatever is carried.
    #[must_use]
    pub fn get_update(&self, incremental: bool, include_geometry: bool) -> ElementData {
        let state = self.state.lock().take_update(incremental);
        let geometry = if include_geometry || !incremental {
            let mut cell = self.geometry.lock();
            cell.changed = false;
            Some(Arc::clone(&cell.shapes))
        } else {
            None
        };
        ElementData {
            serial: self.serial,
            state,
            geometry,
        }
    }

    /// Produces a transfer record, including geometry only if it changed.
    #[must_use]
    pub fn update_data(&self, incremental: bool) -> ElementData {
        let include_geometry = self.geometry.lock().changed;
        self.get_update(incremental, include_geometry)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::style::StyleBits;

    fn element() -> Element {
        Element::new(
            ElementState::new(Rect::new(0.0, 0.0, 10.0, 10.0)),
            vec![Shape::fill(Rect::new(0.0, 0.0, 10.0, 10.0))],
        )
    }

    #[test]
    fn first_incremental_update_is_complete() {
        let el = element();
        let data = el.update_data(true);
        assert!(data.is_complete());
        assert!(!el.is_changed());
    }

    #[test]
    fn unchanged_element_withholds_everything() {
        let el = element();
        let _ = el.update_data(true);
        let data = el.update_data(true);
        assert_eq!(data, ElementData::unchanged(el.serial()));
    }

    #[test]
    fn state_change_carries_state_only() {
        let el = element();
        let _ = el.update_data(true);
        el.modify(|s| s.set_style(StyleBits::SELECTED));
        let data = el.update_data(true);
        assert!(data.state.is_some());
        assert!(data.geometry.is_none());
    }

    #[test]
    fn geometry_change_carries_geometry_only() {
        let el = element();
        let _ = el.update_data(true);
        el.set_geometry(vec![Shape::fill(Rect::new(0.0, 0.0, 5.0, 5.0))]);
        let data = el.update_data(true);
        assert!(data.state.is_none());
        assert!(data.geometry.is_some());
    }

    #[test]
    fn identical_geometry_is_not_a_change() {
        let el = element();
        let _ = el.update_data(true);
        el.set_geometry(vec![Shape::fill(Rect::new(0.0, 0.0, 10.0, 10.0))]);
        assert!(!el.is_changed());
    }

    #[test]
    fn full_update_carries_everything() {
        let el = element();
        let _ = el.update_data(true);
        assert!(el.get_update(false, false).is_complete());
    }

    #[test]
    fn concurrent_setters_are_all_observed() {
        let el = Arc::new(element());
        let _ = el.update_data(true);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let el = Arc::clone(&el);
                std::thread::spawn(move || {
                    el.modify(|s| match i {
                        0 => s.set_visible(false),
                        1 => s.set_highlighted(true),
                        2 => s.set_touched(true),
                        _ => s.set_opacity(0.25),
                    });
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let state = el.update_data(true).state.unwrap();
        assert!(!state.visible());
        assert!(state.highlighted());
        assert!(state.touched());
        assert_eq!(state.opacity(), 0.25);
    }
}
