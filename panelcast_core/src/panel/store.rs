// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer-side panel with element ownership and snapshotting.

use std::sync::Arc;

use kurbo::Size;
use parking_lot::Mutex;

use super::data::PanelData;
use super::state::PanelState;
use crate::element::{Element, ElementSerial};

#[derive(Debug, Default)]
struct ElementList {
    items: Vec<Arc<Element>>,
    // Set on add/remove/reorder; membership changes need a transfer even
    // when no element state changed.
    changed: bool,
}

/// A panel as seen by the application producing it.
///
/// The panel state and the element list have separate monitors. Element
/// attributes are guarded by each element's own monitors, so widget setters
/// never contend on the panel.
#[derive(Debug)]
pub struct Panel {
    state: Mutex<PanelState>,
    elements: Mutex<ElementList>,
}

impl Panel {
    /// Creates an empty panel of the given dimension.
    #[must_use]
    pub fn new(dimension: Size) -> Self {
        Self {
            state: Mutex::new(PanelState::new(dimension)),
            elements: Mutex::new(ElementList {
                items: Vec::new(),
                changed: true,
            }),
        }
    }

    // -- Panel state --

    /// Returns a copy of the panel state.
    #[must_use]
    pub fn state(&self) -> PanelState {
        self.state.lock().clone()
    }

    /// Mutates the panel state under its monitor.
    pub fn modify<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> R {
        f(&mut self.state.lock())
    }

    // -- Element ownership --

    /// Adds an element on top of all others.
    ///
    /// Returns `false` (and leaves the panel unchanged) if the element is
    /// already on this panel.
    pub fn add(&self, element: Arc<Element>) -> bool {
        let mut list = self.elements.lock();
        if list.items.iter().any(|e| e.serial() == element.serial()) {
            return false;
        }
        // A re-added element must be sent in full: the receiver may have
        // dropped its cached copy when it disappeared.
        element.mark_all_changed();
        list.items.push(element);
        list.changed = true;
        true
    }

    /// Removes an element, returning it if it was on this panel.
    pub fn remove(&self, serial: ElementSerial) -> Option<Arc<Element>> {
        let mut list = self.elements.lock();
        let pos = list.items.iter().position(|e| e.serial() == serial)?;
        list.changed = true;
        Some(list.items.remove(pos))
    }

    /// Moves an element to the top of the paint order.
    ///
    /// Returns `false` if the element is not on this panel.
    pub fn raise(&self, serial: ElementSerial) -> bool {
        let mut list = self.elements.lock();
        let Some(pos) = list.items.iter().position(|e| e.serial() == serial) else {
            return false;
        };
        if pos + 1 != list.items.len() {
            let element = list.items.remove(pos);
            list.items.push(element);
            list.changed = true;
        }
        true
    }

    /// Returns the elements in paint order.
    #[must_use]
    pub fn elements(&self) -> Vec<Arc<Element>> {
        self.elements.lock().items.clone()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.lock().items.len()
    }

    /// Returns whether the panel has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.lock().items.is_empty()
    }

    // -- Snapshotting --

    /// Returns whether anything would be transmitted by an incremental
    /// snapshot.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        if self.state.lock().is_changed() {
            return true;
        }
        let list = self.elements.lock();
        list.changed || list.items.iter().any(|e| e.is_changed())
    }

    /// Forces the next incremental snapshot to carry everything.
    ///
    /// The panel state travels in full with every snapshot, so only the
    /// elements need marking.
    pub fn mark_all_changed(&self) {
        let mut list = self.elements.lock();
        list.changed = true;
        for element in &list.items {
            element.mark_all_changed();
        }
    }

    /// Takes a snapshot for transfer.
    ///
    /// A full snapshot (`incremental == false`) carries complete records for
    /// every element. An incremental one lists every element but withholds
    /// unchanged state and geometry. Change markers are cleared for whatever
    /// is carried.
    #[must_use]
    pub fn snapshot(&self, incremental: bool) -> PanelData {
        let state = self.state.lock().take_copy();
        let items = {
            let mut list = self.elements.lock();
            list.changed = false;
            list.items.clone()
        };
        let elements = items
            .iter()
            .map(|element| element.update_data(incremental))
            .collect();
        PanelData { state, elements }
    }
}
