// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel snapshots.

use super::state::PanelState;
use crate::element::{ElementData, ElementSerial};

/// One frame's worth of panel state: panel attributes plus every live
/// element in paint order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelData {
    /// Panel-wide state (always complete).
    pub state: PanelState,
    /// Element records, back to front.
    pub elements: Vec<ElementData>,
}

impl PanelData {
    /// Creates a snapshot with no elements.
    #[must_use]
    pub fn new(state: PanelState) -> Self {
        Self {
            state,
            elements: Vec::new(),
        }
    }

    /// Returns whether every element record is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elements.iter().all(ElementData::is_complete)
    }

    /// Returns the record for `serial`, if present.
    #[must_use]
    pub fn element(&self, serial: ElementSerial) -> Option<&ElementData> {
        self.elements.iter().find(|e| e.serial == serial)
    }

    /// Returns the serials in paint order.
    pub fn serials(&self) -> impl Iterator<Item = ElementSerial> + '_ {
        self.elements.iter().map(|e| e.serial)
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_survives_json() {
        use std::sync::Arc;

        use kurbo::{BezPath, Point, Rect, Size};

        use super::PanelData;
        use crate::element::{Element, ElementState};
        use crate::panel::{BackgroundRef, Panel};
        use crate::shape::{Shape, ShapeKind, ShapeRole};
        use crate::style::Color;

        let panel = Panel::new(Size::new(320.0, 240.0));
        panel.modify(|s| s.set_background(Some(BackgroundRef::new("grid.png"))));
        let bounds = Rect::new(10.0, 10.0, 90.0, 40.0);
        let mut arrow = BezPath::new();
        arrow.move_to((10.0, 10.0));
        arrow.line_to((90.0, 25.0));
        arrow.line_to((10.0, 40.0));
        arrow.close_path();
        let button = Arc::new(Element::new(
            ElementState::new(bounds),
            vec![
                Shape::fill(bounds),
                Shape::label(Point::new(14.0, 30.0), "Start", 12.0),
            ],
        ));
        let pointer = Arc::new(Element::new(
            ElementState::new(bounds),
            vec![Shape {
                kind: ShapeKind::Path(arrow),
                role: ShapeRole::Background,
            }],
        ));
        panel.add(Arc::clone(&button));
        panel.add(Arc::clone(&pointer));

        let full = panel.snapshot(false);
        pointer.modify(|s| s.set_color(Some(Color::WHITE)));
        let delta = panel.snapshot(true);
        assert!(!delta.is_complete());

        for data in [full, delta] {
            let json = serde_json::to_string(&data).unwrap();
            let back: PanelData = serde_json::from_str(&json).unwrap();
            assert_eq!(back, data);
        }
    }
}
