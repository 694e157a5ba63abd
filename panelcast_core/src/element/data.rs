// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transferable element records.

use std::sync::Arc;

use kurbo::Rect;

use super::id::ElementSerial;
use super::state::{ElementChanges, ElementState};
use crate::error::TransferError;
use crate::shape::Geometry;

/// One element's entry in a panel snapshot.
///
/// In an incremental transfer either field may be withheld (`None`) when it
/// is unchanged; the receiver carries forward its cached value. An element
/// the receiver has never seen must arrive with both fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementData {
    /// Identity of the element.
    pub serial: ElementSerial,
    /// State, or `None` if unchanged.
    pub state: Option<ElementState>,
    /// Geometry, or `None` if unchanged.
    pub geometry: Option<Geometry>,
}

impl ElementData {
    /// Creates a record carrying both state and geometry.
    #[must_use]
    pub fn full(serial: ElementSerial, state: ElementState, geometry: Geometry) -> Self {
        Self {
            serial,
            state: Some(state),
            geometry: Some(geometry),
        }
    }

    /// Creates a record that withholds everything.
    #[must_use]
    pub fn unchanged(serial: ElementSerial) -> Self {
        Self {
            serial,
            state: None,
            geometry: None,
        }
    }

    /// Returns whether both state and geometry are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_some() && self.geometry.is_some()
    }

    /// Returns the bounds carried by the state, if present.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.state.as_ref().map(ElementState::bounds)
    }

    /// Returns whether the element is present, visible, and has area.
    #[must_use]
    pub fn is_displayed(&self) -> bool {
        self.state.as_ref().is_some_and(ElementState::is_displayed)
    }

    /// Validates a record for an element seen for the first time.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::MissingState`] or
    /// [`TransferError::MissingGeometry`] if the record is partial.
    pub fn into_first_sight(self) -> Result<Self, TransferError> {
        if self.state.is_none() {
            return Err(TransferError::MissingState {
                serial: self.serial,
            });
        }
        if self.geometry.is_none() {
            return Err(TransferError::MissingGeometry {
                serial: self.serial,
            });
        }
        Ok(self)
    }

    /// Merges a received record into this cached copy.
    ///
    /// Returns the field groups that actually changed, with
    /// [`ElementChanges::GEOMETRY`] set when the geometry differs.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::SerialMismatch`] if `update` belongs to a
    /// different element, and [`TransferError::MissingState`] /
    /// [`TransferError::MissingGeometry`] if this copy is itself partial and
    /// `update` does not fill the gap.
    pub fn apply_update(&mut self, update: &Self) -> Result<ElementChanges, TransferError> {
        if update.serial != self.serial {
            return Err(TransferError::SerialMismatch {
                expected: self.serial,
                found: update.serial,
            });
        }

        if update.state.is_none() && self.state.is_none() {
            return Err(TransferError::MissingState {
                serial: self.serial,
            });
        }
        if update.geometry.is_none() && self.geometry.is_none() {
            return Err(TransferError::MissingGeometry {
                serial: self.serial,
            });
        }

        let mut changes = ElementChanges::empty();
        if let Some(received) = &update.state {
            changes |= self
                .state
                .as_ref()
                .map_or(ElementChanges::STATE, |cached| cached.diff(received));
            self.state = Some(received.clone());
        }
        if let Some(received) = &update.geometry {
            let differs = self.geometry.as_ref().is_none_or(|cached| {
                !Arc::ptr_eq(cached, received) && cached[..] != received[..]
            });
            if differs {
                changes |= ElementChanges::GEOMETRY;
            }
            self.geometry = Some(Arc::clone(received));
        }
        Ok(changes)
    }

    /// Fills withheld fields from an older record of the same element.
    ///
    /// Used when collapsing a backlog of snapshots: a field the newest record
    /// omitted may still have changed in a snapshot that is being skipped.
    /// Returns `true` once nothing is missing.
    pub fn backfill_from(&mut self, older: &Self) -> bool {
        debug_assert_eq!(self.serial, older.serial, "backfill across elements");
        if self.state.is_none() {
            self.state.clone_from(&older.state);
        }
        if self.geometry.is_none() {
            self.geometry.clone_from(&older.geometry);
        }
        self.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::shape::Shape;
    use crate::style::StyleBits;

    fn geometry(x: f64) -> Geometry {
        Arc::from(vec![Shape::fill(Rect::new(x, 0.0, x + 10.0, 10.0))])
    }

    fn full(serial: ElementSerial) -> ElementData {
        ElementData::full(
            serial,
            ElementState::new(Rect::new(0.0, 0.0, 10.0, 10.0)),
            geometry(0.0),
        )
    }

    #[test]
    fn first_sight_requires_both_fields() {
        let serial = ElementSerial::next();
        assert_eq!(
            ElementData::unchanged(serial).into_first_sight(),
            Err(TransferError::MissingState { serial })
        );
        let mut partial = full(serial);
        partial.geometry = None;
        assert_eq!(
            partial.into_first_sight(),
            Err(TransferError::MissingGeometry { serial })
        );
        assert!(full(serial).into_first_sight().is_ok());
    }

    #[test]
    fn apply_reports_state_and_geometry_changes() {
        let serial = ElementSerial::next();
        let mut cached = full(serial);

        let mut state = cached.state.clone().unwrap();
        state.set_style(StyleBits::SELECTED);
        let update = ElementData {
            serial,
            state: Some(state.clone()),
            geometry: Some(geometry(5.0)),
        };

        let changes = cached.apply_update(&update).unwrap();
        assert_eq!(changes, ElementChanges::STYLE | ElementChanges::GEOMETRY);
        assert_eq!(cached.state, Some(state));
        assert_eq!(cached.geometry, Some(geometry(5.0)));
    }

    #[test]
    fn apply_withheld_fields_keeps_cache() {
        let serial = ElementSerial::next();
        let mut cached = full(serial);
        let before = cached.clone();
        let changes = cached.apply_update(&ElementData::unchanged(serial)).unwrap();
        assert!(changes.is_empty());
        assert_eq!(cached, before);
    }

    #[test]
    fn equal_geometry_is_not_a_change() {
        let serial = ElementSerial::next();
        let mut cached = full(serial);
        let update = ElementData {
            serial,
            state: None,
            geometry: Some(geometry(0.0)),
        };
        assert!(cached.apply_update(&update).unwrap().is_empty());
    }

    #[test]
    fn apply_rejects_other_serial() {
        let a = ElementSerial::next();
        let b = ElementSerial::next();
        let mut cached = full(a);
        assert_eq!(
            cached.apply_update(&full(b)),
            Err(TransferError::SerialMismatch {
                expected: a,
                found: b
            })
        );
    }

    #[test]
    fn incremental_round_trip_reproduces_source() {
        let serial = ElementSerial::next();
        let mut source = ElementState::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut cached = ElementData::full(serial, source.take_update(false).unwrap(), geometry(0.0));

        source.set_bounds(Rect::new(10.0, 0.0, 20.0, 10.0));
        source.set_opacity(0.5);
        let update = ElementData {
            serial,
            state: source.take_update(true),
            geometry: None,
        };
        let changes = cached.apply_update(&update).unwrap();

        assert_eq!(changes, ElementChanges::BOUNDS | ElementChanges::OPACITY);
        assert_eq!(cached.state.as_ref(), Some(&source));
        assert_eq!(cached.geometry, Some(geometry(0.0)));
    }

    #[test]
    fn backfill_takes_only_missing_fields() {
        let serial = ElementSerial::next();
        let older = full(serial);
        let mut state = ElementState::new(Rect::new(1.0, 1.0, 2.0, 2.0));
        state.set_visible(false);
        let mut newer = ElementData {
            serial,
            state: Some(state.clone()),
            geometry: None,
        };
        assert!(newer.backfill_from(&older));
        assert_eq!(newer.state, Some(state));
        assert_eq!(newer.geometry, older.geometry);
    }
}
