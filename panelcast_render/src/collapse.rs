// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame collapsing.
//!
//! When the worker falls behind, it drains every queued submission at once
//! and builds a single frame from the newest one. An incremental snapshot
//! withholds fields that did not change since the snapshot before it, and
//! that predecessor is about to be discarded. Collapsing restores those
//! fields from the discarded snapshots, newest first, so that the surviving
//! snapshot reads as if it had been sent right after the last painted frame.
//!
//! A reset marker bounds the scan: nothing before a reset is relevant to the
//! collapsed frame. The worker folds those older entries into its element
//! cache separately, since the producer's deltas continue across a reset.

use std::collections::HashMap;

use panelcast_core::element::ElementSerial;
use panelcast_core::panel::PanelData;

/// One panel snapshot as it travels through the queue.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// The panel data.
    pub data: PanelData,
    /// Whether withheld fields are to be carried forward.
    pub incremental: bool,
    /// Queue sequence number.
    pub sequence: u64,
}

/// An entry of the repaint queue.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    /// A snapshot to paint.
    Snapshot(Snapshot),
    /// Clear to the blank background.
    Reset {
        /// Queue sequence number.
        sequence: u64,
    },
}

impl Submission {
    /// Returns the queue sequence number.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        match self {
            Self::Snapshot(snapshot) => snapshot.sequence,
            Self::Reset { sequence } => *sequence,
        }
    }
}

/// The result of collapsing one drained batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Collapsed {
    /// The snapshot to build a frame from, or `None` if the newest entry was
    /// a reset.
    pub target: Option<Snapshot>,
    /// Whether the frame must be painted in full: a reset or a
    /// non-incremental snapshot was part of the relevant batch.
    pub force_full: bool,
    /// Number of submissions drained.
    pub batch_len: usize,
    /// Number of element records completed from discarded snapshots.
    pub backfilled: usize,
}

/// Collapses a drained batch (oldest first) into the newest entry.
///
/// Returns `None` for an empty batch.
#[must_use]
pub fn collapse(mut batch: Vec<Submission>) -> Option<Collapsed> {
    let batch_len = batch.len();
    let newest = batch.pop()?;
    let Submission::Snapshot(mut target) = newest else {
        return Some(Collapsed {
            target: None,
            force_full: true,
            batch_len,
            backfilled: 0,
        });
    };

    // Only entries after the newest reset are relevant.
    let relevant_from = batch
        .iter()
        .rposition(|s| matches!(s, Submission::Reset { .. }))
        .map_or(0, |reset| reset + 1);
    let reset_seen = relevant_from > 0;
    let discarded = &batch[relevant_from..];

    let force_full = reset_seen
        || !target.incremental
        || discarded
            .iter()
            .any(|s| matches!(s, Submission::Snapshot(snap) if !snap.incremental));

    let mut backfilled = 0;
    if target.incremental {
        backfilled = backfill(&mut target.data, discarded);
    }

    Some(Collapsed {
        target: Some(target),
        force_full,
        batch_len,
        backfilled,
    })
}

/// Fills incomplete records of `target` from `older` (oldest first), scanning
/// newest to oldest and stopping once nothing is missing.
fn backfill(target: &mut PanelData, older: &[Submission]) -> usize {
    let mut missing: HashMap<ElementSerial, usize> = target
        .elements
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.is_complete())
        .map(|(index, record)| (record.serial, index))
        .collect();
    let mut backfilled = 0;

    for submission in older.iter().rev() {
        if missing.is_empty() {
            break;
        }
        let Submission::Snapshot(snapshot) = submission else {
            continue;
        };
        for record in &snapshot.data.elements {
            let Some(&index) = missing.get(&record.serial) else {
                continue;
            };
            let target_record = &mut target.elements[index];
            let was = (target_record.state.is_some(), target_record.geometry.is_some());
            let complete = target_record.backfill_from(record);
            if was != (target_record.state.is_some(), target_record.geometry.is_some()) {
                backfilled += 1;
            }
            if complete {
                missing.remove(&record.serial);
            }
        }
    }
    backfilled
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kurbo::{Rect, Size};
    use panelcast_core::element::{ElementData, ElementState};
    use panelcast_core::panel::PanelState;
    use panelcast_core::shape::{Geometry, Shape};

    use super::*;

    fn geometry(x: f64) -> Geometry {
        Arc::from(vec![Shape::fill(Rect::new(x, 0.0, x + 10.0, 10.0))])
    }

    fn state(x: f64) -> ElementState {
        ElementState::new(Rect::new(x, 0.0, x + 10.0, 10.0))
    }

    fn snapshot(sequence: u64, incremental: bool, elements: Vec<ElementData>) -> Submission {
        let mut data = PanelData::new(PanelState::new(Size::new(100.0, 100.0)));
        data.elements = elements;
        Submission::Snapshot(Snapshot {
            data,
            incremental,
            sequence,
        })
    }

    fn record(serial: ElementSerial, x: Option<f64>, g: Option<f64>) -> ElementData {
        ElementData {
            serial,
            state: x.map(state),
            geometry: g.map(geometry),
        }
    }

    #[test]
    fn empty_batch_collapses_to_nothing() {
        assert_eq!(collapse(Vec::new()), None);
    }

    #[test]
    fn single_snapshot_is_untouched() {
        let a = ElementSerial(1);
        let only = snapshot(0, true, vec![record(a, None, None)]);
        let collapsed = collapse(vec![only.clone()]).unwrap();
        let Submission::Snapshot(expected) = only else {
            unreachable!()
        };
        assert_eq!(collapsed.target, Some(expected));
        assert!(!collapsed.force_full);
        assert_eq!(collapsed.backfilled, 0);
    }

    #[test]
    fn newest_reset_yields_blank() {
        let a = ElementSerial(1);
        let batch = vec![
            snapshot(0, true, vec![record(a, Some(0.0), Some(0.0))]),
            Submission::Reset { sequence: 1 },
        ];
        let collapsed = collapse(batch).unwrap();
        assert_eq!(collapsed.target, None);
        assert!(collapsed.force_full);
        assert_eq!(collapsed.batch_len, 2);
    }

    #[test]
    fn withheld_fields_come_from_newest_discarded() {
        let a = ElementSerial(1);
        let b = ElementSerial(2);
        let batch = vec![
            snapshot(0, true, vec![record(a, Some(0.0), None), record(b, None, None)]),
            snapshot(1, true, vec![record(a, Some(5.0), None), record(b, None, Some(3.0))]),
            snapshot(2, true, vec![record(a, None, None), record(b, Some(9.0), None)]),
        ];
        let collapsed = collapse(batch).unwrap();
        let target = collapsed.target.unwrap();
        assert!(!collapsed.force_full);

        let ra = target.data.element(a).unwrap();
        assert_eq!(ra.state, Some(state(5.0)));
        assert_eq!(ra.geometry, None);

        let rb = target.data.element(b).unwrap();
        assert_eq!(rb.state, Some(state(9.0)));
        assert_eq!(rb.geometry, Some(geometry(3.0)));
        assert_eq!(collapsed.backfilled, 2);
    }

    #[test]
    fn scan_stops_at_reset() {
        let a = ElementSerial(1);
        let batch = vec![
            snapshot(0, true, vec![record(a, Some(1.0), Some(1.0))]),
            Submission::Reset { sequence: 1 },
            snapshot(2, true, vec![record(a, None, None)]),
            snapshot(3, true, vec![record(a, None, None)]),
        ];
        let collapsed = collapse(batch).unwrap();
        assert!(collapsed.force_full);
        let target = collapsed.target.unwrap();
        assert!(!target.data.element(a).unwrap().is_complete());
        assert_eq!(collapsed.backfilled, 0);
    }

    #[test]
    fn complete_records_are_not_rederived() {
        let a = ElementSerial(1);
        let batch = vec![
            snapshot(0, true, vec![record(a, Some(1.0), Some(1.0))]),
            snapshot(1, true, vec![record(a, Some(2.0), Some(2.0))]),
        ];
        let collapsed = collapse(batch).unwrap();
        let target = collapsed.target.unwrap();
        assert_eq!(target.data.element(a).unwrap().state, Some(state(2.0)));
        assert_eq!(collapsed.backfilled, 0);
    }

    #[test]
    fn discarded_full_snapshot_forces_full_repaint() {
        let a = ElementSerial(1);
        let batch = vec![
            snapshot(0, false, vec![record(a, Some(1.0), Some(1.0))]),
            snapshot(1, true, vec![record(a, None, None)]),
        ];
        let collapsed = collapse(batch).unwrap();
        assert!(collapsed.force_full);
        assert!(collapsed.target.unwrap().data.is_complete());
    }
}
