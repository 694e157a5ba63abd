// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame construction: diffing a snapshot against the previous frame.
//!
//! A [`FrameData`] is built on the worker from one collapsed [`Snapshot`]
//! and the previously built frame. It holds complete cached copies of every
//! element (the receiver's cache for the next incremental snapshot), the
//! resolved background, the [`DirtyRegion`], and the indices of the elements
//! that must be painted this cycle.
//!
//! # Repaint decision
//!
//! The whole panel is repainted when there is no previous frame, the panel
//! state differs, selective repaint is disabled, the caller forces it (after
//! a reset or a full snapshot), or surviving elements changed their relative
//! order. Otherwise the dirty region is the union of
//!
//! - the old bounds of removed elements,
//! - the new bounds of added elements,
//! - the old and new bounds of changed elements,
//!
//! clipped to the panel rectangle, and the paint set is every displayed
//! element whose bounds intersect that region.
//!
//! Element records that cannot be merged are reported as
//! [`SkippedElement`]s. A skipped element keeps its previous cached copy,
//! so it shows a stale visual for one cycle rather than disappearing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kurbo::Rect;
use panelcast_core::element::{ElementChanges, ElementData, ElementSerial, ElementState};
use panelcast_core::error::TransferError;
use panelcast_core::panel::PanelState;

use crate::background::{BackgroundCache, BackgroundImage};
use crate::collapse::Snapshot;
use crate::dirty::DirtyRegion;

/// An element record that could not be used this cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedElement {
    /// The element concerned.
    pub serial: ElementSerial,
    /// Why it was skipped.
    pub error: TransferError,
}

/// Per-frame construction policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Compute a dirty region instead of repainting everything.
    pub selective_repaint: bool,
    /// Repaint everything regardless of the diff.
    pub force_full: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            selective_repaint: true,
            force_full: false,
        }
    }
}

/// A snapshot resolved against the previous frame, ready to paint.
#[derive(Clone, Debug)]
pub struct FrameData {
    frame_index: u64,
    snapshot_sequence: u64,
    panel: PanelState,
    elements: Vec<ElementData>,
    changes: Vec<ElementChanges>,
    background: Option<Arc<BackgroundImage>>,
    background_changed: bool,
    dirty: DirtyRegion,
    paint: Vec<usize>,
    full_repaint: bool,
    skipped: Vec<SkippedElement>,
}

#[derive(Clone, Copy)]
enum Status {
    Added,
    Kept(ElementChanges),
    Skipped,
}

impl FrameData {
    /// Builds a frame from `snapshot`.
    ///
    /// `previous` provides the element cache that incremental records are
    /// merged into. Pass `None` for the first frame.
    #[must_use]
    pub fn build(
        frame_index: u64,
        snapshot: Snapshot,
        previous: Option<&Self>,
        backgrounds: &mut BackgroundCache,
        options: BuildOptions,
    ) -> Self {
        let Snapshot {
            data, sequence, ..
        } = snapshot;
        let panel = data.state;
        let panel_rect = panel.bounds();

        let cache: HashMap<ElementSerial, &ElementData> = previous
            .map(|prev| prev.elements.iter().map(|e| (e.serial, e)).collect())
            .unwrap_or_default();

        // -- Merge records into the cache --

        let mut elements = Vec::with_capacity(data.elements.len());
        let mut statuses = Vec::with_capacity(data.elements.len());
        let mut skipped = Vec::new();
        for record in data.elements {
            let serial = record.serial;
            match cache.get(&serial) {
                Some(cached) => {
                    let mut merged = (*cached).clone();
                    match merged.apply_update(&record) {
                        Ok(changes) => {
                            elements.push(merged);
                            statuses.push(Status::Kept(changes));
                        }
                        Err(error) => {
                            skipped.push(SkippedElement { serial, error });
                            elements.push((*cached).clone());
                            statuses.push(Status::Skipped);
                        }
                    }
                }
                None => match record.into_first_sight() {
                    Ok(record) => {
                        elements.push(record);
                        statuses.push(Status::Added);
                    }
                    Err(error) => skipped.push(SkippedElement { serial, error }),
                },
            }
        }

        let background = backgrounds.resolve(panel.background());

        // -- Decide between full and selective repaint --

        let full_repaint = options.force_full
            || !options.selective_repaint
            || previous.is_none_or(|prev| prev.panel != panel || reordered(prev, &elements));

        let dirty = if full_repaint {
            DirtyRegion::Full
        } else {
            let mut dirty = DirtyRegion::None;
            if let Some(prev) = previous {
                let alive: HashSet<ElementSerial> = elements.iter().map(|e| e.serial).collect();
                for removed in prev.elements.iter().filter(|e| !alive.contains(&e.serial)) {
                    add_displayed(&mut dirty, removed.state.as_ref());
                }
            }
            for (element, status) in elements.iter().zip(&statuses) {
                match status {
                    Status::Added => add_displayed(&mut dirty, element.state.as_ref()),
                    Status::Kept(changes) if !changes.is_empty() => {
                        if let Some(old) = cache.get(&element.serial) {
                            add_displayed(&mut dirty, old.state.as_ref());
                        }
                        add_displayed(&mut dirty, element.state.as_ref());
                    }
                    Status::Kept(_) | Status::Skipped => {}
                }
            }
            dirty.clipped_to(panel_rect)
        };

        let paint = elements
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.state
                    .as_ref()
                    .is_some_and(|s| s.is_displayed() && dirty.intersects(s.bounds()))
            })
            .map(|(index, _)| index)
            .collect();

        let changes = statuses
            .iter()
            .map(|status| match status {
                Status::Added => ElementChanges::all(),
                Status::Kept(changes) => *changes,
                Status::Skipped => ElementChanges::empty(),
            })
            .collect();

        Self {
            frame_index,
            snapshot_sequence: sequence,
            panel,
            elements,
            changes,
            background: background.image,
            background_changed: background.changed,
            dirty,
            paint,
            full_repaint,
            skipped,
        }
    }

    /// Returns the worker's frame counter for this frame.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns the queue sequence number of the snapshot this frame shows.
    #[must_use]
    pub fn snapshot_sequence(&self) -> u64 {
        self.snapshot_sequence
    }

    /// Returns the panel state.
    #[must_use]
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    /// Returns the panel rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.panel.bounds()
    }

    /// Returns every element, complete, in paint order.
    #[must_use]
    pub fn elements(&self) -> &[ElementData] {
        &self.elements
    }

    /// Returns the cached record for `serial`.
    #[must_use]
    pub fn element(&self, serial: ElementSerial) -> Option<&ElementData> {
        self.elements.iter().find(|e| e.serial == serial)
    }

    /// Returns what changed per element, parallel to
    /// [`elements`](Self::elements). Added elements report every bit.
    #[must_use]
    pub fn changes(&self) -> &[ElementChanges] {
        &self.changes
    }

    /// Returns the resolved background image.
    #[must_use]
    pub fn background(&self) -> Option<&Arc<BackgroundImage>> {
        self.background.as_ref()
    }

    /// Returns whether the background reference changed with this frame.
    #[must_use]
    pub fn background_changed(&self) -> bool {
        self.background_changed
    }

    /// Returns the region to repaint.
    #[must_use]
    pub fn dirty(&self) -> &DirtyRegion {
        &self.dirty
    }

    /// Returns whether the whole panel is repainted.
    #[must_use]
    pub fn is_full_repaint(&self) -> bool {
        self.full_repaint
    }

    /// Returns indices into [`elements`](Self::elements) to paint, back to
    /// front.
    #[must_use]
    pub fn paint_indices(&self) -> &[usize] {
        &self.paint
    }

    /// Returns the elements to paint, back to front.
    pub fn paint_set(&self) -> impl Iterator<Item = &ElementData> + '_ {
        self.paint.iter().map(|&index| &self.elements[index])
    }

    /// Returns every displayed element, back to front.
    pub fn displayed(&self) -> impl Iterator<Item = &ElementData> + '_ {
        self.elements.iter().filter(|e| e.is_displayed())
    }

    /// Returns the records that could not be used this cycle.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedElement] {
        &self.skipped
    }
}

fn add_displayed(dirty: &mut DirtyRegion, state: Option<&ElementState>) {
    if let Some(state) = state.filter(|s| s.visible()) {
        dirty.add(state.bounds());
    }
}

/// Returns whether elements present in both frames changed relative order.
fn reordered(previous: &FrameData, elements: &[ElementData]) -> bool {
    let old_rank: HashMap<ElementSerial, usize> = previous
        .elements
        .iter()
        .enumerate()
        .map(|(rank, e)| (e.serial, rank))
        .collect();
    let mut last = None;
    for element in elements {
        let Some(&rank) = old_rank.get(&element.serial) else {
            continue;
        };
        if last.is_some_and(|last| rank < last) {
            return true;
        }
        last = Some(rank);
    }
    false
}
