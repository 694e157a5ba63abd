// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel data model.
//!
//! A *panel* is one full-screen arrangement of elements. It carries a small
//! amount of panel-wide state ([`PanelState`]: dimension, color scheme, blink
//! phase, modal/silent/locked flags, opacity and background reference) and
//! an ordered list of elements.
//!
//! Element order is paint order: later elements paint on top of earlier ones.
//!
//! The producer-side [`Panel`] owns live [`Element`](crate::element::Element)s
//! and produces [`PanelData`] snapshots. A full snapshot carries complete
//! records for every element; an incremental one still lists every live
//! element, withholding whatever each one has not changed, so that removal
//! is expressed by absence in both modes.

mod data;
mod state;
mod store;

pub use data::PanelData;
pub use state::{BackgroundRef, PanelChanges, PanelState};
pub use store::Panel;
