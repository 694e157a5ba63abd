// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element data model.
//!
//! An *element* is one visual widget instance on a panel. Each element has:
//!
//! - An identity ([`ElementSerial`]): process-unique and monotonically
//!   increasing, stable for the element's lifetime.
//! - A change-tracked [`ElementState`]: bounds, color override, opacity,
//!   style bits, visibility, highlight and transient touch state.
//! - Geometry: a list of [`Shape`](crate::shape::Shape)s derived from that
//!   state by an external generator.
//!
//! The producer side mutates a live [`Element`] from any thread. For
//! transfer, [`Element::update_data`] produces an [`ElementData`] record that
//! withholds whatever has not changed since the last transfer; the receiver
//! merges such records into its cached copy with
//! [`ElementData::apply_update`].
//!
//! # Change tracking
//!
//! Every setter that actually changes a value ORs one bit into the state's
//! [`ElementChanges`] mask. Setting the same value twice leaves the mask
//! alone. The mask is cleared when a copy is taken for transfer, so an empty
//! mask means the last transmitted copy is current.

mod data;
mod id;
mod live;
mod state;

pub use data::ElementData;
pub use id::ElementSerial;
pub use live::Element;
pub use state::{ElementChanges, ElementState};
