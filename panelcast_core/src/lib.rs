// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-tracked panel state and incremental transfer encoding.
//!
//! `panelcast_core` provides the data model shared by the producer of a
//! touch panel (the application that mutates widgets) and the consumer that
//! paints it (a *screen*, possibly in another process or on another host).
//!
//! # Architecture
//!
//! ```text
//!   application threads
//!       │  (setters mark change bits under per-object monitors)
//!       ▼
//!   Element / Panel ──► Panel::snapshot(incremental) ──► PanelData
//!                                                          │
//!                 ┌────────────────────────────────────────┘
//!                 ▼
//!   Transport::push() ──► (render side) FrameData ──► paint
//! ```
//!
//! **[`element`]**: Per-widget [`ElementState`](element::ElementState) with a
//! change mask, the live [`Element`](element::Element) object and its
//! transferable [`ElementData`](element::ElementData) record.
//!
//! **[`panel`]**: Panel-wide [`PanelState`](panel::PanelState), the
//! producer-side [`Panel`](panel::Panel) that owns elements in paint order,
//! and the [`PanelData`](panel::PanelData) snapshot.
//!
//! **[`shape`]**: Closed set of geometric primitives that widget geometry
//! generators produce.
//!
//! **[`style`]**: [`Palette`](style::Palette), the explicitly constructed
//! style-resolution service that maps style bits to colors.
//!
//! **[`scheduler`]**: A single [`BehaviorScheduler`](scheduler::BehaviorScheduler)
//! that ticks periodic widget behaviors (blinking, hold-to-repeat).
//!
//! **[`transport`]**: The [`Transport`](transport::Transport) boundary and
//! outage handling for remote producers.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! repaint-pipeline instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for all
//!   transferable types.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-element
//!   change and dirty-rect events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod element;
pub mod error;
pub mod panel;
pub mod scheduler;
pub mod shape;
pub mod style;
pub mod trace;
pub mod transport;
