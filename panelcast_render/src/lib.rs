// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous repaint pipeline for panelcast.
//!
//! A producer pushes [`PanelData`](panelcast_core::panel::PanelData)
//! snapshots; a worker thread turns them into paintable frames; the host's
//! paint path takes one frame at a time and paints it onto a [`Canvas`].
//!
//! ```text
//!   producer ──► RepaintPipeline::update ──► [bounded queue]
//!                                                 │
//!                                   worker: drain, collapse, build
//!                                                 │
//!                                           [frame handoff]
//!                                                 │
//!   host paint callback ──► RepaintPipeline::paint / Screen::tick ──► Canvas
//! ```
//!
//! - [`RepaintPipeline`]: the queue, worker and handoff, configured by
//!   [`PipelineConfig`]
//! - [`collapse`]: folds a backlog of snapshots into the newest one
//! - [`FrameData`]: a snapshot resolved against the previous frame, with its
//!   [`DirtyRegion`] and paint set
//! - [`Painter`] and [`Canvas`]: the paint contract
//! - [`Screen`]: a paint loop that redraws the last frame on timeout
//! - [`BackgroundCache`]: memoized background image resolution
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Emits pipeline events to a
//!   [`TraceSink`](panelcast_core::trace::TraceSink) installed with
//!   [`RepaintPipeline::set_trace_sink`].
//! - `trace-rich` (disabled by default, implies `trace`): Also emits
//!   per-element changes and dirty rectangles.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod background;
mod canvas;
mod collapse;
mod dirty;
mod error;
mod frame;
mod handoff;
mod pipeline;
mod screen;

pub use background::{
    BackgroundCache, BackgroundImage, BackgroundLoader, NoBackgrounds, ResolvedBackground,
    StaticBackgrounds,
};
pub use canvas::{Canvas, DrawOp, PaintMode, PaintReport, Painter, RecordingCanvas};
pub use collapse::{Collapsed, Snapshot, Submission, collapse};
pub use dirty::DirtyRegion;
pub use error::{BackgroundError, HandoffError, PipelineError};
pub use frame::{BuildOptions, FrameData, SkippedElement};
pub use handoff::Published;
pub use pipeline::{PipelineConfig, PipelineStats, RepaintPipeline};
pub use screen::{Screen, ScreenTick};
