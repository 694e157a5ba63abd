// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for panelcast
//! repaint diagnostics.
//!
//! This crate provides [`TraceSink`] implementations for development and
//! post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! The repaint pipeline takes ownership of its sink. Wrap a sink in
//! [`SharedSink`] to keep a handle for reading it back:
//!
//! ```
//! use panelcast_debug::SharedSink;
//! use panelcast_debug::recorder::RecorderSink;
//!
//! let sink = SharedSink::new(RecorderSink::new());
//! let for_pipeline: Box<dyn panelcast_core::trace::TraceSink + Send> = Box::new(sink.clone());
//! drop(for_pipeline);
//! assert!(sink.lock().as_bytes().is_empty());
//! ```

use std::sync::Arc;

use panelcast_core::trace::{
    BatchDrainedEvent, DirtyRect, ElementChange, FrameBuiltEvent, FramePaintedEvent,
    PaintTimedOutEvent, PhaseBeginEvent, PhaseEndEvent, SnapshotQueuedEvent, TraceSink,
};
use parking_lot::{Mutex, MutexGuard};

pub mod chrome;
pub mod pretty;
pub mod recorder;

/// A cloneable handle to a sink behind a mutex.
///
/// Every clone forwards events to the same inner sink.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedSink<S> {
    /// Wraps `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Locks the inner sink.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock()
    }
}

impl<S: TraceSink> TraceSink for SharedSink<S> {
    fn on_snapshot_queued(&mut self, e: &SnapshotQueuedEvent) {
        self.inner.lock().on_snapshot_queued(e);
    }

    fn on_batch_drained(&mut self, e: &BatchDrainedEvent) {
        self.inner.lock().on_batch_drained(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.inner.lock().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.inner.lock().on_phase_end(e);
    }

    fn on_frame_built(&mut self, e: &FrameBuiltEvent) {
        self.inner.lock().on_frame_built(e);
    }

    fn on_frame_painted(&mut self, e: &FramePaintedEvent) {
        self.inner.lock().on_frame_painted(e);
    }

    fn on_paint_timed_out(&mut self, e: &PaintTimedOutEvent) {
        self.inner.lock().on_paint_timed_out(e);
    }

    fn on_element_changes(&mut self, frame_index: u64, changes: &[ElementChange]) {
        self.inner.lock().on_element_changes(frame_index, changes);
    }

    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DirtyRect]) {
        self.inner.lock().on_dirty_rects(frame_index, rects);
    }
}
