// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the repaint pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! pipeline calls as snapshots move from the producer to the paint path. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! ```text
//!   update() ──► SnapshotQueued
//!                    │
//!   worker   ──► BatchDrained ─► Phase(Collapse) ─► Phase(Build) ─► FrameBuilt
//!                                                                      │
//!   paint()  ──► Phase(Paint) ─► FramePainted        (or PaintTimedOut)
//! ```
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ElementChange`] and [`DirtyRect`]
//!   events plus the corresponding `TraceSink` methods.

use core::fmt;

#[cfg(feature = "trace-rich")]
use crate::element::{ElementChanges, ElementSerial};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Nanoseconds since the traced pipeline was created.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceTime(pub u64);

impl TraceTime {
    /// Returns the raw nanosecond count.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Returns the elapsed nanoseconds since `earlier`, or zero if `earlier`
    /// is later.
    #[inline]
    #[must_use]
    pub const fn saturating_nanos_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Debug for TraceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which stage of the pipeline is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Back-filling the newest snapshot from the drained batch.
    Collapse,
    /// Diffing against the previous frame and computing the dirty region.
    Build,
    /// Painting one frame onto a canvas.
    Paint,
}

/// What a producer put on the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    /// A snapshot carrying every element in full.
    Full,
    /// A snapshot that may withhold unchanged fields.
    Incremental,
    /// The reset marker.
    Reset,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a submission is accepted by the bounded queue.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotQueuedEvent {
    /// Queue sequence number (FIFO order).
    pub sequence: u64,
    /// What was queued.
    pub kind: SubmissionKind,
    /// Number of element records (zero for a reset).
    pub elements: u32,
    /// When the submission was accepted.
    pub at: TraceTime,
}

/// Emitted when the worker drains the queue.
#[derive(Clone, Copy, Debug)]
pub struct BatchDrainedEvent {
    /// Index the frame built from this batch will carry.
    pub frame_index: u64,
    /// Number of submissions drained.
    pub batch_len: u32,
    /// Sequence number of the newest submission in the batch.
    pub newest_sequence: u64,
    /// When the batch was drained.
    pub at: TraceTime,
}

/// Marks the beginning of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Time at the start of the phase.
    pub timestamp: TraceTime,
}

/// Marks the end of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Time at the end of the phase.
    pub timestamp: TraceTime,
}

/// Emitted when the worker has built a frame and is about to publish it.
#[derive(Clone, Copy, Debug)]
pub struct FrameBuiltEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Sequence number of the snapshot the frame was built from.
    pub snapshot_sequence: u64,
    /// Whether the whole panel is repainted.
    pub full_repaint: bool,
    /// Whether the frame is the blank reset frame.
    pub blank: bool,
    /// Number of elements in the paint set.
    pub painted: u32,
    /// Number of elements skipped because their records were unusable.
    pub skipped: u32,
    /// Area of the dirty region in square units.
    pub dirty_area: f64,
    /// When the frame was built.
    pub at: TraceTime,
}

/// Emitted after a frame has been painted.
#[derive(Clone, Copy, Debug)]
pub struct FramePaintedEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Whether the blank background was painted.
    pub blank: bool,
    /// Number of elements drawn.
    pub painted: u32,
    /// Time the paint call spent waiting for the frame.
    pub wait_nanos: u64,
    /// When painting finished.
    pub at: TraceTime,
}

/// Emitted when a paint call gives up waiting for a frame.
#[derive(Clone, Copy, Debug)]
pub struct PaintTimedOutEvent {
    /// Time the paint call waited.
    pub waited_nanos: u64,
    /// When the wait ended.
    pub at: TraceTime,
}

/// A per-frame element change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ElementChange {
    /// Which element changed.
    pub serial: ElementSerial,
    /// What changed, as reported by the cached-copy merge.
    pub changes: ElementChanges,
}

/// An axis-aligned dirty rectangle.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DirtyRect {
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the repaint pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a submission is queued.
    fn on_snapshot_queued(&mut self, e: &SnapshotQueuedEvent) {
        _ = e;
    }

    /// Called when the worker drains a batch.
    fn on_batch_drained(&mut self, e: &BatchDrainedEvent) {
        _ = e;
    }

    /// Called at the beginning of a pipeline phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pipeline phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a frame has been built.
    fn on_frame_built(&mut self, e: &FrameBuiltEvent) {
        _ = e;
    }

    /// Called when a frame has been painted.
    fn on_frame_painted(&mut self, e: &FramePaintedEvent) {
        _ = e;
    }

    /// Called when a paint call times out.
    fn on_paint_timed_out(&mut self, e: &PaintTimedOutEvent) {
        _ = e;
    }

    /// Called with per-frame element changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_element_changes(&mut self, frame_index: u64, changes: &[ElementChange]) {
        _ = (frame_index, changes);
    }

    /// Called with per-frame dirty rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DirtyRect]) {
        _ = (frame_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self::from_option(Some(sink))
    }

    /// Creates a tracer that dispatches to `sink` if there is one.
    #[inline]
    #[must_use]
    pub fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::from_option(None)
    }

    /// Returns whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`SnapshotQueuedEvent`].
    #[inline]
    pub fn snapshot_queued(&mut self, e: &SnapshotQueuedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_snapshot_queued(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BatchDrainedEvent`].
    #[inline]
    pub fn batch_drained(&mut self, e: &BatchDrainedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_batch_drained(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameBuiltEvent`].
    #[inline]
    pub fn frame_built(&mut self, e: &FrameBuiltEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_built(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FramePaintedEvent`].
    #[inline]
    pub fn frame_painted(&mut self, e: &FramePaintedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_painted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PaintTimedOutEvent`].
    #[inline]
    pub fn paint_timed_out(&mut self, e: &PaintTimedOutEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_paint_timed_out(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits element changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn element_changes(&mut self, frame_index: u64, changes: &[ElementChange]) {
        if let Some(s) = &mut self.sink {
            s.on_element_changes(frame_index, changes);
        }
    }

    /// Emits dirty rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn dirty_rects(&mut self, frame_index: u64, rects: &[DirtyRect]) {
        if let Some(s) = &mut self.sink {
            s.on_dirty_rects(frame_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_queued() -> SnapshotQueuedEvent {
        SnapshotQueuedEvent {
            sequence: 42,
            kind: SubmissionKind::Incremental,
            elements: 3,
            at: TraceTime(1_000),
        }
    }

    #[test]
    fn trace_time_saturates() {
        assert_eq!(TraceTime(500).saturating_nanos_since(TraceTime(200)), 300);
        assert_eq!(TraceTime(200).saturating_nanos_since(TraceTime(500)), 0);
        assert_eq!(format!("{:?}", TraceTime(7)), "7ns");
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_snapshot_queued(&sample_queued());
        sink.on_paint_timed_out(&PaintTimedOutEvent {
            waited_nanos: 100,
            at: TraceTime(0),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.snapshot_queued(&sample_queued());
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Build,
            timestamp: TraceTime(0),
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        struct RecordingSink {
            sequences: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_snapshot_queued(&mut self, e: &SnapshotQueuedEvent) {
                self.sequences.push(e.sequence);
            }
        }

        let mut sink = RecordingSink {
            sequences: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.snapshot_queued(&sample_queued());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.sequences, &[42]);
    }
}
