// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in microseconds since the pipeline was created.

use std::io::Write;

use panelcast_core::trace::{
    BatchDrainedEvent, DirtyRect, ElementChange, FrameBuiltEvent, FramePaintedEvent,
    PaintTimedOutEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, SnapshotQueuedEvent,
    SubmissionKind, TraceSink, TraceTime,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn us(t: TraceTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Collapse => "collapse",
        PhaseKind::Build => "build",
        PhaseKind::Paint => "paint",
    }
}

fn kind_name(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Full => "full",
        SubmissionKind::Incremental => "incr",
        SubmissionKind::Reset => "reset",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_snapshot_queued(&mut self, e: &SnapshotQueuedEvent) {
        let _ = writeln!(
            self.writer,
            "[queue] seq={} {} elements={} at {:.1}µs",
            e.sequence,
            kind_name(e.kind),
            e.elements,
            us(e.at),
        );
    }

    fn on_batch_drained(&mut self, e: &BatchDrainedEvent) {
        let _ = writeln!(
            self.writer,
            "[drain] frame={} batch={} newest={} at {:.1}µs",
            e.frame_index,
            e.batch_len,
            e.newest_sequence,
            us(e.at),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            us(e.timestamp),
        );
    }

    fn on_frame_built(&mut self, e: &FrameBuiltEvent) {
        let repaint = match (e.blank, e.full_repaint) {
            (true, _) => "blank",
            (false, true) => "full",
            (false, false) => "dirty",
        };
        let _ = writeln!(
            self.writer,
            "[built] frame={} seq={} {repaint} paint={} skipped={} area={:.0}",
            e.frame_index, e.snapshot_sequence, e.painted, e.skipped, e.dirty_area,
        );
    }

    fn on_frame_painted(&mut self, e: &FramePaintedEvent) {
        let _ = writeln!(
            self.writer,
            "[painted] frame={} painted={} waited={:.1}µs{}",
            e.frame_index,
            e.painted,
            e.wait_nanos as f64 / 1000.0,
            if e.blank { " blank" } else { "" },
        );
    }

    fn on_paint_timed_out(&mut self, e: &PaintTimedOutEvent) {
        let _ = writeln!(
            self.writer,
            "[timeout] waited={:.1}µs",
            e.waited_nanos as f64 / 1000.0,
        );
    }

    fn on_element_changes(&mut self, frame_index: u64, changes: &[ElementChange]) {
        let _ = writeln!(
            self.writer,
            "[elements] frame={frame_index} changes={}",
            changes.len(),
        );
    }

    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DirtyRect]) {
        let _ = writeln!(
            self.writer,
            "[dirty] frame={frame_index} rects={}",
            rects.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_built_frame() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_built(&FrameBuiltEvent {
            frame_index: 3,
            snapshot_sequence: 9,
            full_repaint: false,
            blank: false,
            painted: 2,
            skipped: 0,
            dirty_area: 200.0,
            at: TraceTime(1_000_000),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[built]"), "got: {output}");
        assert!(output.contains("frame=3 seq=9 dirty"), "got: {output}");
    }

    #[test]
    fn pretty_print_reset_submission() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_snapshot_queued(&SnapshotQueuedEvent {
            sequence: 4,
            kind: SubmissionKind::Reset,
            elements: 0,
            at: TraceTime(2_500),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[queue] seq=4 reset elements=0 at 2.5µs\n");
    }
}
