// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_element_changes`](TraceSink::on_element_changes),
//! [`on_dirty_rects`](TraceSink::on_dirty_rects)) store only the count.

use panelcast_core::trace::{
    BatchDrainedEvent, DirtyRect, ElementChange, FrameBuiltEvent, FramePaintedEvent,
    PaintTimedOutEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, SnapshotQueuedEvent,
    SubmissionKind, TraceSink, TraceTime,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SNAPSHOT_QUEUED: u8 = 1;
const TAG_BATCH_DRAINED: u8 = 2;
const TAG_PHASE_BEGIN: u8 = 3;
const TAG_PHASE_END: u8 = 4;
const TAG_FRAME_BUILT: u8 = 5;
const TAG_FRAME_PAINTED: u8 = 6;
const TAG_PAINT_TIMED_OUT: u8 = 7;
const TAG_ELEMENT_CHANGES_COUNT: u8 = 8;
const TAG_DIRTY_RECTS_COUNT: u8 = 9;

const BUILT_FULL: u8 = 1 << 0;
const BUILT_BLANK: u8 = 1 << 1;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_time(&mut self, t: TraceTime) {
        self.write_u64(t.nanos());
    }

    fn write_count(&mut self, len: usize) {
        self.write_u32(u32::try_from(len).unwrap_or(u32::MAX));
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Collapse => 0,
            PhaseKind::Build => 1,
            PhaseKind::Paint => 2,
        });
    }

    fn write_kind(&mut self, k: SubmissionKind) {
        self.write_u8(match k {
            SubmissionKind::Full => 0,
            SubmissionKind::Incremental => 1,
            SubmissionKind::Reset => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_snapshot_queued(&mut self, e: &SnapshotQueuedEvent) {
        self.write_u8(TAG_SNAPSHOT_QUEUED);
        self.write_u64(e.sequence);
        self.write_kind(e.kind);
        self.write_u32(e.elements);
        self.write_time(e.at);
    }

    fn on_batch_drained(&mut self, e: &BatchDrainedEvent) {
        self.write_u8(TAG_BATCH_DRAINED);
        self.write_u64(e.frame_index);
        self.write_u32(e.batch_len);
        self.write_u64(e.newest_sequence);
        self.write_time(e.at);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_time(e.timestamp);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_time(e.timestamp);
    }

    fn on_frame_built(&mut self, e: &FrameBuiltEvent) {
        let mut flags = 0;
        if e.full_repaint {
            flags |= BUILT_FULL;
        }
        if e.blank {
            flags |= BUILT_BLANK;
        }
        self.write_u8(TAG_FRAME_BUILT);
        self.write_u64(e.frame_index);
        self.write_u64(e.snapshot_sequence);
        self.write_u8(flags);
        self.write_u32(e.painted);
        self.write_u32(e.skipped);
        self.write_f64(e.dirty_area);
        self.write_time(e.at);
    }

    fn on_frame_painted(&mut self, e: &FramePaintedEvent) {
        self.write_u8(TAG_FRAME_PAINTED);
        self.write_u64(e.frame_index);
        self.write_u8(u8::from(e.blank));
        self.write_u32(e.painted);
        self.write_u64(e.wait_nanos);
        self.write_time(e.at);
    }

    fn on_paint_timed_out(&mut self, e: &PaintTimedOutEvent) {
        self.write_u8(TAG_PAINT_TIMED_OUT);
        self.write_u64(e.waited_nanos);
        self.write_time(e.at);
    }

    fn on_element_changes(&mut self, frame_index: u64, changes: &[ElementChange]) {
        self.write_u8(TAG_ELEMENT_CHANGES_COUNT);
        self.write_u64(frame_index);
        self.write_count(changes.len());
    }

    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DirtyRect]) {
        self.write_u8(TAG_DIRTY_RECTS_COUNT);
        self.write_u64(frame_index);
        self.write_count(rects.len());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`SnapshotQueuedEvent`].
    SnapshotQueued(SnapshotQueuedEvent),
    /// A [`BatchDrainedEvent`].
    BatchDrained(BatchDrainedEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`FrameBuiltEvent`].
    FrameBuilt(FrameBuiltEvent),
    /// A [`FramePaintedEvent`].
    FramePainted(FramePaintedEvent),
    /// A [`PaintTimedOutEvent`].
    PaintTimedOut(PaintTimedOutEvent),
    /// Element-change count for a frame.
    ElementChangesCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of changed elements.
        count: u32,
    },
    /// Dirty-rect count for a frame.
    DirtyRectsCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of dirty rects.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_time(&mut self) -> Option<TraceTime> {
        self.read_u64().map(TraceTime)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Collapse,
            1 => PhaseKind::Build,
            _ => PhaseKind::Paint,
        })
    }

    fn read_kind(&mut self) -> Option<SubmissionKind> {
        Some(match self.read_u8()? {
            0 => SubmissionKind::Full,
            1 => SubmissionKind::Incremental,
            _ => SubmissionKind::Reset,
        })
    }

    fn decode_snapshot_queued(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SnapshotQueued(SnapshotQueuedEvent {
            sequence: self.read_u64()?,
            kind: self.read_kind()?,
            elements: self.read_u32()?,
            at: self.read_time()?,
        }))
    }

    fn decode_batch_drained(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::BatchDrained(BatchDrainedEvent {
            frame_index: self.read_u64()?,
            batch_len: self.read_u32()?,
            newest_sequence: self.read_u64()?,
            at: self.read_time()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_frame_built(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let snapshot_sequence = self.read_u64()?;
        let flags = self.read_u8()?;
        Some(RecordedEvent::FrameBuilt(FrameBuiltEvent {
            frame_index,
            snapshot_sequence,
            full_repaint: flags & BUILT_FULL != 0,
            blank: flags & BUILT_BLANK != 0,
            painted: self.read_u32()?,
            skipped: self.read_u32()?,
            dirty_area: self.read_f64()?,
            at: self.read_time()?,
        }))
    }

    fn decode_frame_painted(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FramePainted(FramePaintedEvent {
            frame_index: self.read_u64()?,
            blank: self.read_u8()? != 0,
            painted: self.read_u32()?,
            wait_nanos: self.read_u64()?,
            at: self.read_time()?,
        }))
    }

    fn decode_paint_timed_out(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PaintTimedOut(PaintTimedOutEvent {
            waited_nanos: self.read_u64()?,
            at: self.read_time()?,
        }))
    }

    fn decode_count(&mut self) -> Option<(u64, u32)> {
        Some((self.read_u64()?, self.read_u32()?))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_SNAPSHOT_QUEUED => self.decode_snapshot_queued(),
            TAG_BATCH_DRAINED => self.decode_batch_drained(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_FRAME_BUILT => self.decode_frame_built(),
            TAG_FRAME_PAINTED => self.decode_frame_painted(),
            TAG_PAINT_TIMED_OUT => self.decode_paint_timed_out(),
            TAG_ELEMENT_CHANGES_COUNT => {
                let (frame_index, count) = self.decode_count()?;
                Some(RecordedEvent::ElementChangesCount { frame_index, count })
            }
            TAG_DIRTY_RECTS_COUNT => {
                let (frame_index, count) = self.decode_count()?;
                Some(RecordedEvent::DirtyRectsCount { frame_index, count })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
