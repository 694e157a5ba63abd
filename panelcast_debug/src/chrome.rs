// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Producer events land on thread 0, worker events on thread 1 and paint
//! events on thread 2, so the three sides of the pipeline show up as separate
//! tracks.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use panelcast_core::trace::{PhaseKind, TraceTime};
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const TID_PRODUCER: u32 = 0;
const TID_WORKER: u32 = 1;
const TID_PAINT: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// # Errors
///
/// Returns any error from writing to `writer`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    // Rich events carry no timestamp; place them at the preceding event.
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        let event = match recorded {
            RecordedEvent::SnapshotQueued(e) => json!({
                "ph": "i",
                "name": "SnapshotQueued",
                "cat": "Queue",
                "ts": us(e.at),
                "pid": 0,
                "tid": TID_PRODUCER,
                "s": "t",
                "args": {
                    "sequence": e.sequence,
                    "kind": format!("{:?}", e.kind),
                    "elements": e.elements,
                }
            }),
            RecordedEvent::BatchDrained(e) => json!({
                "ph": "i",
                "name": "BatchDrained",
                "cat": "Queue",
                "ts": us(e.at),
                "pid": 0,
                "tid": TID_WORKER,
                "s": "t",
                "args": {
                    "frame_index": e.frame_index,
                    "batch_len": e.batch_len,
                    "newest_sequence": e.newest_sequence,
                }
            }),
            RecordedEvent::PhaseBegin(e) => json!({
                "ph": "B",
                "name": format!("{:?}", e.phase),
                "cat": "Frame",
                "ts": us(e.timestamp),
                "pid": 0,
                "tid": phase_tid(e.phase),
                "args": {
                    "frame_index": e.frame_index,
                }
            }),
            RecordedEvent::PhaseEnd(e) => json!({
                "ph": "E",
                "name": format!("{:?}", e.phase),
                "cat": "Frame",
                "ts": us(e.timestamp),
                "pid": 0,
                "tid": phase_tid(e.phase),
                "args": {
                    "frame_index": e.frame_index,
                }
            }),
            RecordedEvent::FrameBuilt(e) => json!({
                "ph": "i",
                "name": "FrameBuilt",
                "cat": "Frame",
                "ts": us(e.at),
                "pid": 0,
                "tid": TID_WORKER,
                "s": "t",
                "args": {
                    "frame_index": e.frame_index,
                    "snapshot_sequence": e.snapshot_sequence,
                    "full_repaint": e.full_repaint,
                    "blank": e.blank,
                    "painted": e.painted,
                    "skipped": e.skipped,
                    "dirty_area": e.dirty_area,
                }
            }),
            RecordedEvent::FramePainted(e) => json!({
                "ph": "i",
                "name": "FramePainted",
                "cat": "Frame",
                "ts": us(e.at),
                "pid": 0,
                "tid": TID_PAINT,
                "s": "t",
                "args": {
                    "frame_index": e.frame_index,
                    "blank": e.blank,
                    "painted": e.painted,
                    "wait_us": e.wait_nanos as f64 / 1000.0,
                }
            }),
            RecordedEvent::PaintTimedOut(e) => json!({
                "ph": "i",
                "name": "PaintTimedOut",
                "cat": "Frame",
                "ts": us(e.at),
                "pid": 0,
                "tid": TID_PAINT,
                "s": "t",
                "args": {
                    "waited_us": e.waited_nanos as f64 / 1000.0,
                }
            }),
            RecordedEvent::ElementChangesCount { frame_index, count } => json!({
                "ph": "i",
                "name": "ElementChanges",
                "cat": "Rich",
                "ts": last_ts,
                "pid": 0,
                "tid": TID_WORKER,
                "s": "t",
                "args": {
                    "frame_index": frame_index,
                    "count": count,
                }
            }),
            RecordedEvent::DirtyRectsCount { frame_index, count } => json!({
                "ph": "i",
                "name": "DirtyRects",
                "cat": "Rich",
                "ts": last_ts,
                "pid": 0,
                "tid": TID_WORKER,
                "s": "t",
                "args": {
                    "frame_index": frame_index,
                    "count": count,
                }
            }),
        };
        if let Some(ts) = event["ts"].as_f64() {
            last_ts = ts;
        }
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: TraceTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

fn phase_tid(phase: PhaseKind) -> u32 {
    match phase {
        PhaseKind::Collapse | PhaseKind::Build => TID_WORKER,
        PhaseKind::Paint => TID_PAINT,
    }
}
