// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Records a real pipeline run and checks the resulting trace.

use std::sync::Arc;
use std::time::Duration;

use kurbo::{Rect, Size};
use panelcast_core::element::{Element, ElementState};
use panelcast_core::panel::Panel;
use panelcast_core::shape::Shape;
use panelcast_core::style::Palette;
use panelcast_core::trace::{PhaseKind, SubmissionKind};
use panelcast_debug::SharedSink;
use panelcast_debug::chrome;
use panelcast_debug::recorder::{RecordedEvent, RecorderSink, decode};
use panelcast_render::{NoBackgrounds, PipelineConfig, RecordingCanvas, RepaintPipeline};

const WAIT: Option<Duration> = Some(Duration::from_secs(5));

#[test]
fn pipeline_run_is_recorded() {
    let _ = env_logger::builder().is_test(true).try_init();

    let pipeline = RepaintPipeline::new(
        PipelineConfig::standard(),
        Arc::new(Palette::standard()),
        NoBackgrounds,
    )
    .unwrap();
    let sink = SharedSink::new(RecorderSink::new());
    assert!(pipeline.set_trace_sink(Some(Box::new(sink.clone()))).is_none());

    let panel = Panel::new(Size::new(100.0, 100.0));
    let bounds = Rect::new(10.0, 10.0, 30.0, 30.0);
    let element = Arc::new(Element::new(
        ElementState::new(bounds),
        vec![Shape::fill(bounds)],
    ));
    panel.add(Arc::clone(&element));

    let mut canvas = RecordingCanvas::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    pipeline.update(panel.snapshot(false), false).unwrap();
    pipeline.paint(&mut canvas, WAIT).unwrap();
    element.modify(|s| s.set_highlighted(true));
    pipeline.update(panel.snapshot(true), true).unwrap();
    pipeline.paint(&mut canvas, WAIT).unwrap();
    pipeline.reset().unwrap();
    pipeline.paint(&mut canvas, WAIT).unwrap();

    // Detach the sink so the worker no longer writes to it.
    drop(pipeline.set_trace_sink(None));
    let bytes = sink.lock().as_bytes().to_vec();
    let events: Vec<_> = decode(&bytes).collect();

    let kinds: Vec<SubmissionKind> = events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::SnapshotQueued(q) => Some(q.kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        [
            SubmissionKind::Full,
            SubmissionKind::Incremental,
            SubmissionKind::Reset
        ]
    );

    let built: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            RecordedEvent::FrameBuilt(b) => Some(*b),
            _ => None,
        })
        .collect();
    assert_eq!(built.len(), 3);
    assert!(built[0].full_repaint);
    assert!(!built[1].full_repaint);
    assert_eq!(built[1].dirty_area, 400.0);
    assert!(built[2].blank);

    let painted = events
        .iter()
        .filter(|e| matches!(e, RecordedEvent::FramePainted(_)))
        .count();
    assert_eq!(painted, 3);

    let paint_phases = events
        .iter()
        .filter(|e| {
            matches!(e, RecordedEvent::PhaseBegin(p) if p.phase == PhaseKind::Paint)
        })
        .count();
    assert_eq!(paint_phases, 3);

    assert!(
        events
            .iter()
            .any(|e| matches!(e, RecordedEvent::DirtyRectsCount { count: 1, .. })),
        "the highlight frame reports one dirty rect"
    );

    let mut json = Vec::new();
    chrome::export(&bytes, &mut json).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_slice(&json).unwrap();
    assert_eq!(parsed.len(), events.len());
}
