// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The asynchronous repaint pipeline.
//!
//! ```text
//!   producer                 worker thread                    paint path
//!   ────────                 ─────────────                    ──────────
//!   update(snapshot) ──► [bounded queue] ──► drain all
//!   reset()          ──►                     collapse
//!                                            FrameData::build
//!                                            publish ──► [handoff] ──► paint(canvas)
//! ```
//!
//! [`RepaintPipeline::update`] blocks once the queue is full; losing a
//! snapshot would break the chain of incremental deltas. The worker drains
//! everything queued in one batch, collapses it into the newest snapshot,
//! diffs that against the previous frame, and publishes the result through
//! the single-slot handoff. While the paint path has not taken the last
//! frame, the worker waits and the queue fills up, which in turn throttles
//! the producer.
//!
//! Dropping the pipeline closes the handoff and the queue and joins the
//! worker.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use panelcast_core::error::TransportError;
use panelcast_core::panel::PanelData;
use panelcast_core::style::{Color, Palette};
use panelcast_core::trace::{
    BatchDrainedEvent, FrameBuiltEvent, FramePaintedEvent, PaintTimedOutEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, SnapshotQueuedEvent, SubmissionKind, TraceSink, TraceTime, Tracer,
};
use panelcast_core::transport::Transport;
use parking_lot::Mutex;

use crate::background::{BackgroundCache, BackgroundLoader};
use crate::canvas::{Canvas, PaintMode, PaintReport, Painter};
use crate::collapse::{Snapshot, Submission, collapse};
use crate::error::{HandoffError, PipelineError};
use crate::frame::{BuildOptions, FrameData};
use crate::handoff::{Handoff, Published};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`RepaintPipeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Number of submissions the queue holds before `update` blocks.
    /// Zero is treated as one.
    pub queue_capacity: usize,
    /// Initial selective-repaint policy.
    pub selective_repaint: bool,
    /// Color painted for the reset frame and behind panels without a
    /// background image.
    pub blank_color: Color,
    /// How long a [`Screen`](crate::Screen) tick waits for a new
    /// frame before redrawing the last one.
    pub max_paint_wait: Duration,
}

impl PipelineConfig {
    /// Default configuration: a 100-entry queue with selective repaint.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            queue_capacity: 100,
            selective_repaint: true,
            blank_color: Color::BLACK,
            max_paint_wait: Duration::from_millis(100),
        }
    }

    /// Configuration for hosts that cannot clip: every frame repaints the
    /// whole panel.
    #[must_use]
    pub const fn full_repaint() -> Self {
        Self {
            selective_repaint: false,
            ..Self::standard()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Counters describing pipeline activity since creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Snapshots accepted by `update`.
    pub snapshots_queued: u64,
    /// Reset markers accepted by `reset`.
    pub resets_queued: u64,
    /// Batches drained by the worker.
    pub batches_drained: u64,
    /// Submissions discarded by collapsing.
    pub snapshots_collapsed: u64,
    /// Frames (including blank frames) published by the worker.
    pub frames_built: u64,
    /// Frames taken by the paint path.
    pub frames_painted: u64,
    /// Paint calls that timed out.
    pub paint_timeouts: u64,
    /// Element records skipped during frame construction.
    pub elements_skipped: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    snapshots_queued: AtomicU64,
    resets_queued: AtomicU64,
    batches_drained: AtomicU64,
    snapshots_collapsed: AtomicU64,
    frames_built: AtomicU64,
    frames_painted: AtomicU64,
    paint_timeouts: AtomicU64,
    elements_skipped: AtomicU64,
}

impl StatsCounters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            snapshots_queued: self.snapshots_queued.load(Ordering::Relaxed),
            resets_queued: self.resets_queued.load(Ordering::Relaxed),
            batches_drained: self.batches_drained.load(Ordering::Relaxed),
            snapshots_collapsed: self.snapshots_collapsed.load(Ordering::Relaxed),
            frames_built: self.frames_built.load(Ordering::Relaxed),
            frames_painted: self.frames_painted.load(Ordering::Relaxed),
            paint_timeouts: self.paint_timeouts.load(Ordering::Relaxed),
            elements_skipped: self.elements_skipped.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

type SinkSlot = Mutex<Option<Box<dyn TraceSink + Send>>>;

struct Shared {
    handoff: Handoff,
    selective_repaint: AtomicBool,
    stats: StatsCounters,
    sink: SinkSlot,
    epoch: Instant,
}

impl Shared {
    fn now(&self) -> TraceTime {
        TraceTime(nanos(self.epoch.elapsed()))
    }

    /// Runs `f` with a tracer over the installed sink, if any.
    fn trace(&self, f: impl FnOnce(&mut Tracer<'_>, TraceTime)) {
        if !cfg!(feature = "trace") {
            return;
        }
        let now = self.now();
        let mut sink = self.sink.lock();
        let Some(sink) = sink.as_deref_mut() else {
            return;
        };
        let mut tracer = Tracer::new(sink);
        f(&mut tracer, now);
    }
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// RepaintPipeline
// ---------------------------------------------------------------------------

/// Turns a stream of panel snapshots into paintable frames on a background
/// thread.
///
/// `update` and `reset` are meant for a single producer thread; `paint` for
/// a single paint thread. All three take `&self`, so the pipeline can be
/// shared behind an [`Arc`].
pub struct RepaintPipeline {
    shared: Arc<Shared>,
    sender: Option<Sender<Submission>>,
    worker: Option<JoinHandle<()>>,
    next_sequence: AtomicU64,
    armed: AtomicBool,
    painter: Painter,
}

impl fmt::Debug for RepaintPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepaintPipeline")
            .field("armed", &self.is_armed())
            .field("selective_repaint", &self.selective_repaint())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl RepaintPipeline {
    /// Creates a pipeline and starts its worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the worker thread could not be
    /// started.
    pub fn new(
        config: PipelineConfig,
        palette: Arc<Palette>,
        backgrounds: impl BackgroundLoader + 'static,
    ) -> Result<Self, PipelineError> {
        let shared = Arc::new(Shared {
            handoff: Handoff::new(),
            selective_repaint: AtomicBool::new(config.selective_repaint),
            stats: StatsCounters::default(),
            sink: Mutex::new(None),
            epoch: Instant::now(),
        });
        let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity.max(1));
        let worker = {
            let shared = Arc::clone(&shared);
            let backgrounds = BackgroundCache::new(backgrounds);
            std::thread::Builder::new()
                .name("panelcast-repaint".into())
                .spawn(move || Worker::new(shared, backgrounds).run(&receiver))
                .map_err(PipelineError::Spawn)?
        };
        Ok(Self {
            shared,
            sender: Some(sender),
            worker: Some(worker),
            next_sequence: AtomicU64::new(0),
            armed: AtomicBool::new(false),
            painter: Painter::new(palette, config.blank_color),
        })
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_trace_sink(
        &self,
        sink: Option<Box<dyn TraceSink + Send>>,
    ) -> Option<Box<dyn TraceSink + Send>> {
        core::mem::replace(&mut *self.shared.sink.lock(), sink)
    }

    // -- Producer side --

    /// Queues a snapshot, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Closed`] if the worker has stopped.
    pub fn update(&self, data: PanelData, incremental: bool) -> Result<(), PipelineError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let elements = count(data.elements.len());
        let kind = if incremental {
            SubmissionKind::Incremental
        } else {
            SubmissionKind::Full
        };
        self.submit(Submission::Snapshot(Snapshot {
            data,
            incremental,
            sequence,
        }))?;
        StatsCounters::bump(&self.shared.stats.snapshots_queued, 1);
        self.shared.trace(|tracer, at| {
            tracer.snapshot_queued(&SnapshotQueuedEvent {
                sequence,
                kind,
                elements,
                at,
            });
        });
        Ok(())
    }

    /// Queues the reset marker; the frame built from it is blank, and the
    /// first frame after it is painted in full.
    ///
    /// Snapshots queued before the reset are still processed in order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Closed`] if the worker has stopped.
    pub fn reset(&self) -> Result<(), PipelineError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.submit(Submission::Reset { sequence })?;
        StatsCounters::bump(&self.shared.stats.resets_queued, 1);
        self.shared.trace(|tracer, at| {
            tracer.snapshot_queued(&SnapshotQueuedEvent {
                sequence,
                kind: SubmissionKind::Reset,
                elements: 0,
                at,
            });
        });
        Ok(())
    }

    fn submit(&self, submission: Submission) -> Result<(), PipelineError> {
        let sender = self.sender.as_ref().ok_or(PipelineError::Closed)?;
        sender.send(submission).map_err(|_| PipelineError::Closed)?;
        self.armed.store(true, Ordering::Release);
        Ok(())
    }

    /// Returns whether any submission has been accepted.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Sets the selective-repaint policy for frames built from now on.
    pub fn set_selective_repaint(&self, selective: bool) {
        self.shared
            .selective_repaint
            .store(selective, Ordering::Relaxed);
    }

    /// Returns the current selective-repaint policy.
    #[must_use]
    pub fn selective_repaint(&self) -> bool {
        self.shared.selective_repaint.load(Ordering::Relaxed)
    }

    // -- Paint side --

    /// Returns whether a frame is ready to be taken without waiting.
    #[must_use]
    pub fn has_frame(&self) -> bool {
        self.shared.handoff.is_ready()
    }

    /// Takes the next published frame.
    ///
    /// With `timeout == None` this waits as long as necessary.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Handoff`] with [`HandoffError::TimedOut`] if
    /// no frame became ready in time, or [`HandoffError::Closed`] if the
    /// pipeline is shutting down. Either aborts only this paint cycle.
    pub fn take_frame(&self, timeout: Option<Duration>) -> Result<Published, PipelineError> {
        let started = Instant::now();
        match self.shared.handoff.take(timeout) {
            Ok(published) => {
                StatsCounters::bump(&self.shared.stats.frames_painted, 1);
                Ok(published)
            }
            Err(HandoffError::TimedOut) => {
                StatsCounters::bump(&self.shared.stats.paint_timeouts, 1);
                let waited_nanos = nanos(started.elapsed());
                self.shared.trace(|tracer, at| {
                    tracer.paint_timed_out(&PaintTimedOutEvent { waited_nanos, at });
                });
                Err(HandoffError::TimedOut.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Takes the next frame and paints its dirty region onto `canvas`.
    ///
    /// # Errors
    ///
    /// See [`take_frame`](Self::take_frame).
    pub fn paint(
        &self,
        canvas: &mut dyn Canvas,
        timeout: Option<Duration>,
    ) -> Result<PaintReport, PipelineError> {
        let started = Instant::now();
        let published = self.take_frame(timeout)?;
        let wait_nanos = nanos(started.elapsed());
        Ok(self.paint_published(&published, canvas, PaintMode::Dirty, wait_nanos))
    }

    /// Paints a frame that was already taken, e.g. to redraw the last frame
    /// after an expose event. `wait_nanos` is reported to the trace sink.
    pub fn paint_published(
        &self,
        published: &Published,
        canvas: &mut dyn Canvas,
        mode: PaintMode,
        wait_nanos: u64,
    ) -> PaintReport {
        let frame_index = published.frame().map_or(0, |f| f.frame_index());
        self.shared.trace(|tracer, at| {
            tracer.phase_begin(&PhaseBeginEvent {
                frame_index,
                phase: PhaseKind::Paint,
                timestamp: at,
            });
        });
        let report = self.painter.paint(published, canvas, mode);
        log::trace!("painted {report:?}");
        self.shared.trace(|tracer, at| {
            tracer.phase_end(&PhaseEndEvent {
                frame_index,
                phase: PhaseKind::Paint,
                timestamp: at,
            });
            tracer.frame_painted(&FramePaintedEvent {
                frame_index,
                blank: report.blank,
                painted: count(report.painted),
                wait_nanos,
                at,
            });
        });
        report
    }

    /// Returns the painter.
    #[must_use]
    pub fn painter(&self) -> &Painter {
        &self.painter
    }

    /// Returns activity counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.shared.stats.snapshot()
    }
}

impl Transport for RepaintPipeline {
    fn push(&self, data: PanelData, incremental: bool) -> Result<(), TransportError> {
        self.update(data, incremental).map_err(TransportError::from)
    }
}

impl Drop for RepaintPipeline {
    fn drop(&mut self) {
        self.shared.handoff.close();
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("repaint worker panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct Worker {
    shared: Arc<Shared>,
    backgrounds: BackgroundCache,
    previous: Option<Arc<FrameData>>,
    frame_index: u64,
    force_full: bool,
}

impl Worker {
    fn new(shared: Arc<Shared>, backgrounds: BackgroundCache) -> Self {
        Self {
            shared,
            backgrounds,
            previous: None,
            frame_index: 0,
            force_full: false,
        }
    }

    fn run(mut self, receiver: &Receiver<Submission>) {
        while let Ok(first) = receiver.recv() {
            let mut batch = vec![first];
            batch.extend(receiver.try_iter());
            let published = self.process(batch);
            if self.shared.handoff.publish(published).is_err() {
                break;
            }
        }
        log::debug!("repaint worker exiting after {} frames", self.frame_index);
    }

    fn process(&mut self, batch: Vec<Submission>) -> Published {
        self.frame_index += 1;
        let frame_index = self.frame_index;
        let batch_len = batch.len();
        let newest_sequence = batch.last().map_or(0, Submission::sequence);

        let shared = Arc::clone(&self.shared);
        let stats = &shared.stats;
        StatsCounters::bump(&stats.batches_drained, 1);
        StatsCounters::bump(&stats.snapshots_collapsed, batch_len.saturating_sub(1) as u64);
        log::trace!("frame {frame_index}: drained {batch_len} submission(s)");

        self.shared.trace(|tracer, at| {
            tracer.batch_drained(&BatchDrainedEvent {
                frame_index,
                batch_len: count(batch_len),
                newest_sequence,
                at,
            });
            tracer.phase_begin(&PhaseBeginEvent {
                frame_index,
                phase: PhaseKind::Collapse,
                timestamp: at,
            });
        });
        let batch = self.absorb_before_reset(batch);
        let collapsed = collapse(batch);
        self.shared.trace(|tracer, at| {
            tracer.phase_end(&PhaseEndEvent {
                frame_index,
                phase: PhaseKind::Collapse,
                timestamp: at,
            });
        });

        let (target, collapsed_full) =
            collapsed.map_or((None, false), |c| (c.target, c.force_full));
        let force_full = self.force_full || collapsed_full;
        let Some(snapshot) = target else {
            // Reset: the next frame starts over.
            self.force_full = true;
            StatsCounters::bump(&stats.frames_built, 1);
            self.shared.trace(|tracer, at| {
                tracer.frame_built(&FrameBuiltEvent {
                    frame_index,
                    snapshot_sequence: newest_sequence,
                    full_repaint: true,
                    blank: true,
                    painted: 0,
                    skipped: 0,
                    dirty_area: 0.0,
                    at,
                });
            });
            return Published::Blank;
        };

        self.shared.trace(|tracer, at| {
            tracer.phase_begin(&PhaseBeginEvent {
                frame_index,
                phase: PhaseKind::Build,
                timestamp: at,
            });
        });
        let options = BuildOptions {
            selective_repaint: self.shared.selective_repaint.load(Ordering::Relaxed),
            force_full,
        };
        let frame = FrameData::build(
            frame_index,
            snapshot,
            self.previous.as_deref(),
            &mut self.backgrounds,
            options,
        );
        self.force_full = false;

        if !frame.skipped().is_empty() {
            StatsCounters::bump(&stats.elements_skipped, frame.skipped().len() as u64);
            let details: Vec<String> = frame
                .skipped()
                .iter()
                .map(|s| s.error.to_string())
                .collect();
            log::warn!(
                "frame {frame_index} (snapshot {}): skipped {} element(s): {}",
                frame.snapshot_sequence(),
                details.len(),
                details.join("; ")
            );
        }

        self.trace_built(&frame);
        StatsCounters::bump(&stats.frames_built, 1);
        let frame = Arc::new(frame);
        self.previous = Some(Arc::clone(&frame));
        Published::Frame(frame)
    }

    /// Applies everything queued before the newest reset to the element
    /// cache and returns the rest of the batch, starting at that reset.
    ///
    /// A reset blanks the display, not the producer's delta chain: later
    /// incremental snapshots still withhold what those entries carried.
    fn absorb_before_reset(&mut self, mut batch: Vec<Submission>) -> Vec<Submission> {
        let Some(reset) = batch
            .iter()
            .rposition(|s| matches!(s, Submission::Reset { .. }))
        else {
            return batch;
        };
        let rest = batch.split_off(reset);
        batch.retain(|s| matches!(s, Submission::Snapshot(_)));
        let Some(target) = collapse(batch).and_then(|c| c.target) else {
            return rest;
        };

        let cache = FrameData::build(
            self.frame_index,
            target,
            self.previous.as_deref(),
            &mut self.backgrounds,
            BuildOptions {
                selective_repaint: false,
                force_full: true,
            },
        );
        if !cache.skipped().is_empty() {
            log::debug!(
                "snapshot {} before reset: {} element(s) not cached",
                cache.snapshot_sequence(),
                cache.skipped().len()
            );
        }
        self.previous = Some(Arc::new(cache));
        rest
    }

    fn trace_built(&self, frame: &FrameData) {
        let bounds = frame.bounds();
        self.shared.trace(|tracer, at| {
            tracer.phase_end(&PhaseEndEvent {
                frame_index: frame.frame_index(),
                phase: PhaseKind::Build,
                timestamp: at,
            });
            #[cfg(feature = "trace-rich")]
            {
                use panelcast_core::trace::{DirtyRect, ElementChange};
                let changes: Vec<ElementChange> = frame
                    .elements()
                    .iter()
                    .zip(frame.changes())
                    .filter(|(_, c)| !c.is_empty())
                    .map(|(e, c)| ElementChange {
                        serial: e.serial,
                        changes: *c,
                    })
                    .collect();
                tracer.element_changes(frame.frame_index(), &changes);
                let rects: Vec<DirtyRect> = frame
                    .dirty()
                    .rects(bounds)
                    .into_iter()
                    .map(|r| DirtyRect {
                        x0: r.x0,
                        y0: r.y0,
                        x1: r.x1,
                        y1: r.y1,
                    })
                    .collect();
                tracer.dirty_rects(frame.frame_index(), &rects);
            }
            tracer.frame_built(&FrameBuiltEvent {
                frame_index: frame.frame_index(),
                snapshot_sequence: frame.snapshot_sequence(),
                full_repaint: frame.is_full_repaint(),
                blank: false,
                painted: count(frame.paint_indices().len()),
                skipped: count(frame.skipped().len()),
                dirty_area: frame.dirty().area(bounds),
                at,
            });
        });
    }
}
