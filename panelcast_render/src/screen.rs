// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A paint loop driver that owns a canvas.

use std::sync::Arc;
use std::time::Duration;

use crate::canvas::{Canvas, PaintMode, PaintReport};
use crate::error::{HandoffError, PipelineError};
use crate::handoff::Published;
use crate::pipeline::RepaintPipeline;

/// Outcome of one [`Screen::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenTick {
    /// A new frame was painted.
    Painted(PaintReport),
    /// No new frame arrived in time; the last one was painted again in full.
    Redrawn(PaintReport),
    /// No new frame arrived and nothing has been painted yet.
    Idle,
}

/// Paints frames from a [`RepaintPipeline`] onto a canvas, one tick at a
/// time.
///
/// Hosts that repaint on a timer or on expose events call [`tick`] from
/// their paint callback. When the pipeline has nothing new within
/// `max_wait`, the previous frame is redrawn so the canvas stays correct
/// after being damaged by the windowing system.
///
/// [`tick`]: Self::tick
#[derive(Debug)]
pub struct Screen<C> {
    pipeline: Arc<RepaintPipeline>,
    canvas: C,
    max_wait: Duration,
    last: Option<Published>,
}

impl<C: Canvas> Screen<C> {
    /// Creates a screen.
    #[must_use]
    pub fn new(pipeline: Arc<RepaintPipeline>, canvas: C, max_wait: Duration) -> Self {
        Self {
            pipeline,
            canvas,
            max_wait,
            last: None,
        }
    }

    /// Waits up to `max_wait` for a frame and paints it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Handoff`] with [`HandoffError::Closed`] once
    /// the pipeline shuts down.
    pub fn tick(&mut self) -> Result<ScreenTick, PipelineError> {
        match self.pipeline.take_frame(Some(self.max_wait)) {
            Ok(published) => {
                let report =
                    self.pipeline
                        .paint_published(&published, &mut self.canvas, PaintMode::Dirty, 0);
                self.last = Some(published);
                Ok(ScreenTick::Painted(report))
            }
            Err(PipelineError::Handoff(HandoffError::TimedOut)) => Ok(self.redraw()),
            Err(err) => Err(err),
        }
    }

    /// Paints the last frame again, in full.
    pub fn redraw(&mut self) -> ScreenTick {
        match &self.last {
            Some(published) => ScreenTick::Redrawn(self.pipeline.paint_published(
                published,
                &mut self.canvas,
                PaintMode::Full,
                0,
            )),
            None => ScreenTick::Idle,
        }
    }

    /// Returns the pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<RepaintPipeline> {
        &self.pipeline
    }

    /// Returns the canvas.
    #[must_use]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Returns the canvas mutably.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Returns the last painted frame, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Published> {
        self.last.as_ref()
    }
}
