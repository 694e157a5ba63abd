// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the repaint pipeline.

use panelcast_core::error::TransportError;
use thiserror::Error;

/// A wait on the frame handoff did not complete.
///
/// Either outcome aborts only the current paint cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HandoffError {
    /// No frame became ready before the deadline.
    #[error("timed out waiting for the frame handoff")]
    TimedOut,
    /// The pipeline is shutting down.
    #[error("frame handoff closed")]
    Closed,
}

/// The pipeline could not accept a submission or deliver a frame.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The worker thread has stopped.
    #[error("repaint worker has stopped")]
    Closed,
    /// Waiting for a frame failed.
    #[error(transparent)]
    Handoff(#[from] HandoffError),
    /// The worker thread could not be started.
    #[error("failed to spawn repaint worker")]
    Spawn(#[source] std::io::Error),
}

impl PipelineError {
    /// Returns whether this error only affects the current paint cycle.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Handoff(HandoffError::TimedOut))
    }
}

impl From<PipelineError> for TransportError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Closed | PipelineError::Handoff(HandoffError::Closed) => Self::Closed,
            other => Self::Unreachable(other.to_string()),
        }
    }
}

/// A background image reference could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BackgroundError {
    /// Nothing is known under this reference.
    #[error("background {0:?} not found")]
    NotFound(String),
    /// The image data could not be decoded.
    #[error("background {0:?} could not be decoded")]
    Decode(String),
}
