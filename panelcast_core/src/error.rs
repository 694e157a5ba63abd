// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for transfer encoding and transport.

use thiserror::Error;

use crate::element::ElementSerial;

/// A received element record could not be merged into the receiver's cache.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The element was never seen in full and the record omitted its state.
    #[error("{serial:?} arrived without state and has no cached copy")]
    MissingState {
        /// The offending element.
        serial: ElementSerial,
    },
    /// The element was never seen in full and the record omitted its geometry.
    #[error("{serial:?} arrived without geometry and has no cached copy")]
    MissingGeometry {
        /// The offending element.
        serial: ElementSerial,
    },
    /// An update was applied to the cached copy of a different element.
    #[error("update for {found:?} applied to cached {expected:?}")]
    SerialMismatch {
        /// Serial of the cached copy.
        expected: ElementSerial,
        /// Serial carried by the update.
        found: ElementSerial,
    },
}

/// Pushing a snapshot to the consumer failed.
///
/// Callers treat [`Unreachable`](Self::Unreachable) as transient: log it once
/// per outage and try again on the next natural update.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The remote side could not be reached.
    #[error("consumer unreachable: {0}")]
    Unreachable(String),
    /// The consumer has shut down and will not accept further snapshots.
    #[error("consumer closed")]
    Closed,
}
