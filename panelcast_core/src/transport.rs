// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between a panel producer and whatever paints it.
//!
//! A [`Transport`] accepts [`PanelData`] snapshots. The painting side may be
//! in-process (the render crate's repaint pipeline implements this trait) or
//! remote, in which case a push can fail with a connectivity error.
//!
//! Connectivity failures are transient: [`Publisher`] keeps the producer
//! running, reports each outage once through [`OutageLog`], and forces the
//! first push after an outage to be a full snapshot. Change masks are cleared
//! when a snapshot is taken, so the deltas carried by a lost incremental push
//! cannot be recovered any other way.

use std::sync::Arc;

use crate::error::TransportError;
use crate::panel::{Panel, PanelData};

/// Something that can carry panel snapshots to a painter.
pub trait Transport {
    /// Delivers one snapshot.
    ///
    /// `incremental` tells the receiver whether withheld fields should be
    /// carried forward from its cache.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the receiver could not be reached. The
    /// snapshot is lost; callers should resend in full.
    fn push(&self, data: PanelData, incremental: bool) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn push(&self, data: PanelData, incremental: bool) -> Result<(), TransportError> {
        (**self).push(data, incremental)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn push(&self, data: PanelData, incremental: bool) -> Result<(), TransportError> {
        (**self).push(data, incremental)
    }
}

// -- Outage reporting --

/// Logs the first failure of each outage and the recovery that ends it.
///
/// Failures in between are counted but not logged.
#[derive(Clone, Debug)]
pub struct OutageLog {
    label: String,
    suppressed: u64,
    down: bool,
}

impl OutageLog {
    /// Creates a log that prefixes its messages with `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            suppressed: 0,
            down: false,
        }
    }

    /// Records a failure.
    ///
    /// Returns `true` if this failure started a new outage (and was logged).
    pub fn failed(&mut self, err: &TransportError) -> bool {
        if self.down {
            self.suppressed += 1;
            return false;
        }
        self.down = true;
        self.suppressed = 0;
        log::warn!("{}: {err}; suppressing repeats until recovery", self.label);
        true
    }

    /// Records a success.
    ///
    /// Returns `true` if this success ended an outage (and was logged).
    pub fn succeeded(&mut self) -> bool {
        if !self.down {
            return false;
        }
        self.down = false;
        log::info!(
            "{}: reachable again ({} repeated failures suppressed)",
            self.label,
            self.suppressed
        );
        true
    }

    /// Returns whether an outage is in progress.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Returns the number of failures suppressed during the current outage.
    #[must_use]
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

// -- Publisher --

/// Result of one [`Publisher::publish`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing changed, so nothing was sent.
    Skipped,
    /// A snapshot was delivered.
    Sent {
        /// Whether the snapshot was incremental.
        incremental: bool,
    },
    /// Delivery failed; the next publish is forced full.
    Failed,
}

/// Pushes snapshots of one panel through a transport.
#[derive(Debug)]
pub struct Publisher<T> {
    panel: Arc<Panel>,
    transport: T,
    outage: OutageLog,
    force_full: bool,
}

impl<T: Transport> Publisher<T> {
    /// Creates a publisher for `panel`.
    ///
    /// The first publish is incremental; a new panel is fully marked, so it
    /// still carries everything.
    #[must_use]
    pub fn new(panel: Arc<Panel>, transport: T) -> Self {
        Self {
            panel,
            transport,
            outage: OutageLog::new("panel transport"),
            force_full: false,
        }
    }

    /// Replaces the outage label used in log messages.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.outage = OutageLog::new(label);
        self
    }

    /// Returns the published panel.
    #[must_use]
    pub fn panel(&self) -> &Arc<Panel> {
        &self.panel
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the outage state.
    #[must_use]
    pub fn outage(&self) -> &OutageLog {
        &self.outage
    }

    /// Sends the panel's pending changes, if any.
    pub fn publish(&mut self) -> PublishOutcome {
        if !self.force_full && !self.panel.has_changes() {
            return PublishOutcome::Skipped;
        }
        self.send(!self.force_full)
    }

    /// Sends a full snapshot regardless of pending changes.
    pub fn publish_full(&mut self) -> PublishOutcome {
        self.send(false)
    }

    fn send(&mut self, incremental: bool) -> PublishOutcome {
        let data = self.panel.snapshot(incremental);
        match self.transport.push(data, incremental) {
            Ok(()) => {
                self.outage.succeeded();
                self.force_full = false;
                PublishOutcome::Sent { incremental }
            }
            Err(err) => {
                self.outage.failed(&err);
                self.force_full = true;
                PublishOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};

    use kurbo::{Rect, Size};

    use super::*;
    use crate::element::{Element, ElementState};
    use crate::shape::Shape;

    #[derive(Default)]
    struct FlakyTransport {
        failing: Cell<bool>,
        received: RefCell<Vec<(PanelData, bool)>>,
    }

    impl Transport for FlakyTransport {
        fn push(&self, data: PanelData, incremental: bool) -> Result<(), TransportError> {
            if self.failing.get() {
                return Err(TransportError::Unreachable("link down".into()));
            }
            self.received.borrow_mut().push((data, incremental));
            Ok(())
        }
    }

    fn panel_with_element() -> (Arc<Panel>, Arc<Element>) {
        let panel = Arc::new(Panel::new(Size::new(100.0, 100.0)));
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let element = Arc::new(Element::new(
            ElementState::new(bounds),
            vec![Shape::fill(bounds)],
        ));
        panel.add(Arc::clone(&element));
        (panel, element)
    }

    #[test]
    fn outage_is_logged_once() {
        let mut log = OutageLog::new("test");
        let err = TransportError::Closed;
        assert!(!log.succeeded());
        assert!(log.failed(&err));
        assert!(!log.failed(&err));
        assert!(!log.failed(&err));
        assert_eq!(log.suppressed(), 2);
        assert!(log.is_down());
        assert!(log.succeeded());
        assert!(!log.is_down());
        assert!(log.failed(&err));
    }

    #[test]
    fn publish_skips_when_nothing_changed() {
        let (panel, _element) = panel_with_element();
        let mut publisher = Publisher::new(panel, FlakyTransport::default());
        assert_eq!(
            publisher.publish(),
            PublishOutcome::Sent { incremental: true }
        );
        assert_eq!(publisher.publish(), PublishOutcome::Skipped);
        assert_eq!(publisher.transport().received.borrow().len(), 1);
    }

    #[test]
    fn failure_forces_next_push_full() {
        let (panel, element) = panel_with_element();
        let mut publisher = Publisher::new(panel, FlakyTransport::default());
        publisher.publish();

        publisher.transport().failing.set(true);
        element.modify(|s| s.set_highlighted(true));
        assert_eq!(publisher.publish(), PublishOutcome::Failed);
        assert!(publisher.outage().is_down());

        publisher.transport().failing.set(false);
        // Nothing changed since the failed push, but its deltas were lost.
        assert_eq!(
            publisher.publish(),
            PublishOutcome::Sent { incremental: false }
        );
        let received = publisher.transport().received.borrow();
        let (data, incremental) = received.last().unwrap();
        assert!(!incremental);
        assert!(data.is_complete());
        assert!(data.elements[0].state.as_ref().unwrap().highlighted());
        drop(received);
        assert!(!publisher.outage().is_down());
    }
}
