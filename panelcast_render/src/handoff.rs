// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-slot frame handoff between the worker and the paint path.
//!
//! Two counting semaphores guard one slot:
//!
//! ```text
//!   worker                          paint path
//!   ──────                          ──────────
//!   context_free.acquire()          paint_ready.acquire()
//!   slot ← frame                    frame ← slot
//!   paint_ready.release()           context_free.release()
//! ```
//!
//! `context_free` starts at one and `paint_ready` at zero, so the slot holds
//! at most one frame, the paint path never reads a half-written slot, and the
//! worker never overwrites a frame that has not been taken. The slot's lock
//! is never contended; the semaphores already serialize access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::HandoffError;
use crate::frame::FrameData;

/// What the worker hands to the paint path.
#[derive(Clone, Debug)]
pub enum Published {
    /// A frame to paint.
    Frame(Arc<FrameData>),
    /// Clear to the blank background.
    Blank,
}

impl Published {
    /// Returns the frame, unless this is the blank marker.
    #[must_use]
    pub fn frame(&self) -> Option<&Arc<FrameData>> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Blank => None,
        }
    }

    /// Returns whether this is the blank marker.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

#[derive(Debug)]
struct Permits {
    available: usize,
    closed: bool,
}

/// A counting semaphore that can be closed to wake all waiters.
#[derive(Debug)]
pub(crate) struct Semaphore {
    permits: Mutex<Permits>,
    cond: Condvar,
}

impl Semaphore {
    pub(crate) fn new(available: usize) -> Self {
        Self {
            permits: Mutex::new(Permits {
                available,
                closed: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Takes a permit, waiting as long as necessary.
    pub(crate) fn acquire(&self) -> Result<(), HandoffError> {
        let mut permits = self.permits.lock();
        loop {
            if permits.closed {
                return Err(HandoffError::Closed);
            }
            if permits.available > 0 {
                permits.available -= 1;
                return Ok(());
            }
            self.cond.wait(&mut permits);
        }
    }

    /// Takes a permit, waiting at most `timeout`.
    pub(crate) fn acquire_timeout(&self, timeout: Duration) -> Result<(), HandoffError> {
        let deadline = Instant::now() + timeout;
        let mut permits = self.permits.lock();
        loop {
            if permits.closed {
                return Err(HandoffError::Closed);
            }
            if permits.available > 0 {
                permits.available -= 1;
                return Ok(());
            }
            if self.cond.wait_until(&mut permits, deadline).timed_out() {
                if permits.available > 0 && !permits.closed {
                    permits.available -= 1;
                    return Ok(());
                }
                return Err(HandoffError::TimedOut);
            }
        }
    }

    pub(crate) fn release(&self) {
        self.permits.lock().available += 1;
        self.cond.notify_one();
    }

    /// Fails every current and future wait.
    pub(crate) fn close(&self) {
        self.permits.lock().closed = true;
        self.cond.notify_all();
    }

    pub(crate) fn available(&self) -> usize {
        self.permits.lock().available
    }
}

/// The two-semaphore mailbox.
#[derive(Debug)]
pub(crate) struct Handoff {
    paint_ready: Semaphore,
    context_free: Semaphore,
    slot: Mutex<Option<Published>>,
}

impl Handoff {
    pub(crate) fn new() -> Self {
        Self {
            paint_ready: Semaphore::new(0),
            context_free: Semaphore::new(1),
            slot: Mutex::new(None),
        }
    }

    /// Publishes a frame, waiting until the previous one has been taken.
    pub(crate) fn publish(&self, published: Published) -> Result<(), HandoffError> {
        self.context_free.acquire()?;
        *self.slot.lock() = Some(published);
        self.paint_ready.release();
        Ok(())
    }

    /// Takes the published frame, waiting at most `timeout` if given.
    pub(crate) fn take(&self, timeout: Option<Duration>) -> Result<Published, HandoffError> {
        match timeout {
            Some(timeout) => self.paint_ready.acquire_timeout(timeout)?,
            None => self.paint_ready.acquire()?,
        }
        let published = self.slot.lock().take();
        self.context_free.release();
        published.ok_or(HandoffError::Closed)
    }

    /// Returns whether a frame is waiting to be taken.
    pub(crate) fn is_ready(&self) -> bool {
        self.paint_ready.available() > 0
    }

    pub(crate) fn close(&self) {
        self.paint_ready.close();
        self.context_free.close();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn take_times_out_when_nothing_published() {
        let handoff = Handoff::new();
        assert_eq!(
            handoff.take(Some(Duration::from_millis(10))).unwrap_err(),
            HandoffError::TimedOut
        );
    }

    #[test]
    fn publish_then_take() {
        let handoff = Handoff::new();
        handoff.publish(Published::Blank).unwrap();
        assert!(handoff.is_ready());
        assert!(handoff.take(None).unwrap().is_blank());
        assert!(!handoff.is_ready());
    }

    #[test]
    fn second_publish_waits_for_take() {
        let handoff = Arc::new(Handoff::new());
        handoff.publish(Published::Blank).unwrap();

        let worker = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || handoff.publish(Published::Blank))
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!worker.is_finished());

        handoff.take(None).unwrap();
        worker.join().unwrap().unwrap();
        assert!(handoff.is_ready());
    }

    #[test]
    fn close_wakes_waiters() {
        let handoff = Arc::new(Handoff::new());
        let painter = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || handoff.take(None).map(|_| ()))
        };
        thread::sleep(Duration::from_millis(20));
        handoff.close();
        assert_eq!(painter.join().unwrap(), Err(HandoffError::Closed));
    }

    #[test]
    fn semaphore_counts_permits() {
        let sem = Semaphore::new(2);
        sem.acquire().unwrap();
        sem.acquire().unwrap();
        assert_eq!(
            sem.acquire_timeout(Duration::from_millis(1)),
            Err(HandoffError::TimedOut)
        );
        sem.release();
        assert_eq!(sem.available(), 1);
    }
}
