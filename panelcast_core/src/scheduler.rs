// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic widget behaviors driven from one tick source.
//!
//! Blinking panels and hold-to-repeat buttons both need a timer. Rather than
//! each widget owning a thread, every periodic [`Behavior`] subscribes to a
//! single [`BehaviorScheduler`], and whoever owns the application loop calls
//! [`BehaviorScheduler::tick`] with the current time.
//!
//! The scheduler never sleeps; [`BehaviorScheduler::next_due`] tells the
//! caller how long it may wait before the next tick matters.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::panel::Panel;

/// What a behavior wants after it has run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickResult {
    /// Run again after the next interval.
    Continue,
    /// Unsubscribe.
    Done,
}

/// A periodic action.
pub trait Behavior: Send {
    /// Runs one period of the behavior.
    fn tick(&mut self, now: Instant) -> TickResult;
}

impl<F: FnMut(Instant) -> TickResult + Send> Behavior for F {
    fn tick(&mut self, now: Instant) -> TickResult {
        self(now)
    }
}

/// Handle identifying a subscription.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BehaviorId(u64);

impl fmt::Debug for BehaviorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Behavior#{}", self.0)
    }
}

struct Subscription {
    id: BehaviorId,
    behavior: Box<dyn Behavior>,
    interval: Duration,
    next_due: Instant,
}

/// Ticks every subscribed behavior at its own interval.
#[derive(Default)]
pub struct BehaviorScheduler {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl fmt::Debug for BehaviorScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorScheduler")
            .field("subscriptions", &self.subscriptions.len())
            .field("next_due", &self.next_due())
            .finish_non_exhaustive()
    }
}

impl BehaviorScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a behavior that first runs one `interval` after `now`.
    pub fn subscribe(
        &mut self,
        behavior: impl Behavior + 'static,
        interval: Duration,
        now: Instant,
    ) -> BehaviorId {
        self.subscribe_after(behavior, interval, interval, now)
    }

    /// Subscribes a behavior that first runs `delay` after `now`, then every
    /// `interval`.
    pub fn subscribe_after(
        &mut self,
        behavior: impl Behavior + 'static,
        delay: Duration,
        interval: Duration,
        now: Instant,
    ) -> BehaviorId {
        let id = BehaviorId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            behavior: Box::new(behavior),
            interval,
            next_due: now + delay,
        });
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn cancel(&mut self, id: BehaviorId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Returns whether `id` is still subscribed.
    #[must_use]
    pub fn contains(&self, id: BehaviorId) -> bool {
        self.subscriptions.iter().any(|s| s.id == id)
    }

    /// Returns the number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns whether nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Returns the earliest time any behavior is due.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.subscriptions.iter().map(|s| s.next_due).min()
    }

    /// Runs every behavior that is due at `now` and returns how many ran.
    ///
    /// A behavior runs at most once per call. If the caller fell behind by
    /// more than one interval, missed periods are dropped rather than
    /// replayed.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        self.subscriptions.retain_mut(|sub| {
            if sub.next_due > now {
                return true;
            }
            ran += 1;
            match sub.behavior.tick(now) {
                TickResult::Done => {
                    log::trace!("{:?} finished", sub.id);
                    false
                }
                TickResult::Continue => {
                    sub.next_due += sub.interval;
                    if sub.next_due <= now {
                        sub.next_due = now + sub.interval;
                    }
                    true
                }
            }
        });
        ran
    }
}

// -- Stock behaviors --

/// Toggles a panel's blink phase every period.
#[derive(Debug)]
pub struct BlinkBehavior {
    panel: Arc<Panel>,
    remaining: Option<u32>,
}

impl BlinkBehavior {
    /// Blinks `panel` until the subscription is cancelled.
    #[must_use]
    pub fn new(panel: Arc<Panel>) -> Self {
        Self {
            panel,
            remaining: None,
        }
    }

    /// Blinks `panel` for `toggles` phase changes, then leaves the phase off.
    #[must_use]
    pub fn toggles(panel: Arc<Panel>, toggles: u32) -> Self {
        Self {
            panel,
            remaining: Some(toggles),
        }
    }
}

impl Behavior for BlinkBehavior {
    fn tick(&mut self, _now: Instant) -> TickResult {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                self.panel.modify(|s| s.set_blink(false));
                return TickResult::Done;
            }
            *remaining -= 1;
        }
        self.panel.modify(|s| {
            let blink = s.blink();
            s.set_blink(!blink);
        });
        TickResult::Continue
    }
}

/// Fires an action repeatedly while a widget is held down.
pub struct RepeatBehavior {
    held: Arc<AtomicBool>,
    action: Box<dyn FnMut() + Send>,
}

impl fmt::Debug for RepeatBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeatBehavior")
            .field("held", &self.held.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Releases a [`RepeatBehavior`] from the input side.
#[derive(Clone, Debug)]
pub struct RepeatHandle {
    held: Arc<AtomicBool>,
}

impl RepeatHandle {
    /// Marks the widget as released; the behavior finishes on its next tick.
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    /// Returns whether the widget is still held.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl RepeatBehavior {
    /// Creates a held repeat behavior and the handle that releases it.
    pub fn new(action: impl FnMut() + Send + 'static) -> (Self, RepeatHandle) {
        let held = Arc::new(AtomicBool::new(true));
        let handle = RepeatHandle {
            held: Arc::clone(&held),
        };
        (
            Self {
                held,
                action: Box::new(action),
            },
            handle,
        )
    }
}

impl Behavior for RepeatBehavior {
    fn tick(&mut self, _now: Instant) -> TickResult {
        if !self.held.load(Ordering::Acquire) {
            return TickResult::Done;
        }
        (self.action)();
        TickResult::Continue
    }
}
