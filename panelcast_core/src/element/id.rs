// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing element identity.
///
/// Serials are never reused, so a receiver can key its element cache on them
/// across any number of frames.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementSerial(pub u64);

impl ElementSerial {
    /// Allocates the next serial.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SERIAL.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw serial number.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ElementSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_increase() {
        let a = ElementSerial::next();
        let b = ElementSerial::next();
        assert!(b > a, "{b:?} should follow {a:?}");
    }
}
