// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial dirty tracking for partial repaints.

use kurbo::Rect;

/// The area of the panel that must be repainted this cycle.
///
/// Rectangles may overlap; the region is their union. Degenerate rectangles
/// are never stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DirtyRegion {
    /// The entire panel needs repainting.
    Full,
    /// A list of panel-space rectangles that need repainting.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous content can be kept.
    #[default]
    None,
}

impl DirtyRegion {
    /// Returns `true` if nothing needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` if the whole panel needs repainting.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Adds a rectangle to the region.
    ///
    /// Zero-area rectangles and rectangles already covered by a single stored
    /// rectangle are ignored.
    pub fn add(&mut self, rect: Rect) {
        let rect = rect.abs();
        if rect.is_zero_area() || !rect.is_finite() {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(vec![rect]),
            Self::Rects(rects) => {
                if rects.iter().any(|r| covers(*r, rect)) {
                    return;
                }
                rects.retain(|r| !covers(rect, *r));
                rects.push(rect);
            }
        }
    }

    /// Merges another region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(_), Self::Rects(b)) => {
                for rect in b {
                    self.add(*rect);
                }
            }
        }
    }

    /// Intersects the region with `bounds`.
    ///
    /// A rectangle that covers `bounds` entirely turns the region into
    /// [`Full`](Self::Full).
    #[must_use]
    pub fn clipped_to(self, bounds: Rect) -> Self {
        let Self::Rects(rects) = self else {
            return self;
        };
        let mut clipped = Self::None;
        for rect in rects {
            if covers(rect, bounds) {
                return Self::Full;
            }
            clipped.add(rect.intersect(bounds));
        }
        clipped
    }

    /// Returns whether repainting this region touches `rect`.
    ///
    /// Rectangles that only share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, rect: Rect) -> bool {
        match self {
            Self::Full => !rect.is_zero_area(),
            Self::None => false,
            Self::Rects(rects) => rects.iter().any(|r| !r.intersect(rect).is_zero_area()),
        }
    }

    /// Returns the stored rectangles, with `bounds` standing in for a full
    /// region.
    #[must_use]
    pub fn rects(&self, bounds: Rect) -> Vec<Rect> {
        match self {
            Self::Full => vec![bounds],
            Self::Rects(rects) => rects.clone(),
            Self::None => Vec::new(),
        }
    }

    /// Returns the smallest rectangle enclosing the region.
    #[must_use]
    pub fn bounding_box(&self, bounds: Rect) -> Option<Rect> {
        match self {
            Self::Full => Some(bounds),
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::None => None,
        }
    }

    /// Returns the summed area of the stored rectangles.
    ///
    /// Overlaps are counted more than once.
    #[must_use]
    pub fn area(&self, bounds: Rect) -> f64 {
        match self {
            Self::Full => bounds.area(),
            Self::Rects(rects) => rects.iter().map(Rect::area).sum(),
            Self::None => 0.0,
        }
    }
}

fn covers(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    #[test]
    fn degenerate_rects_are_ignored() {
        let mut region = DirtyRegion::None;
        region.add(Rect::new(10.0, 10.0, 10.0, 40.0));
        assert!(region.is_empty());
    }

    #[test]
    fn covered_rects_are_absorbed() {
        let mut region = DirtyRegion::None;
        region.add(Rect::new(10.0, 10.0, 20.0, 20.0));
        region.add(Rect::new(0.0, 0.0, 50.0, 50.0));
        region.add(Rect::new(5.0, 5.0, 6.0, 6.0));
        assert_eq!(region, DirtyRegion::Rects(vec![Rect::new(0.0, 0.0, 50.0, 50.0)]));
    }

    #[test]
    fn clip_drops_outside_and_detects_full() {
        let mut region = DirtyRegion::None;
        region.add(Rect::new(90.0, 90.0, 120.0, 120.0));
        region.add(Rect::new(200.0, 200.0, 210.0, 210.0));
        assert_eq!(
            region.clipped_to(PANEL),
            DirtyRegion::Rects(vec![Rect::new(90.0, 90.0, 100.0, 100.0)])
        );

        let mut region = DirtyRegion::None;
        region.add(Rect::new(-10.0, -10.0, 110.0, 110.0));
        assert!(region.clipped_to(PANEL).is_full());

        let mut region = DirtyRegion::None;
        region.add(Rect::new(200.0, 200.0, 210.0, 210.0));
        assert!(region.clipped_to(PANEL).is_empty());
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let mut region = DirtyRegion::None;
        region.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(!region.intersects(Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(region.intersects(Rect::new(9.0, 0.0, 20.0, 10.0)));
        assert!(DirtyRegion::Full.intersects(Rect::new(500.0, 500.0, 510.0, 510.0)));
        assert!(!DirtyRegion::None.intersects(PANEL));
    }

    #[test]
    fn merge_prefers_full() {
        let mut region = DirtyRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]);
        region.merge(&DirtyRegion::None);
        assert_eq!(region.rects(PANEL).len(), 1);
        region.merge(&DirtyRegion::Rects(vec![Rect::new(5.0, 5.0, 6.0, 6.0)]));
        assert_eq!(region.rects(PANEL).len(), 2);
        assert_eq!(region.bounding_box(PANEL), Some(Rect::new(0.0, 0.0, 6.0, 6.0)));
        region.merge(&DirtyRegion::Full);
        assert!(region.is_full());
        assert_eq!(region.area(PANEL), 10_000.0);
    }
}
