// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric primitives produced by widget geometry generators.
//!
//! The generators themselves (rectangles, elbows, sliders, keyboards) live
//! outside this crate. Whatever they compute is expressed as a list of
//! [`Shape`]s in panel coordinates, and the repaint pipeline treats that list
//! as opaque apart from its bounding box.

use std::sync::Arc;

use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as _};

/// Which element color a shape is painted with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeRole {
    /// Painted with the element's effective color.
    #[default]
    Background,
    /// Painted with the panel scheme's text color.
    Foreground,
}

/// The closed set of primitive kinds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    /// A filled axis-aligned rectangle.
    Fill(Rect),
    /// A filled rectangle with rounded corners.
    RoundedFill(RoundedRect),
    /// A stroked outline.
    Stroke {
        /// Outline path.
        path: BezPath,
        /// Stroke width.
        width: f64,
    },
    /// A filled arbitrary path (elbows, arrows, slider knobs).
    Path(BezPath),
    /// A single line of text.
    Label {
        /// Baseline origin.
        origin: Point,
        /// Text content.
        text: String,
        /// Font size in panel units.
        size: f64,
    },
}

/// One primitive of an element's geometry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    /// What to draw.
    pub kind: ShapeKind,
    /// Which color to draw it with.
    pub role: ShapeRole,
}

impl Shape {
    /// A background-colored filled rectangle.
    #[must_use]
    pub fn fill(rect: Rect) -> Self {
        Self {
            kind: ShapeKind::Fill(rect),
            role: ShapeRole::Background,
        }
    }

    /// A foreground-colored text label.
    #[must_use]
    pub fn label(origin: Point, text: impl Into<String>, size: f64) -> Self {
        Self {
            kind: ShapeKind::Label {
                origin,
                text: text.into(),
                size,
            },
            role: ShapeRole::Foreground,
        }
    }

    /// Returns a conservative bounding box in panel coordinates.
    ///
    /// Labels are estimated from their font size, since text layout happens
    /// on the painting side.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        match &self.kind {
            ShapeKind::Fill(rect) => *rect,
            ShapeKind::RoundedFill(rr) => rr.bounding_box(),
            ShapeKind::Stroke { path, width } => path.bounding_box().inflate(width / 2.0, width / 2.0),
            ShapeKind::Path(path) => path.bounding_box(),
            ShapeKind::Label { origin, text, size } => {
                let width = text.chars().count() as f64 * size * 0.6;
                Rect::new(origin.x, origin.y - size, origin.x + width, origin.y + size * 0.25)
            }
        }
    }
}

/// Immutable, cheaply shared geometry of one element.
pub type Geometry = Arc<[Shape]>;

/// Returns the union of the bounding boxes of `shapes`, if any.
#[must_use]
pub fn geometry_bounds(shapes: &[Shape]) -> Option<Rect> {
    shapes
        .iter()
        .map(Shape::bounding_box)
        .reduce(|acc, r| acc.union(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_bounds_include_half_width() {
        let mut path = BezPath::new();
        path.move_to((10.0, 10.0));
        path.line_to((20.0, 10.0));
        let shape = Shape {
            kind: ShapeKind::Stroke { path, width: 4.0 },
            role: ShapeRole::Background,
        };
        assert_eq!(shape.bounding_box(), Rect::new(8.0, 8.0, 22.0, 12.0));
    }

    #[test]
    fn geometry_bounds_unions_all_shapes() {
        let shapes = [
            Shape::fill(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Shape::fill(Rect::new(20.0, 5.0, 30.0, 40.0)),
        ];
        assert_eq!(
            geometry_bounds(&shapes),
            Some(Rect::new(0.0, 0.0, 30.0, 40.0))
        );
        assert_eq!(geometry_bounds(&[]), None);
    }

    #[test]
    fn label_bounds_cover_baseline() {
        let shape = Shape::label(Point::new(0.0, 20.0), "ab", 10.0);
        let bb = shape.bounding_box();
        assert!(bb.contains(Point::new(1.0, 15.0)), "{bb:?}");
        assert_eq!(shape.role, ShapeRole::Foreground);
    }
}
