// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint contract and the painter that drives it.
//!
//! A [`Canvas`] is whatever the host paints onto: a software framebuffer, a
//! GPU surface, a test double. The [`Painter`] turns one [`Published`] frame
//! into canvas calls, constrained to the frame's dirty region.

use std::sync::Arc;

use kurbo::Rect;
use panelcast_core::panel::BackgroundRef;
use panelcast_core::shape::{Shape, ShapeRole};
use panelcast_core::style::{Color, Palette};

use crate::background::BackgroundImage;
use crate::frame::FrameData;
use crate::handoff::Published;

/// A paint target.
///
/// Backends and test doubles implement this trait, so painting logic does
/// not depend on any graphics API.
pub trait Canvas {
    /// Returns the paintable area.
    fn bounds(&self) -> Rect;

    /// Restricts subsequent drawing to the union of `clip`, or lifts the
    /// restriction with `None`.
    fn set_clip(&mut self, clip: Option<&[Rect]>);

    /// Fills a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws a background image scaled to `dest`.
    fn draw_image(&mut self, image: &BackgroundImage, dest: Rect);

    /// Draws one shape of an element.
    fn draw_shape(&mut self, shape: &Shape, color: Color, opacity: f32);
}

/// How much of a frame to paint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintMode {
    /// Only the dirty region and its paint set.
    #[default]
    Dirty,
    /// The whole panel and every displayed element.
    Full,
}

/// What one paint call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintReport {
    /// Index of the painted frame; `None` for the blank marker.
    pub frame_index: Option<u64>,
    /// Whether the blank background was painted.
    pub blank: bool,
    /// Whether the whole panel was painted.
    pub full: bool,
    /// Number of elements drawn.
    pub painted: usize,
}

/// Paints published frames using an explicit style-resolution service.
#[derive(Clone, Debug)]
pub struct Painter {
    palette: Arc<Palette>,
    blank_color: Color,
}

impl Painter {
    /// Creates a painter.
    #[must_use]
    pub fn new(palette: Arc<Palette>, blank_color: Color) -> Self {
        Self {
            palette,
            blank_color,
        }
    }

    /// Returns the palette.
    #[must_use]
    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Returns the color painted where there is no background image.
    #[must_use]
    pub fn blank_color(&self) -> Color {
        self.blank_color
    }

    /// Paints one published frame.
    pub fn paint(
        &self,
        published: &Published,
        canvas: &mut dyn Canvas,
        mode: PaintMode,
    ) -> PaintReport {
        match published {
            Published::Frame(frame) => self.paint_frame(frame, canvas, mode),
            Published::Blank => {
                canvas.set_clip(None);
                canvas.fill_rect(canvas.bounds(), self.blank_color);
                PaintReport {
                    frame_index: None,
                    blank: true,
                    full: true,
                    painted: 0,
                }
            }
        }
    }

    fn paint_frame(
        &self,
        frame: &FrameData,
        canvas: &mut dyn Canvas,
        mode: PaintMode,
    ) -> PaintReport {
        let bounds = frame.bounds();
        let full = mode == PaintMode::Full || frame.dirty().is_full();
        let mut report = PaintReport {
            frame_index: Some(frame.frame_index()),
            blank: false,
            full,
            painted: 0,
        };

        let clip = if full {
            vec![bounds]
        } else {
            frame.dirty().rects(bounds)
        };
        if clip.is_empty() {
            return report;
        }
        canvas.set_clip(Some(&clip));

        match frame.background() {
            Some(image) => canvas.draw_image(image, bounds),
            None => canvas.fill_rect(bounds, self.blank_color),
        }

        let panel = frame.panel();
        let text = self.palette.text_color(panel);
        let mut draw = |index: usize| {
            let element = &frame.elements()[index];
            let (Some(state), Some(geometry)) = (&element.state, &element.geometry) else {
                return;
            };
            let fill = self.palette.effective_color(state, panel);
            let opacity = state.opacity() * panel.opacity();
            for shape in geometry.iter() {
                let color = match shape.role {
                    ShapeRole::Background => fill,
                    ShapeRole::Foreground => text,
                };
                canvas.draw_shape(shape, color, opacity);
            }
            report.painted += 1;
        };

        if full {
            let displayed: Vec<usize> = frame
                .elements()
                .iter()
                .enumerate()
                .filter(|(_, e)| e.is_displayed())
                .map(|(index, _)| index)
                .collect();
            displayed.into_iter().for_each(&mut draw);
        } else {
            frame.paint_indices().iter().copied().for_each(&mut draw);
        }

        canvas.set_clip(None);
        report
    }
}

// -- Recording canvas --

/// One call recorded by [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// [`Canvas::set_clip`].
    Clip(Option<Vec<Rect>>),
    /// [`Canvas::fill_rect`].
    FillRect {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// [`Canvas::draw_image`].
    Image {
        /// Which image.
        reference: BackgroundRef,
        /// Destination rectangle.
        dest: Rect,
    },
    /// [`Canvas::draw_shape`].
    Shape {
        /// Bounding box of the shape.
        bounds: Rect,
        /// Resolved color.
        color: Color,
        /// Combined element and panel opacity.
        opacity: f32,
    },
}

/// A [`Canvas`] that records every call, for tests and headless hosts.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    bounds: Rect,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    /// Creates a canvas with the given paintable area.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ops: Vec::new(),
        }
    }

    /// Returns the recorded calls.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Returns and clears the recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        core::mem::take(&mut self.ops)
    }

    /// Returns the bounds of every recorded shape, in draw order.
    #[must_use]
    pub fn shape_bounds(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Shape { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_clip(&mut self, clip: Option<&[Rect]>) {
        self.ops.push(DrawOp::Clip(clip.map(<[Rect]>::to_vec)));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn draw_image(&mut self, image: &BackgroundImage, dest: Rect) {
        self.ops.push(DrawOp::Image {
            reference: image.reference().clone(),
            dest,
        });
    }

    fn draw_shape(&mut self, shape: &Shape, color: Color, opacity: f32) {
        self.ops.push(DrawOp::Shape {
            bounds: shape.bounding_box(),
            color,
            opacity,
        });
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size};
    use panelcast_core::element::{ElementData, ElementSerial, ElementState};
    use panelcast_core::panel::{PanelData, PanelState};
    use panelcast_core::style::StyleBits;

    use super::*;
    use crate::background::{BackgroundCache, NoBackgrounds};
    use crate::collapse::Snapshot;
    use crate::frame::BuildOptions;

    const PANEL: Rect = Rect::new(0.0, 0.0, 100.0, 50.0);

    fn painter() -> Painter {
        Painter::new(Arc::new(Palette::standard()), Color::BLACK)
    }

    fn frame_with(state: ElementState) -> FrameData {
        let bounds = state.bounds();
        let mut data = PanelData::new(PanelState::new(Size::new(100.0, 50.0)));
        data.elements.push(ElementData::full(
            ElementSerial(7),
            state,
            Arc::from(vec![
                Shape::fill(bounds),
                Shape::label(Point::new(bounds.x0 + 2.0, bounds.y1 - 2.0), "OK", 8.0),
            ]),
        ));
        FrameData::build(
            1,
            Snapshot {
                data,
                incremental: false,
                sequence: 0,
            },
            None,
            &mut BackgroundCache::new(NoBackgrounds),
            BuildOptions::default(),
        )
    }

    #[test]
    fn blank_fills_canvas() {
        let mut canvas = RecordingCanvas::new(PANEL);
        let report = painter().paint(&Published::Blank, &mut canvas, PaintMode::Dirty);
        assert!(report.blank);
        assert_eq!(
            canvas.ops(),
            &[
                DrawOp::Clip(None),
                DrawOp::FillRect {
                    rect: PANEL,
                    color: Color::BLACK
                }
            ]
        );
    }

    #[test]
    fn roles_pick_fill_and_text_colors() {
        let mut state = ElementState::new(Rect::new(10.0, 10.0, 40.0, 30.0));
        state.set_style(StyleBits::with_color_index(3));
        state.set_opacity(0.5);
        let frame = frame_with(state.clone());
        let palette = Palette::standard();
        let fill = palette.effective_color(&state, frame.panel());
        let text = palette.text_color(frame.panel());

        let mut canvas = RecordingCanvas::new(PANEL);
        let published = Published::Frame(Arc::new(frame));
        let report = painter().paint(&published, &mut canvas, PaintMode::Dirty);
        assert_eq!(report.painted, 1);
        assert!(report.full);

        let colors: Vec<_> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Shape { color, opacity, .. } => Some((*color, *opacity)),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![(fill, 0.5), (text, 0.5)]);
    }

    #[test]
    fn highlight_paints_white() {
        let mut state = ElementState::new(Rect::new(10.0, 10.0, 40.0, 30.0));
        state.set_highlighted(true);
        let frame = frame_with(state);
        let mut canvas = RecordingCanvas::new(PANEL);
        painter().paint(&Published::Frame(Arc::new(frame)), &mut canvas, PaintMode::Full);
        assert!(canvas.ops().contains(&DrawOp::Shape {
            bounds: Rect::new(10.0, 10.0, 40.0, 30.0),
            color: Color::WHITE,
            opacity: 1.0,
        }));
    }

    #[test]
    fn hidden_element_is_not_drawn() {
        let mut state = ElementState::new(Rect::new(10.0, 10.0, 40.0, 30.0));
        state.set_visible(false);
        let frame = frame_with(state);
        let mut canvas = RecordingCanvas::new(PANEL);
        let published = Published::Frame(Arc::new(frame));
        let report = painter().paint(&published, &mut canvas, PaintMode::Full);
        assert_eq!(report.painted, 0);
        assert!(canvas.shape_bounds().is_empty());
    }
}
