// Copyright 2026 the Panelcast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background image resolution.
//!
//! Panels name their background by reference. The worker resolves the
//! reference through a [`BackgroundLoader`] and memoizes the result, so an
//! unchanged reference costs one string comparison per frame.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Size;
use panelcast_core::panel::BackgroundRef;
use panelcast_core::style::Color;

use crate::error::BackgroundError;

/// A decoded background image.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundImage {
    reference: BackgroundRef,
    size: Size,
    pixels: Arc<[Color]>,
}

impl BackgroundImage {
    /// Creates an image from row-major pixels.
    ///
    /// # Errors
    ///
    /// Returns [`BackgroundError::Decode`] if the pixel count does not match
    /// `width * height`.
    pub fn from_pixels(
        reference: BackgroundRef,
        width: u32,
        height: u32,
        pixels: Vec<Color>,
    ) -> Result<Self, BackgroundError> {
        let expected = u64::from(width) * u64::from(height);
        if u64::try_from(pixels.len()).ok() != Some(expected) {
            return Err(BackgroundError::Decode(reference.0));
        }
        Ok(Self {
            reference,
            size: Size::new(f64::from(width), f64::from(height)),
            pixels: Arc::from(pixels),
        })
    }

    /// Creates a single-color image.
    #[must_use]
    pub fn solid(reference: BackgroundRef, width: u32, height: u32, color: Color) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            reference,
            size: Size::new(f64::from(width), f64::from(height)),
            pixels: Arc::from(vec![color; len]),
        }
    }

    /// Returns the reference the image was loaded from.
    #[must_use]
    pub fn reference(&self) -> &BackgroundRef {
        &self.reference
    }

    /// Returns the image size in pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the row-major pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
}

/// Turns background references into images.
pub trait BackgroundLoader: Send {
    /// Loads the image named by `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`BackgroundError`] if the image is missing or unreadable.
    fn load(&mut self, reference: &BackgroundRef) -> Result<BackgroundImage, BackgroundError>;
}

/// A loader that knows no images.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBackgrounds;

impl BackgroundLoader for NoBackgrounds {
    fn load(&mut self, reference: &BackgroundRef) -> Result<BackgroundImage, BackgroundError> {
        Err(BackgroundError::NotFound(reference.0.clone()))
    }
}

/// A loader backed by images registered up front.
#[derive(Clone, Debug, Default)]
pub struct StaticBackgrounds {
    images: HashMap<BackgroundRef, BackgroundImage>,
}

impl StaticBackgrounds {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image under its own reference.
    #[must_use]
    pub fn with(mut self, image: BackgroundImage) -> Self {
        self.images.insert(image.reference.clone(), image);
        self
    }
}

impl BackgroundLoader for StaticBackgrounds {
    fn load(&mut self, reference: &BackgroundRef) -> Result<BackgroundImage, BackgroundError> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| BackgroundError::NotFound(reference.0.clone()))
    }
}

/// Outcome of resolving a frame's background.
#[derive(Clone, Debug, Default)]
pub struct ResolvedBackground {
    /// The image, or `None` if the panel has no background or it failed to
    /// load.
    pub image: Option<Arc<BackgroundImage>>,
    /// Whether the reference differs from the previous resolution.
    pub changed: bool,
}

/// Memoizing front end for a [`BackgroundLoader`].
///
/// Only the most recent reference is remembered. A failed load is
/// remembered too and logged once; the loader is asked again only after the
/// reference changes.
pub struct BackgroundCache {
    loader: Box<dyn BackgroundLoader>,
    current: Option<(BackgroundRef, Option<Arc<BackgroundImage>>)>,
    loads: u64,
}

impl core::fmt::Debug for BackgroundCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackgroundCache")
            .field("current", &self.current.as_ref().map(|(r, _)| r))
            .field("loads", &self.loads)
            .finish_non_exhaustive()
    }
}

impl BackgroundCache {
    /// Wraps a loader.
    #[must_use]
    pub fn new(loader: impl BackgroundLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            current: None,
            loads: 0,
        }
    }

    /// Returns how many times the loader has been called.
    #[must_use]
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Resolves `reference`, reusing the previous image if it is unchanged.
    pub fn resolve(&mut self, reference: Option<&BackgroundRef>) -> ResolvedBackground {
        let previous = self.current.as_ref().map(|(r, _)| r);
        if previous == reference {
            return ResolvedBackground {
                image: self.current.as_ref().and_then(|(_, image)| image.clone()),
                changed: false,
            };
        }

        let Some(reference) = reference else {
            self.current = None;
            return ResolvedBackground {
                image: None,
                changed: true,
            };
        };

        self.loads += 1;
        let image = match self.loader.load(reference) {
            Ok(image) => Some(Arc::new(image)),
            Err(err) => {
                log::warn!("{err}; painting the blank color instead");
                None
            }
        };
        self.current = Some((reference.clone(), image.clone()));
        ResolvedBackground {
            image,
            changed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> BackgroundRef {
        BackgroundRef::new("deck")
    }

    #[test]
    fn unchanged_reference_is_memoized() {
        let loader = StaticBackgrounds::new().with(BackgroundImage::solid(deck(), 2, 2, Color::BLACK));
        let mut cache = BackgroundCache::new(loader);

        let first = cache.resolve(Some(&deck()));
        assert!(first.changed);
        assert!(first.image.is_some());

        let second = cache.resolve(Some(&deck()));
        assert!(!second.changed);
        assert!(Arc::ptr_eq(
            first.image.as_ref().unwrap(),
            second.image.as_ref().unwrap()
        ));
        assert_eq!(cache.loads(), 1);
    }

    #[test]
    fn failed_load_is_not_retried_until_reference_changes() {
        let mut cache = BackgroundCache::new(NoBackgrounds);
        assert!(cache.resolve(Some(&deck())).image.is_none());
        assert!(!cache.resolve(Some(&deck())).changed);
        assert_eq!(cache.loads(), 1);

        let cleared = cache.resolve(None);
        assert!(cleared.changed);
        assert!(!cache.resolve(None).changed);
    }

    #[test]
    fn pixel_count_must_match() {
        assert_eq!(
            BackgroundImage::from_pixels(deck(), 2, 2, vec![Color::WHITE; 3]),
            Err(BackgroundError::Decode("deck".into()))
        );
        let image = BackgroundImage::from_pixels(deck(), 2, 1, vec![Color::WHITE; 2]).unwrap();
        assert_eq!(image.size(), Size::new(2.0, 1.0));
    }
}
