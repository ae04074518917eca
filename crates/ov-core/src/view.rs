//! Coordinate mapping between document space and screen space.
//!
//! Document space is the fixed pixel space of the rendered page image.
//! Screen space is what the pointer reports: document space scaled by
//! `base_fit * zoom` and offset by the on-screen position of the page
//! origin.
//!
//! `base_fit` is recomputed whenever the viewport or image size changes
//! (fit-to-width, never above 1.0). `zoom` is a user multiplier kept inside
//! a bounded range. The scale is clamped away from zero, so the inverse
//! mapping never divides by zero.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest scale the mapper will ever report.
const MIN_SCALE: f64 = 1e-3;

/// Bounds and step for the user-controlled zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 4.0,
            step: 0.25,
        }
    }
}

impl ZoomRange {
    fn clamp(&self, factor: f64) -> f64 {
        factor.clamp(self.min.max(MIN_SCALE), self.max.max(self.min))
    }
}

/// Fit-to-width scale for an image inside a viewport, capped at 1.0.
///
/// Degenerate inputs (zero, negative, NaN) fall back to 1.0.
pub fn fit_scale(viewport: Size, image: Size) -> f64 {
    if !(viewport.width > 0.0 && image.width > 0.0) {
        return 1.0;
    }
    let fit = viewport.width / image.width;
    if fit.is_finite() {
        fit.clamp(MIN_SCALE, 1.0)
    } else {
        1.0
    }
}

/// The document ↔ screen transform for one page view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    origin: Point,
    viewport: Size,
    image: Size,
    base_fit: f64,
    zoom: f64,
    range: ZoomRange,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ZoomRange::default())
    }
}

impl ViewTransform {
    pub fn new(range: ZoomRange) -> Self {
        Self {
            origin: Point::ZERO,
            viewport: Size::ZERO,
            image: Size::ZERO,
            base_fit: 1.0,
            zoom: 1.0,
            range,
        }
    }

    /// Screen position of the document origin (page top-left).
    pub fn set_origin(&mut self, origin: Point) {
        if origin.is_finite() {
            self.origin = origin;
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.base_fit = fit_scale(self.viewport, self.image);
    }

    pub fn set_image(&mut self, image: Size) {
        self.image = image;
        self.base_fit = fit_scale(self.viewport, self.image);
    }

    pub fn image(&self) -> Size {
        self.image
    }

    pub fn base_fit(&self) -> f64 {
        self.base_fit
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor. Out-of-range values are clamped and non-finite
    /// values are ignored.
    pub fn set_zoom(&mut self, factor: f64) {
        if factor.is_finite() {
            self.zoom = self.range.clamp(factor);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.range.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.range.step);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// `base_fit * zoom`, always strictly positive.
    pub fn scale(&self) -> f64 {
        (self.base_fit * self.zoom).max(MIN_SCALE)
    }

    pub fn to_document(&self, screen: Point) -> Point {
        let scale = self.scale();
        Point::new(
            (screen.x - self.origin.x) / scale,
            (screen.y - self.origin.y) / scale,
        )
    }

    pub fn to_screen(&self, document: Point) -> Point {
        let scale = self.scale();
        Point::new(
            document.x * scale + self.origin.x,
            document.y * scale + self.origin.y,
        )
    }

    /// Convert a screen-space delta to a document-space delta.
    pub fn delta_to_document(&self, delta: Vec2) -> Vec2 {
        delta / self.scale()
    }

    /// Convert a screen-pixel length (e.g. handle radius) to document units.
    pub fn length_to_document(&self, pixels: f64) -> f64 {
        pixels / self.scale()
    }

    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_points(self.to_screen(rect.origin()), self.to_screen(Point::new(rect.x1, rect.y1)))
    }
}
