//! Editor camera and basic geometry.
//!
//! The page builder never pans freely: the canvas is a fixed-width surface
//! inside a scrolling container and the operator can only zoom it. Pointer
//! positions arrive relative to the canvas element's top-left corner in
//! screen pixels; dividing by the zoom gives canvas coordinates.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::Serialize;

use crate::consts::{MAX_SCALE, MIN_SCALE, SCALE_STEP};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }
}

/// Axis-aligned rectangle in canvas pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self { x, y, width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn middle(&self) -> f64 {
        self.y + self.height / 2.0
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Same size, moved by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Point) -> Self {
        Self { x: self.x + delta.x, y: self.y + delta.y, ..*self }
    }

    /// Boundary-inclusive overlap test: touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    /// Whether `pt` lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.left() && pt.x <= self.right() && pt.y >= self.top() && pt.y <= self.bottom()
    }
}

/// Zoom and scroll state of the editor viewport.
///
/// `scale` is a zoom factor (1.0 = 100%). `scroll_top` is the scrolling
/// container's vertical offset in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub scroll_top: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scale: 1.0, scroll_top: 0.0 }
    }
}

impl Camera {
    /// Convert a canvas-element-relative screen point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point { x: screen.x / self.scale, y: screen.y / self.scale }
    }

    /// Convert a canvas point back to canvas-element-relative screen pixels.
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point { x: canvas.x * self.scale, y: canvas.y * self.scale }
    }

    /// Convert a screen-space distance to canvas units.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Canvas y of the top edge of the visible region.
    #[must_use]
    pub fn visible_top(&self) -> f64 {
        self.scroll_top / self.scale
    }

    /// Set the zoom, clamped to the supported range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { 1.0 };
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale + SCALE_STEP);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale - SCALE_STEP);
    }
}
