//! Rectangle helpers in viewport pixel coordinates.
//!
//! Rectangles stay floating point until [`Rectangle::round`] is applied right
//! before rendering. Equality is exact (`PartialEq` on the four fields, no
//! epsilon).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// A rectangle with no area is never rendered.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        self.translate(dx, dy);
        self
    }

    /// Moves the origin by `(-dx, -dy)` and grows the size by `(2dx, 2dy)`.
    ///
    /// Negative amounts shrink the rectangle and may leave it empty or
    /// inverted; callers decide whether that is acceptable.
    pub fn inflate(&mut self, dx: f64, dy: f64) {
        self.x -= dx;
        self.y -= dy;
        self.width += 2.0 * dx;
        self.height += 2.0 * dy;
    }

    pub fn inflated(mut self, dx: f64, dy: f64) -> Self {
        self.inflate(dx, dy);
        self
    }

    /// Rounds every field to the nearest integer, halves away from zero.
    pub fn round(&mut self) {
        self.x = self.x.round();
        self.y = self.y.round();
        self.width = self.width.round();
        self.height = self.height.round();
    }

    pub fn rounded(mut self) -> Self {
        self.round();
        self
    }
}

/// Extra space added around a located row before it is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub x: f64,
    pub y: f64,
}

impl Padding {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
