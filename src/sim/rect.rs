//! Axis-aligned bounding boxes
//!
//! Every entity occupies a `Rect`. Coordinates never go negative and sizes never
//! drop below one tile; out-of-range values are clamped on assignment.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::TILE_SIZE;

/// Axis-aligned box with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: TILE_SIZE,
            height: TILE_SIZE,
        }
    }
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut rect = Self::default();
        rect.set_x(x);
        rect.set_y(y);
        rect.set_width(width);
        rect.set_height(height);
        rect
    }

    /// One-tile box at the given position
    pub fn tile(x: f64, y: f64) -> Self {
        Self::new(x, y, TILE_SIZE, TILE_SIZE)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Negative (and NaN) input clamps to 0
    pub fn set_x(&mut self, x: f64) {
        self.x = x.max(0.0);
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y.max(0.0);
    }

    /// Sizes below one tile clamp to `TILE_SIZE`
    pub fn set_width(&mut self, width: f64) {
        self.width = width.max(TILE_SIZE);
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height.max(TILE_SIZE);
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, pos: DVec2) {
        self.set_x(pos.x);
        self.set_y(pos.y);
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Interiors overlap. Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}
