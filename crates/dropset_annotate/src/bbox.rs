//! Normalized and pixel-space 2D boxes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Box in normalized frame coordinates, origin bottom-left, each bound in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl NormalizedBox {
    pub const ZERO: Self = Self {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    };

    /// Build from per-vertex extremes, clamping each bound to `[0, 1]`.
    pub fn clamped(min: Vec2, max: Vec2) -> Self {
        let min = min.clamp(Vec2::ZERO, Vec2::ONE);
        let max = max.clamp(Vec2::ZERO, Vec2::ONE);
        Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Convert to pixels for an image of `size` (already scaled by the
    /// resolution percentage).  Pixel y grows downwards.  Components are
    /// rounded half-to-even; a box that rounds to zero width or height
    /// becomes [`PixelBox::ZERO`].
    pub fn to_pixels(&self, size: Vec2) -> PixelBox {
        let px = |v: f32| v.round_ties_even().max(0.0) as u32;
        let width = px(self.width() * size.x);
        let height = px(self.height() * size.y);
        if width == 0 || height == 0 {
            return PixelBox::ZERO;
        }
        PixelBox {
            x: px(self.min_x * size.x),
            y: px(size.y - self.max_y * size.y),
            width,
            height,
        }
    }
}

/// Pixel-space box `(x, y, width, height)` measured from the top-left corner.
///
/// Serialized as a four-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBox {
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<[u32; 4]> for PixelBox {
    fn from([x, y, width, height]: [u32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<PixelBox> for [u32; 4] {
    fn from(b: PixelBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}
