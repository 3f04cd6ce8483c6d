use glam::Vec2;

use crate::config::Rgb;

/// Color with straight alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub color: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub fn new(color: Rgb, alpha: f32) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn opaque(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }
}

/// Axis-aligned rectangle in viewport pixels, y-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

/// One drawing command for the host rasterizer.
///
/// Coordinates are viewport pixels, y-down. `glow` is a shadow blur radius in
/// pixels; hosts without shadow support may ignore it.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPrimitive {
    /// Open stroked polyline.
    Stroke {
        points: Vec<Vec2>,
        color: Rgba,
        width: f32,
        glow: f32,
    },
    /// Closed filled polygon.
    Fill { points: Vec<Vec2>, color: Rgba },
    /// Filled rounded rectangle; radius 0 is a plain rectangle.
    RoundedRect {
        rect: Rect,
        corner_radius: f32,
        color: Rgba,
        glow: f32,
    },
    /// Filled circle.
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        glow: f32,
    },
    /// Stroked circular arc. Angles in radians, measured clockwise from the
    /// positive x axis in the y-down coordinate system; `sweep` is
    /// non-negative.
    Arc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        sweep: f32,
        width: f32,
        color: Rgba,
        glow: f32,
    },
}
