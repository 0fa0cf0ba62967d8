//! Math utilities and types
//!
//! Provides fundamental math types for 2D graphics and game development.

pub use nalgebra::{Matrix3, Vector2};

/// 2D float vector type
pub type Vec2 = Vector2<f32>;

/// 2D integer vector type (grid indices, sizes)
pub type Vec2i = Vector2<i32>;

/// 3x3 matrix type (homogeneous 2D transforms)
pub type Mat3 = Matrix3<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// RGBA color multiplier
///
/// Components are free-range floats; rendering treats them as multipliers
/// over the source visual, so `WHITE` is the identity tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel; a composed alpha of zero hides the subtree
    pub a: f32,
}

impl Color {
    /// Identity tint (no color change, fully opaque)
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    /// Fully transparent black
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Create a color from all four channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB channels
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Component-wise multiply with another color (alpha included)
    pub fn modulate(&self, other: &Self) -> Self {
        Self {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
            a: self.a * other.a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Rotate a vector by an angle in radians
pub fn rotate_vec2(v: Vec2, angle: f32) -> Vec2 {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Transform representing position, scale, rotation, opacity, and tint
///
/// A plain value type; nodes keep one local transform and cache the
/// composed absolute transform computed through their ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in parent-local units
    pub position: Vec2,

    /// Scale factors, multiplicative
    pub scale: Vec2,

    /// Rotation angle in radians
    pub rotation: f32,

    /// Opacity in `[0, 1]`, multiplicative
    pub opacity: f32,

    /// Color tint multiplier (alpha included)
    pub color: Color,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            opacity: 1.0,
            color: Color::WHITE,
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Combine this (parent) transform with a child transform
    ///
    /// The child position is scaled by the parent scale and rotated by the
    /// parent rotation before translation; scale, opacity, and tint compose
    /// component-wise, rotation composes additively. Combining with the
    /// identity on either side leaves the other operand unchanged.
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position
                + rotate_vec2(child.position.component_mul(&self.scale), self.rotation),
            scale: child.scale.component_mul(&self.scale),
            rotation: self.rotation + child.rotation,
            opacity: self.opacity * child.opacity,
            color: self.color.modulate(&child.color),
        }
    }

    /// Effective alpha of this transform (tint alpha times opacity)
    ///
    /// A value of zero or less marks the subtree as invisible.
    pub fn alpha(&self) -> f32 {
        self.color.a * self.opacity
    }
}
