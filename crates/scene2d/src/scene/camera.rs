//! Camera primitive for camera-relative rendering
//!
//! A camera is a single mutable 2D offset applied uniformly to a scene's
//! render pass. It owns no renderables; render calls read it and the caller
//! mutates it between frames (scroll clamping included).

use crate::foundation::math::Vec2;

/// 2D scroll offset for a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current scroll position
    pub position: Vec2,
}

impl Camera {
    /// Create a camera at the origin
    pub fn new() -> Self {
        Self {
            position: Vec2::zeros(),
        }
    }

    /// Create a camera at a given position
    pub fn from_position(position: Vec2) -> Self {
        Self { position }
    }

    /// Clamp the horizontal position to `[min, max]`
    pub fn clamp_x(&mut self, min: f32, max: f32) {
        self.position.x = self.position.x.clamp(min, max);
    }

    /// Clamp the vertical position to `[min, max]`
    pub fn clamp_y(&mut self, min: f32, max: f32) {
        self.position.y = self.position.y.clamp(min, max);
    }

    /// Convert an absolute world position to screen space
    pub fn screen_position(&self, world_position: Vec2) -> Vec2 {
        world_position - self.position
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_clamping() {
        let mut camera = Camera::from_position(Vec2::new(5000.0, -80.0));

        camera.clamp_x(0.0, 3296.0);
        camera.clamp_y(-60.0, 0.0);

        assert_eq!(camera.position, Vec2::new(3296.0, -60.0));
    }

    #[test]
    fn test_screen_position() {
        let camera = Camera::from_position(Vec2::new(100.0, 50.0));
        assert_eq!(
            camera.screen_position(Vec2::new(120.0, 50.0)),
            Vec2::new(20.0, 0.0)
        );
    }
}
