//! Scene renderer - bridges scenes with the surrounding render backend
//!
//! The actual backend (window, textures, draw-call submission) lives
//! outside this crate; what it must provide is the current render-target
//! size, queried synchronously through [`RenderTarget`] at least once per
//! visible map per frame. [`SceneRenderer`] is the thin composition layer
//! that renders scenes against one target and reports per-pass statistics.

use crate::foundation::math::Vec2;
use crate::scene::camera::Camera;
use crate::scene::render_queue::RenderQueue;
use crate::scene::scene_graph::Scene;

/// Source of the current render-target size
///
/// Implemented by whatever owns the output surface; must be cheap, it is
/// called on every culling computation.
pub trait RenderTarget {
    /// Current target dimensions in pixels
    fn target_size(&self) -> Vec2;
}

/// Fixed-size render target for headless use and tests
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    size: Vec2,
}

impl Viewport {
    /// Create a viewport with the given dimensions
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }

    /// Change the viewport dimensions (e.g. after a window resize)
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }
}

impl RenderTarget for Viewport {
    fn target_size(&self) -> Vec2 {
        self.size
    }
}

/// High-level render pass over one or more scenes
///
/// Holds the viewport and drives scene render passes into a shared queue;
/// the caller submits the queue to its backend and clears it per frame.
pub struct SceneRenderer {
    viewport: Viewport,
}

impl SceneRenderer {
    /// Create a scene renderer for a viewport
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// The current viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resize the render target
    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport.set_size(size);
    }

    /// Render one scene under one camera into the queue
    ///
    /// Returns the number of draw commands this pass emitted.
    pub fn render_scene(
        &self,
        scene: &mut Scene,
        camera: &Camera,
        queue: &mut RenderQueue,
    ) -> usize {
        let before = queue.len();
        scene.render(camera, &self.viewport, queue);
        let emitted = queue.len() - before;
        log::trace!("scene pass emitted {} draw commands", emitted);
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2i;
    use crate::scene::node::Node;

    #[test]
    fn test_viewport_reports_size() {
        let mut viewport = Viewport::new(Vec2::new(800.0, 600.0));
        assert_eq!(viewport.target_size(), Vec2::new(800.0, 600.0));

        viewport.set_size(Vec2::new(1024.0, 768.0));
        assert_eq!(viewport.target_size(), Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_render_scene_counts_emitted_commands() {
        let renderer = SceneRenderer::new(Viewport::new(Vec2::new(100.0, 100.0)));
        let mut scene = Scene::new();
        scene
            .create_nodes_map_with(
                None,
                Vec2i::new(5, 5),
                Vec2::new(32.0, 32.0),
                Vec2::zeros(),
                |_| Node::entity(Vec2::new(32.0, 32.0)),
            )
            .expect("valid map");

        let mut queue = RenderQueue::new();
        let camera = Camera::new();
        let emitted = renderer.render_scene(&mut scene, &camera, &mut queue);

        assert_eq!(emitted, 16);
        assert_eq!(queue.len(), 16);

        // a second pass into the same queue appends
        let emitted_again = renderer.render_scene(&mut scene, &camera, &mut queue);
        assert_eq!(emitted_again, 16);
        assert_eq!(queue.len(), 32);
    }
}
