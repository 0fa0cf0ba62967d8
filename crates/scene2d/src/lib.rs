//! # Scene2D
//!
//! A retained-mode 2D scene graph with camera-relative rendering,
//! hierarchical transform composition, and tile-grid visibility culling.
//!
//! ## Features
//!
//! - **Scene Tree**: Positioned, scaled, rotated, tinted nodes with lazily
//!   cached absolute transforms
//! - **Tile Maps**: Dense grids culled to the camera viewport, O(visible)
//!   per frame instead of O(total)
//! - **Layered Scenes**: Independent render passes sharing one camera each
//!   (parallax-friendly)
//! - **Headless Core**: Render passes emit ordered draw commands; the
//!   windowing/GPU backend stays outside this crate
//!
//! ## Quick Start
//!
//! ```rust
//! use scene2d::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new();
//!     scene.create_nodes_map_with(
//!         None,
//!         Vec2i::new(16, 16),
//!         Vec2::new(32.0, 32.0),
//!         Vec2::zeros(),
//!         |_index| Node::entity(Vec2::new(32.0, 32.0)),
//!     )?;
//!
//!     let camera = Camera::new();
//!     let viewport = Viewport::new(Vec2::new(800.0, 600.0));
//!     let mut queue = RenderQueue::new();
//!     scene.render(&camera, &viewport, &mut queue);
//!     assert!(!queue.is_empty());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::core::config::{ApplicationConfig, ConfigError, SceneConfig, ViewportConfig};
    pub use crate::foundation::math::{Color, Transform, Vec2, Vec2i};
    pub use crate::scene::{
        Camera, DrawCommand, EntityData, GridRange, Node, NodeId, NodeKind, NodesMap, Rect,
        RenderQueue, RenderTarget, Scene, SceneError, SceneRenderer, Viewport,
    };
}
