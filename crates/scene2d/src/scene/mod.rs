//! Scene management system
//!
//! Provides the retained scene tree: nodes with composed transforms,
//! tile-grid maps with camera culling, and the per-frame render pass that
//! turns the visible subset into an ordered draw-command list.
//!
//! ## Architecture
//!
//! ```text
//! Scene (node arena, hierarchy)
//!      |
//! NodesMap culling + paint-order traversal
//!      |
//! RenderQueue (ordered draw commands)
//!      |
//! Renderer backend (out of scope)
//! ```
//!
//! The camera is read, never owned, by render passes; the render target
//! supplies the viewport size through the [`RenderTarget`] trait.

mod camera;
mod node;
mod nodes_map;
mod render_queue;
mod scene_graph;
mod scene_renderer;

pub use camera::Camera;
pub use node::{EntityData, Node, NodeKind};
pub use nodes_map::{GridRange, NodesMap};
pub use render_queue::{DrawCommand, RenderQueue};
pub use scene_graph::{NodeId, Rect, Scene, SceneError};
pub use scene_renderer::{RenderTarget, SceneRenderer, Viewport};
