//! Render queue produced by a scene render pass
//!
//! The scene graph does not submit draw calls; it emits an ordered list of
//! draw commands (visible node handles plus their absolute transforms) that
//! the surrounding renderer consumes. Command order is paint order: what
//! comes first paints first.

use crate::foundation::math::{Transform, Vec2};
use crate::scene::scene_graph::NodeId;

/// One visible leaf entity, ready to draw
///
/// The handle identifies the node; the surrounding renderer resolves the
/// actual visual (texture, glyph run, ...) from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Handle of the entity node
    pub node: NodeId,

    /// Absolute transform at render time
    pub transform: Transform,

    /// Unscaled footprint of the visual
    pub size: Vec2,

    /// Anchor point in footprint units
    pub anchor: Vec2,

    /// Paint-order key the command was emitted under
    pub z_index: f32,
}

/// Ordered draw commands for one frame
#[derive(Debug, Default)]
pub struct RenderQueue {
    commands: Vec<DrawCommand>,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Append a command; paint order is append order
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Commands in paint order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the queue holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands, keeping the allocation for the next frame
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Take the queued commands, leaving the queue empty
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}
