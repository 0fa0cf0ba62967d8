//! Renderable node representation for the scene
//!
//! A node is the unit of the retained scene tree: a local transform, paint
//! state, and one of a closed set of variants. The variants replace a deep
//! inheritance ladder with an explicit tag:
//!
//! - [`NodeKind::Entity`] - a leaf visual (sprite/text/image footprint)
//! - [`NodeKind::Group`] - a transform-only grouping with no visual output
//! - [`NodeKind::Map`] - a dense tile grid with camera culling
//!
//! Nodes are created by their owning [`Scene`](crate::scene::Scene) and
//! never outlive it; the parent back-reference is a non-owning arena key.

use crate::foundation::math::{Color, Transform, Vec2};
use crate::scene::nodes_map::NodesMap;
use crate::scene::scene_graph::NodeId;

/// Leaf visual data
///
/// The core does not load resources; a draw command carries the node
/// handle, and the surrounding renderer resolves the actual visual. The
/// entity only knows its footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityData {
    /// Unscaled footprint of the visual
    pub size: Vec2,

    /// Anchor point in `[0,1]` footprint units; `(0.5, 0.5)` is centered,
    /// `(0.5, 1.0)` is bottom-centered
    pub anchor: Vec2,
}

impl EntityData {
    /// Create entity data with a centered anchor
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            anchor: Vec2::new(0.5, 0.5),
        }
    }
}

/// Closed set of renderable variants
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A leaf visual entity
    Entity(EntityData),

    /// A transform-only grouping renderable with no visual output
    Group,

    /// A dense tile grid rendered through camera culling
    Map(NodesMap),
}

/// A single scene-tree node
///
/// Construct with [`Node::group`] or [`Node::entity`] and hand the value to
/// [`Scene::insert`](crate::scene::Scene::insert) (or a map cell factory);
/// map nodes are only built by
/// [`Scene::create_nodes_map`](crate::scene::Scene::create_nodes_map).
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) local: Transform,
    pub(crate) absolute: Transform,
    pub(crate) transform_dirty: bool,
    pub(crate) z_index: f32,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            local: Transform::identity(),
            absolute: Transform::identity(),
            transform_dirty: true,
            z_index: 0.0,
            visible: true,
            enabled: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a transform-only grouping node
    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group)
    }

    /// Create a leaf entity node with the given footprint
    pub fn entity(size: Vec2) -> Self {
        Self::with_kind(NodeKind::Entity(EntityData::new(size)))
    }

    /// Builder: set the local position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.local.position = position;
        self
    }

    /// Builder: set the local scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.local.scale = scale;
        self
    }

    /// Builder: set the local rotation in radians
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.local.rotation = rotation;
        self
    }

    /// Builder: set the local opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.local.opacity = opacity;
        self
    }

    /// Builder: set the local color tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.local.color = color;
        self
    }

    /// Builder: set the paint-order key
    pub fn with_z_index(mut self, z_index: f32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Builder: set the visibility flag
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder: set the anchor point (entity nodes only; ignored otherwise)
    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        if let NodeKind::Entity(entity) = &mut self.kind {
            entity.anchor = anchor;
        }
        self
    }

    /// The node variant
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node's local transform
    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    /// Paint-order key; higher values paint later within their container
    pub fn z_index(&self) -> f32 {
        self.z_index
    }

    /// Whether the node (and its subtree) is rendered
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the node participates in interaction queries (picking)
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Non-owning handle to the parent node, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Handles of the direct children, in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Entity data, when this node is a leaf entity
    pub fn entity_data(&self) -> Option<&EntityData> {
        match &self.kind {
            NodeKind::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}
