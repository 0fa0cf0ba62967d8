//! Scene graph - node arena, hierarchy, and render traversal
//!
//! A [`Scene`] owns every node it contains in a slotmap arena; handles are
//! stable keys, the parent back-reference is a non-owning key, and
//! ownership flows strictly container -> children. Removing a node drops
//! its whole subtree; a dangling handle resolves to "empty" everywhere
//! instead of faulting.
//!
//! Absolute transforms are memoized per node: any local-transform or
//! parent change marks the subtree dirty synchronously, and the composed
//! value is recomputed lazily on the next query or render. Static subtrees
//! therefore cost nothing per frame.

use crate::core::config::SceneConfig;
use crate::foundation::math::{Color, Transform, Vec2, Vec2i};
use crate::scene::camera::Camera;
use crate::scene::node::{EntityData, Node, NodeKind};
use crate::scene::nodes_map::{GridRange, NodesMap};
use crate::scene::render_queue::{DrawCommand, RenderQueue};
use crate::scene::scene_renderer::RenderTarget;
use slotmap::SlotMap;
use thiserror::Error;

slotmap::new_key_type! {
    /// Stable, non-owning handle to a node owned by a [`Scene`]
    pub struct NodeId;
}

/// Construction-parameter violations
///
/// Fatal at construction; invalid parameters are never silently clamped.
/// Out-of-range runtime queries are not errors and resolve to `None`.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    /// Grid dimensions were negative
    #[error("invalid map grid size {width}x{height}: dimensions must be non-negative")]
    InvalidMapSize {
        /// Requested grid width
        width: i32,
        /// Requested grid height
        height: i32,
    },

    /// Cell size had a non-positive component
    #[error("invalid map cell size {width}x{height}: both axes must be positive")]
    InvalidCellSize {
        /// Requested cell width
        width: f32,
        /// Requested cell height
        height: f32,
    },
}

/// Axis-aligned bounding rectangle for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner of the rectangle
    pub min: Vec2,
    /// Maximum corner of the rectangle
    pub max: Vec2,
}

impl Rect {
    /// Create a new rect from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a rect spanning two arbitrary corner points
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Get the center of the rect
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the extent of the rect
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if this rect contains a point
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if this rect intersects another rect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Smallest rect covering both rects
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

enum Visit {
    Draw(EntityData, f32),
    Children(Vec<NodeId>),
    Cells(Vec<NodeId>),
}

enum BoxPlan {
    Entity(EntityData),
    Group(Vec<NodeId>),
    Map(Vec2),
}

enum PickPlan {
    Test,
    Children(Vec<NodeId>),
    MapCell,
}

/// Ordered collection of renderables sharing one render pass
///
/// Top-level nodes (roots) paint in insertion order unless `z_index`
/// overrides it; ties keep insertion order (stable sort). The same rule
/// applies per container, so sibling subtrees never interleave.
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
    config: SceneConfig,
}

impl Scene {
    /// Create an empty scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene with custom configuration
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            config,
        }
    }

    /// The scene's configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of nodes owned by the scene
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene owns no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handles of the top-level nodes, in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Whether a handle still refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Read access to a node, or `None` for a dangling handle
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    // ========================================================================
    // Construction and lifecycle
    // ========================================================================

    /// Insert a node under a parent (or as a root)
    ///
    /// A stale parent handle is recovered by inserting at the root and
    /// logging a warning. Children attached directly to a map node compose
    /// transforms normally but are not part of the culled grid traversal.
    pub fn insert(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        node.transform_dirty = true;

        match parent {
            Some(parent_id) if self.nodes.contains_key(parent_id) => {
                node.parent = Some(parent_id);
                let id = self.nodes.insert(node);
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.push(id);
                }
                id
            }
            Some(_) => {
                log::warn!("insert: parent handle is stale, inserting as root");
                let id = self.nodes.insert(node);
                self.roots.push(id);
                id
            }
            None => {
                let id = self.nodes.insert(node);
                self.roots.push(id);
                id
            }
        }
    }

    /// Create a transform-only grouping node
    pub fn create_node(&mut self, parent: Option<NodeId>) -> NodeId {
        self.insert(parent, Node::group())
    }

    /// Create a leaf entity node with the given footprint
    pub fn create_entity(&mut self, parent: Option<NodeId>, size: Vec2) -> NodeId {
        self.insert(parent, Node::entity(size))
    }

    /// Create a nodes map whose cells are default grouping nodes
    ///
    /// A zero-vector `cell_spacing` means "same as cell size", not zero
    /// distance. Fails on negative grid dimensions or non-positive cell
    /// size.
    pub fn create_nodes_map(
        &mut self,
        parent: Option<NodeId>,
        grid_size: Vec2i,
        cell_size: Vec2,
        cell_spacing: Vec2,
    ) -> Result<NodeId, SceneError> {
        self.build_nodes_map(parent, grid_size, cell_size, cell_spacing, None)
    }

    /// Create a nodes map with a per-cell factory
    ///
    /// The factory receives each grid index and returns the cell node; the
    /// map then applies its fixed placement policy (position and z-index)
    /// to the returned node, overriding whatever the factory set for those.
    pub fn create_nodes_map_with<F>(
        &mut self,
        parent: Option<NodeId>,
        grid_size: Vec2i,
        cell_size: Vec2,
        cell_spacing: Vec2,
        mut factory: F,
    ) -> Result<NodeId, SceneError>
    where
        F: FnMut(Vec2i) -> Node,
    {
        self.build_nodes_map(parent, grid_size, cell_size, cell_spacing, Some(&mut factory))
    }

    fn build_nodes_map(
        &mut self,
        parent: Option<NodeId>,
        grid_size: Vec2i,
        cell_size: Vec2,
        cell_spacing: Vec2,
        mut factory: Option<&mut dyn FnMut(Vec2i) -> Node>,
    ) -> Result<NodeId, SceneError> {
        if grid_size.x < 0 || grid_size.y < 0 {
            return Err(SceneError::InvalidMapSize {
                width: grid_size.x,
                height: grid_size.y,
            });
        }
        if cell_size.x <= 0.0 || cell_size.y <= 0.0 {
            return Err(SceneError::InvalidCellSize {
                width: cell_size.x,
                height: cell_size.y,
            });
        }

        // zero-vector spacing is the "same as cell size" sentinel
        let spacing = if cell_spacing == Vec2::zeros() {
            cell_size
        } else {
            cell_spacing
        };

        let map = NodesMap::new(grid_size, cell_size, spacing);
        let map_id = self.insert(parent, Node::with_kind(NodeKind::Map(map)));

        for x in 0..grid_size.x {
            for y in 0..grid_size.y {
                let index = Vec2i::new(x, y);
                let mut cell = match factory.as_mut() {
                    Some(create) => create(index),
                    None => Node::group(),
                };

                let placement = self
                    .nodes_map(map_id)
                    .map(|map| (map.cell_position(index), map.cell_z_index(index)));
                if let Some((position, z_index)) = placement {
                    cell.local.position = position;
                    cell.z_index = z_index;
                }

                let cell_id = self.insert(Some(map_id), cell);
                if let Some(node) = self.nodes.get_mut(map_id) {
                    if let NodeKind::Map(map) = &mut node.kind {
                        map.push_cell(cell_id);
                    }
                }
            }
        }

        log::info!(
            "created {}x{} nodes map ({} cells)",
            grid_size.x,
            grid_size.y,
            grid_size.x.max(0) * grid_size.y.max(0)
        );

        Ok(map_id)
    }

    /// Remove a node and its whole subtree
    ///
    /// Dangling handles are ignored. Removing a map cell leaves a stale
    /// handle in the grid; lookups through it resolve to `None`.
    pub fn remove(&mut self, id: NodeId) {
        let parent = match self.nodes.get(id) {
            Some(node) => node.parent,
            None => return,
        };

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend_from_slice(&node.children);
                if let NodeKind::Map(map) = &node.kind {
                    stack.extend_from_slice(map.cells());
                }
            }
        }
    }

    /// Move a node under a new parent (or to the root)
    ///
    /// Rejects reparenting that would create a cycle. The subtree's cached
    /// transforms are invalidated on the same call stack.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.nodes.contains_key(id) {
            log::debug!("set_parent: stale node handle ignored");
            return;
        }
        if let Some(parent_id) = new_parent {
            if parent_id == id || self.is_ancestor(id, parent_id) {
                log::warn!("set_parent: reparenting would create a cycle, ignored");
                return;
            }
            if !self.nodes.contains_key(parent_id) {
                log::warn!("set_parent: stale parent handle ignored");
                return;
            }
        }

        let old_parent = self.nodes.get(id).and_then(|node| node.parent);
        match old_parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        match new_parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent;
        }
        self.mark_transform_dirty(id);
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    // ========================================================================
    // Transform and paint-state mutation
    // ========================================================================

    fn mutate_transform<F: FnOnce(&mut Transform)>(&mut self, id: NodeId, mutate: F) {
        if let Some(node) = self.nodes.get_mut(id) {
            mutate(&mut node.local);
            self.mark_transform_dirty(id);
        } else {
            log::debug!("transform mutation on stale node handle ignored");
        }
    }

    /// Set a node's local position
    pub fn set_position(&mut self, id: NodeId, position: Vec2) {
        self.mutate_transform(id, |transform| transform.position = position);
    }

    /// Set a node's local scale
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        self.mutate_transform(id, |transform| transform.scale = scale);
    }

    /// Set a node's local rotation in radians
    pub fn set_rotation(&mut self, id: NodeId, rotation: f32) {
        self.mutate_transform(id, |transform| transform.rotation = rotation);
    }

    /// Set a node's local opacity
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        self.mutate_transform(id, |transform| transform.opacity = opacity);
    }

    /// Set a node's local color tint
    pub fn set_color(&mut self, id: NodeId, color: Color) {
        self.mutate_transform(id, |transform| transform.color = color);
    }

    /// Replace a node's whole local transform
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) {
        self.mutate_transform(id, |local| *local = transform);
    }

    /// Set a node's paint-order key
    pub fn set_z_index(&mut self, id: NodeId, z_index: f32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.z_index = z_index;
        }
    }

    /// Show or hide a node and its subtree
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = visible;
        }
    }

    /// Enable or disable a node for interaction queries
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.enabled = enabled;
        }
    }

    /// Invalidate the cached absolute transforms of a subtree
    ///
    /// Runs synchronously on the caller's stack; the next query or render
    /// recomputes. Mutators call this automatically.
    fn mark_transform_dirty(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current) {
                node.transform_dirty = true;
                stack.extend_from_slice(&node.children);
            }
        }
    }

    /// The node's absolute transform, composed through its ancestor chain
    ///
    /// Memoized: recomputed only when the node or an ancestor changed since
    /// the last query. A node with no parent has absolute == local.
    pub fn absolute_transform(&mut self, id: NodeId) -> Option<Transform> {
        let (dirty, local, parent) = match self.nodes.get(id) {
            Some(node) => (node.transform_dirty, node.local, node.parent),
            None => return None,
        };
        if !dirty {
            return self.nodes.get(id).map(|node| node.absolute);
        }

        let absolute = match parent {
            Some(parent_id) => match self.absolute_transform(parent_id) {
                Some(parent_absolute) => parent_absolute.combine(&local),
                // dangling parent behaves like a root
                None => local,
            },
            None => local,
        };

        if let Some(node) = self.nodes.get_mut(id) {
            node.absolute = absolute;
            node.transform_dirty = false;
        }
        Some(absolute)
    }

    // ========================================================================
    // Rendering and collection
    // ========================================================================

    /// Render the scene: emit draw commands for every visible entity
    ///
    /// Walks roots in paint order, composes transforms lazily, culls maps
    /// through their visible range, and appends to `queue`. Invisible or
    /// fully transparent subtrees are skipped silently. Rendering twice
    /// with unchanged state emits identical command lists.
    pub fn render(&mut self, camera: &Camera, target: &impl RenderTarget, queue: &mut RenderQueue) {
        let target_size = target.target_size();
        let mut order = self.roots.clone();
        self.sort_paint_order(&mut order);
        for id in order {
            self.render_node(id, camera, target_size, queue);
        }
    }

    fn render_node(
        &mut self,
        id: NodeId,
        camera: &Camera,
        target_size: Vec2,
        queue: &mut RenderQueue,
    ) {
        match self.nodes.get(id) {
            Some(node) if node.visible => {}
            _ => return,
        }
        let absolute = match self.absolute_transform(id) {
            Some(transform) => transform,
            None => return,
        };
        if absolute.alpha() <= 0.0 {
            return;
        }

        let visit = match self.nodes.get(id) {
            Some(node) => match &node.kind {
                NodeKind::Entity(entity) => Visit::Draw(*entity, node.z_index),
                NodeKind::Group => Visit::Children(node.children.clone()),
                NodeKind::Map(map) => {
                    let screen_pos = absolute.position - camera.position;
                    if self.config.enable_culling {
                        if !map.overlaps_target(screen_pos, target_size) {
                            return;
                        }
                        Visit::Cells(
                            map.nodes_in_range(&map.visible_range(screen_pos, target_size)),
                        )
                    } else {
                        Visit::Cells(map.nodes_in_range(&map.full_range()))
                    }
                }
            },
            None => return,
        };

        match visit {
            Visit::Draw(entity, z_index) => queue.push(DrawCommand {
                node: id,
                transform: absolute,
                size: entity.size,
                anchor: entity.anchor,
                z_index,
            }),
            Visit::Children(mut children) => {
                self.sort_paint_order(&mut children);
                for child in children {
                    self.render_node(child, camera, target_size, queue);
                }
            }
            // map cells already paint back-to-front by construction; no sort
            Visit::Cells(cells) => {
                for cell in cells {
                    self.render_node(cell, camera, target_size, queue);
                }
            }
        }
    }

    fn sort_paint_order(&self, ids: &mut [NodeId]) {
        ids.sort_by(|a, b| {
            let za = self.nodes.get(*a).map_or(0.0, |node| node.z_index);
            let zb = self.nodes.get(*b).map_or(0.0, |node| node.z_index);
            za.partial_cmp(&zb).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Collect the handles of nodes that would render this frame
    ///
    /// Same traversal as [`Self::render`]: entities report themselves,
    /// groups recurse, maps report the cells in their visible range.
    pub fn visible_entities(
        &mut self,
        out: &mut Vec<NodeId>,
        camera: &Camera,
        target: &impl RenderTarget,
    ) {
        let target_size = target.target_size();
        for id in self.roots.clone() {
            self.collect_visible(id, out, camera, target_size);
        }
    }

    fn collect_visible(
        &mut self,
        id: NodeId,
        out: &mut Vec<NodeId>,
        camera: &Camera,
        target_size: Vec2,
    ) {
        match self.nodes.get(id) {
            Some(node) if node.visible => {}
            _ => return,
        }
        let absolute = match self.absolute_transform(id) {
            Some(transform) => transform,
            None => return,
        };
        if absolute.alpha() <= 0.0 {
            return;
        }

        let visit = match self.nodes.get(id) {
            Some(node) => match &node.kind {
                NodeKind::Entity(_) => {
                    out.push(id);
                    return;
                }
                NodeKind::Group => Visit::Children(node.children.clone()),
                NodeKind::Map(map) => {
                    let screen_pos = absolute.position - camera.position;
                    let range = if self.config.enable_culling {
                        map.visible_range(screen_pos, target_size)
                    } else {
                        map.full_range()
                    };
                    Visit::Cells(map.nodes_in_range(&range))
                }
            },
            None => return,
        };

        match visit {
            Visit::Draw(..) => {}
            Visit::Children(children) => {
                for child in children {
                    self.collect_visible(child, out, camera, target_size);
                }
            }
            Visit::Cells(cells) => out.extend(cells),
        }
    }

    /// Collect every entity handle in the scene, culling nothing
    ///
    /// Groups recurse, maps report every cell. Visibility flags are
    /// ignored; this is the full-grid companion to
    /// [`Self::visible_entities`], intended for gameplay passes.
    pub fn all_entities(&self, out: &mut Vec<NodeId>) {
        for root in &self.roots {
            self.collect_all(*root, out);
        }
    }

    fn collect_all(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.nodes.get(id) {
            Some(node) => match &node.kind {
                NodeKind::Entity(_) => out.push(id),
                NodeKind::Group => {
                    for child in &node.children {
                        self.collect_all(*child, out);
                    }
                }
                NodeKind::Map(map) => out.extend_from_slice(map.cells()),
            },
            None => {}
        }
    }

    // ========================================================================
    // Map queries
    // ========================================================================

    /// The map payload of a node, when the handle refers to a map
    pub fn nodes_map(&self, id: NodeId) -> Option<&NodesMap> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The grid-index range of a map that can intersect the viewport
    pub fn map_visible_range(
        &mut self,
        id: NodeId,
        camera: &Camera,
        target: &impl RenderTarget,
    ) -> Option<GridRange> {
        let absolute = self.absolute_transform(id)?;
        let target_size = target.target_size();
        let map = self.nodes_map(id)?;
        Some(map.visible_range(absolute.position - camera.position, target_size))
    }

    /// Cheap whole-map visibility test
    ///
    /// False when the node is hidden, fully transparent, not a map, or when
    /// its grid cannot reach the viewport at all; used to skip a culled-out
    /// map without visiting any cell.
    pub fn map_is_really_visible(
        &mut self,
        id: NodeId,
        camera: &Camera,
        target: &impl RenderTarget,
    ) -> bool {
        match self.nodes.get(id) {
            Some(node) if node.visible => {}
            _ => return false,
        }
        let absolute = match self.absolute_transform(id) {
            Some(transform) => transform,
            None => return false,
        };
        if absolute.alpha() <= 0.0 {
            return false;
        }
        let target_size = target.target_size();
        match self.nodes_map(id) {
            Some(map) => map.overlaps_target(absolute.position - camera.position, target_size),
            None => false,
        }
    }

    /// Collect the cell handles of a map inside its visible range
    pub fn map_visible_nodes(
        &mut self,
        id: NodeId,
        out: &mut Vec<NodeId>,
        camera: &Camera,
        target: &impl RenderTarget,
    ) {
        if let Some(range) = self.map_visible_range(id, camera, target) {
            if let Some(map) = self.nodes_map(id) {
                out.extend(map.nodes_in_range(&range));
            }
        }
    }

    /// Collect every cell handle of a map, unconditionally
    pub fn map_all_nodes(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(map) = self.nodes_map(id) {
            out.extend_from_slice(map.cells());
        }
    }

    /// The cell of a map covering a map-local position, or `None` when the
    /// position falls outside the grid
    pub fn map_node_by_position(&self, id: NodeId, position: Vec2) -> Option<NodeId> {
        self.nodes_map(id)?.node_by_position_any(position)
    }

    /// The grid index of a map covering a map-local position
    ///
    /// May be out of range; callers clamp or check.
    pub fn map_index_from_position(&self, id: NodeId, position: Vec2) -> Option<Vec2i> {
        Some(self.nodes_map(id)?.index_from_position(position))
    }

    /// Apply a function to every cell of a map, unconditionally
    ///
    /// Visits the full grid in x-outer, y-inner order with no culling;
    /// intended for gameplay passes over the whole map.
    pub fn map_apply_to_all<F>(&mut self, id: NodeId, mut apply: F)
    where
        F: FnMut(&mut Self, Vec2i, NodeId),
    {
        let map = match self.nodes_map(id) {
            Some(map) => map,
            None => return,
        };
        let size = map.grid_size();
        let mut cells = Vec::with_capacity(map.cell_count());
        for x in 0..size.x {
            for y in 0..size.y {
                let index = Vec2i::new(x, y);
                if let Some(cell) = map.node_at(index) {
                    cells.push((index, cell));
                }
            }
        }
        for (index, cell) in cells {
            apply(self, index, cell);
        }
    }

    // ========================================================================
    // Spatial queries
    // ========================================================================

    /// Axis-aligned bounding box of a node in absolute coordinates
    ///
    /// Entities use footprint, scale, and anchor; groups take the union of
    /// their children (a point at the group position when childless); maps
    /// use their lattice footprint. Boxes stay axis-aligned: rotation is
    /// not applied to extents.
    pub fn bounding_box(&mut self, id: NodeId) -> Option<Rect> {
        let absolute = self.absolute_transform(id)?;
        let plan = {
            let node = self.nodes.get(id)?;
            match &node.kind {
                NodeKind::Entity(entity) => BoxPlan::Entity(*entity),
                NodeKind::Group => BoxPlan::Group(node.children.clone()),
                NodeKind::Map(map) => BoxPlan::Map(map.footprint()),
            }
        };

        match plan {
            BoxPlan::Entity(entity) => {
                let scaled = entity.size.component_mul(&absolute.scale);
                let min = absolute.position - scaled.component_mul(&entity.anchor);
                Some(Rect::from_points(min, min + scaled))
            }
            BoxPlan::Group(children) => {
                let mut rect = Rect::new(absolute.position, absolute.position);
                for child in children {
                    if let Some(child_rect) = self.bounding_box(child) {
                        rect = rect.union(&child_rect);
                    }
                }
                Some(rect)
            }
            BoxPlan::Map(footprint) => {
                let min = absolute.position;
                Some(Rect::from_points(
                    min,
                    min + footprint.component_mul(&absolute.scale),
                ))
            }
        }
    }

    /// Whether a point (absolute coordinates) lies on a node's bounding box
    pub fn is_point_on(&mut self, id: NodeId, point: Vec2) -> bool {
        self.bounding_box(id)
            .is_some_and(|rect| rect.contains_point(point))
    }

    /// Topmost enabled, visible node under a point (absolute coordinates)
    ///
    /// Walks the scene in paint order and keeps the last hit, so the node
    /// painted last wins. Disabled or hidden subtrees are skipped. Map
    /// lookup assumes unscaled, unrotated maps.
    pub fn pick_node(&mut self, point: Vec2) -> Option<NodeId> {
        let mut order = self.roots.clone();
        self.sort_paint_order(&mut order);
        let mut hit = None;
        for id in order {
            self.pick_into(id, point, &mut hit);
        }
        hit
    }

    fn pick_into(&mut self, id: NodeId, point: Vec2, hit: &mut Option<NodeId>) {
        match self.nodes.get(id) {
            Some(node) if node.visible && node.enabled => {}
            _ => return,
        }

        let plan = match self.nodes.get(id) {
            Some(node) => match &node.kind {
                NodeKind::Entity(_) => PickPlan::Test,
                NodeKind::Group => PickPlan::Children(node.children.clone()),
                NodeKind::Map(_) => PickPlan::MapCell,
            },
            None => return,
        };

        match plan {
            PickPlan::Test => {
                if self.is_point_on(id, point) {
                    *hit = Some(id);
                }
            }
            PickPlan::Children(mut children) => {
                self.sort_paint_order(&mut children);
                for child in children {
                    self.pick_into(child, point, hit);
                }
            }
            PickPlan::MapCell => {
                if let Some(absolute) = self.absolute_transform(id) {
                    let local = point - absolute.position;
                    if let Some(cell) = self
                        .nodes_map(id)
                        .and_then(|map| map.node_by_position_any(local))
                    {
                        self.pick_into(cell, point, hit);
                    }
                }
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::scene_renderer::Viewport;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn viewport() -> Viewport {
        Viewport::new(Vec2::new(100.0, 100.0))
    }

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));

        assert!(rect.contains_point(Vec2::zeros()));
        assert!(rect.contains_point(Vec2::new(1.0, -1.0)));
        assert!(!rect.contains_point(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_rect_intersects_and_union() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = Rect::new(Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0));
        let c = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(7.0, 7.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let ab = a.union(&b);
        assert_eq!(ab, Rect::new(Vec2::new(0.0, 0.0), Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn test_root_absolute_equals_local() {
        let mut scene = Scene::new();
        let root = scene.insert(None, Node::group().with_position(Vec2::new(5.0, 7.0)));

        let absolute = scene.absolute_transform(root).expect("live node");
        assert_relative_eq!(absolute.position, Vec2::new(5.0, 7.0), epsilon = EPSILON);
    }

    #[test]
    fn test_absolute_transform_chain_depth_three() {
        let mut scene = Scene::new();
        let root = scene.insert(
            None,
            Node::group()
                .with_position(Vec2::new(100.0, 0.0))
                .with_scale(Vec2::new(2.0, 2.0)),
        );
        let middle = scene.insert(
            Some(root),
            Node::group()
                .with_position(Vec2::new(10.0, 0.0))
                .with_opacity(0.5),
        );
        let leaf = scene.insert(
            Some(middle),
            Node::entity(Vec2::new(4.0, 4.0)).with_position(Vec2::new(1.0, 1.0)),
        );

        let absolute = scene.absolute_transform(leaf).expect("live node");
        // root: (100,0) scale 2; middle: +2*(10,0); leaf: +2*(1,1)
        assert_relative_eq!(absolute.position, Vec2::new(122.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(absolute.scale, Vec2::new(2.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(absolute.opacity, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_transform_cache_invalidates_on_parent_mutation() {
        let mut scene = Scene::new();
        let root = scene.create_node(None);
        let child = scene.insert(Some(root), Node::group().with_position(Vec2::new(1.0, 0.0)));

        let before = scene.absolute_transform(child).expect("live node");
        assert_relative_eq!(before.position, Vec2::new(1.0, 0.0), epsilon = EPSILON);

        // querying again without mutation returns the cached value
        let cached = scene.absolute_transform(child).expect("live node");
        assert_eq!(before, cached);

        scene.set_position(root, Vec2::new(50.0, 50.0));
        let after = scene.absolute_transform(child).expect("live node");
        assert_relative_eq!(after.position, Vec2::new(51.0, 50.0), epsilon = EPSILON);
    }

    #[test]
    fn test_reparent_invalidates_and_recomposes() {
        let mut scene = Scene::new();
        let left = scene.insert(None, Node::group().with_position(Vec2::new(10.0, 0.0)));
        let right = scene.insert(None, Node::group().with_position(Vec2::new(-10.0, 0.0)));
        let child = scene.insert(Some(left), Node::group().with_position(Vec2::new(1.0, 0.0)));

        assert_relative_eq!(
            scene.absolute_transform(child).expect("live").position,
            Vec2::new(11.0, 0.0),
            epsilon = EPSILON
        );

        scene.set_parent(child, Some(right));
        assert_relative_eq!(
            scene.absolute_transform(child).expect("live").position,
            Vec2::new(-9.0, 0.0),
            epsilon = EPSILON
        );
        assert_eq!(scene.node(child).expect("live").parent(), Some(right));
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = Scene::new();
        let root = scene.create_node(None);
        let child = scene.create_node(Some(root));
        let grandchild = scene.create_node(Some(child));

        scene.set_parent(root, Some(grandchild));

        // unchanged: root is still a root, grandchild still under child
        assert_eq!(scene.node(root).expect("live").parent(), None);
        assert_eq!(scene.roots(), &[root]);
        assert_eq!(scene.node(grandchild).expect("live").parent(), Some(child));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut scene = Scene::new();
        let root = scene.create_node(None);
        let child = scene.create_node(Some(root));
        let _grandchild = scene.create_entity(Some(child), Vec2::new(8.0, 8.0));
        assert_eq!(scene.node_count(), 3);

        scene.remove(child);

        assert_eq!(scene.node_count(), 1);
        assert!(!scene.contains(child));
        assert!(scene.node(root).expect("live").children().is_empty());

        // removing again is a no-op, as are mutations through the handle
        scene.remove(child);
        scene.set_position(child, Vec2::new(1.0, 1.0));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_render_respects_z_and_insertion_order() {
        let mut scene = Scene::new();
        let first = scene.create_entity(None, Vec2::new(8.0, 8.0));
        let second = scene.create_entity(None, Vec2::new(8.0, 8.0));
        let third = scene.create_entity(None, Vec2::new(8.0, 8.0));
        scene.set_z_index(third, -1.0);

        let mut queue = RenderQueue::new();
        scene.render(&Camera::new(), &viewport(), &mut queue);

        let order: Vec<NodeId> = queue.commands().iter().map(|c| c.node).collect();
        // third paints first (negative z), then the tie keeps insertion order
        assert_eq!(order, vec![third, first, second]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut scene = Scene::new();
        let map = scene
            .create_nodes_map_with(
                None,
                Vec2i::new(5, 5),
                Vec2::new(32.0, 32.0),
                Vec2::zeros(),
                |_| Node::entity(Vec2::new(32.0, 32.0)),
            )
            .expect("valid map");
        let _ = map;
        let camera = Camera::from_position(Vec2::new(16.0, 16.0));

        let mut first = RenderQueue::new();
        let mut second = RenderQueue::new();
        scene.render(&camera, &viewport(), &mut first);
        scene.render(&camera, &viewport(), &mut second);

        assert_eq!(first.commands(), second.commands());
    }

    #[test]
    fn test_invisible_and_transparent_subtrees_skip() {
        let mut scene = Scene::new();
        let hidden_group = scene.insert(None, Node::group().with_visible(false));
        let _hidden_child = scene.create_entity(Some(hidden_group), Vec2::new(8.0, 8.0));

        let clear_group = scene.insert(None, Node::group().with_opacity(0.0));
        let _clear_child = scene.create_entity(Some(clear_group), Vec2::new(8.0, 8.0));

        let shown = scene.create_entity(None, Vec2::new(8.0, 8.0));

        let mut queue = RenderQueue::new();
        scene.render(&Camera::new(), &viewport(), &mut queue);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.commands()[0].node, shown);
    }

    #[test]
    fn test_map_construction_rejects_bad_parameters() {
        let mut scene = Scene::new();

        let negative = scene.create_nodes_map(
            None,
            Vec2i::new(-1, 4),
            Vec2::new(32.0, 32.0),
            Vec2::zeros(),
        );
        assert_eq!(
            negative,
            Err(SceneError::InvalidMapSize {
                width: -1,
                height: 4
            })
        );

        let flat = scene.create_nodes_map(
            None,
            Vec2i::new(4, 4),
            Vec2::new(32.0, 0.0),
            Vec2::zeros(),
        );
        assert!(matches!(flat, Err(SceneError::InvalidCellSize { .. })));

        // failed construction must not leak cells
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_map_cells_follow_placement_policy() {
        let mut scene = Scene::new();
        let map_id = scene
            .create_nodes_map(None, Vec2i::new(3, 3), Vec2::new(32.0, 32.0), Vec2::zeros())
            .expect("valid map");

        let map = scene.nodes_map(map_id).expect("map node");
        assert_eq!(map.node_distance(), Vec2::new(32.0, 32.0));
        let cell = map.node_at(Vec2i::new(2, 1)).expect("cell in range");

        let node = scene.node(cell).expect("live cell");
        assert_relative_eq!(
            node.local_transform().position,
            Vec2::new(80.0, 64.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(node.z_index(), 32.0, epsilon = EPSILON);
        assert_eq!(node.parent(), Some(map_id));
    }

    #[test]
    fn test_map_render_culls_to_visible_range() {
        let mut scene = Scene::new();
        let map_id = scene
            .create_nodes_map_with(
                None,
                Vec2i::new(5, 5),
                Vec2::new(32.0, 32.0),
                Vec2::zeros(),
                |_| Node::entity(Vec2::new(32.0, 32.0)),
            )
            .expect("valid map");

        let camera = Camera::new();
        let mut queue = RenderQueue::new();
        scene.render(&camera, &viewport(), &mut queue);

        // visible range at the origin is [0,4)x[0,4) for a 100x100 target
        assert_eq!(queue.len(), 16);
        assert!(scene.map_is_really_visible(map_id, &camera, &viewport()));

        // a camera far past the grid renders nothing from the map
        let far = Camera::from_position(Vec2::new(1000.0, 1000.0));
        let mut empty = RenderQueue::new();
        scene.render(&far, &viewport(), &mut empty);
        assert!(empty.is_empty());
        assert!(!scene.map_is_really_visible(map_id, &far, &viewport()));
    }

    #[test]
    fn test_map_render_without_culling_visits_all_cells() {
        let mut scene = Scene::with_config(SceneConfig::default().with_culling(false));
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
        let far = Camera::from_position(Vec2::new(1000.0, 1000.0));
        scene.render(&far, &viewport(), &mut queue);

        assert_eq!(queue.len(), 25);
    }

    #[test]
    fn test_zero_size_map_renders_nothing() {
        let mut scene = Scene::new();
        let map_id = scene
            .create_nodes_map(None, Vec2i::new(0, 0), Vec2::new(32.0, 32.0), Vec2::zeros())
            .expect("zero-size grid is legal");

        let mut queue = RenderQueue::new();
        scene.render(&Camera::new(), &viewport(), &mut queue);

        assert!(queue.is_empty());
        assert_eq!(scene.nodes_map(map_id).expect("map node").cell_count(), 0);
    }

    #[test]
    fn test_map_queries_out_of_range_return_none() {
        let mut scene = Scene::new();
        let map_id = scene
            .create_nodes_map(None, Vec2i::new(4, 4), Vec2::new(32.0, 32.0), Vec2::zeros())
            .expect("valid map");

        assert!(scene
            .map_node_by_position(map_id, Vec2::new(-5.0, -5.0))
            .is_none());
        assert_eq!(
            scene.map_index_from_position(map_id, Vec2::new(-5.0, -5.0)),
            Some(Vec2i::new(-1, -1))
        );

        let inside = scene
            .map_node_by_position(map_id, Vec2::new(40.0, 40.0))
            .expect("cell in range");
        assert_eq!(scene.node(inside).expect("live").parent(), Some(map_id));
    }

    #[test]
    fn test_apply_to_all_ignores_culling() {
        let mut scene = Scene::new();
        let map_id = scene
            .create_nodes_map(None, Vec2i::new(6, 4), Vec2::new(32.0, 32.0), Vec2::zeros())
            .expect("valid map");

        let mut visited = Vec::new();
        scene.map_apply_to_all(map_id, |_, index, _| visited.push(index));

        assert_eq!(visited.len(), 24);
        assert_eq!(visited[0], Vec2i::new(0, 0));
        assert_eq!(visited[23], Vec2i::new(5, 3));
    }

    #[test]
    fn test_visible_vs_all_entity_collection() {
        let mut scene = Scene::new();
        let map_id = scene
            .create_nodes_map(None, Vec2i::new(10, 10), Vec2::new(32.0, 32.0), Vec2::zeros())
            .expect("valid map");

        let mut all = Vec::new();
        scene.map_all_nodes(map_id, &mut all);
        assert_eq!(all.len(), 100);

        let mut visible = Vec::new();
        let camera = Camera::new();
        scene.map_visible_nodes(map_id, &mut visible, &camera, &viewport());
        // range [0,5)x[0,7): end_i = (100+32)/32+1 = 5, end_j = (100+64)/32+2 = 7
        let range = scene
            .map_visible_range(map_id, &camera, &viewport())
            .expect("map node");
        assert_eq!(range.start, Vec2i::new(0, 0));
        assert_eq!(range.end, Vec2i::new(5, 7));
        assert_eq!(visible.len(), range.cell_count());
        assert!(visible.len() < all.len());
    }

    #[test]
    fn test_bounding_boxes() {
        let mut scene = Scene::new();
        let entity = scene.insert(
            None,
            Node::entity(Vec2::new(10.0, 20.0))
                .with_position(Vec2::new(100.0, 100.0))
                .with_anchor(Vec2::new(0.5, 1.0))
                .with_scale(Vec2::new(2.0, 1.0)),
        );

        let rect = scene.bounding_box(entity).expect("live node");
        assert_relative_eq!(rect.min, Vec2::new(90.0, 80.0), epsilon = EPSILON);
        assert_relative_eq!(rect.max, Vec2::new(110.0, 100.0), epsilon = EPSILON);

        let map_id = scene
            .create_nodes_map(None, Vec2i::new(5, 5), Vec2::new(32.0, 32.0), Vec2::zeros())
            .expect("valid map");
        let map_rect = scene.bounding_box(map_id).expect("live node");
        assert_relative_eq!(map_rect.min, Vec2::zeros(), epsilon = EPSILON);
        assert_relative_eq!(map_rect.max, Vec2::new(160.0, 160.0), epsilon = EPSILON);
    }

    #[test]
    fn test_pick_node_prefers_topmost_and_skips_disabled() {
        let mut scene = Scene::new();
        let below = scene.insert(
            None,
            Node::entity(Vec2::new(50.0, 50.0)).with_position(Vec2::new(25.0, 25.0)),
        );
        let above = scene.insert(
            None,
            Node::entity(Vec2::new(50.0, 50.0)).with_position(Vec2::new(25.0, 25.0)),
        );

        assert_eq!(scene.pick_node(Vec2::new(25.0, 25.0)), Some(above));

        scene.set_enabled(above, false);
        assert_eq!(scene.pick_node(Vec2::new(25.0, 25.0)), Some(below));

        scene.set_visible(below, false);
        assert_eq!(scene.pick_node(Vec2::new(25.0, 25.0)), None);
    }
}
