//! Dense tile-grid node map with camera culling
//!
//! A [`NodesMap`] owns a `width x height` lattice of node handles placed at
//! fixed positions computed once at construction. Rendering visits only the
//! sub-rectangle of grid indices that can intersect the current viewport,
//! so a frame costs O(visible) instead of O(total) for large tile maps.
//!
//! The placement and range formulas here are a fixed policy of the map: the
//! integer arithmetic deliberately over-covers at the screen edges (partial
//! tiles stay included) and must never under-cover.

use crate::foundation::math::{Vec2, Vec2i};
use crate::scene::scene_graph::NodeId;

/// Rectangle of grid indices, `start` inclusive, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    /// First included index on each axis
    pub start: Vec2i,
    /// First excluded index on each axis
    pub end: Vec2i,
}

impl GridRange {
    /// Whether the range covers no cells
    pub fn is_empty(&self) -> bool {
        self.start.x >= self.end.x || self.start.y >= self.end.y
    }

    /// Whether the range covers the given index
    pub fn contains(&self, index: Vec2i) -> bool {
        index.x >= self.start.x
            && index.x < self.end.x
            && index.y >= self.start.y
            && index.y < self.end.y
    }

    /// Number of cells covered by the range
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.end.x - self.start.x) as usize) * ((self.end.y - self.start.y) as usize)
    }
}

/// Grid of node handles on a uniform lattice
///
/// Owned by a [`Scene`](crate::scene::Scene) as the payload of a map node;
/// the handles point back into the same scene. Cell size is the rendered
/// footprint of one cell; cell spacing is the distance between adjacent
/// anchors and may differ from the size (gaps or overlap).
#[derive(Debug, Clone)]
pub struct NodesMap {
    size: Vec2i,
    node_size: Vec2,
    node_distance: Vec2,
    nodes: Vec<NodeId>,
}

impl NodesMap {
    pub(crate) fn new(size: Vec2i, node_size: Vec2, node_distance: Vec2) -> Self {
        let capacity = (size.x.max(0) as usize) * (size.y.max(0) as usize);
        Self {
            size,
            node_size,
            node_distance,
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push_cell(&mut self, id: NodeId) {
        self.nodes.push(id);
    }

    /// Grid dimensions in cells
    pub fn grid_size(&self) -> Vec2i {
        self.size
    }

    /// Rendered footprint of one cell
    pub fn node_size(&self) -> Vec2 {
        self.node_size
    }

    /// Distance between adjacent cell anchors
    pub fn node_distance(&self) -> Vec2 {
        self.node_distance
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.nodes.len()
    }

    /// All cell handles, column-major (x outer, y inner)
    pub fn cells(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Lattice position of a cell: horizontal-center, vertical-bottom of
    /// the cell footprint
    pub fn cell_position(&self, index: Vec2i) -> Vec2 {
        Vec2::new(
            index.x as f32 * self.node_distance.x + self.node_size.x * 0.5,
            index.y as f32 * self.node_distance.y + self.node_size.y,
        )
    }

    /// Paint-order key assigned to a cell at construction
    ///
    /// Derived from the cell's y position so lower rows paint after upper
    /// rows, giving back-to-front order without a sort pass.
    pub fn cell_z_index(&self, index: Vec2i) -> f32 {
        self.cell_position(index).y - self.node_distance.y
    }

    /// Extent of the whole lattice in local units
    pub fn footprint(&self) -> Vec2 {
        if self.size.x <= 0 || self.size.y <= 0 {
            return Vec2::zeros();
        }
        Vec2::new(
            (self.size.x - 1) as f32 * self.node_distance.x + self.node_size.x,
            (self.size.y - 1) as f32 * self.node_distance.y + self.node_size.y,
        )
    }

    /// Handle of the cell at a grid index, or `None` when out of range
    pub fn node_at(&self, index: Vec2i) -> Option<NodeId> {
        if index.x < 0 || index.y < 0 || index.x >= self.size.x || index.y >= self.size.y {
            return None;
        }
        self.nodes
            .get((index.x * self.size.y + index.y) as usize)
            .copied()
    }

    /// Grid index covering a map-local position
    ///
    /// May return indices outside `[0,W)x[0,H)`; callers clamp or check.
    /// Uses floor division so slightly negative positions resolve to index
    /// `-1`, not `0`.
    pub fn index_from_position(&self, position: Vec2) -> Vec2i {
        Vec2i::new(
            (position.x / self.node_distance.x).floor() as i32,
            (position.y / self.node_distance.y).floor() as i32,
        )
    }

    /// Handle of the cell covering a map-local position, or `None` when the
    /// position falls outside the grid
    pub fn node_by_position_any(&self, position: Vec2) -> Option<NodeId> {
        self.node_at(self.index_from_position(position))
    }

    /// Compute the range of grid indices that can intersect the viewport
    ///
    /// `screen_pos` is the map's absolute position minus the camera
    /// position; `target_size` is the render-target size. The integer
    /// truncation plus the `+1`/`+2` terms over-cover partial tiles at the
    /// edges; the `-1` on the start row accounts for the bottom-anchored
    /// placement, so a row partially scrolled off the top stays included.
    pub fn visible_range(&self, screen_pos: Vec2, target_size: Vec2) -> GridRange {
        let width = self.size.x;
        let height = self.size.y;

        let mut start_i = if screen_pos.x < 0.0 {
            (-screen_pos.x / self.node_distance.x) as i32
        } else {
            0
        };
        if start_i >= width {
            start_i = width - 1;
        }

        let mut start_j = if screen_pos.y < 0.0 {
            ((-screen_pos.y - self.node_size.y) / self.node_distance.y - 1.0) as i32
        } else {
            0
        };
        if start_j >= height {
            start_j = height - 1;
        }
        if start_j < 0 {
            start_j = 0;
        }

        let mut end_i =
            start_i + ((target_size.x + self.node_size.x) / self.node_distance.x) as i32 + 1;
        let mut end_j =
            start_j + ((target_size.y + self.node_size.y * 2.0) / self.node_distance.y) as i32 + 2;
        if end_i >= width {
            end_i = width - 1;
        }
        if end_j >= height {
            end_j = height - 1;
        }

        GridRange {
            start: Vec2i::new(start_i, start_j),
            end: Vec2i::new(end_i, end_j),
        }
    }

    /// Range covering every cell of the grid (no culling)
    pub fn full_range(&self) -> GridRange {
        GridRange {
            start: Vec2i::new(0, 0),
            end: self.size,
        }
    }

    /// Cheap test for whether any part of the grid can reach the viewport
    ///
    /// Performs the same bound computation as [`Self::visible_range`] but
    /// short-circuits as soon as a bound falls entirely outside the grid,
    /// so a culled-out map is skipped without visiting any cell.
    pub fn overlaps_target(&self, screen_pos: Vec2, target_size: Vec2) -> bool {
        let start_i = if screen_pos.x < 0.0 {
            (-screen_pos.x / self.node_distance.x) as i32
        } else {
            0
        };
        if start_i >= self.size.x {
            return false;
        }

        let start_j = if screen_pos.y < 0.0 {
            ((-screen_pos.y - self.node_size.y) / self.node_distance.y - 1.0) as i32
        } else {
            0
        };
        if start_j >= self.size.y {
            return false;
        }

        let end_i =
            start_i + ((target_size.x + self.node_size.x) / self.node_distance.x) as i32 + 1;
        if end_i <= 0 {
            return false;
        }

        let end_j =
            start_j + ((target_size.y + self.node_size.y * 2.0) / self.node_distance.y) as i32 + 2;
        if end_j <= 0 {
            return false;
        }

        true
    }

    /// Collect the cell handles covered by a range, x outer, y inner
    pub fn nodes_in_range(&self, range: &GridRange) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(range.cell_count());
        for i in range.start.x..range.end.x {
            for j in range.start.y..range.end.y {
                if let Some(id) = self.node_at(Vec2i::new(i, j)) {
                    out.push(id);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn map(w: i32, h: i32, cell: f32, distance: f32) -> NodesMap {
        NodesMap::new(
            Vec2i::new(w, h),
            Vec2::new(cell, cell),
            Vec2::new(distance, distance),
        )
    }

    #[test]
    fn test_cell_placement_policy() {
        let map = map(8, 8, 32.0, 32.0);

        assert_relative_eq!(map.cell_position(Vec2i::new(0, 0)), Vec2::new(16.0, 32.0));
        assert_relative_eq!(map.cell_position(Vec2i::new(3, 2)), Vec2::new(112.0, 96.0));
        assert_relative_eq!(map.cell_z_index(Vec2i::new(3, 2)), 64.0);
    }

    #[test]
    fn test_cell_placement_with_spacing_gaps() {
        // Spacing larger than the cell size produces gaps; the anchor rule
        // still centers horizontally and bottoms vertically on the footprint.
        let map = map(4, 4, 32.0, 48.0);

        assert_relative_eq!(map.cell_position(Vec2i::new(1, 1)), Vec2::new(64.0, 80.0));
        assert_relative_eq!(map.cell_z_index(Vec2i::new(1, 1)), 32.0);
    }

    #[test]
    fn test_index_from_position_floors_negatives() {
        let map = map(5, 5, 32.0, 32.0);

        assert_eq!(map.index_from_position(Vec2::new(0.0, 0.0)), Vec2i::new(0, 0));
        assert_eq!(map.index_from_position(Vec2::new(95.0, 33.0)), Vec2i::new(2, 1));
        assert_eq!(
            map.index_from_position(Vec2::new(-5.0, -5.0)),
            Vec2i::new(-1, -1)
        );
    }

    #[test]
    fn test_node_by_position_out_of_range_is_none() {
        let map = map(5, 5, 32.0, 32.0);

        assert!(map.node_by_position_any(Vec2::new(-5.0, -5.0)).is_none());
        assert!(map.node_by_position_any(Vec2::new(1000.0, 10.0)).is_none());
    }

    #[test]
    fn test_visible_range_small_grid_at_origin() {
        let map = map(5, 5, 32.0, 32.0);
        let target = Vec2::new(100.0, 100.0);

        let range = map.visible_range(Vec2::new(0.0, 0.0), target);

        // end_i = 0 + (100+32)/32 + 1 = 5, clamped to 4;
        // end_j = 0 + (100+64)/32 + 2 = 7, clamped to 4.
        assert_eq!(range.start, Vec2i::new(0, 0));
        assert_eq!(range.end, Vec2i::new(4, 4));
        assert!(map.overlaps_target(Vec2::new(0.0, 0.0), target));
    }

    #[test]
    fn test_visible_range_camera_far_past_grid() {
        let map = map(5, 5, 32.0, 32.0);
        let target = Vec2::new(100.0, 100.0);
        let screen = Vec2::new(-1000.0, -1000.0);

        let range = map.visible_range(screen, target);

        assert!(range.is_empty());
        assert!(!map.overlaps_target(screen, target));
    }

    #[test]
    fn test_visible_range_partial_top_row_included() {
        // Map scrolled up slightly: the bottom-anchored top row is still
        // partially on screen and must stay in the range.
        let map = map(20, 20, 32.0, 32.0);
        let range = map.visible_range(Vec2::new(0.0, -10.0), Vec2::new(200.0, 200.0));

        assert_eq!(range.start.y, 0);
        assert!(range.contains(Vec2i::new(0, 0)));
    }

    #[test]
    fn test_visible_range_zero_grid_never_indexes() {
        let map = map(0, 0, 32.0, 32.0);

        let range = map.visible_range(Vec2::new(0.0, 0.0), Vec2::new(800.0, 600.0));
        assert!(range.is_empty());
        assert!(map.nodes_in_range(&range).is_empty());
        assert!(map.node_at(Vec2i::new(0, 0)).is_none());
        assert!(!map.overlaps_target(Vec2::new(0.0, 0.0), Vec2::new(800.0, 600.0)));
    }

    #[test]
    fn test_visible_range_never_undercovers_interior() {
        // Sweep camera positions over the grid interior and check, by brute
        // force, that every cell whose footprint overlaps the viewport is
        // inside the computed range. Over-inclusion is allowed; a missing
        // visible cell is not.
        let map = map(50, 50, 32.0, 32.0);
        let target = Vec2::new(200.0, 200.0);

        let mut camera_x = 0.0_f32;
        while camera_x < 1200.0 {
            let mut camera_y = 0.0_f32;
            while camera_y < 1200.0 {
                let range =
                    map.visible_range(Vec2::new(-camera_x, -camera_y), target);

                for i in 0..50 {
                    for j in 0..50 {
                        let left = i as f32 * 32.0;
                        let top = j as f32 * 32.0;
                        let overlaps = left < camera_x + target.x
                            && left + 32.0 > camera_x
                            && top < camera_y + target.y
                            && top + 32.0 > camera_y;
                        if overlaps {
                            assert!(
                                range.contains(Vec2i::new(i, j)),
                                "cell ({i}, {j}) visible at camera ({camera_x}, {camera_y}) \
                                 but outside range {range:?}"
                            );
                        }
                    }
                }

                camera_y += 37.0;
            }
            camera_x += 37.0;
        }
    }

    #[test]
    fn test_range_stays_within_grid_bounds() {
        let map = map(10, 10, 32.0, 32.0);

        for step in 0..80 {
            let offset = step as f32 * 25.0 - 1000.0;
            let range = map.visible_range(Vec2::new(offset, offset), Vec2::new(640.0, 480.0));

            assert!(range.start.x >= 0 && range.start.y >= 0);
            assert!(range.end.x < 10 && range.end.y < 10);
        }
    }

    #[test]
    fn test_footprint_extent() {
        let map = map(5, 5, 32.0, 32.0);
        assert_relative_eq!(map.footprint(), Vec2::new(160.0, 160.0));

        let gaps = map3(); // spacing 48, cell 32
        assert_relative_eq!(gaps.footprint(), Vec2::new(224.0, 224.0));

        assert_eq!(map2().footprint(), Vec2::zeros());
    }

    fn map2() -> NodesMap {
        map(0, 3, 32.0, 32.0)
    }

    fn map3() -> NodesMap {
        map(5, 5, 32.0, 48.0)
    }
}
