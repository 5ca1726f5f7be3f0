//! R-tree lookup of rendered node circles using the rstar crate.
//!
//! Maps each laid-out node to its canvas center and answers:
//! - which node is under a point (hit testing)
//! - which nodes touch a rectangle (viewport culling)

use std::collections::HashMap;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::{GridGeometry, TreeGrid};
use crate::tree::NodeId;

/// A node center in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Canvas lookup table for node circles.
///
/// Every node is drawn as a circle of the same radius, so the tree stores
/// centers and queries are widened by that radius.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
    centers: HashMap<NodeId, (f32, f32)>,
    radius: f32,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every node of a layout at its canvas position.
    pub fn from_layout(layout: &TreeGrid, geometry: &GridGeometry) -> Self {
        let mut index = Self::new();
        index.rebuild(layout, geometry);
        index
    }

    /// Replace the contents with the nodes of a layout.
    ///
    /// Bulk loading is faster than incremental inserts.
    pub fn rebuild(&mut self, layout: &TreeGrid, geometry: &GridGeometry) {
        let points: Vec<_> = layout
            .pos
            .iter()
            .map(|(&id, &pos)| {
                let (x, y) = geometry.node_center(pos);
                NodePoint::new(id, x, y)
            })
            .collect();

        self.centers = points.iter().map(|p| (p.id, (p.x, p.y))).collect();
        self.radius = geometry.radius();
        self.tree = RTree::bulk_load(points);
    }

    /// Canvas center of a node.
    pub fn center(&self, id: NodeId) -> Option<(f32, f32)> {
        self.centers.get(&id).copied()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The node whose circle contains the point, nearest center first.
    pub fn node_at(&self, x: f32, y: f32) -> Option<NodeId> {
        let radius_sq = self.radius * self.radius;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= radius_sq)
            .map(|point| point.id)
    }

    /// Nodes whose circles intersect the rectangle grown by `margin`.
    pub fn in_rect(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        margin: f32,
    ) -> Vec<NodeId> {
        let pad = self.radius + margin;
        let envelope =
            AABB::from_corners([min_x - pad, min_y - pad], [max_x + pad, max_y + pad]);
        let mut ids: Vec<_> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// An edge stays visible unless both of its endpoint circles are outside
    /// the rectangle grown by `margin`.
    pub fn edge_visible(
        &self,
        a: NodeId,
        b: NodeId,
        rect: (f32, f32, f32, f32),
        margin: f32,
    ) -> bool {
        let (min_x, min_y, max_x, max_y) = rect;
        let pad = self.radius + margin;
        let inside = |id: NodeId| {
            self.center(id).is_some_and(|(x, y)| {
                x >= min_x - pad && x <= max_x + pad && y >= min_y - pad && y <= max_y + pad
            })
        };
        inside(a) || inside(b)
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.centers.clear();
    }

    /// Get the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
