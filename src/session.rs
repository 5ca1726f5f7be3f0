//! LayoutSession - one visualization's layout state.
//!
//! The session owns the most recent `TreeGrid` together with everything a
//! renderer derives from it: the canvas geometry and the spatial lookup of
//! node circles. Each `compute` replaces all of it; nothing carries over
//! between layouts.

use std::collections::HashMap;

use crate::error::Result;
use crate::layout::{self, GeometryConfig, Grid, GridGeometry, TreeGrid};
use crate::spatial::SpatialIndex;
use crate::tree::{CallTree, NodeId};

/// Layout state for one visualization.
pub struct LayoutSession {
    config: GeometryConfig,

    /// Last computed layout
    layout: TreeGrid,

    geometry: GridGeometry,

    /// Canvas lookup of node circles
    spatial: SpatialIndex,

    /// Canvas size the geometry is centered on, if any
    canvas: Option<(f32, f32)>,
}

impl LayoutSession {
    /// Create an empty session.
    pub fn new(config: GeometryConfig) -> Self {
        Self {
            config,
            layout: TreeGrid::default(),
            geometry: GridGeometry::new(config, &Grid::default()),
            spatial: SpatialIndex::new(),
            canvas: None,
        }
    }

    /// Lay out a call tree and make it the session's current layout.
    ///
    /// On error the previous layout is kept.
    pub fn compute(
        &mut self,
        parent: &[(NodeId, Option<NodeId>)],
        depths: &HashMap<NodeId, u32>,
        center: bool,
    ) -> Result<&TreeGrid> {
        let layout = layout::layout(parent, depths, center)?;
        self.install(layout);
        Ok(&self.layout)
    }

    /// Lay out an already validated call tree.
    pub fn compute_tree(&mut self, tree: &CallTree, center: bool) -> Result<&TreeGrid> {
        let layout = layout::layout_tree(tree, center)?;
        self.install(layout);
        Ok(&self.layout)
    }

    fn install(&mut self, layout: TreeGrid) {
        self.geometry = GridGeometry::new(self.config, &layout.grid);
        if let Some((width, height)) = self.canvas {
            self.geometry.center_on_canvas(width, height);
        }
        self.layout = layout;
        self.spatial.rebuild(&self.layout, &self.geometry);
    }

    /// Center the grid on a canvas; later layouts stay centered on it.
    pub fn center_on_canvas(&mut self, width: f32, height: f32) {
        self.canvas = Some((width, height));
        self.geometry.center_on_canvas(width, height);
        self.spatial.rebuild(&self.layout, &self.geometry);
    }

    pub fn layout(&self) -> &TreeGrid {
        &self.layout
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    pub fn node_center(&self, id: NodeId) -> Option<(f32, f32)> {
        self.spatial.center(id)
    }

    pub fn find_node_at(&self, x: f32, y: f32) -> Option<NodeId> {
        self.spatial.node_at(x, y)
    }

    pub fn find_nodes_in_rect(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        margin: f32,
    ) -> Vec<NodeId> {
        self.spatial.in_rect(min_x, min_y, max_x, max_y, margin)
    }

    /// Parent → child arrows as flat `[x1, y1, x2, y2, ...]`, one segment per
    /// edge, children in adjacency order.
    pub fn edge_segments(&self) -> Vec<f32> {
        let mut segments = Vec::with_capacity(self.layout.node_count().saturating_sub(1) * 4);
        for (&parent, neighbours) in &self.layout.adj {
            let Some(from) = self.layout.position(parent) else {
                continue;
            };
            for &child in neighbours {
                let Some(to) = self.layout.position(child) else {
                    continue;
                };
                // Each edge shows up under both endpoints; keep the downward one.
                if to.row != from.row + 1 {
                    continue;
                }
                segments.extend(self.geometry.arrow_endpoints(from, to));
            }
        }
        segments
    }

    /// Drop the current layout.
    pub fn clear(&mut self) {
        self.layout = TreeGrid::default();
        self.geometry = GridGeometry::new(self.config, &Grid::default());
        self.spatial.clear();
    }
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new(GeometryConfig::default())
    }
}
