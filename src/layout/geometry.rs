//! Grid cell to canvas coordinate conversion.
//!
//! Cells are laid out on a square pitch of `diameter + cell_offset` pixels.
//! The whole grid can be centered on a canvas of a given size; node centers
//! and edge endpoints are then plain arithmetic on (row, column).

use serde::Serialize;

use crate::layout::{Grid, GridPosition};

/// Node size and spacing in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometryConfig {
    /// Node circle diameter.
    pub diameter: f32,
    /// Gap between neighbouring circles.
    pub cell_offset: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            diameter: 50.0,
            cell_offset: 30.0,
        }
    }
}

/// Canvas placement of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    config: GeometryConfig,
    columns: usize,
    rows: usize,
    offset_x: f32,
    offset_y: f32,
}

impl GridGeometry {
    /// Geometry for a grid, anchored at the canvas origin.
    pub fn new(config: GeometryConfig, grid: &Grid) -> Self {
        Self {
            config,
            columns: grid.width(),
            rows: grid.height(),
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn config(&self) -> GeometryConfig {
        self.config
    }

    pub fn radius(&self) -> f32 {
        self.config.diameter / 2.0
    }

    fn pitch(&self) -> f32 {
        self.config.diameter + self.config.cell_offset
    }

    /// Pixel extent of `cells` circles in a line.
    fn extent(&self, cells: usize) -> f32 {
        match cells {
            0 => 0.0,
            n => (n - 1) as f32 * self.pitch() + self.config.diameter,
        }
    }

    /// Pixel size of the whole grid as (width, height).
    pub fn size(&self) -> (f32, f32) {
        (self.extent(self.columns), self.extent(self.rows))
    }

    /// Offset the grid so it sits in the middle of the canvas. Offsets go
    /// negative when the grid is larger than the canvas.
    pub fn center_on_canvas(&mut self, canvas_width: f32, canvas_height: f32) {
        let (width, height) = self.size();
        self.offset_x = (canvas_width - width) / 2.0;
        self.offset_y = (canvas_height - height) / 2.0;
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    /// Canvas center of a cell.
    pub fn node_center(&self, pos: GridPosition) -> (f32, f32) {
        let half = self.radius();
        (
            pos.col as f32 * self.pitch() + half + self.offset_x,
            pos.row as f32 * self.pitch() + half + self.offset_y,
        )
    }

    /// Center-to-center segment `[x1, y1, x2, y2]`.
    pub fn edge_endpoints(&self, from: GridPosition, to: GridPosition) -> [f32; 4] {
        let (x1, y1) = self.node_center(from);
        let (x2, y2) = self.node_center(to);
        [x1, y1, x2, y2]
    }

    /// Parent-to-child segment ending on the child's circle rather than its
    /// center, so an arrow head stays visible.
    pub fn arrow_endpoints(&self, parent: GridPosition, child: GridPosition) -> [f32; 4] {
        let [x1, y1, mut x2, mut y2] = self.edge_endpoints(parent, child);
        let (dx, dy) = (x2 - x1, y2 - y1);
        let mut dist = dx.hypot(dy);
        if dist == 0.0 {
            dist = 1.0;
        }
        x2 -= dx / dist * self.radius();
        y2 -= dy / dist * self.radius();
        [x1, y1, x2, y2]
    }
}
