//! Cell grid and per-row free-column index.
//!
//! Rows are tree levels, columns are horizontal slots. Each cell holds at most
//! one node. `FreeColumns` tracks the unoccupied columns of a row in an
//! ordered set so "nearest free column to X" is a pair of O(log n) range
//! lookups.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{LayoutError, Result};
use crate::tree::NodeId;

/// Fixed-size grid of cells, stored row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<NodeId>>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(LayoutError::GridTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![None; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Node in a cell, None if the cell is empty or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<NodeId> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells[row * self.width + col]
    }

    /// Put a node into a cell. The caller guarantees the cell is free.
    pub(crate) fn occupy(&mut self, row: usize, col: usize, node: NodeId) {
        let cell = &mut self.cells[row * self.width + col];
        debug_assert!(cell.is_none(), "cell ({row}, {col}) already holds {cell:?}");
        *cell = Some(node);
    }

    /// Empty every cell, keeping the dimensions.
    pub(crate) fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Iterate over rows as slices of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<NodeId>]> {
        // chunks() rejects 0, and a zero-width grid has no cells anyway.
        self.cells.chunks(self.width.max(1))
    }

    /// Occupied `(column, node)` pairs of one row, left to right.
    pub fn occupied_in_row(&self, row: usize) -> Vec<(usize, NodeId)> {
        self.rows()
            .nth(row)
            .map(|cells| {
                cells
                    .iter()
                    .enumerate()
                    .filter_map(|(col, cell)| cell.map(|node| (col, node)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Unoccupied columns of one row.
#[derive(Debug, Clone)]
pub struct FreeColumns {
    row: usize,
    free: BTreeSet<usize>,
}

impl FreeColumns {
    /// All columns `0..width` free.
    pub fn new(row: usize, width: usize) -> Self {
        Self {
            row,
            free: (0..width).collect(),
        }
    }

    /// One fully free index per row.
    pub fn for_rows(height: usize, width: usize) -> Vec<Self> {
        (0..height).map(|row| Self::new(row, width)).collect()
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn contains(&self, col: usize) -> bool {
        self.free.contains(&col)
    }

    /// Take the free column closest to `target`.
    ///
    /// Ties go to the larger column. `target` may lie outside the row.
    pub fn nearest_and_remove(&mut self, target: usize) -> Result<usize> {
        let left = self.free.range(..target).next_back().copied();
        let right = self.free.range(target..).next().copied();

        let col = match (left, right) {
            (Some(l), Some(r)) => {
                if target - l < r - target {
                    l
                } else {
                    r
                }
            }
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => return Err(LayoutError::NoFreeColumn { row: self.row }),
        };

        self.free.remove(&col);
        Ok(col)
    }
}
