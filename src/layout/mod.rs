//! Grid layout for call trees.
//!
//! Turns a validated `CallTree` into a grid where every node owns one cell,
//! rows are tree levels and no two nodes on a level share a column. Layout is
//! two passes:
//!
//! 1. **Placement** (`placement`): a depth-first walk that seats each node at
//!    the free column nearest its parent's.
//! 2. **Centering** (`centering`): a postorder pass that re-seats each node
//!    near the mean column of its children.
//!
//! `geometry` converts the resulting cells into canvas coordinates.

pub mod centering;
pub mod geometry;
pub mod grid;
pub mod placement;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::Result;
use crate::tree::{CallTree, NodeId};

pub use geometry::{GeometryConfig, GridGeometry};
pub use grid::{FreeColumns, Grid};
pub use placement::Placement;

/// Cell of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

/// Neighbours of each node: parent and children only.
pub type Adjacency = BTreeMap<NodeId, Vec<NodeId>>;

/// A finished layout, owned by whoever renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeGrid {
    pub grid: Grid,
    pub adj: Adjacency,
    pub pos: BTreeMap<NodeId, GridPosition>,
}

impl TreeGrid {
    pub fn position(&self, node: NodeId) -> Option<GridPosition> {
        self.pos.get(&node).copied()
    }

    pub fn node_count(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

impl From<Placement> for TreeGrid {
    fn from(placement: Placement) -> Self {
        Self {
            grid: placement.grid,
            adj: placement.adj,
            pos: placement.pos,
        }
    }
}

/// Neighbours of every node: its parent first, then its children in
/// recording order.
pub(crate) fn tree_adjacency(tree: &CallTree) -> Adjacency {
    tree.nodes()
        .iter()
        .map(|&node| {
            let edges = tree
                .parent(node)
                .into_iter()
                .chain(tree.children(node).iter().copied())
                .collect();
            (node, edges)
        })
        .collect()
}

/// Lay out a call tree given as node → parent entries and per-node depths.
///
/// `parent` order is the recording order and decides sibling order. With
/// `center` false only the placement pass runs.
pub fn layout(
    parent: &[(NodeId, Option<NodeId>)],
    depths: &HashMap<NodeId, u32>,
    center: bool,
) -> Result<TreeGrid> {
    let tree = CallTree::new(parent, depths).inspect_err(|err| {
        tracing::warn!(%err, "rejected call tree");
    })?;
    layout_tree(&tree, center)
}

/// Lay out an already validated call tree.
pub fn layout_tree(tree: &CallTree, center: bool) -> Result<TreeGrid> {
    let placement = placement::place(tree)?;
    if center {
        centering::refine(tree, placement)
    } else {
        Ok(placement.into())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::{BTreeMap, HashSet};

    use super::*;

    /// Build a tree from `(id, parent, depth)` triples.
    pub fn tree(entries: &[(u32, Option<u32>, u32)]) -> CallTree {
        let parent: Vec<_> = entries
            .iter()
            .map(|&(n, p, _)| (NodeId(n), p.map(NodeId)))
            .collect();
        let depths = entries.iter().map(|&(n, _, d)| (NodeId(n), d)).collect();
        CallTree::new(&parent, &depths).expect("test tree should be valid")
    }

    /// Uniqueness, completeness and row correctness of a layout.
    pub fn assert_valid(tree: &CallTree, grid: &Grid, pos: &BTreeMap<NodeId, GridPosition>) {
        assert_eq!(pos.len(), tree.len(), "every node has a position");

        let mut seen = HashSet::new();
        for (&node, &p) in pos {
            assert_eq!(Some(p.row), tree.row(node), "{node} on wrong row");
            assert!(seen.insert(p), "{node} shares cell {p:?}");
            assert_eq!(grid.get(p.row, p.col), Some(node), "grid disagrees for {node}");
        }

        let occupied = grid.rows().flatten().filter(|c| c.is_some()).count();
        assert_eq!(occupied, tree.len(), "grid holds each node exactly once");
    }
}
