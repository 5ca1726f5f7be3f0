//! Initial placement.
//!
//! One depth-first walk from the root. Each node takes the free column on its
//! row that is nearest to its parent's column; the root starts from column 0.
//! The walk uses an explicit stack because recorded call trees can be as deep
//! as the recursion that produced them.

use std::collections::BTreeMap;

use crate::error::{MalformedTree, Result};
use crate::layout::grid::{FreeColumns, Grid};
use crate::layout::{Adjacency, GridPosition, tree_adjacency};
use crate::tree::{CallTree, NodeId};

/// Output of the initial placement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub grid: Grid,
    pub pos: BTreeMap<NodeId, GridPosition>,
    /// Every node after all of its descendants.
    pub postorder: Vec<NodeId>,
    /// Parent/child edges: parent first, then children in recording order.
    pub adj: Adjacency,
}

/// Work item of the iterative walk.
enum Visit {
    /// Place a node next to its (already placed) parent.
    Enter { node: NodeId, parent: Option<NodeId> },
    /// All descendants are done.
    Exit(NodeId),
}

/// Place every node of the tree in a collision-free cell.
pub fn place(tree: &CallTree) -> Result<Placement> {
    let Some(root) = tree.root() else {
        return Ok(Placement::default());
    };

    let (width, height) = (tree.width(), tree.height());
    let mut grid = Grid::new(width, height)?;
    let mut free = FreeColumns::for_rows(height, width);
    let mut pos: BTreeMap<NodeId, GridPosition> = BTreeMap::new();
    let mut postorder = Vec::with_capacity(tree.len());

    let mut stack = vec![Visit::Enter {
        node: root,
        parent: None,
    }];

    while let Some(visit) = stack.pop() {
        let (node, parent) = match visit {
            Visit::Enter { node, parent } => (node, parent),
            Visit::Exit(node) => {
                postorder.push(node);
                continue;
            }
        };

        let row = tree.row(node).ok_or(MalformedTree::MissingDepth { node })?;
        let preferred = parent.map_or(0, |p| pos[&p].col);
        let col = free[row].nearest_and_remove(preferred)?;

        pos.insert(node, GridPosition { row, col });
        grid.occupy(row, col, node);

        stack.push(Visit::Exit(node));
        // Pushed in recording order, so the last recorded child is placed
        // first and lands nearest the parent.
        for &child in tree.children(node) {
            stack.push(Visit::Enter {
                node: child,
                parent: Some(node),
            });
        }
    }

    tracing::debug!(nodes = pos.len(), width, height, "initial placement done");

    Ok(Placement {
        grid,
        pos,
        postorder,
        adj: tree_adjacency(tree),
    })
}
