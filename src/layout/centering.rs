//! Centering refinement.
//!
//! A single bottom-up pass over the placement's postorder. Every node is
//! re-seated on its own row at the free column nearest to the integer mean of
//! its children's final columns; leaves aim for the column they already had.
//! Rows never change. The pass runs once and is not iterated to a fixed
//! point, so a node seated early keeps its column even if a later sibling
//! would have preferred it elsewhere.

use crate::error::Result;
use crate::layout::grid::FreeColumns;
use crate::layout::placement::Placement;
use crate::layout::{GridPosition, TreeGrid, tree_adjacency};
use crate::tree::CallTree;

/// Re-center a placement and rebuild its adjacency.
pub fn refine(tree: &CallTree, placement: Placement) -> Result<TreeGrid> {
    let Placement {
        mut grid,
        mut pos,
        postorder,
        ..
    } = placement;

    grid.clear();
    let mut free = FreeColumns::for_rows(grid.height(), grid.width());

    let mut moved = 0usize;
    for &node in &postorder {
        let GridPosition { row, col: old_col } = pos[&node];

        let children = tree.children(node);
        let target = if children.is_empty() {
            old_col
        } else {
            let sum: usize = children.iter().map(|c| pos[c].col).sum();
            sum / children.len()
        };

        let col = free[row].nearest_and_remove(target)?;
        if col != old_col {
            moved += 1;
        }
        pos.insert(node, GridPosition { row, col });
        grid.occupy(row, col, node);
    }

    let adj = tree_adjacency(tree);

    tracing::debug!(nodes = pos.len(), moved, "centering refinement done");

    Ok(TreeGrid { grid, adj, pos })
}
