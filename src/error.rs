//! Error types for call tree validation and grid layout.

use crate::tree::NodeId;

/// Precondition failures detected before any placement begins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedTree {
    #[error("node id 0 is reserved")]
    ReservedId,
    #[error("{node} is listed more than once")]
    DuplicateNode { node: NodeId },
    #[error("{node} names parent {parent}, which is not in the tree")]
    UnknownParent { node: NodeId, parent: NodeId },
    #[error("no node is without a parent")]
    NoRoot,
    #[error("both {first} and {second} have no parent")]
    MultipleRoots { first: NodeId, second: NodeId },
    #[error("{node} is not reachable from root {root}")]
    Unreachable { node: NodeId, root: NodeId },
    #[error("{node} has no depth")]
    MissingDepth { node: NodeId },
    #[error("depth given for {node}, which is not in the tree")]
    UnknownDepth { node: NodeId },
    #[error("{node} has depth {depth} but its parent {parent} has depth {parent_depth}")]
    DepthMismatch {
        node: NodeId,
        depth: u32,
        parent: NodeId,
        parent_depth: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("malformed call tree: {0}")]
    MalformedTree(#[from] MalformedTree),
    /// A row ran out of free columns. The grid width is derived from per-row
    /// counts, so this is a logic error in the layout itself.
    #[error("internal invariant violated: row {row} has no free column")]
    NoFreeColumn { row: usize },
    #[error("a {width} x {height} grid does not fit in memory")]
    GridTooLarge { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
