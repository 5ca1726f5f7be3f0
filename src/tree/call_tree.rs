//! Validated call tree.
//!
//! `CallTree` is the read-only input of the layout passes. It is built from
//! the two mappings a recorder produces (node → parent, node → depth) and
//! rejects anything that is not a single rooted tree with consistent depths
//! before a single cell is placed.
//!
//! Topology is held in petgraph's StableGraph (edges point parent → child).
//! Child order is kept separately because it is part of the input: siblings
//! are visited in the order the caller recorded them.

use std::collections::{HashMap, HashSet};

use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::Dfs;

use crate::error::{MalformedTree, Result};
use crate::tree::NodeId;

/// A rooted tree of recorded calls with per-node depth.
#[derive(Debug, Clone, Default)]
pub struct CallTree {
    /// Parent → child edges.
    graph: StableGraph<NodeId, (), Directed>,

    /// Map from NodeId to petgraph NodeIndex
    index: HashMap<NodeId, NodeIndex>,

    /// Nodes in recording order.
    order: Vec<NodeId>,

    parents: HashMap<NodeId, NodeId>,

    /// Children per node, in recording order.
    children: HashMap<NodeId, Vec<NodeId>>,

    depths: HashMap<NodeId, u32>,

    root: Option<NodeId>,

    /// Number of nodes on each row (row = depth - root depth).
    row_counts: Vec<usize>,
}

impl CallTree {
    /// Build and validate a call tree.
    ///
    /// `parent` lists every node exactly once together with its parent (None
    /// for the root). Its order is the recording order and decides sibling
    /// order. `depths` must hold a depth for every listed node and nothing
    /// else.
    pub fn new(parent: &[(NodeId, Option<NodeId>)], depths: &HashMap<NodeId, u32>) -> Result<Self> {
        let mut tree = Self {
            graph: StableGraph::with_capacity(parent.len(), parent.len().saturating_sub(1)),
            index: HashMap::with_capacity(parent.len()),
            order: Vec::with_capacity(parent.len()),
            ..Self::default()
        };

        for &(node, p) in parent {
            if node.is_reserved() || p.is_some_and(NodeId::is_reserved) {
                return Err(MalformedTree::ReservedId.into());
            }
            if tree.index.contains_key(&node) {
                return Err(MalformedTree::DuplicateNode { node }.into());
            }
            let ix = tree.graph.add_node(node);
            tree.index.insert(node, ix);
            tree.order.push(node);
        }

        for &(node, p) in parent {
            match p {
                Some(p) => {
                    let Some(&parent_ix) = tree.index.get(&p) else {
                        return Err(MalformedTree::UnknownParent { node, parent: p }.into());
                    };
                    tree.graph.add_edge(parent_ix, tree.index[&node], ());
                    tree.parents.insert(node, p);
                    tree.children.entry(p).or_default().push(node);
                }
                None => match tree.root {
                    Some(first) => {
                        return Err(MalformedTree::MultipleRoots { first, second: node }.into());
                    }
                    None => tree.root = Some(node),
                },
            }
        }

        let Some(root) = tree.root else {
            if !tree.order.is_empty() {
                return Err(MalformedTree::NoRoot.into());
            }
            if let Some(node) = depths.keys().copied().min() {
                return Err(MalformedTree::UnknownDepth { node }.into());
            }
            return Ok(tree);
        };

        tree.check_reachable(root)?;
        tree.assign_depths(depths)?;

        tracing::debug!(
            nodes = tree.order.len(),
            height = tree.height(),
            width = tree.width(),
            "call tree validated"
        );
        Ok(tree)
    }

    /// Every node must hang off the root. Anything else sits on a parent
    /// cycle.
    fn check_reachable(&self, root: NodeId) -> Result<()> {
        let mut reached = HashSet::with_capacity(self.order.len());
        let mut dfs = Dfs::new(&self.graph, self.index[&root]);
        while let Some(ix) = dfs.next(&self.graph) {
            reached.insert(self.graph[ix]);
        }

        match self.order.iter().find(|node| !reached.contains(node)) {
            Some(&node) => Err(MalformedTree::Unreachable { node, root }.into()),
            None => Ok(()),
        }
    }

    fn assign_depths(&mut self, depths: &HashMap<NodeId, u32>) -> Result<()> {
        for &node in &self.order {
            if !depths.contains_key(&node) {
                return Err(MalformedTree::MissingDepth { node }.into());
            }
        }
        if let Some(node) = depths.keys().copied().filter(|n| !self.index.contains_key(n)).min() {
            return Err(MalformedTree::UnknownDepth { node }.into());
        }

        for &node in &self.order {
            let Some(&parent) = self.parents.get(&node) else {
                continue;
            };
            let (depth, parent_depth) = (depths[&node], depths[&parent]);
            if parent_depth.checked_add(1) != Some(depth) {
                return Err(MalformedTree::DepthMismatch {
                    node,
                    depth,
                    parent,
                    parent_depth,
                }
                .into());
            }
        }

        // Consistent depths put every node at or below the root.
        let root_depth = self.root.map_or(0, |root| depths[&root]);
        for &node in &self.order {
            let row = (depths[&node] - root_depth) as usize;
            if row >= self.row_counts.len() {
                self.row_counts.resize(row + 1, 0);
            }
            self.row_counts[row] += 1;
        }
        self.depths = depths.clone();
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    /// All nodes in recording order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Direct children in recording order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth as recorded by the caller.
    pub fn depth(&self, node: NodeId) -> Option<u32> {
        self.depths.get(&node).copied()
    }

    /// Grid row of a node: its depth relative to the root.
    pub fn row(&self, node: NodeId) -> Option<usize> {
        let root_depth = self.depth(self.root?)?;
        self.depth(node).map(|depth| (depth - root_depth) as usize)
    }

    /// Number of rows the grid needs.
    pub fn height(&self) -> usize {
        self.row_counts.len()
    }

    /// Number of columns the grid needs: the most nodes on any one row.
    pub fn width(&self) -> usize {
        self.row_counts.iter().copied().max().unwrap_or(0)
    }

    /// Node count per row.
    pub fn row_counts(&self) -> &[usize] {
        &self.row_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    fn build(entries: &[(u32, Option<u32>, u32)]) -> Result<CallTree> {
        let parent: Vec<_> = entries
            .iter()
            .map(|&(n, p, _)| (NodeId(n), p.map(NodeId)))
            .collect();
        let depths = entries.iter().map(|&(n, _, d)| (NodeId(n), d)).collect();
        CallTree::new(&parent, &depths)
    }

    fn malformed(result: Result<CallTree>) -> MalformedTree {
        match result {
            Err(LayoutError::MalformedTree(reason)) => reason,
            other => panic!("expected malformed tree, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree = build(&[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.width(), 0);
    }

    #[test]
    fn test_children_keep_recording_order() {
        let tree =
            build(&[(1, None, 1), (4, Some(1), 2), (2, Some(1), 2), (3, Some(1), 2)]).unwrap();
        assert_eq!(tree.root(), Some(NodeId(1)));
        assert_eq!(tree.children(NodeId(1)), &[NodeId(4), NodeId(2), NodeId(3)]);
        assert!(tree.children(NodeId(2)).is_empty());
        assert_eq!(tree.parent(NodeId(3)), Some(NodeId(1)));
        assert_eq!(tree.parent(NodeId(1)), None);
    }

    #[test]
    fn test_rows_are_relative_to_root_depth() {
        let tree =
            build(&[(7, None, 3), (8, Some(7), 4), (9, Some(8), 5), (10, Some(7), 4)]).unwrap();
        assert_eq!(tree.row(NodeId(7)), Some(0));
        assert_eq!(tree.row(NodeId(9)), Some(2));
        assert_eq!(tree.depth(NodeId(9)), Some(5));
        assert_eq!(tree.row_counts(), &[1, 2, 1]);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.width(), 2);
    }

    #[test]
    fn test_reserved_id_rejected() {
        assert_eq!(malformed(build(&[(0, None, 1)])), MalformedTree::ReservedId);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let reason = malformed(build(&[(1, None, 1), (2, Some(1), 2), (2, Some(1), 2)]));
        assert_eq!(reason, MalformedTree::DuplicateNode { node: NodeId(2) });
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let reason = malformed(build(&[(1, None, 1), (2, Some(5), 2)]));
        assert_eq!(
            reason,
            MalformedTree::UnknownParent {
                node: NodeId(2),
                parent: NodeId(5)
            }
        );
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let reason = malformed(build(&[(1, None, 1), (2, None, 1)]));
        assert_eq!(
            reason,
            MalformedTree::MultipleRoots {
                first: NodeId(1),
                second: NodeId(2)
            }
        );
    }

    #[test]
    fn test_no_root_rejected() {
        let reason = malformed(build(&[(1, Some(2), 1), (2, Some(1), 2)]));
        assert_eq!(reason, MalformedTree::NoRoot);
    }

    #[test]
    fn test_detached_cycle_rejected() {
        let reason = malformed(build(&[(1, None, 1), (2, Some(3), 2), (3, Some(2), 3)]));
        assert_eq!(
            reason,
            MalformedTree::Unreachable {
                node: NodeId(2),
                root: NodeId(1)
            }
        );
    }

    #[test]
    fn test_depth_mismatch_rejected() {
        let reason = malformed(build(&[(1, None, 1), (2, Some(1), 3)]));
        assert_eq!(
            reason,
            MalformedTree::DepthMismatch {
                node: NodeId(2),
                depth: 3,
                parent: NodeId(1),
                parent_depth: 1
            }
        );
    }

    #[test]
    fn test_missing_and_unknown_depths_rejected() {
        let parent = [(NodeId(1), None), (NodeId(2), Some(NodeId(1)))];

        let depths = HashMap::from([(NodeId(1), 1)]);
        let reason = malformed(CallTree::new(&parent, &depths));
        assert_eq!(reason, MalformedTree::MissingDepth { node: NodeId(2) });

        let depths = HashMap::from([(NodeId(1), 1), (NodeId(2), 2), (NodeId(9), 2)]);
        let reason = malformed(CallTree::new(&parent, &depths));
        assert_eq!(reason, MalformedTree::UnknownDepth { node: NodeId(9) });
    }
}
