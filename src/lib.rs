//! StackSprout - WASM Module
//!
//! This module turns recorded call trees into collision-free grid layouts
//! for the StackSprout recursion visualizer. It is compiled to WebAssembly
//! and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `tree`: Call tree input (validation via petgraph, call recording)
//! - `layout`: Grid placement and centering, grid to canvas geometry
//! - `spatial`: R-tree lookup of node circles for hit testing and culling
//! - `session`: Per-visualization layout state

use std::collections::HashMap;

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod layout;
pub mod session;
pub mod spatial;
pub mod tree;

pub use error::{LayoutError, MalformedTree, Result};
pub use layout::{GridPosition, TreeGrid, layout, layout_tree};
pub use tree::{CallTree, NodeId};

use layout::GeometryConfig;
use session::LayoutSession;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the layout engine.
///
/// This struct wraps a `LayoutSession` and provides the public API exposed
/// to JavaScript.
#[wasm_bindgen]
pub struct StacksproutWasm {
    session: LayoutSession,
}

#[wasm_bindgen]
impl StacksproutWasm {
    /// Create a layout engine.
    ///
    /// # Arguments
    ///
    /// * `diameter` - Node circle diameter in pixels
    /// * `cell_offset` - Gap between neighbouring circles in pixels
    #[wasm_bindgen(constructor)]
    pub fn new(diameter: f32, cell_offset: f32) -> Self {
        Self {
            session: LayoutSession::new(GeometryConfig {
                diameter,
                cell_offset,
            }),
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out a recorded call tree.
    ///
    /// The three arrays are parallel, one entry per call in recording order:
    /// `ids[i]` has parent `parents[i]` (0 for the root) and depth
    /// `depths[i]`. Returns `{ grid, adj, pos }`, or throws on a malformed
    /// tree.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(
        &mut self,
        ids: &[u32],
        parents: &[u32],
        depths: &[u32],
        center: bool,
    ) -> std::result::Result<JsValue, JsValue> {
        if ids.len() != parents.len() || ids.len() != depths.len() {
            let msg = format!(
                "computeLayout: array lengths differ (ids {}, parents {}, depths {})",
                ids.len(),
                parents.len(),
                depths.len()
            );
            web_sys::console::warn_1(&msg.as_str().into());
            return Err(JsValue::from_str(&msg));
        }

        let (parent, depth_map) = tree_from_arrays(ids, parents, depths);
        match self.session.compute(&parent, &depth_map, center) {
            Ok(layout) => serde_wasm_bindgen::to_value(layout).map_err(JsValue::from),
            Err(err) => {
                let msg = format!("computeLayout: {err}");
                web_sys::console::warn_1(&msg.as_str().into());
                Err(JsValue::from_str(&msg))
            }
        }
    }

    /// Center the grid on a canvas of the given size.
    #[wasm_bindgen(js_name = centerOnCanvas)]
    pub fn center_on_canvas(&mut self, width: f32, height: f32) {
        self.session.center_on_canvas(width, height);
    }

    /// Number of grid columns.
    #[wasm_bindgen(js_name = gridWidth)]
    pub fn grid_width(&self) -> u32 {
        self.session.layout().grid.width() as u32
    }

    /// Number of grid rows.
    #[wasm_bindgen(js_name = gridHeight)]
    pub fn grid_height(&self) -> u32 {
        self.session.layout().grid.height() as u32
    }

    /// Get a node's grid cell as [row, col].
    #[wasm_bindgen(js_name = getNodeCell)]
    pub fn get_node_cell(&self, node_id: u32) -> Option<Vec<u32>> {
        self.session
            .layout()
            .position(NodeId(node_id))
            .map(|p| vec![p.row as u32, p.col as u32])
    }

    // =========================================================================
    // Canvas Queries
    // =========================================================================

    /// Get a node's canvas center as [x, y].
    #[wasm_bindgen(js_name = nodeCenter)]
    pub fn node_center(&self, node_id: u32) -> Option<Vec<f32>> {
        self.session
            .node_center(NodeId(node_id))
            .map(|(x, y)| vec![x, y])
    }

    /// Node circle radius in pixels.
    #[wasm_bindgen(js_name = nodeRadius)]
    pub fn node_radius(&self) -> f32 {
        self.session.geometry().radius()
    }

    /// Find the node whose circle contains a point.
    #[wasm_bindgen(js_name = findNodeAt)]
    pub fn find_node_at(&self, x: f32, y: f32) -> Option<u32> {
        self.session.find_node_at(x, y).map(NodeId::raw)
    }

    /// Find all nodes whose circles touch a rectangle grown by `margin`.
    ///
    /// Returns a Uint32Array of node IDs.
    #[wasm_bindgen(js_name = findNodesInRect)]
    pub fn find_nodes_in_rect(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        margin: f32,
    ) -> Vec<u32> {
        self.session
            .find_nodes_in_rect(min_x, min_y, max_x, max_y, margin)
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    /// Get parent → child arrows as [x1, y1, x2, y2, ...].
    #[wasm_bindgen(js_name = getEdgeSegments)]
    pub fn get_edge_segments(&self) -> Float32Array {
        Float32Array::from(&self.session.edge_segments()[..])
    }

    /// Drop the current layout.
    pub fn clear(&mut self) {
        self.session.clear();
    }
}

impl Default for StacksproutWasm {
    fn default() -> Self {
        let config = GeometryConfig::default();
        Self::new(config.diameter, config.cell_offset)
    }
}

/// Convert the parallel JS arrays into layout input. Parent 0 means "none".
fn tree_from_arrays(
    ids: &[u32],
    parents: &[u32],
    depths: &[u32],
) -> (Vec<(NodeId, Option<NodeId>)>, HashMap<NodeId, u32>) {
    let parent = ids
        .iter()
        .zip(parents)
        .map(|(&id, &p)| (NodeId(id), (p != 0).then_some(NodeId(p))))
        .collect();
    let depth_map = ids
        .iter()
        .zip(depths)
        .map(|(&id, &d)| (NodeId(id), d))
        .collect();
    (parent, depth_map)
}

#[cfg(test)]
mod integration_tests {
    use std::collections::HashSet;

    use super::*;
    use crate::tree::CallRecorder;

    fn fib(rec: &mut CallRecorder, n: u64) -> u64 {
        rec.enter("fib", n.to_string());
        let out = if n <= 1 { 1 } else { fib(rec, n - 1) + fib(rec, n - 2) };
        rec.exit(out.to_string());
        out
    }

    fn sum_tree(rec: &mut CallRecorder, lo: u32, hi: u32) -> u32 {
        rec.enter("sum", format!("{lo}, {hi}"));
        let out = if lo == hi {
            lo
        } else {
            let mid = (lo + hi) / 2;
            sum_tree(rec, lo, mid) + sum_tree(rec, mid + 1, hi)
        };
        rec.exit(out.to_string());
        out
    }

    /// Every invariant a renderer relies on.
    fn check_layout(tree: &CallTree, out: &TreeGrid) {
        assert_eq!(out.node_count(), tree.len());

        let mut cells = HashSet::new();
        for &node in tree.nodes() {
            let p = out.position(node).expect("every node placed");
            assert_eq!(Some(p.row), tree.row(node));
            assert!(cells.insert((p.row, p.col)), "{node} collides at {p:?}");
            assert_eq!(out.grid.get(p.row, p.col), Some(node));
        }

        for (&node, neighbours) in &out.adj {
            for &other in neighbours {
                assert!(
                    tree.parent(node) == Some(other) || tree.parent(other) == Some(node),
                    "{node} - {other} is not a tree edge"
                );
            }
        }
    }

    /// Full pipeline: recorded calls -> validated tree -> both passes.
    #[test]
    fn test_fib_trace_layout() {
        let mut rec = CallRecorder::new();
        fib(&mut rec, 6);
        let tree = rec.call_tree().unwrap();

        let plain = layout_tree(&tree, false).unwrap();
        let centered = layout_tree(&tree, true).unwrap();
        check_layout(&tree, &plain);
        check_layout(&tree, &centered);

        // Width is the busiest row.
        let widest = tree.row_counts().iter().copied().max().unwrap();
        assert_eq!(plain.grid.width(), widest);
        assert_eq!(centered.grid.width(), widest);
    }

    #[test]
    fn test_balanced_tree_root_over_children() {
        let mut rec = CallRecorder::new();
        sum_tree(&mut rec, 1, 8);
        let tree = rec.call_tree().unwrap();
        let out = layout_tree(&tree, true).unwrap();
        check_layout(&tree, &out);

        let root = tree.root().unwrap();
        let children = tree.children(root);
        let mean = children.iter().map(|&c| out.pos[&c].col).sum::<usize>() / children.len();
        assert_eq!(out.pos[&root].col, mean);
    }

    #[test]
    fn test_non_sequential_ids_and_root_depth() {
        let parent = [
            (NodeId(40), None),
            (NodeId(12), Some(NodeId(40))),
            (NodeId(99), Some(NodeId(40))),
            (NodeId(7), Some(NodeId(99))),
        ];
        let depths = HashMap::from([
            (NodeId(40), 0),
            (NodeId(12), 1),
            (NodeId(99), 1),
            (NodeId(7), 2),
        ]);
        let out = layout(&parent, &depths, true).unwrap();
        let tree = CallTree::new(&parent, &depths).unwrap();
        check_layout(&tree, &out);
        assert_eq!(out.grid.height(), 3);
    }

    #[test]
    fn test_session_matches_free_function() {
        let mut rec = CallRecorder::new();
        fib(&mut rec, 5);

        let mut session = LayoutSession::default();
        let from_session = session
            .compute(&rec.parent_entries(), &rec.depths(), true)
            .unwrap()
            .clone();
        let direct = layout(&rec.parent_entries(), &rec.depths(), true).unwrap();
        assert_eq!(from_session, direct);
    }

    #[test]
    fn test_tree_from_arrays() {
        let (parent, depths) = tree_from_arrays(&[1, 2, 3], &[0, 1, 1], &[1, 2, 2]);
        assert_eq!(
            parent,
            vec![
                (NodeId(1), None),
                (NodeId(2), Some(NodeId(1))),
                (NodeId(3), Some(NodeId(1)))
            ]
        );
        assert_eq!(depths[&NodeId(3)], 2);

        let out = layout(&parent, &depths, true).unwrap();
        assert_eq!(out.grid.width(), 2);
    }

    #[test]
    fn test_large_wide_tree() {
        // Root with 500 children, each with 3 children.
        let mut parent = vec![(NodeId(1), None)];
        let mut depths = HashMap::from([(NodeId(1), 1)]);
        let mut next = 2u32;
        for _ in 0..500 {
            let mid = next;
            parent.push((NodeId(mid), Some(NodeId(1))));
            depths.insert(NodeId(mid), 2);
            next += 1;
            for _ in 0..3 {
                parent.push((NodeId(next), Some(NodeId(mid))));
                depths.insert(NodeId(next), 3);
                next += 1;
            }
        }

        let tree = CallTree::new(&parent, &depths).unwrap();
        let out = layout_tree(&tree, true).unwrap();
        check_layout(&tree, &out);
        assert_eq!(out.grid.width(), 1500);
        assert_eq!(out.grid.height(), 3);
    }
}
