//! Spatial lookup of rendered nodes.
//!
//! Node centers and radii belong to the presentation layer, not to the grid
//! layout. This module keeps them in an R-tree keyed by `NodeId`, filled from
//! a finished layout, for hit testing and viewport culling.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
