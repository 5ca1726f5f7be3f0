//! Node identifier for recorded calls.
//!
//! Every recorded call gets a positive, unique id. Ids are dense in practice
//! (the recorder hands them out sequentially) but the layout never relies on
//! that.

use std::fmt;

use serde::Serialize;

/// Identifier of one call in the tree.
///
/// Wraps a u32 for cheap copies and WebAssembly interop. The value 0 is
/// reserved as the "no parent" marker at the JS boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is the reserved id 0.
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}
