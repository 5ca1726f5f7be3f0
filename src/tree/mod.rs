//! Call tree input.
//!
//! This module holds what the layout consumes: the node identifier, the
//! validated `CallTree`, and a `CallRecorder` that builds one from nested
//! enter/exit events.

mod call_tree;
mod node;
mod recorder;

pub use call_tree::CallTree;
pub use node::NodeId;
pub use recorder::{CallRecord, CallRecorder};
