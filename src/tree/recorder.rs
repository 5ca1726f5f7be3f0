//! Recording of nested calls into a call tree.
//!
//! The recorder is driven from the outside: the instrumented function calls
//! `enter` on the way in and `exit` on the way out. Ids are handed out
//! sequentially from 1, the root sits at depth 1, and every enter/exit ticks a
//! logical clock so a renderer can replay the calls in order.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::tree::{CallTree, NodeId};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    /// Rendered arguments.
    pub args: String,
    /// Nesting depth, 1 for the outermost call.
    pub depth: u32,
    pub in_time: u64,
    /// None while the call is still running.
    pub out_time: Option<u64>,
    pub result: Option<String>,
}

/// Builds a call tree one enter/exit at a time.
#[derive(Debug, Default)]
pub struct CallRecorder {
    next_id: u32,
    timer: u64,
    /// Indices into `calls` of the calls currently running.
    stack: Vec<usize>,
    calls: Vec<CallRecord>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a call and return its id.
    ///
    /// Starting a new outermost call discards the previous recording.
    pub fn enter(&mut self, name: impl Into<String>, args: impl Into<String>) -> NodeId {
        if self.stack.is_empty() {
            self.next_id = 0;
            self.timer = 0;
            self.calls.clear();
        }

        self.next_id += 1;
        self.timer += 1;
        let id = NodeId(self.next_id);
        let parent = self.stack.last().map(|&i| self.calls[i].id);

        self.calls.push(CallRecord {
            id,
            parent,
            name: name.into(),
            args: args.into(),
            depth: self.stack.len() as u32 + 1,
            in_time: self.timer,
            out_time: None,
            result: None,
        });
        self.stack.push(self.calls.len() - 1);
        id
    }

    /// Record the end of the innermost running call.
    ///
    /// Returns the id of the call that ended, or None if nothing was running.
    pub fn exit(&mut self, result: impl Into<String>) -> Option<NodeId> {
        let i = self.stack.pop()?;
        self.timer += 1;
        let call = &mut self.calls[i];
        call.out_time = Some(self.timer);
        call.result = Some(result.into());
        Some(call.id)
    }

    /// Whether a call is still running.
    pub fn is_recording(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Recorded calls in id order.
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn get(&self, id: NodeId) -> Option<&CallRecord> {
        let i = (id.raw() as usize).checked_sub(1)?;
        self.calls.get(i)
    }

    /// Node → parent entries in recording order.
    pub fn parent_entries(&self) -> Vec<(NodeId, Option<NodeId>)> {
        self.calls.iter().map(|c| (c.id, c.parent)).collect()
    }

    pub fn depths(&self) -> HashMap<NodeId, u32> {
        self.calls.iter().map(|c| (c.id, c.depth)).collect()
    }

    /// Validate the recording as a call tree.
    pub fn call_tree(&self) -> Result<CallTree> {
        CallTree::new(&self.parent_entries(), &self.depths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fib(rec: &mut CallRecorder, n: u64) -> u64 {
        rec.enter("fib", n.to_string());
        let out = if n <= 1 { 1 } else { fib(rec, n - 1) + fib(rec, n - 2) };
        rec.exit(out.to_string());
        out
    }

    #[test]
    fn test_records_nesting() {
        let mut rec = CallRecorder::new();
        let a = rec.enter("f", "3");
        let b = rec.enter("f", "2");
        assert_eq!(rec.exit("1"), Some(b));
        let c = rec.enter("f", "1");
        assert_eq!(rec.exit("1"), Some(c));
        assert_eq!(rec.exit("2"), Some(a));
        assert!(!rec.is_recording());

        assert_eq!((a, b, c), (NodeId(1), NodeId(2), NodeId(3)));
        assert_eq!(
            rec.parent_entries(),
            vec![(a, None), (b, Some(a)), (c, Some(a))]
        );

        let root = rec.get(a).unwrap();
        assert_eq!(root.depth, 1);
        assert_eq!(root.in_time, 1);
        assert_eq!(root.out_time, Some(6));
        assert_eq!(root.result.as_deref(), Some("2"));
        assert_eq!(rec.get(c).unwrap().depth, 2);
    }

    #[test]
    fn test_exit_without_enter() {
        let mut rec = CallRecorder::new();
        assert_eq!(rec.exit("x"), None);
        assert!(rec.calls().is_empty());
        assert!(rec.get(NodeId(0)).is_none());
    }

    #[test]
    fn test_new_outer_call_resets() {
        let mut rec = CallRecorder::new();
        fib(&mut rec, 3);
        assert_eq!(rec.calls().len(), 5);

        fib(&mut rec, 1);
        assert_eq!(rec.calls().len(), 1);
        assert_eq!(rec.calls()[0].id, NodeId(1));
        assert_eq!(rec.calls()[0].in_time, 1);
    }

    #[test]
    fn test_recording_forms_valid_tree() {
        let mut rec = CallRecorder::new();
        fib(&mut rec, 6);

        let tree = rec.call_tree().unwrap();
        assert_eq!(tree.len(), 25);
        assert_eq!(tree.root(), Some(NodeId(1)));
        assert_eq!(tree.height(), 6);
    }
}
