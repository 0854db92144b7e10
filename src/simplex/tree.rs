//! Spanning-tree store for the network simplex basis.
//!
//! The tree is kept as parallel index arrays over the `n + 1` nodes (the
//! real nodes plus the artificial root): parent links, predecessor arcs with
//! their orientation, the cyclic preorder thread with its inverse, subtree
//! sizes and last preorder successors. An arena-plus-index layout keeps the
//! pivot loops on stable cache lines; there are no node objects.

use crate::graph::{ArcIndex, NodeIndex};

/// Nil sentinel for parent/pred links (the root has neither).
pub(crate) const NONE: usize = usize::MAX;

/// The predecessor arc points from child to parent.
pub(crate) const DIR_UP: i8 = 1;
/// The predecessor arc points from parent to child.
pub(crate) const DIR_DOWN: i8 = -1;

/// Non-tree arc resting at its lower bound.
pub(crate) const STATE_LOWER: i8 = 1;
/// Basic arc.
pub(crate) const STATE_TREE: i8 = 0;
/// Non-tree arc resting at its upper bound.
pub(crate) const STATE_UPPER: i8 = -1;

#[derive(Debug, Clone)]
pub(crate) struct SpanningTree {
    /// Parent of each node; `NONE` for the root.
    pub parent: Vec<NodeIndex>,
    /// Arc connecting each node to its parent; `NONE` for the root.
    pub pred: Vec<ArcIndex>,
    /// Orientation of `pred` relative to the parent link.
    pub pred_dir: Vec<i8>,
    /// Successor in the cyclic preorder traversal.
    pub thread: Vec<NodeIndex>,
    /// Inverse of `thread`.
    pub rev_thread: Vec<NodeIndex>,
    /// Number of nodes in the subtree rooted at each node, inclusive.
    pub succ_num: Vec<usize>,
    /// Last node of each subtree in preorder.
    pub last_succ: Vec<NodeIndex>,
}

impl SpanningTree {
    /// Allocates zeroed storage for `all_node_num` nodes (real nodes plus
    /// the root). The canonicalizer fills in the initial basis.
    pub fn with_nodes(all_node_num: usize) -> Self {
        Self {
            parent: vec![NONE; all_node_num],
            pred: vec![NONE; all_node_num],
            pred_dir: vec![0; all_node_num],
            thread: vec![0; all_node_num],
            rev_thread: vec![0; all_node_num],
            succ_num: vec![0; all_node_num],
            last_succ: vec![0; all_node_num],
        }
    }

    /// Number of node slots, including the root.
    #[cfg(any(test, feature = "debug-checks"))]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Walks the preorder thread once around and checks every structural
    /// invariant: the thread is a single cycle visiting each subtree
    /// contiguously, `rev_thread` is its inverse, `succ_num` counts subtree
    /// nodes and `last_succ` is the final preorder descendant.
    #[cfg(any(test, feature = "debug-checks"))]
    pub fn check_integrity(&self, root: NodeIndex) -> Result<(), String> {
        let n = self.len();
        if self.parent[root] != NONE || self.pred[root] != NONE {
            return Err("root must not have a parent link".into());
        }

        // Thread must be a permutation forming a single cycle.
        let mut seen = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut u = root;
        for _ in 0..n {
            if seen[u] {
                return Err(format!("thread revisits node {u} before closing the cycle"));
            }
            seen[u] = true;
            order.push(u);
            if self.rev_thread[self.thread[u]] != u {
                return Err(format!("rev_thread is not the inverse of thread at {u}"));
            }
            u = self.thread[u];
        }
        if u != root {
            return Err("thread does not close into a single cycle".into());
        }

        // Preorder positions let subtree claims be checked as ranges.
        let mut pos = vec![0usize; n];
        for (i, &v) in order.iter().enumerate() {
            pos[v] = i;
        }
        for v in 0..n {
            if v != root {
                let p = self.parent[v];
                if p == NONE || self.pred[v] == NONE {
                    return Err(format!("non-root node {v} lacks a parent link"));
                }
                if pos[p] >= pos[v] {
                    return Err(format!("parent {p} does not precede {v} in preorder"));
                }
            }
            let first = pos[v];
            let last = pos[self.last_succ[v]];
            if last < first || last - first + 1 != self.succ_num[v] {
                return Err(format!(
                    "subtree of {v} claims {} nodes but spans preorder [{first}, {last}]",
                    self.succ_num[v]
                ));
            }
            // Every node in the claimed range must descend from v.
            for &w in &order[first..=last] {
                let mut x = w;
                let mut hops = 0;
                while x != v {
                    x = self.parent[x];
                    hops += 1;
                    if x == NONE || hops > n {
                        return Err(format!("{w} lies in the preorder span of {v} but is not its descendant"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-built tree: root 3 with children 0 and 2, node 1 under 0.
    /// Preorder: 3, 0, 1, 2.
    fn sample() -> SpanningTree {
        let mut t = SpanningTree::with_nodes(4);
        t.parent = vec![3, 0, 3, NONE];
        t.pred = vec![10, 11, 12, NONE];
        t.pred_dir = vec![DIR_UP, DIR_DOWN, DIR_UP, 0];
        t.thread = vec![1, 2, 3, 0];
        t.rev_thread = vec![3, 0, 1, 2];
        t.succ_num = vec![2, 1, 1, 4];
        t.last_succ = vec![1, 1, 2, 2];
        t
    }

    #[test]
    fn integrity_accepts_a_consistent_tree() {
        sample().check_integrity(3).unwrap();
    }

    #[test]
    fn integrity_rejects_a_broken_thread() {
        let mut t = sample();
        t.thread.swap(0, 1);
        assert!(t.check_integrity(3).is_err());
    }

    #[test]
    fn integrity_rejects_a_wrong_subtree_size() {
        let mut t = sample();
        t.succ_num[0] = 3;
        assert!(t.check_integrity(3).is_err());
    }

    #[test]
    fn integrity_rejects_a_wrong_last_successor() {
        let mut t = sample();
        t.last_succ[0] = 0;
        assert!(t.check_integrity(3).is_err());
    }
}
