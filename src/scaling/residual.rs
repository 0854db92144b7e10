//! Residual network for the cost-scaling engine.
//!
//! Forward and backward copies of every arc live in one compact CSR layout
//! sorted by source node, with a `reverse` permutation pairing the copies.
//! Built once per solve; only `res_cap` changes afterwards.

use crate::graph::{ArcIndex, CostValue, FlowQuantity, NodeIndex};

/// Role of an arc pair in the extended network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairTag {
    /// Copy of a real problem arc.
    Real(ArcIndex),
    /// Capacity was replaced by a finite surrogate; the original is
    /// uncapacitated. Carries the real arc index.
    Surrogate(ArcIndex),
    /// Zero-cost slack between the root and a node.
    Slack,
    /// High-cost escape routing otherwise stranded supply to the root.
    Escape,
}

/// One directed pair request: forward `(source, target)` with the given
/// residual capacity and scaled cost, plus an empty backward copy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairSpec {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub cap: FlowQuantity,
    pub cost: CostValue,
    pub tag: PairTag,
}

#[derive(Debug, Clone)]
pub(crate) struct ResidualNetwork {
    pub node_num: usize,
    pub root: NodeIndex,
    /// CSR offsets, `node_num + 1` entries.
    pub first_out: Vec<usize>,
    pub source: Vec<NodeIndex>,
    pub target: Vec<NodeIndex>,
    /// Position of the paired opposite copy.
    pub reverse: Vec<usize>,
    /// Capacity of each copy (forward: arc capacity, backward: zero).
    pub cap: Vec<FlowQuantity>,
    pub res_cap: Vec<FlowQuantity>,
    /// Cost scaled by `n + 1`; backward copies carry the negation.
    pub cost: Vec<CostValue>,
    /// Forward-copy position of each real arc.
    pub forward_of: Vec<usize>,
    /// Forward-copy positions of escape pairs.
    pub escape_arcs: Vec<usize>,
    /// Forward-copy positions of surrogate-capped pairs.
    pub surrogate_arcs: Vec<usize>,
}

impl ResidualNetwork {
    /// Lays the pairs out in CSR order. `arc_num` is the number of real
    /// problem arcs (for the `forward_of` table).
    pub fn build(node_num: usize, root: NodeIndex, arc_num: usize, pairs: &[PairSpec]) -> Self {
        let total = pairs.len() * 2;
        let mut degree = vec![0usize; node_num + 1];
        for pair in pairs {
            degree[pair.source] += 1;
            degree[pair.target] += 1;
        }
        let mut first_out = vec![0usize; node_num + 1];
        for u in 0..node_num {
            first_out[u + 1] = first_out[u] + degree[u];
        }

        let mut net = Self {
            node_num,
            root,
            first_out: first_out.clone(),
            source: vec![0; total],
            target: vec![0; total],
            reverse: vec![0; total],
            cap: vec![0; total],
            res_cap: vec![0; total],
            cost: vec![0; total],
            forward_of: vec![0; arc_num],
            escape_arcs: Vec::new(),
            surrogate_arcs: Vec::new(),
        };

        let mut cursor = first_out;
        for pair in pairs {
            let fwd = cursor[pair.source];
            cursor[pair.source] += 1;
            let bwd = cursor[pair.target];
            cursor[pair.target] += 1;

            net.source[fwd] = pair.source;
            net.target[fwd] = pair.target;
            net.cap[fwd] = pair.cap;
            net.res_cap[fwd] = pair.cap;
            net.cost[fwd] = pair.cost;

            net.source[bwd] = pair.target;
            net.target[bwd] = pair.source;
            net.cap[bwd] = 0;
            net.res_cap[bwd] = 0;
            net.cost[bwd] = -pair.cost;

            net.reverse[fwd] = bwd;
            net.reverse[bwd] = fwd;

            match pair.tag {
                PairTag::Real(a) => net.forward_of[a] = fwd,
                PairTag::Surrogate(a) => {
                    net.forward_of[a] = fwd;
                    net.surrogate_arcs.push(fwd);
                }
                PairTag::Slack => {}
                PairTag::Escape => net.escape_arcs.push(fwd),
            }
        }
        net
    }

    /// Arc positions leaving `u`.
    #[inline]
    pub fn out_arcs(&self, u: NodeIndex) -> std::ops::Range<usize> {
        self.first_out[u]..self.first_out[u + 1]
    }

    /// Flow currently on the forward copy of a pair.
    #[inline]
    pub fn flow_on(&self, fwd: usize) -> FlowQuantity {
        self.res_cap[self.reverse[fwd]]
    }
}
