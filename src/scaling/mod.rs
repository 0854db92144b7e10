//! Push-relabel cost-scaling engine.
//!
//! Costs are scaled by `n + 1` so that ε-optimality at `ε = 1` implies exact
//! optimality for integer data. The outer loop shrinks ε by the scaling
//! factor α each phase; a phase first saturates every residual arc whose
//! reduced cost dropped to `-ε` or below, then drains all positive excess
//! with one of three inner loops: single-arc pushes with push-look-ahead,
//! full augmenting paths, or partial augmenting paths capped at four arcs.
//!
//! Supplies and demands attach to an artificial root: demand slack rides
//! zero-cost root arcs (so under-served demand is expressible under `Geq`
//! semantics), stranded supply escapes over high-cost arcs whose residual
//! flow at termination proves infeasibility, and uncapacitated arcs get a
//! finite surrogate capacity whose saturation at negative reduced cost
//! proves unboundedness.

mod residual;

use std::collections::VecDeque;

use tracing::debug;

use self::residual::{PairSpec, PairTag, ResidualNetwork};
use crate::error::StateError;
use crate::graph::{CostValue, FlowQuantity, NodeIndex, INFINITE};
use crate::problem::{FlowProblem, Status, SupplyType};
use crate::solution::Solution;

/// Inner-loop variant of the cost-scaling engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScalingMethod {
    /// Local pushes with push-look-ahead and hyper-node relabeling.
    Push,
    /// Augment along admissible paths all the way to a deficit.
    Augment,
    /// Augment along admissible paths of bounded length.
    #[default]
    PartialAugment,
}

/// Path-length cap of [`ScalingMethod::PartialAugment`].
const MAX_PARTIAL_PATH_LENGTH: usize = 4;

/// Cost-scaling minimum-cost flow solver.
///
/// Shares the problem model and solution surface with
/// [`crate::NetworkSimplex`]; the two agree on the optimal cost on every
/// instance both solve to `Optimal` (flows may differ between engines when
/// alternate optima exist).
#[derive(Debug)]
pub struct CostScaling<'a> {
    problem: &'a FlowProblem<'a>,
    method: ScalingMethod,
    alpha: CostValue,
    status: Status,
    flows: Vec<FlowQuantity>,
    potentials: Vec<CostValue>,
}

impl<'a> CostScaling<'a> {
    /// Creates a solver using the default partial-augment method.
    pub fn new(problem: &'a FlowProblem<'a>) -> Self {
        Self::with_method(problem, ScalingMethod::default())
    }

    /// Creates a solver with an explicit inner-loop method.
    pub fn with_method(problem: &'a FlowProblem<'a>, method: ScalingMethod) -> Self {
        Self {
            problem,
            method,
            alpha: 8,
            status: Status::NotSolved,
            flows: Vec::new(),
            potentials: Vec::new(),
        }
    }

    /// Sets the ε-scaling factor, clamped to `[4, 16]`.
    pub fn set_scaling_factor(&mut self, alpha: CostValue) {
        self.alpha = alpha.clamp(4, 16);
    }

    /// Runs the scaling loop and returns the final status.
    pub fn solve(&mut self) -> Status {
        self.status = self.run();
        self.status
    }

    /// Returns the status of the last solve, `NotSolved` before the first.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the solution view, or a state violation while the status is
    /// anything other than `Optimal`.
    pub fn solution(&self) -> Result<Solution<'_>, StateError> {
        if self.status == Status::Optimal {
            Ok(Solution::new(
                self.problem.graph(),
                &self.flows,
                &self.potentials,
                self.problem.costs(),
            ))
        } else {
            Err(StateError { status: self.status })
        }
    }

    fn run(&mut self) -> Status {
        let graph = self.problem.graph();
        let n = graph.num_nodes();
        let m = graph.num_arcs();
        self.flows.clear();
        self.potentials.clear();
        if n == 0 {
            return Status::Optimal;
        }
        for a in 0..m {
            if self.problem.upper(a) < self.problem.lower(a) {
                return Status::Infeasible;
            }
        }

        // `Leq` solves as `Geq` on the reversed graph with negated supplies:
        // reversing every arc turns the per-node inequality around while
        // flows and costs carry over arc-for-arc.
        let reversed = self.problem.supply_type() == SupplyType::Leq;

        // Lower-bound shift in the effective frame.
        let mut supply: Vec<FlowQuantity> = (0..n)
            .map(|u| {
                let s = self.problem.supply(u);
                if reversed {
                    -s
                } else {
                    s
                }
            })
            .collect();
        let endpoints: Vec<(NodeIndex, NodeIndex)> = graph
            .arcs_with_endpoints()
            .map(|(_, tail, head)| if reversed { (head, tail) } else { (tail, head) })
            .collect();
        for (a, &(tail, head)) in endpoints.iter().enumerate() {
            let lower = self.problem.lower(a);
            if lower != 0 {
                supply[tail] -= lower;
                supply[head] += lower;
            }
        }
        let sum_supply: FlowQuantity = supply.iter().sum();
        if sum_supply > 0 {
            return Status::Infeasible;
        }

        let max_abs_cost = (0..m)
            .map(|a| self.problem.cost(a).abs())
            .max()
            .unwrap_or(0);
        let art_cost = ((max_abs_cost + 1).saturating_mul(n as CostValue)).min(INFINITE);
        let scale = (n + 1) as CostValue;

        // A flow decomposition of any bounded optimum fits under the total
        // supply plus the finite capacities, so this cap never binds unless
        // the instance is unbounded.
        let mut surrogate: i128 = 0;
        for u in 0..n {
            if supply[u] > 0 {
                surrogate += supply[u] as i128;
            }
        }
        for a in 0..m {
            let upper = self.problem.upper(a);
            if upper < INFINITE {
                surrogate += (upper - self.problem.lower(a)) as i128;
            }
        }
        let surrogate = surrogate.clamp(1, INFINITE as i128) as FlowQuantity;

        let root = n;
        let mut pairs = Vec::with_capacity(m + n);
        for (a, &(tail, head)) in endpoints.iter().enumerate() {
            let upper = self.problem.upper(a);
            let (cap, tag) = if upper >= INFINITE {
                (surrogate, PairTag::Surrogate(a))
            } else {
                (upper - self.problem.lower(a), PairTag::Real(a))
            };
            pairs.push(PairSpec {
                source: tail,
                target: head,
                cap,
                cost: self.problem.cost(a).saturating_mul(scale),
                tag,
            });
        }
        for (u, &s) in supply.iter().enumerate() {
            if s > 0 {
                pairs.push(PairSpec {
                    source: u,
                    target: root,
                    cap: s,
                    cost: art_cost.saturating_mul(scale),
                    tag: PairTag::Escape,
                });
            } else if s < 0 {
                pairs.push(PairSpec {
                    source: root,
                    target: u,
                    cap: -s,
                    cost: 0,
                    tag: PairTag::Slack,
                });
            }
        }
        let net = ResidualNetwork::build(n + 1, root, m, &pairs);

        let mut excess = supply;
        excess.push(-sum_supply);
        let sup_node_num = excess[..n].iter().filter(|&&e| e > 0).count();

        let epsilon0 = net.cost.iter().map(|c| c.abs()).max().unwrap_or(0).max(1);
        let update_factor = match self.method {
            ScalingMethod::Push => 2.0,
            ScalingMethod::Augment | ScalingMethod::PartialAugment => 1.0,
        };
        let update_skip =
            (((n + 1 + sup_node_num * sup_node_num) as f64) * update_factor).ceil() as u64;

        debug!(
            nodes = n,
            arcs = m,
            method = ?self.method,
            alpha = self.alpha,
            epsilon0,
            sup_nodes = sup_node_num,
            "starting cost scaling"
        );

        let total_arcs = net.res_cap.len();
        let node_slots = net.node_num;
        let max_rank = (self.alpha as usize) * node_slots;
        let mut rt = Runtime {
            net,
            excess,
            pi: vec![0; node_slots],
            next_out: vec![0; node_slots],
            active: VecDeque::new(),
            hyper: vec![false; node_slots],
            hyper_cost: vec![0; node_slots],
            path: Vec::new(),
            path_arc: vec![false; total_arcs],
            rank: vec![0; node_slots],
            buckets: vec![node_slots; max_rank.max(1)],
            bucket_next: vec![0; node_slots + 1],
            bucket_prev: vec![0; node_slots + 1],
            max_rank,
            relabel_count: 0,
            next_update: update_skip,
            update_skip,
        };

        let mut epsilon = epsilon0;
        let mut first = true;
        loop {
            epsilon = (epsilon / self.alpha).max(1);
            rt.init_phase(epsilon, first);
            first = false;
            match self.method {
                ScalingMethod::Push => rt.phase_push(epsilon),
                ScalingMethod::Augment => rt.phase_augment(epsilon, n.max(1)),
                ScalingMethod::PartialAugment => {
                    rt.phase_augment(epsilon, MAX_PARTIAL_PATH_LENGTH)
                }
            }
            if epsilon == 1 {
                break;
            }
        }

        // Supply that had to take an escape arc never fit through the real
        // network.
        for &a in &rt.net.escape_arcs {
            if rt.net.res_cap[a] != rt.net.cap[a] {
                return Status::Infeasible;
            }
        }

        let duals = rt.exact_potentials(scale);

        // A saturated surrogate capacity that is still underpriced marks an
        // uncapacitated negative cycle.
        for &a in &rt.net.surrogate_arcs {
            if rt.net.res_cap[a] == 0 {
                let u = rt.net.source[a];
                let v = rt.net.target[a];
                let c = rt.net.cost[a] / scale;
                if c + duals[u] - duals[v] < 0 {
                    return Status::Unbounded;
                }
            }
        }

        self.flows = (0..m)
            .map(|a| rt.net.flow_on(rt.net.forward_of[a]) + self.problem.lower(a))
            .collect();
        let mut pis: Vec<CostValue> = duals[..n].to_vec();
        if reversed {
            for p in &mut pis {
                *p = -*p;
            }
        }
        if sum_supply == 0 {
            match self.problem.supply_type() {
                SupplyType::Geq => {
                    let max = pis.iter().copied().max().unwrap_or(0);
                    if max > 0 {
                        for p in &mut pis {
                            *p -= max;
                        }
                    }
                }
                SupplyType::Leq => {
                    let min = pis.iter().copied().min().unwrap_or(0);
                    if min < 0 {
                        for p in &mut pis {
                            *p -= min;
                        }
                    }
                }
            }
        }
        self.potentials = pis;
        Status::Optimal
    }
}

/// Mutable working state of one solve call.
struct Runtime {
    net: ResidualNetwork,
    excess: Vec<FlowQuantity>,
    pi: Vec<CostValue>,
    next_out: Vec<usize>,
    active: VecDeque<NodeIndex>,
    hyper: Vec<bool>,
    hyper_cost: Vec<CostValue>,
    path: Vec<usize>,
    path_arc: Vec<bool>,
    rank: Vec<usize>,
    buckets: Vec<usize>,
    bucket_next: Vec<usize>,
    bucket_prev: Vec<usize>,
    max_rank: usize,
    relabel_count: u64,
    next_update: u64,
    update_skip: u64,
}

impl Runtime {
    fn push_flow(&mut self, a: usize, amount: FlowQuantity) {
        self.net.res_cap[a] -= amount;
        let r = self.net.reverse[a];
        self.net.res_cap[r] += amount;
        self.excess[self.net.source[a]] -= amount;
        self.excess[self.net.target[a]] += amount;
    }

    #[inline]
    fn reduced_cost(&self, a: usize) -> CostValue {
        self.net.cost[a] + self.pi[self.net.source[a]] - self.pi[self.net.target[a]]
    }

    /// Restores ε-optimality at the start of a phase and rebuilds the
    /// active-node queue. The first phase additionally pushes the root's
    /// surplus out over its zero-cost slack arcs.
    fn init_phase(&mut self, epsilon: CostValue, first: bool) {
        if first {
            for a in self.net.out_arcs(self.net.root) {
                let delta = self.net.res_cap[a];
                if delta > 0 {
                    self.push_flow(a, delta);
                }
            }
        }
        for a in 0..self.net.res_cap.len() {
            if self.net.res_cap[a] > 0 && self.reduced_cost(a) <= -epsilon {
                let delta = self.net.res_cap[a];
                self.push_flow(a, delta);
            }
        }
        for u in 0..self.net.node_num {
            self.next_out[u] = self.net.first_out[u];
            self.hyper[u] = false;
        }
        self.active.clear();
        for u in 0..self.net.node_num {
            if u != self.net.root && self.excess[u] > 0 {
                self.active.push_back(u);
            }
        }
    }

    /// FIFO push/relabel with push-look-ahead. A target that cannot absorb
    /// or forward what we are about to send gets only that much, is marked
    /// hyper and jumps the queue so it is relabeled first.
    fn phase_push(&mut self, epsilon: CostValue) {
        while let Some(&u) = self.active.front() {
            let last = self.net.first_out[u + 1];
            let mut defer_relabel = false;

            if self.excess[u] > 0 {
                let mut a = self.next_out[u];
                while self.excess[u] > 0 && a < last {
                    if self.net.res_cap[a] == 0 {
                        a += 1;
                        continue;
                    }
                    let rc = self.reduced_cost(a);
                    if rc >= 0 {
                        a += 1;
                        continue;
                    }
                    let t = self.net.target[a];
                    let delta = self.excess[u].min(self.net.res_cap[a]);

                    let mut ahead = -self.excess[t];
                    let t_last = self.net.first_out[t + 1];
                    let mut ta = self.next_out[t];
                    while ta < t_last && ahead < delta {
                        if self.net.res_cap[ta] > 0 && self.reduced_cost(ta) < 0 {
                            ahead += self.net.res_cap[ta];
                        }
                        ta += 1;
                    }
                    let ahead = ahead.max(0);

                    if ahead < delta && !self.hyper[t] {
                        if ahead > 0 {
                            self.push_flow(a, ahead);
                        }
                        self.hyper[t] = true;
                        self.hyper_cost[t] = rc;
                        self.active.push_front(t);
                        defer_relabel = true;
                        break;
                    }

                    self.push_flow(a, delta);
                    if t != self.net.root && self.excess[t] > 0 && self.excess[t] <= delta {
                        self.active.push_back(t);
                    }
                    if self.net.res_cap[a] == 0 {
                        a += 1;
                    }
                }
                self.next_out[u] = a;
            }

            if !defer_relabel && (self.excess[u] > 0 || self.hyper[u]) {
                self.relabel(u, epsilon);
                self.maybe_global_update(epsilon);
            }

            while let Some(&front) = self.active.front() {
                if self.excess[front] <= 0 && !self.hyper[front] {
                    self.active.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    /// Grow an admissible path from an active node until a deficit node or
    /// the length cap, relabeling and stepping back at dead ends, then
    /// augment as much excess as the path carries.
    fn phase_augment(&mut self, epsilon: CostValue, max_length: usize) {
        loop {
            while let Some(&front) = self.active.front() {
                if self.excess[front] <= 0 {
                    self.active.pop_front();
                } else {
                    break;
                }
            }
            let Some(&start) = self.active.front() else {
                break;
            };

            let mut tip = start;
            while self.path.len() < max_length && self.excess[tip] >= 0 {
                let last = self.net.first_out[tip + 1];
                let mut min_rc = CostValue::MAX;
                let mut found = None;
                let mut a = self.next_out[tip];
                while a < last {
                    if self.net.res_cap[a] > 0 {
                        let rc = self.reduced_cost(a);
                        if rc < 0 {
                            found = Some(a);
                            break;
                        }
                        if rc < min_rc {
                            min_rc = rc;
                        }
                    }
                    a += 1;
                }

                if let Some(a) = found {
                    self.next_out[tip] = a;
                    if self.path_arc[a] {
                        // The path closed into an admissible cycle; augment
                        // immediately to cancel it.
                        break;
                    }
                    self.path_arc[a] = true;
                    self.path.push(a);
                    tip = self.net.target[a];
                    continue;
                }

                // Dead end: fold in the arcs the cursor skipped, keep the
                // incoming arc's reversal as a cap, relabel and step back.
                for a in self.net.first_out[tip]..self.next_out[tip] {
                    if self.net.res_cap[a] > 0 {
                        let rc = self.reduced_cost(a);
                        if rc < min_rc {
                            min_rc = rc;
                        }
                    }
                }
                if tip != start {
                    let ra = self.net.reverse[*self.path.last().expect("non-empty path")];
                    let rc = self.reduced_cost(ra);
                    if rc < min_rc {
                        min_rc = rc;
                    }
                }
                if min_rc < CostValue::MAX {
                    self.pi[tip] -= min_rc + epsilon;
                }
                self.next_out[tip] = self.net.first_out[tip];
                self.relabel_count += 1;
                if tip != start {
                    let popped = self.path.pop().expect("non-empty path");
                    self.path_arc[popped] = false;
                    tip = match self.path.last() {
                        Some(&prev) => self.net.target[prev],
                        None => start,
                    };
                }
            }

            let mut u = start;
            for i in 0..self.path.len() {
                let a = self.path[i];
                let delta = self.net.res_cap[a].min(self.excess[u]);
                let v = self.net.target[a];
                if delta > 0 {
                    self.push_flow(a, delta);
                    if v != self.net.root && self.excess[v] > 0 && self.excess[v] <= delta {
                        self.active.push_back(v);
                    }
                }
                self.path_arc[a] = false;
                u = v;
            }
            self.path.clear();
            self.maybe_global_update(epsilon);
        }
    }

    /// Drops the node's potential just far enough that its cheapest
    /// residual arc becomes admissible at `-ε`.
    fn relabel(&mut self, u: NodeIndex, epsilon: CostValue) {
        let mut min_rc = if self.hyper[u] {
            -self.hyper_cost[u]
        } else {
            CostValue::MAX
        };
        for a in self.net.out_arcs(u) {
            if self.net.res_cap[a] > 0 {
                let rc = self.reduced_cost(a);
                if rc < min_rc {
                    min_rc = rc;
                }
            }
        }
        debug_assert!(min_rc < CostValue::MAX, "relabel of a node with no residual arc");
        if min_rc < CostValue::MAX {
            self.pi[u] -= min_rc + epsilon;
        }
        self.next_out[u] = self.net.first_out[u];
        self.hyper[u] = false;
        self.relabel_count += 1;
    }

    fn maybe_global_update(&mut self, epsilon: CostValue) {
        if self.relabel_count >= self.next_update {
            self.global_update(epsilon);
            for h in &mut self.hyper {
                *h = false;
            }
            self.next_update += self.update_skip;
        }
    }

    /// Bucket-based re-pricing: rank every node by its ε-step distance to a
    /// deficit through the residual network, then drop each potential by
    /// its rank. Keeps ε-optimality while collapsing long relabel chains.
    fn global_update(&mut self, epsilon: CostValue) {
        let node_num = self.net.node_num;
        let bucket_end = node_num; // sentinel slot in the intrusive lists
        for slot in &mut self.buckets {
            *slot = bucket_end;
        }

        let mut total_excess: FlowQuantity = 0;
        let mut b0 = bucket_end;
        for u in 0..node_num {
            if self.excess[u] < 0 {
                self.rank[u] = 0;
                self.bucket_next[u] = b0;
                self.bucket_prev[b0] = u;
                b0 = u;
            } else {
                total_excess += self.excess[u];
                self.rank[u] = self.max_rank;
            }
        }
        if total_excess == 0 {
            return;
        }
        self.buckets[0] = b0;

        let mut r = 0usize;
        'search: while r < self.max_rank {
            while self.buckets[r] != bucket_end {
                let u = self.buckets[r];
                self.buckets[r] = self.bucket_next[u];

                // Every arc into u appears as the reverse of one out of u.
                for a in self.net.out_arcs(u) {
                    let ra = self.net.reverse[a];
                    if self.net.res_cap[ra] == 0 {
                        continue;
                    }
                    let v = self.net.source[ra];
                    let old_rank = self.rank[v];
                    if r >= old_rank {
                        continue;
                    }
                    let steps = (self.net.cost[ra] + self.pi[v] - self.pi[u]) / epsilon;
                    let new_rank = if steps < self.max_rank as CostValue {
                        ((r as CostValue + 1 + steps).max(0) as usize).min(old_rank)
                    } else {
                        old_rank
                    };
                    if new_rank < old_rank {
                        self.rank[v] = new_rank;
                        if old_rank < self.max_rank {
                            if self.buckets[old_rank] == v {
                                self.buckets[old_rank] = self.bucket_next[v];
                            } else {
                                let pv = self.bucket_prev[v];
                                let nv = self.bucket_next[v];
                                self.bucket_next[pv] = nv;
                                self.bucket_prev[nv] = pv;
                            }
                        }
                        let head = self.buckets[new_rank];
                        self.bucket_next[v] = head;
                        self.bucket_prev[head] = v;
                        self.buckets[new_rank] = v;
                    }
                }

                if self.excess[u] > 0 {
                    total_excess -= self.excess[u];
                    if total_excess <= 0 {
                        break 'search;
                    }
                }
            }
            r += 1;
        }

        let reached = r.min(self.max_rank);
        for u in 0..node_num {
            let k = self.rank[u].min(reached);
            if k > 0 {
                self.pi[u] -= epsilon * k as CostValue;
                self.next_out[u] = self.net.first_out[u];
            }
        }
    }

    /// Exact duals from the final residual network: zero-initialized
    /// Bellman-Ford over the original (unscaled) costs converges because an
    /// optimal residual network has no negative cycle.
    fn exact_potentials(&self, scale: CostValue) -> Vec<CostValue> {
        let node_num = self.net.node_num;
        let mut dist = vec![0 as CostValue; node_num];
        for _ in 0..=node_num {
            let mut changed = false;
            for a in 0..self.net.res_cap.len() {
                if self.net.res_cap[a] > 0 {
                    let u = self.net.source[a];
                    let v = self.net.target[a];
                    let c = self.net.cost[a] / scale;
                    if dist[u] + c < dist[v] {
                        dist[v] = dist[u] + c;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiGraph;

    fn solve<'a>(problem: &'a FlowProblem<'a>, method: ScalingMethod) -> CostScaling<'a> {
        let mut solver = CostScaling::with_method(problem, method);
        solver.solve();
        solver
    }

    const ALL_METHODS: [ScalingMethod; 3] = [
        ScalingMethod::Push,
        ScalingMethod::Augment,
        ScalingMethod::PartialAugment,
    ];

    #[test]
    fn two_by_two_transport() {
        let mut graph = DiGraph::new(4);
        graph.add_arc(0, 2);
        graph.add_arc(0, 3);
        graph.add_arc(1, 2);
        graph.add_arc(1, 3);
        let mut problem = FlowProblem::new(&graph);
        for (u, s) in [(0, 10), (1, 15), (2, -12), (3, -13)] {
            problem.set_node_supply(u, s).unwrap();
        }
        for (a, c) in [(0, 3), (1, 5), (2, 4), (3, 2)] {
            problem.set_arc_unit_cost(a, c).unwrap();
        }

        for method in ALL_METHODS {
            let solver = solve(&problem, method);
            assert_eq!(solver.status(), Status::Optimal, "{method:?}");
            let solution = solver.solution().unwrap();
            assert_eq!(solution.total_cost(), 64, "{method:?}");
            assert_eq!(solution.flows(), &[10, 0, 2, 13], "{method:?}");
        }
    }

    #[test]
    fn negative_cost_circulation_fills_the_cycle() {
        let mut graph = DiGraph::new(3);
        graph.add_arc(0, 1);
        graph.add_arc(1, 2);
        graph.add_arc(2, 0);
        let mut problem = FlowProblem::new(&graph);
        for (a, c) in [(0, 2), (1, 3), (2, -6)] {
            problem.set_arc_unit_cost(a, c).unwrap();
        }
        for a in 0..3 {
            problem.set_arc_capacity(a, 10).unwrap();
        }

        for method in ALL_METHODS {
            let solver = solve(&problem, method);
            let solution = solver.solution().unwrap();
            assert_eq!(solution.total_cost(), -10, "{method:?}");
            assert_eq!(solution.flows(), &[10, 10, 10], "{method:?}");
        }
    }

    #[test]
    fn uncapacitated_negative_cycle_is_unbounded() {
        let mut graph = DiGraph::new(3);
        graph.add_arc(0, 1);
        graph.add_arc(1, 2);
        graph.add_arc(2, 0);
        let mut problem = FlowProblem::new(&graph);
        for (a, c) in [(0, 2), (1, 3), (2, -6)] {
            problem.set_arc_unit_cost(a, c).unwrap();
        }

        for method in ALL_METHODS {
            let mut solver = CostScaling::with_method(&problem, method);
            assert_eq!(solver.solve(), Status::Unbounded, "{method:?}");
        }
    }

    #[test]
    fn lower_bounds_shift_into_the_solution() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 10).unwrap();
        problem.set_node_supply(1, -10).unwrap();
        problem.set_arc_bounds(0, 5, 15).unwrap();
        problem.set_arc_unit_cost(0, 1).unwrap();

        let solver = solve(&problem, ScalingMethod::PartialAugment);
        let solution = solver.solution().unwrap();
        assert_eq!(solution.flow(0), 10);
        assert_eq!(solution.total_cost(), 10);
    }

    #[test]
    fn capacity_shortfall_is_infeasible() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 10).unwrap();
        problem.set_node_supply(1, -10).unwrap();
        problem.set_arc_capacity(0, 5).unwrap();

        for method in ALL_METHODS {
            let mut solver = CostScaling::with_method(&problem, method);
            assert_eq!(solver.solve(), Status::Infeasible, "{method:?}");
            assert!(solver.solution().is_err());
        }
    }

    #[test]
    fn chain_accumulates_path_costs() {
        let mut graph = DiGraph::new(5);
        for u in 0..4 {
            graph.add_arc(u, u + 1);
        }
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 100).unwrap();
        problem.set_node_supply(4, -100).unwrap();
        for a in 0..4 {
            problem.set_arc_unit_cost(a, 1).unwrap();
        }

        for method in ALL_METHODS {
            let solver = solve(&problem, method);
            assert_eq!(solver.solution().unwrap().total_cost(), 400, "{method:?}");
        }
    }

    #[test]
    fn geq_oversupply_is_rejected_before_the_residual_build() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 10).unwrap();
        problem.set_node_supply(1, -5).unwrap();

        let mut solver = CostScaling::new(&problem);
        assert_eq!(solver.solve(), Status::Infeasible);
    }

    #[test]
    fn geq_allows_unmet_demand() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 5).unwrap();
        problem.set_node_supply(1, -10).unwrap();
        problem.set_arc_unit_cost(0, 2).unwrap();

        let solver = solve(&problem, ScalingMethod::PartialAugment);
        assert_eq!(solver.status(), Status::Optimal);
        let solution = solver.solution().unwrap();
        assert_eq!(solution.flow(0), 5);
        assert_eq!(solution.total_cost(), 10);
    }

    #[test]
    fn leq_solves_on_the_reversed_frame() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_supply_type(SupplyType::Leq);
        problem.set_node_supply(0, 10).unwrap();
        problem.set_node_supply(1, -5).unwrap();
        problem.set_arc_unit_cost(0, 3).unwrap();

        let solver = solve(&problem, ScalingMethod::PartialAugment);
        assert_eq!(solver.status(), Status::Optimal);
        let solution = solver.solution().unwrap();
        assert_eq!(solution.flow(0), 5);
        assert_eq!(solution.total_cost(), 15);
    }

    #[test]
    fn scaling_factor_is_clamped() {
        let graph = DiGraph::new(1);
        let problem = FlowProblem::new(&graph);
        let mut solver = CostScaling::new(&problem);
        solver.set_scaling_factor(100);
        assert_eq!(solver.alpha, 16);
        solver.set_scaling_factor(2);
        assert_eq!(solver.alpha, 4);
    }

    #[test]
    fn methods_agree_on_a_dense_instance() {
        let mut graph = DiGraph::new(6);
        let arcs = [
            (0, 2),
            (0, 3),
            (1, 2),
            (1, 3),
            (2, 4),
            (2, 5),
            (3, 4),
            (3, 5),
            (1, 4),
        ];
        for (u, v) in arcs {
            graph.add_arc(u, v);
        }
        let mut problem = FlowProblem::new(&graph);
        for (u, s) in [(0, 11), (1, 9), (4, -8), (5, -12)] {
            problem.set_node_supply(u, s).unwrap();
        }
        for (a, c) in [
            (0, 4),
            (1, 1),
            (2, 2),
            (3, 6),
            (4, 3),
            (5, 5),
            (6, 2),
            (7, 1),
            (8, 7),
        ] {
            problem.set_arc_unit_cost(a, c).unwrap();
        }
        for a in 0..arcs.len() {
            problem.set_arc_capacity(a, 12).unwrap();
        }

        let costs: Vec<_> = ALL_METHODS
            .iter()
            .map(|&method| {
                let solver = solve(&problem, method);
                assert_eq!(solver.status(), Status::Optimal, "{method:?}");
                solver.solution().unwrap().total_cost()
            })
            .collect();
        assert!(costs.windows(2).all(|w| w[0] == w[1]), "{costs:?}");
    }
}
