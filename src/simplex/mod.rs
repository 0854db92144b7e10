//! Primal network simplex over an explicit spanning-tree basis.
//!
//! The engine canonicalizes the problem (lower bounds shifted away,
//! artificial arcs to a virtual root), then pivots until no entering arc has
//! negative reduced cost: pick an entering arc, find the join node of the
//! induced cycle, select the leaving arc from the cycle residuals, augment,
//! splice the displaced subtree back into the preorder thread and shift the
//! potentials of that subtree. Termination is `Optimal` exactly when the
//! high-cost artificial block carries no flow.

mod canonical;
mod config;
mod pivot;
mod tree;

pub use self::config::{AdaptiveBlockParams, ProblemCharacteristics, ProblemKind, SolverConfig};
pub use self::pivot::PivotRule;

use tracing::{debug, warn};

use self::canonical::{canonicalize, CanonicalForm, InvertedBounds};
use self::pivot::EnteringArcSearch;
use self::tree::{SpanningTree, DIR_DOWN, DIR_UP, NONE, STATE_LOWER, STATE_TREE, STATE_UPPER};
use crate::error::StateError;
use crate::graph::{ArcIndex, CostValue, FlowQuantity, NodeIndex, INFINITE};
use crate::problem::{FlowProblem, Status, SupplyType};
use crate::solution::Solution;

/// Primal network simplex solver.
///
/// The solver borrows the problem read-only and owns every working buffer
/// exclusively for the duration of a [`NetworkSimplex::solve`] call. Solving
/// the same problem twice produces identical flows.
#[derive(Debug)]
pub struct NetworkSimplex<'a> {
    problem: &'a FlowProblem<'a>,
    config: SolverConfig,
    status: Status,
    flows: Vec<FlowQuantity>,
    potentials: Vec<CostValue>,
}

impl<'a> NetworkSimplex<'a> {
    /// Creates a solver with the default configuration.
    pub fn new(problem: &'a FlowProblem<'a>) -> Self {
        Self::with_config(problem, SolverConfig::default())
    }

    /// Creates a solver with an explicit configuration.
    pub fn with_config(problem: &'a FlowProblem<'a>, config: SolverConfig) -> Self {
        Self {
            problem,
            config,
            status: Status::NotSolved,
            flows: Vec::new(),
            potentials: Vec::new(),
        }
    }

    /// Creates a solver configured from the shape of the problem.
    pub fn auto_configured(problem: &'a FlowProblem<'a>) -> Self {
        let config = SolverConfig::auto(problem);
        Self::with_config(problem, config)
    }

    /// Runs the simplex loop and returns the final status.
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

        let (c, tree) = match canonicalize(self.problem) {
            Ok(pair) => pair,
            Err(InvertedBounds(arc)) => {
                debug!(arc, "arc has inverted bounds");
                return Status::Infeasible;
            }
        };

        let use_cache = match self.config.reduced_cost_cache {
            Some(choice) => choice,
            None => {
                let density = m as f64 / (n as f64 * n as f64);
                density < 0.01 && m < 10_000
            }
        };
        let search = EnteringArcSearch::for_config(&self.config, &c, use_cache);
        debug!(
            nodes = n,
            arcs = m,
            rule = ?self.config.pivot_rule,
            cached = use_cache,
            "starting network simplex"
        );

        let mut core = Core {
            c,
            t: tree,
            search,
            in_arc: NONE,
            join: NONE,
            u_in: NONE,
            v_in: NONE,
            u_out: NONE,
            delta: 0,
            dirty_revs: Vec::new(),
            touched: Vec::new(),
        };

        let pivot_limit = (n as u64).saturating_mul(m as u64).max(1_000_000);
        let mut pivots: u64 = 0;
        while let Some(in_arc) = core.search.find_entering_arc(&core.c) {
            pivots += 1;
            if pivots > pivot_limit {
                warn!(
                    pivots,
                    limit = pivot_limit,
                    "pivot limit exceeded, reporting infeasible"
                );
                return Status::Infeasible;
            }
            core.in_arc = in_arc;
            core.find_join_node();
            let change = core.find_leaving_arc();
            if core.delta >= INFINITE {
                return Status::Unbounded;
            }
            core.change_flow(change);
            if change {
                core.update_tree_structure();
                core.update_potential();
                #[cfg(any(test, feature = "debug-checks"))]
                core.t
                    .check_integrity(core.c.root)
                    .expect("spanning tree corrupted by pivot");
            }
        }
        debug!(pivots, "simplex converged");

        // The high-cost artificial block must be drained; any leftover flow
        // there means some supply could not reach a demand.
        for e in core.c.search_arc_num..core.c.all_arc_num {
            if core.c.flow[e] != 0 {
                return Status::Infeasible;
            }
        }

        self.extract(&core.c);
        Status::Optimal
    }

    /// Copies the solved flows and potentials back into original terms.
    fn extract(&mut self, c: &CanonicalForm) {
        let n = c.node_num;
        self.flows = (0..c.arc_num)
            .map(|a| c.flow[a] + c.orig_lower[a])
            .collect();
        let mut pis: Vec<CostValue> = c.pi[..n].to_vec();
        // Balanced instances admit the stricter sign convention on duals.
        if c.sum_supply == 0 {
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
    }
}

/// Working state of one solve call: canonical arrays, tree and pivot cursor.
struct Core {
    c: CanonicalForm,
    t: SpanningTree,
    search: EnteringArcSearch,
    in_arc: ArcIndex,
    join: NodeIndex,
    u_in: NodeIndex,
    v_in: NodeIndex,
    u_out: NodeIndex,
    delta: FlowQuantity,
    dirty_revs: Vec<NodeIndex>,
    touched: Vec<NodeIndex>,
}

impl Core {
    /// Lowest common ancestor of the entering arc's endpoints, found by
    /// walking up from the smaller subtree on each step.
    fn find_join_node(&mut self) {
        let mut u = self.c.source[self.in_arc];
        let mut v = self.c.target[self.in_arc];
        while u != v {
            if self.t.succ_num[u] < self.t.succ_num[v] {
                u = self.t.parent[u];
            } else {
                v = self.t.parent[v];
            }
        }
        self.join = u;
    }

    /// Finds the arc of the pivot cycle with the smallest residual and the
    /// amount `delta` the cycle can carry. Returns whether a tree arc leaves
    /// the basis (`false` means the entering arc merely flips bound).
    ///
    /// The cycle is oriented along the entering arc; on the `first` side the
    /// augmentation runs parent-to-child, on the `second` side child-to-
    /// parent, which decides whether a tree arc drains (`flow`) or fills
    /// (`cap - flow`). Ties between the sides resolve to the second side.
    fn find_leaving_arc(&mut self) -> bool {
        let (first, second) = if self.c.state[self.in_arc] == STATE_LOWER {
            (self.c.source[self.in_arc], self.c.target[self.in_arc])
        } else {
            (self.c.target[self.in_arc], self.c.source[self.in_arc])
        };
        self.delta = self.c.cap[self.in_arc];
        let mut result = 0u8;

        let mut u = first;
        while u != self.join {
            let e = self.t.pred[u];
            let mut d = self.c.flow[e];
            if self.t.pred_dir[u] == DIR_DOWN {
                let cap = self.c.cap[e];
                d = if cap >= INFINITE { INFINITE } else { cap - d };
            }
            if d < self.delta {
                self.delta = d;
                self.u_out = u;
                result = 1;
            }
            u = self.t.parent[u];
        }

        let mut u = second;
        while u != self.join {
            let e = self.t.pred[u];
            let mut d = self.c.flow[e];
            if self.t.pred_dir[u] == DIR_UP {
                let cap = self.c.cap[e];
                d = if cap >= INFINITE { INFINITE } else { cap - d };
            }
            if d <= self.delta {
                self.delta = d;
                self.u_out = u;
                result = 2;
            }
            u = self.t.parent[u];
        }

        if result == 1 {
            self.u_in = first;
            self.v_in = second;
        } else {
            self.u_in = second;
            self.v_in = first;
        }
        result != 0
    }

    /// Augments `delta` around the cycle and updates the arc states.
    fn change_flow(&mut self, change: bool) {
        if self.delta > 0 {
            let val = self.c.state[self.in_arc] as FlowQuantity * self.delta;
            self.c.flow[self.in_arc] += val;
            let mut u = self.c.source[self.in_arc];
            while u != self.join {
                self.c.flow[self.t.pred[u]] -= self.t.pred_dir[u] as FlowQuantity * val;
                u = self.t.parent[u];
            }
            let mut u = self.c.target[self.in_arc];
            while u != self.join {
                self.c.flow[self.t.pred[u]] += self.t.pred_dir[u] as FlowQuantity * val;
                u = self.t.parent[u];
            }
        }
        if change {
            self.c.state[self.in_arc] = STATE_TREE;
            let leaving = self.t.pred[self.u_out];
            self.c.state[leaving] = if self.c.flow[leaving] == 0 {
                STATE_LOWER
            } else {
                STATE_UPPER
            };
        } else {
            self.c.state[self.in_arc] = -self.c.state[self.in_arc];
        }
    }

    /// Splices the subtree torn off at `u_out` back in under `v_in`, with
    /// `u_in` as its new root. Parents and predecessor arcs reverse along
    /// the stem between the two; the preorder thread is patched in place and
    /// subtree sizes and last-successor pointers are fixed along the two
    /// affected root paths.
    fn update_tree_structure(&mut self) {
        let t = &mut self.t;
        let old_rev_thread = t.rev_thread[self.u_out];
        let old_succ_num = t.succ_num[self.u_out];
        let old_last_succ = t.last_succ[self.u_out];
        let v_out = t.parent[self.u_out];

        if self.u_in == self.u_out {
            // The whole torn-off subtree re-attaches unchanged.
            t.parent[self.u_in] = self.v_in;
            t.pred[self.u_in] = self.in_arc;
            t.pred_dir[self.u_in] = if self.u_in == self.c.source[self.in_arc] {
                DIR_UP
            } else {
                DIR_DOWN
            };

            if t.thread[self.v_in] != self.u_out {
                let after = t.thread[old_last_succ];
                t.thread[old_rev_thread] = after;
                t.rev_thread[after] = old_rev_thread;
                let after = t.thread[self.v_in];
                t.thread[self.v_in] = self.u_out;
                t.rev_thread[self.u_out] = self.v_in;
                t.thread[old_last_succ] = after;
                t.rev_thread[after] = old_last_succ;
            }
        } else {
            // Where the preorder continues once the subtree is cut out.
            let thread_continue = if old_rev_thread == self.v_in {
                t.thread[old_last_succ]
            } else {
                t.thread[self.v_in]
            };

            // Walk the stem from u_in up to u_out, re-parenting each node
            // and stitching its remaining subtree into the new preorder.
            let mut stem = self.u_in;
            let mut par_stem = self.v_in;
            let mut last = t.last_succ[self.u_in];
            let mut after = t.thread[last];
            t.thread[self.v_in] = self.u_in;
            self.dirty_revs.clear();
            self.dirty_revs.push(self.v_in);
            while stem != self.u_out {
                let next_stem = t.parent[stem];
                t.thread[last] = next_stem;
                self.dirty_revs.push(last);

                // Unhook the stem node's span from the old thread.
                let before = t.rev_thread[stem];
                t.thread[before] = after;
                t.rev_thread[after] = before;

                t.parent[stem] = par_stem;
                par_stem = stem;
                stem = next_stem;

                // Tail of the next stem node's span, excluding the part
                // that already moved with par_stem.
                last = if t.last_succ[stem] == t.last_succ[par_stem] {
                    t.rev_thread[par_stem]
                } else {
                    t.last_succ[stem]
                };
                after = t.thread[last];
            }
            t.parent[self.u_out] = par_stem;

            t.thread[last] = thread_continue;
            t.rev_thread[thread_continue] = last;

            // Close the gap the subtree left behind.
            if old_rev_thread != self.v_in {
                t.thread[old_rev_thread] = after;
                t.rev_thread[after] = old_rev_thread;
            }

            for i in 0..self.dirty_revs.len() {
                let u = self.dirty_revs[i];
                t.rev_thread[t.thread[u]] = u;
            }

            // Predecessor arcs shift one step down the reversed stem; sizes
            // rebuild from the top, every stem node now ends at the same
            // preorder tail.
            let stem_last = last;
            let mut tmp_sc = 0usize;
            let mut u = self.u_out;
            t.last_succ[u] = stem_last;
            while u != self.u_in {
                let p = t.parent[u];
                t.pred[u] = t.pred[p];
                t.pred_dir[u] = -t.pred_dir[p];
                tmp_sc += t.succ_num[u] - t.succ_num[p];
                t.succ_num[u] = tmp_sc;
                t.last_succ[p] = stem_last;
                u = p;
            }
            t.pred[self.u_in] = self.in_arc;
            t.pred_dir[self.u_in] = if self.u_in == self.c.source[self.in_arc] {
                DIR_UP
            } else {
                DIR_DOWN
            };
            t.succ_num[self.u_in] = old_succ_num;
        }

        // Fix last_succ on the path above v_in: ancestors whose preorder
        // ended at v_in now end at the re-attached subtree's tail.
        let up_limit_out = if t.last_succ[self.join] == self.v_in {
            self.join
        } else {
            NONE
        };
        let last_succ_out = t.last_succ[self.u_out];
        let mut u = self.v_in;
        while u != NONE && t.last_succ[u] == self.v_in {
            t.last_succ[u] = last_succ_out;
            u = t.parent[u];
        }

        // Fix last_succ on the path above v_out: ancestors whose preorder
        // ended inside the removed subtree now end just before its old
        // position, unless the subtree re-attached into the same run.
        if self.join != old_rev_thread && self.v_in != old_rev_thread {
            let mut u = v_out;
            while u != up_limit_out && t.last_succ[u] == old_last_succ {
                t.last_succ[u] = old_rev_thread;
                u = t.parent[u];
            }
        } else if last_succ_out != old_last_succ {
            let mut u = v_out;
            while u != up_limit_out && t.last_succ[u] == old_last_succ {
                t.last_succ[u] = last_succ_out;
                u = t.parent[u];
            }
        }

        // The subtree changed sides: sizes grow along v_in's root path and
        // shrink along v_out's, both up to the join.
        let mut u = self.v_in;
        while u != self.join {
            t.succ_num[u] += old_succ_num;
            u = t.parent[u];
        }
        let mut u = v_out;
        while u != self.join {
            t.succ_num[u] -= old_succ_num;
            u = t.parent[u];
        }
    }

    /// Shifts the potentials of the re-attached subtree so the entering arc
    /// becomes a zero-reduced-cost tree arc.
    fn update_potential(&mut self) {
        let sigma = self.c.pi[self.v_in]
            - self.c.pi[self.u_in]
            - self.t.pred_dir[self.u_in] as CostValue * self.c.cost[self.in_arc];
        let collect = self.search.wants_touched_nodes();
        self.touched.clear();
        let end = self.t.thread[self.t.last_succ[self.u_in]];
        let mut u = self.u_in;
        while u != end {
            self.c.pi[u] += sigma;
            if collect {
                self.touched.push(u);
            }
            u = self.t.thread[u];
        }
        if collect {
            let (c, search, touched) = (&self.c, &mut self.search, &self.touched);
            search.potentials_updated(c, touched);
        }
    }
}
