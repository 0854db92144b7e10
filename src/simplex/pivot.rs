//! Entering-arc rules for the simplex pivot loop.
//!
//! Each rule is a strategy value created once per solve; its cursor state
//! survives across pivots so ties are broken deterministically by arc index
//! and cursor position. The search window covers the original arcs plus the
//! first artificial block (`search_arc_num` arcs in total).

use tracing::trace;

use crate::graph::{ArcIndex, CostValue, NodeIndex};
use crate::simplex::canonical::CanonicalForm;
use crate::simplex::config::{AdaptiveBlockParams, SolverConfig};
use crate::simplex::tree::NONE;

/// Entering-arc selection strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PivotRule {
    /// Scan in blocks of roughly `sqrt(search_arc_num)` arcs, returning the
    /// most negative arc of the first block that contains one.
    #[default]
    BlockSearch,
    /// Return the first arc with negative reduced cost after the cursor.
    FirstEligible,
    /// Scan every candidate arc and return the globally most negative.
    BestEligible,
}

/// Default block-size floor: `max(10, 1% of the search window)`.
pub(crate) fn default_block_floor(search_arc_num: usize) -> usize {
    10.max(search_arc_num / 100)
}

fn initial_block_size(search_arc_num: usize, floor: usize) -> usize {
    let sqrt = (search_arc_num as f64).sqrt().ceil() as usize;
    sqrt.max(floor).max(1)
}

/// Consecutive-hit-rate tracker that resizes the scan block.
#[derive(Debug, Clone)]
pub(crate) struct AdaptiveBlock {
    params: AdaptiveBlockParams,
    min_block: usize,
    max_block: usize,
    cons_low: u32,
    cons_high: u32,
}

impl AdaptiveBlock {
    fn new(params: AdaptiveBlockParams, min_block: usize, max_block: usize) -> Self {
        Self {
            params,
            min_block,
            max_block,
            cons_low: 0,
            cons_high: 0,
        }
    }

    /// Feeds the arc count of one successful search and returns the block
    /// size to use from the next pivot on.
    fn observe(&mut self, arcs_scanned: usize, block_size: usize) -> usize {
        let hit_rate = 1.0 / arcs_scanned.max(1) as f64;
        if hit_rate < self.params.low_threshold {
            self.cons_low += 1;
            self.cons_high = 0;
            if self.cons_low >= self.params.consecutive {
                self.cons_low = 0;
                let shrunk = (block_size as f64 * self.params.shrink_factor) as usize;
                let next = shrunk.max(self.min_block);
                if next != block_size {
                    trace!(from = block_size, to = next, "shrinking pivot block");
                }
                return next;
            }
        } else if hit_rate > self.params.high_threshold {
            self.cons_high += 1;
            self.cons_low = 0;
            if self.cons_high >= self.params.consecutive {
                self.cons_high = 0;
                let grown = (block_size as f64 * self.params.grow_factor).ceil() as usize;
                let next = grown.min(self.max_block);
                if next != block_size {
                    trace!(from = block_size, to = next, "growing pivot block");
                }
                return next;
            }
        } else {
            self.cons_low = 0;
            self.cons_high = 0;
        }
        block_size
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BlockSearch {
    block_size: usize,
    next_arc: ArcIndex,
    adaptive: Option<AdaptiveBlock>,
}

impl BlockSearch {
    pub fn new(search_arc_num: usize, config: &SolverConfig) -> Self {
        let floor = config
            .block_size_floor
            .unwrap_or_else(|| default_block_floor(search_arc_num));
        let block_size = initial_block_size(search_arc_num, floor);
        let adaptive = config
            .adaptive_block_size
            .then(|| AdaptiveBlock::new(config.adaptive_params, floor.max(1), search_arc_num.max(1)));
        Self {
            block_size,
            next_arc: 0,
            adaptive,
        }
    }

    fn find<F>(&mut self, search_arc_num: usize, signed_reduced_cost: F) -> Option<ArcIndex>
    where
        F: Fn(ArcIndex) -> CostValue,
    {
        if search_arc_num == 0 {
            return None;
        }
        let mut min: CostValue = 0;
        let mut in_arc = NONE;
        let mut countdown = self.block_size;
        let mut scanned = 0usize;
        for e in (self.next_arc..search_arc_num).chain(0..self.next_arc) {
            scanned += 1;
            let rc = signed_reduced_cost(e);
            if rc < min {
                min = rc;
                in_arc = e;
            }
            countdown -= 1;
            if countdown == 0 {
                if min < 0 {
                    break;
                }
                countdown = self.block_size;
            }
        }
        if in_arc == NONE {
            return None;
        }
        self.next_arc = (in_arc + 1) % search_arc_num;
        if let Some(adaptive) = &mut self.adaptive {
            self.block_size = adaptive.observe(scanned, self.block_size);
        }
        Some(in_arc)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FirstEligible {
    next_arc: ArcIndex,
}

impl FirstEligible {
    fn find(&mut self, c: &CanonicalForm) -> Option<ArcIndex> {
        let s = c.search_arc_num;
        if s == 0 {
            return None;
        }
        for e in (self.next_arc..s).chain(0..self.next_arc) {
            if c.signed_reduced_cost(e) < 0 {
                self.next_arc = (e + 1) % s;
                return Some(e);
            }
        }
        None
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BestEligible;

impl BestEligible {
    fn find(&mut self, c: &CanonicalForm) -> Option<ArcIndex> {
        let mut min: CostValue = 0;
        let mut in_arc = NONE;
        for e in 0..c.search_arc_num {
            let rc = c.signed_reduced_cost(e);
            if rc < min {
                min = rc;
                in_arc = e;
            }
        }
        (in_arc != NONE).then_some(in_arc)
    }
}

/// Block search over cached base reduced costs, refreshed only for arcs
/// incident to nodes whose potential changed in the last pivot. Worth the
/// bookkeeping on sparse instances only; the engine gates it on density.
#[derive(Debug, Clone)]
pub(crate) struct CachedBlockSearch {
    inner: BlockSearch,
    /// `cost + pi[source] - pi[target]` per search arc, unsigned by state.
    base: Vec<CostValue>,
    out_arcs: Vec<Vec<ArcIndex>>,
    in_arcs: Vec<Vec<ArcIndex>>,
}

impl CachedBlockSearch {
    pub fn new(c: &CanonicalForm, config: &SolverConfig) -> Self {
        let mut base = vec![0; c.search_arc_num];
        let mut out_arcs = vec![Vec::new(); c.node_num + 1];
        let mut in_arcs = vec![Vec::new(); c.node_num + 1];
        for (e, slot) in base.iter_mut().enumerate() {
            *slot = c.cost[e] + c.pi[c.source[e]] - c.pi[c.target[e]];
            out_arcs[c.source[e]].push(e);
            in_arcs[c.target[e]].push(e);
        }
        Self {
            inner: BlockSearch::new(c.search_arc_num, config),
            base,
            out_arcs,
            in_arcs,
        }
    }

    fn refresh(&mut self, c: &CanonicalForm, touched: &[NodeIndex]) {
        for &u in touched {
            for list in [&self.out_arcs[u], &self.in_arcs[u]] {
                for &e in list {
                    self.base[e] = c.cost[e] + c.pi[c.source[e]] - c.pi[c.target[e]];
                }
            }
        }
    }
}

/// The strategy object the engine drives. Selected once per solve and never
/// switched mid-run, so cursor state stays consistent.
#[derive(Debug, Clone)]
pub(crate) enum EnteringArcSearch {
    Block(BlockSearch),
    First(FirstEligible),
    Best(BestEligible),
    CachedBlock(CachedBlockSearch),
}

impl EnteringArcSearch {
    pub fn for_config(config: &SolverConfig, c: &CanonicalForm, use_cache: bool) -> Self {
        match config.pivot_rule {
            PivotRule::BlockSearch if use_cache => {
                Self::CachedBlock(CachedBlockSearch::new(c, config))
            }
            PivotRule::BlockSearch => Self::Block(BlockSearch::new(c.search_arc_num, config)),
            PivotRule::FirstEligible => Self::First(FirstEligible { next_arc: 0 }),
            PivotRule::BestEligible => Self::Best(BestEligible),
        }
    }

    /// Finds an eligible entering arc, or `None` when the basis is optimal.
    pub fn find_entering_arc(&mut self, c: &CanonicalForm) -> Option<ArcIndex> {
        match self {
            Self::Block(rule) => {
                rule.find(c.search_arc_num, |e| c.signed_reduced_cost(e))
            }
            Self::First(rule) => rule.find(c),
            Self::Best(rule) => rule.find(c),
            Self::CachedBlock(rule) => {
                let base = &rule.base;
                let state = &c.state;
                rule.inner
                    .find(c.search_arc_num, |e| state[e] as CostValue * base[e])
            }
        }
    }

    /// Whether the engine needs to report potential updates back.
    pub fn wants_touched_nodes(&self) -> bool {
        matches!(self, Self::CachedBlock(_))
    }

    /// Refreshes cached reduced costs for arcs incident to `touched`.
    pub fn potentials_updated(&mut self, c: &CanonicalForm, touched: &[NodeIndex]) {
        if let Self::CachedBlock(rule) = self {
            rule.refresh(c, touched);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiGraph;
    use crate::problem::FlowProblem;
    use crate::simplex::canonical::canonicalize;
    use crate::simplex::tree::STATE_LOWER;

    /// Canonical form of a triangle with one negative-cost arc.
    fn triangle() -> CanonicalForm {
        let mut graph = DiGraph::new(3);
        graph.add_arc(0, 1);
        graph.add_arc(1, 2);
        graph.add_arc(2, 0);
        let mut problem = FlowProblem::new(&graph);
        problem.set_arc_unit_cost(0, 2).unwrap();
        problem.set_arc_unit_cost(1, 3).unwrap();
        problem.set_arc_unit_cost(2, -6).unwrap();
        for a in 0..3 {
            problem.set_arc_capacity(a, 10).unwrap();
        }
        let (c, _) = canonicalize(&problem).unwrap();
        c
    }

    #[test]
    fn block_search_returns_the_negative_arc() {
        let c = triangle();
        let mut rule = EnteringArcSearch::for_config(&SolverConfig::default(), &c, false);
        // All supplies are zero, so every artificial arc has zero reduced
        // cost and the only eligible arc is the cost -6 one.
        assert_eq!(rule.find_entering_arc(&c), Some(2));
    }

    #[test]
    fn first_eligible_advances_its_cursor() {
        let mut c = triangle();
        // Make two arcs eligible by faking lowered potentials downstream.
        c.pi[1] = 5;
        let eligible: Vec<_> = (0..c.search_arc_num)
            .filter(|&e| c.signed_reduced_cost(e) < 0)
            .collect();
        assert!(eligible.len() >= 2);

        let config = SolverConfig {
            pivot_rule: PivotRule::FirstEligible,
            ..SolverConfig::default()
        };
        let mut rule = EnteringArcSearch::for_config(&config, &c, false);
        let first = rule.find_entering_arc(&c).unwrap();
        let second = rule.find_entering_arc(&c).unwrap();
        assert_eq!(first, eligible[0]);
        // Cursor moved past the first hit instead of rescanning it.
        assert_ne!(second, first);
    }

    #[test]
    fn best_eligible_picks_the_most_negative() {
        let mut c = triangle();
        c.pi[1] = 5; // arc 0 now has reduced cost -3, arc 2 stays at -6
        let config = SolverConfig {
            pivot_rule: PivotRule::BestEligible,
            ..SolverConfig::default()
        };
        let mut rule = EnteringArcSearch::for_config(&config, &c, false);
        assert_eq!(rule.find_entering_arc(&c), Some(2));
    }

    #[test]
    fn exhausted_search_reports_optimality() {
        let mut c = triangle();
        c.cost[2] = 6; // no negative reduced cost anywhere
        for e in 0..c.search_arc_num {
            assert!(c.state[e] != STATE_LOWER || c.signed_reduced_cost(e) >= 0);
        }
        let mut rule = EnteringArcSearch::for_config(&SolverConfig::default(), &c, false);
        assert_eq!(rule.find_entering_arc(&c), None);
    }

    #[test]
    fn cached_rule_tracks_potential_updates() {
        let mut c = triangle();
        let mut rule = EnteringArcSearch::for_config(&SolverConfig::default(), &c, true);
        assert!(rule.wants_touched_nodes());
        assert_eq!(rule.find_entering_arc(&c), Some(2));

        // Raise pi[0] so arc 2 (2 -> 0) stops being eligible; the cache only
        // notices once the engine reports node 0 as touched.
        c.pi[0] = -10;
        rule.potentials_updated(&c, &[0]);
        let found = rule.find_entering_arc(&c);
        assert_ne!(found, Some(2));
    }

    #[test]
    fn adaptive_block_shrinks_after_consecutive_cold_scans() {
        let params = AdaptiveBlockParams::default();
        let mut adaptive = AdaptiveBlock::new(params, 10, 10_000);
        let mut block = 1000;
        for _ in 0..params.consecutive {
            block = adaptive.observe(500, block); // hit rate 0.002 < 0.01
        }
        assert_eq!(block, 750);

        // Three hot scans in a row grow it back.
        let mut hot = block;
        for _ in 0..params.consecutive {
            hot = adaptive.observe(5, hot); // hit rate 0.2 > 0.1
        }
        assert_eq!(hot, 1125);
    }
}
