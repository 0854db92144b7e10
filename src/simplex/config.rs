//! Solver configuration and problem-shape auto-configuration.

use tracing::debug;

use crate::graph::CostValue;
use crate::problem::FlowProblem;
use crate::simplex::pivot::PivotRule;

/// Thresholds steering the adaptive block resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveBlockParams {
    /// Hit rates below this count toward shrinking.
    pub low_threshold: f64,
    /// Hit rates above this count toward growing.
    pub high_threshold: f64,
    /// Consecutive one-sided observations required before resizing.
    pub consecutive: u32,
    pub shrink_factor: f64,
    pub grow_factor: f64,
}

impl Default for AdaptiveBlockParams {
    fn default() -> Self {
        Self {
            low_threshold: 0.01,
            high_threshold: 0.1,
            consecutive: 3,
            shrink_factor: 0.75,
            grow_factor: 1.5,
        }
    }
}

/// Configuration of a [`crate::NetworkSimplex`] solve.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub pivot_rule: PivotRule,
    /// Resize the block-search block from observed hit rates.
    pub adaptive_block_size: bool,
    pub adaptive_params: AdaptiveBlockParams,
    /// Lower clamp for the block size; `None` means `max(10, 1%)`.
    pub block_size_floor: Option<usize>,
    /// Cache base reduced costs between pivots. `None` lets the engine
    /// decide from density (`m/n^2 < 0.01` and `m < 10_000`).
    pub reduced_cost_cache: Option<bool>,
}

impl SolverConfig {
    /// Derives a configuration from the shape of the problem and logs the
    /// choice. Set `MCF_VERBOSE=1` in the driver to see the decisions.
    pub fn auto(problem: &FlowProblem<'_>) -> Self {
        let traits = ProblemCharacteristics::analyze(problem);
        debug!(
            density = traits.density,
            max_degree = traits.max_degree,
            mean_degree = traits.mean_degree,
            degree_cv = traits.degree_cv,
            sources = traits.source_count,
            sinks = traits.sink_count,
            cost_min = traits.cost_range.0,
            cost_max = traits.cost_range.1,
            kind = ?traits.kind,
            "analyzed problem characteristics"
        );

        let m = problem.graph().num_arcs();
        let mut config = Self::default();
        match traits.kind {
            // Tiny or highly regular instances pivot better on exact rules.
            _ if m < 1_000 => config.pivot_rule = PivotRule::BestEligible,
            ProblemKind::Assignment => {
                config.pivot_rule = PivotRule::BlockSearch;
                config.adaptive_block_size = true;
            }
            ProblemKind::Transportation | ProblemKind::Circulation | ProblemKind::General => {
                config.pivot_rule = PivotRule::BlockSearch;
                // Irregular degree distributions make fixed blocks miss.
                config.adaptive_block_size = traits.degree_cv > 1.0;
            }
        }
        debug!(
            rule = ?config.pivot_rule,
            adaptive = config.adaptive_block_size,
            "selected pivot configuration"
        );
        config
    }
}

/// Rough structural classification used by [`SolverConfig::auto`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// Bipartite supplies-to-demands with unit supplies and capacities.
    Assignment,
    /// Bipartite supplies-to-demands, no transshipment nodes.
    Transportation,
    /// All supplies zero.
    Circulation,
    General,
}

/// One-shot analysis of the problem shape.
#[derive(Debug, Clone)]
pub struct ProblemCharacteristics {
    /// `m / n^2`.
    pub density: f64,
    pub max_degree: usize,
    pub mean_degree: f64,
    /// Coefficient of variation of the node degrees.
    pub degree_cv: f64,
    pub source_count: usize,
    pub sink_count: usize,
    pub cost_range: (CostValue, CostValue),
    pub kind: ProblemKind,
}

impl ProblemCharacteristics {
    pub fn analyze(problem: &FlowProblem<'_>) -> Self {
        let graph = problem.graph();
        let n = graph.num_nodes();
        let m = graph.num_arcs();

        let mut degree = vec![0usize; n];
        let mut cost_min = CostValue::MAX;
        let mut cost_max = CostValue::MIN;
        for (a, tail, head) in graph.arcs_with_endpoints() {
            degree[tail] += 1;
            degree[head] += 1;
            cost_min = cost_min.min(problem.cost(a));
            cost_max = cost_max.max(problem.cost(a));
        }
        if m == 0 {
            cost_min = 0;
            cost_max = 0;
        }

        let mean_degree = if n == 0 { 0.0 } else { 2.0 * m as f64 / n as f64 };
        let variance = if n == 0 {
            0.0
        } else {
            degree
                .iter()
                .map(|&d| {
                    let diff = d as f64 - mean_degree;
                    diff * diff
                })
                .sum::<f64>()
                / n as f64
        };
        let degree_cv = if mean_degree > 0.0 {
            variance.sqrt() / mean_degree
        } else {
            0.0
        };

        let source_count = problem.supplies().iter().filter(|&&s| s > 0).count();
        let sink_count = problem.supplies().iter().filter(|&&s| s < 0).count();
        let max_degree = degree.iter().copied().max().unwrap_or(0);
        let density = if n == 0 {
            0.0
        } else {
            m as f64 / (n as f64 * n as f64)
        };

        let kind = Self::classify(problem, source_count, sink_count);
        Self {
            density,
            max_degree,
            mean_degree,
            degree_cv,
            source_count,
            sink_count,
            cost_range: (cost_min, cost_max),
            kind,
        }
    }

    fn classify(problem: &FlowProblem<'_>, sources: usize, sinks: usize) -> ProblemKind {
        let graph = problem.graph();
        let n = graph.num_nodes();
        if sources == 0 && sinks == 0 {
            return ProblemKind::Circulation;
        }
        // Bipartite check: every node carries a supply and every arc runs
        // from a source to a sink.
        if sources + sinks == n
            && graph
                .arcs_with_endpoints()
                .all(|(_, tail, head)| problem.supply(tail) > 0 && problem.supply(head) < 0)
        {
            let unit = problem.supplies().iter().all(|&s| s.abs() == 1)
                && graph.arcs().all(|a| problem.upper(a) >= 1);
            if unit && sources == sinks {
                return ProblemKind::Assignment;
            }
            return ProblemKind::Transportation;
        }
        ProblemKind::General
    }
}
