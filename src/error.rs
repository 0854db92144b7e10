//! Error types shared by the problem model and the solvers.

use crate::graph::{ArcIndex, CostValue, FlowQuantity, NodeIndex};
use crate::problem::Status;

/// Invalid input reported immediately by the [`crate::FlowProblem`] setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProblemError {
    /// A node index does not exist in the underlying graph.
    #[error("node index {node} out of range ({num_nodes} nodes)")]
    NodeOutOfRange { node: NodeIndex, num_nodes: usize },

    /// An arc index does not exist in the underlying graph.
    #[error("arc index {arc} out of range ({num_arcs} arcs)")]
    ArcOutOfRange { arc: ArcIndex, num_arcs: usize },

    /// An upper bound was placed below the lower bound of the same arc.
    #[error("arc {arc}: upper bound {upper} is below lower bound {lower}")]
    InvertedBounds {
        arc: ArcIndex,
        lower: FlowQuantity,
        upper: FlowQuantity,
    },

    /// A cost outside the representable range (see [`crate::INFINITE`]).
    #[error("arc {arc}: cost {cost} exceeds the representable range")]
    CostOutOfRange { arc: ArcIndex, cost: CostValue },
}

/// Solution access before the solver reached [`Status::Optimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("solution requested while solver status is {status:?}")]
pub struct StateError {
    /// The status the solver was in when the solution was requested.
    pub status: Status,
}
