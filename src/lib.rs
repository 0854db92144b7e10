//! Minimum-cost network flow solvers.
//!
//! Two engines share one problem model: [`NetworkSimplex`], a primal network
//! simplex built around an explicit spanning-tree index structure, and
//! [`CostScaling`], a push-relabel cost-scaling solver. Both take a read-only
//! [`DiGraph`] plus a [`FlowProblem`] describing per-arc bounds and costs and
//! per-node supplies, and report a [`Status`]; flows, node potentials and the
//! optimal cost are exposed through a borrowing [`Solution`] view once the
//! status is [`Status::Optimal`].
//!
//! New clients that only need balanced supplies and default bounds should use
//! [`SimpleMinCostFlow`] if they can.

pub mod error;
pub mod graph;
pub mod io;
pub mod problem;
pub mod scaling;
pub mod simple;
pub mod simplex;
pub mod solution;
pub mod validate;

pub use crate::error::{ProblemError, StateError};
pub use crate::graph::{ArcIndex, CostValue, DiGraph, FlowQuantity, NodeIndex, INFINITE};
pub use crate::io::DimacsError;
pub use crate::problem::{FlowProblem, Status, SupplyType};
pub use crate::scaling::{CostScaling, ScalingMethod};
pub use crate::simple::SimpleMinCostFlow;
pub use crate::simplex::{NetworkSimplex, PivotRule, SolverConfig};
pub use crate::solution::Solution;
pub use crate::validate::ValidationError;
