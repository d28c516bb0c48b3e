//! Cross-check solver backed by `minilp`.
//!
//! The LP is built straight from the instance, one variable per route and one equality per
//! node, without going through the standard-form builder or any Big-M columns.

use minilp::{ComparisonOp, OptimizationDirection, Problem, Variable};

use crate::error::TransformError;
use crate::problem::TransportProblem;
use crate::solution::TransportPlan;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStatus {
    Optimal,
    /// The supply and demand equalities cannot all hold
    Infeasible,
    Unbounded,
}

impl std::fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceStatus::Optimal => write!(f, "Optimal"),
            ReferenceStatus::Infeasible => write!(f, "Infeasible"),
            ReferenceStatus::Unbounded => write!(f, "Unbounded"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceSolution {
    pub status: ReferenceStatus,
    /// `shipments[i][j]` from supply `i` to demand `j`, empty unless optimal
    pub shipments: Vec<Vec<f64>>,
    pub objective_value: Option<f64>,
}

impl ReferenceSolution {
    fn without_plan(status: ReferenceStatus) -> Self {
        Self {
            status,
            shipments: Vec::new(),
            objective_value: None,
        }
    }

    /// Shipping plan when `self` was solved from `problem`
    pub fn plan(&self, problem: &TransportProblem) -> Option<TransportPlan> {
        (self.status == ReferenceStatus::Optimal)
            .then(|| TransportPlan::from_shipments(problem, self.shipments.clone(), 0.0))
    }
}

/// Solves transportation instances with `minilp`
#[derive(Debug, Clone, Default)]
pub struct ReferenceSolver;

impl ReferenceSolver {
    pub fn new() -> Self {
        Self
    }

    /// Minimize the shipping cost subject to every supply being sent and every demand met
    pub fn solve_transport(&self, problem: &TransportProblem) -> Result<ReferenceSolution, TransformError> {
        problem.validate()?;

        let mut lp = Problem::new(OptimizationDirection::Minimize);
        let routes: Vec<Vec<Variable>> = problem
            .cost
            .iter()
            .map(|row| row.iter().map(|&c| lp.add_var(c, (0.0, f64::INFINITY))).collect())
            .collect();

        for (row, &amount) in routes.iter().zip(&problem.supply) {
            lp.add_constraint(row.iter().map(|&v| (v, 1.0)), ComparisonOp::Eq, amount);
        }
        for (j, &amount) in problem.demand.iter().enumerate() {
            lp.add_constraint(routes.iter().map(|row| (row[j], 1.0)), ComparisonOp::Eq, amount);
        }

        let solution = match lp.solve() {
            Ok(solution) => solution,
            Err(minilp::Error::Infeasible) => {
                log::debug!("reference solver: infeasible");
                return Ok(ReferenceSolution::without_plan(ReferenceStatus::Infeasible));
            }
            Err(minilp::Error::Unbounded) => {
                log::debug!("reference solver: unbounded");
                return Ok(ReferenceSolution::without_plan(ReferenceStatus::Unbounded));
            }
        };

        let shipments: Vec<Vec<f64>> = routes
            .iter()
            .map(|row| row.iter().map(|&v| *solution.var_value(v)).collect())
            .collect();
        log::debug!("reference solver: optimal, objective={}", solution.objective());

        Ok(ReferenceSolution {
            status: ReferenceStatus::Optimal,
            shipments,
            objective_value: Some(solution.objective()),
        })
    }
}
