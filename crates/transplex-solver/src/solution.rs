use crate::problem::TransportProblem;
use crate::transform::{DummyNode, TransformedProblem};

/// Terminal state of a solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// No non-basic column has a positive reduced cost
    Optimal,
    /// The entering column has no positive entry in any basic row
    Unbounded,
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
        }
    }
}

/// One basis exchange
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    /// Column index that entered the basis
    pub entering: usize,
    /// Column index that left the basis
    pub leaving: usize,
    /// Basis position (row) where the exchange happened
    pub row: usize,
    /// Position of the entering column in the non-basic list
    pub non_basic_position: usize,
    /// Reduced cost of the entering column
    pub reduced_cost: f64,
    /// Minimum ratio, i.e. the value the entering variable takes
    pub step: f64,
}

/// The result of running the revised simplex engine
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolutionStatus,
    /// Full solution vector, only present when optimal
    pub values: Option<Vec<f64>>,
    /// `cᵗx`, only present when optimal
    pub objective_value: Option<f64>,
    /// Basic column indices at termination, in basis order
    pub basis: Vec<usize>,
    /// Every basis exchange performed, in order
    pub pivots: Vec<Pivot>,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64, basis: Vec<usize>, pivots: Vec<Pivot>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values: Some(values),
            objective_value: Some(objective_value),
            basis,
            pivots,
        }
    }

    pub fn unbounded(basis: Vec<usize>, pivots: Vec<Pivot>) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: None,
            objective_value: None,
            basis,
            pivots,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn iterations(&self) -> usize {
        self.pivots.len()
    }

    /// Shipping plan for an optimal solution of `transformed`, `None` if `self` is not
    /// optimal or has a different number of variables
    pub fn plan(&self, transformed: &TransformedProblem) -> Option<TransportPlan> {
        let values = self.values.as_ref()?;
        if values.len() != transformed.lp.num_variables() {
            return None;
        }
        let routes = transformed.num_routes();
        let artificial_mass: f64 = values[routes..].iter().sum();
        let mut plan = TransportPlan::from_routes(&transformed.problem, &values[..routes], artificial_mass);
        plan.dummy = transformed.dummy;
        Some(plan)
    }
}

/// Shipments per (supply, demand) pair
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportPlan {
    /// `shipments[i][j]` is the quantity sent from supply `i` to demand `j`
    pub shipments: Vec<Vec<f64>>,
    /// Cost of the shipments alone, without any penalty
    pub total_cost: f64,
    /// Sum of the artificial variables. Non-zero means no feasible plan was found.
    pub artificial_mass: f64,
    /// Dummy node included as the last row or column of `shipments`
    pub dummy: Option<DummyNode>,
}

impl TransportPlan {
    /// Reshape flattened route values (`i·q + j`) into a plan
    pub fn from_routes(problem: &TransportProblem, routes: &[f64], artificial_mass: f64) -> Self {
        let shipments = routes.chunks(problem.num_demand()).map(<[f64]>::to_vec).collect();
        Self::from_shipments(problem, shipments, artificial_mass)
    }

    pub fn from_shipments(problem: &TransportProblem, shipments: Vec<Vec<f64>>, artificial_mass: f64) -> Self {
        let total_cost: f64 = shipments
            .iter()
            .zip(&problem.cost)
            .flat_map(|(amounts, costs)| amounts.iter().zip(costs))
            .map(|(x, c)| x * c)
            .sum();
        Self {
            shipments,
            total_cost,
            artificial_mass,
            dummy: None,
        }
    }

    pub fn is_feasible(&self, tolerance: f64) -> bool {
        self.artificial_mass <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transformer;

    #[test]
    fn test_plan_from_routes() {
        let problem = TransportProblem::new(
            vec![2.0, 3.0],
            vec![1.0, 4.0],
            vec![vec![4.0, 6.0], vec![8.0, 2.0]],
        );
        let plan = TransportPlan::from_routes(&problem, &[1.0, 1.0, 0.0, 3.0], 0.0);
        assert_eq!(plan.shipments, vec![vec![1.0, 1.0], vec![0.0, 3.0]]);
        assert_eq!(plan.total_cost, 16.0);
        assert!(plan.is_feasible(1e-9));
    }

    #[test]
    fn test_unbounded_has_no_values() {
        let s = Solution::unbounded(vec![2, 3], Vec::new());
        assert_eq!(s.status, SolutionStatus::Unbounded);
        assert!(s.values.is_none());
        assert!(s.objective_value.is_none());
        assert!(!s.is_optimal());
        assert_eq!(s.iterations(), 0);
        assert_eq!(s.status.to_string(), "Unbounded");
    }

    #[test]
    fn test_plan_rejects_foreign_solution() {
        let problem = TransportProblem::new(
            vec![2.0, 3.0],
            vec![1.0, 4.0],
            vec![vec![4.0, 6.0], vec![8.0, 2.0]],
        );
        let transformed = Transformer::new().transform(&problem).unwrap();
        // Optimal for a 1x1 instance, far fewer variables than this LP has
        let foreign = Solution::optimal(vec![1.0, 0.0], 1.0, vec![0], Vec::new());
        assert!(foreign.plan(&transformed).is_none());

        let too_long = Solution::optimal(vec![0.0; 12], 0.0, vec![0, 1, 2, 3], Vec::new());
        assert!(too_long.plan(&transformed).is_none());
    }
}
