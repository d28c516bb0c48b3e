//! Builds the standard-form LP of a transportation instance.
//!
//! Variables are the `p·q` routes, flattened row-major (`i·q + j`), followed by one
//! artificial variable per constraint row. Rows are the `p` supply equalities followed by
//! the `q` demand equalities. The artificial columns form an identity block, so the
//! trailing `m` columns are a ready-made feasible starting basis for the revised simplex.

use crate::error::TransformError;
use crate::linalg::DenseMatrix;
use crate::problem::{StandardForm, TransportProblem};

/// Penalty documented for costs up to 1000
pub const DEFAULT_PENALTY: f64 = 1_000_000.0;

/// How the cost of artificial variables (Big-M) is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenaltyPolicy {
    /// Use this exact value
    Fixed(f64),
    /// `max(max|cost| * factor, floor)`
    Scaled { factor: f64, floor: f64 },
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        PenaltyPolicy::Scaled {
            factor: 1000.0,
            floor: DEFAULT_PENALTY,
        }
    }
}

impl PenaltyPolicy {
    pub fn resolve(&self, max_abs_cost: f64) -> Result<f64, TransformError> {
        let penalty = match *self {
            PenaltyPolicy::Fixed(value) => value,
            PenaltyPolicy::Scaled { factor, floor } => (max_abs_cost * factor).max(floor),
        };
        if !penalty.is_finite() || penalty <= 0.0 {
            return Err(TransformError::InvalidPenalty(penalty));
        }
        Ok(penalty)
    }
}

/// What to do when total supply and total demand differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Balancing {
    /// Refuse to build the LP
    #[default]
    Reject,
    /// Add a zero-cost dummy node on the short side that absorbs the difference
    DummyNode,
    /// Build the LP anyway. Artificial variables stay basic and the result is not a
    /// meaningful shipping plan.
    Ignore,
}

/// The node added by [`Balancing::DummyNode`]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DummyNode {
    /// Extra demand node (last column) soaking up surplus supply
    Demand(f64),
    /// Extra supply node (last row) covering surplus demand
    Supply(f64),
}

/// Output of [`Transformer::transform`]
#[derive(Debug, Clone)]
pub struct TransformedProblem {
    /// The instance the LP was built from, including any dummy node
    pub problem: TransportProblem,
    /// The LP with artificial columns appended
    pub lp: StandardForm,
    /// Cost of each artificial variable
    pub penalty: f64,
    pub dummy: Option<DummyNode>,
}

impl TransformedProblem {
    /// Number of route variables (columns before the artificial block)
    pub fn num_routes(&self) -> usize {
        self.problem.num_supply() * self.problem.num_demand()
    }

    pub fn num_artificials(&self) -> usize {
        self.lp.num_constraints()
    }
}

#[derive(Debug, Clone)]
pub struct Transformer {
    penalty: PenaltyPolicy,
    balancing: Balancing,
    /// Allowed gap between total supply and total demand
    balance_tolerance: f64,
}

impl Default for Transformer {
    fn default() -> Self {
        Self {
            penalty: PenaltyPolicy::default(),
            balancing: Balancing::default(),
            balance_tolerance: 1e-9,
        }
    }
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_penalty(mut self, penalty: PenaltyPolicy) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_balancing(mut self, balancing: Balancing) -> Self {
        self.balancing = balancing;
        self
    }

    pub fn with_balance_tolerance(mut self, tol: f64) -> Self {
        self.balance_tolerance = tol;
        self
    }

    /// Build the Big-M standard form of `problem`
    pub fn transform(&self, problem: &TransportProblem) -> Result<TransformedProblem, TransformError> {
        problem.validate()?;

        let (problem, dummy) = self.balance(problem)?;
        let penalty = self.penalty.resolve(problem.max_abs_cost())?;
        let lp = add_artificials(equality_form(&problem), penalty);

        log::debug!(
            "built standard form: supply={} demand={} rows={} cols={} penalty={}",
            problem.num_supply(),
            problem.num_demand(),
            lp.num_constraints(),
            lp.num_variables(),
            penalty
        );

        Ok(TransformedProblem {
            problem,
            lp,
            penalty,
            dummy,
        })
    }

    fn balance(&self, problem: &TransportProblem) -> Result<(TransportProblem, Option<DummyNode>), TransformError> {
        let supply = problem.total_supply();
        let demand = problem.total_demand();
        let gap = supply - demand;
        if gap.abs() <= self.balance_tolerance {
            return Ok((problem.clone(), None));
        }

        match self.balancing {
            Balancing::Reject => Err(TransformError::Unbalanced { supply, demand }),
            Balancing::Ignore => {
                log::warn!("building LP for unbalanced instance: supply={} demand={}", supply, demand);
                Ok((problem.clone(), None))
            }
            Balancing::DummyNode => {
                let mut balanced = problem.clone();
                let dummy = if gap > 0.0 {
                    balanced.demand.push(gap);
                    for row in &mut balanced.cost {
                        row.push(0.0);
                    }
                    DummyNode::Demand(gap)
                } else {
                    balanced.supply.push(-gap);
                    balanced.cost.push(vec![0.0; balanced.num_demand()]);
                    DummyNode::Supply(-gap)
                };
                log::debug!("added dummy node {:?}", dummy);
                Ok((balanced, Some(dummy)))
            }
        }
    }
}

/// Supply and demand equalities over the route variables only, without artificials.
///
/// Row `i < p` sums the routes leaving supply `i`; row `p + j` sums the routes entering
/// demand `j`. The caller is expected to have validated `problem`.
pub fn equality_form(problem: &TransportProblem) -> StandardForm {
    let p = problem.num_supply();
    let q = problem.num_demand();

    let mut a = DenseMatrix::zeros(p + q, p * q);
    let mut c = vec![0.0; p * q];
    for i in 0..p {
        for j in 0..q {
            let col = problem.route_index(i, j);
            a[(i, col)] = 1.0;
            a[(p + j, col)] = 1.0;
            c[col] = problem.cost[i][j];
        }
    }

    let b = problem.supply.iter().chain(&problem.demand).copied().collect();
    StandardForm::new(a, b, c)
}

/// Append an `m x m` identity block to `A` and `m` copies of `penalty` to `c`
pub fn add_artificials(lp: StandardForm, penalty: f64) -> StandardForm {
    let m = lp.num_constraints();
    let n = lp.num_variables();
    let StandardForm { a, b, mut c } = lp;

    let mut augmented = DenseMatrix::zeros(m, n + m);
    for i in 0..m {
        for (j, &v) in a.row(i).iter().enumerate() {
            augmented[(i, j)] = v;
        }
        augmented[(i, n + i)] = 1.0;
    }
    c.extend(std::iter::repeat_n(penalty, m));
    StandardForm::new(augmented, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransportProblem {
        TransportProblem::new(
            vec![2.0, 3.0],
            vec![1.0, 4.0],
            vec![vec![4.0, 6.0], vec![8.0, 2.0]],
        )
    }

    #[test]
    fn test_layout_of_sample_instance() {
        let t = Transformer::new().transform(&sample()).unwrap();
        let lp = &t.lp;

        assert_eq!(lp.num_constraints(), 4);
        assert_eq!(lp.num_variables(), 8);
        assert_eq!(lp.b, vec![2.0, 3.0, 1.0, 4.0]);
        assert_eq!(lp.c, vec![4.0, 6.0, 8.0, 2.0, 1e6, 1e6, 1e6, 1e6]);

        assert_eq!(lp.a.row(0), &[1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(lp.a.row(1), &[0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(lp.a.row(2), &[1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(lp.a.row(3), &[0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        assert_eq!(t.penalty, DEFAULT_PENALTY);
        assert_eq!(t.num_routes(), 4);
        assert_eq!(t.num_artificials(), 4);
        assert!(t.dummy.is_none());
    }

    #[test]
    fn test_every_route_in_one_supply_and_one_demand_row() {
        let problem = TransportProblem::new(
            vec![5.0, 5.0, 5.0],
            vec![3.0, 4.0, 4.0, 4.0],
            vec![vec![1.0; 4]; 3],
        );
        let lp = equality_form(&problem);
        for col in 0..lp.num_variables() {
            let column = lp.a.column(col);
            let supply_hits: f64 = column[..3].iter().sum();
            let demand_hits: f64 = column[3..].iter().sum();
            assert_eq!(supply_hits, 1.0, "column {}", col);
            assert_eq!(demand_hits, 1.0, "column {}", col);
        }
    }

    #[test]
    fn test_penalty_policies() {
        assert_eq!(PenaltyPolicy::Fixed(42.0).resolve(1e9).unwrap(), 42.0);

        let scaled = PenaltyPolicy::Scaled { factor: 100.0, floor: 10.0 };
        assert_eq!(scaled.resolve(0.0).unwrap(), 10.0);
        assert_eq!(scaled.resolve(5.0).unwrap(), 500.0);

        // Default reproduces the documented constant for costs up to 1000
        assert_eq!(PenaltyPolicy::default().resolve(999.0).unwrap(), DEFAULT_PENALTY);
        assert_eq!(PenaltyPolicy::default().resolve(5000.0).unwrap(), 5_000_000.0);

        assert_eq!(PenaltyPolicy::Fixed(0.0).resolve(1.0), Err(TransformError::InvalidPenalty(0.0)));
    }

    #[test]
    fn test_penalty_scales_with_large_costs() {
        let mut problem = sample();
        problem.cost[1][0] = 20_000.0;
        let t = Transformer::new().transform(&problem).unwrap();
        assert_eq!(t.penalty, 20_000_000.0);
        assert!(t.lp.c[4..].iter().all(|&c| c == 20_000_000.0));
    }

    #[test]
    fn test_unbalanced_rejected_by_default() {
        let mut problem = sample();
        problem.supply[0] = 4.0;
        assert_eq!(
            Transformer::new().transform(&problem).unwrap_err(),
            TransformError::Unbalanced { supply: 7.0, demand: 5.0 }
        );
    }

    #[test]
    fn test_dummy_demand_for_surplus_supply() {
        let mut problem = sample();
        problem.supply[0] = 4.0;
        let t = Transformer::new()
            .with_balancing(Balancing::DummyNode)
            .transform(&problem)
            .unwrap();

        assert_eq!(t.dummy, Some(DummyNode::Demand(2.0)));
        assert_eq!(t.problem.demand, vec![1.0, 4.0, 2.0]);
        assert_eq!(t.problem.cost, vec![vec![4.0, 6.0, 0.0], vec![8.0, 2.0, 0.0]]);
        assert_eq!(t.lp.num_constraints(), 5);
        assert_eq!(t.lp.num_variables(), 6 + 5);
    }

    #[test]
    fn test_dummy_supply_for_surplus_demand() {
        let mut problem = sample();
        problem.demand[1] = 7.0;
        let t = Transformer::new()
            .with_balancing(Balancing::DummyNode)
            .transform(&problem)
            .unwrap();

        assert_eq!(t.dummy, Some(DummyNode::Supply(3.0)));
        assert_eq!(t.problem.supply, vec![2.0, 3.0, 3.0]);
        assert_eq!(t.problem.cost[2], vec![0.0, 0.0]);
        assert!(t.problem.is_balanced(0.0));
    }

    #[test]
    fn test_ignore_builds_unbalanced_lp() {
        let mut problem = sample();
        problem.supply[0] = 4.0;
        let t = Transformer::new()
            .with_balancing(Balancing::Ignore)
            .transform(&problem)
            .unwrap();
        assert_eq!(t.lp.b, vec![4.0, 3.0, 1.0, 4.0]);
        assert!(t.dummy.is_none());
    }

    #[test]
    fn test_invalid_instance_propagates() {
        let mut problem = sample();
        problem.supply[1] = -3.0;
        assert!(matches!(
            Transformer::new().with_balancing(Balancing::Ignore).transform(&problem),
            Err(TransformError::InvalidQuantity { .. })
        ));
    }
}
