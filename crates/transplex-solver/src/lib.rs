mod error;
mod generator;
mod linalg;
mod problem;
mod reference;
mod simplex;
mod solution;
mod transform;

pub use error::{Error, GenerateError, LinalgError, Side, SolveError, TransformError};
pub use generator::InstanceGenerator;
pub use linalg::DenseMatrix;
pub use problem::{StandardForm, TransportProblem};
pub use reference::{ReferenceSolution, ReferenceSolver, ReferenceStatus};
pub use simplex::RevisedSimplex;
pub use solution::{Pivot, Solution, SolutionStatus, TransportPlan};
pub use transform::{
    add_artificials, equality_form, Balancing, DummyNode, PenaltyPolicy, TransformedProblem, Transformer,
    DEFAULT_PENALTY,
};

/// Transform `problem` and run the revised simplex on the result
pub fn solve_transport(
    problem: &TransportProblem,
    transformer: &Transformer,
    engine: &RevisedSimplex,
) -> Result<(TransformedProblem, Solution), Error> {
    let transformed = transformer.transform(problem)?;
    let solution = engine.solve(&transformed.lp)?;
    Ok((transformed, solution))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Solve `problem` both ways and check the costs and plans agree
    fn assert_matches_reference(problem: &TransportProblem, engine: &RevisedSimplex) {
        let (p, q) = (problem.num_supply(), problem.num_demand());
        let (transformed, solution) = solve_transport(problem, &Transformer::new(), engine).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal, "{}x{}", p, q);

        let plan = solution.plan(&transformed).unwrap();
        assert!(plan.is_feasible(1e-6), "{}x{}: artificial mass {}", p, q, plan.artificial_mass);

        let expected = ReferenceSolver::new().solve_transport(problem).unwrap();
        assert_eq!(expected.status, ReferenceStatus::Optimal, "{}x{}", p, q);
        let expected_cost = expected.objective_value.unwrap();
        let tolerance = 1e-6 * expected_cost.abs().max(1.0);
        assert!(
            (plan.total_cost - expected_cost).abs() < tolerance,
            "{}x{}: revised simplex {} vs reference {}",
            p,
            q,
            plan.total_cost,
            expected_cost
        );
        assert!((solution.objective_value.unwrap() - expected_cost).abs() < tolerance);

        // Shipments respect supply and demand
        let x = solution.values.as_ref().unwrap();
        assert!(transformed.lp.max_residual(x) < 1e-6);
        for (i, row) in plan.shipments.iter().enumerate() {
            let shipped: f64 = row.iter().sum();
            assert!((shipped - problem.supply[i]).abs() < 1e-6);
            assert!(row.iter().all(|&v| v >= -1e-9));
        }
        for (j, &wanted) in problem.demand.iter().enumerate() {
            let received: f64 = plan.shipments.iter().map(|row| row[j]).sum();
            assert!((received - wanted).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pipeline_matches_reference_on_random_instances() {
        init_logging();
        let mut generator = InstanceGenerator::from_seed(73);
        let engine = RevisedSimplex::new().with_max_iterations(5000);

        for (p, q) in [(1, 4), (2, 3), (3, 3), (4, 2), (5, 6), (6, 4), (7, 7)] {
            let problem = generator.generate(p, q, 100, 50).unwrap();
            assert_matches_reference(&problem, &engine);
        }
    }

    #[test]
    fn test_pipeline_matches_reference_on_larger_instances() {
        init_logging();
        let mut generator = InstanceGenerator::from_seed(2024);
        let engine = RevisedSimplex::new().with_max_iterations(20_000);

        // Full cost and quantity ranges, plus a narrow cost range full of ties
        for (p, q, max_cost) in [(15, 15, 1000), (20, 12, 1000), (12, 20, 1000), (16, 16, 3)] {
            let problem = generator.generate(p, q, max_cost, 1000).unwrap();
            assert_matches_reference(&problem, &engine);
        }
    }

    #[test]
    fn test_dummy_node_pipeline() {
        init_logging();
        // 3 units of surplus supply go to the dummy demand at no cost
        let problem = TransportProblem::new(
            vec![5.0, 3.0],
            vec![1.0, 4.0],
            vec![vec![4.0, 6.0], vec![8.0, 2.0]],
        );
        let transformer = Transformer::new().with_balancing(Balancing::DummyNode);
        let (transformed, solution) = solve_transport(&problem, &transformer, &RevisedSimplex::new()).unwrap();

        let plan = solution.plan(&transformed).unwrap();
        assert_eq!(plan.dummy, Some(DummyNode::Demand(3.0)));
        assert!(plan.is_feasible(1e-9));
        // Supply 1 sends all 3 units to demand 1, supply 0 covers the rest
        assert!((plan.total_cost - 16.0).abs() < 1e-9, "cost = {}", plan.total_cost);
        assert_eq!(plan.shipments[1], vec![0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_unbalanced_rejected_through_pipeline() {
        let problem = TransportProblem::new(vec![5.0], vec![1.0], vec![vec![1.0]]);
        let err = solve_transport(&problem, &Transformer::new(), &RevisedSimplex::new()).unwrap_err();
        assert!(matches!(err, Error::Transform(TransformError::Unbalanced { .. })));
    }

    #[test]
    fn test_ignored_imbalance_leaves_artificial_mass() {
        let problem = TransportProblem::new(vec![5.0], vec![1.0], vec![vec![1.0]]);
        let transformer = Transformer::new().with_balancing(Balancing::Ignore);
        let (transformed, solution) = solve_transport(&problem, &transformer, &RevisedSimplex::new()).unwrap();
        let plan = solution.plan(&transformed).unwrap();
        assert!(!plan.is_feasible(1e-9));
        assert!((plan.artificial_mass - 4.0).abs() < 1e-9);
    }
}
