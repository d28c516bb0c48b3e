use crate::error::SolveError;
use crate::linalg::DenseMatrix;
use crate::problem::StandardForm;
use crate::solution::{Pivot, Solution};

/// Revised simplex engine for `min cᵗx, Ax = b, x >= 0`.
///
/// The trailing `m` columns of `A` must form an identity block; they are the starting basis.
/// Every iteration inverts the basis matrix from scratch, prices all non-basic columns with
/// Dantzig's rule (largest reduced cost, lowest position on ties) and runs the minimum ratio
/// test (first row on ties). There is no anti-cycling rule.
#[derive(Debug, Clone)]
pub struct RevisedSimplex {
    /// Maximum number of pivots, `None` for no cap
    max_iterations: Option<usize>,
    /// Reduced costs must exceed this to enter, direction entries must exceed it to
    /// take part in the ratio test
    tolerance: f64,
}

impl Default for RevisedSimplex {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 0.0,
        }
    }
}

impl RevisedSimplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve `lp` starting from the basis formed by its last `m` columns
    pub fn solve(&self, lp: &StandardForm) -> Result<Solution, SolveError> {
        self.validate(lp)?;

        let m = lp.num_constraints();
        let n = lp.num_variables();
        let mut basis: Vec<usize> = ((n - m)..n).collect();
        let mut non_basis: Vec<usize> = (0..(n - m)).collect();
        let mut pivots: Vec<Pivot> = Vec::new();

        log::debug!("revised simplex: rows={} cols={} tolerance={}", m, n, self.tolerance);

        loop {
            let iteration = pivots.len();
            let b_inv = basis_inverse(&lp.a, &basis, iteration)?;

            let Some((position, reduced_cost)) = self.find_entering(lp, &b_inv, &basis, &non_basis) else {
                let x_b = b_inv.mul_vec(&lp.b);
                let mut values = vec![0.0; n];
                for (&var, &value) in basis.iter().zip(&x_b) {
                    values[var] = value;
                }
                let objective_value = lp.objective(&values);
                log::debug!(
                    "revised simplex: optimal after {} iterations, objective={}",
                    iteration,
                    objective_value
                );
                return Ok(Solution::optimal(values, objective_value, basis, pivots));
            };

            if let Some(limit) = self.max_iterations {
                if iteration >= limit {
                    log::debug!("revised simplex: iteration limit {} reached", limit);
                    return Err(SolveError::IterationLimit { limit });
                }
            }

            let entering = non_basis[position];
            let direction = b_inv.mul_vec(&lp.a.column(entering));
            let x_b = b_inv.mul_vec(&lp.b);

            let Some((row, step)) = self.find_leaving(&direction, &x_b) else {
                log::debug!(
                    "revised simplex: unbounded at iteration {}, column {} has no blocking row",
                    iteration,
                    entering
                );
                return Ok(Solution::unbounded(basis, pivots));
            };

            let leaving = basis[row];
            basis[row] = entering;
            non_basis[position] = leaving;

            log::trace!(
                "iteration {}: enter {} (reduced cost {}), leave {} at row {}, step {}",
                iteration,
                entering,
                reduced_cost,
                leaving,
                row,
                step
            );

            pivots.push(Pivot {
                entering,
                leaving,
                row,
                non_basic_position: position,
                reduced_cost,
                step,
            });
        }
    }

    /// Structural checks done before the first iteration
    fn validate(&self, lp: &StandardForm) -> Result<(), SolveError> {
        let m = lp.num_constraints();
        let n = lp.num_variables();

        if n < m {
            return Err(SolveError::MalformedInput(format!(
                "{} columns is fewer than {} rows",
                n, m
            )));
        }
        if lp.b.len() != m {
            return Err(SolveError::MalformedInput(format!(
                "right-hand side has length {}, expected {}",
                lp.b.len(),
                m
            )));
        }
        if lp.c.len() != n {
            return Err(SolveError::MalformedInput(format!(
                "cost vector has length {}, expected {}",
                lp.c.len(),
                n
            )));
        }
        if let Some((i, b)) = lp.b.iter().enumerate().find(|(_, b)| !b.is_finite() || **b < 0.0) {
            return Err(SolveError::MalformedInput(format!(
                "right-hand side entry {} is {}, must be finite and non-negative",
                i, b
            )));
        }
        if let Some(j) = lp.c.iter().position(|c| !c.is_finite()) {
            return Err(SolveError::MalformedInput(format!("cost entry {} is not finite", j)));
        }
        for i in 0..m {
            if let Some(j) = lp.a.row(i).iter().position(|a| !a.is_finite()) {
                return Err(SolveError::MalformedInput(format!(
                    "constraint entry ({}, {}) is not finite",
                    i, j
                )));
            }
        }

        // The starting basis is taken on trust from the layout, so check it is the identity
        let offset = n - m;
        for i in 0..m {
            for k in 0..m {
                let expected = if i == k { 1.0 } else { 0.0 };
                let actual = lp.a[(i, offset + k)];
                if (actual - expected).abs() > self.tolerance {
                    return Err(SolveError::MalformedInput(format!(
                        "trailing {} columns are not an identity block: entry ({}, {}) is {}",
                        m,
                        i,
                        offset + k,
                        actual
                    )));
                }
            }
        }

        Ok(())
    }

    /// Position in `non_basis` of the column with the largest reduced cost
    /// `c_Bᵗ B⁻¹ A_j - c_j`, or `None` when no reduced cost exceeds the tolerance.
    fn find_entering(
        &self,
        lp: &StandardForm,
        b_inv: &DenseMatrix,
        basis: &[usize],
        non_basis: &[usize],
    ) -> Option<(usize, f64)> {
        let c_b: Vec<f64> = basis.iter().map(|&j| lp.c[j]).collect();
        let duals = b_inv.vec_mul(&c_b);
        let priced = lp.a.vec_mul(&duals);

        let mut best: Option<(usize, f64)> = None;
        for (position, &j) in non_basis.iter().enumerate() {
            let reduced_cost = priced[j] - lp.c[j];
            if best.is_none_or(|(_, max)| reduced_cost > max) {
                best = Some((position, reduced_cost));
            }
        }

        best.filter(|&(_, reduced_cost)| reduced_cost > self.tolerance)
    }

    /// Basis row with the smallest ratio `x_B[i] / d[i]` over rows with `d[i] > tolerance`,
    /// or `None` if the entering column is unblocked.
    fn find_leaving(&self, direction: &[f64], x_b: &[f64]) -> Option<(usize, f64)> {
        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;

        for (i, (&d, &x)) in direction.iter().zip(x_b).enumerate() {
            if d > self.tolerance {
                let ratio = x / d;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row.map(|row| (row, min_ratio))
    }
}

/// Inverse of the sub-matrix of `a` formed by the `basis` columns
fn basis_inverse(a: &DenseMatrix, basis: &[usize], iteration: usize) -> Result<DenseMatrix, SolveError> {
    a.select_columns(basis).inverse().map_err(|e| {
        log::debug!("basis inversion failed at iteration {}: {}", iteration, e);
        SolveError::SingularBasis { iteration }
    })
}
