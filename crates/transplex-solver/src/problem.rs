use crate::error::{Side, TransformError};
use crate::linalg::DenseMatrix;

/// A transportation instance: ship supply to demand at minimum total cost
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportProblem {
    /// Quantity available at each supply node
    pub supply: Vec<f64>,
    /// Quantity required at each demand node
    pub demand: Vec<f64>,
    /// `cost[i][j]` is the unit cost of shipping from supply `i` to demand `j`
    pub cost: Vec<Vec<f64>>,
}

impl TransportProblem {
    pub fn new(supply: Vec<f64>, demand: Vec<f64>, cost: Vec<Vec<f64>>) -> Self {
        Self { supply, demand, cost }
    }

    pub fn num_supply(&self) -> usize {
        self.supply.len()
    }

    pub fn num_demand(&self) -> usize {
        self.demand.len()
    }

    pub fn total_supply(&self) -> f64 {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.total_supply() - self.total_demand()).abs() <= tolerance
    }

    /// Largest absolute unit cost, 0 for an all-zero matrix
    pub fn max_abs_cost(&self) -> f64 {
        self.cost
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, c| acc.max(c.abs()))
    }

    /// Flattened column index of the route from supply `i` to demand `j`
    pub fn route_index(&self, i: usize, j: usize) -> usize {
        i * self.num_demand() + j
    }

    /// Check shapes and values. Balance is checked separately by the transformer.
    pub fn validate(&self) -> Result<(), TransformError> {
        let p = self.num_supply();
        let q = self.num_demand();
        if p == 0 || q == 0 {
            return Err(TransformError::EmptyInstance);
        }
        if self.cost.len() != p {
            return Err(TransformError::CostRows {
                expected: p,
                found: self.cost.len(),
            });
        }
        for (row, costs) in self.cost.iter().enumerate() {
            if costs.len() != q {
                return Err(TransformError::CostShape {
                    row,
                    expected: q,
                    found: costs.len(),
                });
            }
            if let Some(col) = costs.iter().position(|c| !c.is_finite()) {
                return Err(TransformError::NonFiniteCost { row, col });
            }
        }
        for (side, values) in [(Side::Supply, &self.supply), (Side::Demand, &self.demand)] {
            if let Some((index, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(TransformError::InvalidQuantity { side, index, value });
            }
        }
        Ok(())
    }
}

/// An LP in standard equality form: minimize `cᵗx` subject to `Ax = b`, `x >= 0`
#[derive(Debug, Clone, PartialEq)]
pub struct StandardForm {
    /// Constraint matrix, `m x n`
    pub a: DenseMatrix,
    /// Right-hand side, length `m`
    pub b: Vec<f64>,
    /// Cost vector, length `n`
    pub c: Vec<f64>,
}

impl StandardForm {
    pub fn new(a: DenseMatrix, b: Vec<f64>, c: Vec<f64>) -> Self {
        Self { a, b, c }
    }

    pub fn num_constraints(&self) -> usize {
        self.a.rows()
    }

    pub fn num_variables(&self) -> usize {
        self.a.cols()
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        crate::linalg::dot(&self.c, x)
    }

    /// Largest `|Ax - b|` over all rows
    pub fn max_residual(&self, x: &[f64]) -> f64 {
        self.a
            .mul_vec(x)
            .iter()
            .zip(&self.b)
            .fold(0.0_f64, |acc, (ax, b)| acc.max((ax - b).abs()))
    }
}
