use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Matrix is singular (no usable pivot in column {pivot_row})")]
    Singular { pivot_row: usize },
    #[error("Cannot invert a non-square {rows}x{cols} matrix")]
    NotSquare { rows: usize, cols: usize },
}

/// Which side of a transportation instance a quantity belongs to
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Supply,
    Demand,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Supply => write!(f, "supply"),
            Side::Demand => write!(f, "demand"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Instance needs at least one supply and one demand node")]
    EmptyInstance,
    #[error("Cost matrix has {found} rows, expected {expected}")]
    CostRows { expected: usize, found: usize },
    #[error("Cost row {row} has {found} entries, expected {expected}")]
    CostShape { row: usize, expected: usize, found: usize },
    #[error("Negative or non-finite {side} value {value} at node {index}")]
    InvalidQuantity { side: Side, index: usize, value: f64 },
    #[error("Non-finite cost at ({row}, {col})")]
    NonFiniteCost { row: usize, col: usize },
    #[error("Unbalanced instance: total supply {supply} != total demand {demand}")]
    Unbalanced { supply: f64, demand: f64 },
    #[error("Penalty must be positive and finite, got {0}")]
    InvalidPenalty(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Basis matrix became singular at iteration {iteration}")]
    SingularBasis { iteration: usize },
    #[error("Iteration limit of {limit} reached before termination")]
    IterationLimit { limit: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Invalid generator parameter: {0}")]
    InvalidParameter(String),
}

/// Any failure along the instance -> LP -> solution pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}
