use crate::error::LinalgError;

/// Dense row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build from nested rows. Returns `None` if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        Some(Self {
            rows: n_rows,
            cols: n_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    /// Square (or rectangular) sub-matrix made of the given columns, in order
    pub fn select_columns(&self, columns: &[usize]) -> Self {
        let mut out = Self::zeros(self.rows, columns.len());
        for i in 0..self.rows {
            for (k, &j) in columns.iter().enumerate() {
                out[(i, k)] = self[(i, j)];
            }
        }
        out
    }

    /// `self · v`
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        (0..self.rows).map(|i| dot(self.row(i), v)).collect()
    }

    /// `vᵗ · self`
    pub fn vec_mul(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.rows);
        let mut out = vec![0.0; self.cols];
        for (i, &vi) in v.iter().enumerate() {
            if vi == 0.0 {
                continue;
            }
            for (o, &a) in out.iter_mut().zip(self.row(i)) {
                *o += vi * a;
            }
        }
        out
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    ///
    /// A pivot with magnitude at or below `f64::EPSILON` times the largest entry of the
    /// original matrix is treated as zero and reported as singular.
    pub fn inverse(&self) -> Result<DenseMatrix, LinalgError> {
        if self.rows != self.cols {
            return Err(LinalgError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        let scale = self.data.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
        let threshold = scale * f64::EPSILON;

        let mut work = self.clone();
        let mut inv = Self::identity(n);

        for col in 0..n {
            let mut pivot_row = col;
            let mut pivot_abs = work[(col, col)].abs();
            for r in (col + 1)..n {
                let v = work[(r, col)].abs();
                if v > pivot_abs {
                    pivot_abs = v;
                    pivot_row = r;
                }
            }
            if pivot_abs <= threshold {
                return Err(LinalgError::Singular { pivot_row: col });
            }
            if pivot_row != col {
                work.swap_rows(pivot_row, col);
                inv.swap_rows(pivot_row, col);
            }

            let pivot = work[(col, col)];
            for j in 0..n {
                work[(col, j)] /= pivot;
                inv[(col, j)] /= pivot;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work[(r, col)];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n {
                    work[(r, j)] -= factor * work[(col, j)];
                    inv[(r, j)] -= factor * inv[(col, j)];
                }
            }
        }

        Ok(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }
}

impl std::ops::Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl std::ops::IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &DenseMatrix, b: &DenseMatrix) -> bool {
        a.rows == b.rows && a.cols == b.cols && a.data.iter().zip(&b.data).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    fn matmul(a: &DenseMatrix, b: &DenseMatrix) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(a.rows(), b.cols());
        for i in 0..a.rows() {
            for j in 0..b.cols() {
                out[(i, j)] = (0..a.cols()).map(|k| a[(i, k)] * b[(k, j)]).sum();
            }
        }
        out
    }

    #[test]
    fn test_inverse_of_identity() {
        let id = DenseMatrix::identity(4);
        assert_eq!(id.inverse().unwrap(), id);
    }

    #[test]
    fn test_inverse_needs_row_swap() {
        // Zero on the leading diagonal forces a pivot swap
        let m = DenseMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![4.0, -3.0, 8.0],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        assert!(approx_eq(&matmul(&m, &inv), &DenseMatrix::identity(3)));
        assert!(approx_eq(&matmul(&inv, &m), &DenseMatrix::identity(3)));
    }

    #[test]
    fn test_singular_matrix() {
        let m = DenseMatrix::from_rows(vec![
            vec![1.0, 2.0],
            vec![2.0, 4.0],
        ])
        .unwrap();
        assert!(matches!(m.inverse(), Err(LinalgError::Singular { .. })));
    }

    #[test]
    fn test_not_square() {
        let m = DenseMatrix::zeros(2, 3);
        assert!(matches!(m.inverse(), Err(LinalgError::NotSquare { rows: 2, cols: 3 })));
    }

    #[test]
    fn test_products_and_selection() {
        let m = DenseMatrix::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        ])
        .unwrap();
        assert_eq!(m.mul_vec(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(m.vec_mul(&[1.0, 1.0]), vec![5.0, 7.0, 9.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);

        let sub = m.select_columns(&[2, 0]);
        assert_eq!(sub.row(0), &[3.0, 1.0]);
        assert_eq!(sub.row(1), &[6.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(DenseMatrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_none());
    }
}
