use anyhow::{anyhow, Result};
use faer::{prelude::*, solvers::PartialPivLu, Mat};

/// Trait for solving dense linear systems (Ax = b), the numerical kernel of
/// the DC power-flow approximation.
pub trait LinearSystemBackend: Send + Sync {
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>>;
}

fn check_shape(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<usize> {
    let n = matrix.len();
    if rhs.len() != n {
        return Err(anyhow!(
            "rhs length ({}) does not match matrix dimension {}",
            rhs.len(),
            n
        ));
    }
    if matrix.iter().any(|row| row.len() != n) {
        return Err(anyhow!("matrix must be square"));
    }
    Ok(n)
}

/// Gaussian elimination with partial pivoting. Adequate for the reduced
/// susceptance systems this model produces (a handful of buses).
#[derive(Debug, Clone, Default)]
pub struct GaussBackend;

impl LinearSystemBackend for GaussBackend {
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>> {
        let n = check_shape(matrix, rhs)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut a = matrix.to_vec();
        let mut b = rhs.to_vec();

        // Forward elimination.
        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&r1, &r2| {
                    a[r1][col]
                        .abs()
                        .partial_cmp(&a[r2][col].abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(col);
            if a[pivot_row][col].abs() < 1e-12 {
                return Err(anyhow!("singular matrix"));
            }
            if pivot_row != col {
                a.swap(col, pivot_row);
                b.swap(col, pivot_row);
            }
            for row in col + 1..n {
                let factor = a[row][col] / a[col][col];
                if factor == 0.0 {
                    continue;
                }
                let (upper, lower) = a.split_at_mut(row);
                for (target, &source) in lower[0][col..].iter_mut().zip(upper[col][col..].iter()) {
                    *target -= factor * source;
                }
                b[row] -= factor * b[col];
            }
        }

        // Back substitution.
        let mut x = vec![0.0; n];
        for row in (0..n).rev() {
            let tail: f64 = (row + 1..n).map(|col| a[row][col] * x[col]).sum();
            x[row] = (b[row] - tail) / a[row][row];
        }
        Ok(x)
    }
}

/// LU factorization via `faer` with partial pivoting.
#[derive(Debug, Clone, Default)]
pub struct LuBackend;

impl LinearSystemBackend for LuBackend {
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>> {
        let n = check_shape(matrix, rhs)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let mat = Mat::from_fn(n, n, |i, j| matrix[i][j]);
        let rhs_mat = Mat::from_fn(n, 1, |i, _| rhs[i]);
        let lu = PartialPivLu::new(mat.as_ref());
        let sol = lu.solve(&rhs_mat);

        let solution: Vec<f64> = (0..n).map(|i| sol.read(i, 0)).collect();
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(anyhow!("singular matrix"));
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Box<dyn LinearSystemBackend>> {
        vec![Box::new(GaussBackend), Box::new(LuBackend)]
    }

    #[test]
    fn solves_small_system() {
        // 2x + y = 5, x + 3y = 10 -> x = 1, y = 3
        let matrix = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let rhs = vec![5.0, 10.0];
        for backend in backends() {
            let x = backend.solve(&matrix, &rhs).unwrap();
            assert!((x[0] - 1.0).abs() < 1e-9);
            assert!((x[1] - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        let matrix = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let rhs = vec![2.0, 3.0];
        let x = GaussBackend.solve(&matrix, &rhs).unwrap();
        assert_eq!(x, vec![3.0, 2.0]);
    }

    #[test]
    fn singular_system_is_an_error() {
        let matrix = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        let rhs = vec![1.0, 2.0];
        assert!(GaussBackend.solve(&matrix, &rhs).is_err());
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let matrix = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert!(GaussBackend.solve(&matrix, &[1.0]).is_err());
        assert!(GaussBackend.solve(&[vec![1.0]], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_system_solves_trivially() {
        for backend in backends() {
            assert!(backend.solve(&[], &[]).unwrap().is_empty());
        }
    }
}
