use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2};

const MAX_SWEEPS: usize = 100;
// Relative size of the squared off-diagonal mass at which a matrix counts as diagonal
const TOLERANCE: f64 = 1e-22;

/// Eigen-decomposition of a symmetric matrix using cyclic Jacobi rotations
/// Returns the eigenvalues and a matrix whose columns are the matching unit eigenvectors,
/// so that `m = v * diag(values) * v^T`
pub fn symmetric_eigen(m: &ArrayView2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(Error::Shape(format!(
            "eigen-decomposition needs a square matrix, got {}x{}",
            rows, cols
        )));
    }
    if m.iter().any(|x| !x.is_finite()) {
        return Err(Error::LinearAlgebra("matrix has non-finite entries".to_string()));
    }

    let n = rows;
    let mut a = m.to_owned();
    let mut v = Array2::eye(n);
    let total: f64 = a.iter().map(|x| x * x).sum();

    for sweep in 0..MAX_SWEEPS {
        let off = off_diagonal_mass(&a);
        if off <= TOLERANCE * total {
            tracing::debug!(sweep, n, "jacobi converged");
            return Ok((a.diag().to_owned(), v));
        }

        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq == 0f64 {
                    continue;
                }

                // Rotation angle that zeroes a[p][q]
                let theta = (a[[q, q]] - a[[p, p]]) / (2f64 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1f64).sqrt());
                let c = (t * t + 1f64).sqrt().recip();
                let s = t * c;

                rotate_columns(&mut a, p, q, c, s);
                rotate_rows(&mut a, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }
    }

    Err(Error::LinearAlgebra(format!(
        "jacobi eigen-decomposition did not converge after {} sweeps",
        MAX_SWEEPS
    )))
}

fn off_diagonal_mass(a: &Array2<f64>) -> f64 {
    a.indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, x)| x * x)
        .sum()
}

// m <- m * J
fn rotate_columns(m: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    for k in 0..m.nrows() {
        let mkp = m[[k, p]];
        let mkq = m[[k, q]];
        m[[k, p]] = c * mkp - s * mkq;
        m[[k, q]] = s * mkp + c * mkq;
    }
}

// m <- J^T * m
fn rotate_rows(m: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    for k in 0..m.ncols() {
        let mpk = m[[p, k]];
        let mqk = m[[q, k]];
        m[[p, k]] = c * mpk - s * mqk;
        m[[q, k]] = s * mpk + c * mqk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn decomposes_symmetric_matrix() {
        let m = array![[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 5.0]];
        let (values, vectors) = symmetric_eigen(&m.view()).unwrap();

        let rebuilt = vectors.dot(&Array2::from_diag(&values)).dot(&vectors.t());
        for (x, y) in rebuilt.iter().zip(m.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
        }

        let identity = vectors.t().dot(&vectors);
        for ((i, j), x) in identity.indexed_iter() {
            assert_abs_diff_eq!(*x, if i == j { 1.0 } else { 0.0 }, epsilon = 1e-9);
        }

        assert_abs_diff_eq!(values.sum(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn diagonal_matrix_is_returned_as_is() {
        let m = array![[2.0, 0.0], [0.0, 7.0]];
        let (values, vectors) = symmetric_eigen(&m.view()).unwrap();

        assert_eq!(values.to_vec(), vec![2.0, 7.0]);
        assert_eq!(vectors, Array2::<f64>::eye(2));
    }

    #[test]
    fn rejects_non_square_input() {
        let m = Array2::<f64>::zeros((2, 3));

        assert!(matches!(symmetric_eigen(&m.view()), Err(Error::Shape(_))));
    }

    #[test]
    fn rejects_non_finite_input() {
        let m = array![[1.0, f64::NAN], [f64::NAN, 1.0]];

        assert!(matches!(symmetric_eigen(&m.view()), Err(Error::LinearAlgebra(_))));
    }
}
