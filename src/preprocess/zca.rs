use super::eigen::symmetric_eigen;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};

/// Regularizer added to every singular value before taking its inverse square root
pub const EPSILON: f64 = 0.08;

/// ZCA-whiten a design matrix (one sample per row)
///
/// The whitening operator is estimated from a doubly centered copy of the data:
/// every row has its own mean removed, then every column has its mean removed.
/// The covariance of that copy is normalized by the number of columns, and its
/// decomposition `U * S * U^T` gives `W = (U * diag(1 / sqrt(S + EPSILON)) * U^T)^T`.
/// The result is the *uncentered* input multiplied by `W`, so it has the input's shape.
pub fn whiten(data: &ArrayView2<f64>) -> Result<Array2<f64>> {
    let whitening = whitening_matrix(data)?;

    Ok(data.dot(&whitening))
}

/// Compute the (features x features) whitening operator of a design matrix
pub fn whitening_matrix(data: &ArrayView2<f64>) -> Result<Array2<f64>> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(Error::Shape(format!(
            "cannot whiten an empty {}x{} matrix",
            data.nrows(),
            data.ncols()
        )));
    }

    let centered = double_center(data)?;
    let sigma = centered.t().dot(&centered) / centered.ncols() as f64;

    // sigma is symmetric positive semi-definite, so its singular values are the
    // absolute values of its eigenvalues and U is shared on both sides
    let (values, u) = symmetric_eigen(&sigma.view())?;
    let diag = Array2::from_diag(&values.mapv(|s| (s.abs() + EPSILON).sqrt().recip()));

    Ok(u.dot(&diag).dot(&u.t()).reversed_axes())
}

/// Subtract the per-row mean, then the per-column mean of the result
fn double_center(data: &ArrayView2<f64>) -> Result<Array2<f64>> {
    let mut centered = data.to_owned();

    for mut row in centered.rows_mut() {
        let mean = row.mean().unwrap_or(0f64);
        row.mapv_inplace(|x| x - mean);
    }

    let col_mean = centered
        .mean_axis(Axis(0))
        .ok_or_else(|| Error::Shape("cannot take column means of an empty matrix".to_string()))?;
    centered -= &col_mean;

    Ok(centered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use rand::distributions::{Distribution, Uniform};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn covariance(data: &Array2<f64>) -> Array2<f64> {
        let mean = data.mean_axis(Axis(0)).unwrap();
        let centered = data - &mean;

        centered.t().dot(&centered) / data.nrows() as f64
    }

    #[test]
    fn double_centering_zeroes_row_and_column_means() {
        let data = array![[1.0, 2.0, 6.0], [4.0, 0.0, 5.0], [3.0, 3.0, 9.0]];
        let centered = double_center(&data.view()).unwrap();

        for x in centered.mean_axis(Axis(0)).unwrap().iter() {
            assert_abs_diff_eq!(*x, 0.0, epsilon = 1e-12);
        }
        for x in centered.mean_axis(Axis(1)).unwrap().iter() {
            assert_abs_diff_eq!(*x, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn whitening_keeps_the_shape() {
        let data = array![[0.1, 0.5, 0.9, 0.3], [0.7, 0.2, 0.4, 0.8], [0.6, 0.6, 0.1, 0.2]];
        let white = whiten(&data.view()).unwrap();

        assert_eq!(white.dim(), data.dim());
        assert!(white.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn whitening_matrix_is_symmetric() {
        let data = array![[0.1, 0.5, 0.9], [0.7, 0.2, 0.4], [0.6, 0.6, 0.1], [0.3, 0.9, 0.2]];
        let w = whitening_matrix(&data.view()).unwrap();

        assert_eq!(w.dim(), (3, 3));
        for ((i, j), x) in w.indexed_iter() {
            assert_abs_diff_eq!(*x, w[[j, i]], epsilon = 1e-9);
        }
    }

    #[test]
    fn whitened_features_are_decorrelated() {
        // 50 samples x 10 features mixed through a fixed correlating matrix.
        // The operator is estimated from row-centered data, so inputs whose rows
        // do not already have zero mean are not decorrelated by it. Rows are
        // moved onto the zero-sum hyperplane, where row centering is a no-op.
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Uniform::new(-1.0, 1.0);
        let latent = Array::from_shape_fn((50, 10), |_| noise.sample(&mut rng));
        let mixing = Array::from_shape_fn((10, 10), |(i, j)| {
            if i == j {
                3.0
            } else {
                1.0 / (1.0 + (i as f64 - j as f64).abs())
            }
        });
        let mut data = latent.dot(&mixing);
        for mut row in data.rows_mut() {
            let mean = row.mean().unwrap();
            row.mapv_inplace(|x| x - mean);
        }

        let before = covariance(&data);
        assert!(before.indexed_iter().any(|((i, j), x)| i != j && x.abs() > 0.05));

        let after = covariance(&whiten(&data.view()).unwrap());
        for ((i, j), x) in after.indexed_iter() {
            if i != j {
                assert!(x.abs() < 0.05, "covariance[{}][{}] = {}", i, j, x);
            }
        }
    }

    #[test]
    fn rejects_empty_input() {
        let data = Array2::<f64>::zeros((0, 4));

        assert!(matches!(whiten(&data.view()), Err(Error::Shape(_))));
    }
}
