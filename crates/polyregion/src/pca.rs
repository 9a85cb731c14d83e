//! Principal axes of a point cloud.
//!
//! Used by the V→H path to project lower-dimensional point sets onto the
//! subspace they span. The basis is orthonormal, so the projection and its
//! inverse are transposes of each other.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::util::{centered_columns, centroid};

/// Mean and principal directions of a point set.
///
/// `axes` holds unit eigenvectors of the covariance as columns, ordered by
/// descending eigenvalue; `variances` holds the matching eigenvalues.
#[derive(Clone, Debug)]
pub struct Pca {
    pub mean: DVector<f64>,
    pub axes: DMatrix<f64>,
    pub variances: DVector<f64>,
}

impl Pca {
    /// `None` for an empty point set.
    pub fn new(points: &[DVector<f64>]) -> Option<Self> {
        let first = points.first()?;
        let dim = first.len();
        let mean = centroid(points);
        let centered = centered_columns(points);
        let cov = (&centered * centered.transpose()) / points.len() as f64;
        let eig = SymmetricEigen::new(cov);
        let mut order: Vec<usize> = (0..dim).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));
        let mut axes = DMatrix::zeros(dim, dim);
        let mut variances = DVector::zeros(dim);
        for (k, &i) in order.iter().enumerate() {
            axes.set_column(k, &eig.eigenvectors.column(i));
            variances[k] = eig.eigenvalues[i];
        }
        Some(Self {
            mean,
            axes,
            variances,
        })
    }

    /// Coordinates of `p` along the first `k` axes.
    pub fn project(&self, p: &DVector<f64>, k: usize) -> DVector<f64> {
        self.axes.columns(0, k).transpose() * (p - &self.mean)
    }
}
