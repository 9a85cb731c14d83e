//! Small utilities: combinations, centroids, rank and basis helpers.

use nalgebra::{DMatrix, DVector};

/// k-combinations of `0..n` in lexicographic order.
///
/// Yields nothing when `k > n`; yields a single empty combination when
/// `k == 0`.
pub(crate) struct Combinations {
    n: usize,
    idx: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            idx: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let out = self.idx.clone();
        let k = self.idx.len();
        // Advance the rightmost index that still has room.
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.idx[i] < self.n - k + i {
                self.idx[i] += 1;
                for j in i + 1..k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
                break;
            }
        }
        Some(out)
    }
}

/// Arithmetic mean of a non-empty point set.
pub(crate) fn centroid(points: &[DVector<f64>]) -> DVector<f64> {
    let dim = points.first().map_or(0, |p| p.len());
    let mut acc = DVector::zeros(dim);
    for p in points {
        acc += p;
    }
    if !points.is_empty() {
        acc /= points.len() as f64;
    }
    acc
}

/// Indices of the first representative of every cluster of points closer
/// than `tol` to an earlier kept point.
pub(crate) fn dedup_point_indices(points: &[DVector<f64>], ids: &[usize], tol: f64) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(ids.len());
    for &i in ids {
        if kept.iter().all(|&j| (&points[i] - &points[j]).norm() > tol) {
            kept.push(i);
        }
    }
    kept
}

/// Numerical rank of `m`: singular values above `rel_eps * sigma_max`.
pub(crate) fn numerical_rank(m: &DMatrix<f64>, rel_eps: f64) -> usize {
    if m.nrows() == 0 || m.ncols() == 0 {
        return 0;
    }
    let sv = m.clone().svd(false, false).singular_values;
    let max = sv.max();
    if max.is_nan() || max <= 0.0 {
        return 0;
    }
    sv.iter().filter(|&&s| s > rel_eps * max).count()
}

/// Columns are the points minus their centroid.
pub(crate) fn centered_columns(points: &[DVector<f64>]) -> DMatrix<f64> {
    let dim = points.first().map_or(0, |p| p.len());
    let mean = centroid(points);
    let mut m = DMatrix::zeros(dim, points.len());
    for (j, p) in points.iter().enumerate() {
        m.set_column(j, &(p - &mean));
    }
    m
}

/// Affine rank of a point set (0 for a single point or exact repeats).
pub(crate) fn affine_rank(points: &[DVector<f64>], rel_eps: f64) -> usize {
    if points.len() < 2 {
        return 0;
    }
    numerical_rank(&centered_columns(points), rel_eps)
}

/// Orthonormal basis (as columns, `d x (d-1)`) of the hyperplane orthogonal
/// to the unit vector `normal`.
///
/// Gram-Schmidt over the `d-1` coordinate axes least aligned with `normal`;
/// together with `normal` they are always linearly independent.
pub(crate) fn orthonormal_complement(normal: &DVector<f64>) -> DMatrix<f64> {
    let d = normal.len();
    let mut axes: Vec<usize> = (0..d).collect();
    axes.sort_by(|&a, &b| normal[a].abs().total_cmp(&normal[b].abs()));
    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(d.saturating_sub(1));
    for &axis in axes.iter().take(d.saturating_sub(1)) {
        let mut v = DVector::zeros(d);
        v[axis] = 1.0;
        v -= normal * normal.dot(&v);
        for b in &basis {
            v -= b * b.dot(&v);
        }
        let norm = v.norm();
        basis.push(v / norm);
    }
    if basis.is_empty() {
        return DMatrix::zeros(d, 0);
    }
    DMatrix::from_columns(&basis)
}
