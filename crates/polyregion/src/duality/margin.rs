//! Shared QP assembly for margin searches under half-space constraints.
//!
//! Both the feasibility search and the redundancy test maximize a signed
//! margin subject to `n_i·y + c_i (+ t) <= 0`. They differ only in which
//! quadratic form regularizes the objective. The form is written over the
//! homogeneous coordinates `(y, h)` and the `h = 1` coordinate is eliminated
//! before the solve.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::halfspace::Halfspace;

/// Rebuild `m` (symmetric) from its eigendecomposition with eigenvalues below
/// `floor` replaced by `replacement`, then multiply by `gain`.
pub(crate) fn regularize(m: DMatrix<f64>, floor: f64, replacement: f64, gain: f64) -> DMatrix<f64> {
    let eig = SymmetricEigen::new(m);
    let lambda = eig
        .eigenvalues
        .map(|l| (if l < floor { replacement } else { l }) * gain);
    let v = &eig.eigenvectors;
    v * DMatrix::from_diagonal(&lambda) * v.transpose()
}

/// Fix coordinate `h` of the quadratic form `0.5 zᵀ m z` to one.
///
/// Returns `(G, g)` such that the form equals `0.5 wᵀ G w + gᵀ w + const`
/// over the remaining coordinates `w`.
pub(crate) fn fix_homogeneous(m: &DMatrix<f64>, h: usize) -> (DMatrix<f64>, DVector<f64>) {
    let keep: Vec<usize> = (0..m.nrows()).filter(|&i| i != h).collect();
    let g = m.select_rows(&keep).select_columns(&keep);
    let lin = m.column(h).select_rows(&keep);
    (g, lin)
}

/// Lifted Gram matrix `Σ (n_i, c_i)(n_i, c_i)ᵀ`, padded with `extra` zero
/// rows/columns.
pub(crate) fn lifted_gram(hs: &[Halfspace], dim: usize, extra: usize) -> DMatrix<f64> {
    let size = dim + 1 + extra;
    let mut gram = DMatrix::zeros(size, size);
    for h in hs {
        let mut row = DVector::zeros(size);
        row.rows_mut(0, dim + 1).copy_from(&h.to_coefficients());
        gram += &row * row.transpose();
    }
    gram
}

/// Inequalities `-(n_i·y + c_i + t) >= 0` in solver form (one column per
/// half-space). The margin variable `t` is appended when `with_margin`.
pub(crate) fn halfspace_constraints(
    hs: &[Halfspace],
    dim: usize,
    with_margin: bool,
) -> (DMatrix<f64>, DVector<f64>) {
    let nvars = dim + usize::from(with_margin);
    let mut ci = DMatrix::zeros(nvars, hs.len());
    let mut ci0 = DVector::zeros(hs.len());
    for (i, h) in hs.iter().enumerate() {
        ci.view_mut((0, i), (dim, 1)).copy_from(&(-&h.n));
        if with_margin {
            ci[(dim, i)] = -1.0;
        }
        ci0[i] = -h.c;
    }
    (ci, ci0)
}
