//! Redundant-constraint test.
//!
//! A candidate half-space is redundant when no point satisfying all the other
//! constraints can violate it by more than `dist_tol`. We maximize the
//! candidate's signed value `n·y + c` (capped softly at one) over the other
//! constraints, in coordinates centered at a known feasible point.
//!
//! The QP objective is `0.5 (n·y + c)² - n·y`; its quadratic form is the
//! candidate's lifted outer product with the null directions floored at `ε²`.
//! Results are only reliable when the feasible point sits well inside the
//! region.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::margin::{fix_homogeneous, halfspace_constraints, regularize};
use super::normalize::NormalizedSystem;
use crate::cfg::GRAM_FLOOR_MIN;
use crate::halfspace::{dedup_halfspaces, unit_normalize_all, Halfspace};
use crate::qp;

/// True if `candidate` is implied by `others` near `feasible_point`.
///
/// A zero-normal candidate is redundant exactly when it holds everywhere
/// (`c <= dist_tol`). If `others` contains a violated constant row, their
/// intersection is empty and every candidate counts as redundant.
pub fn is_redundant(
    candidate: &Halfspace,
    others: &[Halfspace],
    feasible_point: &DVector<f64>,
    dist_tol: f64,
) -> bool {
    let dim = candidate.dim();
    if feasible_point.len() != dim || others.iter().any(|h| h.dim() != dim) {
        debug!(dim, "redundancy: dimension mismatch, keeping constraint");
        return false;
    }
    let Some(test) = candidate.unit_normalized() else {
        return candidate.c <= dist_tol;
    };
    let Some(all) = unit_normalize_all(others, dist_tol) else {
        return true;
    };
    let mut all = dedup_halfspaces(&all, dist_tol);
    all.push(test);
    let Some(sys) = NormalizedSystem::around(&all, feasible_point, dist_tol) else {
        return false;
    };
    let Some((test, rest)) = sys.halfspaces.split_last() else {
        return false;
    };

    let coeffs = test.to_coefficients();
    let floor = (dist_tol * dist_tol).max(GRAM_FLOOR_MIN);
    let form = regularize(&coeffs * coeffs.transpose(), floor, floor, 1.0);
    let (g, g0) = fix_homogeneous(&form, dim);
    let g0 = g0 - &test.n;
    let (ci, ci0): (DMatrix<f64>, DVector<f64>) = halfspace_constraints(rest, dim, false);

    match qp::solve_inequality(&g, &g0, &ci, &ci0) {
        Ok(sol) => {
            let reach = test.eval(&sol.x);
            reach.is_finite() && reach < -dist_tol
        }
        Err(err) => {
            debug!(%err, "redundancy: QP failed, keeping constraint");
            false
        }
    }
}
