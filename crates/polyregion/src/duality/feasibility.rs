//! Interior points of half-space intersections.
//!
//! Purpose
//! - Find a point strictly inside `{x : n_i·x + c_i <= 0}` or prove the
//!   intersection empty. Every H→V conversion starts here.
//!
//! Why this design
//! - Chebyshev-style QP over `(y, t)`: maximize the margin `t ∈ [0, 1]` with
//!   `n_i·y + c_i + t <= 0`, in normalized local coordinates. The cap keeps the
//!   problem bounded for unbounded regions.
//! - The quadratic term is `ε` times the lifted Gram matrix of the system with
//!   its (near) null directions lifted to one. It keeps the QP strictly convex
//!   without moving the optimum far from the max-margin point.
//! - When a strictly interior point is required and the margin collapses, the
//!   constraints tight at the found point get an opposing partner shifted by
//!   `m - 1`, and the search runs once more on that bounded slab system.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use super::margin::{fix_homogeneous, halfspace_constraints, lifted_gram, regularize};
use super::normalize::NormalizedSystem;
use crate::halfspace::{dedup_halfspaces, nan_point, unit_normalize_all, Halfspace};
use crate::qp;

/// Outcome of a feasibility search. `point` is NaN-filled when infeasible.
#[derive(Clone, Debug)]
pub struct Feasibility {
    pub feasible: bool,
    pub point: DVector<f64>,
}

impl Feasibility {
    fn infeasible(dim: usize) -> Self {
        Self {
            feasible: false,
            point: nan_point(dim),
        }
    }
}

/// Find a point in the intersection of `hs` (all of dimension `dim`).
///
/// With `force_strictly_interior`, the returned point satisfies every
/// half-space with a margin of at least `dist_tol`, or the search fails.
pub fn find_feasible_point(
    hs: &[Halfspace],
    dim: usize,
    dist_tol: f64,
    force_strictly_interior: bool,
) -> Feasibility {
    if hs.is_empty() {
        return Feasibility {
            feasible: true,
            point: DVector::zeros(dim),
        };
    }
    if hs.iter().any(|h| h.dim() != dim) {
        debug!(dim, "feasibility: half-space dimension mismatch");
        return Feasibility::infeasible(dim);
    }
    let Some(unit) = unit_normalize_all(hs, dist_tol) else {
        debug!("feasibility: violated constant constraint");
        return Feasibility::infeasible(dim);
    };
    let unit = dedup_halfspaces(&unit, dist_tol);
    if unit.is_empty() {
        return Feasibility {
            feasible: true,
            point: DVector::zeros(dim),
        };
    }

    let Some(sys) = NormalizedSystem::new(&unit, dim, dist_tol) else {
        return Feasibility::infeasible(dim);
    };
    let Some((y, t)) = max_margin(&sys.halfspaces, dim, dist_tol) else {
        return Feasibility::infeasible(dim);
    };
    trace!(margin = t, "feasibility: max-margin solve");

    if !force_strictly_interior || t >= dist_tol {
        return Feasibility {
            feasible: true,
            point: sys.to_global(&y),
        };
    }

    // Bound the tight directions and retry once, non-strictly.
    let m = sys.halfspaces.len();
    let mut augmented = sys.halfspaces.clone();
    for h in &sys.halfspaces {
        if h.eval(&y).abs() < dist_tol {
            let mut partner = h.negated();
            partner.c -= (m - 1) as f64;
            augmented.push(partner);
        }
    }
    debug!(
        tight = augmented.len() - m,
        "feasibility: margin collapsed, bounding tight directions"
    );
    let inner = find_feasible_point(&augmented, dim, dist_tol, false);
    if !inner.feasible {
        return Feasibility::infeasible(dim);
    }
    let x = sys.to_global(&inner.point);
    if unit.iter().all(|h| h.eval(&x) <= -dist_tol) {
        Feasibility {
            feasible: true,
            point: x,
        }
    } else {
        debug!("feasibility: no strictly interior point");
        Feasibility::infeasible(dim)
    }
}

/// Solve the margin QP on a normalized system. Returns `(y, t)`.
fn max_margin(hs: &[Halfspace], dim: usize, tol: f64) -> Option<(DVector<f64>, f64)> {
    // Variables (y, h, t) with h = 1 eliminated.
    let gram = lifted_gram(hs, dim, 1);
    let form = regularize(gram, tol * tol, 1.0, tol);
    let (g, mut g0) = fix_homogeneous(&form, dim);
    g0[dim] -= 1.0;

    let (ci_hs, ci0_hs) = halfspace_constraints(hs, dim, true);
    let m = hs.len();
    let mut ci = DMatrix::zeros(dim + 1, m + 2);
    let mut ci0 = DVector::zeros(m + 2);
    ci.columns_mut(0, m).copy_from(&ci_hs);
    ci0.rows_mut(0, m).copy_from(&ci0_hs);
    // 0 <= t <= 1
    ci[(dim, m)] = 1.0;
    ci[(dim, m + 1)] = -1.0;
    ci0[m + 1] = 1.0;

    match qp::solve_inequality(&g, &g0, &ci, &ci0) {
        Ok(sol) => {
            let y = sol.x.rows(0, dim).into_owned();
            let t = sol.x[dim];
            if !t.is_finite() || y.iter().any(|v| !v.is_finite()) {
                return None;
            }
            Some((y, t))
        }
        Err(err) => {
            debug!(%err, "feasibility: margin QP failed");
            None
        }
    }
}
