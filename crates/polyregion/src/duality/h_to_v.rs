//! H→V: vertices and minimal facets of a half-space intersection.
//!
//! Pipeline
//! 1. Unit-normalize and find a strictly interior point (empty ⇒ canonical
//!    empty result).
//! 2. If the normals do not span R^d the region is an unbounded cylinder
//!    without vertices; keep the constraints that are not redundant.
//! 3. Otherwise map every constraint to its dual point `n / -c` in local
//!    coordinates around the interior point and take the hull. Dual facets
//!    with negative offset are primal vertices; facets through the origin (or
//!    beyond) mean the region is unbounded. Dual hull vertices are the
//!    primal facets.
//!
//! Each constraint is duplicated with its constant shifted by -1 (a looser
//! copy). The copies keep the dual point set full-dimensional for unbounded
//! regions and never produce a vertex of their own.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::feasibility::find_feasible_point;
use super::normalize::NormalizedSystem;
use super::redundancy::is_redundant;
use crate::halfspace::{canonical_empty, dedup_halfspaces, nan_point, unit_normalize_all, Halfspace};
use crate::hull::raw_hull;
use crate::util::{dedup_point_indices, numerical_rank};

/// Result of an H→V conversion.
///
/// For an empty intersection `feasible` is false, `facets` is the canonical
/// empty pair, `vertices` is empty, and `interior_point` is NaN-filled.
#[derive(Clone, Debug)]
pub struct HToV {
    pub facets: Vec<Halfspace>,
    pub vertices: Vec<DVector<f64>>,
    pub interior_point: DVector<f64>,
    pub is_bounded: bool,
    pub feasible: bool,
}

impl HToV {
    pub fn empty(dim: usize) -> Self {
        Self {
            facets: canonical_empty(dim),
            vertices: Vec::new(),
            interior_point: nan_point(dim),
            is_bounded: true,
            feasible: false,
        }
    }
}

/// Convert the intersection of `hs` (all of dimension `dim`).
pub fn halfspace_intersection(hs: &[Halfspace], dim: usize, dist_tol: f64, merge_tol: f64) -> HToV {
    if hs.iter().any(|h| h.dim() != dim) {
        debug!(dim, "h_to_v: half-space dimension mismatch");
        return HToV::empty(dim);
    }
    let Some(unit) = unit_normalize_all(hs, dist_tol) else {
        return HToV::empty(dim);
    };
    let unit = dedup_halfspaces(&unit, dist_tol);
    let feas = find_feasible_point(&unit, dim, dist_tol, true);
    if !feas.feasible {
        debug!(constraints = hs.len(), "h_to_v: empty intersection");
        return HToV::empty(dim);
    }

    let normals: Vec<DVector<f64>> = unit.iter().map(|h| h.n.clone()).collect();
    let rank = if normals.is_empty() {
        0
    } else {
        numerical_rank(&DMatrix::from_columns(&normals), dist_tol)
    };
    if rank < dim {
        debug!(rank, dim, "h_to_v: normals do not span, filtering redundant constraints");
        return HToV {
            facets: non_redundant(&unit, &feas.point, dist_tol),
            vertices: Vec::new(),
            interior_point: feas.point,
            is_bounded: false,
            feasible: true,
        };
    }

    let Some(sys) = NormalizedSystem::around(&unit, &feas.point, dist_tol) else {
        return HToV::empty(dim);
    };
    let m = sys.halfspaces.len();
    let mut duals: Vec<DVector<f64>> = Vec::with_capacity(2 * m);
    for h in &sys.halfspaces {
        duals.push(&h.n / -h.c);
    }
    for h in &sys.halfspaces {
        duals.push(&h.n / (1.0 - h.c));
    }
    if duals.iter().any(|y| y.iter().any(|v| !v.is_finite())) {
        debug!("h_to_v: interior point lies on a constraint");
        return HToV::empty(dim);
    }
    let dual_hull = match raw_hull(&duals, merge_tol) {
        Ok(h) => h,
        Err(err) => {
            debug!(%err, "h_to_v: dual hull failed");
            return HToV::empty(dim);
        }
    };

    let mut is_bounded = true;
    let mut local_vertices: Vec<DVector<f64>> = Vec::new();
    for f in &dual_hull.facets {
        if f.offset < -dual_hull.tol {
            local_vertices.push(&f.normal / -f.offset);
        } else {
            is_bounded = false;
        }
    }
    let all: Vec<usize> = (0..local_vertices.len()).collect();
    let kept = dedup_point_indices(&local_vertices, &all, dist_tol);
    let local_vertices: Vec<DVector<f64>> = kept.iter().map(|&i| local_vertices[i].clone()).collect();

    let mut facets = Vec::new();
    for &id in &dual_hull.vertices {
        if id >= m {
            continue;
        }
        let h = &sys.halfspaces[id];
        let touches = local_vertices.iter().any(|v| h.eval(v).abs() < dist_tol);
        if touches {
            facets.push(unit[id].clone());
        }
    }
    let vertices = local_vertices.iter().map(|v| sys.to_global(v)).collect();

    HToV {
        facets,
        vertices,
        interior_point: feas.point,
        is_bounded,
        feasible: true,
    }
}

/// Constraints not implied by the others. `distinct` holds no duplicates.
fn non_redundant(distinct: &[Halfspace], feasible_point: &DVector<f64>, dist_tol: f64) -> Vec<Halfspace> {
    let mut keep = Vec::with_capacity(distinct.len());
    for i in 0..distinct.len() {
        let others: Vec<Halfspace> = distinct
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, h)| h.clone())
            .collect();
        if !is_redundant(&distinct[i], &others, feasible_point, dist_tol) {
            keep.push(distinct[i].clone());
        }
    }
    keep
}
