//! V→H: minimal facets, hull vertices, and measures of a point set.
//!
//! Full-dimensional input goes straight to the hull. Lower-dimensional input
//! of affine rank `r < d` is projected onto its top `r` principal axes, the
//! hull is taken there (or handled directly for `r <= 1`), and the facets are
//! lifted back. Each suppressed axis contributes two opposing half-spaces that
//! pin the body to its affine hull.
//!
//! Lifting a local facet `a·y + b <= 0` with `y = Rᵀ(x - μ)` gives
//! `(R a)·x + b - (R a)·μ <= 0`; `R` is orthonormal, so no inverse is needed.

use nalgebra::DVector;
use tracing::debug;

use crate::cfg::RANK_EPS;
use crate::halfspace::{canonical_empty, Halfspace};
use crate::hull::{convex_hull, volume_of, Hull, HullCfg};
use crate::pca::Pca;
use crate::util::affine_rank;

/// Result of a V→H conversion.
///
/// `vertex_ids` index the input points; `vertices` are those points. On
/// failure `success` is false, `facets` is the canonical empty pair and all
/// other outputs are empty or zero.
#[derive(Clone, Debug)]
pub struct VToH {
    pub vertices: Vec<DVector<f64>>,
    pub vertex_ids: Vec<usize>,
    pub facets: Vec<Halfspace>,
    pub area: f64,
    pub volume: f64,
    pub success: bool,
}

impl VToH {
    pub fn empty(dim: usize) -> Self {
        Self {
            vertices: Vec::new(),
            vertex_ids: Vec::new(),
            facets: canonical_empty(dim),
            area: 0.0,
            volume: 0.0,
            success: false,
        }
    }
}

/// Body measures of a (possibly lower-dimensional) point set.
enum Reduced {
    Full(Hull),
    Projected {
        pca: Pca,
        rank: usize,
        vertex_ids: Vec<usize>,
        local_facets: Vec<Halfspace>,
        area: f64,
    },
}

fn consistent(points: &[DVector<f64>], dim: usize) -> bool {
    points
        .iter()
        .all(|p| p.len() == dim && p.iter().all(|x| x.is_finite()))
}

/// Shared rank analysis behind [`vertex_hull`] and [`area_and_volume`].
fn reduce(points: &[DVector<f64>], dim: usize, require_full_dimension: bool, merge_tol: f64) -> Option<Reduced> {
    if points.is_empty() || !consistent(points, dim) {
        return None;
    }
    let rank = affine_rank(points, RANK_EPS);
    if rank == dim {
        let cfg = HullCfg {
            merge_tol,
            triangulate: false,
        };
        return match convex_hull(points, &cfg) {
            Ok(h) => Some(Reduced::Full(h)),
            Err(err) => {
                debug!(%err, "v_to_h: hull failed");
                None
            }
        };
    }
    if require_full_dimension {
        debug!(rank, dim, "v_to_h: lower-dimensional input rejected");
        return None;
    }

    let pca = Pca::new(points)?;
    let proj: Vec<DVector<f64>> = points.iter().map(|p| pca.project(p, rank)).collect();
    let (vertex_ids, local_facets, area) = match rank {
        0 => (vec![0], Vec::new(), 0.0),
        1 => {
            let mut lo = 0;
            let mut hi = 0;
            for (i, y) in proj.iter().enumerate() {
                if y[0] < proj[lo][0] {
                    lo = i;
                }
                if y[0] > proj[hi][0] {
                    hi = i;
                }
            }
            let (min, max) = (proj[lo][0], proj[hi][0]);
            let facets = vec![
                Halfspace::new(DVector::from_element(1, -1.0), min),
                Halfspace::new(DVector::from_element(1, 1.0), -max),
            ];
            let area = if dim == 2 { max - min } else { 0.0 };
            (vec![lo, hi], facets, area)
        }
        _ => {
            let cfg = HullCfg {
                merge_tol,
                triangulate: false,
            };
            let hull = match convex_hull(&proj, &cfg) {
                Ok(h) => h,
                Err(err) => {
                    debug!(%err, "v_to_h: projected hull failed");
                    return None;
                }
            };
            let facets = hull
                .facets
                .iter()
                .map(|f| Halfspace::new(f.normal.clone(), f.offset))
                .collect();
            let area = if rank + 1 == dim { hull.volume } else { 0.0 };
            (hull.vertices, facets, area)
        }
    };
    Some(Reduced::Projected {
        pca,
        rank,
        vertex_ids,
        local_facets,
        area,
    })
}

/// Convert a point set in R^`dim` to its hull's H-representation.
pub fn vertex_hull(
    points: &[DVector<f64>],
    dim: usize,
    require_full_dimension: bool,
    merge_tol: f64,
) -> VToH {
    let Some(reduced) = reduce(points, dim, require_full_dimension, merge_tol) else {
        return VToH::empty(dim);
    };
    match reduced {
        Reduced::Full(hull) => VToH {
            vertices: hull.vertices.iter().map(|&i| points[i].clone()).collect(),
            facets: hull
                .facets
                .iter()
                .map(|f| Halfspace::new(f.normal.clone(), f.offset))
                .collect(),
            vertex_ids: hull.vertices,
            area: hull.area,
            volume: hull.volume,
            success: true,
        },
        Reduced::Projected {
            pca,
            rank,
            vertex_ids,
            local_facets,
            area,
        } => {
            let basis = pca.axes.columns(0, rank);
            let mut facets: Vec<Halfspace> = local_facets
                .iter()
                .map(|f| {
                    let n: DVector<f64> = &basis * &f.n;
                    let c = f.c - n.dot(&pca.mean);
                    Halfspace::new(n, c)
                })
                .collect();
            for axis in rank..dim {
                let e = pca.axes.column(axis).into_owned();
                let c = e.dot(&pca.mean);
                facets.push(Halfspace::new(-&e, c));
                facets.push(Halfspace::new(e, -c));
            }
            VToH {
                vertices: vertex_ids.iter().map(|&i| points[i].clone()).collect(),
                vertex_ids,
                facets,
                area,
                volume: 0.0,
                success: true,
            }
        }
    }
}

/// Area and volume of the hull of `points` without building facets.
///
/// Lower-dimensional sets have zero volume; their area is the projected
/// volume when they span a hyperplane (segment length in 2D), zero otherwise.
pub fn area_and_volume(points: &[DVector<f64>], dim: usize, merge_tol: f64) -> (f64, f64) {
    if points.is_empty() || !consistent(points, dim) {
        return (0.0, 0.0);
    }
    let rank = affine_rank(points, RANK_EPS);
    if rank == dim {
        let cfg = HullCfg {
            merge_tol,
            triangulate: false,
        };
        return match convex_hull(points, &cfg) {
            Ok(h) => (h.area, h.volume),
            Err(_) => (0.0, 0.0),
        };
    }
    if rank == 0 || rank + 1 != dim {
        return (0.0, 0.0);
    }
    let Some(pca) = Pca::new(points) else {
        return (0.0, 0.0);
    };
    let proj: Vec<DVector<f64>> = points.iter().map(|p| pca.project(p, rank)).collect();
    let area = volume_of(&proj, merge_tol).unwrap_or(0.0);
    (area, 0.0)
}

/// Full hull with topology, or `None` unless the points span R^`dim`.
pub fn hull_topology(
    points: &[DVector<f64>],
    dim: usize,
    simplicial_facets: bool,
    merge_tol: f64,
) -> Option<Hull> {
    if points.len() < dim + 1 || !consistent(points, dim) {
        return None;
    }
    if affine_rank(points, RANK_EPS) < dim {
        return None;
    }
    let cfg = HullCfg {
        merge_tol,
        triangulate: simplicial_facets,
    };
    convex_hull(points, &cfg).ok()
}
