//! Convex hulls of point sets in R^d.
//!
//! Purpose
//! - Provide the hull oracle behind both conversions: primal hulls for V→H,
//!   and hulls of dual points for H→V.
//! - Report vertices, facets (outward unit normal + offset), adjacency, and the
//!   boundary and interior measures.
//!
//! Why this design (short)
//! - Every facet is a supporting hyperplane through d affinely independent
//!   input points. Small inputs enumerate d-subsets, keep hyperplanes with all
//!   points on one side, and dedup by incidence set.
//! - Larger inputs (more than `HULL_ENUMERATION_LIMIT` subsets) build a
//!   simplicial hull incrementally (`incremental.rs`) and group coplanar
//!   simplices by incidence set.
//! - Vertices are points whose incident facet normals span R^d; coincident
//!   points collapse to the first occurrence.
//! - Measures recurse through facets: a k-volume is the sum of facet
//!   (k-1)-volumes times heights over k, in the facet's own hyperplane.
//!
//! Conventions
//! - A facet `(normal, offset)` contains the hull on the side
//!   `normal·x + offset <= 0`.
//! - `area` is the total (d-1)-measure of the boundary (perimeter in 2D).

mod incremental;
mod measure;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::cfg::{HULL_ENUMERATION_LIMIT, HULL_EPS, NORMAL_RANK_EPS, RANK_EPS};
use crate::util::{affine_rank, centroid, numerical_rank, orthonormal_complement, Combinations};

pub(crate) use measure::{project_onto_facet, volume_of};

/// Errors surfaced by the hull oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum HullError {
    /// No points given.
    Empty,
    /// Points disagree on their dimension (or the dimension is zero).
    DimensionMismatch,
    /// A coordinate is NaN or infinite.
    NonFinite,
    /// Fewer than `dim + 1` points cannot span a full-dimensional hull.
    TooFewPoints { dim: usize, points: usize },
    /// The points span an affine subspace of dimension `rank < dim`.
    LowerDimensional { dim: usize, rank: usize },
}

impl fmt::Display for HullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HullError::Empty => write!(f, "convex hull of an empty point set"),
            HullError::DimensionMismatch => write!(f, "points have inconsistent dimensions"),
            HullError::NonFinite => write!(f, "point coordinates must be finite"),
            HullError::TooFewPoints { dim, points } => write!(
                f,
                "{} points cannot span a {}-dimensional hull (need at least {})",
                points,
                dim,
                dim + 1
            ),
            HullError::LowerDimensional { dim, rank } => write!(
                f,
                "points span only {} of {} dimensions",
                rank, dim
            ),
        }
    }
}

impl std::error::Error for HullError {}

/// Hull options.
///
/// - `merge_tol`: absolute coplanarity tolerance; the relative built-in
///   epsilon applies when larger.
/// - `triangulate`: split every facet into simplices (d vertices each).
#[derive(Clone, Copy, Debug, Default)]
pub struct HullCfg {
    pub merge_tol: f64,
    pub triangulate: bool,
}

/// One facet. `vertices` are positions into [`Hull::vertices`]; in 3D they
/// are ordered counterclockwise seen from outside.
#[derive(Clone, Debug)]
pub struct HullFacet {
    pub normal: DVector<f64>,
    pub offset: f64,
    pub vertices: Vec<usize>,
}

impl HullFacet {
    #[inline]
    pub fn eval(&self, p: &DVector<f64>) -> f64 {
        self.normal.dot(p) + self.offset
    }
}

/// Convex hull with topology and measures.
#[derive(Clone, Debug)]
pub struct Hull {
    pub dim: usize,
    /// Input point ids of the hull vertices.
    pub vertices: Vec<usize>,
    pub facets: Vec<HullFacet>,
    /// For each vertex position, the facets containing it.
    pub vertex_neighbor_facets: Vec<Vec<usize>>,
    /// For each facet, the facets sharing a ridge with it.
    pub facet_neighbor_facets: Vec<Vec<usize>>,
    pub area: f64,
    pub volume: f64,
}

/// Facet found by enumeration; `points` are input ids.
#[derive(Clone, Debug)]
pub(crate) struct RawFacet {
    pub normal: DVector<f64>,
    pub offset: f64,
    pub points: Vec<usize>,
}

/// Vertices and facets without topology or measures.
#[derive(Clone, Debug)]
pub(crate) struct RawHull {
    pub vertices: Vec<usize>,
    pub facets: Vec<RawFacet>,
    pub tol: f64,
}

fn validate(points: &[DVector<f64>]) -> Result<usize, HullError> {
    let first = points.first().ok_or(HullError::Empty)?;
    let dim = first.len();
    if dim == 0 || points.iter().any(|p| p.len() != dim) {
        return Err(HullError::DimensionMismatch);
    }
    if points.iter().any(|p| p.iter().any(|x| !x.is_finite())) {
        return Err(HullError::NonFinite);
    }
    if points.len() < dim + 1 {
        return Err(HullError::TooFewPoints {
            dim,
            points: points.len(),
        });
    }
    Ok(dim)
}

/// Vertices and facets of a full-dimensional point set.
pub(crate) fn raw_hull(points: &[DVector<f64>], merge_tol: f64) -> Result<RawHull, HullError> {
    let dim = validate(points)?;
    let center = centroid(points);
    let radius = points
        .iter()
        .map(|p| (p - &center).norm())
        .fold(0.0_f64, f64::max);
    let rank = if radius > 0.0 {
        affine_rank(points, RANK_EPS)
    } else {
        0
    };
    if rank < dim {
        return Err(HullError::LowerDimensional { dim, rank });
    }
    let tol = merge_tol.max(HULL_EPS * radius);

    let planes = if subset_count(points.len(), dim) > HULL_ENUMERATION_LIMIT {
        let planes = incremental::hull_planes(points, dim, tol);
        if planes.is_none() {
            debug!(points = points.len(), dim, "hull: incremental build degenerated, enumerating");
        }
        planes
    } else {
        None
    };
    let facets = match planes {
        Some(planes) => facets_from_planes(points, planes, tol),
        None => enumerate_facets(points, dim, tol),
    };
    Ok(with_vertices(points, dim, facets, tol))
}

/// Every supporting hyperplane through `dim` of the points, deduplicated by
/// incidence set.
fn enumerate_facets(points: &[DVector<f64>], dim: usize, tol: f64) -> Vec<RawFacet> {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut facets = Vec::new();
    for comb in Combinations::new(points.len(), dim) {
        let Some((normal, offset)) = hyperplane_through(points, &comb, tol) else {
            continue;
        };
        let vals: Vec<f64> = points.iter().map(|p| normal.dot(p) + offset).collect();
        let (normal, offset) = if vals.iter().all(|&v| v <= tol) {
            (normal, offset)
        } else if vals.iter().all(|&v| v >= -tol) {
            (-normal, -offset)
        } else {
            continue;
        };
        let incident: Vec<usize> = (0..points.len()).filter(|&i| vals[i].abs() <= tol).collect();
        if seen.insert(incident.clone()) {
            facets.push(RawFacet {
                normal,
                offset,
                points: incident,
            });
        }
    }
    facets
}

/// Group supporting hyperplanes by their incidence sets; a plane whose
/// incident points all lie on an already kept plane is the same facet.
fn facets_from_planes(points: &[DVector<f64>], planes: Vec<(DVector<f64>, f64)>, tol: f64) -> Vec<RawFacet> {
    let mut facets: Vec<RawFacet> = planes
        .into_iter()
        .map(|(normal, offset)| {
            let incident = (0..points.len())
                .filter(|&i| (normal.dot(&points[i]) + offset).abs() <= tol)
                .collect();
            RawFacet {
                normal,
                offset,
                points: incident,
            }
        })
        .collect();
    facets.sort_by(|a, b| b.points.len().cmp(&a.points.len()));
    let mut kept: Vec<RawFacet> = Vec::new();
    for f in facets {
        let covered = kept
            .iter()
            .any(|k| f.points.iter().all(|i| k.points.binary_search(i).is_ok()));
        if !covered {
            kept.push(f);
        }
    }
    kept
}

/// Extreme points (incident normals span R^d, coincident points collapsed to
/// the first), with facets restricted to them.
fn with_vertices(points: &[DVector<f64>], dim: usize, mut facets: Vec<RawFacet>, tol: f64) -> RawHull {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for (fi, f) in facets.iter().enumerate() {
        for &i in &f.points {
            incident[i].push(fi);
        }
    }
    let mut vertices: Vec<usize> = Vec::new();
    for i in 0..points.len() {
        if incident[i].len() < dim {
            continue;
        }
        let normals: Vec<DVector<f64>> = incident[i].iter().map(|&fi| facets[fi].normal.clone()).collect();
        if numerical_rank(&DMatrix::from_columns(&normals), NORMAL_RANK_EPS) < dim {
            continue;
        }
        if vertices
            .iter()
            .any(|&j| (&points[i] - &points[j]).norm() <= tol)
        {
            continue;
        }
        vertices.push(i);
    }
    let vertex_set: HashSet<usize> = vertices.iter().copied().collect();
    for f in &mut facets {
        f.points.retain(|i| vertex_set.contains(i));
    }
    facets.retain(|f| f.points.len() >= dim);

    RawHull {
        vertices,
        facets,
        tol,
    }
}

/// `C(n, k)`, saturating.
fn subset_count(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let mut count: usize = 1;
    for i in 0..k {
        count = count.saturating_mul(n - i) / (i + 1);
    }
    count
}

/// Hyperplane through the points `comb` (d of them), `None` when they are
/// affinely dependent.
fn hyperplane_through(
    points: &[DVector<f64>],
    comb: &[usize],
    tol: f64,
) -> Option<(DVector<f64>, f64)> {
    let p0 = &points[comb[0]];
    let dim = p0.len();
    // Square system with a zero last row; the null direction is the normal.
    let mut m = DMatrix::zeros(dim, dim);
    for (r, &i) in comb[1..].iter().enumerate() {
        m.set_row(r, &(&points[i] - p0).transpose());
    }
    let svd = m.svd(false, true);
    let v_t = svd.v_t?;
    let sv = &svd.singular_values;
    let mut imin = 0;
    for i in 1..sv.len() {
        if sv[i] < sv[imin] {
            imin = i;
        }
    }
    if sv.iter().enumerate().any(|(i, &s)| i != imin && s <= tol) {
        return None;
    }
    let normal: DVector<f64> = v_t.row(imin).transpose();
    let norm = normal.norm();
    if !(norm.is_finite() && norm > 0.0) {
        return None;
    }
    let normal = normal / norm;
    let offset = -normal.dot(p0);
    Some((normal, offset))
}

/// Convex hull of a full-dimensional point set.
pub fn convex_hull(points: &[DVector<f64>], cfg: &HullCfg) -> Result<Hull, HullError> {
    let raw = raw_hull(points, cfg.merge_tol)?;
    let dim = points[0].len();
    let mut position = vec![usize::MAX; points.len()];
    for (pos, &id) in raw.vertices.iter().enumerate() {
        position[id] = pos;
    }
    let vertex_points: Vec<DVector<f64>> = raw.vertices.iter().map(|&i| points[i].clone()).collect();
    let center = centroid(&vertex_points);

    let mut facets: Vec<HullFacet> = Vec::new();
    let mut area = 0.0;
    let mut volume = 0.0;
    for f in &raw.facets {
        let coords = project_onto_facet(points, &f.points, &f.normal);
        let measure = volume_of(&coords, raw.tol)?;
        let height = -(f.normal.dot(&center) + f.offset);
        area += measure;
        volume += measure * height / dim as f64;

        if cfg.triangulate && f.points.len() > dim {
            for simplex in measure::triangulate(&coords, raw.tol)? {
                let ids: Vec<usize> = simplex.iter().map(|&k| f.points[k]).collect();
                let oriented = orient_simplex(points, ids, &f.normal);
                facets.push(HullFacet {
                    normal: f.normal.clone(),
                    offset: f.offset,
                    vertices: oriented.iter().map(|&i| position[i]).collect(),
                });
            }
            continue;
        }
        let ids = if dim == 3 {
            order_polygon(points, &f.points, &f.normal)
        } else if f.points.len() == dim {
            orient_simplex(points, f.points.clone(), &f.normal)
        } else {
            f.points.clone()
        };
        facets.push(HullFacet {
            normal: f.normal.clone(),
            offset: f.offset,
            vertices: ids.iter().map(|&i| position[i]).collect(),
        });
    }

    let mut vertex_neighbor_facets = vec![Vec::new(); raw.vertices.len()];
    for (fi, f) in facets.iter().enumerate() {
        for &v in &f.vertices {
            vertex_neighbor_facets[v].push(fi);
        }
    }
    let facet_neighbor_facets = facet_adjacency(&vertex_points, &facets, &vertex_neighbor_facets, dim);

    Ok(Hull {
        dim,
        vertices: raw.vertices,
        facets,
        vertex_neighbor_facets,
        facet_neighbor_facets,
        area,
        volume,
    })
}

/// Two facets are neighbors when their shared vertices span a ridge. Only
/// pairs meeting at some vertex are tested.
fn facet_adjacency(
    vertex_points: &[DVector<f64>],
    facets: &[HullFacet],
    vertex_neighbor_facets: &[Vec<usize>],
    dim: usize,
) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); facets.len()];
    if dim < 2 {
        return out;
    }
    let mut tested: HashSet<(usize, usize)> = HashSet::new();
    for around in vertex_neighbor_facets {
        for (x, &a) in around.iter().enumerate() {
            for &b in &around[x + 1..] {
                let (a, b) = (a.min(b), a.max(b));
                if a == b || !tested.insert((a, b)) {
                    continue;
                }
                let shared: Vec<DVector<f64>> = facets[a]
                    .vertices
                    .iter()
                    .filter(|v| facets[b].vertices.contains(v))
                    .map(|&v| vertex_points[v].clone())
                    .collect();
                if shared.len() + 1 < dim {
                    continue;
                }
                if affine_rank(&shared, RANK_EPS) + 2 >= dim {
                    out[a].push(b);
                    out[b].push(a);
                }
            }
        }
    }
    for nbrs in &mut out {
        nbrs.sort_unstable();
    }
    out
}

/// Order the vertices of a 3D facet counterclockwise around `normal`.
fn order_polygon(points: &[DVector<f64>], ids: &[usize], normal: &DVector<f64>) -> Vec<usize> {
    let basis = orthonormal_complement(normal);
    let local: Vec<DVector<f64>> = ids.iter().map(|&i| points[i].clone()).collect();
    let c = centroid(&local);
    let mut items: Vec<(f64, usize)> = ids
        .iter()
        .map(|&i| {
            let rel = &points[i] - &c;
            let x = basis.column(0).dot(&rel);
            let y = basis.column(1).dot(&rel);
            (y.atan2(x), i)
        })
        .collect();
    items.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut ordered: Vec<usize> = items.into_iter().map(|(_, i)| i).collect();
    if ordered.len() >= 3 {
        let e1 = &points[ordered[1]] - &points[ordered[0]];
        let e2 = &points[ordered[2]] - &points[ordered[0]];
        let cross = DVector::from_vec(vec![
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]);
        if cross.dot(normal) < 0.0 {
            ordered.reverse();
        }
    }
    ordered
}

/// Orient a facet simplex so that `det[v1-v0, .., v_{d-1}-v0, normal] > 0`.
fn orient_simplex(points: &[DVector<f64>], mut ids: Vec<usize>, normal: &DVector<f64>) -> Vec<usize> {
    let dim = normal.len();
    if ids.len() != dim || dim < 2 {
        return ids;
    }
    let mut m = DMatrix::zeros(dim, dim);
    for r in 0..dim - 1 {
        m.set_row(r, &(&points[ids[r + 1]] - &points[ids[0]]).transpose());
    }
    m.set_row(dim - 1, &normal.transpose());
    if m.determinant() < 0.0 {
        ids.swap(0, 1);
    }
    ids
}
