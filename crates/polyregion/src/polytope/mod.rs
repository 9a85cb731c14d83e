//! Convex polytopes with both representations cached.
//!
//! A `ConvexPolytope` is built once, from points (V→H) or from half-spaces
//! (H→V), and then carries its minimal facets, its vertices, an interior
//! point, boundedness, and measures. Operations build new polytopes;
//! only `transform` rewrites one in place.
//!
//! Conventions
//! - Facets are unit-normalized `n·x + c <= 0`, so `contains_point`'s offset
//!   is a Euclidean distance.
//! - Empty: canonical contradictory facet pair, no vertices, NaN interior
//!   point, zero measures, bounded.
//! - Unbounded: vertices are the finite apexes only; area and volume are
//!   infinite.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::cfg::{PolytopeCfg, ORTHONORMAL_EPS};
use crate::duality::{area_and_volume, halfspace_intersection, hull_topology, vertex_hull};
use crate::halfspace::{canonical_empty, dedup_halfspaces, nan_point, Halfspace};
use crate::hull::Hull;
use crate::util::centroid;


/// Errors from operations that take a user-supplied map.
#[derive(Clone, Debug, PartialEq)]
pub enum PolytopeError {
    /// The linear part of the map is not invertible.
    SingularTransform,
    /// A homogeneous matrix whose last row is not `(0, .., 0, 1)`.
    NotAffine,
    DimensionMismatch { expected: usize, got: usize },
}

impl fmt::Display for PolytopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolytopeError::SingularTransform => write!(f, "linear part of the transform is singular"),
            PolytopeError::NotAffine => write!(f, "homogeneous matrix is not affine"),
            PolytopeError::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for PolytopeError {}

/// Facet/vertex incidence of a bounded full-dimensional polytope.
///
/// `facets[k]` is the hyperplane of the face listed in `facet_vertices[k]`;
/// with simplicial facets a hyperplane repeats once per simplex. Vertex
/// indices are positions in `ConvexPolytope::vertices`.
#[derive(Clone, Debug)]
pub struct Topology {
    pub facets: Vec<Halfspace>,
    pub facet_vertices: Vec<Vec<usize>>,
    pub vertex_neighbor_facets: Vec<Vec<usize>>,
    pub facet_neighbor_facets: Vec<Vec<usize>>,
    /// Index of each vertex among the input points (`from_points`) or among
    /// the H→V vertices (`from_halfspaces`).
    pub vertex_point_indices: Vec<usize>,
}

impl Topology {
    fn from_hull(hull: &Hull) -> Self {
        Self {
            facets: hull
                .facets
                .iter()
                .map(|f| Halfspace::new(f.normal.clone(), f.offset))
                .collect(),
            facet_vertices: hull.facets.iter().map(|f| f.vertices.clone()).collect(),
            vertex_neighbor_facets: hull.vertex_neighbor_facets.clone(),
            facet_neighbor_facets: hull.facet_neighbor_facets.clone(),
            vertex_point_indices: hull.vertices.clone(),
        }
    }
}

/// Convex polytope in R^d, possibly empty, unbounded or lower-dimensional.
#[derive(Clone, Debug)]
pub struct ConvexPolytope {
    dim: usize,
    facets: Vec<Halfspace>,
    vertices: Vec<DVector<f64>>,
    interior_point: DVector<f64>,
    empty: bool,
    bounded: bool,
    area: f64,
    volume: f64,
    topology: Option<Topology>,
}

impl ConvexPolytope {
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            facets: canonical_empty(dim),
            vertices: Vec::new(),
            interior_point: nan_point(dim),
            empty: true,
            bounded: true,
            area: 0.0,
            volume: 0.0,
            topology: None,
        }
    }

    /// R^d itself: no facets, origin as interior point.
    pub fn whole_space(dim: usize) -> Self {
        Self {
            dim,
            facets: Vec::new(),
            vertices: Vec::new(),
            interior_point: DVector::zeros(dim),
            empty: false,
            bounded: false,
            area: f64::INFINITY,
            volume: f64::INFINITY,
            topology: None,
        }
    }

    /// Convex hull of `points` (each of length `dim`).
    ///
    /// With `require_full_dimension` a lower-dimensional point set yields the
    /// empty polytope; otherwise it becomes a flat body with zero volume.
    pub fn from_points(points: &[DVector<f64>], dim: usize, cfg: &PolytopeCfg) -> Self {
        let out = vertex_hull(points, dim, cfg.require_full_dimension, cfg.merge_tol);
        if !out.success {
            debug!(points = points.len(), dim, "polytope: no hull, empty");
            return Self::empty(dim);
        }
        let mut poly = Self {
            dim,
            interior_point: centroid(&out.vertices),
            facets: out.facets,
            vertices: out.vertices,
            empty: false,
            bounded: true,
            area: out.area,
            volume: out.volume,
            topology: None,
        };
        if cfg.compute_topology {
            poly.attach_topology(cfg, Some(&out.vertex_ids));
        }
        poly
    }

    /// Intersection of `halfspaces` (each `n·x + c <= 0` in R^`dim`).
    pub fn from_halfspaces(halfspaces: &[Halfspace], dim: usize, cfg: &PolytopeCfg) -> Self {
        let out = halfspace_intersection(halfspaces, dim, cfg.dist_tol, cfg.merge_tol);
        if !out.feasible {
            return Self::empty(dim);
        }
        let (area, volume) = if out.is_bounded {
            area_and_volume(&out.vertices, dim, cfg.merge_tol)
        } else {
            (f64::INFINITY, f64::INFINITY)
        };
        let mut poly = Self {
            dim,
            facets: out.facets,
            vertices: out.vertices,
            interior_point: out.interior_point,
            empty: false,
            bounded: out.is_bounded,
            area,
            volume,
            topology: None,
        };
        if cfg.compute_topology && poly.bounded {
            poly.attach_topology(cfg, None);
        }
        poly
    }

    /// Replace vertices and facets by the hull's and record incidence.
    ///
    /// Facets follow the hull's facet order, one per hyperplane; with
    /// simplicial topology a hyperplane keeps the position of its first
    /// simplex.
    fn attach_topology(&mut self, cfg: &PolytopeCfg, source_ids: Option<&[usize]>) {
        let Some(hull) = hull_topology(&self.vertices, self.dim, cfg.simplicial_facets, cfg.merge_tol)
        else {
            debug!(dim = self.dim, "polytope: topology unavailable for flat body");
            return;
        };
        let vertices = hull.vertices.iter().map(|&i| self.vertices[i].clone()).collect();
        self.vertices = vertices;
        let mut topo = Topology::from_hull(&hull);
        self.facets = dedup_halfspaces(&topo.facets, cfg.dist_tol);
        if let Some(ids) = source_ids {
            topo.vertex_point_indices = hull.vertices.iter().map(|&i| ids[i]).collect();
        }
        self.topology = Some(topo);
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }
    #[inline]
    pub fn facets(&self) -> &[Halfspace] {
        &self.facets
    }
    #[inline]
    pub fn vertices(&self) -> &[DVector<f64>] {
        &self.vertices
    }
    /// NaN-filled when empty.
    #[inline]
    pub fn interior_point(&self) -> &DVector<f64> {
        &self.interior_point
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.bounded
    }
    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }
    #[inline]
    pub fn volume(&self) -> f64 {
        self.volume
    }
    #[inline]
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    /// Intersection of the two bodies; facets of either operand survive only
    /// when still non-redundant.
    pub fn intersection_with(&self, other: &ConvexPolytope, cfg: &PolytopeCfg) -> ConvexPolytope {
        if self.dim != other.dim {
            debug!(lhs = self.dim, rhs = other.dim, "polytope: intersecting across dimensions");
            return Self::empty(self.dim);
        }
        if self.empty || other.empty {
            return Self::empty(self.dim);
        }
        let mut hs = Vec::with_capacity(self.facets.len() + other.facets.len());
        hs.extend(self.facets.iter().cloned());
        hs.extend(other.facets.iter().cloned());
        Self::from_halfspaces(&hs, self.dim, cfg)
    }

    /// True iff every facet holds with slack `offset`: `n·p + c <= -offset`.
    ///
    /// Positive offsets shrink the body, negative ones grow it.
    pub fn contains_point(&self, p: &DVector<f64>, offset: f64) -> bool {
        if self.empty || p.len() != self.dim {
            return false;
        }
        self.facets.iter().all(|h| h.satisfies_eps(p, offset))
    }

    pub fn interior_point_mask(&self, points: &[DVector<f64>], offset: f64) -> Vec<bool> {
        points.iter().map(|p| self.contains_point(p, offset)).collect()
    }

    pub fn interior_point_indices(&self, points: &[DVector<f64>], offset: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.contains_point(p, offset))
            .map(|(i, _)| i)
            .collect()
    }

    /// Apply `x ↦ R x + t` in place.
    ///
    /// Facets follow the contragradient map: with `x = R⁻¹(y - t)`, the row
    /// `n·x + c <= 0` becomes `(R⁻ᵀn)·y + c - (R⁻ᵀn)·t <= 0`, then is
    /// re-normalized. Measures are recomputed unless `R` is orthonormal.
    pub fn transform(&mut self, r: &DMatrix<f64>, t: &DVector<f64>) -> Result<(), PolytopeError> {
        let d = self.dim;
        if r.nrows() != d || r.ncols() != d {
            return Err(PolytopeError::DimensionMismatch {
                expected: d,
                got: r.nrows().max(r.ncols()),
            });
        }
        if t.len() != d {
            return Err(PolytopeError::DimensionMismatch { expected: d, got: t.len() });
        }
        let inv = r.clone().try_inverse().ok_or(PolytopeError::SingularTransform)?;
        if inv.iter().any(|x| !x.is_finite()) {
            return Err(PolytopeError::SingularTransform);
        }
        if self.empty {
            return Ok(());
        }
        let inv_t = inv.transpose();
        let map_facet = |h: &Halfspace| -> Halfspace {
            let n: DVector<f64> = &inv_t * &h.n;
            let moved = Halfspace::new(n.clone(), h.c - n.dot(t));
            moved.unit_normalized().unwrap_or(moved)
        };
        self.facets = self.facets.iter().map(&map_facet).collect();
        self.vertices = self.vertices.iter().map(|v| r * v + t).collect();
        self.interior_point = r * &self.interior_point + t;

        let reflects = r.determinant() < 0.0;
        if let Some(topo) = self.topology.as_mut() {
            topo.facets = topo.facets.iter().map(&map_facet).collect();
            if reflects {
                // Keep faces counterclockwise (3D) / positively oriented seen from outside.
                for face in &mut topo.facet_vertices {
                    if d == 3 {
                        face.reverse();
                    } else if face.len() >= 2 {
                        face.swap(0, 1);
                    }
                }
            }
        }

        let gram = r.transpose() * r;
        let orthonormal = (gram - DMatrix::identity(d, d)).norm() <= ORTHONORMAL_EPS;
        if !orthonormal && self.bounded {
            let (area, volume) = area_and_volume(&self.vertices, d, 0.0);
            self.area = area;
            self.volume = volume;
        }
        Ok(())
    }

    /// Apply a `(d+1)×(d+1)` homogeneous affine matrix `[R t; 0 1]`.
    pub fn transform_homogeneous(&mut self, m: &DMatrix<f64>) -> Result<(), PolytopeError> {
        let (r, t) = split_homogeneous(m, self.dim)?;
        self.transform(&r, &t)
    }
}

/// Split `[R t; 0 1]` into its linear part and translation.
pub(crate) fn split_homogeneous(
    m: &DMatrix<f64>,
    dim: usize,
) -> Result<(DMatrix<f64>, DVector<f64>), PolytopeError> {
    if m.nrows() != dim + 1 || m.ncols() != dim + 1 {
        return Err(PolytopeError::DimensionMismatch {
            expected: dim + 1,
            got: m.nrows().max(m.ncols()),
        });
    }
    let last = m.row(dim);
    let affine = (0..dim).all(|j| last[j].abs() <= ORTHONORMAL_EPS)
        && (last[dim] - 1.0).abs() <= ORTHONORMAL_EPS;
    if !affine {
        return Err(PolytopeError::NotAffine);
    }
    let r = m.view((0, 0), (dim, dim)).into_owned();
    let t = m.view((0, dim), (dim, 1)).column(0).into_owned();
    Ok((r, t))
}
