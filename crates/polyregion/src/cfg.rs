//! Tolerances and construction options.
//!
//! Policy
//! - Caller-facing knobs (`dist_tol`, `merge_tol`, topology flags) live in
//!   `PolytopeCfg` and travel with each construction call.
//! - Internal thresholds are fixed constants. They are relative to the scale
//!   of the data they test, so callers never need to touch them.

/// Relative epsilon for coplanarity inside the hull enumeration (scaled by the
/// radius of the point cloud).
pub(crate) const HULL_EPS: f64 = 1e-9;
/// Above this many d-subsets the hull is built incrementally instead of by
/// enumeration.
pub(crate) const HULL_ENUMERATION_LIMIT: usize = 20_000;
/// Relative singular-value threshold for the affine rank of point clouds.
pub(crate) const RANK_EPS: f64 = 1e-9;
/// Threshold for deciding that a set of unit facet normals spans R^d.
pub(crate) const NORMAL_RANK_EPS: f64 = 1e-9;
/// Smallest eigenvalue floor used when regularizing Gram matrices.
pub(crate) const GRAM_FLOOR_MIN: f64 = 1e-14;
/// Tolerance for accepting a linear map as orthonormal (`RᵀR ≈ I`).
pub(crate) const ORTHONORMAL_EPS: f64 = 1e-9;
/// Active-set iterations allowed per variable/constraint in the QP solver.
pub(crate) const QP_ITERS_PER_ROW: usize = 50;

/// Options for building polytopes from points or half-spaces.
///
/// - `dist_tol`: distance tolerance for feasibility, redundancy, and facet
///   support tests.
/// - `merge_tol`: coplanarity tolerance handed to the hull; `0.0` means only
///   the built-in relative epsilon is used.
/// - `compute_topology`: also compute facet/vertex incidence and adjacency.
/// - `simplicial_facets`: triangulate facets when computing topology.
/// - `require_full_dimension`: treat lower-dimensional point sets as empty
///   when building from points.
#[derive(Clone, Copy, Debug)]
pub struct PolytopeCfg {
    pub dist_tol: f64,
    pub merge_tol: f64,
    pub compute_topology: bool,
    pub simplicial_facets: bool,
    pub require_full_dimension: bool,
}

impl Default for PolytopeCfg {
    fn default() -> Self {
        Self {
            dist_tol: 1e-7,
            merge_tol: 0.0,
            compute_topology: false,
            simplicial_facets: false,
            require_full_dimension: true,
        }
    }
}

impl PolytopeCfg {
    #[inline]
    pub fn with_topology(mut self, simplicial_facets: bool) -> Self {
        self.compute_topology = true;
        self.simplicial_facets = simplicial_facets;
        self
    }

    #[inline]
    pub fn allow_lower_dimensional(mut self) -> Self {
        self.require_full_dimension = false;
        self
    }
}
