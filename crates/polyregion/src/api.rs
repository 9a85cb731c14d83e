//! Curated surface for callers that want the engine pieces directly.
//!
//! Important
//! - Most callers only need `ConvexPolytope` and `SpaceRegion` (see the
//!   crate prelude). This module adds the converters and oracles underneath
//!   them for diagnostics, tooling, and benchmarks.

// Representation conversion
pub use crate::duality::{
    area_and_volume, find_feasible_point, halfspace_intersection, hull_topology, is_redundant,
    vertex_hull, Feasibility, HToV, NormalizedSystem, VToH,
};
// Oracles
pub use crate::hull::{convex_hull, Hull, HullCfg, HullError, HullFacet};
pub use crate::pca::Pca;
pub use crate::qp::{solve as solve_qp, QpError, QpProblem, QpSolution};
// Types
pub use crate::cfg::PolytopeCfg;
pub use crate::halfspace::{canonical_empty, is_nan_point, nan_point, unit_normalize_all, Halfspace};
pub use crate::polytope::{ConvexPolytope, PolytopeError, Topology};
pub use crate::region::SpaceRegion;
