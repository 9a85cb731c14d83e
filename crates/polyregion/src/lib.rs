//! Convex polytopes and unions of them in arbitrary dimension.
//!
//! Layers, leaves first:
//! - `qp`, `hull`, `pca`: numeric oracles (quadratic programs, convex hulls,
//!   principal axes).
//! - `duality`: H↔V conversion, feasibility search, redundancy tests.
//! - `polytope`: `ConvexPolytope` with both representations cached.
//! - `region`: `SpaceRegion`, the Boolean algebra over unions of polytopes.
//!
//! API Policy
//! - Dimension is a run-time parameter; points are `nalgebra::DVector<f64>`.
//! - Geometric outcomes (empty, unbounded, flat) are values, not errors.
//!   Typed errors are reserved for malformed input to the oracles and maps.

pub mod api;
pub mod cfg;
pub mod duality;
pub mod halfspace;
pub mod hull;
pub mod pca;
pub mod polytope;
pub mod qp;
pub mod region;
mod util;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::PolytopeCfg;
pub use halfspace::{nan_point, Halfspace};
pub use polytope::{ConvexPolytope, PolytopeError, Topology};
pub use region::SpaceRegion;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::PolytopeCfg;
    pub use crate::halfspace::{is_nan_point, nan_point, Halfspace};
    pub use crate::polytope::{ConvexPolytope, PolytopeError, Topology};
    pub use crate::region::SpaceRegion;
    pub use nalgebra::{DMatrix, DVector};
}
