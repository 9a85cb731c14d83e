//! Half-space/vertex duality engine.
//!
//! Purpose
//! - Convert between H-representations (intersections of `n·x + c <= 0`) and
//!   V-representations (hulls of points), including unbounded, empty, and
//!   lower-dimensional bodies.
//!
//! Why this design (short)
//! - Everything funnels through three numeric primitives: conditioning
//!   (`normalize`), a margin QP (`feasibility`, `redundancy`, sharing
//!   `margin`), and the hull oracle (`crate::hull`).
//! - Outcomes such as "empty" or "lower-dimensional" are results, not errors:
//!   converters return plain structs with flags and sentinel values (NaN point,
//!   canonical empty pair). Oracle failures collapse into "empty".
//!
//! Data flow
//! - H→V: normalize → strictly interior point → rank test → dual hull (or
//!   redundancy filtering for non-spanning normals).
//! - V→H: rank test → hull, or PCA projection → hull/special cases → lift.

mod feasibility;
mod h_to_v;
mod margin;
mod normalize;
mod redundancy;
mod v_to_h;

pub use feasibility::{find_feasible_point, Feasibility};
pub use h_to_v::{halfspace_intersection, HToV};
pub use normalize::NormalizedSystem;
pub use redundancy::is_redundant;
pub use v_to_h::{area_and_volume, hull_topology, vertex_hull, VToH};
