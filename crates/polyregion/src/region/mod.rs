//! Space regions: finite unions of convex polytopes.
//!
//! Members may overlap; nothing is pruned on union. Boolean operations work
//! on H-representations and return new regions.
//!
//! Cost
//! - `complement` builds one candidate per choice of a facet from every
//!   member: `∏ facets(Pᵢ)` H→V conversions.
//! - `volume` uses inclusion-exclusion over the `2ⁿ - 1` member subsets
//!   (empty intersections prune their supersets).
//!   Both are exponential; keep inputs small.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use crate::cfg::PolytopeCfg;
use crate::halfspace::{nan_point, Halfspace};
use crate::polytope::{split_homogeneous, ConvexPolytope, PolytopeError};

#[cfg(test)]
mod tests;

/// Union of convex polytopes in R^`dim`.
#[derive(Clone, Debug)]
pub struct SpaceRegion {
    dim: usize,
    polytopes: Vec<ConvexPolytope>,
}

impl SpaceRegion {
    /// Region from members; members of another dimension are dropped.
    pub fn new(dim: usize, polytopes: Vec<ConvexPolytope>) -> Self {
        let before = polytopes.len();
        let polytopes: Vec<ConvexPolytope> = polytopes.into_iter().filter(|p| p.dim() == dim).collect();
        if polytopes.len() != before {
            debug!(dim, dropped = before - polytopes.len(), "region: members of other dimension dropped");
        }
        Self { dim, polytopes }
    }

    /// The empty region (no members).
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            polytopes: Vec::new(),
        }
    }

    pub fn from_polytope(polytope: ConvexPolytope) -> Self {
        Self {
            dim: polytope.dim(),
            polytopes: vec![polytope],
        }
    }

    pub fn from_polytopes(dim: usize, polytopes: Vec<ConvexPolytope>) -> Self {
        Self::new(dim, polytopes)
    }

    pub fn from_points(points: &[DVector<f64>], dim: usize, cfg: &PolytopeCfg) -> Self {
        Self::from_polytope(ConvexPolytope::from_points(points, dim, cfg))
    }

    pub fn from_halfspaces(halfspaces: &[Halfspace], dim: usize, cfg: &PolytopeCfg) -> Self {
        Self::from_polytope(ConvexPolytope::from_halfspaces(halfspaces, dim, cfg))
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn polytopes(&self) -> &[ConvexPolytope] {
        &self.polytopes
    }

    /// Concatenation of both member lists.
    pub fn union_with(&self, other: &SpaceRegion) -> SpaceRegion {
        let mut polytopes = self.polytopes.clone();
        polytopes.extend(other.polytopes.iter().cloned());
        Self::new(self.dim, polytopes)
    }

    /// Pairwise member intersections, empty ones dropped.
    pub fn intersection_with(&self, other: &SpaceRegion, cfg: &PolytopeCfg) -> SpaceRegion {
        let mut polytopes = Vec::new();
        for a in &self.polytopes {
            for b in &other.polytopes {
                let ab = a.intersection_with(b, cfg);
                if !ab.is_empty() {
                    polytopes.push(ab);
                }
            }
        }
        Self::new(self.dim, polytopes)
    }

    /// Everything outside the region, as a union of convex pieces.
    ///
    /// `¬⋃ᵢPᵢ = ⋂ᵢ⋃ⱼ¬hᵢⱼ`: every tuple picking one negated facet per member
    /// is a candidate piece. The complement of the empty region is R^d.
    pub fn complement(&self, cfg: &PolytopeCfg) -> SpaceRegion {
        let mut tuples: Vec<Vec<Halfspace>> = vec![Vec::new()];
        for p in &self.polytopes {
            let negated: Vec<Halfspace> = p.facets().iter().map(Halfspace::negated).collect();
            let mut next = Vec::with_capacity(tuples.len() * negated.len());
            for t in &tuples {
                for h in &negated {
                    let mut tuple = t.clone();
                    tuple.push(h.clone());
                    next.push(tuple);
                }
            }
            tuples = next;
        }
        debug!(candidates = tuples.len(), "region: complement candidates");

        let polytopes = tuples
            .iter()
            .map(|hs| ConvexPolytope::from_halfspaces(hs, self.dim, cfg))
            .filter(|p| !p.is_empty())
            .collect();
        Self::new(self.dim, polytopes)
    }

    /// `self \ other`.
    pub fn relative_complement(&self, other: &SpaceRegion, cfg: &PolytopeCfg) -> SpaceRegion {
        self.intersection_with(&other.complement(cfg), cfg)
    }

    /// True when no member is non-empty.
    pub fn is_empty(&self) -> bool {
        self.polytopes.iter().all(ConvexPolytope::is_empty)
    }

    pub fn is_bounded(&self) -> bool {
        self.polytopes.iter().all(ConvexPolytope::is_bounded)
    }

    /// Volume of the union by inclusion-exclusion; infinite when unbounded.
    pub fn volume(&self, cfg: &PolytopeCfg) -> f64 {
        if !self.is_bounded() {
            return f64::INFINITY;
        }
        let members: Vec<&ConvexPolytope> = self.polytopes.iter().filter(|p| !p.is_empty()).collect();
        // Non-empty intersections of member subsets seen so far, with subset size.
        let mut subsets: Vec<(ConvexPolytope, usize)> = Vec::new();
        let mut volume = 0.0;
        for p in members {
            let mut grown = Vec::with_capacity(subsets.len() + 1);
            grown.push(((*p).clone(), 1));
            for (s, size) in &subsets {
                let q = s.intersection_with(p, cfg);
                if !q.is_empty() {
                    grown.push((q, size + 1));
                }
            }
            for (q, size) in &grown {
                let sign = if size % 2 == 1 { 1.0 } else { -1.0 };
                volume += sign * q.volume();
            }
            trace!(terms = grown.len(), volume, "region: inclusion-exclusion step");
            subsets.extend(grown);
        }
        volume
    }

    /// Interior point of the first non-empty member, NaN-filled otherwise.
    pub fn interior_point(&self) -> DVector<f64> {
        self.polytopes
            .iter()
            .find(|p| !p.is_empty())
            .map(|p| p.interior_point().clone())
            .unwrap_or_else(|| nan_point(self.dim))
    }

    /// Inside any member (see [`ConvexPolytope::contains_point`]).
    pub fn contains_point(&self, p: &DVector<f64>, offset: f64) -> bool {
        self.polytopes.iter().any(|poly| poly.contains_point(p, offset))
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

    /// Apply `x ↦ R x + t` to every member. On error nothing is changed.
    pub fn transform(&mut self, r: &DMatrix<f64>, t: &DVector<f64>) -> Result<&mut Self, PolytopeError> {
        let mut moved = self.polytopes.clone();
        for p in &mut moved {
            p.transform(r, t)?;
        }
        self.polytopes = moved;
        Ok(self)
    }

    pub fn transform_homogeneous(&mut self, m: &DMatrix<f64>) -> Result<&mut Self, PolytopeError> {
        let (r, t) = split_homogeneous(m, self.dim)?;
        self.transform(&r, &t)
    }
}
