//! Conditioning of half-space systems before any solve.
//!
//! A system is rewritten in local coordinates `y = (x - reference) · scale`:
//! unit normals, the reference point moved to the origin, and constant terms
//! scaled so the largest magnitude is one.

use nalgebra::DVector;

use crate::halfspace::Halfspace;

/// Half-spaces expressed in local coordinates around `reference`.
#[derive(Clone, Debug)]
pub struct NormalizedSystem {
    pub halfspaces: Vec<Halfspace>,
    pub reference: DVector<f64>,
    pub scale: f64,
}

impl NormalizedSystem {
    /// Normalize `unit` (already unit-normal rows) around `reference`.
    ///
    /// Scaling is skipped when every constant term is within `tol` of zero.
    /// `None` when a row and `reference` differ in dimension.
    pub fn around(unit: &[Halfspace], reference: &DVector<f64>, tol: f64) -> Option<Self> {
        if unit.iter().any(|h| h.dim() != reference.len()) {
            return None;
        }
        let mut halfspaces: Vec<Halfspace> = unit
            .iter()
            .map(|h| Halfspace::new(h.n.clone(), h.c + h.n.dot(reference)))
            .collect();
        let max_c = halfspaces.iter().map(|h| h.c.abs()).fold(0.0_f64, f64::max);
        let scale = if max_c > tol { 1.0 / max_c } else { 1.0 };
        for h in &mut halfspaces {
            h.c *= scale;
        }
        Some(Self {
            halfspaces,
            reference: reference.clone(),
            scale,
        })
    }

    /// Normalize around the default reference `-mean(n_i |c_i|)`, which lands
    /// near the region when it sits far from the origin.
    pub fn new(unit: &[Halfspace], dim: usize, tol: f64) -> Option<Self> {
        if unit.iter().any(|h| h.dim() != dim) {
            return None;
        }
        let mut shift = DVector::zeros(dim);
        for h in unit {
            shift += &h.n * h.c.abs();
        }
        if !unit.is_empty() {
            shift /= unit.len() as f64;
        }
        Self::around(unit, &(-shift), tol)
    }

    #[inline]
    pub fn to_local(&self, x: &DVector<f64>) -> DVector<f64> {
        (x - &self.reference) * self.scale
    }

    #[inline]
    pub fn to_global(&self, y: &DVector<f64>) -> DVector<f64> {
        y / self.scale + &self.reference
    }
}
