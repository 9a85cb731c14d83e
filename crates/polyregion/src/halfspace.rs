//! Closed half-spaces in R^d and the NaN point sentinel.
//!
//! Convention
//! - `Halfspace { n, c }` is the set `{x : n·x + c <= 0}`. The (d+1)-vector
//!   `(n, c)` is the coefficient form used by the duality engine.
//! - Normals are not required to be unit length; most producers in this crate
//!   emit unit normals so that `eval` is a signed Euclidean distance.

use nalgebra::DVector;

/// Closed half-space `n · x + c <= 0` in R^d.
#[derive(Clone, Debug, PartialEq)]
pub struct Halfspace {
    pub n: DVector<f64>,
    pub c: f64,
}

impl Halfspace {
    #[inline]
    pub fn new(n: DVector<f64>, c: f64) -> Self {
        Self { n, c }
    }

    /// Build from a coefficient vector `(n_0, .., n_{d-1}, c)`.
    pub fn from_coefficients(coeffs: &DVector<f64>) -> Option<Self> {
        let d = coeffs.len().checked_sub(1)?;
        Some(Self {
            n: coeffs.rows(0, d).into_owned(),
            c: coeffs[d],
        })
    }

    pub fn to_coefficients(&self) -> DVector<f64> {
        let d = self.n.len();
        let mut out = DVector::zeros(d + 1);
        out.rows_mut(0, d).copy_from(&self.n);
        out[d] = self.c;
        out
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.n.len()
    }

    /// Signed value `n·p + c` (negative inside).
    #[inline]
    pub fn eval(&self, p: &DVector<f64>) -> f64 {
        self.n.dot(p) + self.c
    }

    /// `n·p + c <= -offset`; positive `offset` shrinks the half-space.
    #[inline]
    pub fn satisfies_eps(&self, p: &DVector<f64>, offset: f64) -> bool {
        self.eval(p) <= -offset
    }

    /// The closure of the complement, `{x : n·x + c >= 0}`.
    #[inline]
    pub fn negated(&self) -> Self {
        Self {
            n: -&self.n,
            c: -self.c,
        }
    }

    /// Rescale so that `|n| = 1`. `None` for a (numerically) zero normal.
    pub fn unit_normalized(&self) -> Option<Self> {
        let norm = self.n.norm();
        if !norm.is_finite() || norm <= f64::EPSILON {
            return None;
        }
        Some(Self {
            n: &self.n / norm,
            c: self.c / norm,
        })
    }

    /// Axis-aligned half-space `sign * x_axis + c <= 0`.
    pub fn axis(dim: usize, axis: usize, sign: f64, c: f64) -> Self {
        let mut n = DVector::zeros(dim);
        n[axis] = sign;
        Self { n, c }
    }
}

/// Point with every coordinate NaN; marks "no point" in geometric outputs.
#[inline]
pub fn nan_point(dim: usize) -> DVector<f64> {
    DVector::from_element(dim, f64::NAN)
}

/// True if any coordinate is NaN.
#[inline]
pub fn is_nan_point(p: &DVector<f64>) -> bool {
    p.iter().any(|x| x.is_nan())
}

/// The two contradictory half-spaces `x_0 + 1 <= 0` and `-x_0 + 1 <= 0`
/// standing in for the empty set.
pub fn canonical_empty(dim: usize) -> Vec<Halfspace> {
    if dim == 0 {
        return Vec::new();
    }
    vec![
        Halfspace::axis(dim, 0, 1.0, 1.0),
        Halfspace::axis(dim, 0, -1.0, 1.0),
    ]
}

/// Unit-normalize a system. Zero-normal rows are constant constraints
/// `c <= 0`: kept out of the result when satisfied (within `tol`), and
/// reported as infeasible (`None`) when violated.
pub fn unit_normalize_all(hs: &[Halfspace], tol: f64) -> Option<Vec<Halfspace>> {
    let mut out = Vec::with_capacity(hs.len());
    for h in hs {
        match h.unit_normalized() {
            Some(u) => out.push(u),
            None if h.c <= tol => {}
            None => return None,
        }
    }
    Some(out)
}

/// Keep the first of every group of rows whose coefficient vectors `(n, c)`
/// lie within `tol` of each other. Meant for unit-normal systems.
pub fn dedup_halfspaces(hs: &[Halfspace], tol: f64) -> Vec<Halfspace> {
    let mut out: Vec<Halfspace> = Vec::with_capacity(hs.len());
    for h in hs {
        let dup = out.iter().any(|k| {
            k.dim() == h.dim() && ((&k.n - &h.n).norm_squared() + (k.c - h.c).powi(2)).sqrt() <= tol
        });
        if !dup {
            out.push(h.clone());
        }
    }
    out
}
