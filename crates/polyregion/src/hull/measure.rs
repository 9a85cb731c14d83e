//! Facet-recursive measures and fan triangulation.

use nalgebra::{DMatrix, DVector};

use super::{raw_hull, HullError};
use crate::util::{centroid, orthonormal_complement};

/// Coordinates of the points `ids` in an orthonormal basis of the hyperplane
/// orthogonal to `normal`, relative to the first of them.
pub(crate) fn project_onto_facet(
    points: &[DVector<f64>],
    ids: &[usize],
    normal: &DVector<f64>,
) -> Vec<DVector<f64>> {
    let basis = orthonormal_complement(normal);
    let Some(&first) = ids.first() else {
        return Vec::new();
    };
    let origin = &points[first];
    ids.iter()
        .map(|&i| basis.tr_mul(&(&points[i] - origin)))
        .collect()
}

/// k-dimensional volume of the convex hull of `points` (all in R^k).
///
/// Lower-dimensional input has volume zero; a 0-dimensional point set counts
/// as one (the measure of a point, used for 1D facets).
pub(crate) fn volume_of(points: &[DVector<f64>], tol: f64) -> Result<f64, HullError> {
    let Some(first) = points.first() else {
        return Ok(0.0);
    };
    let k = first.len();
    match k {
        0 => Ok(1.0),
        1 => {
            let lo = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
            let hi = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
            Ok(hi - lo)
        }
        _ if points.len() == k + 1 => Ok(simplex_volume(points)),
        _ => {
            let raw = match raw_hull(points, tol) {
                Ok(raw) => raw,
                Err(HullError::LowerDimensional { .. }) | Err(HullError::TooFewPoints { .. }) => {
                    return Ok(0.0)
                }
                Err(e) => return Err(e),
            };
            let verts: Vec<DVector<f64>> = raw.vertices.iter().map(|&i| points[i].clone()).collect();
            let c = centroid(&verts);
            let mut total = 0.0;
            for f in &raw.facets {
                let coords = project_onto_facet(points, &f.points, &f.normal);
                let height = -(f.normal.dot(&c) + f.offset);
                total += volume_of(&coords, raw.tol)? * height / k as f64;
            }
            Ok(total)
        }
    }
}

/// `|det[p1-p0, .., pk-p0]| / k!` for k+1 points in R^k.
fn simplex_volume(points: &[DVector<f64>]) -> f64 {
    let k = points[0].len();
    let mut m = DMatrix::zeros(k, k);
    for r in 0..k {
        m.set_row(r, &(&points[r + 1] - &points[0]).transpose());
    }
    let factorial: f64 = (1..=k).map(|i| i as f64).product();
    m.determinant().abs() / factorial
}

/// Split the convex hull of `points` (all in R^k, all of them vertices) into
/// k-simplices, returned as local index lists.
///
/// Fan from the first vertex over the triangulated facets not containing it.
pub(crate) fn triangulate(points: &[DVector<f64>], tol: f64) -> Result<Vec<Vec<usize>>, HullError> {
    let Some(first) = points.first() else {
        return Ok(Vec::new());
    };
    let k = first.len();
    if k == 1 {
        let mut lo = 0;
        let mut hi = 0;
        for (i, p) in points.iter().enumerate() {
            if p[0] < points[lo][0] {
                lo = i;
            }
            if p[0] > points[hi][0] {
                hi = i;
            }
        }
        return Ok(vec![vec![lo, hi]]);
    }
    if points.len() == k + 1 {
        return Ok(vec![(0..=k).collect()]);
    }
    let raw = raw_hull(points, tol)?;
    let apex = raw.vertices.first().copied().ok_or(HullError::Empty)?;
    let mut out = Vec::new();
    for f in &raw.facets {
        if f.points.contains(&apex) {
            continue;
        }
        let coords = project_onto_facet(points, &f.points, &f.normal);
        for sub in triangulate(&coords, tol)? {
            let mut simplex: Vec<usize> = sub.iter().map(|&j| f.points[j]).collect();
            simplex.push(apex);
            out.push(simplex);
        }
    }
    Ok(out)
}
