//! Incremental hull for point sets too large to enumerate.
//!
//! Beneath-beyond with outside sets: start from a full-dimensional simplex,
//! then repeatedly take the farthest point outside some facet, remove every
//! facet it sees, and cone the horizon ridges to it. Facets are simplices of
//! `d` input points; neighbor `k` of a facet shares the ridge opposite its
//! `k`-th point. Points within `tol` of the current hull are dropped.
//!
//! Only the supporting hyperplanes are returned. Coplanar simplices are
//! grouped into polytope facets by the caller.

use std::collections::{HashMap, HashSet};

use nalgebra::DVector;

use super::hyperplane_through;
use crate::util::centroid;

const NONE: usize = usize::MAX;

struct Simplex {
    ids: Vec<usize>,
    normal: DVector<f64>,
    offset: f64,
    neighbors: Vec<usize>,
    outside: Vec<usize>,
    alive: bool,
}

impl Simplex {
    #[inline]
    fn eval(&self, p: &DVector<f64>) -> f64 {
        self.normal.dot(p) + self.offset
    }
}

/// Supporting hyperplanes `(normal, offset)` of the hull facets, one per
/// simplex. `None` when the construction degenerates; callers fall back to
/// enumeration.
pub(super) fn hull_planes(points: &[DVector<f64>], dim: usize, tol: f64) -> Option<Vec<(DVector<f64>, f64)>> {
    if dim < 2 {
        return None;
    }
    let start = initial_simplex(points, dim, tol)?;
    let corners: Vec<DVector<f64>> = start.iter().map(|&i| points[i].clone()).collect();
    let inside = centroid(&corners);

    let mut facets: Vec<Simplex> = Vec::with_capacity(2 * points.len());
    for k in 0..=dim {
        // Facet `k` omits start[k]; its neighbor across the ridge opposite
        // start[j] is facet `j`.
        let slots: Vec<usize> = (0..=dim).filter(|&j| j != k).collect();
        let ids: Vec<usize> = slots.iter().map(|&j| start[j]).collect();
        let (normal, offset) = oriented_plane(points, &ids, &inside)?;
        facets.push(Simplex {
            ids,
            normal,
            offset,
            neighbors: slots,
            outside: Vec::new(),
            alive: true,
        });
    }
    let initial: Vec<usize> = (0..=dim).collect();
    let in_start: HashSet<usize> = start.iter().copied().collect();
    for i in 0..points.len() {
        if !in_start.contains(&i) {
            assign(points, &mut facets, &initial, i, tol);
        }
    }

    let mut rounds = 0usize;
    while let Some(f0) = facets.iter().position(|f| f.alive && !f.outside.is_empty()) {
        rounds += 1;
        if rounds > points.len() {
            return None;
        }
        let seed = &facets[f0];
        let apex = seed
            .outside
            .iter()
            .copied()
            .max_by(|&a, &b| seed.eval(&points[a]).total_cmp(&seed.eval(&points[b])))?;
        let p = &points[apex];

        // Facets that see the apex, connected through ridges.
        let mut visible = vec![f0];
        let mut seen: HashSet<usize> = HashSet::from([f0]);
        let mut stack = vec![f0];
        while let Some(f) = stack.pop() {
            for &nb in &facets[f].neighbors {
                if nb != NONE && !seen.contains(&nb) && facets[nb].eval(p) > tol {
                    seen.insert(nb);
                    visible.push(nb);
                    stack.push(nb);
                }
            }
        }

        let mut cone: Vec<usize> = Vec::new();
        let mut open_ridges: HashMap<Vec<usize>, (usize, usize)> = HashMap::new();
        for &v in &visible {
            for k in 0..dim {
                let nb = facets[v].neighbors[k];
                if nb == NONE || seen.contains(&nb) {
                    continue;
                }
                let mut ids = facets[v].ids.clone();
                ids[k] = apex;
                let (normal, offset) = oriented_plane(points, &ids, &inside)?;
                let new_id = facets.len();
                let mut neighbors = vec![NONE; dim];
                neighbors[k] = nb;
                if let Some(slot) = facets[nb].neighbors.iter().position(|&x| x == v) {
                    facets[nb].neighbors[slot] = new_id;
                }
                // Ridges through the apex pair up the new facets.
                for j in (0..dim).filter(|&j| j != k) {
                    let mut key: Vec<usize> = ids
                        .iter()
                        .enumerate()
                        .filter(|&(jj, _)| jj != j)
                        .map(|(_, &x)| x)
                        .collect();
                    key.sort_unstable();
                    match open_ridges.remove(&key) {
                        Some((other, other_slot)) => {
                            neighbors[j] = other;
                            facets[other].neighbors[other_slot] = new_id;
                        }
                        None => {
                            open_ridges.insert(key, (new_id, j));
                        }
                    }
                }
                facets.push(Simplex {
                    ids,
                    normal,
                    offset,
                    neighbors,
                    outside: Vec::new(),
                    alive: true,
                });
                cone.push(new_id);
            }
        }
        if cone.is_empty() || !open_ridges.is_empty() {
            return None;
        }

        let mut orphans = Vec::new();
        for &v in &visible {
            facets[v].alive = false;
            orphans.append(&mut facets[v].outside);
        }
        for i in orphans {
            if i != apex {
                assign(points, &mut facets, &cone, i, tol);
            }
        }
    }

    Some(
        facets
            .into_iter()
            .filter(|f| f.alive)
            .map(|f| (f.normal, f.offset))
            .collect(),
    )
}

/// `dim + 1` affinely independent points: the lowest point along the first
/// axis, then repeatedly the point farthest from the affine span so far.
fn initial_simplex(points: &[DVector<f64>], dim: usize, tol: f64) -> Option<Vec<usize>> {
    let first = (0..points.len()).min_by(|&a, &b| points[a][0].total_cmp(&points[b][0]))?;
    let origin = &points[first];
    let mut chosen = vec![first];
    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(dim);
    while chosen.len() <= dim {
        let mut best: Option<(usize, DVector<f64>, f64)> = None;
        for (i, p) in points.iter().enumerate() {
            let mut r = p - origin;
            for b in &basis {
                let along = b.dot(&r);
                r -= b * along;
            }
            let dist = r.norm();
            if best.as_ref().map_or(true, |(_, _, d)| dist > *d) {
                best = Some((i, r, dist));
            }
        }
        let (i, r, dist) = best?;
        if dist <= tol {
            return None;
        }
        basis.push(r / dist);
        chosen.push(i);
    }
    Some(chosen)
}

/// Hyperplane through `ids` with `inside` on its negative side.
fn oriented_plane(
    points: &[DVector<f64>],
    ids: &[usize],
    inside: &DVector<f64>,
) -> Option<(DVector<f64>, f64)> {
    let (normal, offset) = hyperplane_through(points, ids, 0.0)?;
    let side = normal.dot(inside) + offset;
    if side > 0.0 {
        Some((-normal, -offset))
    } else if side < 0.0 {
        Some((normal, offset))
    } else {
        None
    }
}

/// Put point `i` in the outside set of the candidate facet it is farthest
/// beyond, if any by more than `tol`.
fn assign(points: &[DVector<f64>], facets: &mut [Simplex], candidates: &[usize], i: usize, tol: f64) {
    let p = &points[i];
    let mut best = None;
    let mut best_val = tol;
    for &f in candidates {
        let val = facets[f].eval(p);
        if val > best_val {
            best_val = val;
            best = Some(f);
        }
    }
    if let Some(f) = best {
        facets[f].outside.push(i);
    }
}
