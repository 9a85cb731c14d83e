use super::*;
use nalgebra::dvector;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn unit_cube() -> Vec<DVector<f64>> {
    let mut pts = Vec::new();
    for i in 0..8 {
        pts.push(dvector![
            (i & 1) as f64,
            ((i >> 1) & 1) as f64,
            ((i >> 2) & 1) as f64
        ]);
    }
    pts
}

#[test]
fn square_with_interior_and_edge_points() {
    let pts = vec![
        dvector![0.0, 0.0],
        dvector![1.0, 0.0],
        dvector![1.0, 1.0],
        dvector![0.0, 1.0],
        dvector![0.5, 0.5],
        dvector![0.5, 0.0],
    ];
    let hull = convex_hull(&pts, &HullCfg::default()).unwrap();
    let mut ids = hull.vertices.clone();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(hull.facets.len(), 4);
    assert!((hull.area - 4.0).abs() < 1e-12, "perimeter {}", hull.area);
    assert!((hull.volume - 1.0).abs() < 1e-12, "area {}", hull.volume);
    for f in &hull.facets {
        assert_eq!(f.vertices.len(), 2);
        assert!((f.normal.norm() - 1.0).abs() < 1e-12);
        for p in &pts {
            assert!(f.eval(p) <= 1e-9);
        }
    }
    for n in &hull.facet_neighbor_facets {
        assert_eq!(n.len(), 2);
    }
}

#[test]
fn cube_topology_and_measures() {
    let pts = unit_cube();
    let hull = convex_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(hull.vertices.len(), 8);
    assert_eq!(hull.facets.len(), 6);
    assert!((hull.area - 6.0).abs() < 1e-10);
    assert!((hull.volume - 1.0).abs() < 1e-10);
    for f in &hull.facets {
        assert_eq!(f.vertices.len(), 4);
        // Counterclockwise seen from outside.
        let p0 = &pts[hull.vertices[f.vertices[0]]];
        let p1 = &pts[hull.vertices[f.vertices[1]]];
        let p2 = &pts[hull.vertices[f.vertices[2]]];
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let cross = dvector![
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0]
        ];
        assert!(cross.dot(&f.normal) > 0.0);
    }
    for n in &hull.vertex_neighbor_facets {
        assert_eq!(n.len(), 3);
    }
    for n in &hull.facet_neighbor_facets {
        assert_eq!(n.len(), 4);
    }
}

#[test]
fn triangulated_cube_has_twelve_triangles() {
    let cfg = HullCfg {
        merge_tol: 0.0,
        triangulate: true,
    };
    let hull = convex_hull(&unit_cube(), &cfg).unwrap();
    assert_eq!(hull.facets.len(), 12);
    assert!((hull.volume - 1.0).abs() < 1e-10);
    assert!((hull.area - 6.0).abs() < 1e-10);
    for f in &hull.facets {
        assert_eq!(f.vertices.len(), 3);
    }
    for n in &hull.facet_neighbor_facets {
        assert_eq!(n.len(), 3);
    }
}

#[test]
fn four_simplex_measures() {
    let mut pts = vec![DVector::zeros(4)];
    for k in 0..4 {
        let mut e = DVector::zeros(4);
        e[k] = 1.0;
        pts.push(e);
    }
    let hull = convex_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(hull.vertices.len(), 5);
    assert_eq!(hull.facets.len(), 5);
    assert!((hull.volume - 1.0 / 24.0).abs() < 1e-12);
    // Four coordinate facets of 1/6 each plus the slanted one of 2/6.
    assert!((hull.area - 1.0).abs() < 1e-12);
}

#[test]
fn one_dimensional_hull() {
    let pts = vec![dvector![3.0], dvector![-1.0], dvector![0.5]];
    let hull = convex_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(hull.vertices, vec![0, 1]);
    assert_eq!(hull.facets.len(), 2);
    assert!((hull.volume - 4.0).abs() < 1e-12);
    assert!((hull.area - 2.0).abs() < 1e-12);
}

#[test]
fn merge_tolerance_absorbs_near_collinear_points() {
    let pts = vec![
        dvector![0.0, 0.0],
        dvector![1.0, 0.0],
        dvector![1.0, 1.0],
        dvector![0.0, 1.0],
        dvector![0.5, -1e-7],
    ];
    let strict = convex_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(strict.vertices.len(), 5);
    assert_eq!(strict.facets.len(), 5);
    let merged = convex_hull(
        &pts,
        &HullCfg {
            merge_tol: 1e-6,
            triangulate: false,
        },
    )
    .unwrap();
    assert_eq!(merged.vertices.len(), 4);
    assert_eq!(merged.facets.len(), 4);
}

#[test]
fn degenerate_inputs_are_rejected() {
    let line = vec![dvector![0.0, 0.0], dvector![1.0, 1.0], dvector![2.0, 2.0]];
    assert_eq!(
        convex_hull(&line, &HullCfg::default()).unwrap_err(),
        HullError::LowerDimensional { dim: 2, rank: 1 }
    );
    let two = vec![dvector![0.0, 0.0], dvector![1.0, 1.0]];
    assert!(matches!(
        convex_hull(&two, &HullCfg::default()),
        Err(HullError::TooFewPoints { dim: 2, points: 2 })
    ));
    let mixed = vec![dvector![0.0, 0.0], dvector![1.0], dvector![2.0, 2.0]];
    assert_eq!(
        convex_hull(&mixed, &HullCfg::default()).unwrap_err(),
        HullError::DimensionMismatch
    );
    assert_eq!(convex_hull(&[], &HullCfg::default()).unwrap_err(), HullError::Empty);
}

fn sphere_cloud(rng: &mut StdRng, dim: usize, count: usize) -> Vec<DVector<f64>> {
    (0..count)
        .map(|_| {
            let mut p = DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..1.0));
            while p.norm() < 1e-3 {
                p = DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..1.0));
            }
            p.normalize()
        })
        .collect()
}

/// Both facet searches must agree on vertices and facet incidence.
fn assert_same_hull(points: &[DVector<f64>]) {
    let dim = points[0].len();
    let tol = 1e-9;
    let planes = incremental::hull_planes(points, dim, tol).expect("incremental hull");
    let fast = with_vertices(points, dim, facets_from_planes(points, planes, tol), tol);
    let slow = with_vertices(points, dim, enumerate_facets(points, dim, tol), tol);
    let sorted_vertices = |h: &RawHull| {
        let mut v = h.vertices.clone();
        v.sort_unstable();
        v
    };
    let incidence = |h: &RawHull| {
        let mut sets: Vec<Vec<usize>> = h.facets.iter().map(|f| f.points.clone()).collect();
        sets.sort();
        sets
    };
    assert_eq!(sorted_vertices(&fast), sorted_vertices(&slow));
    assert_eq!(incidence(&fast), incidence(&slow));
}

#[test]
fn incremental_and_enumerated_facets_agree() {
    let mut rng = StdRng::seed_from_u64(5);
    assert_same_hull(&sphere_cloud(&mut rng, 2, 30));
    assert_same_hull(&sphere_cloud(&mut rng, 3, 40));
    assert_same_hull(&sphere_cloud(&mut rng, 4, 24));

    // Coplanar and collinear points on a box with interior clutter.
    let mut pts = unit_cube();
    for x in [0.25, 0.5, 0.75] {
        pts.push(dvector![x, 0.0, 0.0]);
        pts.push(dvector![x, 0.5, 1.0]);
        pts.push(dvector![1.0, x, x]);
    }
    for _ in 0..10 {
        pts.push(DVector::from_fn(3, |_, _| rng.gen_range(0.1..0.9)));
    }
    assert_same_hull(&pts);
}

#[test]
fn large_grid_builds_incrementally() {
    let mut pts = Vec::new();
    for i in 0..5 {
        for j in 0..5 {
            for k in 0..5 {
                pts.push(dvector![i as f64, j as f64, k as f64]);
            }
        }
    }
    assert!(subset_count(pts.len(), 3) > HULL_ENUMERATION_LIMIT);
    let hull = convex_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(hull.vertices.len(), 8);
    assert_eq!(hull.facets.len(), 6);
    assert!((hull.volume - 64.0).abs() < 1e-9);
    assert!((hull.area - 96.0).abs() < 1e-9);
    for f in &hull.facets {
        assert_eq!(f.vertices.len(), 4);
    }
}

#[test]
fn large_sphere_cloud() {
    let mut rng = StdRng::seed_from_u64(17);
    let pts = sphere_cloud(&mut rng, 3, 500);
    let hull = convex_hull(&pts, &HullCfg::default()).unwrap();
    assert_eq!(hull.vertices.len(), 500);
    let ball = 4.0 / 3.0 * std::f64::consts::PI;
    assert!(hull.volume < ball && hull.volume > ball - 0.25, "volume {}", hull.volume);
    let sphere = 4.0 * std::f64::consts::PI;
    assert!(hull.area < sphere && hull.area > sphere - 0.5, "area {}", hull.area);
    for f in &hull.facets {
        for p in &pts {
            assert!(f.eval(p) <= 1e-9);
        }
    }
    for nbrs in &hull.facet_neighbor_facets {
        assert!(nbrs.len() >= 3);
    }
}

#[test]
fn subset_counts() {
    assert_eq!(subset_count(5, 2), 10);
    assert_eq!(subset_count(125, 3), 317_750);
    assert_eq!(subset_count(3, 5), 0);
    assert!(subset_count(1 << 20, 4) > HULL_ENUMERATION_LIMIT);
}
