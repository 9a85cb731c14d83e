use super::*;
use crate::halfspace::is_nan_point;
use nalgebra::{dmatrix, dvector};

fn boxed(lo: &[f64], hi: &[f64]) -> ConvexPolytope {
    let d = lo.len();
    let mut hs = Vec::new();
    for k in 0..d {
        hs.push(Halfspace::axis(d, k, -1.0, lo[k]));
        hs.push(Halfspace::axis(d, k, 1.0, -hi[k]));
    }
    ConvexPolytope::from_halfspaces(&hs, d, &PolytopeCfg::default())
}

fn region(lo: &[f64], hi: &[f64]) -> SpaceRegion {
    SpaceRegion::from_polytope(boxed(lo, hi))
}

#[test]
fn union_volume_counts_overlap_once() {
    let cfg = PolytopeCfg::default();
    let a = region(&[0.0, 0.0], &[1.0, 1.0]);
    let b = region(&[0.5, 0.0], &[1.5, 1.0]);
    let u = a.union_with(&b);
    assert_eq!(u.polytopes().len(), 2);
    assert!((u.volume(&cfg) - 1.5).abs() < 1e-7);
}

#[test]
fn three_way_inclusion_exclusion() {
    let cfg = PolytopeCfg::default();
    let u = region(&[0.0, 0.0], &[2.0, 2.0])
        .union_with(&region(&[1.0, 1.0], &[3.0, 3.0]))
        .union_with(&region(&[1.0, 0.0], &[2.0, 3.0]));
    // 4 + 4 + 3 - 1 - 2 - 2 + 1
    assert!((u.volume(&cfg) - 7.0).abs() < 1e-7);
}

#[test]
fn disjoint_and_nested_members() {
    let cfg = PolytopeCfg::default();
    let far = region(&[0.0, 0.0], &[1.0, 1.0]).union_with(&region(&[5.0, 5.0], &[7.0, 6.0]));
    assert!((far.volume(&cfg) - 3.0).abs() < 1e-7);
    let nested = region(&[0.0, 0.0], &[4.0, 4.0]).union_with(&region(&[1.0, 1.0], &[2.0, 2.0]));
    assert!((nested.volume(&cfg) - 16.0).abs() < 1e-7);
}

#[test]
fn members_sharing_facets() {
    let cfg = PolytopeCfg::default();
    let strip = region(&[2.0, 0.0], &[3.0, 1.0]).union_with(&region(&[2.0, 0.0], &[4.0, 1.0]));
    assert!((strip.volume(&cfg) - 2.0).abs() < 1e-7, "volume {}", strip.volume(&cfg));

    let slab = region(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0])
        .union_with(&region(&[0.0, 0.0, 0.5], &[1.0, 1.0, 2.0]));
    assert!((slab.volume(&cfg) - 2.0).abs() < 1e-7, "volume {}", slab.volume(&cfg));

    let corners = [dvector![0.0, 0.0], dvector![1.0, 0.0], dvector![0.0, 1.0]];
    let tri = SpaceRegion::from_points(&corners, 2, &cfg);
    let unit = region(&[0.0, 0.0], &[1.0, 1.0]);
    assert!((tri.union_with(&unit).volume(&cfg) - 1.0).abs() < 1e-7);
    let cut = tri.intersection_with(&unit, &cfg);
    assert!(!cut.is_empty());
    assert!((cut.volume(&cfg) - 0.5).abs() < 1e-7);
}

#[test]
fn intersection_drops_empty_pairs() {
    let cfg = PolytopeCfg::default();
    let left = region(&[0.0, 0.0], &[1.0, 1.0]).union_with(&region(&[3.0, 0.0], &[4.0, 1.0]));
    let window = region(&[0.5, 0.5], &[2.0, 2.0]);
    let both = left.intersection_with(&window, &cfg);
    assert_eq!(both.polytopes().len(), 1);
    assert!((both.volume(&cfg) - 0.25).abs() < 1e-7);
    assert!(region(&[0.0, 0.0], &[1.0, 1.0])
        .intersection_with(&region(&[2.0, 2.0], &[3.0, 3.0]), &cfg)
        .is_empty());
}

#[test]
fn double_complement_inside_a_universe() {
    let cfg = PolytopeCfg::default();
    let universe = region(&[-2.0, -2.0], &[2.0, 2.0]);
    let a = region(&[0.0, 0.0], &[1.0, 1.0]);

    let not_a = a.complement(&cfg);
    assert_eq!(not_a.polytopes().len(), 4);
    assert!(!not_a.is_bounded());
    assert!(not_a.volume(&cfg).is_infinite());
    assert!(!not_a.contains_point(&dvector![0.5, 0.5], 1e-9));
    assert!(not_a.contains_point(&dvector![1.5, 0.5], 0.0));

    let back = not_a.complement(&cfg).intersection_with(&universe, &cfg);
    assert!((back.volume(&cfg) - 1.0).abs() < 1e-7);
    assert!(back.contains_point(&dvector![0.5, 0.5], 0.0));
    assert!(!back.contains_point(&dvector![1.5, 0.5], 0.0));
}

#[test]
fn relative_complement_of_a_box() {
    let cfg = PolytopeCfg::default();
    let universe = region(&[-2.0, -2.0], &[2.0, 2.0]);
    let a = region(&[0.0, 0.0], &[1.0, 1.0]);
    let rest = universe.relative_complement(&a, &cfg);
    assert!(rest.is_bounded());
    assert!((rest.volume(&cfg) - 15.0).abs() < 1e-6);
    assert!(!rest.contains_point(&dvector![0.5, 0.5], 1e-9));
    assert!(rest.contains_point(&dvector![-1.0, 1.5], 0.0));
}

#[test]
fn empty_region_semantics() {
    let cfg = PolytopeCfg::default();
    let e = SpaceRegion::empty(2);
    assert!(e.is_empty() && e.is_bounded());
    assert_eq!(e.volume(&cfg), 0.0);
    assert!(is_nan_point(&e.interior_point()));
    assert!(!e.contains_point(&dvector![0.0, 0.0], 0.0));

    let only_empty = SpaceRegion::from_polytope(ConvexPolytope::empty(2));
    assert!(only_empty.is_empty());
    assert!(is_nan_point(&only_empty.interior_point()));

    let everything = e.complement(&cfg);
    assert_eq!(everything.polytopes().len(), 1);
    assert!(!everything.is_bounded());
    assert!(everything.contains_point(&dvector![123.0, -4.0], 0.0));
}

#[test]
fn interior_point_comes_from_first_non_empty_member() {
    let r = SpaceRegion::new(
        2,
        vec![ConvexPolytope::empty(2), boxed(&[2.0, 2.0], &[3.0, 3.0])],
    );
    let p = r.interior_point();
    assert!(r.polytopes()[1].contains_point(&p, 0.0));
    assert!(r.contains_point(&p, 1e-3));
}

#[test]
fn point_masks_and_indices() {
    let r = region(&[0.0, 0.0], &[1.0, 1.0]).union_with(&region(&[2.0, 0.0], &[3.0, 1.0]));
    let pts = vec![
        dvector![0.5, 0.5],
        dvector![1.5, 0.5],
        dvector![2.5, 0.5],
        dvector![2.99, 0.99],
    ];
    assert_eq!(r.interior_point_mask(&pts, 0.0), vec![true, false, true, true]);
    assert_eq!(r.interior_point_indices(&pts, 0.05), vec![0, 2]);
    assert_eq!(r.interior_point_indices(&pts, -0.6), vec![0, 1, 2, 3]);
}

#[test]
fn regions_from_points_and_halfspaces() {
    let cfg = PolytopeCfg::default();
    let tri = SpaceRegion::from_points(
        &[dvector![0.0, 0.0], dvector![2.0, 0.0], dvector![0.0, 2.0]],
        2,
        &cfg,
    );
    assert!((tri.volume(&cfg) - 2.0).abs() < 1e-9);
    let half = SpaceRegion::from_halfspaces(&[Halfspace::new(dvector![0.0, 1.0], 0.0)], 2, &cfg);
    assert!(!half.is_bounded());
    let cut = tri.intersection_with(&half, &cfg);
    assert!(cut.is_empty());
    let lower = SpaceRegion::from_halfspaces(&[Halfspace::new(dvector![1.0, 0.0], -1.0)], 2, &cfg);
    assert!((tri.intersection_with(&lower, &cfg).volume(&cfg) - 1.5).abs() < 1e-7);
}

#[test]
fn members_of_other_dimensions_are_dropped() {
    let r = SpaceRegion::new(2, vec![boxed(&[0.0, 0.0], &[1.0, 1.0]), ConvexPolytope::whole_space(3)]);
    assert_eq!(r.polytopes().len(), 1);
}

#[test]
fn transforms_apply_to_every_member() {
    let cfg = PolytopeCfg::default();
    let mut r = region(&[0.0, 0.0], &[1.0, 1.0]).union_with(&region(&[0.5, 0.0], &[1.5, 1.0]));
    let m = dmatrix![
        0.0, -1.0, 10.0;
        1.0, 0.0, 0.0;
        0.0, 0.0, 1.0
    ];
    r.transform_homogeneous(&m).unwrap();
    assert!((r.volume(&cfg) - 1.5).abs() < 1e-7);
    // (1.25, 0.25) ↦ (9.75, 1.25)
    assert!(r.contains_point(&dvector![9.75, 1.25], 0.0));
    assert!(!r.contains_point(&dvector![1.25, 0.25], 0.0));

    let before = r.volume(&cfg);
    let singular = dmatrix![1.0, 0.0; 0.0, 0.0];
    assert!(r.transform(&singular, &dvector![0.0, 0.0]).is_err());
    assert!((r.volume(&cfg) - before).abs() < 1e-12);

    r.transform(&dmatrix![2.0, 0.0; 0.0, 1.0], &dvector![0.0, 0.0]).unwrap();
    assert!((r.volume(&cfg) - 3.0).abs() < 1e-7);
}
