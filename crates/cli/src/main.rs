use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polyregion::api::{halfspace_intersection, vertex_hull};
use polyregion::PolytopeCfg;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod io;

use io::{build_region, finite_point, read_json, to_halfspaces, to_points, HalfspaceDto, RegionDto};

#[derive(Parser)]
#[command(name = "polyregion")]
#[command(about = "Convex polytope and region queries over JSON inputs")]
struct Cmd {
    /// Distance tolerance for feasibility and redundancy tests
    #[arg(long, global = true, default_value_t = 1e-7)]
    dist_tol: f64,
    /// Coplanarity tolerance for hull facets (0 = built-in epsilon only)
    #[arg(long, global = true, default_value_t = 0.0)]
    merge_tol: f64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Facets, vertices and measures of the hull of a point set
    Vrep {
        #[arg(long)]
        input: PathBuf,
        /// Accept point sets that do not span the space
        #[arg(long)]
        allow_flat: bool,
    },
    /// Vertices and minimal facets of a half-space intersection
    Hrep {
        #[arg(long)]
        input: PathBuf,
    },
    /// Volume and an interior point of a region
    Volume {
        #[arg(long)]
        input: PathBuf,
    },
    /// Indices of query points inside a region
    Contains {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        points: PathBuf,
        /// Positive values shrink the region, negative values grow it
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,
    },
}

#[derive(Debug, Serialize)]
struct VrepOut {
    dim: usize,
    success: bool,
    vertex_ids: Vec<usize>,
    vertices: Vec<Vec<f64>>,
    facets: Vec<HalfspaceDto>,
    area: f64,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct HrepOut {
    dim: usize,
    feasible: bool,
    bounded: bool,
    interior_point: Option<Vec<f64>>,
    vertices: Vec<Vec<f64>>,
    facets: Vec<HalfspaceDto>,
}

#[derive(Debug, Serialize)]
struct VolumeOut {
    dim: usize,
    members: usize,
    empty: bool,
    bounded: bool,
    /// `None` when unbounded.
    volume: Option<f64>,
    interior_point: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct ContainsOut {
    inside: Vec<usize>,
    total: usize,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    let cfg = PolytopeCfg {
        dist_tol: cmd.dist_tol,
        merge_tol: cmd.merge_tol,
        ..PolytopeCfg::default()
    };
    let out = match cmd.action {
        Action::Vrep { input, allow_flat } => serde_json::to_value(vrep(&input, allow_flat, &cfg)?)?,
        Action::Hrep { input } => serde_json::to_value(hrep(&input, &cfg)?)?,
        Action::Volume { input } => serde_json::to_value(volume(&input, &cfg)?)?,
        Action::Contains {
            input,
            points,
            offset,
        } => serde_json::to_value(contains(&input, &points, offset, &cfg)?)?,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn vrep(input: &Path, allow_flat: bool, cfg: &PolytopeCfg) -> Result<VrepOut> {
    let raw: Vec<Vec<f64>> = read_json(input)?;
    let (dim, points) = to_points(&raw).with_context(|| format!("points in {}", input.display()))?;
    tracing::info!(input = %input.display(), dim, points = points.len(), "vrep");
    let res = vertex_hull(&points, dim, !allow_flat, cfg.merge_tol);
    Ok(VrepOut {
        dim,
        success: res.success,
        vertex_ids: res.vertex_ids,
        vertices: res.vertices.iter().map(|v| v.iter().copied().collect()).collect(),
        facets: res.facets.iter().map(HalfspaceDto::from).collect(),
        area: res.area,
        volume: res.volume,
    })
}

fn hrep(input: &Path, cfg: &PolytopeCfg) -> Result<HrepOut> {
    let raw: Vec<HalfspaceDto> = read_json(input)?;
    let (dim, hs) = to_halfspaces(&raw).with_context(|| format!("half-spaces in {}", input.display()))?;
    tracing::info!(input = %input.display(), dim, halfspaces = hs.len(), "hrep");
    let res = halfspace_intersection(&hs, dim, cfg.dist_tol, cfg.merge_tol);
    Ok(HrepOut {
        dim,
        feasible: res.feasible,
        bounded: res.is_bounded,
        interior_point: finite_point(&res.interior_point),
        vertices: res.vertices.iter().map(|v| v.iter().copied().collect()).collect(),
        facets: res.facets.iter().map(HalfspaceDto::from).collect(),
    })
}

fn volume(input: &Path, cfg: &PolytopeCfg) -> Result<VolumeOut> {
    let dto: RegionDto = read_json(input)?;
    let region = build_region(&dto, cfg).with_context(|| format!("region in {}", input.display()))?;
    tracing::info!(input = %input.display(), dim = dto.dim, members = dto.members.len(), "volume");
    let vol = region.volume(cfg);
    Ok(VolumeOut {
        dim: dto.dim,
        members: region.polytopes().len(),
        empty: region.is_empty(),
        bounded: region.is_bounded(),
        volume: vol.is_finite().then_some(vol),
        interior_point: finite_point(&region.interior_point()),
    })
}

fn contains(input: &Path, points: &Path, offset: f64, cfg: &PolytopeCfg) -> Result<ContainsOut> {
    let dto: RegionDto = read_json(input)?;
    let region = build_region(&dto, cfg).with_context(|| format!("region in {}", input.display()))?;
    let raw: Vec<Vec<f64>> = read_json(points)?;
    let (dim, queries) = to_points(&raw).with_context(|| format!("points in {}", points.display()))?;
    anyhow::ensure!(
        dim == dto.dim,
        "query points have dimension {dim}, region has {}",
        dto.dim
    );
    tracing::info!(input = %input.display(), queries = queries.len(), offset, "contains");
    Ok(ContainsOut {
        inside: region.interior_point_indices(&queries, offset),
        total: queries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    const TWO_SQUARES: &str = r#"{
        "dim": 2,
        "members": [
            {"points": [[0, 0], [1, 0], [1, 1], [0, 1]]},
            {"halfspaces": [{"n": [1, 0], "c": -1.5}, {"n": [-1, 0], "c": 0.5},
                            {"n": [0, 1], "c": -1}, {"n": [0, -1], "c": 0}]}
        ]
    }"#;

    #[test]
    fn vrep_of_a_square_with_an_inner_point() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "pts.json", "[[0,0],[2,0],[2,2],[0,2],[1,1]]");
        let out = vrep(&input, false, &PolytopeCfg::default()).unwrap();
        assert!(out.success);
        assert_eq!(out.dim, 2);
        assert_eq!(out.vertices.len(), 4);
        assert!(!out.vertex_ids.contains(&4));
        assert_eq!(out.facets.len(), 4);
        assert!((out.volume - 4.0).abs() < 1e-9);
        assert!((out.area - 8.0).abs() < 1e-9);
    }

    #[test]
    fn vrep_of_flat_points_needs_the_flag() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "line.json", "[[0,0],[1,1],[2,2]]");
        assert!(!vrep(&input, false, &PolytopeCfg::default()).unwrap().success);
        let out = vrep(&input, true, &PolytopeCfg::default()).unwrap();
        assert!(out.success);
        assert_eq!(out.vertices.len(), 2);
        assert_eq!(out.volume, 0.0);
    }

    #[test]
    fn hrep_reports_empty_and_bounded() {
        let dir = tempdir().unwrap();
        let tri = write(
            dir.path(),
            "tri.json",
            r#"[{"n": [-1, 0], "c": 0}, {"n": [0, -1], "c": 0}, {"n": [1, 1], "c": -1},
                {"n": [1, 0], "c": -5}]"#,
        );
        let out = hrep(&tri, &PolytopeCfg::default()).unwrap();
        assert!(out.feasible && out.bounded);
        assert_eq!(out.vertices.len(), 3);
        assert_eq!(out.facets.len(), 3);
        assert!(out.interior_point.is_some());

        let none = write(
            dir.path(),
            "none.json",
            r#"[{"n": [1, 0], "c": 0}, {"n": [-1, 0], "c": 1}]"#,
        );
        let out = hrep(&none, &PolytopeCfg::default()).unwrap();
        assert!(!out.feasible);
        assert!(out.interior_point.is_none());
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["interior_point"].is_null());
    }

    #[test]
    fn volume_of_overlapping_squares() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "region.json", TWO_SQUARES);
        let out = volume(&input, &PolytopeCfg::default()).unwrap();
        assert_eq!(out.members, 2);
        assert!(out.bounded && !out.empty);
        assert!((out.volume.unwrap() - 1.5).abs() < 1e-7);
        assert!(out.interior_point.is_some());
    }

    #[test]
    fn unbounded_volume_is_null() {
        let dir = tempdir().unwrap();
        let input = write(
            dir.path(),
            "half.json",
            r#"{"dim": 2, "members": [{"halfspaces": [{"n": [1, 0], "c": 0}]}]}"#,
        );
        let out = volume(&input, &PolytopeCfg::default()).unwrap();
        assert!(!out.bounded);
        assert!(out.volume.is_none());
    }

    #[test]
    fn contains_lists_inside_indices() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "region.json", TWO_SQUARES);
        let queries = write(dir.path(), "q.json", "[[0.25,0.5],[1.25,0.5],[3,3],[1.49,0.5]]");
        let cfg = PolytopeCfg::default();
        let out = contains(&input, &queries, 0.0, &cfg).unwrap();
        assert_eq!(out.inside, vec![0, 1, 3]);
        assert_eq!(out.total, 4);
        let out = contains(&input, &queries, 0.05, &cfg).unwrap();
        assert_eq!(out.inside, vec![0, 1]);

        let wrong = write(dir.path(), "q3.json", "[[0,0,0]]");
        assert!(contains(&input, &wrong, 0.0, &cfg).is_err());
    }

    #[test]
    fn cli_parses_global_tolerances() {
        let cmd = Cmd::try_parse_from([
            "polyregion",
            "contains",
            "--input",
            "r.json",
            "--points",
            "p.json",
            "--offset",
            "-0.5",
            "--dist-tol",
            "1e-6",
        ])
        .unwrap();
        assert_eq!(cmd.dist_tol, 1e-6);
        assert_eq!(cmd.merge_tol, 0.0);
        match cmd.action {
            Action::Contains { offset, .. } => assert_eq!(offset, -0.5),
            _ => panic!("expected contains"),
        }
    }
}
