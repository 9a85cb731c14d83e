use anyhow::{bail, Context, Result};
use nalgebra::DVector;
use polyregion::{ConvexPolytope, Halfspace, PolytopeCfg, SpaceRegion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Half-space `n·x + c <= 0` as stored in JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HalfspaceDto {
    pub n: Vec<f64>,
    pub c: f64,
}

impl From<&Halfspace> for HalfspaceDto {
    fn from(h: &Halfspace) -> Self {
        Self {
            n: h.n.iter().copied().collect(),
            c: h.c,
        }
    }
}

impl HalfspaceDto {
    pub fn to_halfspace(&self) -> Halfspace {
        Halfspace::new(DVector::from_column_slice(&self.n), self.c)
    }
}

/// One region member, given either as points or as half-spaces:
/// `{"points": [[..], ..]}` or `{"halfspaces": [{"n": [..], "c": ..}, ..]}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberDto {
    Points(Vec<Vec<f64>>),
    Halfspaces(Vec<HalfspaceDto>),
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegionDto {
    pub dim: usize,
    pub members: Vec<MemberDto>,
}

pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Points as vectors of one common dimension, which is returned alongside.
pub fn to_points(raw: &[Vec<f64>]) -> Result<(usize, Vec<DVector<f64>>)> {
    let Some(first) = raw.first() else {
        bail!("no points given");
    };
    let dim = first.len();
    if dim == 0 {
        bail!("points must have at least one coordinate");
    }
    if let Some((i, p)) = raw.iter().enumerate().find(|(_, p)| p.len() != dim) {
        bail!("point {i} has {} coordinates, expected {dim}", p.len());
    }
    Ok((dim, raw.iter().map(|p| DVector::from_column_slice(p)).collect()))
}

pub fn to_halfspaces(raw: &[HalfspaceDto]) -> Result<(usize, Vec<Halfspace>)> {
    let Some(first) = raw.first() else {
        bail!("no half-spaces given");
    };
    let dim = first.n.len();
    if let Some((i, h)) = raw.iter().enumerate().find(|(_, h)| h.n.len() != dim) {
        bail!("half-space {i} has {} normal coordinates, expected {dim}", h.n.len());
    }
    Ok((dim, raw.iter().map(HalfspaceDto::to_halfspace).collect()))
}

pub fn build_region(dto: &RegionDto, cfg: &PolytopeCfg) -> Result<SpaceRegion> {
    let mut polytopes = Vec::with_capacity(dto.members.len());
    for (i, member) in dto.members.iter().enumerate() {
        let (dim, poly) = match member {
            MemberDto::Points(raw) => {
                let (dim, pts) = to_points(raw).with_context(|| format!("member {i}"))?;
                (dim, ConvexPolytope::from_points(&pts, dim, cfg))
            }
            MemberDto::Halfspaces(raw) => {
                let (dim, hs) = to_halfspaces(raw).with_context(|| format!("member {i}"))?;
                (dim, ConvexPolytope::from_halfspaces(&hs, dim, cfg))
            }
        };
        if dim != dto.dim {
            bail!("member {i} lives in dimension {dim}, region in {}", dto.dim);
        }
        polytopes.push(poly);
    }
    Ok(SpaceRegion::new(dto.dim, polytopes))
}

/// Finite coordinates, or `None` for the NaN sentinel.
pub fn finite_point(p: &DVector<f64>) -> Option<Vec<f64>> {
    p.iter()
        .all(|x| x.is_finite())
        .then(|| p.iter().copied().collect())
}
