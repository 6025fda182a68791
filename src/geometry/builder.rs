use glam::{Mat3, Quat, Vec3};
use tracing::debug;

use crate::atlas::uv_mapper;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::types::{Island, LocalBounds, PanelMesh, Shape, ShapeId, ShapeKind, Transform};

/// Extents below this are treated as degenerate.
const MIN_EXTENT: f32 = 1e-6;

/// Panels are lifted slightly off the ground grid to avoid z-fighting.
const GROUND_OFFSET: f32 = 0.05;

/// Geometry of a panel before it has an island.
#[derive(Debug, Clone)]
pub struct PanelGeometry {
    pub kind: ShapeKind,
    pub transform: Transform,
    pub bounds: LocalBounds,
    /// Mesh with positions, plane coordinates and indices; no UVs yet.
    pub mesh: PanelMesh,
    /// Outline points in the shape's own plane.
    pub outline: Vec<[f32; 2]>,
    pub snap_points: Vec<Vec3>,
}

impl PanelGeometry {
    /// Island size this panel asks for.
    pub fn island_size(&self, config: &AtlasConfig) -> (u32, u32) {
        (
            config.island_extent(self.bounds.width),
            config.island_extent(self.bounds.height),
        )
    }

    /// Attach an island and compute the initial UVs.
    pub fn into_shape(self, id: ShapeId, island: Island, atlas_size: u32) -> Shape {
        let uv_outline = uv_mapper::uv_outline(&self.outline, &self.bounds);
        let mut shape = Shape {
            id,
            kind: self.kind,
            transform: self.transform,
            bounds: self.bounds,
            island,
            uv_outline,
            mesh: self.mesh,
            snap_points: self.snap_points,
        };
        uv_mapper::recompute_uv(&mut shape, atlas_size);
        shape
    }
}

/// Build geometry for either kind of shape.
pub fn build(kind: &ShapeKind) -> Result<PanelGeometry> {
    match kind {
        ShapeKind::Outline(points) => build_outline(points),
        ShapeKind::Triangle([p1, p2, p3]) => build_triangle(*p1, *p2, *p3),
    }
}

/// Flat panel from a closed polyline drawn on the ground grid.
///
/// Only X and Z of each point are used. A trailing point equal to the first
/// one (an explicitly closed loop) is dropped.
pub fn build_outline(points: &[Vec3]) -> Result<PanelGeometry> {
    let mut points = points.to_vec();
    if points.len() > 3 && points[0].distance(points[points.len() - 1]) < MIN_EXTENT {
        points.pop();
    }
    if points.len() < 3 {
        return Err(AtlasError::Geometry(format!(
            "outline needs at least 3 points, got {}",
            points.len()
        )));
    }

    let outline: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.z]).collect();
    let bounds = checked_bounds(&outline)?;
    let indices = triangulate(&outline)?;
    let [cx, cy] = bounds.center();

    let local: Vec<Vec3> = outline
        .iter()
        .map(|&[x, y]| Vec3::new(x - cx, 0.0, y - cy))
        .collect();

    let mesh = PanelMesh {
        positions: local.iter().flat_map(|p| p.to_array()).collect(),
        plane: outline.iter().flatten().copied().collect(),
        uvs: Vec::new(),
        indices,
    };

    debug!(
        points = outline.len(),
        triangles = mesh.triangle_count(),
        width = bounds.width,
        height = bounds.height,
        "Built outline panel"
    );

    Ok(PanelGeometry {
        kind: ShapeKind::Outline(points),
        transform: Transform {
            position: Vec3::new(cx, GROUND_OFFSET, cy),
            ..Default::default()
        },
        bounds,
        mesh,
        outline,
        snap_points: local,
    })
}

/// Panel spanning three arbitrary points, in a plane of its own.
///
/// The local frame has its origin at the centroid and X along `p1 -> p2`.
pub fn build_triangle(p1: Vec3, p2: Vec3, p3: Vec3) -> Result<PanelGeometry> {
    let center = (p1 + p2 + p3) / 3.0;
    let forward = (p2 - p1).normalize_or_zero();
    let toward_third = (p3 - p1).normalize_or_zero();
    let normal = forward.cross(toward_third).normalize_or_zero();
    if normal == Vec3::ZERO {
        return Err(AtlasError::Geometry("triangle points are collinear".into()));
    }
    let up = normal.cross(forward).normalize();

    let local: Vec<Vec3> = [p1, p2, p3]
        .iter()
        .map(|p| {
            let d = *p - center;
            Vec3::new(d.dot(forward), d.dot(up), 0.0)
        })
        .collect();
    let outline: Vec<[f32; 2]> = local.iter().map(|p| [p.x, p.y]).collect();
    let bounds = checked_bounds(&outline)?;

    let mesh = PanelMesh {
        positions: local.iter().flat_map(|p| p.to_array()).collect(),
        plane: outline.iter().flatten().copied().collect(),
        uvs: Vec::new(),
        indices: vec![0, 1, 2],
    };

    Ok(PanelGeometry {
        kind: ShapeKind::Triangle([p1, p2, p3]),
        transform: Transform {
            position: center,
            rotation: Quat::from_mat3(&Mat3::from_cols(forward, up, normal)),
            scale: Vec3::ONE,
        },
        bounds,
        mesh,
        outline,
        snap_points: local,
    })
}

fn checked_bounds(outline: &[[f32; 2]]) -> Result<LocalBounds> {
    let bounds = LocalBounds::from_points(outline)
        .ok_or_else(|| AtlasError::Geometry("shape has no points".into()))?;
    if bounds.width < MIN_EXTENT || bounds.height < MIN_EXTENT {
        return Err(AtlasError::Geometry(format!(
            "shape has zero extent ({} x {})",
            bounds.width, bounds.height
        )));
    }
    Ok(bounds)
}

/// Ear-clipping triangulation of a simple polygon.
fn triangulate(outline: &[[f32; 2]]) -> Result<Vec<u32>> {
    let flat: Vec<f64> = outline
        .iter()
        .flat_map(|p| [p[0] as f64, p[1] as f64])
        .collect();
    let indices = earcutr::earcut(&flat, &[], 2)
        .map_err(|e| AtlasError::Geometry(format!("triangulation failed: {e:?}")))?;
    if indices.is_empty() {
        return Err(AtlasError::Geometry("outline could not be triangulated".into()));
    }
    Ok(indices.into_iter().map(|i| i as u32).collect())
}
