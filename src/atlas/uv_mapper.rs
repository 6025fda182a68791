use crate::types::{Island, LocalBounds, PanelMesh, Shape, UvPoint};

/// Normalize a plane point to its bounds. U is mirrored so the island
/// preview reads the same way as the panel seen from above.
///
/// The result is not clamped; outline points may sit exactly on (or, with
/// float error, slightly past) the bounds.
pub fn normalize(point: [f32; 2], bounds: &LocalBounds) -> UvPoint {
    UvPoint {
        u: 1.0 - (point[0] - bounds.min_x) / bounds.width,
        v: (point[1] - bounds.min_y) / bounds.height,
    }
}

/// Forward mapping of one plane point into atlas UV space.
///
/// Raster rows grow downwards while V grows upwards, hence the flip.
pub fn compute_uv(point: [f32; 2], bounds: &LocalBounds, island: &Island, atlas_size: u32) -> [f32; 2] {
    let norm = normalize(point, bounds);
    let norm_u = norm.u.clamp(0.0, 1.0);
    let norm_v = norm.v.clamp(0.0, 1.0);
    let atlas = atlas_size as f32;

    let u = (island.x as f32 + norm_u * island.width as f32) / atlas;
    let v = 1.0 - (island.y as f32 + (1.0 - norm_v) * island.height as f32) / atlas;
    [u, v]
}

/// UV outline for previews: one normalized point per outline point.
pub fn uv_outline(points: &[[f32; 2]], bounds: &LocalBounds) -> Vec<UvPoint> {
    points.iter().map(|p| normalize(*p, bounds)).collect()
}

/// Write per-vertex UVs for `mesh` from each vertex's own plane position.
pub fn map_mesh(mesh: &mut PanelMesh, bounds: &LocalBounds, island: &Island, atlas_size: u32) {
    let uvs: Vec<f32> = mesh
        .plane
        .chunks_exact(2)
        .flat_map(|p| compute_uv([p[0], p[1]], bounds, island, atlas_size))
        .collect();
    mesh.uvs = uvs;
}

/// Re-derive every vertex UV from the shape's stored bounds and current
/// island. Positions and bounds are never touched.
pub fn recompute_uv(shape: &mut Shape, atlas_size: u32) {
    map_mesh(&mut shape.mesh, &shape.bounds, &shape.island, atlas_size);
}

/// UV outline projected into raster pixels of the shape's island.
pub fn outline_in_raster(shape: &Shape) -> Vec<[f32; 2]> {
    let island = &shape.island;
    shape
        .uv_outline
        .iter()
        .map(|p| {
            [
                island.x as f32 + p.u * island.width as f32,
                island.y as f32 + (1.0 - p.v) * island.height as f32,
            ]
        })
        .collect()
}
