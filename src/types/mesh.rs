/// Render geometry of a single panel.
///
/// All buffers are contiguous `Vec<f32>` / `Vec<u32>` so the render
/// collaborator can upload them directly (see [`PanelMesh::uv_bytes`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelMesh {
    /// Interleaved mesh-local positions: [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Interleaved coordinates in the shape's own 2D plane: [x, y, ...].
    /// These are what UVs are computed from.
    pub plane: Vec<f32>,
    /// Interleaved atlas UVs: [u, v, u, v, ...]
    pub uvs: Vec<f32>,
    /// Triangle indices into the vertex buffers
    pub indices: Vec<u32>,
}

impl PanelMesh {
    /// Number of vertices (positions / 3).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles (indices / 3).
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether UV coordinates are present.
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Local plane coordinate of vertex `i`.
    pub fn plane_point(&self, i: usize) -> [f32; 2] {
        [self.plane[i * 2], self.plane[i * 2 + 1]]
    }

    /// UV of vertex `i`.
    pub fn uv(&self, i: usize) -> [f32; 2] {
        [self.uvs[i * 2], self.uvs[i * 2 + 1]]
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
