// Procedural mesh types and triangulation.
//
// Two-layer architecture:
//   cube() / floor() → PolyMesh → triangulate() → RenderMesh → GPU
//
// Shading is unlit (flat per-instance colour), so vertices carry positions only.

use glam::Vec3;

// ============================================================================
// GPU VERTEX
// ============================================================================

/// GPU-ready vertex.
///   @location(0) position: vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

// ============================================================================
// POLY MESH
// ============================================================================

/// Polygon mesh with n-gon faces.
/// Faces use CCW winding when viewed from outside (consistent with back-face culling).
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub faces:     Vec<Vec<usize>>,  // each face = CCW-ordered vertex index list
}

impl PolyMesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces:     Vec::new(),
        }
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, pos: Vec3) -> usize {
        let idx = self.positions.len();
        self.positions.push(pos);
        idx
    }

    /// Add a face by vertex indices (CCW order).
    pub fn add_face(&mut self, indices: Vec<usize>) {
        debug_assert!(indices.len() >= 3, "Face must have at least 3 vertices");
        self.faces.push(indices);
    }
}

// ============================================================================
// RENDER MESH
// ============================================================================

/// GPU-ready triangulated mesh.
/// Upload vertex_bytes() to a VERTEX buffer, index_bytes() to an INDEX buffer.
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices:  Vec<u32>,
}

impl RenderMesh {
    /// Cast vertex slice to raw bytes for wgpu buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Cast index slice to raw bytes for wgpu buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> usize  { self.indices.len() }
}

/// Fan-triangulate every face (from vertex 0). Vertices are shared through
/// the index buffer.
pub fn triangulate(poly: &PolyMesh) -> RenderMesh {
    let vertices = poly.positions.iter()
        .map(|pos| GpuVertex { position: pos.to_array() })
        .collect();

    let mut indices: Vec<u32> = Vec::new();
    for face in &poly.faces {
        let n = face.len();
        for i in 1..(n - 1) {
            indices.push(face[0]     as u32);
            indices.push(face[i]     as u32);
            indices.push(face[i + 1] as u32);
        }
    }

    RenderMesh { vertices, indices }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Axis-aligned box centred on the origin with edge length `size`.
pub fn cube(size: f32) -> PolyMesh {
    let h = size * 0.5;
    let mut mesh = PolyMesh::new();
    for (x, y, z) in [
        (-h, -h,  h), ( h, -h,  h), ( h,  h,  h), (-h,  h,  h),
        (-h, -h, -h), ( h, -h, -h), ( h,  h, -h), (-h,  h, -h),
    ] {
        mesh.add_vertex(Vec3::new(x, y, z));
    }

    mesh.add_face(vec![0, 1, 2, 3]); // Front  (+Z)
    mesh.add_face(vec![5, 4, 7, 6]); // Back   (-Z)
    mesh.add_face(vec![4, 0, 3, 7]); // Left   (-X)
    mesh.add_face(vec![1, 5, 6, 2]); // Right  (+X)
    mesh.add_face(vec![3, 2, 6, 7]); // Top    (+Y)
    mesh.add_face(vec![4, 5, 1, 0]); // Bottom (-Y)
    mesh
}

/// Square on the XZ plane (y = 0), `size` on a side, facing +Y.
pub fn floor(size: f32) -> PolyMesh {
    let h = size * 0.5;
    let mut mesh = PolyMesh::new();
    let a = mesh.add_vertex(Vec3::new(-h, 0.0,  h));
    let b = mesh.add_vertex(Vec3::new( h, 0.0,  h));
    let c = mesh.add_vertex(Vec3::new( h, 0.0, -h));
    let d = mesh.add_vertex(Vec3::new(-h, 0.0, -h));
    mesh.add_face(vec![a, b, c, d]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normals(mesh: &RenderMesh) -> Vec<(Vec3, Vec3)> {
        mesh.indices
            .chunks(3)
            .map(|tri| {
                let [a, b, c] = [tri[0], tri[1], tri[2]]
                    .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
                ((b - a).cross(c - a), (a + b + c) / 3.0)
            })
            .collect()
    }

    #[test]
    fn cube_has_twelve_outward_triangles() {
        let mesh = triangulate(&cube(1.0));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.index_count(), 36);
        for (normal, centroid) in triangle_normals(&mesh) {
            assert!(normal.dot(centroid) > 0.0, "inward face at {centroid:?}");
        }
    }

    #[test]
    fn cube_spans_its_size() {
        let poly = cube(1.0);
        for p in &poly.positions {
            assert_eq!(p.abs(), Vec3::splat(0.5));
        }
    }

    #[test]
    fn floor_faces_up() {
        let mesh = triangulate(&floor(100.0));
        assert_eq!(mesh.index_count(), 6);
        for (normal, _) in triangle_normals(&mesh) {
            assert!(normal.normalize().abs_diff_eq(Vec3::Y, 1e-6));
        }
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<GpuVertex>());
    }
}
