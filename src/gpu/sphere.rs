//! UV sphere mesh generation.

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by every sphere.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side sphere geometry.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Build a Y-up sphere of `radius` with `sectors` slices around the axis
    /// and `stacks` bands from pole to pole.
    ///
    /// Each ring repeats its first vertex so the texture seam gets `u = 1`.
    /// Pole bands emit one triangle per sector instead of two.
    pub fn new(radius: f32, sectors: u32, stacks: u32) -> Self {
        use std::f32::consts::{FRAC_PI_2, PI, TAU};

        let sectors = sectors.max(3);
        let stacks = stacks.max(2);

        let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
        for i in 0..=stacks {
            let v = i as f32 / stacks as f32;
            let phi = FRAC_PI_2 - v * PI;
            let (y, ring) = (phi.sin(), phi.cos());

            for j in 0..=sectors {
                let u = j as f32 / sectors as f32;
                let theta = u * TAU;
                let normal = [ring * theta.sin(), y, ring * theta.cos()];
                vertices.push(SphereVertex {
                    position: normal.map(|c| c * radius),
                    normal,
                    uv: [u, v],
                });
            }
        }

        let mut indices = Vec::with_capacity((6 * sectors * (stacks - 1)) as usize);
        for i in 0..stacks {
            let k1 = i * (sectors + 1);
            let k2 = k1 + sectors + 1;
            for j in 0..sectors {
                let (a, b) = (k1 + j, k2 + j);
                if i != 0 {
                    indices.extend_from_slice(&[a, b, a + 1]);
                }
                if i != stacks - 1 {
                    indices.extend_from_slice(&[a + 1, b, b + 1]);
                }
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mesh = SphereMesh::new(1.0, 36, 18);
        assert_eq!(mesh.vertices.len(), 37 * 19);
        assert_eq!(mesh.indices.len(), 6 * 36 * 17);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_vertices_on_surface() {
        let mesh = SphereMesh::new(2.5, 12, 6);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!((r - 2.5).abs() < 1e-4);
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]));
        }
        // North pole first, south pole last.
        assert!((mesh.vertices[0].position[1] - 2.5).abs() < 1e-5);
        assert!((mesh.vertices.last().unwrap().position[1] + 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_detail_is_raised() {
        let mesh = SphereMesh::new(1.0, 1, 1);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert_eq!(mesh.indices.len(), 6 * 3);
    }

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<SphereVertex>(), 32);
    }
}
