//! Procedural geometry. The demo loads no model files; every mesh is
//! generated here and uploaded once at startup.

use wgpu::util::DeviceExt;

use crate::renderer::vertex::Vertex;

/// CPU-side mesh under construction.
#[derive(Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Four corners, one shared normal, two triangles.
    pub fn add_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], color: [f32; 3]) {
        let start_index = self.vertices.len() as u32;
        for corner in corners {
            self.vertices.push(Vertex::new(corner, normal, color));
        }
        self.indices.extend_from_slice(&[
            start_index,
            start_index + 1,
            start_index + 2,
            start_index,
            start_index + 2,
            start_index + 3,
        ]);
    }

    pub fn add_triangle(&mut self, corners: [[f32; 3]; 3], normal: [f32; 3], color: [f32; 3]) {
        let start_index = self.vertices.len() as u32;
        for corner in corners {
            self.vertices.push(Vertex::new(corner, normal, color));
        }
        self.indices
            .extend_from_slice(&[start_index, start_index + 1, start_index + 2]);
    }

    /// Axis-aligned box from center and half-extents.
    pub fn add_box(&mut self, center: [f32; 3], half: [f32; 3], color: [f32; 3]) {
        let [cx, cy, cz] = center;
        let [hx, hy, hz] = half;
        let (x0, x1) = (cx - hx, cx + hx);
        let (y0, y1) = (cy - hy, cy + hy);
        let (z0, z1) = (cz - hz, cz + hz);

        // +X / -X
        self.add_quad(
            [[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]],
            [1.0, 0.0, 0.0],
            color,
        );
        self.add_quad(
            [[x0, y0, z1], [x0, y1, z1], [x0, y1, z0], [x0, y0, z0]],
            [-1.0, 0.0, 0.0],
            color,
        );
        // +Y / -Y
        self.add_quad(
            [[x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0]],
            [0.0, 1.0, 0.0],
            color,
        );
        self.add_quad(
            [[x0, y0, z1], [x0, y0, z0], [x1, y0, z0], [x1, y0, z1]],
            [0.0, -1.0, 0.0],
            color,
        );
        // +Z / -Z
        self.add_quad(
            [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
            [0.0, 0.0, 1.0],
            color,
        );
        self.add_quad(
            [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
            [0.0, 0.0, -1.0],
            color,
        );
    }
}

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Unit box, 2x2x2 centered at the origin; part scales stretch it.
pub fn build_box() -> MeshData {
    let mut mesh = MeshData::new();
    mesh.add_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], WHITE);
    mesh
}

/// Y-axis cylinder, radius 1, height 2, smooth side normals.
pub fn build_cylinder(slices: u32) -> MeshData {
    let mut mesh = MeshData::new();
    let slices = slices.max(3);

    // Side: two rings of shared vertices.
    let ring_start = mesh.vertices.len() as u32;
    for i in 0..=slices {
        let theta = i as f32 / slices as f32 * std::f32::consts::TAU;
        let (sin, cos) = theta.sin_cos();
        let normal = [cos, 0.0, sin];
        mesh.vertices.push(Vertex::new([cos, -1.0, sin], normal, WHITE));
        mesh.vertices.push(Vertex::new([cos, 1.0, sin], normal, WHITE));
    }
    for i in 0..slices {
        let a = ring_start + 2 * i;
        mesh.indices
            .extend_from_slice(&[a, a + 1, a + 3, a, a + 3, a + 2]);
    }

    // Caps: triangle fans around the axis.
    for (y, normal) in [(1.0f32, [0.0, 1.0, 0.0]), (-1.0, [0.0, -1.0, 0.0])] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex::new([0.0, y, 0.0], normal, WHITE));
        let rim_start = mesh.vertices.len() as u32;
        for i in 0..=slices {
            let theta = i as f32 / slices as f32 * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.vertices.push(Vertex::new([cos, y, sin], normal, WHITE));
        }
        for i in 0..slices {
            if y > 0.0 {
                mesh.indices
                    .extend_from_slice(&[center, rim_start + i, rim_start + i + 1]);
            } else {
                mesh.indices
                    .extend_from_slice(&[center, rim_start + i + 1, rim_start + i]);
            }
        }
    }

    mesh
}

/// Flat XZ ground square centered at the origin, normal up.
pub fn build_plane(size: f32) -> MeshData {
    let mut mesh = MeshData::new();
    let h = size * 0.5;
    mesh.add_quad(
        [[-h, 0.0, -h], [-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h]],
        [0.0, 1.0, 0.0],
        WHITE,
    );
    mesh
}

/// Stand-in for the original house model: a box of walls under a pyramid
/// roof, base resting on y = 0.
pub fn build_house() -> MeshData {
    let mut mesh = MeshData::new();

    let wall_color = [1.0, 1.0, 1.0];
    let roof_color = [0.55, 0.25, 0.2];

    mesh.add_box([0.0, 3.0, 0.0], [6.0, 3.0, 5.0], wall_color);

    // Pyramid roof with a slight overhang.
    let apex = [0.0, 10.5, 0.0];
    let base = [
        [-6.6, 6.0, -5.6],
        [-6.6, 6.0, 5.6],
        [6.6, 6.0, 5.6],
        [6.6, 6.0, -5.6],
    ];
    for i in 0..4 {
        let a = base[i];
        let b = base[(i + 1) % 4];
        let normal = triangle_normal(a, b, apex);
        mesh.add_triangle([a, b, apex], normal, roof_color);
    }
    // Underside of the overhang.
    mesh.add_quad(
        [base[3], base[2], base[1], base[0]],
        [0.0, -1.0, 0.0],
        roof_color,
    );

    mesh
}

/// Unit cube for the sky pass; the shader re-centers it on the camera and
/// pins its depth to the far plane, so no radius is needed.
pub fn build_sky_cube() -> MeshData {
    let mut mesh = MeshData::new();
    mesh.add_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], WHITE);
    mesh
}

fn triangle_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt().max(1e-6);
    [n[0] / len, n[1] / len, n[2] / len]
}

/// GPU-resident mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} vertices", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} indices", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.indices.len() as u32,
        }
    }
}
