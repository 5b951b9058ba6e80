use std::f32::consts::{FRAC_PI_2, PI, TAU};

use wgpu::util::DeviceExt;

use crate::data_structures::mesh::{GeometryData, Shape};

const ROUND_SEGMENTS: u32 = 36;
const SPHERE_STACKS: u32 = 18;
const TORUS_MAIN_RADIUS: f32 = 1.0;
const TORUS_TUBE_RADIUS: f32 = 0.2;
const TORUS_TUBE_SEGMENTS: u32 = 18;

/// Procedural geometry for one primitive kind.
pub fn generate(shape: Shape) -> GeometryData {
    match shape {
        Shape::Plane => generate_plane(),
        Shape::Box => generate_box(),
        Shape::Cylinder => generate_cylinder(ROUND_SEGMENTS),
        Shape::Prism => generate_prism(),
        Shape::Sphere => generate_sphere(ROUND_SEGMENTS, SPHERE_STACKS),
        Shape::HalfSphere => generate_half_sphere(ROUND_SEGMENTS, SPHERE_STACKS / 2),
        Shape::Torus => generate_torus(
            TORUS_MAIN_RADIUS,
            TORUS_TUBE_RADIUS,
            ROUND_SEGMENTS,
            TORUS_TUBE_SEGMENTS,
        ),
    }
}

fn push_face(data: &mut GeometryData, corners: [[f32; 3]; 4], normal: [f32; 3]) {
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let idx: Vec<u32> = corners
        .iter()
        .zip(uvs)
        .map(|(corner, uv)| data.push_vertex(*corner, normal, uv))
        .collect();
    data.push_quad(idx[0], idx[1], idx[2], idx[3]);
}

/// 2x2 plane in XZ facing +Y.
pub fn generate_plane() -> GeometryData {
    let mut data = GeometryData::new();
    push_face(
        &mut data,
        [
            [-1.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 0.0, -1.0],
            [-1.0, 0.0, -1.0],
        ],
        [0.0, 1.0, 0.0],
    );
    data
}

/// Unit cube centred at the origin, four vertices per face.
pub fn generate_box() -> GeometryData {
    // (normal, u axis, v axis) with u x v = normal
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut data = GeometryData::new();
    for (n, u, v) in faces {
        let corner = |su: f32, sv: f32| {
            [
                0.5 * (n[0] + su * u[0] + sv * v[0]),
                0.5 * (n[1] + su * u[1] + sv * v[1]),
                0.5 * (n[2] + su * u[2] + sv * v[2]),
            ]
        };
        push_face(
            &mut data,
            [
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ],
            n,
        );
    }
    data
}

/// Flat disc of radius 1 at height `y`, facing up or down.
fn push_disc(data: &mut GeometryData, y: f32, facing_up: bool, segments: u32) {
    let normal = if facing_up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = data.push_vertex([0.0, y, 0.0], normal, [0.5, 0.5]);
    let ring: Vec<u32> = (0..=segments)
        .map(|i| {
            let theta = TAU * i as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            data.push_vertex([cos, y, sin], normal, [0.5 + 0.5 * cos, 0.5 + 0.5 * sin])
        })
        .collect();
    for pair in ring.windows(2) {
        if facing_up {
            data.push_triangle(center, pair[1], pair[0]);
        } else {
            data.push_triangle(center, pair[0], pair[1]);
        }
    }
}

/// Radius 1, spanning y = 0 to y = 1, closed at both ends.
pub fn generate_cylinder(segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let mut bottom = Vec::with_capacity(segments as usize + 1);
    let mut top = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let (sin, cos) = (TAU * u).sin_cos();
        let normal = [cos, 0.0, sin];
        bottom.push(data.push_vertex([cos, 0.0, sin], normal, [u, 0.0]));
        top.push(data.push_vertex([cos, 1.0, sin], normal, [u, 1.0]));
    }
    for i in 0..segments as usize {
        data.push_quad(bottom[i], top[i], top[i + 1], bottom[i + 1]);
    }
    push_disc(&mut data, 1.0, true, segments);
    push_disc(&mut data, 0.0, false, segments);
    data
}

/// Triangular prism with its triangle in XY (apex up) extruded along Z.
pub fn generate_prism() -> GeometryData {
    let triangle = [[-0.5f32, -0.5f32], [0.5, -0.5], [0.0, 0.5]];
    let mut data = GeometryData::new();

    let front: Vec<u32> = triangle
        .iter()
        .map(|p| data.push_vertex([p[0], p[1], 0.5], [0.0, 0.0, 1.0], [p[0] + 0.5, p[1] + 0.5]))
        .collect();
    data.push_triangle(front[0], front[1], front[2]);

    let back: Vec<u32> = triangle
        .iter()
        .map(|p| data.push_vertex([p[0], p[1], -0.5], [0.0, 0.0, -1.0], [0.5 - p[0], p[1] + 0.5]))
        .collect();
    data.push_triangle(back[0], back[2], back[1]);

    for i in 0..3 {
        let e0 = triangle[i];
        let e1 = triangle[(i + 1) % 3];
        let (dx, dy) = (e1[0] - e0[0], e1[1] - e0[1]);
        let len = (dx * dx + dy * dy).sqrt();
        push_face(
            &mut data,
            [
                [e0[0], e0[1], 0.5],
                [e0[0], e0[1], -0.5],
                [e1[0], e1[1], -0.5],
                [e1[0], e1[1], 0.5],
            ],
            [dy / len, -dx / len, 0.0],
        );
    }
    data
}

/// Rings of a unit sphere from latitude `from` down to latitude `to` (radians).
fn push_sphere_band(data: &mut GeometryData, from: f32, to: f32, sectors: u32, stacks: u32) {
    let mut rows: Vec<Vec<u32>> = Vec::with_capacity(stacks as usize + 1);
    for j in 0..=stacks {
        let t = j as f32 / stacks as f32;
        let phi = from + (to - from) * t;
        let (y, r) = phi.sin_cos();
        let row = (0..=sectors)
            .map(|i| {
                let u = i as f32 / sectors as f32;
                let (sin, cos) = (TAU * u).sin_cos();
                let p = [r * cos, y, r * sin];
                data.push_vertex(p, p, [u, 0.5 + phi / PI])
            })
            .collect();
        rows.push(row);
    }
    for j in 0..stacks as usize {
        let (upper, lower) = (&rows[j], &rows[j + 1]);
        for i in 0..sectors as usize {
            if j > 0 || from < FRAC_PI_2 {
                data.push_triangle(lower[i], upper[i], upper[i + 1]);
            }
            if j + 1 < stacks as usize || to > -FRAC_PI_2 {
                data.push_triangle(upper[i + 1], lower[i + 1], lower[i]);
            }
        }
    }
}

/// UV sphere of radius 1.
pub fn generate_sphere(sectors: u32, stacks: u32) -> GeometryData {
    let mut data = GeometryData::new();
    push_sphere_band(&mut data, FRAC_PI_2, -FRAC_PI_2, sectors, stacks);
    data
}

/// Upper hemisphere of radius 1 sitting on a flat base at y = 0.
pub fn generate_half_sphere(sectors: u32, stacks: u32) -> GeometryData {
    let mut data = GeometryData::new();
    push_sphere_band(&mut data, FRAC_PI_2, 0.0, sectors, stacks);
    push_disc(&mut data, 0.0, false, sectors);
    data
}

/// Torus lying in the XY plane around the Z axis.
pub fn generate_torus(main_radius: f32, tube_radius: f32, ring_segments: u32, tube_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let columns = tube_segments as usize + 1;
    for i in 0..=ring_segments {
        let u = i as f32 / ring_segments as f32;
        let (sin_a, cos_a) = (TAU * u).sin_cos();
        for j in 0..=tube_segments {
            let v = j as f32 / tube_segments as f32;
            let (sin_b, cos_b) = (TAU * v).sin_cos();
            let normal = [cos_b * cos_a, cos_b * sin_a, sin_b];
            let position = [
                main_radius * cos_a + tube_radius * normal[0],
                main_radius * sin_a + tube_radius * normal[1],
                tube_radius * normal[2],
            ];
            data.push_vertex(position, normal, [u, v]);
        }
    }
    for i in 0..ring_segments as usize {
        for j in 0..tube_segments as usize {
            let a = (i * columns + j) as u32;
            let b = ((i + 1) * columns + j) as u32;
            data.push_quad(a, b, b + 1, a + 1);
        }
    }
    data
}

/// Vertex and index buffers of one uploaded primitive.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, geometry: &GeometryData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
        }
    }
}

/// One GPU mesh per primitive kind, uploaded on demand.
///
/// Only one copy of each mesh lives in memory no matter how often it is drawn.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: [Option<GpuMesh>; Shape::ALL.len()],
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, device: &wgpu::Device, shape: Shape) {
        let slot = &mut self.meshes[shape.index()];
        if slot.is_some() {
            return;
        }
        let geometry = generate(shape);
        log::debug!(
            "Uploading {:?} mesh with {} triangles",
            shape,
            geometry.triangle_count()
        );
        *slot = Some(GpuMesh::upload(device, &geometry, &format!("{shape:?}")));
    }

    pub fn get(&self, shape: Shape) -> Option<&GpuMesh> {
        self.meshes[shape.index()].as_ref()
    }
}
