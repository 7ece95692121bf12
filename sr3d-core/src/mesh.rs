/// Indexed triangle meshes
use nalgebra::{Matrix4, Vector3};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::math;

/// A mesh vertex: model-space position and colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub color: Color,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, color: Color) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            color,
        }
    }
}

/// A triangle face referencing three vertices.
///
/// Winding is counter-clockwise seen from outside, so the right-handed cross
/// product of the edges gives the outward normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub indices: [u32; 3],
}

impl Face {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }
}

/// Vertices plus faces. Every face index is checked against the vertex
/// list on construction, so lookups during drawing never go out of range.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>) -> Result<Self> {
        let vertex_count = vertices.len();
        for face in &faces {
            if let Some(&index) = face.indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::MeshIndexOutOfRange {
                    index: index as i64,
                    vertex_count,
                });
            }
        }

        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Model-space corner positions of a face.
    pub fn face_positions(&self, face: &Face) -> [Vector3<f32>; 3] {
        face.indices.map(|i| self.vertices[i as usize].position)
    }

    /// Colour of a face: its first vertex's colour.
    pub fn face_color(&self, face: &Face) -> Color {
        self.vertices[face.indices[0] as usize].color
    }

    /// Apply `matrix` to every vertex position.
    pub fn transform(&mut self, matrix: &Matrix4<f32>) {
        for vertex in &mut self.vertices {
            vertex.position = math::transform_point(matrix, &vertex.position);
        }
    }

    pub fn set_color(&mut self, color: Color) {
        for vertex in &mut self.vertices {
            vertex.color = color;
        }
    }

    /// Axis-aligned cube centred on the origin
    pub fn cube(size: f32, color: Color) -> Self {
        let half = size / 2.0;

        let vertices = vec![
            Vertex::new(-half, -half, -half, color),
            Vertex::new(half, -half, -half, color),
            Vertex::new(half, half, -half, color),
            Vertex::new(-half, half, -half, color),
            Vertex::new(-half, -half, half, color),
            Vertex::new(half, -half, half, color),
            Vertex::new(half, half, half, color),
            Vertex::new(-half, half, half, color),
        ];

        let faces = vec![
            // Front
            Face::new(4, 5, 6),
            Face::new(4, 6, 7),
            // Back
            Face::new(0, 3, 2),
            Face::new(0, 2, 1),
            // Top
            Face::new(3, 7, 6),
            Face::new(3, 6, 2),
            // Bottom
            Face::new(0, 1, 5),
            Face::new(0, 5, 4),
            // Right
            Face::new(1, 2, 6),
            Face::new(1, 6, 5),
            // Left
            Face::new(0, 4, 7),
            Face::new(0, 7, 3),
        ];

        Self { vertices, faces }
    }

    /// Regular dodecahedron with the given circumradius, 36 triangles.
    ///
    /// Each pentagon is found as the five vertices furthest along one of the
    /// twelve face directions, ordered around that direction and fanned.
    pub fn dodecahedron(radius: f32, color: Color) -> Self {
        let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let inv = 1.0 / phi;
        let scale = radius / 3.0_f32.sqrt();

        let mut positions = Vec::with_capacity(20);
        for x in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                for z in [-1.0, 1.0] {
                    positions.push(Vector3::new(x, y, z));
                }
            }
        }
        for a in [-1.0, 1.0] {
            for b in [-1.0, 1.0] {
                positions.push(Vector3::new(0.0, a * inv, b * phi));
                positions.push(Vector3::new(a * inv, b * phi, 0.0));
                positions.push(Vector3::new(a * phi, 0.0, b * inv));
            }
        }

        let mut face_directions = Vec::with_capacity(12);
        for a in [-1.0, 1.0] {
            for b in [-1.0, 1.0] {
                face_directions.push(Vector3::new(0.0, a * phi, b));
                face_directions.push(Vector3::new(b, 0.0, a * phi));
                face_directions.push(Vector3::new(a * phi, b, 0.0));
            }
        }

        let mut faces = Vec::with_capacity(36);
        for direction in &face_directions {
            let normal = direction.normalize();
            let furthest = positions
                .iter()
                .map(|p| p.dot(&normal))
                .fold(f32::MIN, f32::max);

            let mut ring: Vec<u32> = (0..positions.len() as u32)
                .filter(|&i| positions[i as usize].dot(&normal) > furthest - 1e-3)
                .collect();
            debug_assert_eq!(ring.len(), 5);

            let center = ring.iter().map(|&i| positions[i as usize]).sum::<Vector3<f32>>() / ring.len() as f32;
            let u = (positions[ring[0] as usize] - center).normalize();
            let w = normal.cross(&u);
            let angle = |i: &u32| {
                let offset = positions[*i as usize] - center;
                offset.dot(&w).atan2(offset.dot(&u))
            };
            ring.sort_by(|a, b| angle(a).total_cmp(&angle(b)));

            for k in 1..ring.len() - 1 {
                faces.push(Face::new(ring[0], ring[k], ring[k + 1]));
            }
        }

        let vertices = positions
            .into_iter()
            .map(|p| Vertex {
                position: p * scale,
                color,
            })
            .collect();

        Self { vertices, faces }
    }
}
