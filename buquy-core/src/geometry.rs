/// Geometry primitives: colours, index-based faces and meshes
use nalgebra::Vector3;

use crate::error::MeshError;
use crate::transform::VectorExt;

/// 24-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `intensity`, truncating and saturating at 255
    pub fn shade(self, intensity: f32) -> Color {
        let scale = |c: u8| (c as f32 * intensity).clamp(0.0, 255.0) as u8;
        Color::rgb(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Relative luminance in `[0, 1]`
    pub fn luminance(self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }
}

/// A planar polygon referencing vertices of its mesh by index
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: Vec<usize>,
    pub color: Color,
    pub normal: Vector3<f32>,
    pub center: Vector3<f32>,
}

impl Face {
    /// Build a face and cache its normal and centroid from `vertices`.
    ///
    /// Indices must already be validated against `vertices`.
    fn new(indices: Vec<usize>, vertices: &[Vector3<f32>], color: Color) -> Self {
        let points: Vec<Vector3<f32>> = indices.iter().map(|&i| vertices[i]).collect();
        Self {
            normal: calculate_normal(&points),
            center: calculate_center(&points),
            indices,
            color,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Normal from the first three vertices; zero for degenerate input
pub fn calculate_normal(points: &[Vector3<f32>]) -> Vector3<f32> {
    if points.len() < 3 {
        return Vector3::zeros();
    }
    let edge1 = points[1] - points[0];
    let edge2 = points[2] - points[0];
    edge1.cross(&edge2).normalize_or_zero()
}

/// Arithmetic mean of the points; zero for an empty list
pub fn calculate_center(points: &[Vector3<f32>]) -> Vector3<f32> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    points.iter().sum::<Vector3<f32>>() / points.len() as f32
}

/// Polygon mesh with a shared vertex arena
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    faces: Vec<Face>,
    vertex_normals: Vec<Vector3<f32>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Per-vertex normals, aligned with `vertices()`; current as of the last `finish`
    pub fn vertex_normals(&self) -> &[Vector3<f32>] {
        &self.vertex_normals
    }

    /// Add a vertex and return its index.
    ///
    /// A position equal to an existing vertex reuses that index, so corners
    /// shared between parts of a solid are smoothed together.
    pub fn add_vertex(&mut self, position: Vector3<f32>) -> usize {
        if let Some(index) = self.vertices.iter().position(|v| *v == position) {
            return index;
        }
        self.vertices.push(position);
        self.vertex_normals.push(Vector3::z());
        self.vertices.len() - 1
    }

    /// Add a face over existing vertex indices and return its index
    pub fn add_face(&mut self, indices: Vec<usize>, color: Color) -> Result<usize, MeshError> {
        if indices.len() < 3 {
            return Err(MeshError::TooFewVertices(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= self.vertices.len()) {
            return Err(MeshError::VertexIndexOutOfRange {
                index,
                len: self.vertices.len(),
            });
        }
        self.faces.push(Face::new(indices, &self.vertices, color));
        Ok(self.faces.len() - 1)
    }

    /// Add a face from positions, registering its vertices on the way
    pub fn add_polygon(&mut self, points: &[Vector3<f32>], color: Color) -> Result<usize, MeshError> {
        let indices = points.iter().map(|p| self.add_vertex(*p)).collect();
        self.add_face(indices, color)
    }

    /// Average the normals of every face referencing each vertex.
    ///
    /// Call once after the last face is added; vertices no face references
    /// keep `(0, 0, 1)`.
    pub fn finish(&mut self) {
        let mut sums = vec![Vector3::zeros(); self.vertices.len()];
        let mut counts = vec![0usize; self.vertices.len()];
        for face in &self.faces {
            for &i in &face.indices {
                sums[i] += face.normal;
                counts[i] += 1;
            }
        }
        self.vertex_normals = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| if count > 0 { sum.normalize_or_zero() } else { Vector3::z() })
            .collect();
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.inf(v), hi.sup(v))
        }))
    }
}
