/// 3D vector helpers, homogeneous transform matrices and rotation state
use nalgebra::{Matrix4, Vector3, Vector4};

/// Extension methods for vectors used by the pipeline
pub trait VectorExt {
    /// Unit vector in the same direction, or the zero vector when the length is zero
    fn normalize_or_zero(&self) -> Self;
}

impl VectorExt for Vector3<f32> {
    fn normalize_or_zero(&self) -> Self {
        self.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }
}

/// Coordinate axis selector used by rotations and mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Euler rotation state around three axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn rotate_axis(&mut self, axis: Axis, degrees: f32) {
        match axis {
            Axis::X => self.x += degrees,
            Axis::Y => self.y += degrees,
            Axis::Z => self.z += degrees,
        }
    }

    /// Combined rotation `Rx * Ry * Rz`, so Z is applied first
    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::rotation_x(self.x) * Transform::rotation_y(self.y) * Transform::rotation_z(self.z)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
///
/// All angles are in degrees. Rotations are right-handed:
/// `rotation_z(90)` takes +X to +Y, `rotation_x(90)` takes +Y to +Z and
/// `rotation_y(90)` takes +Z to +X.
pub struct Transform;

impl Transform {
    pub fn rotation_x(degrees: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::x_axis(), degrees.to_radians())
    }

    pub fn rotation_y(degrees: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::y_axis(), degrees.to_radians())
    }

    pub fn rotation_z(degrees: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::z_axis(), degrees.to_radians())
    }

    pub fn rotation(axis: Axis, degrees: f32) -> Matrix4<f32> {
        match axis {
            Axis::X => Self::rotation_x(degrees),
            Axis::Y => Self::rotation_y(degrees),
            Axis::Z => Self::rotation_z(degrees),
        }
    }

    /// Create a translation matrix
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Mirror matrix negating every flagged axis
    pub fn mirror(flags: [bool; 3]) -> Matrix4<f32> {
        let sign = |flag: bool| if flag { -1.0 } else { 1.0 };
        Self::scaling(sign(flags[0]), sign(flags[1]), sign(flags[2]))
    }

    /// Apply a matrix to a point with implicit `w = 1`.
    ///
    /// The result is divided by the homogeneous `w` only when it is non-zero;
    /// a zero `w` passes the point through undivided.
    pub fn apply(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector3<f32> {
        let h = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
        if h.w != 0.0 {
            Vector3::new(h.x / h.w, h.y / h.w, h.z / h.w)
        } else {
            Vector3::new(h.x, h.y, h.z)
        }
    }

    /// Apply only the linear part of a matrix (directions, normals)
    pub fn apply_vector(matrix: &Matrix4<f32>, vector: &Vector3<f32>) -> Vector3<f32> {
        matrix.fixed_view::<3, 3>(0, 0) * vector
    }
}
