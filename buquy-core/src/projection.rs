/// Camera and projection utilities
use nalgebra::{Matrix4, Point2, Vector3};

use crate::transform::{RotationState, Transform};

/// Screen coordinate conventionally used for a point that failed to project
pub const SENTINEL_COORD: f32 = -1000.0;

pub fn sentinel() -> Point2<f32> {
    Point2::new(SENTINEL_COORD, SENTINEL_COORD)
}

/// Euler camera: translate by `-position`, then rotate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub rotation: RotationState,
}

impl Camera {
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: RotationState::zero(),
        }
    }

    /// World to camera space: `Rx * Ry * Rz * T(-position)`
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.rotation.matrix()
            * Transform::translation(-self.position.x, -self.position.y, -self.position.z)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, -400.0))
    }
}

/// Output surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Per-axis factors that keep the narrower axis from stretching
    pub fn aspect_correction(&self) -> (f32, f32) {
        let aspect = self.aspect();
        if aspect > 1.0 {
            (1.0 / aspect, 1.0)
        } else {
            (1.0, aspect)
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Perspective projection from camera space to screen space
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    pub viewport: Viewport,
    pub focal_length: f32,
    pub scale: f32,
}

impl Projector {
    pub fn new(viewport: Viewport, focal_length: f32, scale: f32) -> Self {
        Self {
            viewport,
            focal_length,
            scale,
        }
    }

    /// Project a camera-space point to screen space.
    ///
    /// Points at or behind the camera (`z <= 0`) have no projection.
    pub fn project(&self, point: &Vector3<f32>) -> Option<Point2<f32>> {
        if point.z <= 0.0 {
            return None;
        }
        let factor = self.focal_length / point.z * self.scale;
        let (ax, ay) = self.viewport.aspect_correction();
        Some(Point2::new(
            point.x * factor * ax + self.viewport.width as f32 / 2.0,
            point.y * factor * ay + self.viewport.height as f32 / 2.0,
        ))
    }

    /// Like `project`, but reports unprojectable points as the sentinel
    pub fn project_or_sentinel(&self, point: &Vector3<f32>) -> Point2<f32> {
        self.project(point).unwrap_or_else(sentinel)
    }
}
