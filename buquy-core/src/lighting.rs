/// Point light and the per-face / per-vertex lighting models
use nalgebra::{Matrix4, Vector3};

use crate::config::LightingParams;
use crate::transform::{Transform, VectorExt};

/// Single positional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    direction: Vector3<f32>,
    position: Vector3<f32>,
}

impl Light {
    /// Place the light `distance` units from the origin along `direction`
    pub fn from_direction(direction: Vector3<f32>, distance: f32) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            direction,
            position: direction * distance,
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            direction: position.normalize_or_zero(),
            position,
        }
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }
}

impl LightingParams {
    /// Phong-style intensity at a surface point.
    ///
    /// `normal` is in object space and is carried to world space by `model`;
    /// `position` and `eye` are world-space. The result lies in `[floor, 1]`.
    pub fn phong(
        &self,
        light: &Light,
        normal: &Vector3<f32>,
        model: &Matrix4<f32>,
        position: &Vector3<f32>,
        eye: &Vector3<f32>,
    ) -> f32 {
        let to_light = light.position - position;
        let light_vec = to_light.normalize_or_zero();
        let mut world_normal = Transform::apply_vector(model, normal).normalize_or_zero();

        // Two-sided surfaces: face the normal toward the light
        if world_normal.dot(&light_vec) < 0.0 {
            world_normal = -world_normal;
        }

        let attenuation = self.attenuation.factor(to_light.norm());

        let (diffuse, specular) = if world_normal == Vector3::zeros() {
            (0.0, 0.0)
        } else {
            let n_dot_l = world_normal.dot(&light_vec);
            let diffuse = self.diffuse * n_dot_l.max(0.0);
            let reflect = (light_vec - world_normal * (2.0 * n_dot_l)).normalize_or_zero();
            let view = (eye - position).normalize_or_zero();
            let specular = self.specular * reflect.dot(&view).max(0.0).powi(self.shininess);
            (diffuse, specular)
        };

        let intensity = (self.ambient + diffuse + specular).clamp(0.0, 1.0) * attenuation;
        self.clamp(intensity)
    }

    /// One-sided Lambert term of a face against the light, for flat shading
    pub fn flat(
        &self,
        light: &Light,
        normal: &Vector3<f32>,
        model: &Matrix4<f32>,
        center: &Vector3<f32>,
    ) -> f32 {
        let world_normal = Transform::apply_vector(model, normal).normalize_or_zero();
        let light_vec = (light.position - center).normalize_or_zero();
        self.clamp(world_normal.dot(&light_vec))
    }

    fn clamp(&self, intensity: f32) -> f32 {
        if intensity.is_nan() {
            return self.floor;
        }
        intensity.clamp(self.floor, 1.0)
    }
}
