/// Tunable constants for projection, lighting and interaction
use crate::geometry::Color;

/// Distance attenuation `1 / (constant + linear*d + quadratic*d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// Soft falloff suited to scenes a few hundred units across
    pub const SOFT: Attenuation = Attenuation {
        constant: 1.0,
        linear: 0.0014,
        quadratic: 0.000007,
    };

    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::SOFT
    }
}

/// Material and light response coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: i32,
    pub attenuation: Attenuation,
    /// Lowest intensity any lit surface may take
    pub floor: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient: 0.3,
            diffuse: 0.6,
            specular: 0.5,
            shininess: 32,
            attenuation: Attenuation::SOFT,
            floor: 0.3,
        }
    }
}

/// Renderer and interaction configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Perspective constant: screen offset = camera-space offset * focal_length / z
    pub focal_length: f32,
    /// Viewport size that maps to a base scale of 1.0 when auto-scaling
    pub reference_size: f32,
    /// Camera units moved per wheel notch
    pub zoom_step: f32,
    /// Wheel delta reported for one notch
    pub wheel_notch: f32,
    /// The camera may not approach past this z
    pub max_camera_z: f32,
    /// Degrees of object rotation per pixel dragged
    pub drag_speed: f32,
    /// Distance of the light from the origin when set by direction
    pub light_distance: f32,
    /// Length of the axis gizmo arms
    pub axis_length: f32,
    /// Grid divisions per triangle edge for Phong shading
    pub phong_subdivisions: u32,
    pub point_size: f32,
    pub wireframe_width: f32,
    pub background: Color,
    pub outline: Color,
    pub lighting: LightingParams,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            focal_length: 300.0,
            reference_size: 600.0,
            zoom_step: 10.0,
            wheel_notch: 120.0,
            max_camera_z: -50.0,
            drag_speed: 0.5,
            light_distance: 150.0,
            axis_length: 150.0,
            phong_subdivisions: 3,
            point_size: 5.0,
            wireframe_width: 2.0,
            background: Color::rgb(50, 50, 50),
            outline: Color::BLACK,
            lighting: LightingParams::default(),
        }
    }
}
