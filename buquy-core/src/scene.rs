/// Mutable scene state and the commands that edit it
use nalgebra::{Matrix4, Vector3};

use crate::config::RenderConfig;
use crate::error::SceneError;
use crate::letter::{Letter, LetterKind, LetterParam, LetterParams};
use crate::lighting::Light;
use crate::projection::{Camera, Projector, Viewport};
use crate::render::{DisplayMode, ShadingMode};
use crate::transform::{Axis, Transform, VectorExt};

const DEFAULT_BASE_SCALE: f32 = 1.4;
const DEFAULT_OBJECT_ROLL: f32 = 180.0;

/// One user-level edit of the scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    Resize { width: u32, height: u32 },
    /// Wheel delta; one notch moves the camera one zoom step
    Zoom { delta: f32 },
    MoveCamera { dx: f32, dy: f32, dz: f32 },
    RotateCamera { axis: Axis, degrees: f32 },
    /// Pointer drag in pixels, turned into an object rotation
    Drag { dx: f32, dy: f32 },
    RotateObject { axis: Axis, degrees: f32 },
    TranslateObject { dx: f32, dy: f32, dz: f32 },
    SetScale(f32),
    SetLightDirection(Vector3<f32>),
    SetLightPosition(Vector3<f32>),
    SetDisplayMode(DisplayMode),
    SetShadingMode(ShadingMode),
    ToggleMirror(Axis),
    SetLetterParam { index: usize, param: LetterParam },
    RebuildLetter { index: usize, params: LetterParams },
    ToggleAxes,
    ToggleLightMarker,
    ResetView,
}

/// Everything a frame is rendered from
#[derive(Debug, Clone)]
pub struct SceneState {
    pub letters: Vec<Letter>,
    pub camera: Camera,
    /// Accumulated object rotation/translation shared by all letters
    pub object_transform: Matrix4<f32>,
    pub base_scale: f32,
    /// When set, a resize recomputes `base_scale` from the viewport
    pub auto_scale: bool,
    pub viewport: Viewport,
    pub mirror: [bool; 3],
    pub light: Light,
    pub display_mode: DisplayMode,
    pub shading_mode: ShadingMode,
    pub show_axes: bool,
    pub show_light: bool,
    pub config: RenderConfig,
}

impl SceneState {
    pub fn new(letters: Vec<Letter>) -> Self {
        Self::with_config(letters, RenderConfig::default())
    }

    pub fn with_config(letters: Vec<Letter>, config: RenderConfig) -> Self {
        let mut scene = Self {
            letters,
            camera: Camera::default(),
            object_transform: Matrix4::identity(),
            base_scale: DEFAULT_BASE_SCALE,
            auto_scale: true,
            viewport: Viewport::default(),
            mirror: [false; 3],
            light: Light::from_direction(default_light_direction(), config.light_distance),
            display_mode: DisplayMode::Filled,
            shading_mode: ShadingMode::Phong,
            show_axes: true,
            show_light: true,
            config,
        };
        scene.reset_view();
        scene
    }

    /// The X and K pair shown at start-up
    pub fn default_letters() -> Vec<Letter> {
        [(LetterKind::X, -60.0), (LetterKind::K, 60.0)]
            .into_iter()
            .filter_map(|(kind, offset)| {
                Letter::new(LetterParams::new(kind, 100.0, 60.0, 30.0).with_offset(offset)).ok()
            })
            .collect()
    }

    /// Restore camera, object transform, scale, mirrors, light and modes.
    ///
    /// Letter parameters are left untouched.
    pub fn reset_view(&mut self) {
        self.camera = Camera::default();
        self.object_transform = Transform::rotation_z(DEFAULT_OBJECT_ROLL);
        self.base_scale = DEFAULT_BASE_SCALE;
        self.auto_scale = true;
        self.mirror = [false; 3];
        self.light = Light::from_direction(default_light_direction(), self.config.light_distance);
        self.display_mode = DisplayMode::Filled;
        self.shading_mode = ShadingMode::Phong;
    }

    pub fn mirror_matrix(&self) -> Matrix4<f32> {
        Transform::mirror(self.mirror)
    }

    pub fn projector(&self) -> Projector {
        Projector::new(self.viewport, self.config.focal_length, self.base_scale)
    }

    pub fn letter(&self, index: usize) -> Result<&Letter, SceneError> {
        let count = self.letters.len();
        self.letters
            .get(index)
            .ok_or(SceneError::LetterIndexOutOfRange { index, count })
    }

    fn letter_mut(&mut self, index: usize) -> Result<&mut Letter, SceneError> {
        let count = self.letters.len();
        self.letters
            .get_mut(index)
            .ok_or(SceneError::LetterIndexOutOfRange { index, count })
    }

    /// Apply one command. A rejected command leaves the scene unchanged.
    pub fn apply(&mut self, command: SceneCommand) -> Result<(), SceneError> {
        log::debug!("apply {:?}", command);
        match command {
            SceneCommand::Resize { width, height } => {
                if width == 0 || height == 0 {
                    return Err(SceneError::InvalidViewport { width, height });
                }
                self.viewport = Viewport::new(width, height);
                if self.auto_scale {
                    self.base_scale = width.min(height) as f32 / self.config.reference_size;
                }
            }
            SceneCommand::Zoom { delta } => {
                finite("zoom", &[delta])?;
                self.camera.position.z += delta / self.config.wheel_notch * self.config.zoom_step;
                self.clamp_camera();
            }
            SceneCommand::MoveCamera { dx, dy, dz } => {
                finite("move", &[dx, dy, dz])?;
                self.camera.position += Vector3::new(dx, dy, dz);
                self.clamp_camera();
            }
            SceneCommand::RotateCamera { axis, degrees } => {
                finite("camera", &[degrees])?;
                self.camera.rotation.rotate_axis(axis, degrees);
            }
            SceneCommand::Drag { dx, dy } => {
                finite("drag", &[dx, dy])?;
                let speed = self.config.drag_speed;
                self.object_transform = Transform::rotation_y(-dx * speed)
                    * Transform::rotation_x(dy * speed)
                    * self.object_transform;
            }
            SceneCommand::RotateObject { axis, degrees } => {
                finite("rotate", &[degrees])?;
                self.object_transform = Transform::rotation(axis, degrees) * self.object_transform;
            }
            SceneCommand::TranslateObject { dx, dy, dz } => {
                finite("translate", &[dx, dy, dz])?;
                self.object_transform = Transform::translation(dx, dy, dz) * self.object_transform;
            }
            SceneCommand::SetScale(scale) => {
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(SceneError::InvalidScale(scale));
                }
                self.base_scale = scale;
                self.auto_scale = false;
            }
            SceneCommand::SetLightDirection(direction) => {
                finite("light", direction.as_slice())?;
                if direction.normalize_or_zero() == Vector3::zeros() {
                    return Err(SceneError::ZeroLightDirection);
                }
                self.light = Light::from_direction(direction, self.config.light_distance);
            }
            SceneCommand::SetLightPosition(position) => {
                finite("lightpos", position.as_slice())?;
                self.light = Light::at(position);
            }
            SceneCommand::SetDisplayMode(mode) => self.display_mode = mode,
            SceneCommand::SetShadingMode(mode) => self.shading_mode = mode,
            SceneCommand::ToggleMirror(axis) => {
                let flag = &mut self.mirror[axis.index()];
                *flag = !*flag;
            }
            SceneCommand::SetLetterParam { index, param } => {
                self.letter_mut(index)?.set_param(param)?;
            }
            SceneCommand::RebuildLetter { index, params } => {
                self.letter_mut(index)?.set_params(params)?;
            }
            SceneCommand::ToggleAxes => self.show_axes = !self.show_axes,
            SceneCommand::ToggleLightMarker => self.show_light = !self.show_light,
            SceneCommand::ResetView => self.reset_view(),
        }
        Ok(())
    }

    fn clamp_camera(&mut self) {
        self.camera.position.z = self.camera.position.z.min(self.config.max_camera_z);
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(Self::default_letters())
    }
}

fn finite(command: &'static str, operands: &[f32]) -> Result<(), SceneError> {
    if operands.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::NonFinite { command })
    }
}

fn default_light_direction() -> Vector3<f32> {
    Vector3::new(0.5, 0.5, -1.0).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_matrix_eq(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        assert!((a - b).norm() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn test_default_scene() {
        let scene = SceneState::default();
        assert_eq!(scene.letters.len(), 2);
        assert_eq!(scene.letters[0].params().kind, LetterKind::X);
        assert_eq!(scene.letters[1].params().kind, LetterKind::K);
        assert_eq!(scene.camera.position, Vector3::new(0.0, 0.0, -400.0));
        assert_eq!(scene.base_scale, 1.4);
        assert_eq!(scene.display_mode, DisplayMode::Filled);
        assert_eq!(scene.shading_mode, ShadingMode::Phong);
        assert_matrix_eq(&scene.object_transform, &Transform::rotation_z(180.0));
    }

    #[test]
    fn test_resize_auto_scales() {
        let mut scene = SceneState::default();
        scene.apply(SceneCommand::Resize { width: 1200, height: 900 }).unwrap();
        assert_eq!(scene.viewport, Viewport::new(1200, 900));
        assert!((scene.base_scale - 1.5).abs() < 1e-6);

        scene.apply(SceneCommand::SetScale(2.0)).unwrap();
        scene.apply(SceneCommand::Resize { width: 300, height: 300 }).unwrap();
        assert_eq!(scene.base_scale, 2.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut scene = SceneState::default();
        scene.apply(SceneCommand::Zoom { delta: 120.0 }).unwrap();
        assert!((scene.camera.position.z - -390.0).abs() < 1e-4);

        // A huge cumulative zoom-in stops at the limit
        for _ in 0..100 {
            scene.apply(SceneCommand::Zoom { delta: 1200.0 }).unwrap();
        }
        assert_eq!(scene.camera.position.z, scene.config.max_camera_z);

        scene.apply(SceneCommand::Zoom { delta: -240.0 }).unwrap();
        assert!((scene.camera.position.z - -70.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_camera_is_clamped() {
        let mut scene = SceneState::default();
        scene.apply(SceneCommand::MoveCamera { dx: 5.0, dy: -5.0, dz: 1000.0 }).unwrap();
        assert_eq!(scene.camera.position, Vector3::new(5.0, -5.0, -50.0));
    }

    #[test]
    fn test_drag_rotates_object() {
        let mut scene = SceneState::default();
        scene.object_transform = Matrix4::identity();
        scene.apply(SceneCommand::Drag { dx: 20.0, dy: 0.0 }).unwrap();
        assert_matrix_eq(&scene.object_transform, &Transform::rotation_y(-10.0));
    }

    #[test]
    fn test_rotations_pre_multiply() {
        let mut scene = SceneState::default();
        scene.object_transform = Matrix4::identity();
        scene.apply(SceneCommand::RotateObject { axis: Axis::X, degrees: 30.0 }).unwrap();
        scene.apply(SceneCommand::RotateObject { axis: Axis::Y, degrees: 45.0 }).unwrap();
        let expected = Transform::rotation_y(45.0) * Transform::rotation_x(30.0);
        assert_matrix_eq(&scene.object_transform, &expected);
    }

    #[test]
    fn test_mirror_toggles() {
        let mut scene = SceneState::default();
        scene.apply(SceneCommand::ToggleMirror(Axis::Y)).unwrap();
        assert_eq!(scene.mirror, [false, true, false]);
        scene.apply(SceneCommand::ToggleMirror(Axis::Y)).unwrap();
        assert_eq!(scene.mirror, [false; 3]);
    }

    #[test]
    fn test_reset_view() {
        let mut scene = SceneState::default();
        scene.apply(SceneCommand::Zoom { delta: 600.0 }).unwrap();
        scene.apply(SceneCommand::RotateCamera { axis: Axis::X, degrees: 15.0 }).unwrap();
        scene.apply(SceneCommand::Drag { dx: 40.0, dy: 12.0 }).unwrap();
        scene.apply(SceneCommand::SetScale(3.0)).unwrap();
        scene.apply(SceneCommand::ToggleMirror(Axis::X)).unwrap();
        scene.apply(SceneCommand::SetLightPosition(Vector3::new(1.0, 2.0, 3.0))).unwrap();
        scene.apply(SceneCommand::SetShadingMode(ShadingMode::Flat)).unwrap();
        scene.apply(SceneCommand::SetDisplayMode(DisplayMode::Points)).unwrap();
        scene
            .apply(SceneCommand::SetLetterParam { index: 0, param: LetterParam::Height(80.0) })
            .unwrap();

        scene.apply(SceneCommand::ResetView).unwrap();
        let fresh = SceneState::default();
        assert_eq!(scene.camera, fresh.camera);
        assert_matrix_eq(&scene.object_transform, &fresh.object_transform);
        assert_eq!(scene.base_scale, 1.4);
        assert!(scene.auto_scale);
        assert_eq!(scene.mirror, [false; 3]);
        assert_eq!(scene.light, fresh.light);
        assert_eq!(scene.display_mode, DisplayMode::Filled);
        assert_eq!(scene.shading_mode, ShadingMode::Phong);
        // Letters keep their edits
        assert_eq!(scene.letters[0].params().height, 80.0);
    }

    #[test]
    fn test_invalid_commands_leave_scene_unchanged() {
        let mut scene = SceneState::default();
        let before_scale = scene.base_scale;
        let before_light = scene.light;
        let before_vertices = scene.letters[1].mesh().vertices().to_vec();

        assert_eq!(scene.apply(SceneCommand::SetScale(0.0)), Err(SceneError::InvalidScale(0.0)));
        assert!(scene.apply(SceneCommand::SetScale(f32::NAN)).is_err());
        assert_eq!(
            scene.apply(SceneCommand::SetLightDirection(Vector3::zeros())),
            Err(SceneError::ZeroLightDirection)
        );
        assert_eq!(
            scene.apply(SceneCommand::Resize { width: 0, height: 10 }),
            Err(SceneError::InvalidViewport { width: 0, height: 10 })
        );
        assert_eq!(
            scene.apply(SceneCommand::SetLetterParam { index: 5, param: LetterParam::Width(10.0) }),
            Err(SceneError::LetterIndexOutOfRange { index: 5, count: 2 })
        );
        assert!(scene
            .apply(SceneCommand::SetLetterParam { index: 1, param: LetterParam::Depth(-1.0) })
            .is_err());

        assert_eq!(scene.base_scale, before_scale);
        assert!(scene.auto_scale);
        assert_eq!(scene.light, before_light);
        assert_eq!(scene.viewport, Viewport::default());
        assert_eq!(scene.letters[1].params().depth, 30.0);
        assert_eq!(scene.letters[1].mesh().vertices(), before_vertices.as_slice());
    }

    #[test]
    fn test_non_finite_operands_are_rejected() {
        let mut scene = SceneState::default();
        let fresh = scene.clone();

        let commands = [
            SceneCommand::MoveCamera { dx: f32::NAN, dy: 0.0, dz: 0.0 },
            SceneCommand::TranslateObject { dx: f32::INFINITY, dy: 0.0, dz: 0.0 },
            SceneCommand::RotateObject { axis: Axis::X, degrees: f32::NAN },
            SceneCommand::RotateCamera { axis: Axis::Y, degrees: f32::NEG_INFINITY },
            SceneCommand::Drag { dx: 1.0, dy: f32::NAN },
            SceneCommand::Zoom { delta: f32::INFINITY },
            SceneCommand::SetLightDirection(Vector3::new(f32::NAN, 1.0, 1.0)),
            SceneCommand::SetLightPosition(Vector3::new(0.0, f32::INFINITY, 0.0)),
        ];
        for command in commands {
            let label = format!("{:?}", command);
            assert!(
                matches!(scene.apply(command), Err(SceneError::NonFinite { .. })),
                "{label}"
            );
        }

        assert_eq!(scene.camera, fresh.camera);
        assert_matrix_eq(&scene.object_transform, &fresh.object_transform);
        assert_eq!(scene.light, fresh.light);
    }

    #[test]
    fn test_parsed_nan_is_rejected() {
        let mut scene = SceneState::default();
        let before = scene.camera;
        let command = crate::command::parse_command("move nan 0 0").unwrap();
        assert_eq!(
            scene.apply(command),
            Err(SceneError::NonFinite { command: "move" })
        );
        assert_eq!(scene.camera, before);
        assert!(scene.camera.position.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rebuild_letter() {
        let mut scene = SceneState::default();
        let params = LetterParams::new(LetterKind::T, 120.0, 80.0, 20.0).with_offset(60.0);
        scene.apply(SceneCommand::RebuildLetter { index: 1, params }).unwrap();
        assert_eq!(scene.letter(1).unwrap().params(), &params);
        assert_eq!(scene.letter(1).unwrap().mesh().faces().len(), 18);
    }

    #[test]
    fn test_light_direction() {
        let mut scene = SceneState::default();
        scene
            .apply(SceneCommand::SetLightDirection(Vector3::new(0.0, 0.0, -2.0)))
            .unwrap();
        assert!((scene.light.position() - Vector3::new(0.0, 0.0, -150.0)).norm() < 1e-4);
    }

    #[test]
    fn test_toggles() {
        let mut scene = SceneState::default();
        scene.apply(SceneCommand::ToggleAxes).unwrap();
        scene.apply(SceneCommand::ToggleLightMarker).unwrap();
        assert!(!scene.show_axes);
        assert!(!scene.show_light);
    }
}
