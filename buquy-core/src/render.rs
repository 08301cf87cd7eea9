/// Painter's-algorithm renderer producing 2D draw commands
use std::fmt;

use nalgebra::{Matrix4, Point2, Vector2, Vector3};

use crate::geometry::Color;
use crate::letter::Letter;
use crate::projection::Projector;
use crate::scene::SceneState;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Points,
    Wireframe,
    Filled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    /// One intensity per face
    Flat,
    /// Per-vertex intensities interpolated across each triangle
    Gouraud,
    /// Normals interpolated on a sub-triangle grid and lit at every grid vertex
    Phong,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayMode::Points => "points",
            DisplayMode::Wireframe => "wireframe",
            DisplayMode::Filled => "filled",
        })
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShadingMode::Flat => "flat",
            ShadingMode::Gouraud => "gouraud",
            ShadingMode::Phong => "phong",
        })
    }
}

/// Screen-space primitive for a host drawing surface
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Point {
        at: Point2<f32>,
        color: Color,
        size: f32,
    },
    Line {
        from: Point2<f32>,
        to: Point2<f32>,
        color: Color,
        width: f32,
    },
    /// Closed polygon with an optional fill and an optional `(colour, width)` outline
    Polygon {
        points: Vec<Point2<f32>>,
        fill: Option<Color>,
        outline: Option<(Color, f32)>,
    },
    /// Triangle whose colour is interpolated between its vertices
    ShadedTriangle {
        points: [Point2<f32>; 3],
        colors: [Color; 3],
    },
    Disc {
        center: Point2<f32>,
        radius: f32,
        color: Color,
    },
    Label {
        at: Point2<f32>,
        text: String,
        color: Color,
    },
}

/// Everything the painter needs to draw one face
#[derive(Debug, Clone)]
pub struct FaceRecord {
    /// Average camera-space z of the face's vertices
    pub depth: f32,
    pub color: Color,
    pub flat_intensity: f32,
    /// Screen position per vertex; `None` where the vertex is behind the camera
    pub screen: Vec<Option<Point2<f32>>>,
    pub intensities: Vec<f32>,
    pub world: Vec<Vector3<f32>>,
    pub camera: Vec<Vector3<f32>>,
    /// Object-space vertex normals
    pub normals: Vec<Vector3<f32>>,
    model: Matrix4<f32>,
}

impl FaceRecord {
    fn visible(&self) -> Vec<(usize, Point2<f32>)> {
        self.screen
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub drawn: usize,
    pub skipped: usize,
}

/// Per-frame renderer; holds only scratch buffers between frames
#[derive(Debug, Default)]
pub struct Renderer {
    records: Vec<FaceRecord>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Face records of the last frame, farthest first
    pub fn face_records(&self) -> &[FaceRecord] {
        &self.records
    }

    /// Render `scene`, passing each draw command to `emit` in painting order
    pub fn render<F>(&mut self, scene: &SceneState, mut emit: F) -> FrameStats
    where
        F: FnMut(DrawCommand),
    {
        let projector = scene.projector();
        let view = scene.camera.view_matrix();

        self.records.clear();
        for letter in &scene.letters {
            prepare_letter(scene, letter, &view, &projector, &mut self.records);
        }
        self.records.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        emit(DrawCommand::Clear(scene.config.background));
        if scene.show_axes {
            draw_axes(scene, &view, &projector, &mut emit);
        }

        let mut stats = FrameStats {
            faces: self.records.len(),
            ..FrameStats::default()
        };
        for record in &self.records {
            if draw_face(scene, record, &projector, &mut emit) {
                stats.drawn += 1;
            } else {
                stats.skipped += 1;
            }
        }

        if scene.show_light {
            draw_light(scene, &view, &projector, &mut emit);
        }

        log::trace!(
            "frame: {} faces, {} drawn, {} skipped",
            stats.faces,
            stats.drawn,
            stats.skipped
        );
        stats
    }

    pub fn render_to_vec(&mut self, scene: &SceneState) -> Vec<DrawCommand> {
        let mut commands = Vec::new();
        self.render(scene, |command| commands.push(command));
        commands
    }
}

fn prepare_letter(
    scene: &SceneState,
    letter: &Letter,
    view: &Matrix4<f32>,
    projector: &Projector,
    out: &mut Vec<FaceRecord>,
) {
    let mesh = letter.mesh();
    let model = letter.translation_matrix() * scene.object_transform * scene.mirror_matrix();
    let eye = scene.camera.position;
    let lighting = &scene.config.lighting;

    let world: Vec<Vector3<f32>> = mesh.vertices().iter().map(|v| Transform::apply(&model, v)).collect();
    let camera: Vec<Vector3<f32>> = world.iter().map(|v| Transform::apply(view, v)).collect();
    let intensities: Vec<f32> = world
        .iter()
        .zip(mesh.vertex_normals())
        .map(|(p, n)| lighting.phong(&scene.light, n, &model, p, &eye))
        .collect();

    for face in mesh.faces() {
        if face.is_empty() {
            continue;
        }
        let depth = face.indices.iter().map(|&i| camera[i].z).sum::<f32>() / face.len() as f32;
        let center = Transform::apply(&model, &face.center);

        out.push(FaceRecord {
            depth,
            color: face.color,
            flat_intensity: lighting.flat(&scene.light, &face.normal, &model, &center),
            screen: face.indices.iter().map(|&i| projector.project(&camera[i])).collect(),
            intensities: face.indices.iter().map(|&i| intensities[i]).collect(),
            world: face.indices.iter().map(|&i| world[i]).collect(),
            camera: face.indices.iter().map(|&i| camera[i]).collect(),
            normals: face.indices.iter().map(|&i| mesh.vertex_normals()[i]).collect(),
            model,
        });
    }
}

/// Draw one face record; returns false when it had too few visible vertices
fn draw_face<F>(scene: &SceneState, record: &FaceRecord, projector: &Projector, emit: &mut F) -> bool
where
    F: FnMut(DrawCommand),
{
    let visible = record.visible();
    if visible.len() < 3 {
        return false;
    }
    let config = &scene.config;
    let points: Vec<Point2<f32>> = visible.iter().map(|&(_, p)| p).collect();

    match scene.display_mode {
        DisplayMode::Points => {
            for &at in &points {
                emit(DrawCommand::Point {
                    at,
                    color: record.color,
                    size: config.point_size,
                });
            }
        }
        DisplayMode::Wireframe => emit(DrawCommand::Polygon {
            points,
            fill: None,
            outline: Some((record.color, config.wireframe_width)),
        }),
        DisplayMode::Filled => match scene.shading_mode {
            ShadingMode::Flat => emit(DrawCommand::Polygon {
                points,
                fill: Some(record.color.shade(record.flat_intensity)),
                outline: Some((config.outline, 1.0)),
            }),
            ShadingMode::Gouraud => {
                for (a, b, c) in fan(&visible) {
                    emit(DrawCommand::ShadedTriangle {
                        points: [a.1, b.1, c.1],
                        colors: [a.0, b.0, c.0].map(|i| record.color.shade(record.intensities[i])),
                    });
                }
                emit(outline(points, config.outline));
            }
            ShadingMode::Phong => {
                for (a, b, c) in fan(&visible) {
                    phong_triangle(scene, record, projector, [a.0, b.0, c.0], emit);
                }
                emit(outline(points, config.outline));
            }
        },
    }
    true
}

fn outline(points: Vec<Point2<f32>>, color: Color) -> DrawCommand {
    DrawCommand::Polygon {
        points,
        fill: None,
        outline: Some((color, 1.0)),
    }
}

type Corner = (usize, Point2<f32>);

/// Fan triangulation anchored at the first visible vertex
fn fan(visible: &[Corner]) -> impl Iterator<Item = (Corner, Corner, Corner)> + '_ {
    (1..visible.len().saturating_sub(1)).map(move |k| (visible[0], visible[k], visible[k + 1]))
}

/// Lit, projected point on a barycentric grid over a face triangle
#[derive(Clone, Copy)]
struct Sample {
    screen: Option<Point2<f32>>,
    color: Color,
}

fn phong_triangle<F>(
    scene: &SceneState,
    record: &FaceRecord,
    projector: &Projector,
    corners: [usize; 3],
    emit: &mut F,
) where
    F: FnMut(DrawCommand),
{
    let n = scene.config.phong_subdivisions.max(1) as usize;
    let lerp = |values: &[Vector3<f32>], w: [f32; 3]| {
        values[corners[0]] * w[0] + values[corners[1]] * w[1] + values[corners[2]] * w[2]
    };

    let rows: Vec<Vec<Sample>> = (0..=n)
        .map(|i| {
            (0..=n - i)
                .map(|j| {
                    let wb = i as f32 / n as f32;
                    let wc = j as f32 / n as f32;
                    let w = [1.0 - wb - wc, wb, wc];
                    let normal = lerp(&record.normals, w);
                    let intensity = scene.config.lighting.phong(
                        &scene.light,
                        &normal,
                        &record.model,
                        &lerp(&record.world, w),
                        &scene.camera.position,
                    );
                    Sample {
                        screen: projector.project(&lerp(&record.camera, w)),
                        color: record.color.shade(intensity),
                    }
                })
                .collect()
        })
        .collect();

    let mut emit_triangle = |a: Sample, b: Sample, c: Sample| {
        if let (Some(pa), Some(pb), Some(pc)) = (a.screen, b.screen, c.screen) {
            emit(DrawCommand::ShadedTriangle {
                points: [pa, pb, pc],
                colors: [a.color, b.color, c.color],
            });
        }
    };

    for i in 0..n {
        for j in 0..n - i {
            emit_triangle(rows[i][j], rows[i + 1][j], rows[i][j + 1]);
            if i + j + 1 < n {
                emit_triangle(rows[i + 1][j], rows[i + 1][j + 1], rows[i][j + 1]);
            }
        }
    }
}

fn draw_axes<F>(scene: &SceneState, view: &Matrix4<f32>, projector: &Projector, emit: &mut F)
where
    F: FnMut(DrawCommand),
{
    let to_screen = |p: Vector3<f32>| {
        let world = Transform::apply(&scene.object_transform, &p);
        projector.project(&Transform::apply(view, &world))
    };
    let Some(origin) = to_screen(Vector3::zeros()) else {
        return;
    };
    let length = scene.config.axis_length;
    let axes = [
        (Vector3::x() * length, Color::RED, "X"),
        (Vector3::y() * length, Color::GREEN, "Y"),
        (Vector3::z() * length, Color::BLUE, "Z"),
    ];
    for (end, color, name) in axes {
        if let Some(to) = to_screen(end) {
            emit(DrawCommand::Line {
                from: origin,
                to,
                color,
                width: 2.0,
            });
            emit(DrawCommand::Label {
                at: to + Vector2::new(5.0, 5.0),
                text: name.to_string(),
                color,
            });
        }
    }
}

fn draw_light<F>(scene: &SceneState, view: &Matrix4<f32>, projector: &Projector, emit: &mut F)
where
    F: FnMut(DrawCommand),
{
    if let Some(center) = projector.project(&Transform::apply(view, &scene.light.position())) {
        emit(DrawCommand::Disc {
            center,
            radius: 5.0,
            color: Color::YELLOW,
        });
        emit(DrawCommand::Label {
            at: center + Vector2::new(10.0, 10.0),
            text: "Light".to_string(),
            color: Color::YELLOW,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::SENTINEL_COORD;

    fn scene() -> SceneState {
        SceneState::default()
    }

    fn is_sentinel(p: &Point2<f32>) -> bool {
        p.x == SENTINEL_COORD || p.y == SENTINEL_COORD
    }

    #[test]
    fn test_depth_sort_is_non_increasing() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.object_transform = Transform::rotation_y(35.0) * Transform::rotation_x(20.0);
        renderer.render(&scene, |_| {});

        let records = renderer.face_records();
        assert!(records.len() > 10);
        for pair in records.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut renderer = Renderer::new();
        let scene = scene();
        let first = renderer.render_to_vec(&scene);
        let second = renderer.render_to_vec(&scene);
        assert_eq!(first, second);
    }

    #[test]
    fn test_frame_layout() {
        let mut renderer = Renderer::new();
        let scene = scene();
        let commands = renderer.render_to_vec(&scene);
        assert_eq!(commands.first(), Some(&DrawCommand::Clear(scene.config.background)));
        let labels: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["X", "Y", "Z", "Light"]);
    }

    #[test]
    fn test_gizmos_can_be_hidden() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.show_axes = false;
        scene.show_light = false;
        let commands = renderer.render_to_vec(&scene);
        assert!(!commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Label { .. } | DrawCommand::Line { .. } | DrawCommand::Disc { .. })));
    }

    #[test]
    fn test_all_faces_drawn_in_default_view() {
        let mut renderer = Renderer::new();
        let scene = scene();
        let stats = renderer.render(&scene, |_| {});
        let expected: usize = scene.letters.iter().map(|l| l.mesh().faces().len()).sum();
        assert_eq!(stats.faces, expected);
        assert_eq!(stats.drawn, expected);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_behind_camera_points_are_omitted() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.show_axes = false;
        scene.show_light = false;
        // Put the camera inside the letters so part of every mesh is behind it
        scene.camera.position = Vector3::new(0.0, 0.0, 5.0);
        scene.object_transform = Matrix4::identity();

        for mode in [DisplayMode::Points, DisplayMode::Wireframe, DisplayMode::Filled] {
            scene.display_mode = mode;
            let mut commands = Vec::new();
            let stats = renderer.render(&scene, |c| commands.push(c));
            assert!(stats.skipped > 0);

            let behind = renderer
                .face_records()
                .iter()
                .flat_map(|r| r.camera.iter().zip(&r.screen))
                .filter(|(c, _)| c.z <= 0.0);
            for (_, screen) in behind {
                assert!(screen.is_none());
            }

            for command in &commands {
                match command {
                    DrawCommand::Point { at, .. } => assert!(!is_sentinel(at)),
                    DrawCommand::Polygon { points, .. } => {
                        assert!(points.len() >= 3);
                        assert!(!points.iter().any(is_sentinel));
                    }
                    DrawCommand::ShadedTriangle { points, .. } => assert!(!points.iter().any(is_sentinel)),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_point_at_negative_depth_has_no_screen_position() {
        let scene = scene();
        assert!(scene.projector().project(&Vector3::new(10.0, 10.0, -5.0)).is_none());
    }

    #[test]
    fn test_points_mode_emits_one_dot_per_visible_vertex() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.show_axes = false;
        scene.show_light = false;
        scene.display_mode = DisplayMode::Points;
        let commands = renderer.render_to_vec(&scene);
        let dots = commands.iter().filter(|c| matches!(c, DrawCommand::Point { .. })).count();
        let vertices: usize = renderer.face_records().iter().map(|r| r.screen.len()).sum();
        assert_eq!(dots, vertices);
    }

    #[test]
    fn test_shading_modes() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.show_axes = false;
        scene.show_light = false;

        let triangles = |commands: &[DrawCommand]| {
            commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::ShadedTriangle { .. }))
                .count()
        };

        scene.shading_mode = ShadingMode::Flat;
        let flat = renderer.render_to_vec(&scene);
        assert_eq!(triangles(&flat), 0);
        assert!(flat
            .iter()
            .any(|c| matches!(c, DrawCommand::Polygon { fill: Some(_), .. })));

        let fan_triangles: usize = renderer.face_records().iter().map(|r| r.screen.len() - 2).sum();

        scene.shading_mode = ShadingMode::Gouraud;
        let gouraud = renderer.render_to_vec(&scene);
        assert_eq!(triangles(&gouraud), fan_triangles);

        scene.shading_mode = ShadingMode::Phong;
        let phong = renderer.render_to_vec(&scene);
        let n = scene.config.phong_subdivisions as usize;
        assert_eq!(triangles(&phong), fan_triangles * n * n);
    }

    fn shaded_triangles(commands: &[DrawCommand]) -> Vec<([Point2<f32>; 3], [Color; 3])> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::ShadedTriangle { points, colors } => Some((*points, *colors)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_gouraud_colours_come_from_vertex_intensities() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.show_axes = false;
        scene.show_light = false;
        scene.shading_mode = ShadingMode::Gouraud;
        let emitted = shaded_triangles(&renderer.render_to_vec(&scene));

        let mut expected = Vec::new();
        for record in renderer.face_records() {
            let screen: Vec<Point2<f32>> = record.screen.iter().map(|p| p.unwrap()).collect();
            let colors: Vec<Color> = record.intensities.iter().map(|&i| record.color.shade(i)).collect();
            for k in 1..screen.len() - 1 {
                expected.push(([screen[0], screen[k], screen[k + 1]], [colors[0], colors[k], colors[k + 1]]));
            }
        }
        assert_eq!(emitted, expected);

        // Vertex lighting varies across the letters
        let distinct = emitted.iter().flat_map(|(_, c)| c.iter()).any(|c| *c != emitted[0].1[0]);
        assert!(distinct);
    }

    #[test]
    fn test_phong_lights_interpolated_normals() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.show_axes = false;
        scene.show_light = false;
        scene.shading_mode = ShadingMode::Phong;
        let n = scene.config.phong_subdivisions as usize;
        assert!(n >= 2);
        let emitted = shaded_triangles(&renderer.render_to_vec(&scene));

        let record = &renderer.face_records()[0];
        let lerp = |values: &[Vector3<f32>], w: [f32; 3]| values[0] * w[0] + values[1] * w[1] + values[2] * w[2];
        let sample = |i: usize, j: usize| {
            let wb = i as f32 / n as f32;
            let wc = j as f32 / n as f32;
            let w = [1.0 - wb - wc, wb, wc];
            let intensity = scene.config.lighting.phong(
                &scene.light,
                &lerp(&record.normals, w),
                &record.model,
                &lerp(&record.world, w),
                &scene.camera.position,
            );
            record.color.shade(intensity)
        };

        // Grid corners coincide with the face vertices
        let (first_points, first_colors) = emitted[0];
        assert_eq!(first_colors[0], record.color.shade(record.intensities[0]));
        assert_eq!(first_colors, [sample(0, 0), sample(1, 0), sample(0, 1)]);
        let corner = record.screen[0].unwrap();
        assert!((first_points[0] - corner).norm() < 1e-3);

        // The inverted cell between them is lit at its own interior grid point
        let (_, second_colors) = emitted[1];
        assert_eq!(second_colors, [sample(1, 0), sample(1, 1), sample(0, 1)]);
    }

    #[test]
    fn test_wireframe_has_no_fill() {
        let mut renderer = Renderer::new();
        let mut scene = scene();
        scene.display_mode = DisplayMode::Wireframe;
        let commands = renderer.render_to_vec(&scene);
        for command in commands {
            if let DrawCommand::Polygon { fill, outline, .. } = command {
                assert!(fill.is_none());
                assert_eq!(outline.map(|(_, w)| w), Some(scene.config.wireframe_width));
            }
        }
    }
}
