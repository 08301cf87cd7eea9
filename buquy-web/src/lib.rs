/// Buquy Web - WASM front end painting draw commands on a 2D canvas
///
/// The page owns the event handlers and forwards them as `drag`, `zoom`,
/// `resize` and `command` calls; `render` repaints the whole frame.
use buquy_core::{parse_command, Color, DrawCommand, Renderer, SceneCommand, SceneState};
use nalgebra::Point2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[wasm_bindgen]
pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    scene: SceneState,
    renderer: Renderer,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Attach to the canvas with the given element id
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("element is not a canvas"))?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let mut renderer = WebRenderer {
            canvas,
            context,
            scene: SceneState::default(),
            renderer: Renderer::new(),
        };
        renderer.resize(renderer.canvas.width(), renderer.canvas.height())?;
        Ok(renderer)
    }

    /// Render a frame
    pub fn render(&mut self) -> Result<(), JsValue> {
        for command in self.renderer.render_to_vec(&self.scene) {
            self.paint(&command)?;
        }
        Ok(())
    }

    /// Pointer drag in canvas pixels
    pub fn drag(&mut self, dx: f32, dy: f32) -> Result<(), JsValue> {
        self.apply(SceneCommand::Drag { dx, dy })
    }

    /// Wheel delta as reported by the browser, positive to zoom in
    pub fn zoom(&mut self, delta: f32) -> Result<(), JsValue> {
        self.apply(SceneCommand::Zoom { delta })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.apply(SceneCommand::Resize { width, height })
    }

    /// Run one line of the text command language, e.g. `shading gouraud`
    pub fn command(&mut self, line: &str) -> Result<(), JsValue> {
        let command = parse_command(line).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.apply(command)
    }
}

impl WebRenderer {
    fn apply(&mut self, command: SceneCommand) -> Result<(), JsValue> {
        self.scene.apply(command).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn paint(&self, command: &DrawCommand) -> Result<(), JsValue> {
        let ctx = &self.context;
        match command {
            DrawCommand::Clear(color) => {
                ctx.set_fill_style_str(&css(*color));
                ctx.fill_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
            }
            DrawCommand::Point { at, color, size } => {
                let half = *size as f64 / 2.0;
                ctx.set_fill_style_str(&css(*color));
                ctx.fill_rect(at.x as f64 - half, at.y as f64 - half, *size as f64, *size as f64);
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.set_stroke_style_str(&css(*color));
                ctx.set_line_width(*width as f64);
                ctx.stroke();
            }
            DrawCommand::Polygon {
                points,
                fill,
                outline,
            } => {
                self.trace(points);
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(&css(*fill));
                    ctx.fill();
                }
                if let Some((color, width)) = outline {
                    ctx.set_stroke_style_str(&css(*color));
                    ctx.set_line_width(*width as f64);
                    ctx.stroke();
                }
            }
            DrawCommand::ShadedTriangle { points, colors } => {
                let (from, to) = gradient_axis(points);
                let gradient = ctx.create_linear_gradient(from.x as f64, from.y as f64, to.x as f64, to.y as f64);
                gradient.add_color_stop(0.0, &css(colors[0]))?;
                gradient.add_color_stop(1.0, &css(average(colors[1], colors[2])))?;
                self.trace(points);
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.fill();
            }
            DrawCommand::Disc {
                center,
                radius,
                color,
            } => {
                ctx.begin_path();
                ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    *radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                )?;
                ctx.set_fill_style_str(&css(*color));
                ctx.fill();
            }
            DrawCommand::Label { at, text, color } => {
                ctx.set_fill_style_str(&css(*color));
                ctx.fill_text(text, at.x as f64, at.y as f64)?;
            }
        }
        Ok(())
    }

    /// Start a closed path through `points`
    fn trace(&self, points: &[Point2<f32>]) {
        let ctx = &self.context;
        ctx.begin_path();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                ctx.move_to(p.x as f64, p.y as f64);
            } else {
                ctx.line_to(p.x as f64, p.y as f64);
            }
        }
        ctx.close_path();
    }
}

fn css(color: Color) -> String {
    format!("rgb({},{},{})", color.r, color.g, color.b)
}

fn average(a: Color, b: Color) -> Color {
    let mid = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
    Color::rgb(mid(a.r, b.r), mid(a.g, b.g), mid(a.b, b.b))
}

/// Gradient from the first corner to the midpoint of the opposite edge
fn gradient_axis(points: &[Point2<f32>; 3]) -> (Point2<f32>, Point2<f32>) {
    (points[0], nalgebra::center(&points[1], &points[2]))
}
