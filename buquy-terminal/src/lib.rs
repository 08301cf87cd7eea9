/// Terminal front end: drives a scene from the keyboard and mouse and
/// rasterizes each frame to coloured ASCII
use buquy_core::{parse_command, Axis, DisplayMode, Renderer, SceneCommand, SceneState, ShadingMode};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::{AsciiSurface, PIXELS_PER_ROW};

const DRAG_STEP: f32 = 10.0;
const ROLL_STEP: f32 = 5.0;
const WHEEL_NOTCH: f32 = 120.0;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: SceneState,
    renderer: Renderer,
    surface: AsciiSurface,
    running: bool,
    dirty: bool,
    /// Text typed after `:`, while the command prompt is open
    prompt: Option<String>,
    status: String,
    last_mouse: Option<(u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: SceneState) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let mut app = Self {
            scene,
            renderer: Renderer::new(),
            surface: AsciiSurface::new(width as usize, height as usize),
            running: true,
            dirty: true,
            prompt: None,
            status: String::new(),
            last_mouse: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(width, height);
        Ok(app)
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain pending input before drawing
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            if self.dirty {
                self.render()?;
                self.dirty = false;
                self.frame_count += 1;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                // Sleep by waiting for the next event instead of a fixed nap
                event::poll(target_frame_time - elapsed)?;
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if self.prompt.is_some() {
                    self.handle_prompt_key(key);
                } else {
                    self.handle_key(key);
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, .. }: KeyEvent) {
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
                return;
            }
            KeyCode::Char(':') => {
                self.prompt = Some(String::new());
                self.dirty = true;
                return;
            }
            KeyCode::Char('w') | KeyCode::Up => SceneCommand::Drag { dx: 0.0, dy: -DRAG_STEP },
            KeyCode::Char('s') | KeyCode::Down => SceneCommand::Drag { dx: 0.0, dy: DRAG_STEP },
            KeyCode::Char('a') | KeyCode::Left => SceneCommand::Drag { dx: DRAG_STEP, dy: 0.0 },
            KeyCode::Char('d') | KeyCode::Right => SceneCommand::Drag { dx: -DRAG_STEP, dy: 0.0 },
            KeyCode::Char('e') => SceneCommand::RotateObject {
                axis: Axis::Z,
                degrees: ROLL_STEP,
            },
            KeyCode::Char('r') => SceneCommand::RotateObject {
                axis: Axis::Z,
                degrees: -ROLL_STEP,
            },
            KeyCode::Char('+') | KeyCode::Char('=') => SceneCommand::Zoom { delta: WHEEL_NOTCH },
            KeyCode::Char('-') => SceneCommand::Zoom { delta: -WHEEL_NOTCH },
            KeyCode::Char('1') => SceneCommand::SetDisplayMode(DisplayMode::Points),
            KeyCode::Char('2') => SceneCommand::SetDisplayMode(DisplayMode::Wireframe),
            KeyCode::Char('3') => SceneCommand::SetDisplayMode(DisplayMode::Filled),
            KeyCode::Char('f') => SceneCommand::SetShadingMode(ShadingMode::Flat),
            KeyCode::Char('g') => SceneCommand::SetShadingMode(ShadingMode::Gouraud),
            KeyCode::Char('p') => SceneCommand::SetShadingMode(ShadingMode::Phong),
            KeyCode::Char('x') => SceneCommand::ToggleMirror(Axis::X),
            KeyCode::Char('y') => SceneCommand::ToggleMirror(Axis::Y),
            KeyCode::Char('z') => SceneCommand::ToggleMirror(Axis::Z),
            KeyCode::Char('o') => SceneCommand::ToggleAxes,
            KeyCode::Char('l') => SceneCommand::ToggleLightMarker,
            KeyCode::Char('0') => SceneCommand::ResetView,
            _ => return,
        };
        self.dispatch(command);
    }

    fn handle_prompt_key(&mut self, KeyEvent { code, .. }: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.pop();
            }
            KeyCode::Char(c) => prompt.push(c),
            KeyCode::Enter => {
                let line = prompt.clone();
                self.prompt = None;
                self.run_line(&line);
            }
            _ => return,
        }
        self.dirty = true;
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.last_mouse = Some((mouse.column, mouse.row)),
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((column, row)) = self.last_mouse {
                    let dx = mouse.column as f32 - column as f32;
                    let dy = (mouse.row as f32 - row as f32) * PIXELS_PER_ROW as f32;
                    self.dispatch(SceneCommand::Drag { dx, dy });
                }
                self.last_mouse = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(_) => self.last_mouse = None,
            MouseEventKind::ScrollUp => self.dispatch(SceneCommand::Zoom { delta: WHEEL_NOTCH }),
            MouseEventKind::ScrollDown => self.dispatch(SceneCommand::Zoom { delta: -WHEEL_NOTCH }),
            _ => {}
        }
    }

    /// Parse and apply one line of the command language, reporting the outcome
    pub fn run_line(&mut self, line: &str) {
        match parse_command(line) {
            Ok(command) => {
                self.dispatch(command);
                if self.status.is_empty() {
                    self.status = format!("ok: {}", line.trim());
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                self.status = e.to_string();
            }
        }
    }

    fn dispatch(&mut self, command: SceneCommand) {
        self.status.clear();
        if let Err(e) = self.scene.apply(command) {
            log::warn!("rejected command: {}", e);
            self.status = e.to_string();
        }
        self.dirty = true;
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.surface.resize(width as usize, height as usize);
        let (width, height) = self.surface.pixel_size();
        if let Err(e) = self.scene.apply(SceneCommand::Resize { width, height }) {
            log::warn!("{}", e);
        }
        self.dirty = true;
    }

    fn render(&mut self) -> io::Result<()> {
        let surface = &mut self.surface;
        let stats = self.renderer.render(&self.scene, |command| surface.apply(&command));

        // Output to terminal
        let mut stdout = stdout();
        self.surface.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Buquy | FPS: {:.1} | {} / {} | faces {}/{} | WASD=Rotate E/R=Roll +/-=Zoom :=Command Q=Quit",
                self.fps,
                self.scene.display_mode,
                self.scene.shading_mode,
                stats.drawn,
                stats.faces
            )),
            ResetColor
        )?;

        let (_, rows) = self.surface.size();
        let bottom = rows.saturating_sub(1) as u16;
        queue!(stdout, cursor::MoveTo(0, bottom), terminal::Clear(ClearType::CurrentLine))?;
        match &self.prompt {
            Some(prompt) => queue!(stdout, SetForegroundColor(Color::White), Print(format!(":{}", prompt)))?,
            None => queue!(stdout, SetForegroundColor(Color::Grey), Print(&self.status))?,
        }
        queue!(stdout, ResetColor)?;

        stdout.flush()?;
        Ok(())
    }
}
