/// Buquy Terminal - interactive letter renderer
///
/// Controls:
///   - WASD / Arrow Keys / mouse drag: Rotate the letters
///   - E/R: Roll rotation
///   - +/- / mouse wheel: Zoom
///   - 1/2/3: Points, wireframe, filled
///   - F/G/P: Flat, Gouraud, Phong shading
///   - X/Y/Z: Mirror, O: axes, L: light marker, 0: reset view
///   - `:` Type a command (e.g. `letter 0 kind h`)
///   - Q/ESC: Quit
use buquy_core::{
    parse_script, DisplayMode, Letter, LetterKind, LetterParams, SceneCommand, SceneState, ShadingMode,
};
use buquy_terminal::TerminalApp;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;

const LETTER_SPACING: f32 = 120.0;

#[derive(Parser)]
#[command(name = "buquy-terminal")]
#[command(about = "Render extruded letters as shaded ASCII in the terminal")]
struct Cli {
    /// Letters to show, any of X, K, T, H, V
    #[arg(long, default_value = "XK")]
    letters: String,

    /// Fill shading model
    #[arg(long, value_enum, default_value_t = Shading::Phong)]
    shading: Shading,

    /// Display mode
    #[arg(long, value_enum, default_value_t = Display::Filled)]
    display: Display,

    /// Projection scale; terminal cells are coarse, so this is well below the desktop default
    #[arg(long, default_value_t = 0.3)]
    scale: f32,

    /// Command script applied before the first frame
    #[arg(long)]
    script: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shading {
    Flat,
    Gouraud,
    Phong,
}

#[derive(Clone, Copy, ValueEnum)]
enum Display {
    Points,
    Wireframe,
    Filled,
}

impl From<Shading> for ShadingMode {
    fn from(shading: Shading) -> Self {
        match shading {
            Shading::Flat => ShadingMode::Flat,
            Shading::Gouraud => ShadingMode::Gouraud,
            Shading::Phong => ShadingMode::Phong,
        }
    }
}

impl From<Display> for DisplayMode {
    fn from(display: Display) -> Self {
        match display {
            Display::Points => DisplayMode::Points,
            Display::Wireframe => DisplayMode::Wireframe,
            Display::Filled => DisplayMode::Filled,
        }
    }
}

fn invalid_input(message: impl ToString) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

/// Build one letter per character, centred on the origin
fn build_letters(spec: &str) -> io::Result<Vec<Letter>> {
    let kinds = spec
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| LetterKind::from_char(c).ok_or_else(|| invalid_input(format!("unknown letter '{}'", c))))
        .collect::<io::Result<Vec<_>>>()?;

    let centre = (kinds.len() as f32 - 1.0) / 2.0;
    kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| {
            let params = LetterParams::new(kind, 100.0, 60.0, 30.0).with_offset((i as f32 - centre) * LETTER_SPACING);
            Letter::new(params).map_err(invalid_input)
        })
        .collect()
}

fn build_scene(cli: &Cli) -> io::Result<SceneState> {
    let mut scene = SceneState::new(build_letters(&cli.letters)?);
    let mut commands = vec![
        SceneCommand::SetScale(cli.scale),
        SceneCommand::SetShadingMode(cli.shading.into()),
        SceneCommand::SetDisplayMode(cli.display.into()),
    ];
    if let Some(path) = &cli.script {
        let text = std::fs::read_to_string(path)?;
        commands.extend(parse_script(&text).map_err(invalid_input)?);
    }
    for command in commands {
        scene.apply(command).map_err(invalid_input)?;
    }
    Ok(scene)
}

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Buquy Terminal Renderer - Loading...");
    let scene = build_scene(&cli)?;
    log::info!("scene ready with {} letters", scene.letters.len());

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(scene)?;
    app.run()?;

    println!("Thank you for using Buquy Terminal Renderer!");
    Ok(())
}
