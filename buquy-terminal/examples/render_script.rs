/// Example: Render a single frame as plain ASCII without entering the TUI
///
/// Usage: cargo run --example render_script -- [path/to/script.txt]
///
/// The script holds one command per line, for example:
///   shading gouraud
///   rotate y 30
///   letter 1 kind h
use buquy_core::{parse_script, Renderer, SceneCommand, SceneState};
use buquy_terminal::AsciiSurface;
use std::env;
use std::fs;
use std::io;

const COLUMNS: usize = 100;
const ROWS: usize = 40;

fn main() -> io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mut scene = SceneState::default();
    let mut surface = AsciiSurface::new(COLUMNS, ROWS);
    let (width, height) = surface.pixel_size();

    let mut commands = vec![
        SceneCommand::Resize { width, height },
        SceneCommand::SetScale(0.35),
    ];
    if let Some(path) = args.get(1) {
        let text = fs::read_to_string(path)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("Failed to read script: {}", e)))?;
        let script = parse_script(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Failed to parse script: {}", e)))?;
        commands.extend(script);
    }

    for command in commands {
        if let Err(e) = scene.apply(command) {
            eprintln!("skipped command: {}", e);
        }
    }

    let mut renderer = Renderer::new();
    let stats = renderer.render(&scene, |command| surface.apply(&command));

    println!("{}", surface.to_text());
    println!("{} faces, {} drawn, {} skipped", stats.faces, stats.drawn, stats.skipped);
    Ok(())
}
