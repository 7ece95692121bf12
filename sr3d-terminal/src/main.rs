/// SR3D Terminal Viewer
///
/// Renders a small scene of meshes as coloured ASCII art with frustum
/// clipping. Run with `--help` for options.
/// Controls:
///   - WASD: Move, R/F: Up/Down, X: Toggle fast movement
///   - Arrow Keys: Look around
///   - O/N/V/G: Outlines, normals, camera frustums, ground grid
///   - C: New camera here, Tab: Next camera, T: Follow the first model
///   - +/-: Field of view
///   - Q/ESC: Quit
use std::fs::File;

use anyhow::Context;
use sr3d_terminal::{build_scene, config::USAGE, AppConfig, TerminalApp};

fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    // Logging to the terminal would tear the alternate screen, so without a
    // log file only errors are let through
    let mut builder = match &config.log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"));
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")),
    };
    builder.try_init().context("initialising logger")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_args(std::env::args().skip(1))?;
    if config.show_help {
        println!("{}", USAGE);
        return Ok(());
    }

    init_logging(&config)?;

    let engine = build_scene(&config)?;

    // Run the terminal app
    let mut app = TerminalApp::new(engine, &config)?;
    app.run()?;

    Ok(())
}
