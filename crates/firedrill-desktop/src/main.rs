//! Firedrill - native entry point
//!
//! Opens the drill scene in a window, or runs it headless for a fixed number
//! of frames and reports what happened.

mod headless;
mod window;

use anyhow::{Context, Result};
use clap::Parser;
use firedrill_core::{SceneConfig, ScenePreset};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "firedrill")]
#[command(about = "Fire safety drill scene: put out the fire with the extinguisher")]
#[command(version)]
struct Args {
    /// Built-in scene (classroom, training_room, open_room)
    #[arg(short, long, default_value = "classroom")]
    preset: String,

    /// Scene file (.toml or .json); overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the selected scene as TOML to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Milliseconds between headless frames
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Click the extinguisher at this headless frame
    #[arg(long)]
    pick_at: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Firedrill v{}", env!("CARGO_PKG_VERSION"));

    let config = load_scene(&args)?;

    if let Some(path) = &args.write_config {
        config
            .save_toml(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Scene written");
        return Ok(());
    }

    // Only the startup futures run on it; Bevy's loop owns the thread afterwards
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    if args.headless {
        let report = runtime.block_on(headless::run(
            &config,
            headless::HeadlessOptions {
                frames: args.frames,
                frame_ms: args.frame_ms,
                pick_at: args.pick_at,
            },
        ));
        println!("{}", report);
    } else {
        let scene = runtime.block_on(window::prepare(&config));
        drop(runtime);
        window::run(config, scene);
    }

    Ok(())
}

fn load_scene(args: &Args) -> Result<SceneConfig> {
    match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene {}", path.display())),
        None => {
            let preset: ScenePreset = args.preset.parse()?;
            Ok(preset.config())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["firedrill"]);
        assert_eq!(args.preset, "classroom");
        assert!(!args.headless);
        assert_eq!(args.frames, 600);
        assert!(args.pick_at.is_none());
    }

    #[test]
    fn test_load_scene_from_file_overrides_preset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("open.toml");
        ScenePreset::OpenRoom.config().save_toml(&path).unwrap();

        let args = Args::parse_from([
            "firedrill",
            "--preset",
            "training_room",
            "--config",
            path.to_str().unwrap(),
        ]);
        let config = load_scene(&args).unwrap();
        assert_eq!(config.name, "open_room");
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        let args = Args::parse_from(["firedrill", "--preset", "warehouse"]);
        assert!(load_scene(&args).is_err());
    }
}
