#![deny(unsafe_code)]
//! CLI binary for spritefield.
//!
//! Subcommands:
//! - `render`: animate a generator state and write PNG frames
//! - `list`: print palettes, motion modes and sprite collections
//! - `state`: print the default generator state as JSON

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use spritefield_core::{GeneratorState, MotionMode, Palette, SpriteCatalog};
use spritefield_engine::snapshot::write_png;
use spritefield_engine::{Controller, Raster, SpriteLibrary};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spritefield", about = "Procedural sprite composition renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Animate a generator state and write PNG frames.
    Render {
        /// Generator state JSON file; defaults are used when omitted.
        #[arg(long)]
        state: Option<PathBuf>,

        /// Seed override.
        #[arg(long)]
        seed: Option<String>,

        /// State overrides as a JSON object, applied after `--state`.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,

        /// Animation time of the first written frame, in seconds.
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,

        /// Number of frames to write.
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        frames: u32,

        /// Ticks per second of animation time.
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,

        /// Output file path; numbered when writing several frames.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List palettes, motion modes and sprite collections.
    List,
    /// Print the default generator state as JSON.
    State,
}

/// Path of frame `index` out of `count`: `output` itself for a single
/// frame, otherwise `stem-0001.ext` next to it.
fn frame_path(output: &Path, index: u32, count: u32) -> PathBuf {
    if count <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".into());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".into());
    output.with_file_name(format!("{stem}-{index:04}.{ext}"))
}

fn load_state(path: Option<&Path>) -> Result<GeneratorState, CliError> {
    let Some(path) = path else {
        return Ok(GeneratorState::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    Ok(GeneratorState::from_json(&json)?)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let palettes = Palette::list_names();
            let modes = MotionMode::list_names();
            let catalog = SpriteCatalog::builtin();
            if cli.json {
                let collections: serde_json::Map<String, serde_json::Value> = catalog
                    .collections()
                    .iter()
                    .map(|c| (c.id.clone(), serde_json::json!(c.sprites)))
                    .collect();
                let info = serde_json::json!({
                    "palettes": palettes,
                    "motion_modes": modes,
                    "collections": collections,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("Motion modes:");
                println!("  {}", modes.join(", "));
                println!("Sprite collections:");
                for c in catalog.collections() {
                    println!("  {}: {}", c.id, c.sprites.join(", "));
                }
            }
        }
        Command::State => {
            println!("{}", GeneratorState::default().to_json()?);
        }
        Command::Render {
            state,
            seed,
            params,
            width,
            height,
            time,
            frames,
            fps,
            output,
        } => {
            let mut generator = load_state(state.as_deref())?;
            if let Some(seed) = seed {
                generator.seed = seed;
            }
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            generator
                .apply_params(&params)
                .map_err(|e| CliError::Input(e.to_string()))?;
            let seed = generator.seed.clone();

            let mut surface = Raster::new(width, height)?;
            let mut library = SpriteLibrary::new();
            library.preload(SpriteCatalog::builtin().all_sprites());
            let mut controller = Controller::new(generator);

            let step = 1.0 / f64::from(fps);
            let time = time.max(0.0);
            let warmup = (time / step).floor() as u64;
            for i in 0..warmup {
                controller.tick(i as f64 * step, &mut surface, &mut library);
            }
            let mut written = Vec::with_capacity(frames as usize);
            for frame in 0..frames {
                let now = time + f64::from(frame) * step;
                controller.tick(now, &mut surface, &mut library);
                let path = frame_path(&output, frame, frames);
                write_png(surface.buffer(), &path)?;
                tracing::debug!(frame, path = %path.display(), "wrote frame");
                written.push(path.display().to_string());
            }

            if cli.json {
                let info = serde_json::json!({
                    "seed": seed,
                    "width": width,
                    "height": height,
                    "time": time,
                    "frames": frames,
                    "outputs": written,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {frames} frame(s) ({width}x{height}, t={time}s, seed {seed}) -> {}",
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn single_frame_keeps_output_path() {
        let out = Path::new("out/shot.png");
        assert_eq!(frame_path(out, 0, 1), PathBuf::from("out/shot.png"));
    }

    #[test]
    fn multiple_frames_are_numbered() {
        let out = Path::new("out/shot.png");
        assert_eq!(frame_path(out, 3, 10), PathBuf::from("out/shot-0003.png"));
    }

    #[test]
    fn zero_frames_is_rejected_by_clap() {
        assert!(Cli::try_parse_from(["spritefield", "render", "--frames", "0"]).is_err());
    }

    #[test]
    fn render_writes_png_frames() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("frame.png");
        let cli = parse(&[
            "spritefield",
            "render",
            "-W",
            "32",
            "-H",
            "24",
            "--frames",
            "2",
            "--time",
            "0.1",
            "--params",
            r#"{"density": 30, "motion_mode": "spiral"}"#,
            "--output",
            output.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(dir.path().join("frame-0000.png").exists());
        assert!(dir.path().join("frame-0001.png").exists());
    }

    #[test]
    fn bad_params_are_input_errors() {
        let cli = parse(&["spritefield", "render", "--params", "{nope"]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 12);

        let cli = parse(&["spritefield", "render", "--params", r#"{"warp": 1}"#]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 12);
    }

    #[test]
    fn zero_width_is_an_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("x.png");
        let cli = parse(&[
            "spritefield",
            "render",
            "-W",
            "0",
            "--output",
            output.to_str().unwrap(),
        ]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 10);
    }

    #[test]
    fn missing_state_file_is_io_error() {
        let cli = parse(&["spritefield", "render", "--state", "/no/such/state.json"]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 11);
    }

    #[test]
    fn state_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"seed": "from-file", "density": 500}"#).unwrap();
        let state = load_state(Some(&path)).unwrap();
        assert_eq!(state.seed, "from-file");
        assert_eq!(state.density, 100.0);
    }
}
